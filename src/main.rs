//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use utoipa_swagger_ui::SwaggerUi;

use admin_backend::common::envelope::envelope_layer;
use admin_backend::config::AppState;
use admin_backend::docs;
use admin_backend::handlers;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let user_routes = Router::new()
        .route(
            "/",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/active", get(handlers::users::list_active_users))
        .route(
            "/{id}",
            get(handlers::users::retrieve_user)
                .put(handlers::users::update_user)
                .patch(handlers::users::partial_update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/{id}/roles", post(handlers::users::grant_role))
        .route("/{id}/roles/{role_id}", delete(handlers::users::revoke_role));

    let role_routes = Router::new()
        .route(
            "/",
            get(handlers::roles::list_roles).post(handlers::roles::create_role),
        )
        .route(
            "/{id}",
            get(handlers::roles::retrieve_role)
                .put(handlers::roles::update_role)
                .patch(handlers::roles::partial_update_role)
                .delete(handlers::roles::delete_role),
        )
        .route("/{id}/permissions", post(handlers::roles::attach_permission))
        .route(
            "/{id}/permissions/{permission_id}",
            delete(handlers::roles::detach_permission),
        );

    let permission_routes = Router::new()
        .route(
            "/",
            get(handlers::permissions::list_permissions)
                .post(handlers::permissions::create_permission),
        )
        .route(
            "/{id}",
            get(handlers::permissions::retrieve_permission)
                .put(handlers::permissions::update_permission)
                .patch(handlers::permissions::partial_update_permission)
                .delete(handlers::permissions::delete_permission),
        );

    let demo_routes = Router::new().route(
        "/",
        get(handlers::demo::demo_get).post(handlers::demo::demo_post),
    );

    // Tudo abaixo de /api passa pelo envelope de três campos.
    let api_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/roles", role_routes)
        .nest("/permissions", permission_routes)
        .nest("/demo", demo_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            envelope_layer,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .merge(
            SwaggerUi::new("/docs")
                .external_url_unchecked("/api-docs/openapi.json", docs::openapi_json()),
        )
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
