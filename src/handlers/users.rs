// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, PageQuery, paginated_body},
        search::SearchFilter,
    },
    config::AppState,
    models::user::{CreateUserPayload, PatchUserPayload, User, UserResponse},
    models::rbac::GrantRolePayload,
};

pub const USERS_PATH: &str = "/api/users";

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(
        PageQuery,
        ("username" = Option<String>, Query, description = "Busca por substring (case-insensitive)"),
        ("email" = Option<String>, Query, description = "Busca por substring (case-insensitive)"),
        ("date_joined[]" = Option<String>, Query, description = "Período: dois valores ISO 8601 (início e fim)"),
    ),
    responses(
        (status = 200, description = "Lista paginada de usuários", body = Vec<UserResponse>)
    )
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    Query(page_query): Query<PageQuery>,
    Query(raw_params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = SearchFilter::parse(&raw_params, User::SEARCH_FIELDS, User::TIME_RANGE_FIELDS);
    let params = PageParams::from_query(&page_query);

    let page = app_state.user_service.list(&filter, params).await?;

    Ok(Json(paginated_body(
        &app_state.pagination,
        &page,
        USERS_PATH,
        &raw_params,
    )))
}

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub active: Option<bool>,
    pub page: Option<u32>,
}

// GET /api/users/active: action de demonstração com página de tamanho 1
#[utoipa::path(
    get,
    path = "/api/users/active",
    tag = "Users",
    params(
        ("active" = Option<bool>, Query, description = "Flag de usuário ativo (padrão: true)"),
        ("page" = Option<u32>, Query, description = "Número da página"),
    ),
    responses(
        (status = 200, description = "Usuários filtrados pelo flag de ativo", body = Vec<UserResponse>)
    )
)]
pub async fn list_active_users(
    State(app_state): State<AppState>,
    Query(query): Query<ActiveQuery>,
    Query(raw_params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let params = PageParams::from_query(&PageQuery {
        page: query.page,
        page_size: None,
    })
    .with_page_size(1);

    let page = app_state
        .user_service
        .list_by_active(query.active.unwrap_or(true), params)
        .await?;

    Ok(Json(paginated_body(
        &app_state.pagination,
        &page,
        "/api/users/active",
        &raw_params,
    )))
}

// GET /api/users/{id}
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Detalhe do usuário", body = UserResponse),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn retrieve_user(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.user_service.retrieve(id).await?;
    Ok(Json(user))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = UserResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Username já em uso")
    )
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.user_service.create(payload).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

// PUT /api/users/{id}: atualização integral; o payload completo é exigido
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = CreateUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = UserResponse),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let full = PatchUserPayload {
        username: Some(payload.username),
        password: Some(payload.password),
        email: Some(payload.email.unwrap_or_default()),
        first_name: Some(payload.first_name),
        last_name: Some(payload.last_name),
        is_active: Some(payload.is_active),
        is_staff: Some(payload.is_staff),
        is_superuser: Some(payload.is_superuser),
        roles: Some(payload.roles),
    };
    let user = app_state.user_service.update(id, full).await?;

    Ok(Json(user))
}

// PATCH /api/users/{id}: atualização parcial
#[utoipa::path(
    patch,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = PatchUserPayload,
    responses(
        (status = 200, description = "Usuário atualizado", body = UserResponse),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn partial_update_user(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PatchUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state.user_service.update(id, payload).await?;

    Ok(Json(user))
}

// DELETE /api/users/{id}
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário removido"),
        (status = 404, description = "Usuário não encontrado")
    )
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/users/{id}/roles: concede um cargo; par duplicado vira 409
#[utoipa::path(
    post,
    path = "/api/users/{id}/roles",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = GrantRolePayload,
    responses(
        (status = 201, description = "Cargo concedido"),
        (status = 409, description = "Cargo já concedido a esse usuário")
    )
)]
pub async fn grant_role(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GrantRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .user_service
        .grant_role(id, payload.role_id)
        .await?;
    Ok(StatusCode::CREATED)
}

// DELETE /api/users/{id}/roles/{role_id}
#[utoipa::path(
    delete,
    path = "/api/users/{id}/roles/{role_id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "ID do usuário"),
        ("role_id" = Uuid, Path, description = "ID do cargo"),
    ),
    responses(
        (status = 204, description = "Cargo revogado"),
        (status = 404, description = "Vínculo não encontrado")
    )
)]
pub async fn revoke_role(
    State(app_state): State<AppState>,
    Path((id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state.user_service.revoke_role(id, role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
