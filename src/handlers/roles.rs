// src/handlers/roles.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{PageParams, PageQuery, paginated_body},
        search::SearchFilter,
    },
    config::AppState,
    models::rbac::{CreateRolePayload, GrantPermissionPayload, PatchRolePayload, RoleResponse},
};

pub const ROLES_PATH: &str = "/api/roles";

// Colunas abertas à busca das listagens de cargos
const SEARCH_FIELDS: &[&str] = &["name"];
const TIME_RANGE_FIELDS: &[&str] = &[];

// GET /api/roles
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "RBAC",
    params(
        PageQuery,
        ("name" = Option<String>, Query, description = "Busca por substring (case-insensitive)"),
    ),
    responses(
        (status = 200, description = "Lista paginada de cargos", body = Vec<RoleResponse>)
    )
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    Query(page_query): Query<PageQuery>,
    Query(raw_params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = SearchFilter::parse(&raw_params, SEARCH_FIELDS, TIME_RANGE_FIELDS);
    let params = PageParams::from_query(&page_query);

    let page = app_state.rbac_service.list_roles(&filter, params).await?;

    Ok(Json(paginated_body(
        &app_state.pagination,
        &page,
        ROLES_PATH,
        &raw_params,
    )))
}

// GET /api/roles/{id}
#[utoipa::path(
    get,
    path = "/api/roles/{id}",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID do cargo")),
    responses(
        (status = 200, description = "Detalhe do cargo com permissões", body = RoleResponse),
        (status = 404, description = "Cargo não encontrado")
    )
)]
pub async fn retrieve_role(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let role = app_state.rbac_service.get_role(id).await?;
    Ok(Json(role))
}

// POST /api/roles
#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "RBAC",
    request_body = CreateRolePayload,
    responses(
        (status = 201, description = "Cargo criado", body = RoleResponse),
        (status = 409, description = "Nome de cargo já em uso")
    )
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let role = app_state
        .rbac_service
        .create_role_with_permissions(payload.name, payload.permissions)
        .await?;

    Ok((StatusCode::CREATED, Json(role)))
}

// PUT /api/roles/{id}
#[utoipa::path(
    put,
    path = "/api/roles/{id}",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID do cargo")),
    request_body = CreateRolePayload,
    responses(
        (status = 200, description = "Cargo atualizado", body = RoleResponse),
        (status = 404, description = "Cargo não encontrado")
    )
)]
pub async fn update_role(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let full = PatchRolePayload {
        name: Some(payload.name),
        permissions: Some(payload.permissions),
    };
    let role = app_state.rbac_service.update_role(id, full).await?;

    Ok(Json(role))
}

// PATCH /api/roles/{id}
#[utoipa::path(
    patch,
    path = "/api/roles/{id}",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID do cargo")),
    request_body = PatchRolePayload,
    responses(
        (status = 200, description = "Cargo atualizado", body = RoleResponse),
        (status = 404, description = "Cargo não encontrado")
    )
)]
pub async fn partial_update_role(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PatchRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let role = app_state.rbac_service.update_role(id, payload).await?;

    Ok(Json(role))
}

// DELETE /api/roles/{id}
#[utoipa::path(
    delete,
    path = "/api/roles/{id}",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID do cargo")),
    responses(
        (status = 204, description = "Cargo removido"),
        (status = 404, description = "Cargo não encontrado")
    )
)]
pub async fn delete_role(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.rbac_service.delete_role(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/roles/{id}/permissions: concede uma permissão; duplicado vira 409
#[utoipa::path(
    post,
    path = "/api/roles/{id}/permissions",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID do cargo")),
    request_body = GrantPermissionPayload,
    responses(
        (status = 201, description = "Permissão concedida"),
        (status = 409, description = "Permissão já concedida a esse cargo")
    )
)]
pub async fn attach_permission(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GrantPermissionPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .rbac_service
        .attach_permission(id, payload.permission_id)
        .await?;
    Ok(StatusCode::CREATED)
}

// DELETE /api/roles/{id}/permissions/{permission_id}
#[utoipa::path(
    delete,
    path = "/api/roles/{id}/permissions/{permission_id}",
    tag = "RBAC",
    params(
        ("id" = Uuid, Path, description = "ID do cargo"),
        ("permission_id" = Uuid, Path, description = "ID da permissão"),
    ),
    responses(
        (status = 204, description = "Permissão revogada"),
        (status = 404, description = "Vínculo não encontrado")
    )
)]
pub async fn detach_permission(
    State(app_state): State<AppState>,
    Path((id, permission_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .rbac_service
        .detach_permission(id, permission_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
