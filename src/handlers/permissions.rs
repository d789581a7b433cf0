// src/handlers/permissions.rs

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
    models::rbac::{CreatePermissionPayload, PatchPermissionPayload, Permission},
};

pub const PERMISSIONS_PATH: &str = "/api/permissions";

const SEARCH_FIELDS: &[&str] = &["name", "code", "path"];
const TIME_RANGE_FIELDS: &[&str] = &[];

// GET /api/permissions
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    params(
        PageQuery,
        ("name" = Option<String>, Query, description = "Busca por substring (case-insensitive)"),
        ("code" = Option<String>, Query, description = "Busca por substring (case-insensitive)"),
    ),
    responses(
        (status = 200, description = "Lista paginada de permissões", body = Vec<Permission>)
    )
)]
pub async fn list_permissions(
    State(app_state): State<AppState>,
    Query(page_query): Query<PageQuery>,
    Query(raw_params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, AppError> {
    let filter = SearchFilter::parse(&raw_params, SEARCH_FIELDS, TIME_RANGE_FIELDS);
    let params = PageParams::from_query(&page_query);

    let page = app_state
        .rbac_service
        .list_permissions(&filter, params)
        .await?;

    Ok(Json(paginated_body(
        &app_state.pagination,
        &page,
        PERMISSIONS_PATH,
        &raw_params,
    )))
}

// GET /api/permissions/{id}
#[utoipa::path(
    get,
    path = "/api/permissions/{id}",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID da permissão")),
    responses(
        (status = 200, description = "Detalhe da permissão", body = Permission),
        (status = 404, description = "Permissão não encontrada")
    )
)]
pub async fn retrieve_permission(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let permission = app_state.rbac_service.get_permission(id).await?;
    Ok(Json(permission))
}

// POST /api/permissions
#[utoipa::path(
    post,
    path = "/api/permissions",
    tag = "RBAC",
    request_body = CreatePermissionPayload,
    responses(
        (status = 201, description = "Permissão criada", body = Permission),
        (status = 400, description = "Permissão pai inválida"),
        (status = 409, description = "Código de permissão já em uso")
    )
)]
pub async fn create_permission(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePermissionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let permission = app_state.rbac_service.create_permission(payload).await?;

    Ok((StatusCode::CREATED, Json(permission)))
}

// PUT /api/permissions/{id}
#[utoipa::path(
    put,
    path = "/api/permissions/{id}",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID da permissão")),
    request_body = CreatePermissionPayload,
    responses(
        (status = 200, description = "Permissão atualizada", body = Permission),
        (status = 400, description = "Permissão pai inválida (inexistente ou ciclo)"),
        (status = 404, description = "Permissão não encontrada")
    )
)]
pub async fn update_permission(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreatePermissionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let full = PatchPermissionPayload {
        name: Some(payload.name),
        code: Some(payload.code),
        kind: Some(payload.kind),
        parent_id: payload.parent_id,
        path: payload.path,
        config: payload.config,
    };
    let permission = app_state.rbac_service.update_permission(id, full).await?;

    Ok(Json(permission))
}

// PATCH /api/permissions/{id}
#[utoipa::path(
    patch,
    path = "/api/permissions/{id}",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID da permissão")),
    request_body = PatchPermissionPayload,
    responses(
        (status = 200, description = "Permissão atualizada", body = Permission),
        (status = 400, description = "Permissão pai inválida (inexistente ou ciclo)"),
        (status = 404, description = "Permissão não encontrada")
    )
)]
pub async fn partial_update_permission(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PatchPermissionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let permission = app_state.rbac_service.update_permission(id, payload).await?;

    Ok(Json(permission))
}

// DELETE /api/permissions/{id}: filhos caem em cascata
#[utoipa::path(
    delete,
    path = "/api/permissions/{id}",
    tag = "RBAC",
    params(("id" = Uuid, Path, description = "ID da permissão")),
    responses(
        (status = 204, description = "Permissão removida (com os filhos em cascata)"),
        (status = 404, description = "Permissão não encontrada")
    )
)]
pub async fn delete_permission(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.rbac_service.delete_permission(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
