// src/models/rbac.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Tipo de permissão (o que o frontend renderiza a partir dela)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "permission_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    Catalog,
    Menu,
    Button,
    Iframe,
    Link,
}

// O que sai do banco (tabela permissions). Forma uma árvore via parent_id.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Permission {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub id: Uuid,

    #[schema(example = "Listar usuários")]
    pub name: String,

    // Código único no sistema inteiro
    #[schema(example = "system:user:list")]
    pub code: String,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: PermissionType,

    pub parent_id: Option<Uuid>,

    #[schema(example = "/system/user")]
    pub path: Option<String>,

    // Payload livre de configuração do frontend (ícone, ordem, etc.)
    pub config: Value,
}

// O que sai do banco (tabela roles)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Role {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Administrador")]
    pub name: String,
}

// Resposta completa (cargo + permissões vinculadas, somente leitura)
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePermissionPayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres"))]
    #[schema(example = "Listar usuários")]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "O código deve ter entre 1 e 100 caracteres"))]
    #[schema(example = "system:user:list")]
    pub code: String,

    #[serde(rename = "type")]
    pub kind: PermissionType,

    pub parent_id: Option<Uuid>,

    #[validate(length(max = 200, message = "O path deve ter no máximo 200 caracteres"))]
    #[schema(example = "/system/user")]
    pub path: Option<String>,

    pub config: Option<Value>,
}

// PATCH: só os campos presentes são alterados
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct PatchPermissionPayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "O código deve ter entre 1 e 100 caracteres"))]
    pub code: Option<String>,

    #[serde(rename = "type")]
    pub kind: Option<PermissionType>,

    pub parent_id: Option<Uuid>,

    #[validate(length(max = 200, message = "O path deve ter no máximo 200 caracteres"))]
    pub path: Option<String>,

    pub config: Option<Value>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRolePayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres"))]
    #[schema(example = "Administrador")]
    pub name: String,

    // IDs das permissões concedidas na criação
    #[serde(default)]
    pub permissions: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct PatchRolePayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres"))]
    pub name: Option<String>,

    pub permissions: Option<Vec<Uuid>>,
}

// Concessão explícita cargo <-> permissão
#[derive(Debug, Deserialize, ToSchema)]
pub struct GrantPermissionPayload {
    pub permission_id: Uuid,
}

// Concessão explícita usuário <-> cargo
#[derive(Debug, Deserialize, ToSchema)]
pub struct GrantRolePayload {
    pub role_id: Uuid,
}
