// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,

    #[schema(example = "maria.silva")]
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "maria@exemplo.com")]
    pub email: String,

    pub first_name: String,
    pub last_name: String,

    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,

    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    // Colunas abertas à busca por substring nas listagens
    pub const SEARCH_FIELDS: &'static [&'static str] =
        &["username", "email", "first_name", "last_name"];
    // Colunas que aceitam filtro por período
    pub const TIME_RANGE_FIELDS: &'static [&'static str] = &["date_joined", "last_login"];
}

// Usuário serializado com os IDs dos cargos concedidos
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: User,
    pub roles: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(length(min = 1, max = 150, message = "O username deve ter entre 1 e 150 caracteres"))]
    #[schema(example = "maria.silva")]
    pub username: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "maria@exemplo.com")]
    pub email: Option<String>,

    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,

    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,

    // IDs dos cargos concedidos na criação
    #[serde(default)]
    pub roles: Vec<Uuid>,
}

fn default_true() -> bool {
    true
}

// PATCH: só os campos presentes são alterados
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct PatchUserPayload {
    #[validate(length(min = 1, max = 150, message = "O username deve ter entre 1 e 150 caracteres"))]
    pub username: Option<String>,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub first_name: Option<String>,
    pub last_name: Option<String>,

    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,

    pub roles: Option<Vec<Uuid>>,
}
