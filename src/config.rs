// src/config.rs

use crate::{
    common::{envelope::EnvelopeConfig, pagination::PaginationKeys},
    db::{RbacRepository, UserRepository},
    services::{rbac_service::RbacService, user_service::UserService},
};
use axum::extract::FromRef;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_service: UserService,
    pub rbac_service: RbacService,
    // Políticas do envelope e da paginação, carregadas uma vez na subida
    pub envelope: EnvelopeConfig,
    pub pagination: PaginationKeys,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let user_service = UserService::new(user_repo, db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let rbac_service = RbacService::new(rbac_repo, db_pool.clone());

        Ok(Self {
            db_pool,
            user_service,
            rbac_service,
            envelope: EnvelopeConfig::default(),
            pagination: PaginationKeys::default(),
        })
    }
}

// O middleware do envelope recebe só a política dele, não o estado inteiro.
impl FromRef<AppState> for EnvelopeConfig {
    fn from_ref(state: &AppState) -> Self {
        state.envelope.clone()
    }
}
