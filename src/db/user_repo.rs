// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::pagination::{Page, PageParams};
use crate::common::search::SearchFilter;
use crate::models::user::{PatchUserPayload, User};

// O repositório de usuários, responsável pelas tabelas 'users' e 'user_roles'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Listagem com busca ad-hoc e paginação; ORDER BY id garante
    // paginação estável.
    pub async fn list(
        &self,
        filter: &SearchFilter,
        params: PageParams,
    ) -> Result<Page<User>, AppError> {
        let mut count_qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM users");
        filter.push_where(&mut count_qb, true);
        let count: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT * FROM users");
        filter.push_where(&mut qb, true);
        qb.push(" ORDER BY id LIMIT ");
        qb.push_bind(params.limit());
        qb.push(" OFFSET ");
        qb.push_bind(params.offset());
        let items = qb.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok(Page { count, params, items })
    }

    // Action de demonstração: filtra pelo flag de ativo
    pub async fn list_by_active(
        &self,
        active: bool,
        params: PageParams,
    ) -> Result<Page<User>, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active = $1")
                .bind(active)
                .fetch_one(&self.pool)
                .await?;

        let items = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE is_active = $1 ORDER BY id LIMIT $2 OFFSET $3",
        )
        .bind(active)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page { count, params, items })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        username: &str,
        password_hash: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
        is_active: bool,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (username, password_hash, email, first_name, last_name,
                 is_active, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(first_name)
        .bind(last_name)
        .bind(is_active)
        .bind(is_staff)
        .bind(is_superuser)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um usuário com esse username."))
    }

    // Atualização parcial: campo ausente mantém o valor atual (COALESCE).
    // O PUT reutiliza o mesmo caminho com todos os campos presentes.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &PatchUserPayload,
        password_hash: Option<&str>,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                username      = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                email         = COALESCE($4, email),
                first_name    = COALESCE($5, first_name),
                last_name     = COALESCE($6, last_name),
                is_active     = COALESCE($7, is_active),
                is_staff      = COALESCE($8, is_staff),
                is_superuser  = COALESCE($9, is_superuser)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.username.as_deref())
        .bind(password_hash)
        .bind(payload.email.as_deref())
        .bind(payload.first_name.as_deref())
        .bind(payload.last_name.as_deref())
        .bind(payload.is_active)
        .bind(payload.is_staff)
        .bind(payload.is_superuser)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um usuário com esse username."))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // IDs dos cargos concedidos ao usuário
    pub async fn role_ids<'e, E>(&self, executor: E, user_id: Uuid) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT role_id FROM user_roles WHERE user_id = $1 ORDER BY role_id",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    // Pares (usuário, cargo) de um conjunto de usuários, em uma consulta só
    pub async fn roles_for_users(
        &self,
        user_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Uuid)>, AppError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT user_id, role_id FROM user_roles WHERE user_id = ANY($1) ORDER BY role_id",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Substitui o conjunto de cargos do usuário. Inserção em massa com
    // UNNEST; o ON CONFLICT mantém a troca idempotente.
    pub async fn replace_roles(
        &self,
        conn: &mut sqlx::PgConnection,
        user_id: Uuid,
        role_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        if !role_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                SELECT $1, unnest($2::uuid[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(role_ids)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    // Concessão explícita de um único cargo; par duplicado vira 409
    pub async fn grant_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), AppError> {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_unique_violation(e, "Esse cargo já foi concedido a esse usuário.")
            })?;
        Ok(())
    }

    pub async fn revoke_role(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
