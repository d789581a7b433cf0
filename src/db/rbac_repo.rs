// src/db/rbac_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::pagination::{Page, PageParams};
use crate::common::search::SearchFilter;
use crate::models::rbac::{CreatePermissionPayload, PatchPermissionPayload, Permission, Role};

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

// Linha do join cargo <-> permissão usada na montagem das respostas
#[derive(sqlx::FromRow)]
struct RolePermissionRow {
    role_id: Uuid,
    #[sqlx(flatten)]
    permission: Permission,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Cargos
    // ------------------------------------------------------------------

    pub async fn list_roles(
        &self,
        filter: &SearchFilter,
        params: PageParams,
    ) -> Result<Page<Role>, AppError> {
        let mut count_qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM roles");
        filter.push_where(&mut count_qb, true);
        let count: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT * FROM roles");
        filter.push_where(&mut qb, true);
        qb.push(" ORDER BY id LIMIT ");
        qb.push_bind(params.limit());
        qb.push(" OFFSET ");
        qb.push_bind(params.offset());
        let items = qb.build_query_as::<Role>().fetch_all(&self.pool).await?;

        Ok(Page { count, params, items })
    }

    pub async fn find_role(&self, id: Uuid) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role)
    }

    pub async fn create_role<'e, E>(&self, executor: E, name: &str) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Role>("INSERT INTO roles (name) VALUES ($1) RETURNING *")
            .bind(name)
            .fetch_one(executor)
            .await
            .map_err(|e| AppError::from_unique_violation(e, "Já existe um cargo com esse nome."))
    }

    pub async fn update_role<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
    ) -> Result<Option<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = COALESCE($2, name) WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(executor)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe um cargo com esse nome."))
    }

    pub async fn delete_role(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // Permissões vinculadas a um cargo (somente leitura na resposta)
    pub async fn permissions_for_role<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
    ) -> Result<Vec<Permission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT p.*
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(role_id)
        .fetch_all(executor)
        .await?;
        Ok(permissions)
    }

    // Permissões de um conjunto de cargos, em uma consulta só
    pub async fn permissions_for_roles(
        &self,
        role_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Permission)>, AppError> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, RolePermissionRow>(
            r#"
            SELECT rp.role_id, p.*
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role_id = ANY($1)
            ORDER BY p.id
            "#,
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.role_id, row.permission))
            .collect())
    }

    // Substitui o conjunto de permissões do cargo (UNNEST em massa)
    pub async fn replace_role_permissions(
        &self,
        conn: &mut sqlx::PgConnection,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM role_permissions WHERE role_id = $1")
            .bind(role_id)
            .execute(&mut *conn)
            .await?;

        if !permission_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO role_permissions (role_id, permission_id)
                SELECT $1, unnest($2::uuid[])
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(role_id)
            .bind(permission_ids)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    // Concessão explícita de uma única permissão; par duplicado vira 409
    pub async fn attach_permission(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query("INSERT INTO role_permissions (role_id, permission_id) VALUES ($1, $2)")
            .bind(role_id)
            .bind(permission_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::from_unique_violation(
                    e,
                    "Essa permissão já foi concedida a esse cargo.",
                )
            })?;
        Ok(())
    }

    pub async fn detach_permission(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2",
        )
        .bind(role_id)
        .bind(permission_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Permissões
    // ------------------------------------------------------------------

    pub async fn list_permissions(
        &self,
        filter: &SearchFilter,
        params: PageParams,
    ) -> Result<Page<Permission>, AppError> {
        let mut count_qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM permissions");
        filter.push_where(&mut count_qb, true);
        let count: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT * FROM permissions");
        filter.push_where(&mut qb, true);
        qb.push(" ORDER BY id LIMIT ");
        qb.push_bind(params.limit());
        qb.push(" OFFSET ");
        qb.push_bind(params.offset());
        let items = qb
            .build_query_as::<Permission>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page { count, params, items })
    }

    pub async fn find_permission(&self, id: Uuid) -> Result<Option<Permission>, AppError> {
        let permission =
            sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(permission)
    }

    pub async fn create_permission(
        &self,
        payload: &CreatePermissionPayload,
    ) -> Result<Permission, AppError> {
        sqlx::query_as::<_, Permission>(
            r#"
            INSERT INTO permissions (name, code, type, parent_id, path, config)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, '{}'::jsonb))
            RETURNING *
            "#,
        )
        .bind(&payload.name)
        .bind(&payload.code)
        .bind(payload.kind)
        .bind(payload.parent_id)
        .bind(payload.path.as_deref())
        .bind(payload.config.as_ref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe uma permissão com esse código."))
    }

    // PATCH e PUT passam por aqui; campo ausente mantém o valor atual
    pub async fn update_permission(
        &self,
        id: Uuid,
        payload: &PatchPermissionPayload,
    ) -> Result<Option<Permission>, AppError> {
        sqlx::query_as::<_, Permission>(
            r#"
            UPDATE permissions SET
                name      = COALESCE($2, name),
                code      = COALESCE($3, code),
                type      = COALESCE($4, type),
                parent_id = COALESCE($5, parent_id),
                path      = COALESCE($6, path),
                config    = COALESCE($7, config)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(payload.name.as_deref())
        .bind(payload.code.as_deref())
        .bind(payload.kind)
        .bind(payload.parent_id)
        .bind(payload.path.as_deref())
        .bind(payload.config.as_ref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_unique_violation(e, "Já existe uma permissão com esse código."))
    }

    pub async fn delete_permission(&self, id: Uuid) -> Result<bool, AppError> {
        // Os filhos caem junto pelo ON DELETE CASCADE da própria tabela
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Cadeia de ancestrais de uma permissão (a própria inclusa), da folha
    /// até a raiz. A decisão de ciclo em cima da cadeia fica no service.
    pub async fn ancestor_ids(&self, id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            WITH RECURSIVE ancestors AS (
                SELECT id, parent_id FROM permissions WHERE id = $1
                UNION ALL
                SELECT p.id, p.parent_id
                FROM permissions p
                JOIN ancestors a ON p.id = a.parent_id
            )
            SELECT id FROM ancestors
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
