// src/services/user_service.rs

use std::collections::HashMap;

use bcrypt::hash;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::pagination::{Page, PageParams};
use crate::common::search::SearchFilter;
use crate::db::UserRepository;
use crate::models::user::{CreateUserPayload, PatchUserPayload, User, UserResponse};

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    pool: PgPool,
}

impl UserService {
    pub fn new(repo: UserRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // O hashing é pesado para o executor async; vai para uma task blocking.
    async fn hash_password(password: String) -> Result<String, AppError> {
        let hashed = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    // Anexa os IDs de cargo de cada usuário da página em uma consulta só
    async fn attach_roles(&self, page: Page<User>) -> Result<Page<UserResponse>, AppError> {
        let ids: Vec<Uuid> = page.items.iter().map(|u| u.id).collect();
        let mut by_user: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for (user_id, role_id) in self.repo.roles_for_users(&ids).await? {
            by_user.entry(user_id).or_default().push(role_id);
        }

        Ok(Page {
            count: page.count,
            params: page.params,
            items: page
                .items
                .into_iter()
                .map(|user| {
                    let roles = by_user.remove(&user.id).unwrap_or_default();
                    UserResponse { user, roles }
                })
                .collect(),
        })
    }

    pub async fn list(
        &self,
        filter: &SearchFilter,
        params: PageParams,
    ) -> Result<Page<UserResponse>, AppError> {
        let page = self.repo.list(filter, params).await?;
        self.attach_roles(page).await
    }

    pub async fn list_by_active(
        &self,
        active: bool,
        params: PageParams,
    ) -> Result<Page<UserResponse>, AppError> {
        let page = self.repo.list_by_active(active, params).await?;
        self.attach_roles(page).await
    }

    pub async fn retrieve(&self, id: Uuid) -> Result<UserResponse, AppError> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;
        let roles = self.repo.role_ids(&self.pool, id).await?;
        Ok(UserResponse { user, roles })
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<UserResponse, AppError> {
        let password_hash = Self::hash_password(payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let user = self
            .repo
            .create(
                &mut *tx,
                &payload.username,
                &password_hash,
                payload.email.as_deref().unwrap_or(""),
                &payload.first_name,
                &payload.last_name,
                payload.is_active,
                payload.is_staff,
                payload.is_superuser,
            )
            .await?;

        self.repo
            .replace_roles(&mut tx, user.id, &payload.roles)
            .await?;
        let roles = self.repo.role_ids(&mut *tx, user.id).await?;

        tx.commit().await?;

        Ok(UserResponse { user, roles })
    }

    // PUT e PATCH convergem aqui; o handler do PUT monta o payload completo
    pub async fn update(
        &self,
        id: Uuid,
        payload: PatchUserPayload,
    ) -> Result<UserResponse, AppError> {
        let password_hash = match payload.password.clone() {
            Some(password) => Some(Self::hash_password(password).await?),
            None => None,
        };

        let mut tx = self.pool.begin().await?;

        let user = self
            .repo
            .update(&mut *tx, id, &payload, password_hash.as_deref())
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;

        if let Some(role_ids) = &payload.roles {
            self.repo.replace_roles(&mut tx, id, role_ids).await?;
        }
        let roles = self.repo.role_ids(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(UserResponse { user, roles })
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Usuário"));
        }
        Ok(())
    }

    pub async fn grant_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), AppError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::NotFound("Usuário"))?;
        self.repo.grant_role(user_id, role_id).await
    }

    pub async fn revoke_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), AppError> {
        if !self.repo.revoke_role(user_id, role_id).await? {
            return Err(AppError::NotFound("Vínculo"));
        }
        Ok(())
    }
}
