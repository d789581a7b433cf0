// src/services/rbac_service.rs

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::pagination::{Page, PageParams};
use crate::common::search::SearchFilter;
use crate::db::RbacRepository;
use crate::models::rbac::{
    CreatePermissionPayload, PatchPermissionPayload, PatchRolePayload, Permission, RoleResponse,
};

/// Decide se pendurar `permission_id` sob `parent_id` criaria um ciclo na
/// árvore: a permissão não pode aparecer na cadeia de ancestrais do novo pai
/// (a cadeia vem do repositório e inclui o próprio pai).
fn creates_cycle(permission_id: Uuid, parent_id: Uuid, parent_ancestors: &[Uuid]) -> bool {
    permission_id == parent_id || parent_ancestors.contains(&permission_id)
}

#[derive(Clone)]
pub struct RbacService {
    repo: RbacRepository,
    pool: PgPool,
}

impl RbacService {
    pub fn new(repo: RbacRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // ------------------------------------------------------------------
    // Cargos
    // ------------------------------------------------------------------

    pub async fn list_roles(
        &self,
        filter: &SearchFilter,
        params: PageParams,
    ) -> Result<Page<RoleResponse>, AppError> {
        let page = self.repo.list_roles(filter, params).await?;

        let ids: Vec<Uuid> = page.items.iter().map(|r| r.id).collect();
        let mut by_role: HashMap<Uuid, Vec<Permission>> = HashMap::new();
        for (role_id, permission) in self.repo.permissions_for_roles(&ids).await? {
            by_role.entry(role_id).or_default().push(permission);
        }

        Ok(Page {
            count: page.count,
            params: page.params,
            items: page
                .items
                .into_iter()
                .map(|role| {
                    let permissions = by_role.remove(&role.id).unwrap_or_default();
                    RoleResponse { role, permissions }
                })
                .collect(),
        })
    }

    pub async fn get_role(&self, id: Uuid) -> Result<RoleResponse, AppError> {
        let role = self
            .repo
            .find_role(id)
            .await?
            .ok_or(AppError::NotFound("Cargo"))?;
        let permissions = self.repo.permissions_for_role(&self.pool, id).await?;
        Ok(RoleResponse { role, permissions })
    }

    pub async fn create_role_with_permissions(
        &self,
        name: String,
        permission_ids: Vec<Uuid>,
    ) -> Result<RoleResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let role = self.repo.create_role(&mut *tx, &name).await?;
        self.repo
            .replace_role_permissions(&mut tx, role.id, &permission_ids)
            .await?;
        let permissions = self.repo.permissions_for_role(&mut *tx, role.id).await?;

        tx.commit().await?;

        Ok(RoleResponse { role, permissions })
    }

    // PUT e PATCH convergem aqui
    pub async fn update_role(
        &self,
        id: Uuid,
        payload: PatchRolePayload,
    ) -> Result<RoleResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        let role = self
            .repo
            .update_role(&mut *tx, id, payload.name.as_deref())
            .await?
            .ok_or(AppError::NotFound("Cargo"))?;

        if let Some(permission_ids) = &payload.permissions {
            self.repo
                .replace_role_permissions(&mut tx, id, permission_ids)
                .await?;
        }
        let permissions = self.repo.permissions_for_role(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(RoleResponse { role, permissions })
    }

    pub async fn delete_role(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_role(id).await? {
            return Err(AppError::NotFound("Cargo"));
        }
        Ok(())
    }

    pub async fn attach_permission(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> Result<(), AppError> {
        self.repo
            .find_role(role_id)
            .await?
            .ok_or(AppError::NotFound("Cargo"))?;
        self.repo.attach_permission(role_id, permission_id).await
    }

    pub async fn detach_permission(
        &self,
        role_id: Uuid,
        permission_id: Uuid,
    ) -> Result<(), AppError> {
        if !self.repo.detach_permission(role_id, permission_id).await? {
            return Err(AppError::NotFound("Vínculo"));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Permissões
    // ------------------------------------------------------------------

    pub async fn list_permissions(
        &self,
        filter: &SearchFilter,
        params: PageParams,
    ) -> Result<Page<Permission>, AppError> {
        self.repo.list_permissions(filter, params).await
    }

    pub async fn get_permission(&self, id: Uuid) -> Result<Permission, AppError> {
        self.repo
            .find_permission(id)
            .await?
            .ok_or(AppError::NotFound("Permissão"))
    }

    pub async fn create_permission(
        &self,
        payload: CreatePermissionPayload,
    ) -> Result<Permission, AppError> {
        if let Some(parent_id) = payload.parent_id {
            self.repo.find_permission(parent_id).await?.ok_or_else(|| {
                AppError::InvalidParentPermission("A permissão pai informada não existe.".into())
            })?;
        }
        self.repo.create_permission(&payload).await
    }

    // PUT e PATCH convergem aqui. Mudança de pai passa pela checagem de
    // ciclo: uma permissão não pode virar ancestral de si mesma.
    pub async fn update_permission(
        &self,
        id: Uuid,
        payload: PatchPermissionPayload,
    ) -> Result<Permission, AppError> {
        if let Some(parent_id) = payload.parent_id {
            self.repo.find_permission(parent_id).await?.ok_or_else(|| {
                AppError::InvalidParentPermission("A permissão pai informada não existe.".into())
            })?;
            let parent_ancestors = self.repo.ancestor_ids(parent_id).await?;
            if creates_cycle(id, parent_id, &parent_ancestors) {
                return Err(AppError::InvalidParentPermission(
                    "A permissão pai criaria um ciclo na árvore.".into(),
                ));
            }
        }
        self.repo
            .update_permission(id, &payload)
            .await?
            .ok_or(AppError::NotFound("Permissão"))
    }

    pub async fn delete_permission(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_permission(id).await? {
            return Err(AppError::NotFound("Permissão"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn pendurar_sob_um_descendente_e_ciclo() {
        // raiz -> meio -> folha; raiz não pode virar filha da folha
        let ancestors = chain(3);
        let root = ancestors[2];
        let leaf = ancestors[0];
        assert!(creates_cycle(root, leaf, &ancestors));
    }

    #[test]
    fn apontar_para_si_mesma_e_ciclo() {
        let id = Uuid::new_v4();
        assert!(creates_cycle(id, id, &[id]));
    }

    #[test]
    fn mover_para_outra_subarvore_nao_e_ciclo() {
        let ancestors = chain(2);
        let other = Uuid::new_v4();
        assert!(!creates_cycle(other, ancestors[0], &ancestors));
    }
}
