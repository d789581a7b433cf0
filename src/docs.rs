// src/docs.rs
//
// O pós-processamento do documento acontece aqui, na subida do servidor:
// injeta as operations declaradas por descritor, embrulha as listagens no
// schema paginado e depois toda resposta JSON no envelope de três campos.
// Nada disso altera os handlers em runtime.
//
// O documento final vive como JSON cru (`serde_json::Value`) e é servido
// direto pelo Swagger UI; o modelo tipado do utoipa não volta a entrar em
// cena depois do pós-processamento.

use serde_json::{Value, json};
use utoipa::OpenApi;

use crate::common::{
    envelope::{EnvelopeConfig, envelope_schema},
    pagination::{PaginationKeys, paginated_response_schema},
};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Users ---
        handlers::users::list_users,
        handlers::users::list_active_users,
        handlers::users::retrieve_user,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::partial_update_user,
        handlers::users::delete_user,
        handlers::users::grant_role,
        handlers::users::revoke_role,

        // --- RBAC ---
        handlers::roles::list_roles,
        handlers::roles::retrieve_role,
        handlers::roles::create_role,
        handlers::roles::update_role,
        handlers::roles::partial_update_role,
        handlers::roles::delete_role,
        handlers::roles::attach_permission,
        handlers::roles::detach_permission,
        handlers::permissions::list_permissions,
        handlers::permissions::retrieve_permission,
        handlers::permissions::create_permission,
        handlers::permissions::update_permission,
        handlers::permissions::partial_update_permission,
        handlers::permissions::delete_permission,
    ),
    components(
        schemas(
            // --- Users ---
            models::user::User,
            models::user::UserResponse,
            models::user::CreateUserPayload,
            models::user::PatchUserPayload,

            // --- RBAC ---
            models::rbac::PermissionType,
            models::rbac::Permission,
            models::rbac::Role,
            models::rbac::RoleResponse,
            models::rbac::CreatePermissionPayload,
            models::rbac::PatchPermissionPayload,
            models::rbac::CreateRolePayload,
            models::rbac::PatchRolePayload,
            models::rbac::GrantPermissionPayload,
            models::rbac::GrantRolePayload,

            // --- Demo ---
            handlers::demo::DemoBody,
            handlers::demo::DemoNestedInfo,

            // --- Envelope ---
            crate::common::envelope::Envelope,
        )
    ),
    tags(
        (name = "Users", description = "Gestão de Usuários"),
        (name = "RBAC", description = "Controle de Acesso (Cargos e Permissões)"),
        (name = "Demo", description = "Endpoints de demonstração do template")
    )
)]
pub struct ApiDoc;

// Endpoints de listagem cujo schema de resposta vira o corpo paginado.
const LIST_OPS: &[(&str, &str)] = &[
    ("/api/users", "get"),
    ("/api/users/active", "get"),
    ("/api/roles", "get"),
    ("/api/permissions", "get"),
];

/// Documento OpenAPI completo, já pós-processado. É o que o Swagger UI
/// serve em `/api-docs/openapi.json`.
pub fn openapi_json() -> Value {
    let mut doc = serde_json::to_value(ApiDoc::openapi())
        .expect("documento OpenAPI deve serializar para JSON");

    inject_descriptor_operations(&mut doc, handlers::demo::compiled_docs());
    wrap_list_responses(&mut doc, &PaginationKeys::default());
    wrap_all_responses(&mut doc, &EnvelopeConfig::default());

    doc
}

// Anexa operations compiladas dos descritores compactos sob `paths`.
fn inject_descriptor_operations(doc: &mut Value, ops: Vec<(&'static str, &'static str, Value)>) {
    let paths = doc["paths"]
        .as_object_mut()
        .expect("documento sem a seção paths");
    for (path, method, operation) in ops {
        paths
            .entry(path.to_string())
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .expect("entrada de path deve ser objeto")
            .insert(method.to_string(), operation);
    }
}

fn wrap_list_responses(doc: &mut Value, keys: &PaginationKeys) {
    for (path, method) in LIST_OPS {
        let schema_slot =
            &mut doc["paths"][*path][*method]["responses"]["200"]["content"]["application/json"]["schema"];
        if schema_slot.is_null() {
            continue;
        }
        let item_schema = schema_slot.take();
        *schema_slot = paginated_response_schema(keys, item_schema);
    }
}

// Toda resposta com corpo JSON documentado passa a exibir o envelope.
fn wrap_all_responses(doc: &mut Value, cfg: &EnvelopeConfig) {
    let Some(paths) = doc["paths"].as_object_mut() else {
        return;
    };
    for operations in paths.values_mut() {
        let Some(operations) = operations.as_object_mut() else {
            continue;
        };
        for operation in operations.values_mut() {
            let Some(responses) = operation["responses"].as_object_mut() else {
                continue;
            };
            for response in responses.values_mut() {
                let schema_slot = &mut response["content"]["application/json"]["schema"];
                if schema_slot.is_null() {
                    continue;
                }
                let inner = schema_slot.take();
                *schema_slot = envelope_schema(cfg, inner);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processed_doc() -> Value {
        openapi_json()
    }

    #[test]
    fn documento_final_monta_sem_falhar() {
        let doc = processed_doc();
        assert!(doc["paths"]["/api/users"]["get"].is_object());
        assert!(doc["paths"]["/api/roles"]["post"].is_object());
        assert_eq!(doc["info"]["title"].as_str().unwrap(), "admin-backend");
    }

    #[test]
    fn operations_do_demo_sao_injetadas() {
        let doc = processed_doc();
        assert!(doc["paths"]["/api/demo"]["get"].is_object());
        assert!(doc["paths"]["/api/demo"]["post"].is_object());
    }

    #[test]
    fn listagem_fica_paginada_e_embrulhada() {
        let doc = processed_doc();
        let schema =
            &doc["paths"]["/api/users"]["get"]["responses"]["200"]["content"]["application/json"]["schema"];
        // camada externa: envelope
        assert!(schema["properties"]["code"].is_object());
        assert!(schema["properties"]["msg"].is_object());
        // camada interna: corpo paginado com as chaves renomeadas
        let data = &schema["properties"]["data"];
        assert!(data["properties"]["total"].is_object());
        assert!(data["properties"]["items"].is_object());
    }

    #[test]
    fn detalhe_fica_so_embrulhado() {
        let doc = processed_doc();
        let schema =
            &doc["paths"]["/api/users/{id}"]["get"]["responses"]["200"]["content"]["application/json"]["schema"];
        assert!(schema["properties"]["code"].is_object());
        assert!(schema["properties"]["data"].is_object());
        assert!(schema["properties"]["data"]["properties"]["total"].is_null());
    }
}
