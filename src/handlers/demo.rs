// src/handlers/demo.rs
//
// Grupo de endpoints de demonstração do template de resposta e do
// compilador de descritores: o GET devolve um envelope pré-formatado
// (passa intacto pelo middleware) e o POST devolve payload cru (o
// middleware embrulha). A documentação dos dois é declarada inteira
// pelos descritores compactos, não pelas macros do utoipa.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{
        envelope::build_response,
        error::AppError,
        schema::{EndpointDoc, field, nested},
    },
    config::AppState,
};

#[derive(Debug, Deserialize)]
pub struct DemoQuery {
    pub name: String,
    pub age: Option<i32>,
}

// GET /api/demo
pub async fn demo_get(
    State(app_state): State<AppState>,
    Query(query): Query<DemoQuery>,
) -> Result<impl IntoResponse, AppError> {
    tracing::debug!("demo_get chamado por {} ({:?})", query.name, query.age);

    // Resposta já no formato de três campos, com código fora do padrão
    // de propósito: o middleware deve repassar sem mexer.
    let envelope = build_response(
        &app_state.envelope,
        Some(json!({"id": 23})),
        Some(23),
        None,
    );
    Ok(Json(envelope))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DemoNestedInfo {
    pub school: String,
    pub grade: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DemoBody {
    pub name: String,
    pub email: Option<String>,
    pub birthdays: Option<Vec<NaiveDate>>,
    pub tags: Option<Vec<String>>,
    pub uuid_list: Option<Vec<Uuid>>,
    pub score: Option<Decimal>,
    pub gender: Option<String>,
    pub nested_info: Option<DemoNestedInfo>,
}

// POST /api/demo
pub async fn demo_post(
    State(_app_state): State<AppState>,
    Json(body): Json<DemoBody>,
) -> Result<impl IntoResponse, AppError> {
    // Eco dos campos derivados; o middleware embrulha no envelope
    let data = json!({
        "id": 1001,
        "username": body.name,
        "roles": ["admin", "user"],
    });
    Ok(Json(data))
}

/// Documentação do grupo, declarada como objetos de configuração anexados
/// na montagem do documento (nenhuma reescrita de handler em runtime).
pub fn endpoint_docs() -> Vec<(&'static str, &'static str, EndpointDoc)> {
    let get_doc = EndpointDoc::new("Exemplo de GET com parâmetros declarados")
        .tag("Demo")
        .parameter("name", field("str", true, "Nome do usuário"))
        .parameter("age", field("int", false, "Idade"))
        .response(
            200,
            vec![
                ("msg", field("str", true, "Mensagem")),
                (
                    "payload",
                    nested(
                        vec![
                            ("custom_code", field("int", true, "Código customizado")),
                            ("msg", field("str", true, "Mensagem")),
                            ("payload", field("dict", true, "Payload livre")),
                        ],
                        true,
                        "Bloco aninhado",
                    ),
                ),
            ],
        );

    let post_doc = EndpointDoc::new("Exemplo completo: parâmetros + corpo + resposta")
        .tag("Demo")
        .parameter("keyword", field("str", true, "Palavra-chave de busca").example(json!("inteligência artificial")))
        .parameter("page", field("int", false, "Número da página").default_value(json!(1)).example(json!(1)))
        .parameter("page_size", field("int", false, "Itens por página").default_value(json!(10)).example(json!(10)))
        .parameter("active", field("bool", false, "Flag de ativo").default_value(json!(true)))
        .parameter("filter_date", field("date", false, "Data de corte").example(json!("2024-05-20")))
        .request_body(vec![
            ("name", field("str", true, "Nome do usuário").example(json!("Maria"))),
            ("email", field("email", false, "Endereço de e-mail").example(json!("maria@exemplo.com"))),
            ("birthdays", field("list[date]", false, "Datas de aniversário")),
            ("tags", field("list[str]", false, "Lista de tags")),
            ("uuid_list", field("list[uuid]", false, "Lista de UUIDs")),
            ("score", field("decimal", false, "Pontuação").default_value(json!("98.5"))),
            (
                "gender",
                field("str", true, "Sexo")
                    .example(json!("male"))
                    .choices(vec![json!("male"), json!("female"), json!("other")]),
            ),
            (
                "nested_info",
                nested(
                    vec![
                        ("school", field("str", true, "Nome da escola")),
                        ("grade", field("int", false, "Série").default_value(json!(3))),
                    ],
                    true,
                    "Informações aninhadas",
                ),
            ),
        ])
        .response(
            200,
            vec![
                ("code", field("int", true, "Código de status").default_value(json!(0))),
                ("msg", field("str", true, "Mensagem").default_value(json!("ok"))),
                (
                    "data",
                    nested(
                        vec![
                            ("user_id", field("uuid", true, "ID do usuário")),
                            ("created_at", field("datetime", true, "Criado em")),
                            ("roles", field("list[str]", false, "Lista de cargos")),
                        ],
                        true,
                        "",
                    ),
                ),
            ],
        );

    vec![
        ("/api/demo", "get", get_doc),
        ("/api/demo", "post", post_doc),
    ]
}

/// Operations prontas para injetar no documento OpenAPI.
pub fn compiled_docs() -> Vec<(&'static str, &'static str, Value)> {
    endpoint_docs()
        .into_iter()
        .map(|(path, method, doc)| (path, method, doc.into_operation()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grupo_declara_as_duas_operations() {
        let docs = compiled_docs();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].0, "/api/demo");
        assert_eq!(docs[0].1, "get");
    }

    #[test]
    fn post_compila_o_corpo_com_enum_e_aninhado() {
        let (_, _, op) = compiled_docs().into_iter().nth(1).unwrap();
        let schema = &op["requestBody"]["content"]["application/json"]["schema"];
        assert_eq!(schema["properties"]["gender"]["enum"], json!(["male", "female", "other"]));
        // default não nulo some da lista de obrigatórios
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("name")));
        assert!(!required.contains(&json!("score")));
        // aninhado vira objeto com as próprias properties
        assert_eq!(
            schema["properties"]["nested_info"]["properties"]["school"]["type"],
            json!("string")
        );
    }

    #[test]
    fn parametros_do_get_compilam_em_query() {
        let (_, _, op) = compiled_docs().into_iter().next().unwrap();
        let params = op["parameters"].as_array().unwrap();
        assert_eq!(params[0]["name"], json!("name"));
        assert_eq!(params[0]["required"], json!(true));
        assert_eq!(params[1]["schema"]["type"], json!("integer"));
    }
}
