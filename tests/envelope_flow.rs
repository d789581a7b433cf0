// tests/envelope_flow.rs
//
// Exercita o middleware do envelope de ponta a ponta com requisições
// montadas à mão, sem subir servidor nem banco.

use axum::{
    Json, Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use admin_backend::common::envelope::{EnvelopeConfig, build_response, envelope_layer};

async fn plain_handler() -> impl IntoResponse {
    Json(json!({"id": 7, "username": "maria"}))
}

async fn preformatted_handler() -> impl IntoResponse {
    let cfg = EnvelopeConfig::default();
    Json(build_response(&cfg, Some(json!({"id": 23})), Some(23), None))
}

async fn error_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"detail": "Usuário não encontrado."})),
    )
}

async fn error_without_detail_handler() -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, Json(json!({"errors": {"name": "obrigatório"}})))
}

async fn text_handler() -> impl IntoResponse {
    "OK"
}

async fn echo_handler(Json(body): Json<Value>) -> impl IntoResponse {
    Json(body)
}

async fn text_error_handler() -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, "boom")
}

fn app() -> Router {
    let cfg = EnvelopeConfig::default();
    Router::new()
        .route("/plain", get(plain_handler))
        .route("/preformatted", get(preformatted_handler))
        .route("/missing", get(error_handler))
        .route("/invalid", get(error_without_detail_handler))
        .route("/health", get(text_handler))
        .route("/echo", post(echo_handler))
        .route("/boom", get(text_error_handler))
        .layer(axum_middleware::from_fn_with_state(cfg.clone(), envelope_layer))
        .with_state(cfg)
}

async fn get_body(path: &str) -> (StatusCode, Vec<u8>) {
    let response = app()
        .oneshot(
            Request::builder()
                .uri(path)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn sucesso_embrulha_na_ordem_code_msg_data() {
    let (status, body) = get_body("/plain").await;
    assert_eq!(status, StatusCode::OK);

    // ordem textual dos campos, não só o conteúdo
    let text = String::from_utf8(body.clone()).unwrap();
    assert!(text.starts_with(r#"{"code":200,"msg":"ok","data":"#));

    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["data"]["username"], json!("maria"));
}

#[tokio::test]
async fn pre_formatado_passa_sem_reembrulhar() {
    let (status, body) = get_body("/preformatted").await;
    assert_eq!(status, StatusCode::OK);

    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["code"], json!(23));
    assert_eq!(value["data"], json!({"id": 23}));
    // um segundo embrulho deixaria o envelope dentro de data
    assert!(value["data"].get("code").is_none());
}

#[tokio::test]
async fn erro_vira_envelope_com_detail_em_msg() {
    let (status, body) = get_body("/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["code"], json!(404));
    assert_eq!(value["msg"], json!("Usuário não encontrado."));
    assert_eq!(value["data"], Value::Null);
}

#[tokio::test]
async fn erro_sem_detail_usa_mensagem_fixa() {
    let (status, body) = get_body("/invalid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["code"], json!(400));
    assert_eq!(value["msg"], json!("error"));
}

#[tokio::test]
async fn rejeicao_de_extractor_vira_envelope() {
    // Corpo inválido faz o extractor Json responder 400 com texto puro;
    // o middleware precisa devolver isso no formato de três campos.
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["code"], json!(400));
    assert!(!value["msg"].as_str().unwrap().is_empty());
    assert_eq!(value["data"], Value::Null);
}

#[tokio::test]
async fn erro_com_corpo_de_texto_vira_envelope() {
    let (status, body) = get_body("/boom").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["code"], json!(400));
    assert_eq!(value["msg"], json!("boom"));
}

#[tokio::test]
async fn corpo_nao_json_passa_intacto() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        !response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"OK");
}
