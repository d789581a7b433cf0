// src/common/envelope.rs
//
// Envelope de resposta de três campos `{code, msg, data}`. Todo handler da
// API responde o payload "cru" e o middleware daqui normaliza o corpo para o
// formato do template, igual para sucesso e para erro.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Ordem fixa dos campos do envelope. O campo cujo default configurado é
/// nulo é o slot de `data`.
pub const ENVELOPE_FIELDS: [&str; 3] = ["code", "msg", "data"];

// Configuração estática do template de resposta.
#[derive(Debug, Clone)]
pub struct EnvelopeConfig {
    pub code_default: i64,
    pub msg_default: String,
    /// Mensagem usada quando uma resposta de erro não traz campo `detail`.
    pub error_msg: String,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            code_default: 200,
            msg_default: "ok".to_string(),
            error_msg: "error".to_string(),
        }
    }
}

// A ordem de serialização segue a declaração dos campos, então o JSON sai
// sempre como code, msg, data.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Envelope {
    #[schema(example = 200)]
    pub code: i64,
    #[schema(example = "ok")]
    pub msg: String,
    pub data: Value,
}

/// Monta o envelope a partir dos valores opcionais, aplicando os defaults
/// configurados (code 200, msg "ok", data nulo).
pub fn build_response(
    cfg: &EnvelopeConfig,
    data: Option<Value>,
    code: Option<i64>,
    message: Option<&str>,
) -> Envelope {
    Envelope {
        code: code.unwrap_or(cfg.code_default),
        msg: message.unwrap_or(&cfg.msg_default).to_string(),
        data: data.unwrap_or(Value::Null),
    }
}

/// Payload que já contém os três campos do envelope é tratado como
/// pré-formatado e passa sem alteração.
pub fn is_preformatted(payload: &Value) -> bool {
    match payload {
        Value::Object(map) => ENVELOPE_FIELDS.iter().all(|key| map.contains_key(*key)),
        _ => false,
    }
}

/// Decide como reformatar um corpo JSON. `None` significa passar o corpo
/// original adiante (já pré-formatado).
///
/// Para status fora de 2xx, `code` recebe o status HTTP e `msg` o campo
/// `detail` quando presente; sem `detail`, cai na mensagem fixa de erro.
pub fn reshape_payload(
    cfg: &EnvelopeConfig,
    status: StatusCode,
    payload: &Value,
) -> Option<Envelope> {
    if is_preformatted(payload) {
        return None;
    }

    if !status.is_success() {
        let detail = payload.get("detail").and_then(Value::as_str);
        let msg = detail.unwrap_or(&cfg.error_msg);
        return Some(build_response(cfg, None, Some(status.as_u16() as i64), Some(msg)));
    }

    Some(build_response(cfg, Some(payload.clone()), None, None))
}

/// Middleware que embrulha toda resposta JSON no envelope. Corpos de sucesso
/// que não são JSON (Swagger UI, health check, 204) passam intactos; erros
/// 4xx/5xx sem corpo JSON (rejeições de extractor saem como texto puro)
/// também viram envelope, com o texto do corpo em `msg`.
pub async fn envelope_layer(
    State(cfg): State<EnvelopeConfig>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.as_bytes().starts_with(b"application/json"))
        .unwrap_or(false);
    let status = response.status();
    if !is_json && !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("Falha ao ler o corpo da resposta: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if !is_json {
        let text = String::from_utf8_lossy(&bytes);
        let trimmed = text.trim();
        let msg = if trimmed.is_empty() { cfg.error_msg.as_str() } else { trimmed };
        let envelope = build_response(&cfg, None, Some(status.as_u16() as i64), Some(msg));
        return rewrap(parts, &envelope);
    }

    let payload: Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        // Content-type diz JSON mas o corpo não parseia: devolve como veio.
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };

    match reshape_payload(&cfg, parts.status, &payload) {
        None => Response::from_parts(parts, Body::from(bytes)),
        Some(envelope) => rewrap(parts, &envelope),
    }
}

fn rewrap(mut parts: axum::http::response::Parts, envelope: &Envelope) -> Response {
    // O tamanho do corpo mudou; o novo content-length sai do hyper.
    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    let encoded = serde_json::to_vec(envelope).unwrap_or_default();
    Response::from_parts(parts, Body::from(encoded))
}

/// Schema OpenAPI do envelope, com o schema original no slot de `data`.
/// Usado pelo hook de pós-processamento da documentação.
pub fn envelope_schema(cfg: &EnvelopeConfig, data_schema: Value) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "code": { "type": "integer", "example": cfg.code_default },
            "msg": { "type": "string", "example": cfg.msg_default },
            "data": data_schema,
        },
        "required": ENVELOPE_FIELDS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg() -> EnvelopeConfig {
        EnvelopeConfig::default()
    }

    #[test]
    fn envelope_serializa_na_ordem_fixa() {
        let env = build_response(&cfg(), Some(json!({"id": 23})), Some(23), None);
        let encoded = serde_json::to_string(&env).unwrap();
        assert_eq!(encoded, r#"{"code":23,"msg":"ok","data":{"id":23}}"#);
    }

    #[test]
    fn defaults_sao_200_ok_e_nulo() {
        let env = build_response(&cfg(), None, None, None);
        assert_eq!(env.code, 200);
        assert_eq!(env.msg, "ok");
        assert_eq!(env.data, Value::Null);
    }

    #[test]
    fn payload_pre_formatado_passa_intacto() {
        let payload = json!({"code": 200, "msg": "ok", "data": null});
        assert!(reshape_payload(&cfg(), StatusCode::OK, &payload).is_none());
    }

    #[test]
    fn faltando_campo_do_envelope_nao_e_pre_formatado() {
        let payload = json!({"code": 200, "msg": "ok"});
        assert!(!is_preformatted(&payload));
        assert!(!is_preformatted(&json!([1, 2, 3])));
    }

    #[test]
    fn erro_copia_o_status_para_code() {
        let payload = json!({"detail": "Usuário não encontrado."});
        let env = reshape_payload(&cfg(), StatusCode::NOT_FOUND, &payload).unwrap();
        assert_eq!(env.code, 404);
        assert_eq!(env.msg, "Usuário não encontrado.");
        assert_eq!(env.data, Value::Null);
    }

    #[test]
    fn erro_sem_detail_usa_mensagem_fixa() {
        let payload = json!({"outra_coisa": 1});
        let env = reshape_payload(&cfg(), StatusCode::BAD_GATEWAY, &payload).unwrap();
        assert_eq!(env.code, 502);
        assert_eq!(env.msg, "error");
    }

    #[test]
    fn sucesso_embrulha_o_payload_em_data() {
        let payload = json!([{"id": 1}]);
        let env = reshape_payload(&cfg(), StatusCode::OK, &payload).unwrap();
        assert_eq!(env.code, 200);
        assert_eq!(env.data, payload);
    }

    #[test]
    fn schema_do_envelope_poe_o_original_em_data() {
        let schema = envelope_schema(&cfg(), json!({"type": "string"}));
        assert_eq!(schema["required"], json!(["code", "msg", "data"]));
        assert_eq!(schema["properties"]["data"], json!({"type": "string"}));
        assert_eq!(schema["properties"]["code"]["example"], json!(200));
    }
}
