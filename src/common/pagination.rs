// src/common/pagination.rs
//
// Paginação por número de página com campos de saída renomeáveis.
// O mapeamento padrão troca count/next/previous/results por
// total/next_page/prev_page/items; chaves sem mapeamento mantêm o nome.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::IntoParams;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

// Parâmetros de querystring aceitos pelos endpoints de listagem.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Número da página (começa em 1)
    pub page: Option<u32>,
    /// Quantidade de itens por página (máximo 100)
    pub page_size: Option<u32>,
}

// Parâmetros já saneados: página mínima 1, tamanho entre 1 e 100.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: u32,
    pub page_size: u32,
}

impl PageParams {
    pub fn from_query(query: &PageQuery) -> Self {
        Self {
            page: query.page.unwrap_or(1).max(1),
            page_size: query
                .page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Força um tamanho de página fixo (usado pela action de usuários ativos).
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }
}

// Tabela de renomeação dos campos de paginação.
#[derive(Debug, Clone)]
pub struct PaginationKeys {
    map: HashMap<&'static str, String>,
}

impl Default for PaginationKeys {
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert("count", "total".to_string());
        map.insert("next", "next_page".to_string());
        map.insert("previous", "prev_page".to_string());
        map.insert("results", "items".to_string());
        Self { map }
    }
}

impl PaginationKeys {
    /// Sobrescreve o nome externo de um campo lógico.
    pub fn rename(mut self, original: &'static str, external: &str) -> Self {
        self.map.insert(original, external.to_string());
        self
    }

    /// Nome externo do campo; sem mapeamento, mantém o nome original.
    pub fn key<'a>(&'a self, name: &'a str) -> &'a str {
        self.map.get(name).map(String::as_str).unwrap_or(name)
    }
}

// Uma página de resultados vinda do repositório.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub count: i64,
    pub params: PageParams,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    fn has_next(&self) -> bool {
        i64::from(self.params.page) * i64::from(self.params.page_size) < self.count
    }

    fn has_previous(&self) -> bool {
        self.params.page > 1
    }
}

// Link relativo com a querystring completa: página e tamanho recalculados,
// os demais parâmetros da requisição preservados (filtros de busca inclusos).
fn page_link(path: &str, page: u32, page_size: u32, query: &[(String, String)]) -> Value {
    let mut pairs: Vec<(&str, String)> = vec![
        ("page", page.to_string()),
        ("page_size", page_size.to_string()),
    ];
    for (name, value) in query {
        if name != "page" && name != "page_size" {
            pairs.push((name.as_str(), value.clone()));
        }
    }
    let encoded = serde_urlencoded::to_string(&pairs).unwrap_or_default();
    json!(format!("{}?{}", path, encoded))
}

/// Monta o corpo paginado com os quatro campos renomeados. Links de
/// próxima/anterior ficam nulos nas bordas e carregam a querystring da
/// requisição com a página trocada.
pub fn paginated_body<T: Serialize>(
    keys: &PaginationKeys,
    page: &Page<T>,
    path: &str,
    query: &[(String, String)],
) -> Value {
    let next = if page.has_next() {
        page_link(path, page.params.page + 1, page.params.page_size, query)
    } else {
        Value::Null
    };
    let previous = if page.has_previous() {
        page_link(path, page.params.page - 1, page.params.page_size, query)
    } else {
        Value::Null
    };

    let mut body = serde_json::Map::new();
    body.insert(keys.key("count").to_string(), json!(page.count));
    body.insert(keys.key("next").to_string(), next);
    body.insert(keys.key("previous").to_string(), previous);
    body.insert(
        keys.key("results").to_string(),
        serde_json::to_value(&page.items).unwrap_or_else(|_| Value::Array(Vec::new())),
    );
    Value::Object(body)
}

/// Schema OpenAPI do corpo paginado, com o schema do item no slot de
/// resultados. Total e lista são obrigatórios; links são strings uri nuláveis.
pub fn paginated_response_schema(keys: &PaginationKeys, item_schema: Value) -> Value {
    json!({
        "type": "object",
        "required": [keys.key("count"), keys.key("results")],
        "properties": {
            keys.key("count"): {
                "type": "integer",
                "example": 123,
            },
            keys.key("next"): {
                "type": "string",
                "nullable": true,
                "format": "uri",
                "example": "?page=4",
            },
            keys.key("previous"): {
                "type": "string",
                "nullable": true,
                "format": "uri",
                "example": "?page=2",
            },
            keys.key("results"): item_schema,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: u32, page_size: u32) -> PageParams {
        PageParams { page, page_size }
    }

    #[test]
    fn tamanho_de_pagina_padrao_e_10() {
        let p = PageParams::from_query(&PageQuery::default());
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 10);
    }

    #[test]
    fn tamanho_acima_de_100_e_truncado() {
        let p = PageParams::from_query(&PageQuery {
            page: Some(2),
            page_size: Some(500),
        });
        assert_eq!(p.page_size, 100);
        assert_eq!(p.offset(), 100);
    }

    #[test]
    fn pagina_zero_vira_pagina_1() {
        let p = PageParams::from_query(&PageQuery {
            page: Some(0),
            page_size: None,
        });
        assert_eq!(p.page, 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn corpo_usa_os_nomes_renomeados_padrao() {
        let page = Page {
            count: 25,
            params: params(2, 10),
            items: vec![1, 2, 3],
        };
        let body = paginated_body(&PaginationKeys::default(), &page, "/api/users", &[]);
        assert_eq!(body["total"], json!(25));
        assert_eq!(body["items"], json!([1, 2, 3]));
        assert_eq!(body["next_page"], json!("/api/users?page=3&page_size=10"));
        assert_eq!(body["prev_page"], json!("/api/users?page=1&page_size=10"));
    }

    #[test]
    fn links_sao_nulos_nas_bordas() {
        let page = Page {
            count: 3,
            params: params(1, 10),
            items: vec![1, 2, 3],
        };
        let body = paginated_body(&PaginationKeys::default(), &page, "/api/users", &[]);
        assert_eq!(body["next_page"], Value::Null);
        assert_eq!(body["prev_page"], Value::Null);
    }

    #[test]
    fn sobrescrever_o_mapeamento_muda_so_os_nomes() {
        let keys = PaginationKeys::default().rename("count", "quantidade");
        let page = Page {
            count: 7,
            params: params(1, 10),
            items: vec!["a"],
        };
        let body = paginated_body(&keys, &page, "/x", &[]);
        assert_eq!(body["quantidade"], json!(7));
        assert!(body.get("total").is_none());
        assert_eq!(body["items"], json!(["a"]));
    }

    #[test]
    fn links_preservam_os_filtros_da_busca() {
        let page = Page {
            count: 25,
            params: params(2, 10),
            items: vec![1],
        };
        let query = vec![
            ("page".to_string(), "2".to_string()),
            ("username".to_string(), "maria".to_string()),
        ];
        let body = paginated_body(&PaginationKeys::default(), &page, "/api/users", &query);
        // page/page_size são recalculados; o filtro segue junto
        assert_eq!(
            body["next_page"],
            json!("/api/users?page=3&page_size=10&username=maria")
        );
        assert_eq!(
            body["prev_page"],
            json!("/api/users?page=1&page_size=10&username=maria")
        );
    }

    #[test]
    fn valores_de_filtro_saem_codificados_no_link() {
        let page = Page {
            count: 25,
            params: params(2, 10),
            items: vec![1],
        };
        let query = vec![("first_name".to_string(), "maria clara".to_string())];
        let body = paginated_body(&PaginationKeys::default(), &page, "/api/users", &query);
        assert_eq!(
            body["next_page"],
            json!("/api/users?page=3&page_size=10&first_name=maria+clara")
        );
    }

    #[test]
    fn chave_sem_mapeamento_mantem_o_nome() {
        let keys = PaginationKeys::default();
        assert_eq!(keys.key("desconhecida"), "desconhecida");
    }

    #[test]
    fn schema_exige_total_e_items() {
        let keys = PaginationKeys::default();
        let schema = paginated_response_schema(&keys, json!({"type": "array"}));
        assert_eq!(schema["required"], json!(["total", "items"]));
        assert_eq!(schema["properties"]["next_page"]["nullable"], json!(true));
        assert_eq!(schema["properties"]["items"], json!({"type": "array"}));
    }
}
