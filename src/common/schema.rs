// src/common/schema.rs
//
// Compilador de descritores de documentação. Cada campo é declarado de forma
// compacta (tipo, obrigatório, descrição, default, exemplo, enum) e expandido
// em schema OpenAPI cru (`serde_json::Value`); o docs.rs injeta o resultado
// no documento do utoipa na montagem, sem reescrever métodos em runtime.

use serde_json::{Map, Value, json};
use uuid::Uuid;

// Tabela fechada de tokens de tipo. Token desconhecido degrada para Str
// (política de leniência: descritor malformado nunca derruba a documentação).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Bool,
    Float,
    Dict,
    Date,
    DateTime,
    Time,
    Uuid,
    Email,
    Decimal,
    List(Box<FieldKind>),
}

impl FieldKind {
    /// Resolve um token como `"int"` ou `"list[uuid]"`. `list[T]` é recursivo.
    pub fn parse(token: &str) -> FieldKind {
        if let Some(inner) = token
            .strip_prefix("list[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return FieldKind::List(Box::new(FieldKind::parse(inner)));
        }
        match token {
            "str" => FieldKind::Str,
            "int" => FieldKind::Int,
            "bool" => FieldKind::Bool,
            "float" => FieldKind::Float,
            "dict" => FieldKind::Dict,
            "date" => FieldKind::Date,
            "datetime" => FieldKind::DateTime,
            "time" => FieldKind::Time,
            "uuid" => FieldKind::Uuid,
            "email" => FieldKind::Email,
            "decimal" => FieldKind::Decimal,
            _ => FieldKind::Str,
        }
    }

    /// Fragmento de schema OpenAPI do tipo (type + format).
    pub fn schema(&self) -> Value {
        match self {
            FieldKind::Str => json!({"type": "string"}),
            FieldKind::Int => json!({"type": "integer"}),
            FieldKind::Bool => json!({"type": "boolean"}),
            FieldKind::Float => json!({"type": "number"}),
            FieldKind::Dict => json!({"type": "object"}),
            FieldKind::Date => json!({"type": "string", "format": "date"}),
            FieldKind::DateTime => json!({"type": "string", "format": "date-time"}),
            FieldKind::Time => json!({"type": "string", "format": "time"}),
            FieldKind::Uuid => json!({"type": "string", "format": "uuid"}),
            FieldKind::Email => json!({"type": "string", "format": "email"}),
            FieldKind::Decimal => json!({"type": "number"}),
            FieldKind::List(inner) => json!({"type": "array", "items": inner.schema()}),
        }
    }
}

// Forma do campo: escalar (token de tipo) ou estrutura aninhada.
#[derive(Debug, Clone)]
pub enum FieldShape {
    Kind(FieldKind),
    Nested(Vec<(String, FieldSpec)>),
}

// A versão estruturada da tupla compacta, com os slots opcionais à direita.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub shape: FieldShape,
    pub required: bool,
    pub description: String,
    pub default: Option<Value>,
    pub example: Option<Value>,
    pub choices: Option<Vec<Value>>,
}

/// Declara um campo escalar: `field("str", true, "Nome do usuário")`.
pub fn field(token: &str, required: bool, description: &str) -> FieldSpec {
    FieldSpec {
        shape: FieldShape::Kind(FieldKind::parse(token)),
        required,
        description: description.to_string(),
        default: None,
        example: None,
        choices: None,
    }
}

/// Declara um bloco aninhado de campos.
pub fn nested(fields: Vec<(&str, FieldSpec)>, required: bool, description: &str) -> FieldSpec {
    FieldSpec {
        shape: FieldShape::Nested(
            fields
                .into_iter()
                .map(|(name, spec)| (name.to_string(), spec))
                .collect(),
        ),
        required,
        description: description.to_string(),
        default: None,
        example: None,
        choices: None,
    }
}

impl FieldSpec {
    /// Default não nulo torna o campo opcional, mesmo declarado obrigatório.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn example(mut self, value: Value) -> Self {
        self.example = Some(value);
        self
    }

    /// Lista de opções fecha o campo em enum, ignorando o tipo base.
    pub fn choices(mut self, values: Vec<Value>) -> Self {
        self.choices = Some(values);
        self
    }

    fn effective_required(&self) -> bool {
        self.required && self.default.is_none()
    }
}

// Sufixo aleatório para desambiguar nomes de schemas gerados em invocações
// diferentes.
fn random_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..6].to_string()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Compila um campo em schema OpenAPI. `name` só é usado para batizar
/// estruturas aninhadas.
fn compile_field(name: &str, spec: &FieldSpec) -> Value {
    let mut schema = match &spec.shape {
        FieldShape::Nested(fields) => {
            let mut obj = compile_fields(fields);
            obj["title"] = json!(format!("{}Nested_{}", capitalize(name), random_suffix()));
            obj
        }
        FieldShape::Kind(kind) => match &spec.choices {
            // Enum sobrepõe o tipo base: vira campo de escolha fechada.
            Some(values) => json!({"type": "string", "enum": values}),
            None => kind.schema(),
        },
    };

    let mut description = spec.description.clone();
    if let Some(example) = &spec.example {
        if !description.is_empty() {
            description.push(' ');
        }
        description.push_str(&format!("Exemplo: {}", example));
    }
    if !description.is_empty() {
        schema["description"] = json!(description);
    }
    if let Some(default) = &spec.default {
        schema["default"] = default.clone();
    }
    schema
}

/// Compila um conjunto de campos em um schema de objeto com `properties`
/// e a lista `required`.
pub fn compile_fields(fields: &[(String, FieldSpec)]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for (name, spec) in fields {
        if spec.effective_required() {
            required.push(json!(name));
        }
        properties.insert(name.clone(), compile_field(name, spec));
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

// Declaração completa de um endpoint: resumo, parâmetros, corpo e respostas
// por status. É o objeto de configuração anexado à rota na montagem da doc.
#[derive(Debug, Clone, Default)]
pub struct EndpointDoc {
    pub summary: String,
    pub tag: Option<String>,
    pub parameters: Vec<(String, FieldSpec)>,
    pub request_body: Option<Vec<(String, FieldSpec)>>,
    pub responses: Vec<(u16, Vec<(String, FieldSpec)>)>,
}

impl EndpointDoc {
    pub fn new(summary: &str) -> Self {
        Self {
            summary: summary.to_string(),
            ..Self::default()
        }
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn parameter(mut self, name: &str, spec: FieldSpec) -> Self {
        self.parameters.push((name.to_string(), spec));
        self
    }

    pub fn request_body(mut self, fields: Vec<(&str, FieldSpec)>) -> Self {
        self.request_body = Some(
            fields
                .into_iter()
                .map(|(name, spec)| (name.to_string(), spec))
                .collect(),
        );
        self
    }

    pub fn response(mut self, status: u16, fields: Vec<(&str, FieldSpec)>) -> Self {
        self.responses.push((
            status,
            fields
                .into_iter()
                .map(|(name, spec)| (name.to_string(), spec))
                .collect(),
        ));
        self
    }

    /// Expande a declaração em uma operation OpenAPI crua.
    pub fn into_operation(&self) -> Value {
        let parameters: Vec<Value> = self
            .parameters
            .iter()
            .map(|(name, spec)| {
                let token_schema = match &spec.shape {
                    // Em query só entra tipo primitivo; lista degrada
                    // para objeto.
                    FieldShape::Kind(FieldKind::List(_)) => FieldKind::Dict.schema(),
                    FieldShape::Kind(kind) => kind.schema(),
                    FieldShape::Nested(_) => FieldKind::Dict.schema(),
                };
                json!({
                    "name": name,
                    "in": "query",
                    "required": spec.effective_required(),
                    "description": spec.description,
                    "schema": token_schema,
                })
            })
            .collect();

        let mut operation = Map::new();
        operation.insert("summary".to_string(), json!(self.summary));
        if let Some(tag) = &self.tag {
            operation.insert("tags".to_string(), json!([tag]));
        }
        if !parameters.is_empty() {
            operation.insert("parameters".to_string(), json!(parameters));
        }

        if let Some(body_fields) = &self.request_body {
            let mut schema = compile_fields(body_fields);
            schema["title"] = json!(format!("Req_{}", random_suffix()));
            operation.insert(
                "requestBody".to_string(),
                json!({
                    "required": true,
                    "content": {"application/json": {"schema": schema}},
                }),
            );
        }

        let mut responses = Map::new();
        for (status, fields) in &self.responses {
            let mut schema = compile_fields(fields);
            schema["title"] = json!(format!("Resp{}_{}", status, random_suffix()));
            responses.insert(
                status.to_string(),
                json!({
                    "description": "",
                    "content": {"application/json": {"schema": schema}},
                }),
            );
        }
        if responses.is_empty() {
            // OpenAPI exige ao menos uma resposta declarada.
            responses.insert("200".to_string(), json!({"description": ""}));
        }
        operation.insert("responses".to_string(), Value::Object(responses));

        Value::Object(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_desconhecido_degrada_para_string() {
        assert_eq!(FieldKind::parse("qualquercoisa"), FieldKind::Str);
        assert_eq!(FieldKind::parse(""), FieldKind::Str);
    }

    #[test]
    fn list_de_int_valida_os_filhos_como_inteiros() {
        let kind = FieldKind::parse("list[int]");
        assert_eq!(kind, FieldKind::List(Box::new(FieldKind::Int)));
        let schema = kind.schema();
        assert_eq!(schema["type"], json!("array"));
        assert_eq!(schema["items"]["type"], json!("integer"));
    }

    #[test]
    fn list_aninhada_recursiva() {
        let kind = FieldKind::parse("list[list[uuid]]");
        let schema = kind.schema();
        assert_eq!(schema["items"]["items"]["format"], json!("uuid"));
    }

    #[test]
    fn default_nao_nulo_forca_campo_opcional() {
        let fields = vec![(
            "page".to_string(),
            field("int", true, "Página").default_value(json!(1)),
        )];
        let schema = compile_fields(&fields);
        assert_eq!(schema["required"], json!([]));
        assert_eq!(schema["properties"]["page"]["default"], json!(1));
    }

    #[test]
    fn enum_sobrepoe_o_tipo_base() {
        let spec = field("int", true, "Sexo").choices(vec![json!("male"), json!("female")]);
        let schema = compile_field("gender", &spec);
        assert_eq!(schema["type"], json!("string"));
        assert_eq!(schema["enum"], json!(["male", "female"]));
    }

    #[test]
    fn exemplo_e_anexado_a_descricao() {
        let spec = field("str", true, "Nome").example(json!("Maria"));
        let schema = compile_field("name", &spec);
        assert_eq!(schema["description"], json!("Nome Exemplo: \"Maria\""));
    }

    #[test]
    fn aninhado_ganha_titulo_com_sufixo() {
        let spec = nested(
            vec![("school", field("str", true, "Escola"))],
            true,
            "Bloco aninhado",
        );
        let schema = compile_field("nested_info", &spec);
        let title = schema["title"].as_str().unwrap();
        assert!(title.starts_with("Nested_infoNested_"));
        assert_eq!(
            schema["properties"]["school"]["type"],
            json!("string")
        );
    }

    #[test]
    fn titulos_gerados_nao_colidem_entre_invocacoes() {
        let spec = nested(vec![("a", field("str", false, ""))], false, "");
        let first = compile_field("x", &spec);
        let second = compile_field("x", &spec);
        assert_ne!(first["title"], second["title"]);
    }

    #[test]
    fn parametros_compilam_com_tipo_primitivo() {
        let op = EndpointDoc::new("Exemplo")
            .parameter("name", field("str", true, "Nome do usuário"))
            .parameter("idade", field("int", false, "Idade"))
            .into_operation();
        let params = op["parameters"].as_array().unwrap();
        assert_eq!(params[0]["in"], json!("query"));
        assert_eq!(params[0]["required"], json!(true));
        assert_eq!(params[1]["schema"]["type"], json!("integer"));
    }

    #[test]
    fn respostas_por_status_ganham_schema_nomeado() {
        let op = EndpointDoc::new("Exemplo")
            .response(200, vec![("msg", field("str", true, ""))])
            .into_operation();
        let schema = &op["responses"]["200"]["content"]["application/json"]["schema"];
        assert!(schema["title"].as_str().unwrap().starts_with("Resp200_"));
        assert_eq!(schema["properties"]["msg"]["type"], json!("string"));
    }

    #[test]
    fn parametro_com_token_de_lista_degrada_para_objeto() {
        let op = EndpointDoc::new("Exemplo")
            .parameter("tags", field("list[str]", false, "Lista de tags"))
            .into_operation();
        assert_eq!(op["parameters"][0]["schema"]["type"], json!("object"));
    }
}
