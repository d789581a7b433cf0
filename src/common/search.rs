// src/common/search.rs
//
// Busca ad-hoc das listagens: qualquer parâmetro de query cujo nome bate com
// um campo pesquisável vira filtro de substring (ILIKE), combinado com AND.
// Campos de período recebem dois valores repetidos `campo[]=inicio&campo[]=fim`.
// Parâmetro desconhecido é ignorado, nunca é erro.

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    // (coluna, termo): colunas só entram vindas da whitelist
    terms: Vec<(String, String)>,
    ranges: Vec<(String, DateTime<Utc>, DateTime<Utc>)>,
}

/// Aceita ISO 8601 com ou sem fuso; sem fuso, normaliza para UTC
/// (o fuso padrão do servidor).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

impl SearchFilter {
    /// Interpreta os parâmetros crus da querystring contra as duas
    /// whitelists de colunas.
    pub fn parse(
        params: &[(String, String)],
        searchable: &[&str],
        time_range: &[&str],
    ) -> Self {
        let mut terms = Vec::new();
        for (name, value) in params {
            if searchable.contains(&name.as_str())
                && !time_range.contains(&name.as_str())
                && !value.is_empty()
            {
                terms.push((name.clone(), value.clone()));
            }
        }

        let mut ranges = Vec::new();
        for column in time_range {
            let param_name = format!("{}[]", column);
            let values: Vec<&str> = params
                .iter()
                .filter(|(name, _)| name == &param_name)
                .map(|(_, value)| value.as_str())
                .collect();
            // Exige exatamente dois valores parseáveis; senão o filtro é pulado.
            if values.len() == 2 {
                if let (Some(start), Some(end)) =
                    (parse_timestamp(values[0]), parse_timestamp(values[1]))
                {
                    ranges.push((column.to_string(), start, end));
                }
            }
        }

        Self { terms, ranges }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.ranges.is_empty()
    }

    /// Anexa a cláusula WHERE ao builder, com os valores via bind.
    /// `start_with_where` permite encadear depois de um filtro fixo.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>, start_with_where: bool) {
        let mut separator = if start_with_where { " WHERE " } else { " AND " };
        for (column, term) in &self.terms {
            qb.push(separator);
            qb.push(column.as_str());
            qb.push(" ILIKE ");
            qb.push_bind(format!("%{}%", term));
            separator = " AND ";
        }
        for (column, start, end) in &self.ranges {
            qb.push(separator);
            qb.push(column.as_str());
            qb.push(" BETWEEN ");
            qb.push_bind(*start);
            qb.push(" AND ");
            qb.push_bind(*end);
            separator = " AND ";
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    const SEARCHABLE: &[&str] = &["username", "email"];
    const TIME_RANGE: &[&str] = &["date_joined"];

    #[test]
    fn parametro_fora_da_whitelist_e_ignorado() {
        let filter = SearchFilter::parse(
            &params(&[("senha", "x"), ("username", "maria")]),
            SEARCHABLE,
            TIME_RANGE,
        );
        assert_eq!(filter.terms, vec![("username".to_string(), "maria".to_string())]);
    }

    #[test]
    fn valor_vazio_nao_vira_filtro() {
        let filter = SearchFilter::parse(&params(&[("username", "")]), SEARCHABLE, TIME_RANGE);
        assert!(filter.is_empty());
    }

    #[test]
    fn periodo_com_um_so_valor_e_pulado() {
        let filter = SearchFilter::parse(
            &params(&[("date_joined[]", "2022-01-01T00:00:00")]),
            SEARCHABLE,
            TIME_RANGE,
        );
        assert!(filter.ranges.is_empty());
    }

    #[test]
    fn periodo_com_valor_invalido_e_pulado() {
        let filter = SearchFilter::parse(
            &params(&[
                ("date_joined[]", "2022-01-01T00:00:00"),
                ("date_joined[]", "nao-e-data"),
            ]),
            SEARCHABLE,
            TIME_RANGE,
        );
        assert!(filter.ranges.is_empty());
    }

    #[test]
    fn periodo_completo_entra_no_filtro() {
        let filter = SearchFilter::parse(
            &params(&[
                ("date_joined[]", "2022-01-01T00:00:00"),
                ("date_joined[]", "2022-12-31T23:59:59"),
            ]),
            SEARCHABLE,
            TIME_RANGE,
        );
        assert_eq!(filter.ranges.len(), 1);
        assert_eq!(filter.ranges[0].0, "date_joined");
    }

    #[test]
    fn timestamp_sem_fuso_normaliza_para_utc() {
        let parsed = parse_timestamp("2022-06-01T12:00:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2022-06-01T12:00:00+00:00");
    }

    #[test]
    fn timestamp_com_fuso_e_convertido() {
        let parsed = parse_timestamp("2022-06-01T12:00:00-03:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2022-06-01T15:00:00+00:00");
    }

    #[test]
    fn clausula_where_combina_com_and() {
        let filter = SearchFilter::parse(
            &params(&[
                ("username", "maria"),
                ("email", "@exemplo"),
                ("date_joined[]", "2022-01-01T00:00:00"),
                ("date_joined[]", "2022-12-31T23:59:59"),
            ]),
            SEARCHABLE,
            TIME_RANGE,
        );
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT * FROM users");
        filter.push_where(&mut qb, true);
        let sql = qb.sql();
        assert!(sql.contains("WHERE username ILIKE $1"));
        assert!(sql.contains("AND email ILIKE $2"));
        assert!(sql.contains("AND date_joined BETWEEN $3 AND $4"));
    }

    #[test]
    fn filtro_vazio_nao_toca_a_query() {
        let filter = SearchFilter::parse(&params(&[]), SEARCHABLE, TIME_RANGE);
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT * FROM users");
        filter.push_where(&mut qb, true);
        assert_eq!(qb.sql(), "SELECT * FROM users");
    }
}
