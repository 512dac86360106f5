use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::caderno::CadernoOption;
use super::null_as_default;

pub const TABLE: &str = "noticias";

/// An article (row of `noticias`), optionally with its caderno embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Noticia {
    pub id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub titulo: String,
    #[serde(default)]
    pub subtitulo: Option<String>,
    #[serde(default)]
    pub conteudo: Option<String>,
    #[serde(default)]
    pub capa: Option<String>,
    #[serde(default, deserialize_with = "slug_list")]
    pub slug: Vec<String>,
    #[serde(default)]
    pub id_caderno: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cadernos: Option<CadernoOption>,
    #[serde(default)]
    pub updatedat: Option<String>,
    #[serde(default)]
    pub likes: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub publicidade: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub publico: bool,
    #[serde(default)]
    pub autor: Option<String>,
}

impl Noticia {
    pub fn caderno_name(&self) -> Option<&str> {
        self.cadernos.as_ref().map(|c| c.nomecaderno.as_str())
    }

    /// Tags joined back into the form's comma-separated field
    pub fn slugs_field(&self) -> String {
        self.slug.join(", ")
    }
}

/// Older rows store the slug as a plain string, newer ones as an array
fn slug_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let tags = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) => parse_tags(&s),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "slug must be a string or an array, got {}",
                other
            )))
        }
    };
    Ok(tags)
}

/// Split a comma-separated tag field, trimming and dropping empties
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lowercased title with whitespace runs replaced by `-`
pub fn slug_from_title(titulo: &str) -> String {
    titulo
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Form state as submitted, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoticiaDraft {
    pub titulo: String,
    pub subtitulo: String,
    pub conteudo: String,
    pub id_caderno: String,
    pub autor: String,
    pub publicidade: bool,
    pub publico: bool,
    pub slugs: String,
}

/// Validated columns written on insert and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoticiaInput {
    pub titulo: String,
    pub subtitulo: Option<String>,
    pub conteudo: String,
    /// Left out of the write when no new cover was uploaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capa: Option<String>,
    pub slug: Vec<String>,
    pub id_caderno: i64,
    pub autor: String,
    pub publicidade: bool,
    pub publico: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updatedat: Option<String>,
}

pub const REQUIRED_FIELDS_MESSAGE: &str = "Título, conteúdo, caderno e autor são obrigatórios.";

impl NoticiaDraft {
    /// Check required fields and build the row. `derive_slug` fills an empty
    /// tag list from the title.
    pub fn validate(&self, derive_slug: bool) -> Result<NoticiaInput, String> {
        let titulo = self.titulo.trim();
        let autor = self.autor.trim();
        let caderno = self.id_caderno.trim();
        if titulo.is_empty() || self.conteudo.trim().is_empty() || caderno.is_empty() || autor.is_empty() {
            return Err(REQUIRED_FIELDS_MESSAGE.to_string());
        }

        let id_caderno = caderno
            .parse::<i64>()
            .map_err(|_| format!("Caderno inválido: {}", caderno))?;

        let mut slug = parse_tags(&self.slugs);
        if slug.is_empty() && derive_slug {
            slug.push(slug_from_title(titulo));
        }

        let subtitulo = Some(self.subtitulo.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(NoticiaInput {
            titulo: titulo.to_string(),
            subtitulo,
            conteudo: self.conteudo.clone(),
            capa: None,
            slug,
            id_caderno,
            autor: autor.to_string(),
            publicidade: self.publicidade,
            publico: self.publico,
            updatedat: None,
        })
    }
}

/// Listing filters parsed from the query string
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NoticiaFilters {
    #[serde(default)]
    pub caderno: Option<String>,
    #[serde(default)]
    pub publico: Option<String>,
    #[serde(default)]
    pub autor: Option<String>,
}

impl NoticiaFilters {
    pub fn caderno_id(&self) -> Option<i64> {
        self.caderno.as_deref().and_then(|c| c.trim().parse().ok())
    }

    /// Only the literal values `true` and `false` narrow the list
    pub fn publico_flag(&self) -> Option<bool> {
        match self.publico.as_deref().map(str::trim) {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        }
    }

    pub fn autor_needle(&self) -> Option<&str> {
        self.autor.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.caderno_id().is_none() && self.publico_flag().is_none() && self.autor_needle().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> NoticiaDraft {
        NoticiaDraft {
            titulo: " Chuva  forte em Recife ".into(),
            subtitulo: "".into(),
            conteudo: "<p>texto</p>".into(),
            id_caderno: "3".into(),
            autor: "Ana".into(),
            publicidade: false,
            publico: true,
            slugs: "".into(),
        }
    }

    #[test]
    fn test_slug_accepts_string_or_array() {
        let from_string: Noticia =
            serde_json::from_value(json!({"id": 1, "titulo": "a", "slug": "clima, recife"})).unwrap();
        assert_eq!(from_string.slug, vec!["clima", "recife"]);

        let from_array: Noticia =
            serde_json::from_value(json!({"id": 2, "titulo": "b", "slug": ["um", " ", "dois"]})).unwrap();
        assert_eq!(from_array.slug, vec!["um", "dois"]);

        let missing: Noticia = serde_json::from_value(json!({"id": 3, "slug": null})).unwrap();
        assert!(missing.slug.is_empty());
        assert!(!missing.publico);

        assert!(serde_json::from_value::<Noticia>(json!({"id": 4, "slug": {"x": 1}})).is_err());
    }

    #[test]
    fn test_embedded_caderno() {
        let noticia: Noticia = serde_json::from_value(json!({
            "id": 9,
            "titulo": "t",
            "cadernos": {"id": 2, "nomecaderno": "Esportes"}
        }))
        .unwrap();
        assert_eq!(noticia.caderno_name(), Some("Esportes"));
    }

    #[test]
    fn test_parse_tags_and_slug_from_title() {
        assert_eq!(parse_tags(" a, ,b ,, c"), vec!["a", "b", "c"]);
        assert!(parse_tags("  ").is_empty());
        assert_eq!(slug_from_title("Chuva  Forte\tem Recife"), "chuva-forte-em-recife");
    }

    #[test]
    fn test_validate_derives_slug_only_when_asked() {
        let input = draft().validate(true).unwrap();
        assert_eq!(input.titulo, "Chuva  forte em Recife");
        assert_eq!(input.slug, vec!["chuva-forte-em-recife"]);
        assert_eq!(input.id_caderno, 3);
        assert_eq!(input.subtitulo, None);

        assert!(draft().validate(false).unwrap().slug.is_empty());
    }

    #[test]
    fn test_validate_required_fields() {
        let mut missing = draft();
        missing.autor = "  ".into();
        assert_eq!(missing.validate(true).unwrap_err(), REQUIRED_FIELDS_MESSAGE);

        let mut bad_caderno = draft();
        bad_caderno.id_caderno = "abc".into();
        assert!(bad_caderno.validate(true).unwrap_err().starts_with("Caderno inválido"));
    }

    #[test]
    fn test_filters_ignore_unknown_values() {
        let filters = NoticiaFilters {
            caderno: Some("".into()),
            publico: Some("sim".into()),
            autor: Some("  ".into()),
        };
        assert!(filters.is_empty());

        let filters = NoticiaFilters {
            caderno: Some("7".into()),
            publico: Some("false".into()),
            autor: Some(" Ana ".into()),
        };
        assert_eq!(filters.caderno_id(), Some(7));
        assert_eq!(filters.publico_flag(), Some(false));
        assert_eq!(filters.autor_needle(), Some("Ana"));
    }
}
