use serde::{Deserialize, Serialize};

use super::null_as_default;

pub const TABLE: &str = "cadernos";

/// A section of the site (row of `cadernos`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caderno {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nomecaderno: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ativo: bool,
}

/// Id and name only, for dropdowns and the embedded relation on noticias
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CadernoOption {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nomecaderno: String,
}

/// Form state as typed by the user, before validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CadernoDraft {
    pub nomecaderno: String,
    pub ativo: bool,
}

/// Validated columns written on insert and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CadernoInput {
    pub nomecaderno: String,
    pub ativo: bool,
}

impl CadernoDraft {
    pub fn validate(&self) -> Result<CadernoInput, String> {
        let nome = self.nomecaderno.trim();
        if nome.is_empty() {
            return Err("O nome do caderno não pode ser vazio.".to_string());
        }
        Ok(CadernoInput {
            nomecaderno: nome.to_string(),
            ativo: self.ativo,
        })
    }
}
