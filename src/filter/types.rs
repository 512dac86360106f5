use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operators understood by the hosted query API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Neq,
    ILike,
    Is,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::ILike => "ilike",
            FilterOp::Is => "is",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterWhereInfo {
    pub column: String,
    pub operator: FilterOp,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

/// A related table pulled into each row, e.g. `cadernos(id,nomecaderno)`.
///
/// `foreign_key` names the column on the parent row that points at the
/// embedded table's `id`. The remote API infers the relation on its own, the
/// in-memory backend needs it spelled out.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub table: String,
    pub columns: Vec<String>,
    pub foreign_key: String,
}
