use serde_json::{Map, Value};

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Embed, FilterOp, FilterOrderInfo, FilterWhereInfo, SortDirection};

/// Target of a single table operation: which table, which columns, which rows
/// and in what order. Renders to the hosted query API's URL parameters and can
/// also be evaluated directly against JSON rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    table: String,
    select: Vec<String>,
    embeds: Vec<Embed>,
    wheres: Vec<FilterWhereInfo>,
    order: Vec<FilterOrderInfo>,
    limit: Option<usize>,
}

impl Filter {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: Vec::new(),
            embeds: Vec::new(),
            wheres: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        self.select = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn embed(mut self, table: &str, foreign_key: &str, columns: &[&str]) -> Self {
        self.embeds.push(Embed {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            foreign_key: foreign_key.to_string(),
        });
        self
    }

    pub fn where_op(mut self, column: &str, operator: FilterOp, data: impl Into<Value>) -> Self {
        self.wheres.push(FilterWhereInfo {
            column: column.to_string(),
            operator,
            data: data.into(),
        });
        self
    }

    pub fn eq(self, column: &str, data: impl Into<Value>) -> Self {
        self.where_op(column, FilterOp::Eq, data)
    }

    /// Case-insensitive contains: wraps the needle in wildcards
    pub fn ilike_contains(self, column: &str, needle: &str) -> Self {
        self.where_op(column, FilterOp::ILike, format!("*{}*", needle))
    }

    pub fn order(mut self, column: &str, sort: SortDirection) -> Self {
        self.order.push(FilterOrderInfo {
            column: column.to_string(),
            sort,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn embeds(&self) -> &[Embed] {
        &self.embeds
    }

    pub fn wheres(&self) -> &[FilterWhereInfo] {
        &self.wheres
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if !is_identifier(&self.table) {
            return Err(FilterError::InvalidTableName(self.table.clone()));
        }

        let columns = self
            .select
            .iter()
            .chain(self.wheres.iter().map(|w| &w.column))
            .chain(self.order.iter().map(|o| &o.column));
        for column in columns {
            if !is_identifier(column) {
                return Err(FilterError::InvalidColumn(column.clone()));
            }
        }

        for embed in &self.embeds {
            if !is_identifier(&embed.table) {
                return Err(FilterError::InvalidTableName(embed.table.clone()));
            }
            if let Some(bad) = embed
                .columns
                .iter()
                .chain(std::iter::once(&embed.foreign_key))
                .find(|c| !is_identifier(c))
            {
                return Err(FilterError::InvalidColumn(bad.clone()));
            }
        }

        if self.limit == Some(0) {
            return Err(FilterError::InvalidLimit("limit must be positive".to_string()));
        }

        Ok(())
    }

    /// The `select` parameter, e.g. `id,titulo,cadernos(id,nomecaderno)`
    pub fn select_clause(&self) -> String {
        let mut parts: Vec<String> = if self.select.is_empty() {
            vec!["*".to_string()]
        } else {
            self.select.clone()
        };
        for embed in &self.embeds {
            parts.push(format!("{}({})", embed.table, embed.columns.join(",")));
        }
        parts.join(",")
    }

    /// Query parameters for a read
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.select_clause())];
        pairs.extend(self.where_pairs());
        if let Some(order) = FilterOrder::generate(&self.order) {
            pairs.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// Query parameters that only narrow the row set, used for writes
    pub fn where_pairs(&self) -> Vec<(String, String)> {
        self.wheres.iter().map(FilterWhere::generate).collect()
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.wheres.iter().all(|w| FilterWhere::matches(w, row))
    }

    pub fn sort(&self, rows: &mut [Value]) {
        if !self.order.is_empty() {
            rows.sort_by(|a, b| FilterOrder::compare(&self.order, a, b));
        }
    }

    pub fn truncate(&self, rows: &mut Vec<Value>) {
        if let Some(limit) = self.limit {
            rows.truncate(limit);
        }
    }

    /// Keep only the selected columns of a row (embeds are resolved separately)
    pub fn project(&self, row: &Value) -> Value {
        let Value::Object(map) = row else {
            return row.clone();
        };
        if self.select.is_empty() {
            return row.clone();
        }
        let projected: Map<String, Value> = self
            .select
            .iter()
            .filter_map(|c| map.get(c).map(|v| (c.clone(), v.clone())))
            .collect();
        Value::Object(projected)
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
