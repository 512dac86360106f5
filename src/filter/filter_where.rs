use serde_json::Value;

use super::types::{FilterOp, FilterWhereInfo};

pub struct FilterWhere;

impl FilterWhere {
    /// Render one clause as a query pair, e.g. `("id_caderno", "eq.3")`
    pub fn generate(info: &FilterWhereInfo) -> (String, String) {
        (
            info.column.clone(),
            format!("{}.{}", info.operator.as_str(), value_to_text(&info.data)),
        )
    }

    /// Evaluate one clause against a JSON row
    pub fn matches(info: &FilterWhereInfo, row: &Value) -> bool {
        let field = row.get(&info.column).unwrap_or(&Value::Null);

        match info.operator {
            FilterOp::Eq => !field.is_null() && value_to_text(field) == value_to_text(&info.data),
            FilterOp::Neq => !field.is_null() && value_to_text(field) != value_to_text(&info.data),
            FilterOp::ILike => match field {
                Value::Null => false,
                other => ilike(&value_to_text(other), &value_to_text(&info.data)),
            },
            FilterOp::Is => match value_to_text(&info.data).as_str() {
                "null" => field.is_null(),
                "true" => field == &Value::Bool(true),
                "false" => field == &Value::Bool(false),
                _ => false,
            },
        }
    }
}

/// Text form of a JSON scalar as the query API expects it in a URL
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Case-insensitive match where `*` and `%` stand for any run of characters
pub fn ilike(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.to_lowercase().chars().collect();
    let pattern: Vec<char> = pattern.to_lowercase().chars().collect();

    // Greedy wildcard matching with backtracking to the last star
    let (mut t, mut p) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut star_t = 0usize;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '*' || pattern[p] == '%') {
            star = Some(p);
            star_t = t;
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            t += 1;
            p += 1;
        } else if let Some(s) = star {
            p = s + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    while p < pattern.len() && (pattern[p] == '*' || pattern[p] == '%') {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn clause(column: &str, operator: FilterOp, data: Value) -> FilterWhereInfo {
        FilterWhereInfo { column: column.to_string(), operator, data }
    }

    #[test]
    fn test_generate_renders_operator_prefix() {
        let (k, v) = FilterWhere::generate(&clause("id_caderno", FilterOp::Eq, json!(3)));
        assert_eq!(k, "id_caderno");
        assert_eq!(v, "eq.3");

        let (_, v) = FilterWhere::generate(&clause("autor", FilterOp::ILike, json!("*ana*")));
        assert_eq!(v, "ilike.*ana*");

        let (_, v) = FilterWhere::generate(&clause("publico", FilterOp::Eq, json!(false)));
        assert_eq!(v, "eq.false");
    }

    #[test]
    fn test_eq_compares_text_forms() {
        let row = json!({"id": 7, "publico": true, "autor": null});
        assert!(FilterWhere::matches(&clause("id", FilterOp::Eq, json!("7")), &row));
        assert!(FilterWhere::matches(&clause("publico", FilterOp::Eq, json!(true)), &row));
        assert!(!FilterWhere::matches(&clause("autor", FilterOp::Eq, json!("null")), &row));
        assert!(FilterWhere::matches(&clause("autor", FilterOp::Is, json!(null)), &row));
    }

    #[test]
    fn test_ilike_wildcards() {
        assert!(ilike("João Silva", "*silva*"));
        assert!(ilike("João Silva", "%JOÃO%"));
        assert!(ilike("abc", "a*c"));
        assert!(!ilike("abc", "a*d"));
        assert!(ilike("", "*"));
        assert!(!ilike("Maria", "*ana*"));
    }
}
