use std::cmp::Ordering;

use serde_json::Value;

use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Render the `order` query value, e.g. `created_at.desc,titulo.asc`
    pub fn generate(infos: &[FilterOrderInfo]) -> Option<String> {
        if infos.is_empty() {
            return None;
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{}.{}", i.column, i.sort.as_str()))
            .collect();
        Some(parts.join(","))
    }

    /// Compare two rows the way Postgres orders them: nulls last when
    /// ascending, nulls first when descending.
    pub fn compare(infos: &[FilterOrderInfo], a: &Value, b: &Value) -> Ordering {
        for info in infos {
            let left = a.get(&info.column).unwrap_or(&Value::Null);
            let right = b.get(&info.column).unwrap_or(&Value::Null);

            let ordering = match (left.is_null(), right.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => compare_values(left, right),
            };

            let ordering = match info.sort {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(column: &str, sort: SortDirection) -> FilterOrderInfo {
        FilterOrderInfo { column: column.to_string(), sort }
    }

    #[test]
    fn test_generate() {
        assert_eq!(FilterOrder::generate(&[]), None);
        assert_eq!(
            FilterOrder::generate(&[order("created_at", SortDirection::Desc), order("titulo", SortDirection::Asc)]),
            Some("created_at.desc,titulo.asc".to_string())
        );
    }

    #[test]
    fn test_compare_nulls_follow_postgres() {
        let a = json!({"n": null});
        let b = json!({"n": 1});
        assert_eq!(FilterOrder::compare(&[order("n", SortDirection::Asc)], &a, &b), Ordering::Greater);
        assert_eq!(FilterOrder::compare(&[order("n", SortDirection::Desc)], &a, &b), Ordering::Less);
    }

    #[test]
    fn test_compare_falls_through_to_next_column() {
        let a = json!({"ativo": true, "nome": "B"});
        let b = json!({"ativo": true, "nome": "A"});
        let infos = [order("ativo", SortDirection::Asc), order("nome", SortDirection::Asc)];
        assert_eq!(FilterOrder::compare(&infos, &a, &b), Ordering::Greater);
    }
}
