use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::ServiceError;
use crate::backend::Backend;
use crate::filter::Filter;

/// Typed access to one table through the backend
pub struct Repository<T> {
    table_name: &'static str,
    not_found: &'static str,
    backend: Arc<dyn Backend>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            table_name: self.table_name,
            not_found: self.not_found,
            backend: self.backend.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> Repository<T>
where
    T: DeserializeOwned,
{
    /// `not_found` is the message reported when a single-row call matches nothing
    pub fn new(table_name: &'static str, not_found: &'static str, backend: Arc<dyn Backend>) -> Self {
        Self {
            table_name,
            not_found,
            backend,
            _phantom: PhantomData,
        }
    }

    pub fn filter(&self) -> Filter {
        Filter::table(self.table_name)
    }

    pub fn by_id(&self, id: i64) -> Filter {
        self.filter().eq("id", id)
    }

    pub async fn select_any(&self, token: &str, filter: &Filter) -> Result<Vec<T>, ServiceError> {
        let rows = self.backend.select(token, filter).await?;
        decode_rows(rows)
    }

    pub async fn select_404(&self, token: &str, filter: Filter) -> Result<T, ServiceError> {
        let mut rows = self.select_any(token, &filter.limit(1)).await?;
        rows.pop().ok_or_else(|| ServiceError::NotFound(self.not_found.to_string()))
    }

    pub async fn insert_one(&self, token: &str, row: &impl Serialize) -> Result<T, ServiceError> {
        let rows = self
            .backend
            .insert(token, self.table_name, serde_json::to_value(row)?)
            .await?;
        first_row(decode_rows(rows)?, self.not_found)
    }

    pub async fn update_404(&self, token: &str, filter: &Filter, patch: &impl Serialize) -> Result<T, ServiceError> {
        let rows = self
            .backend
            .update(token, filter, serde_json::to_value(patch)?)
            .await?;
        first_row(decode_rows(rows)?, self.not_found)
    }

    pub async fn delete_404(&self, token: &str, filter: &Filter) -> Result<(), ServiceError> {
        match self.backend.delete(token, filter).await? {
            0 => Err(ServiceError::NotFound(self.not_found.to_string())),
            _ => Ok(()),
        }
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, ServiceError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(ServiceError::from))
        .collect()
}

/// Writes with `return=representation` echo the affected rows; none means
/// the filter matched nothing (or row policies hid it).
fn first_row<T>(rows: Vec<T>, not_found: &str) -> Result<T, ServiceError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| ServiceError::NotFound(not_found.to_string()))
}
