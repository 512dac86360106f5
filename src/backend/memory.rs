use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ensure_conditions, AuthBackend, AuthSession, AuthUser, BackendError, StorageBackend, TableBackend,
    UploadOptions,
};
use crate::auth::{decode_claims, generate_jwt, AccessClaims};
use crate::filter::filter_where::value_to_text;
use crate::filter::Filter;

/// An object stored by [`MemoryBackend::upload`]
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub cache_control: String,
}

#[derive(Debug, Clone)]
struct MemoryUser {
    id: String,
    email: String,
    password: String,
}

#[derive(Default)]
struct MemoryState {
    users: Vec<MemoryUser>,
    /// refresh token -> user id
    refresh_tokens: HashMap<String, String>,
    tables: HashMap<String, Vec<Value>>,
    next_ids: HashMap<String, i64>,
    /// "bucket/path" -> object
    objects: HashMap<String, StoredObject>,
    /// table -> message returned for every write
    rejected_tables: HashMap<String, String>,
    storage_rejection: Option<String>,
}

/// In-process stand-in for the hosted platform.
///
/// Access tokens are real HS256 JWTs signed with `jwt_secret`, so the session
/// middleware exercises the same decode path as in production. Table calls
/// check the token before touching rows.
pub struct MemoryBackend {
    jwt_secret: String,
    public_base: String,
    token_ttl_secs: RwLock<i64>,
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            public_base: "http://memory.local".to_string(),
            token_ttl_secs: RwLock::new(3600),
            state: RwLock::new(MemoryState::default()),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub async fn add_user(&self, email: &str, password: &str) -> String {
        let id = Uuid::new_v4().to_string();
        self.state.write().await.users.push(MemoryUser {
            id: id.clone(),
            email: email.to_string(),
            password: password.to_string(),
        });
        id
    }

    /// Lifetime of access tokens issued from now on; negative values hand out
    /// tokens that are already expired.
    pub async fn set_token_ttl(&self, secs: i64) {
        *self.token_ttl_secs.write().await = secs;
    }

    /// Insert a row directly, bypassing auth. Returns the stored row.
    pub async fn seed(&self, table: &str, row: Value) -> Value {
        let mut state = self.state.write().await;
        insert_row(&mut state, table, row)
    }

    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.state.read().await.tables.get(table).cloned().unwrap_or_default()
    }

    pub async fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.state.read().await.objects.get(&format!("{}/{}", bucket, path)).cloned()
    }

    pub async fn object_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.state.read().await.objects.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Make every write to `table` fail with `message`
    pub async fn reject_writes(&self, table: &str, message: &str) {
        self.state
            .write()
            .await
            .rejected_tables
            .insert(table.to_string(), message.to_string());
    }

    pub async fn reject_uploads(&self, message: &str) {
        self.state.write().await.storage_rejection = Some(message.to_string());
    }

    async fn issue_session(&self, state: &mut MemoryState, user: &MemoryUser) -> Result<AuthSession, BackendError> {
        let ttl = *self.token_ttl_secs.read().await;
        let claims = AccessClaims::new(user.id.clone(), Some(user.email.clone()), ttl);
        let access_token = generate_jwt(&claims, &self.jwt_secret)
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;
        let refresh_token = Uuid::new_v4().simple().to_string();
        state.refresh_tokens.insert(refresh_token.clone(), user.id.clone());

        Ok(AuthSession {
            access_token,
            refresh_token,
            expires_at: Some(claims.exp),
            expires_in: Some(ttl),
            user: AuthUser {
                id: user.id.clone(),
                email: Some(user.email.clone()),
            },
        })
    }

    fn authorize(&self, access_token: &str) -> Result<AccessClaims, BackendError> {
        let claims = decode_claims(access_token, Some(&self.jwt_secret))
            .map_err(|_| BackendError::Unauthorized("invalid JWT".to_string()))?;
        if claims.expires_within(Utc::now().timestamp(), 0) {
            return Err(BackendError::Unauthorized("JWT expired".to_string()));
        }
        Ok(claims)
    }

    fn check_writable(state: &MemoryState, table: &str) -> Result<(), BackendError> {
        match state.rejected_tables.get(table) {
            Some(message) => Err(BackendError::Rejected {
                status: 400,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn insert_row(state: &mut MemoryState, table: &str, row: Value) -> Value {
    let mut map = match row {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let next = state.next_ids.entry(table.to_string()).or_insert(1);
    match map.get("id").and_then(Value::as_i64) {
        Some(id) => *next = (*next).max(id + 1),
        None => {
            map.insert("id".to_string(), Value::from(*next));
            *next += 1;
        }
    }
    map.entry("created_at".to_string())
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

    let stored = Value::Object(map);
    state.tables.entry(table.to_string()).or_default().push(stored.clone());
    stored
}

/// Attach embedded rows the way the remote API nests them under the table name
fn resolve_embeds(state: &MemoryState, filter: &Filter, source: &Value, mut projected: Value) -> Value {
    for embed in filter.embeds() {
        let key = source.get(&embed.foreign_key).cloned().unwrap_or(Value::Null);
        let related = if key.is_null() {
            Value::Null
        } else {
            state
                .tables
                .get(&embed.table)
                .and_then(|rows| {
                    rows.iter().find(|r| {
                        r.get("id").map(value_to_text) == Some(value_to_text(&key))
                    })
                })
                .map(|r| {
                    let columns: Map<String, Value> = embed
                        .columns
                        .iter()
                        .filter_map(|c| r.get(c).map(|v| (c.clone(), v.clone())))
                        .collect();
                    Value::Object(columns)
                })
                .unwrap_or(Value::Null)
        };
        if let Value::Object(map) = &mut projected {
            map.insert(embed.table.clone(), related);
        }
    }
    projected
}

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let mut state = self.state.write().await;
        let user = state
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email) && u.password == password)
            .cloned()
            .ok_or_else(|| BackendError::Rejected {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })?;
        self.issue_session(&mut state, &user).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        let mut state = self.state.write().await;
        let user_id = state
            .refresh_tokens
            .remove(refresh_token)
            .ok_or_else(|| BackendError::Rejected {
                status: 400,
                message: "Invalid Refresh Token: Refresh Token Not Found".to_string(),
            })?;
        let user = state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound("User not found".to_string()))?;
        self.issue_session(&mut state, &user).await
    }

    async fn get_user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let claims = self.authorize(access_token)?;
        let state = self.state.read().await;
        state
            .users
            .iter()
            .find(|u| u.id == claims.sub)
            .map(|u| AuthUser {
                id: u.id.clone(),
                email: Some(u.email.clone()),
            })
            .ok_or_else(|| BackendError::Unauthorized("User from sub claim in JWT does not exist".to_string()))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let claims = self.authorize(access_token)?;
        self.state
            .write()
            .await
            .refresh_tokens
            .retain(|_, user_id| *user_id != claims.sub);
        Ok(())
    }

    async fn health(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

#[async_trait]
impl TableBackend for MemoryBackend {
    async fn select(&self, access_token: &str, filter: &Filter) -> Result<Vec<Value>, BackendError> {
        filter.validate()?;
        self.authorize(access_token)?;

        let state = self.state.read().await;
        let mut rows: Vec<Value> = state
            .tables
            .get(filter.table_name())
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();
        filter.sort(&mut rows);
        filter.truncate(&mut rows);

        Ok(rows
            .iter()
            .map(|row| resolve_embeds(&state, filter, row, filter.project(row)))
            .collect())
    }

    async fn insert(&self, access_token: &str, table: &str, row: Value) -> Result<Vec<Value>, BackendError> {
        Filter::table(table).validate()?;
        self.authorize(access_token)?;

        let mut state = self.state.write().await;
        Self::check_writable(&state, table)?;
        Ok(vec![insert_row(&mut state, table, row)])
    }

    async fn update(&self, access_token: &str, filter: &Filter, patch: Value) -> Result<Vec<Value>, BackendError> {
        filter.validate()?;
        ensure_conditions(filter)?;
        self.authorize(access_token)?;

        let mut state = self.state.write().await;
        Self::check_writable(&state, filter.table_name())?;

        let Value::Object(patch) = patch else {
            return Err(BackendError::Rejected {
                status: 400,
                message: "patch body must be an object".to_string(),
            });
        };

        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(filter.table_name()) {
            for row in rows.iter_mut().filter(|r| filter.matches(r)) {
                if let Value::Object(map) = row {
                    for (k, v) in &patch {
                        map.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, access_token: &str, filter: &Filter) -> Result<usize, BackendError> {
        filter.validate()?;
        ensure_conditions(filter)?;
        self.authorize(access_token)?;

        let mut state = self.state.write().await;
        Self::check_writable(&state, filter.table_name())?;

        let Some(rows) = state.tables.get_mut(filter.table_name()) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !filter.matches(r));
        Ok(before - rows.len())
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn upload(
        &self,
        access_token: &str,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        options: UploadOptions,
    ) -> Result<(), BackendError> {
        self.authorize(access_token)?;

        let mut state = self.state.write().await;
        if let Some(message) = &state.storage_rejection {
            return Err(BackendError::Rejected {
                status: 400,
                message: message.clone(),
            });
        }

        let key = format!("{}/{}", bucket, path);
        if !options.upsert && state.objects.contains_key(&key) {
            return Err(BackendError::Rejected {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }

        state.objects.insert(
            key,
            StoredObject {
                bytes,
                content_type: options.content_type,
                cache_control: format!("max-age={}", options.cache_control_secs),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.public_base, bucket, path)
    }
}
