//! Business operations behind the dashboard pages. Each call runs with the
//! signed-in user's access token so the platform's row policies apply.

use thiserror::Error;

use crate::backend::BackendError;
use crate::storage::UploadError;

pub mod caderno_service;
pub mod noticia_service;
pub mod repository;

pub use caderno_service::CadernoService;
pub use noticia_service::NoticiaService;
pub use repository::Repository;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Resposta inesperada do banco: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ServiceError {
    /// Message shown to the editor after a failed action, e.g.
    /// `failure_message("adicionar caderno")`
    pub fn failure_message(&self, action: &str) -> String {
        match self {
            ServiceError::Validation(msg) | ServiceError::NotFound(msg) => msg.clone(),
            ServiceError::Upload(UploadError::Storage(err)) => format!("Erro ao fazer upload da capa: {}", err),
            ServiceError::Upload(err) => format!("Erro ao fazer upload da capa: {}", err),
            other => format!("Erro ao {}: {}", action, other),
        }
    }
}
