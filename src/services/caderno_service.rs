use std::sync::Arc;

use crate::backend::Backend;
use crate::filter::SortDirection;
use crate::models::caderno::TABLE;
use crate::models::{Caderno, CadernoDraft, CadernoOption};

use super::{Repository, ServiceError};

const NOT_FOUND: &str = "Caderno não encontrado.";

#[derive(Clone)]
pub struct CadernoService {
    cadernos: Repository<Caderno>,
    options: Repository<CadernoOption>,
}

impl CadernoService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            cadernos: Repository::new(TABLE, NOT_FOUND, backend.clone()),
            options: Repository::new(TABLE, NOT_FOUND, backend),
        }
    }

    /// Every caderno, alphabetical
    pub async fn list(&self, token: &str) -> Result<Vec<Caderno>, ServiceError> {
        let filter = self
            .cadernos
            .filter()
            .select(&["id", "nomecaderno", "ativo"])
            .order("nomecaderno", SortDirection::Asc);
        self.cadernos.select_any(token, &filter).await
    }

    /// Id and name of every caderno, alphabetical, for the noticia dropdowns
    pub async fn all_for_select(&self, token: &str) -> Result<Vec<CadernoOption>, ServiceError> {
        let filter = self
            .options
            .filter()
            .select(&["id", "nomecaderno"])
            .order("nomecaderno", SortDirection::Asc);
        self.options.select_any(token, &filter).await
    }

    pub async fn get(&self, token: &str, id: i64) -> Result<Caderno, ServiceError> {
        self.cadernos.select_404(token, self.cadernos.by_id(id)).await
    }

    pub async fn create(&self, token: &str, draft: &CadernoDraft) -> Result<Caderno, ServiceError> {
        let input = draft.validate().map_err(ServiceError::Validation)?;
        let caderno = self.cadernos.insert_one(token, &input).await?;
        tracing::info!("Created caderno {} ({})", caderno.id, caderno.nomecaderno);
        Ok(caderno)
    }

    pub async fn update(&self, token: &str, id: i64, draft: &CadernoDraft) -> Result<Caderno, ServiceError> {
        let input = draft.validate().map_err(ServiceError::Validation)?;
        let caderno = self
            .cadernos
            .update_404(token, &self.cadernos.by_id(id), &input)
            .await?;
        tracing::info!("Updated caderno {}", id);
        Ok(caderno)
    }

    /// Flip `ativo` and return the new value
    pub async fn toggle_ativo(&self, token: &str, id: i64) -> Result<bool, ServiceError> {
        let current = self.get(token, id).await?;
        let patch = serde_json::json!({ "ativo": !current.ativo });
        let updated = self
            .cadernos
            .update_404(token, &self.cadernos.by_id(id), &patch)
            .await?;
        tracing::info!("Caderno {} ativo={}", id, updated.ativo);
        Ok(updated.ativo)
    }

    pub async fn delete(&self, token: &str, id: i64) -> Result<(), ServiceError> {
        self.cadernos.delete_404(token, &self.cadernos.by_id(id)).await?;
        tracing::info!("Deleted caderno {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AuthBackend, MemoryBackend};
    use serde_json::json;

    async fn setup() -> (Arc<MemoryBackend>, CadernoService, String) {
        let backend = Arc::new(MemoryBackend::new("caderno-secret"));
        backend.add_user("ed@fatoreal.com.br", "senha").await;
        let token = backend
            .sign_in_with_password("ed@fatoreal.com.br", "senha")
            .await
            .unwrap()
            .access_token;
        let service = CadernoService::new(backend.clone());
        (backend, service, token)
    }

    #[tokio::test]
    async fn test_create_list_and_select_options() {
        let (_backend, service, token) = setup().await;

        for nome in ["Política", " Cultura ", "Esportes"] {
            let draft = CadernoDraft { nomecaderno: nome.into(), ativo: nome != "Esportes" };
            service.create(&token, &draft).await.unwrap();
        }

        let names: Vec<String> = service.list(&token).await.unwrap().into_iter().map(|c| c.nomecaderno).collect();
        assert_eq!(names, vec!["Cultura", "Esportes", "Política"]);

        let options = service.all_for_select(&token).await.unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].nomecaderno, "Cultura");
    }

    #[tokio::test]
    async fn test_blank_name_is_a_validation_error() {
        let (backend, service, token) = setup().await;
        let err = service
            .create(&token, &CadernoDraft { nomecaderno: "  ".into(), ativo: true })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(backend.rows(TABLE).await.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_update_and_delete() {
        let (backend, service, token) = setup().await;
        let row = backend.seed(TABLE, json!({"nomecaderno": "Saúde", "ativo": true})).await;
        let id = row["id"].as_i64().unwrap();

        assert!(!service.toggle_ativo(&token, id).await.unwrap());
        assert!(service.toggle_ativo(&token, id).await.unwrap());

        let updated = service
            .update(&token, id, &CadernoDraft { nomecaderno: "Saúde e Bem-estar".into(), ativo: false })
            .await
            .unwrap();
        assert_eq!(updated.nomecaderno, "Saúde e Bem-estar");
        assert!(!updated.ativo);

        service.delete(&token, id).await.unwrap();
        assert!(matches!(service.get(&token, id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete(&token, id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_backend_rejection_and_bad_token_surface() {
        let (backend, service, token) = setup().await;
        backend.reject_writes(TABLE, "permission denied for table cadernos").await;

        let err = service
            .create(&token, &CadernoDraft { nomecaderno: "Polícia".into(), ativo: true })
            .await
            .unwrap_err();
        assert_eq!(
            err.failure_message("adicionar caderno"),
            "Erro ao adicionar caderno: permission denied for table cadernos"
        );

        let err = service.list("not-a-token").await.unwrap_err();
        assert!(matches!(err, ServiceError::Backend(ref e) if e.is_unauthorized()));
    }
}
