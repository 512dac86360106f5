use std::sync::Arc;

use chrono::Utc;

use crate::backend::Backend;
use crate::config::StorageConfig;
use crate::filter::SortDirection;
use crate::models::caderno::TABLE as CADERNOS;
use crate::models::noticia::TABLE;
use crate::models::{CadernoOption, Noticia, NoticiaDraft, NoticiaFilters};
use crate::storage::{upload_image, ImageUpload, UploadTarget};

use super::{CadernoService, Repository, ServiceError};

const NOT_FOUND: &str = "Notícia não encontrada.";

const LIST_COLUMNS: &[&str] = &[
    "id",
    "created_at",
    "titulo",
    "subtitulo",
    "capa",
    "slug",
    "id_caderno",
    "updatedat",
    "likes",
    "publicidade",
    "publico",
    "autor",
];

#[derive(Clone)]
pub struct NoticiaService {
    noticias: Repository<Noticia>,
    cadernos: CadernoService,
    backend: Arc<dyn Backend>,
    storage: StorageConfig,
}

impl NoticiaService {
    pub fn new(backend: Arc<dyn Backend>, storage: StorageConfig) -> Self {
        Self {
            noticias: Repository::new(TABLE, NOT_FOUND, backend.clone()),
            cadernos: CadernoService::new(backend.clone()),
            backend,
            storage,
        }
    }

    /// Newest first, with the caderno embedded
    pub async fn list(&self, token: &str, filters: &NoticiaFilters) -> Result<Vec<Noticia>, ServiceError> {
        let mut filter = self
            .noticias
            .filter()
            .select(LIST_COLUMNS)
            .embed(CADERNOS, "id_caderno", &["id", "nomecaderno"])
            .order("created_at", SortDirection::Desc);

        if let Some(caderno) = filters.caderno_id() {
            filter = filter.eq("id_caderno", caderno);
        }
        if let Some(publico) = filters.publico_flag() {
            filter = filter.eq("publico", publico);
        }
        if let Some(autor) = filters.autor_needle() {
            filter = filter.ilike_contains("autor", autor);
        }

        self.noticias.select_any(token, &filter).await
    }

    pub async fn get(&self, token: &str, id: i64) -> Result<Noticia, ServiceError> {
        self.noticias.select_404(token, self.noticias.by_id(id)).await
    }

    /// The noticia being edited and the caderno dropdown, fetched together
    pub async fn edit_context(&self, token: &str, id: i64) -> Result<(Noticia, Vec<CadernoOption>), ServiceError> {
        futures::try_join!(self.get(token, id), self.cadernos.all_for_select(token))
    }

    pub async fn create(
        &self,
        token: &str,
        draft: &NoticiaDraft,
        cover: Option<ImageUpload>,
    ) -> Result<Noticia, ServiceError> {
        let mut input = draft.validate(true).map_err(ServiceError::Validation)?;
        if let Some(cover) = cover {
            input.capa = Some(self.upload_cover(token, cover).await?);
        }

        let noticia = self.noticias.insert_one(token, &input).await?;
        tracing::info!("Created noticia {} in caderno {}", noticia.id, input.id_caderno);
        Ok(noticia)
    }

    /// Rewrites every field; the stored cover stays unless a new one is sent
    pub async fn update(
        &self,
        token: &str,
        id: i64,
        draft: &NoticiaDraft,
        cover: Option<ImageUpload>,
    ) -> Result<Noticia, ServiceError> {
        let mut input = draft.validate(false).map_err(ServiceError::Validation)?;
        // Fail before uploading anything for a row that is gone
        self.get(token, id).await?;

        if let Some(cover) = cover {
            input.capa = Some(self.upload_cover(token, cover).await?);
        }
        input.updatedat = Some(Utc::now().to_rfc3339());

        let noticia = self
            .noticias
            .update_404(token, &self.noticias.by_id(id), &input)
            .await?;
        tracing::info!("Updated noticia {}", id);
        Ok(noticia)
    }

    /// Flip `publico` and return the new value
    pub async fn toggle_publico(&self, token: &str, id: i64) -> Result<bool, ServiceError> {
        let current = self.get(token, id).await?;
        let patch = serde_json::json!({ "publico": !current.publico });
        let updated = self
            .noticias
            .update_404(token, &self.noticias.by_id(id), &patch)
            .await?;
        tracing::info!("Noticia {} publico={}", id, updated.publico);
        Ok(updated.publico)
    }

    pub async fn delete(&self, token: &str, id: i64) -> Result<(), ServiceError> {
        self.noticias.delete_404(token, &self.noticias.by_id(id)).await?;
        tracing::info!("Deleted noticia {}", id);
        Ok(())
    }

    pub fn cadernos(&self) -> &CadernoService {
        &self.cadernos
    }

    async fn upload_cover(&self, token: &str, cover: ImageUpload) -> Result<String, ServiceError> {
        Ok(upload_image(self.backend.as_ref(), token, &self.storage, UploadTarget::Cover, cover).await?)
    }
}
