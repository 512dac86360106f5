//! Image uploads: object naming inside the bucket, content-type resolution and
//! the upload-then-resolve-public-URL sequence shared by the editor endpoint
//! and the noticia cover field.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::backend::{Backend, BackendError, UploadOptions};
use crate::config::StorageConfig;

const FALLBACK_BASE: &str = "arquivo";

/// A file received from a multipart form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Where in the bucket an upload lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadTarget {
    /// Inline images from the rich-text editor, named after the original file
    Editor,
    /// Noticia cover images, named with a random suffix
    Cover,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Nenhum arquivo enviado.")]
    Empty,

    #[error("O arquivo enviado não é uma imagem ({0}).")]
    NotAnImage(String),

    #[error("A imagem excede o tamanho máximo de {max} bytes.")]
    TooLarge { size: usize, max: usize },

    #[error("Erro no upload para o Storage: {0}")]
    Storage(#[from] BackendError),

    #[error("Erro ao obter URL pública da imagem.")]
    MissingPublicUrl,
}

/// File name split into a safe base and a lowercase extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedName {
    pub base: String,
    pub extension: Option<String>,
}

impl SanitizedName {
    fn with_extension(&self, stem: &str) -> String {
        match &self.extension {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem.to_string(),
        }
    }
}

/// Split at the last dot and keep only `[A-Za-z0-9-_.]` in the base,
/// replacing anything else with `_`. A leading dot does not start an
/// extension (".env" has base ".env").
pub fn sanitize_file_name(name: &str) -> SanitizedName {
    // Browsers on some platforms send the full client path
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();

    let (base, extension) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    };

    let base: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let extension = extension
        .map(|ext| {
            ext.chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        })
        .filter(|ext| !ext.is_empty());

    SanitizedName {
        base: if base.is_empty() { FALLBACK_BASE.to_string() } else { base },
        extension,
    }
}

/// `<prefix>/<millis>-<sanitized base>.<ext>`
pub fn editor_object_path(prefix: &str, file_name: &str, now: DateTime<Utc>) -> String {
    let name = sanitize_file_name(file_name);
    let stem = format!("{}-{}", now.timestamp_millis(), name.base);
    join_prefix(prefix, &name.with_extension(&stem))
}

/// `<prefix>/<millis>-<13 random chars>.<ext>`
pub fn cover_object_path(prefix: &str, file_name: &str, now: DateTime<Utc>) -> String {
    let name = sanitize_file_name(file_name);
    let random: String = Uuid::new_v4().simple().to_string().chars().take(13).collect();
    let stem = format!("{}-{}", now.timestamp_millis(), random);
    join_prefix(prefix, &name.with_extension(&stem))
}

fn join_prefix(prefix: &str, file: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", prefix, file)
    }
}

/// The declared multipart type wins; otherwise guess from the extension
pub fn content_type_for(file_name: &str, declared: Option<&str>) -> String {
    if let Some(declared) = declared.map(str::trim).filter(|d| !d.is_empty()) {
        return declared.to_ascii_lowercase();
    }

    let guessed = match sanitize_file_name(file_name).extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    };
    guessed.to_string()
}

/// Validate, upload and return the public URL of an image
pub async fn upload_image(
    backend: &dyn Backend,
    access_token: &str,
    config: &StorageConfig,
    target: UploadTarget,
    upload: ImageUpload,
) -> Result<String, UploadError> {
    if upload.bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if upload.bytes.len() > config.max_upload_bytes {
        return Err(UploadError::TooLarge {
            size: upload.bytes.len(),
            max: config.max_upload_bytes,
        });
    }

    let content_type = content_type_for(&upload.file_name, upload.content_type.as_deref());
    if !content_type.starts_with("image/") {
        return Err(UploadError::NotAnImage(content_type));
    }

    let now = Utc::now();
    let path = match target {
        UploadTarget::Editor => editor_object_path(&config.editor_prefix, &upload.file_name, now),
        UploadTarget::Cover => cover_object_path(&config.cover_prefix, &upload.file_name, now),
    };

    backend
        .upload(
            access_token,
            &config.bucket,
            &path,
            upload.bytes,
            UploadOptions {
                content_type,
                cache_control_secs: config.cache_control_secs,
                upsert: false,
            },
        )
        .await
        .map_err(|e| {
            tracing::error!("Storage upload of '{}' failed: {}", path, e);
            UploadError::Storage(e)
        })?;

    let url = backend.public_url(&config.bucket, &path);
    if url.is_empty() {
        tracing::error!("No public URL resolved for '{}'", path);
        return Err(UploadError::MissingPublicUrl);
    }

    tracing::info!("Uploaded image to {}/{}", config.bucket, path);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AuthBackend, MemoryBackend};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        let name = sanitize_file_name("Foto da Câmara (1).JPG");
        assert_eq!(name.base, "Foto_da_C_mara__1_");
        assert_eq!(name.extension.as_deref(), Some("jpg"));
    }

    #[test]
    fn test_sanitize_edge_cases() {
        assert_eq!(
            sanitize_file_name("semextensao"),
            SanitizedName { base: "semextensao".into(), extension: None }
        );
        assert_eq!(
            sanitize_file_name(".env"),
            SanitizedName { base: ".env".into(), extension: None }
        );
        assert_eq!(
            sanitize_file_name("arquivo.tar.gz"),
            SanitizedName { base: "arquivo.tar".into(), extension: Some("gz".into()) }
        );
        assert_eq!(
            sanitize_file_name("C:\\Users\\ana\\capa.png"),
            SanitizedName { base: "capa".into(), extension: Some("png".into()) }
        );
        assert_eq!(sanitize_file_name("").base, "arquivo");
        assert_eq!(sanitize_file_name("foto.").extension, None);
    }

    #[test]
    fn test_editor_object_path() {
        assert_eq!(
            editor_object_path("capanoticia", "minha foto.png", fixed_now()),
            "capanoticia/1700000000123-minha_foto.png"
        );
        assert_eq!(
            editor_object_path("", "logo", fixed_now()),
            "1700000000123-logo"
        );
    }

    #[test]
    fn test_cover_object_path_has_random_suffix() {
        let a = cover_object_path("noticia_capas", "capa.webp", fixed_now());
        let b = cover_object_path("noticia_capas", "capa.webp", fixed_now());
        assert!(a.starts_with("noticia_capas/1700000000123-"));
        assert!(a.ends_with(".webp"));
        assert_eq!(a.len(), "noticia_capas/1700000000123-".len() + 13 + ".webp".len());
        assert_ne!(a, b);
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("x.png", Some("image/PNG")), "image/png");
        assert_eq!(content_type_for("x.jpeg", None), "image/jpeg");
        assert_eq!(content_type_for("x.svg", Some("")), "image/svg+xml");
        assert_eq!(content_type_for("x.pdf", None), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_upload_image_checks_and_stores() {
        let backend = MemoryBackend::new("secret");
        backend.add_user("a@b.c", "pw").await;
        let token = backend.sign_in_with_password("a@b.c", "pw").await.unwrap().access_token;
        let mut config = crate::config::AppConfig::development().storage;
        config.max_upload_bytes = 8;

        let empty = ImageUpload { file_name: "a.png".into(), content_type: None, bytes: vec![] };
        assert!(matches!(
            upload_image(&backend, &token, &config, UploadTarget::Editor, empty).await,
            Err(UploadError::Empty)
        ));

        let pdf = ImageUpload { file_name: "a.pdf".into(), content_type: None, bytes: vec![1] };
        assert!(matches!(
            upload_image(&backend, &token, &config, UploadTarget::Editor, pdf).await,
            Err(UploadError::NotAnImage(_))
        ));

        let big = ImageUpload { file_name: "a.png".into(), content_type: None, bytes: vec![0; 9] };
        assert!(matches!(
            upload_image(&backend, &token, &config, UploadTarget::Editor, big).await,
            Err(UploadError::TooLarge { size: 9, max: 8 })
        ));

        let ok = ImageUpload { file_name: "a b.png".into(), content_type: None, bytes: vec![1, 2] };
        let url = upload_image(&backend, &token, &config, UploadTarget::Editor, ok).await.unwrap();
        assert!(url.starts_with("http://memory.local/storage/v1/object/public/capanoticia/capanoticia/"));
        assert!(url.ends_with("-a_b.png"));
        assert_eq!(backend.object_keys().await.len(), 1);
    }
}
