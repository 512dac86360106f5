use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub security: SecurityConfig,
    pub branding: BrandingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. https://<ref>.supabase.co
    pub url: String,
    pub anon_key: String,
    /// When set, access tokens are verified locally instead of round-tripping to /auth/v1/user
    pub jwt_secret: Option<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    /// Folder used by the rich-text editor upload endpoint
    pub editor_prefix: String,
    /// Folder used for noticia cover images
    pub cover_prefix: String,
    pub cache_control_secs: u64,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub access_cookie: String,
    pub refresh_cookie: String,
    pub cookie_secure: bool,
    pub refresh_leeway_secs: i64,
    pub refresh_cookie_max_age_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingConfig {
    pub logo_url: String,
    pub site_label: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(port) = env::var("FATOREAL_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Supabase overrides (the NEXT_PUBLIC_* names keep existing .env files working)
        if let Ok(v) = env::var("SUPABASE_URL").or_else(|_| env::var("NEXT_PUBLIC_SUPABASE_URL")) {
            self.supabase.url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("SUPABASE_ANON_KEY").or_else(|_| env::var("NEXT_PUBLIC_SUPABASE_ANON_KEY")) {
            self.supabase.anon_key = v;
        }
        if let Ok(v) = env::var("SUPABASE_JWT_SECRET") {
            self.supabase.jwt_secret = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("SUPABASE_REQUEST_TIMEOUT_SECS") {
            self.supabase.request_timeout_secs = v.parse().unwrap_or(self.supabase.request_timeout_secs);
        }

        // Storage overrides
        if let Ok(v) = env::var("STORAGE_BUCKET") {
            self.storage.bucket = v;
        }
        if let Ok(v) = env::var("STORAGE_EDITOR_PREFIX") {
            self.storage.editor_prefix = v;
        }
        if let Ok(v) = env::var("STORAGE_COVER_PREFIX") {
            self.storage.cover_prefix = v;
        }
        if let Ok(v) = env::var("STORAGE_CACHE_CONTROL_SECS") {
            self.storage.cache_control_secs = v.parse().unwrap_or(self.storage.cache_control_secs);
        }
        if let Ok(v) = env::var("STORAGE_MAX_UPLOAD_BYTES") {
            self.storage.max_upload_bytes = v.parse().unwrap_or(self.storage.max_upload_bytes);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_COOKIE_SECURE") {
            self.session.cookie_secure = v.parse().unwrap_or(self.session.cookie_secure);
        }
        if let Ok(v) = env::var("SESSION_REFRESH_LEEWAY_SECS") {
            self.session.refresh_leeway_secs = v.parse().unwrap_or(self.session.refresh_leeway_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        if let Ok(v) = env::var("BRANDING_LOGO_URL") {
            self.branding.logo_url = v;
        }

        self
    }

    /// Copy of the configuration that is safe to print or log
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.supabase.anon_key = mask(&copy.supabase.anon_key);
        copy.supabase.jwt_secret = copy.supabase.jwt_secret.as_deref().map(mask);
        copy
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            supabase: SupabaseConfig {
                url: "http://localhost:54321".to_string(),
                anon_key: String::new(),
                jwt_secret: None,
                request_timeout_secs: 30,
            },
            storage: StorageConfig::defaults(10 * 1024 * 1024), // 10MB
            session: SessionConfig {
                access_cookie: "sb-access-token".to_string(),
                refresh_cookie: "sb-refresh-token".to_string(),
                cookie_secure: false,
                refresh_leeway_secs: 30,
                refresh_cookie_max_age_days: 30,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            branding: BrandingConfig::default(),
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.supabase.request_timeout_secs = 15;
        config.storage.max_upload_bytes = 5 * 1024 * 1024; // 5MB
        config.session.cookie_secure = true;
        config.security.cors_origins = vec!["https://staging.fatoreal.com.br".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.supabase.request_timeout_secs = 10;
        config.storage.max_upload_bytes = 5 * 1024 * 1024; // 5MB
        config.session.cookie_secure = true;
        config.security.cors_origins = vec!["https://www.fatoreal.com.br".to_string()];
        config
    }
}

impl StorageConfig {
    fn defaults(max_upload_bytes: usize) -> Self {
        Self {
            bucket: "capanoticia".to_string(),
            editor_prefix: "capanoticia".to_string(),
            cover_prefix: "noticia_capas".to_string(),
            cache_control_secs: 3600,
            max_upload_bytes,
        }
    }
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            logo_url: "https://oxwurygnhgaududxrjhe.supabase.co/storage/v1/object/public/capanoticia/capanoticia/Logo-fato-real-sf.png"
                .to_string(),
            site_label: "Acesse www.fatoreal.com.br".to_string(),
        }
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.bucket, "capanoticia");
        assert_eq!(config.storage.cache_control_secs, 3600);
        assert!(!config.session.cookie_secure);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.session.cookie_secure);
        assert_eq!(config.storage.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.storage.cover_prefix, "noticia_capas");
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = AppConfig::development();
        config.supabase.anon_key = "eyJhbGciOiJIUzI1NiJ9.secret".to_string();
        config.supabase.jwt_secret = Some("super-secret-jwt".to_string());

        let redacted = config.redacted();
        assert_eq!(redacted.supabase.anon_key, "eyJh…");
        assert_eq!(redacted.supabase.jwt_secret.as_deref(), Some("supe…"));
        assert_eq!(redacted.supabase.url, config.supabase.url);
    }
}
