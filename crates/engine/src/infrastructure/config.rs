//! Runtime configuration read from the environment.

use std::path::{Path, PathBuf};

use chrono::Duration;
use sidesa_domain::CooldownPolicy;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:sidesa.db?mode=rwc";
pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Root for uploaded documents. Regulation PDFs live in `regulations/` below it.
    pub uploads_dir: PathBuf,
    pub public_images_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub cooldown: CooldownPolicy,
}

impl AppConfig {
    /// Read configuration from environment variables, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let server_port = std::env::var("SERVER_PORT")
            .or_else(|_| std::env::var("PORT"))
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_SERVER_PORT);

        let allowance = parsed_var("EMERGENCY_ALLOWANCE").unwrap_or(CooldownPolicy::DEFAULT_ALLOWANCE);
        let block_seconds =
            parsed_var("EMERGENCY_BLOCK_SECONDS").unwrap_or(CooldownPolicy::DEFAULT_BLOCK_SECONDS);

        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.into()),
            server_host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port,
            uploads_dir: std::env::var("UPLOADS_DIR")
                .unwrap_or_else(|_| "uploads".into())
                .into(),
            public_images_dir: std::env::var("PUBLIC_IMAGES_DIR")
                .unwrap_or_else(|_| "public/images".into())
                .into(),
            max_upload_bytes: parsed_var("MAX_UPLOAD_BYTES").unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            cooldown: CooldownPolicy::new(allowance, Duration::seconds(block_seconds.max(0))),
        }
    }

    /// Upload limit as a request body limit for axum.
    pub fn body_limit(&self) -> usize {
        // Leave room for the multipart envelope and text fields.
        usize::try_from(self.max_upload_bytes)
            .unwrap_or(usize::MAX)
            .saturating_add(64 * 1024)
    }
}

/// Load `.env.local` then `.env` from the repository root. Values already in
/// the environment win.
pub fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");

    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_limit_exceeds_file_limit() {
        let config = AppConfig {
            database_url: DEFAULT_DATABASE_URL.into(),
            server_host: "127.0.0.1".into(),
            server_port: DEFAULT_SERVER_PORT,
            uploads_dir: "uploads".into(),
            public_images_dir: "public/images".into(),
            max_upload_bytes: 1024,
            cooldown: CooldownPolicy::default(),
        };
        assert!(config.body_limit() > 1024);
    }
}
