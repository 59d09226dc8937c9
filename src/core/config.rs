use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub max_upload_size_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("output"),
            templates_dir: PathBuf::from("templates"),
            max_upload_size_bytes: 52_428_800, // 50MB
        }
    }
}

impl AppConfig {
    /// Carga la configuración: valores por defecto y luego variables de entorno
    /// (`HOST`, `PORT`, `UPLOAD_DIR`, `OUTPUT_DIR`, `TEMPLATES_DIR`,
    /// `MAX_UPLOAD_SIZE_BYTES`).
    pub fn load() -> Result<Self> {
        let defaults = AppConfig::default();

        let settings = config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("upload_dir", path_default(&defaults.upload_dir))?
            .set_default("output_dir", path_default(&defaults.output_dir))?
            .set_default("templates_dir", path_default(&defaults.templates_dir))?
            .set_default("max_upload_size_bytes", defaults.max_upload_size_bytes as i64)?
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .context("Failed to build configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration values")
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn path_default(path: &std::path::Path) -> String {
    path.to_string_lossy().into_owned()
}
