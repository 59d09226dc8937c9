use std::sync::Arc;

use crate::core::AppConfig;
use crate::storage::LocalStorage;

#[derive(Clone)]
pub struct ApiState {
    pub storage: LocalStorage,
    pub config: Arc<AppConfig>,
}

impl ApiState {
    pub fn new(config: AppConfig) -> Self {
        ApiState {
            storage: LocalStorage::from_config(&config),
            config: Arc::new(config),
        }
    }

    /// Prepara los directorios de trabajo; se ejecuta una vez antes de servir.
    pub fn initialize(&self) -> anyhow::Result<()> {
        self.storage.ensure_dirs()?;
        tracing::info!(
            uploads = %self.config.upload_dir.display(),
            output = %self.config.output_dir.display(),
            templates = %self.config.templates_dir.display(),
            "Storage directories ready"
        );
        Ok(())
    }
}
