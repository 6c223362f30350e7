//! Service layer: validation and workflow logic over the repository

use std::sync::Arc;

use crate::db::Repository;

pub mod export;
pub mod metadata;
pub mod wizard;

pub use export::ExportService;
pub use metadata::MetadataService;
pub use wizard::WizardService;

/// Container for all services, injected into the routes
#[derive(Clone)]
pub struct AppState {
    pub repo: Repository,
    pub wizard: Arc<WizardService>,
    pub metadata: Arc<MetadataService>,
    pub export: Arc<ExportService>,
}

impl AppState {
    pub fn new(repo: Repository) -> Self {
        // Repository is cheap to clone (connection pool handle inside)
        Self {
            wizard: Arc::new(WizardService::new(repo.clone())),
            metadata: Arc::new(MetadataService::new(repo.clone())),
            export: Arc::new(ExportService::new(repo.clone())),
            repo,
        }
    }
}
