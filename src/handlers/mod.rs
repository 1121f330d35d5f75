pub mod catalog;
pub mod configurations;
pub mod health;
pub mod pricing;

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::pricing::EstimateRules;
use crate::storage::ConfigurationRepository;

/// Shared state for every HTTP handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub repository: ConfigurationRepository,
    pub rules: Arc<EstimateRules>,
}
