mod batch;
mod google;
mod traits;

pub use batch::{BatchOptions, BatchOutput, BatchTranslator};
pub use google::GoogleTranslator;
pub use traits::{ProviderInfo, TranslationProvider, TranslationRequest, TranslationResult};

use crate::config::ProviderConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create a translation provider from configuration
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn TranslationProvider>> {
    let provider = GoogleTranslator::new(config)?;
    Ok(Arc::new(provider))
}
