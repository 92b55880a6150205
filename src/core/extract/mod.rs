mod base;
pub mod openai;

pub use base::{ExtractError, ExtractOutcome, ExtractResult, FieldExtractor};
pub use openai::{ConversationalExtractor, OpenAIExtractorConfig, StatelessExtractor};

use std::sync::Arc;

use crate::config::{ExtractorMode, ServerConfig};

/// Build the extraction strategy selected by configuration.
pub fn build_extractor(config: &ServerConfig) -> ExtractResult<Arc<dyn FieldExtractor>> {
    let extractor_config = OpenAIExtractorConfig::from_server_config(config);
    Ok(match config.extractor_mode {
        ExtractorMode::Stateless => Arc::new(StatelessExtractor::new(extractor_config)?),
        ExtractorMode::Conversational => {
            Arc::new(ConversationalExtractor::new(extractor_config)?)
        }
    })
}
