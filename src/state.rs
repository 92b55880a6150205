//! Shared application state.
//!
//! The composition root for the process-wide singletons: configuration, the
//! call session store, the reservation log, and the configured extraction
//! strategy. Handlers receive it as `State<Arc<AppState>>`; nothing else in
//! the crate holds global mutable state.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::extract::{self, ExtractResult, FieldExtractor};
use crate::core::reservations::ReservationLog;
use crate::core::session::SessionStore;
use crate::core::twiml::VoiceResponseBuilder;

pub struct AppState {
    pub config: ServerConfig,
    pub sessions: SessionStore,
    pub reservations: ReservationLog,
    pub extractor: Arc<dyn FieldExtractor>,
}

impl AppState {
    /// Build the application state, constructing the extraction strategy the
    /// configuration selects.
    pub fn new(config: ServerConfig) -> ExtractResult<Arc<Self>> {
        let extractor = extract::build_extractor(&config)?;
        Ok(Arc::new(Self {
            sessions: SessionStore::new(),
            reservations: ReservationLog::new(),
            extractor,
            config,
        }))
    }

    /// TwiML builder wired with this deployment's voice, language, and
    /// speech callback URL.
    pub fn response_builder(&self) -> VoiceResponseBuilder {
        VoiceResponseBuilder::new(
            self.config.voice_name.clone(),
            self.config.speech_language.clone(),
            self.config.process_speech_url(),
        )
    }
}
