//! Shared application state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rom_core::AnalysisConfig;
use rom_session::FrameAnalyzer;

/// State cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    analyzer: FrameAnalyzer,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Wraps an analyzer.
    pub fn new(analyzer: FrameAnalyzer) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                analyzer,
                started_at: Utc::now(),
            }),
        }
    }

    /// State with the default movement registry and an in-memory store.
    pub fn from_config(config: AnalysisConfig) -> Self {
        Self::new(FrameAnalyzer::in_memory(config))
    }

    pub fn analyzer(&self) -> &FrameAnalyzer {
        &self.inner.analyzer
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(AnalysisConfig::default())
    }
}
