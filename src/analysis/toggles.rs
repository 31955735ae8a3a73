use crate::connection::config::AnalysisParameters;
use std::sync::atomic::{AtomicBool, Ordering};

/// Operator switches that skip one analysis phase each.
///
/// Shared between the orchestrator and `setParameter`; read at the moment a
/// phase is about to start.
#[derive(Debug, Default)]
pub struct AnalysisToggles {
    skip_key_characteristics: AtomicBool,
    skip_read_write_distribution: AtomicBool,
}

impl AnalysisToggles {
    pub fn new(parameters: &AnalysisParameters) -> Self {
        Self {
            skip_key_characteristics: AtomicBool::new(parameters.skip_key_characteristics),
            skip_read_write_distribution: AtomicBool::new(parameters.skip_read_write_distribution),
        }
    }

    pub fn skip_key_characteristics(&self) -> bool {
        self.skip_key_characteristics.load(Ordering::SeqCst)
    }

    pub fn skip_read_write_distribution(&self) -> bool {
        self.skip_read_write_distribution.load(Ordering::SeqCst)
    }

    /// Returns the previous value.
    pub fn set_skip_key_characteristics(&self, skip: bool) -> bool {
        self.skip_key_characteristics.swap(skip, Ordering::SeqCst)
    }

    /// Returns the previous value.
    pub fn set_skip_read_write_distribution(&self, skip: bool) -> bool {
        self.skip_read_write_distribution.swap(skip, Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> AnalysisParameters {
        AnalysisParameters {
            skip_key_characteristics: self.skip_key_characteristics(),
            skip_read_write_distribution: self.skip_read_write_distribution(),
        }
    }
}
