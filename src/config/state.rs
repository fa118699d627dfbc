// Application state module
// Constructed once at process start and passed explicitly to handlers

use super::types::Config;

/// Shared application state.
///
/// Holds the immutable configuration for the lifetime of the process. There
/// is no runtime mutation: every request reads the same config, and the data
/// file is re-read per request rather than held here.
pub struct AppState {
    pub config: Config,
}

impl AppState {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}
