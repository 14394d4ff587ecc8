use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_WIDTH: usize = 80;
pub const DEFAULT_HEIGHT: usize = 80;
/// Pause after every expansion step.
pub const DEFAULT_EXPANSION_DELAY_MS: u64 = 10;
/// Pause after every reconstruction step.
pub const DEFAULT_RECONSTRUCTION_DELAY_MS: u64 = 50;

/// Grid dimensions and animation pacing. The delays only pace the notifications a display
/// observes; setting both to zero gives a plain headless search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub width: usize,
    pub height: usize,
    pub expansion_delay_ms: u64,
    pub reconstruction_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> SearchConfig {
        SearchConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            expansion_delay_ms: DEFAULT_EXPANSION_DELAY_MS,
            reconstruction_delay_ms: DEFAULT_RECONSTRUCTION_DELAY_MS,
        }
    }
}

impl SearchConfig {
    /// A configuration without any pacing, for tests and non-visual hosts.
    pub fn headless(width: usize, height: usize) -> SearchConfig {
        SearchConfig {
            width,
            height,
            expansion_delay_ms: 0,
            reconstruction_delay_ms: 0,
        }
    }

    /// Parses a TOML document; keys that are left out keep their default value.
    ///
    /// ```
    /// use grid_visualizer_core::config::SearchConfig;
    /// let config = SearchConfig::from_toml_str("width = 20\nexpansion_delay_ms = 0").unwrap();
    /// assert_eq!(config.width, 20);
    /// assert_eq!(config.height, 80);
    /// ```
    pub fn from_toml_str(s: &str) -> Result<SearchConfig, ConfigError> {
        let config: SearchConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn with_size(mut self, width: usize, height: usize) -> SearchConfig {
        self.width = width;
        self.height = height;
        self
    }
    /// Delays are kept in whole milliseconds; anything in between is rounded up, so a non-zero
    /// delay never turns into no delay at all.
    pub fn with_expansion_delay(mut self, delay: Duration) -> SearchConfig {
        self.expansion_delay_ms = whole_millis(delay);
        self
    }
    pub fn with_reconstruction_delay(mut self, delay: Duration) -> SearchConfig {
        self.reconstruction_delay_ms = whole_millis(delay);
        self
    }

    pub fn expansion_delay(&self) -> Duration {
        Duration::from_millis(self.expansion_delay_ms)
    }
    pub fn reconstruction_delay(&self) -> Duration {
        Duration::from_millis(self.reconstruction_delay_ms)
    }
}

fn whole_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_nanos().div_ceil(1_000_000)).unwrap_or(u64::MAX)
}
