//! Block layout configuration.
//!
//! The simulated memory is a fixed sequence of blocks. Their capacities are
//! given once, in physical order, and never change afterwards.
//!
//! # Examples
//!
//! ```rust
//! use bestfit_sim::config::AllocatorConfig;
//!
//! let config = AllocatorConfig::builder()
//!     .capacity(100)
//!     .capacity(500)
//!     .build();
//!
//! assert_eq!(config.capacities, vec![100, 500]);
//! assert!(config.validate().is_ok());
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Capacities of the reference deployment, in KB.
pub const DEFAULT_CAPACITIES: [u64; 6] = [80, 250, 325, 550, 1000, 150];

/// Configuration for the allocator.
///
/// Sizes are unit-agnostic positive integers; the reference deployment
/// reads them as KB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Block capacities in physical (index) order.
    pub capacities: Vec<u64>,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            capacities: DEFAULT_CAPACITIES.to_vec(),
        }
    }
}

/// Either shape accepted by [`AllocatorConfig::from_json`].
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigRepr {
    Full(AllocatorConfig),
    Bare(Vec<u64>),
}

impl AllocatorConfig {
    /// Create a config with the given capacities.
    pub fn with_capacities(capacities: impl Into<Vec<u64>>) -> Self {
        Self {
            capacities: capacities.into(),
        }
    }

    /// Create a new builder for `AllocatorConfig`.
    pub fn builder() -> AllocatorConfigBuilder {
        AllocatorConfigBuilder::default()
    }

    /// Parse a config from JSON.
    ///
    /// Accepts `{"capacities": [...]}` or a bare array of capacities.
    /// The result is validated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bestfit_sim::config::AllocatorConfig;
    ///
    /// let a = AllocatorConfig::from_json(r#"{"capacities": [10, 20]}"#).unwrap();
    /// let b = AllocatorConfig::from_json("[10, 20]").unwrap();
    /// assert_eq!(a, b);
    ///
    /// assert!(AllocatorConfig::from_json("[]").is_err());
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let repr: ConfigRepr = serde_json::from_str(json)
            .map_err(|e| Error::invalid_configuration(format!("malformed config: {e}")))?;

        let config = match repr {
            ConfigRepr::Full(config) => config,
            ConfigRepr::Bare(capacities) => Self::with_capacities(capacities),
        };
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Check that at least one block exists, every capacity is positive, and
    /// the capacities sum without overflowing `u64`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfiguration` otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.capacities.is_empty() {
            return Err(Error::invalid_configuration("capacity list is empty"));
        }

        if let Some(index) = self.capacities.iter().position(|&c| c == 0) {
            return Err(Error::invalid_configuration(format!(
                "block {} has zero capacity",
                index
            )));
        }

        if self
            .capacities
            .iter()
            .try_fold(0u64, |total, &c| total.checked_add(c))
            .is_none()
        {
            return Err(Error::invalid_configuration(
                "total capacity overflows u64",
            ));
        }

        Ok(())
    }

    /// Number of blocks described.
    pub fn num_blocks(&self) -> usize {
        self.capacities.len()
    }

    /// Sum of all capacities, saturating at `u64::MAX`.
    pub fn total_capacity(&self) -> u64 {
        self.capacities
            .iter()
            .fold(0u64, |total, &c| total.saturating_add(c))
    }
}

/// Parse a comma separated capacity list such as `"80,250,325"`.
///
/// Blank entries around commas are ignored, so a trailing comma is fine.
///
/// # Errors
///
/// Returns `Error::InvalidConfiguration` for a non-numeric entry, and for
/// anything [`AllocatorConfig::validate`] rejects.
///
/// # Examples
///
/// ```rust
/// use bestfit_sim::config::parse_capacities;
///
/// let config = parse_capacities("150, 150").unwrap();
/// assert_eq!(config.capacities, vec![150, 150]);
///
/// assert!(parse_capacities("80,abc").is_err());
/// assert!(parse_capacities("80,0").is_err());
/// ```
pub fn parse_capacities(list: &str) -> Result<AllocatorConfig> {
    let capacities = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u64>()
                .map_err(|_| Error::invalid_configuration(format!("'{}' is not a capacity", s)))
        })
        .collect::<Result<Vec<_>>>()?;

    let config = AllocatorConfig::with_capacities(capacities);
    config.validate()?;
    Ok(config)
}

/// Builder for `AllocatorConfig`.
#[derive(Debug, Default)]
pub struct AllocatorConfigBuilder {
    capacities: Vec<u64>,
}

impl AllocatorConfigBuilder {
    /// Append one block.
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacities.push(capacity);
        self
    }

    /// Append several blocks in order.
    pub fn capacities(mut self, capacities: impl IntoIterator<Item = u64>) -> Self {
        self.capacities.extend(capacities);
        self
    }

    /// Build the configuration.
    ///
    /// An empty builder yields the reference layout.
    pub fn build(self) -> AllocatorConfig {
        if self.capacities.is_empty() {
            AllocatorConfig::default()
        } else {
            AllocatorConfig::with_capacities(self.capacities)
        }
    }
}
