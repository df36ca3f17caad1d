// this_file: crates/glyphmesh-system/src/config.rs

//! Text render system configuration.

use glyphmesh_core::{GlyphMeshError, MissingGlyphPolicy, Result};
use serde::{Deserialize, Serialize};

/// Slot ids are 32-bit; index 0 is the sentinel.
const MAX_ADDRESSABLE_SLOTS: usize = u32::MAX as usize - 1;

/// Tunables for a [`TextRenderSystem`](crate::TextRenderSystem).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SystemConfig {
    /// Upper bound on live slots; `None` grows without limit
    pub max_slots: Option<usize>,
    /// Dedicated build workers; `None` uses the global rayon pool
    pub worker_threads: Option<usize>,
    pub missing_glyph: MissingGlyphPolicy,
    /// Slots reserved up front
    pub initial_slot_capacity: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_slots: None,
            worker_threads: None,
            missing_glyph: MissingGlyphPolicy::Skip,
            initial_slot_capacity: 64,
        }
    }
}

impl SystemConfig {
    /// Parse and validate a JSON configuration. Absent fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| GlyphMeshError::invalid_config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_slots == Some(0) {
            return Err(GlyphMeshError::invalid_config("maxSlots must be at least 1"));
        }
        if self.worker_threads == Some(0) {
            return Err(GlyphMeshError::invalid_config(
                "workerThreads must be at least 1",
            ));
        }
        if self.initial_slot_capacity > MAX_ADDRESSABLE_SLOTS {
            return Err(GlyphMeshError::invalid_config(format!(
                "initialSlotCapacity {} exceeds the {MAX_ADDRESSABLE_SLOTS} addressable slots",
                self.initial_slot_capacity
            )));
        }
        if let Some(max) = self.max_slots {
            if self.initial_slot_capacity > max {
                return Err(GlyphMeshError::invalid_config(format!(
                    "initialSlotCapacity {} exceeds maxSlots {max}",
                    self.initial_slot_capacity
                )));
            }
        }
        Ok(())
    }

    pub fn with_max_slots(mut self, max_slots: usize) -> Self {
        self.max_slots = Some(max_slots);
        self.initial_slot_capacity = self.initial_slot_capacity.min(max_slots);
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn with_missing_glyph(mut self, policy: MissingGlyphPolicy) -> Self {
        self.missing_glyph = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SystemConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.missing_glyph, MissingGlyphPolicy::Skip);
        assert_eq!(config.max_slots, None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            SystemConfig::from_json_str(r#"{"maxSlots": 128, "missingGlyph": "abort"}"#).unwrap();
        assert_eq!(config.max_slots, Some(128));
        assert_eq!(config.missing_glyph, MissingGlyphPolicy::Abort);
        assert_eq!(config.worker_threads, None);
        assert_eq!(config.initial_slot_capacity, 64);
    }

    #[test]
    fn test_rejects_zero_limits() {
        assert!(matches!(
            SystemConfig::from_json_str(r#"{"maxSlots": 0}"#),
            Err(GlyphMeshError::InvalidConfig { .. })
        ));
        assert!(matches!(
            SystemConfig::from_json_str(r#"{"workerThreads": 0}"#),
            Err(GlyphMeshError::InvalidConfig { .. })
        ));
        assert!(SystemConfig::from_json_str(r#"{"maxSlots": 4, "initialSlotCapacity": 8}"#)
            .is_err());
    }

    #[test]
    fn test_rejects_unaddressable_initial_capacity() {
        let err = SystemConfig::from_json_str(r#"{"initialSlotCapacity": 18446744073709551615}"#)
            .unwrap_err();
        assert!(matches!(err, GlyphMeshError::InvalidConfig { .. }));

        let config = SystemConfig {
            initial_slot_capacity: MAX_ADDRESSABLE_SLOTS + 1,
            ..SystemConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = SystemConfig::from_json_str("{maxSlots: }").unwrap_err();
        assert!(matches!(err, GlyphMeshError::InvalidConfig { .. }));
    }

    #[test]
    fn test_builder_clamps_capacity() {
        let config = SystemConfig::default().with_max_slots(8);
        assert_eq!(config.initial_slot_capacity, 8);
        assert!(config.validate().is_ok());
    }
}
