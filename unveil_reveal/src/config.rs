// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller and per-section configuration.

use unveil_viewport::check_threshold;

use crate::error::{InvalidArgument, RevealError};

/// Visible fraction a section needs before it activates, unless overridden.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Controller-wide settings.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RevealConfig {
    /// Threshold used for sections registered without their own.
    pub default_threshold: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl RevealConfig {
    /// Checks that the default threshold is within `[0, 1]`.
    pub fn validate(&self) -> Result<(), RevealError> {
        check_threshold::<()>(self.default_threshold)
            .map(|_| ())
            .map_err(|_| InvalidArgument::ThresholdOutOfRange(self.default_threshold).into())
    }
}

/// Per-section registration options.
///
/// ```
/// use unveil_reveal::SectionOptions;
///
/// // Reveal the hero 300ms after mount even if the viewport never reports it.
/// let options = SectionOptions::new().auto_reveal_after(300);
/// assert_eq!(options.auto_reveal_after_ms, Some(300));
/// assert_eq!(options.threshold, None);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SectionOptions {
    /// Overrides [`RevealConfig::default_threshold`].
    pub threshold: Option<f64>,
    /// Activates the section this long after registration if it has not
    /// been seen by then.
    pub auto_reveal_after_ms: Option<u64>,
}

impl SectionOptions {
    /// Options with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the visibility threshold.
    #[must_use]
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Sets the auto-reveal delay.
    #[must_use]
    pub fn auto_reveal_after(mut self, delay_ms: u64) -> Self {
        self.auto_reveal_after_ms = Some(delay_ms);
        self
    }
}
