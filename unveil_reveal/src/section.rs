// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Section descriptors: what a view registers.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::error::{InvalidArgument, RevealError};

/// One named sub-element of a section and its delay from activation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    /// Key the view uses to look up this element's flag.
    pub key: String,
    /// Milliseconds between section activation and this reveal.
    pub delay_ms: u64,
}

impl Step {
    /// Creates a step.
    pub fn new(key: impl Into<String>, delay_ms: u64) -> Self {
        Self {
            key: key.into(),
            delay_ms,
        }
    }

    /// Creates a step from a signed delay, as read from untyped page data.
    ///
    /// ```
    /// use unveil_reveal::Step;
    ///
    /// assert_eq!(Step::try_new("intro", 300).unwrap().delay_ms, 300);
    /// assert!(Step::try_new("intro", -1).is_err());
    /// ```
    pub fn try_new(key: impl Into<String>, delay_ms: i64) -> Result<Self, RevealError> {
        let key = key.into();
        match u64::try_from(delay_ms) {
            Ok(delay_ms) => Ok(Self { key, delay_ms }),
            Err(_) => Err(InvalidArgument::NegativeDelay { key, delay_ms }.into()),
        }
    }
}

/// A named region of a view that reveals its steps once, when first seen.
///
/// ```
/// use unveil_reveal::Section;
///
/// let hero = Section::new("hero")
///     .step("title", 100)
///     .step("subtitle", 300)
///     .step("cta", 600);
/// assert_eq!(hero.steps.len(), 3);
/// assert!(hero.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Section {
    /// Unique id within one controller.
    pub id: String,
    /// Steps in declaration order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub steps: Vec<Step>,
}

impl Section {
    /// Creates a section with no steps.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
        }
    }

    /// Creates a section from a list of steps.
    pub fn with_steps(id: impl Into<String>, steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            id: id.into(),
            steps: steps.into_iter().collect(),
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, key: impl Into<String>, delay_ms: u64) -> Self {
        self.steps.push(Step::new(key, delay_ms));
        self
    }

    /// Checks that step keys are unique.
    pub fn validate(&self) -> Result<(), RevealError> {
        let mut seen = HashSet::with_capacity(self.steps.len());
        for step in &self.steps {
            if !seen.insert(step.key.as_str()) {
                return Err(InvalidArgument::DuplicateStepKey(step.key.clone()).into());
            }
        }
        Ok(())
    }
}

/// Lifecycle of a registered section.
///
/// `Registered` → `Activating` on first visibility, `Activating` → `Settled`
/// when the last step fires. Unregistering leaves the state machine from any
/// phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SectionPhase {
    /// Waiting to be seen.
    Registered,
    /// Seen; some steps have not fired yet.
    Activating,
    /// Every step has fired.
    Settled,
}
