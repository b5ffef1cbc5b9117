// Copyright 2025 the Unveil Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by the reveal controller.

use alloc::string::String;
use core::fmt;

use unveil_viewport::ObserveError;

/// Why an argument was rejected.
#[derive(Clone, Debug, PartialEq)]
pub enum InvalidArgument {
    /// A visibility threshold was NaN, infinite, or outside `[0, 1]`.
    ThresholdOutOfRange(f64),
    /// The viewport watcher already observes a target with this id.
    TargetAlreadyObserved(String),
    /// A step was declared with a negative delay.
    NegativeDelay {
        /// Key of the offending step.
        key: String,
        /// The delay as declared.
        delay_ms: i64,
    },
    /// Two steps of one section share a key.
    DuplicateStepKey(String),
}

impl fmt::Display for InvalidArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThresholdOutOfRange(t) => write!(f, "threshold {t} is outside [0, 1]"),
            Self::TargetAlreadyObserved(id) => write!(f, "target {id:?} is already observed"),
            Self::NegativeDelay { key, delay_ms } => {
                write!(f, "step {key:?} has negative delay {delay_ms}ms")
            }
            Self::DuplicateStepKey(key) => write!(f, "step key {key:?} appears more than once"),
        }
    }
}

/// Error returned by [`RevealController`](crate::RevealController) operations.
///
/// Every variant is local to the failing call; the controller's state is
/// unchanged when an error is returned.
#[derive(Clone, Debug, PartialEq)]
pub enum RevealError {
    /// A threshold or step list was malformed.
    InvalidArgument(InvalidArgument),
    /// A section with this id is already registered.
    DuplicateSection(String),
    /// No section with this id is registered.
    UnknownSection(String),
}

impl fmt::Display for RevealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(reason) => write!(f, "invalid argument: {reason}"),
            Self::DuplicateSection(id) => write!(f, "section {id:?} is already registered"),
            Self::UnknownSection(id) => write!(f, "section {id:?} is not registered"),
        }
    }
}

impl core::error::Error for RevealError {}

impl From<InvalidArgument> for RevealError {
    fn from(reason: InvalidArgument) -> Self {
        Self::InvalidArgument(reason)
    }
}

impl From<ObserveError<String>> for RevealError {
    fn from(err: ObserveError<String>) -> Self {
        match err {
            ObserveError::ThresholdOutOfRange(t) => InvalidArgument::ThresholdOutOfRange(t).into(),
            ObserveError::AlreadyObserved(id) => InvalidArgument::TargetAlreadyObserved(id).into(),
        }
    }
}
