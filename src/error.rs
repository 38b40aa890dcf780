//! Error types.
//!
//! [`Error`] is returned by the fallible API surface (JSON bridges, option
//! loading). [`LayoutIssue`] describes recoverable data-shape problems found
//! while laying out a score; those never abort the layout and are collected
//! on the returned [`crate::ScoreLayout`].

use serde::Serialize;
use thiserror::Error;

/// Fatal API errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid layout options: {0}")]
    InvalidOptions(String),
}

/// Recoverable problems encountered during layout.
///
/// Each variant locates the problem by part index, measure index and (where
/// there is one) element index within the measure.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LayoutIssue {
    /// A required field is missing; the element was skipped.
    #[error("malformed score at part {part}, measure {measure}, element {element}: {reason}")]
    MalformedScore {
        part: usize,
        measure: usize,
        element: usize,
        reason: String,
    },

    /// A tie/slur/tuplet start or stop without its counterpart; no curve emitted.
    #[error("dangling {notation} at part {part}, measure {measure}: {reason}")]
    DanglingNotation {
        part: usize,
        measure: usize,
        element: Option<usize>,
        notation: String,
        reason: String,
    },

    /// A backup rewound past the start of the measure; the cursor was clamped.
    #[error("backup at part {part}, measure {measure}, element {element} rewinds {overshoot:.1}px before the measure start")]
    NegativeCursor {
        part: usize,
        measure: usize,
        element: usize,
        overshoot: f64,
    },

    /// A value outside the recognized enumerations; the default was used.
    #[error("unknown {field} at part {part}, measure {measure}, element {element}; using default")]
    UnknownVariant {
        part: usize,
        measure: usize,
        element: usize,
        field: String,
    },
}

impl LayoutIssue {
    pub fn part(&self) -> usize {
        match self {
            LayoutIssue::MalformedScore { part, .. }
            | LayoutIssue::DanglingNotation { part, .. }
            | LayoutIssue::NegativeCursor { part, .. }
            | LayoutIssue::UnknownVariant { part, .. } => *part,
        }
    }
}

/// Collects issues in encounter order and mirrors each to the log.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    issues: Vec<LayoutIssue>,
}

impl Diagnostics {
    pub(crate) fn report(&mut self, issue: LayoutIssue) {
        log::warn!("{issue}");
        self.issues.push(issue);
    }

    pub(crate) fn into_issues(self) -> Vec<LayoutIssue> {
        self.issues
    }
}
