//! Detected moment models.

use serde::{Deserialize, Serialize};

/// A timestamp field on a moment, in seconds.
///
/// The analysis service is instructed to return string-encoded numbers,
/// but it does not always comply. A value that fails numeric coercion is
/// kept verbatim as `Raw` so the validation stage can reject it with a
/// useful log line instead of the record disappearing silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeField {
    /// Successfully parsed seconds value.
    Seconds(f64),
    /// Original service output that did not parse as a number.
    Raw(String),
}

impl TimeField {
    /// Parse a service-provided string into a time field.
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<f64>() {
            Ok(secs) => Self::Seconds(secs),
            Err(_) => Self::Raw(value.to_string()),
        }
    }

    /// Seconds value, if the field parsed.
    pub fn seconds(&self) -> Option<f64> {
        match self {
            Self::Seconds(s) => Some(*s),
            Self::Raw(_) => None,
        }
    }

    /// True if the field carries an unparsed service value.
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// Shift a parsed value by `offset` seconds; `Raw` is left untouched.
    pub fn offset_by(&self, offset: f64) -> Self {
        match self {
            Self::Seconds(s) => Self::Seconds(s + offset),
            Self::Raw(raw) => Self::Raw(raw.clone()),
        }
    }
}

impl From<f64> for TimeField {
    fn from(secs: f64) -> Self {
        Self::Seconds(secs)
    }
}

/// A noteworthy moment detected in a video.
///
/// Produced by the analysis client in segment-local time, rebased into
/// absolute video time by the pipeline, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moment {
    /// Why this moment is significant.
    pub reason: String,

    /// Start time in seconds.
    pub start: TimeField,

    /// End time in seconds.
    pub end: TimeField,
}

impl Moment {
    /// Create a moment with parsed timestamps.
    pub fn new(reason: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            reason: reason.into(),
            start: TimeField::Seconds(start),
            end: TimeField::Seconds(end),
        }
    }

    /// Rebase both timestamps by a segment's absolute start offset.
    pub fn rebased(&self, offset: f64) -> Self {
        Self {
            reason: self.reason.clone(),
            start: self.start.offset_by(offset),
            end: self.end.offset_by(offset),
        }
    }

    /// True if either timestamp failed numeric coercion.
    pub fn has_raw_field(&self) -> bool {
        self.start.is_raw() || self.end.is_raw()
    }
}
