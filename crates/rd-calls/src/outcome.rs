use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The effective outcome of a call. Always exactly one of these; `Unknown` is
/// a display default and is never persisted as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Booked,
    InfoOnly,
    FollowUp,
    Unknown,
}

impl CallOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CallOutcome::Booked => "booked",
            CallOutcome::InfoOnly => "info_only",
            CallOutcome::FollowUp => "follow_up",
            CallOutcome::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CallOutcome::Booked => "Booked",
            CallOutcome::InfoOnly => "Info Only",
            CallOutcome::FollowUp => "Follow Up",
            CallOutcome::Unknown => "Unknown",
        }
    }

    /// Matches the persisted `call_outcome` text. Case and surrounding
    /// whitespace are ignored and the two-word spellings are accepted.
    /// `"unknown"` is not a persisted value and yields `None`.
    pub fn from_persisted(raw: &str) -> Option<CallOutcome> {
        match raw.trim().to_lowercase().as_str() {
            "booked" => Some(CallOutcome::Booked),
            "info_only" | "info only" => Some(CallOutcome::InfoOnly),
            "follow_up" | "follow up" => Some(CallOutcome::FollowUp),
            _ => None,
        }
    }

    /// Free-text entry from an editor: anything unrecognized means `Unknown`.
    pub fn from_input(raw: &str) -> CallOutcome {
        CallOutcome::from_persisted(raw).unwrap_or(CallOutcome::Unknown)
    }

    /// The value written to `call_outcome` on save.
    pub fn persisted(self) -> Option<&'static str> {
        match self {
            CallOutcome::Unknown => None,
            other => Some(other.as_str()),
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized call outcome `{0}` (expected booked, info_only, follow_up or unknown)")]
pub struct OutcomeParseError(pub String);

impl FromStr for CallOutcome {
    type Err = OutcomeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if let Some(outcome) = CallOutcome::from_persisted(raw) {
            return Ok(outcome);
        }
        if raw.trim().eq_ignore_ascii_case("unknown") {
            return Ok(CallOutcome::Unknown);
        }
        Err(OutcomeParseError(raw.to_string()))
    }
}

/// Which screen is asking. The list view lets `callback_requested` stand in
/// for a missing canonical outcome; the detail view ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Detail,
    List,
}

/// The raw persisted fields the outcome is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeFields<'a> {
    pub call_outcome: Option<&'a str>,
    pub appointment_booked: Option<bool>,
    pub callback_requested: Option<bool>,
}

/// Resolves the effective outcome. The canonical `call_outcome` text wins
/// whenever it is recognized; otherwise the legacy flags decide.
pub fn derive(fields: OutcomeFields<'_>, view: View) -> CallOutcome {
    if let Some(outcome) = fields.call_outcome.and_then(CallOutcome::from_persisted) {
        return outcome;
    }

    if fields.appointment_booked == Some(true) {
        return CallOutcome::Booked;
    }
    if view == View::List && fields.callback_requested == Some(true) {
        return CallOutcome::FollowUp;
    }
    if fields.appointment_booked == Some(false) {
        return CallOutcome::InfoOnly;
    }

    CallOutcome::Unknown
}

/// Detail-view derivation from the canonical field and the booked flag.
pub fn normalize(call_outcome: Option<&str>, appointment_booked: Option<bool>) -> CallOutcome {
    derive(
        OutcomeFields {
            call_outcome,
            appointment_booked,
            callback_requested: None,
        },
        View::Detail,
    )
}
