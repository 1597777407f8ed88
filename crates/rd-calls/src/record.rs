use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::outcome::{derive, CallOutcome, OutcomeFields, View};

/// A call record as returned by `GET /api/calls[/{id}]`.
///
/// Fields the backend adds later are ignored here; the HTTP relay never goes
/// through this type, so they still reach dashboard clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "retellCallId", default)]
    pub retell_call_id: Option<String>,
    #[serde(rename = "agentId", default)]
    pub agent_id: Option<String>,

    #[serde(default)]
    pub caller_name: Option<String>,
    #[serde(default)]
    pub caller_phone: Option<String>,
    #[serde(default)]
    pub caller_email: Option<String>,

    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub customer_type: Option<String>,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub preferred_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,

    #[serde(default)]
    pub appointment_booked: Option<bool>,
    #[serde(default)]
    pub callback_requested: Option<bool>,

    #[serde(default)]
    pub call_outcome: Option<String>,
    #[serde(default)]
    pub call_summary: Option<String>,
    #[serde(default)]
    pub call_successful: Option<bool>,
}

impl CallRecord {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.created_at.trim())
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    pub fn outcome_fields(&self) -> OutcomeFields<'_> {
        OutcomeFields {
            call_outcome: self.call_outcome.as_deref(),
            appointment_booked: self.appointment_booked,
            callback_requested: self.callback_requested,
        }
    }

    pub fn outcome(&self, view: View) -> CallOutcome {
        derive(self.outcome_fields(), view)
    }
}
