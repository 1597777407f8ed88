use serde::Serialize;

use crate::outcome::{CallOutcome, View};
use crate::record::CallRecord;

/// Editable projection of one call record.
///
/// `call_outcome` and `appointment_booked` are private: they only change
/// together, through [`CallDraft::set_outcome`] and
/// [`CallDraft::set_appointment_booked`], so a draft never holds a pair that
/// disagrees with the derivation rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDraft {
    pub caller_name: String,
    pub caller_phone: String,
    pub caller_email: String,
    pub intent: String,
    pub customer_type: String,
    pub preferred_date: String,
    pub preferred_time: String,
    pub notes: String,
    pub callback_requested: bool,
    pub call_summary: String,
    pub call_successful: bool,
    appointment_booked: bool,
    call_outcome: CallOutcome,
}

impl Default for CallDraft {
    fn default() -> Self {
        Self {
            caller_name: String::new(),
            caller_phone: String::new(),
            caller_email: String::new(),
            intent: String::new(),
            customer_type: String::new(),
            preferred_date: String::new(),
            preferred_time: String::new(),
            notes: String::new(),
            callback_requested: false,
            call_summary: String::new(),
            call_successful: false,
            appointment_booked: false,
            call_outcome: CallOutcome::Unknown,
        }
    }
}

impl CallDraft {
    pub fn from_record(record: &CallRecord) -> Self {
        Self {
            caller_name: text(&record.caller_name),
            caller_phone: text(&record.caller_phone),
            caller_email: text(&record.caller_email),
            intent: text(&record.intent),
            customer_type: text(&record.customer_type),
            preferred_date: text(&record.preferred_date),
            preferred_time: text(&record.preferred_time),
            notes: text(&record.notes),
            callback_requested: record.callback_requested.unwrap_or(false),
            call_summary: text(&record.call_summary),
            call_successful: record.call_successful.unwrap_or(false),
            appointment_booked: record.appointment_booked.unwrap_or(false),
            call_outcome: record.outcome(View::Detail),
        }
    }

    pub fn outcome(&self) -> CallOutcome {
        self.call_outcome
    }

    pub fn appointment_booked(&self) -> bool {
        self.appointment_booked
    }

    /// Picks an outcome. `Booked` and `InfoOnly` pin the booked flag;
    /// `FollowUp` and `Unknown` leave it alone.
    pub fn set_outcome(&mut self, outcome: CallOutcome) {
        match outcome {
            CallOutcome::Booked => self.appointment_booked = true,
            CallOutcome::InfoOnly => self.appointment_booked = false,
            CallOutcome::FollowUp | CallOutcome::Unknown => {}
        }
        self.call_outcome = outcome;
    }

    /// Free-text outcome entry; unrecognized text becomes `Unknown`.
    pub fn set_outcome_text(&mut self, raw: &str) {
        self.set_outcome(CallOutcome::from_input(raw));
    }

    /// Checking the box forces `Booked`. Unchecking only demotes a `Booked`
    /// outcome to `InfoOnly`; other outcomes are kept.
    pub fn set_appointment_booked(&mut self, checked: bool) {
        self.appointment_booked = checked;
        if checked {
            self.call_outcome = CallOutcome::Booked;
        } else if self.call_outcome == CallOutcome::Booked {
            self.call_outcome = CallOutcome::InfoOnly;
        }
    }

    pub fn to_patch(&self) -> CallPatch {
        CallPatch {
            caller_name: optional(&self.caller_name),
            caller_phone: optional(&self.caller_phone),
            caller_email: optional(&self.caller_email),
            intent: optional(&self.intent),
            customer_type: optional(&self.customer_type),
            preferred_date: optional(&self.preferred_date),
            preferred_time: optional(&self.preferred_time),
            notes: optional(&self.notes),
            appointment_booked: self.appointment_booked,
            callback_requested: self.callback_requested,
            call_outcome: self.call_outcome.persisted(),
            call_summary: optional(&self.call_summary),
            call_successful: self.call_successful,
        }
    }
}

/// Body of `PATCH /api/calls/{id}`: every editable field, empty text as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallPatch {
    pub caller_name: Option<String>,
    pub caller_phone: Option<String>,
    pub caller_email: Option<String>,
    pub intent: Option<String>,
    pub customer_type: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub notes: Option<String>,
    pub appointment_booked: bool,
    pub callback_requested: bool,
    pub call_outcome: Option<&'static str>,
    pub call_summary: Option<String>,
    pub call_successful: bool,
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(fields: serde_json::Value) -> CallRecord {
        let mut base = json!({ "id": "c_1", "createdAt": "2025-01-04T10:15:00Z" });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), fields.as_object()) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(base).expect("record")
    }

    fn draft(outcome: CallOutcome, booked: bool) -> CallDraft {
        CallDraft {
            appointment_booked: booked,
            call_outcome: outcome,
            ..CallDraft::default()
        }
    }

    #[test]
    fn from_record_derives_outcome_and_flattens_nulls() {
        let draft = CallDraft::from_record(&record(json!({
            "caller_name": "Dana",
            "caller_phone": null,
            "appointment_booked": true,
            "callback_requested": null,
            "call_outcome": null
        })));

        assert_eq!(draft.caller_name, "Dana");
        assert_eq!(draft.caller_phone, "");
        assert!(draft.appointment_booked());
        assert!(!draft.callback_requested);
        assert_eq!(draft.outcome(), CallOutcome::Booked);
    }

    #[test]
    fn from_record_keeps_canonical_outcome_over_flag() {
        let draft = CallDraft::from_record(&record(json!({
            "appointment_booked": true,
            "call_outcome": "Follow Up"
        })));

        assert_eq!(draft.outcome(), CallOutcome::FollowUp);
        assert!(draft.appointment_booked());
    }

    #[test]
    fn toggling_booked_round_trips_info_only() {
        let mut draft = draft(CallOutcome::InfoOnly, false);

        draft.set_appointment_booked(true);
        assert_eq!(draft.outcome(), CallOutcome::Booked);
        assert!(draft.appointment_booked());

        draft.set_appointment_booked(false);
        assert_eq!(draft.outcome(), CallOutcome::InfoOnly);
        assert!(!draft.appointment_booked());
    }

    #[test]
    fn unchecking_booked_keeps_non_booked_outcome() {
        let mut draft = draft(CallOutcome::FollowUp, true);
        draft.set_appointment_booked(false);
        assert_eq!(draft.outcome(), CallOutcome::FollowUp);
        assert!(!draft.appointment_booked());
    }

    #[test]
    fn follow_up_leaves_booked_flag_alone() {
        let mut draft = draft(CallOutcome::Booked, true);
        draft.set_outcome(CallOutcome::FollowUp);
        assert_eq!(draft.outcome(), CallOutcome::FollowUp);
        assert!(draft.appointment_booked());

        draft.set_outcome(CallOutcome::Unknown);
        assert!(draft.appointment_booked());
    }

    #[test]
    fn booked_and_info_only_pin_the_flag() {
        let mut draft = draft(CallOutcome::Unknown, false);
        draft.set_outcome(CallOutcome::Booked);
        assert!(draft.appointment_booked());

        draft.set_outcome(CallOutcome::InfoOnly);
        assert!(!draft.appointment_booked());
        assert_eq!(draft.outcome(), CallOutcome::InfoOnly);
    }

    #[test]
    fn outcome_text_entry_syncs_like_a_button() {
        let mut draft = draft(CallOutcome::Unknown, false);
        draft.set_outcome_text(" BOOKED ");
        assert_eq!(draft.outcome(), CallOutcome::Booked);
        assert!(draft.appointment_booked());

        draft.set_outcome_text("call back later");
        assert_eq!(draft.outcome(), CallOutcome::Unknown);
        assert!(draft.appointment_booked());
    }

    #[test]
    fn patch_sends_null_for_unknown_outcome_and_empty_text() {
        let mut draft = draft(CallOutcome::Booked, true);
        draft.caller_name = "Dana".into();
        draft.set_outcome(CallOutcome::Unknown);

        let body = serde_json::to_value(draft.to_patch()).expect("patch json");
        assert_eq!(body["call_outcome"], serde_json::Value::Null);
        assert_eq!(body["caller_name"], json!("Dana"));
        assert_eq!(body["caller_email"], serde_json::Value::Null);
        assert_eq!(body["appointment_booked"], json!(true));
        assert_eq!(body["call_successful"], json!(false));
        assert!(body.as_object().unwrap().contains_key("call_outcome"));
    }

    #[test]
    fn patch_writes_canonical_outcome_text() {
        let mut draft = draft(CallOutcome::Unknown, false);
        draft.set_outcome(CallOutcome::FollowUp);
        assert_eq!(draft.to_patch().call_outcome, Some("follow_up"));
    }
}
