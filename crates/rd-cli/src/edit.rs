use clap::{ArgAction, Args};
use rd_calls::CallDraft;

/// Field edits for one call. Unset flags keep the loaded value; an empty
/// string clears a text field.
#[derive(Args, Debug, Default)]
pub struct EditArgs {
    #[arg(long)]
    pub caller_name: Option<String>,
    #[arg(long)]
    pub caller_phone: Option<String>,
    #[arg(long)]
    pub caller_email: Option<String>,
    #[arg(long)]
    pub intent: Option<String>,
    #[arg(long)]
    pub customer_type: Option<String>,
    #[arg(long)]
    pub preferred_date: Option<String>,
    #[arg(long)]
    pub preferred_time: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub call_summary: Option<String>,
    #[arg(long, action = ArgAction::Set)]
    pub callback_requested: Option<bool>,
    #[arg(long, action = ArgAction::Set)]
    pub call_successful: Option<bool>,
    #[arg(long, action = ArgAction::Set)]
    pub appointment_booked: Option<bool>,
    /// Typed outcome, e.g. "booked" or "follow up". Unrecognized text saves as unknown.
    #[arg(long)]
    pub outcome_text: Option<String>,
}

impl EditArgs {
    pub fn is_empty(&self) -> bool {
        let texts = [
            &self.caller_name,
            &self.caller_phone,
            &self.caller_email,
            &self.intent,
            &self.customer_type,
            &self.preferred_date,
            &self.preferred_time,
            &self.notes,
            &self.call_summary,
            &self.outcome_text,
        ];
        let flags = [
            self.callback_requested,
            self.call_successful,
            self.appointment_booked,
        ];
        texts.iter().all(|value| value.is_none()) && flags.iter().all(Option::is_none)
    }

    /// The booked flag is applied before the outcome text, so an explicit
    /// outcome decides the final pair.
    pub fn apply(&self, draft: &mut CallDraft) {
        for (target, value) in [
            (&mut draft.caller_name, &self.caller_name),
            (&mut draft.caller_phone, &self.caller_phone),
            (&mut draft.caller_email, &self.caller_email),
            (&mut draft.intent, &self.intent),
            (&mut draft.customer_type, &self.customer_type),
            (&mut draft.preferred_date, &self.preferred_date),
            (&mut draft.preferred_time, &self.preferred_time),
            (&mut draft.notes, &self.notes),
            (&mut draft.call_summary, &self.call_summary),
        ] {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }
        if let Some(callback) = self.callback_requested {
            draft.callback_requested = callback;
        }
        if let Some(successful) = self.call_successful {
            draft.call_successful = successful;
        }
        if let Some(booked) = self.appointment_booked {
            draft.set_appointment_booked(booked);
        }
        if let Some(raw) = &self.outcome_text {
            draft.set_outcome_text(raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rd_calls::CallOutcome;

    #[test]
    fn no_flags_is_empty() {
        assert!(EditArgs::default().is_empty());
        let edits = EditArgs {
            call_successful: Some(false),
            ..EditArgs::default()
        };
        assert!(!edits.is_empty());
    }

    #[test]
    fn apply_sets_only_given_fields() {
        let mut draft = CallDraft::default();
        draft.caller_name = "Dana".to_string();
        draft.notes = "old".to_string();

        EditArgs {
            notes: Some(String::new()),
            intent: Some("reschedule".to_string()),
            callback_requested: Some(true),
            ..EditArgs::default()
        }
        .apply(&mut draft);

        assert_eq!(draft.caller_name, "Dana");
        assert_eq!(draft.notes, "");
        assert_eq!(draft.intent, "reschedule");
        assert!(draft.callback_requested);
        assert_eq!(draft.outcome(), CallOutcome::Unknown);
    }

    #[test]
    fn outcome_text_wins_over_booked_flag() {
        let mut draft = CallDraft::default();
        EditArgs {
            appointment_booked: Some(true),
            outcome_text: Some(" Info Only ".to_string()),
            ..EditArgs::default()
        }
        .apply(&mut draft);

        assert_eq!(draft.outcome(), CallOutcome::InfoOnly);
        assert!(!draft.appointment_booked());
    }

    #[test]
    fn unrecognized_outcome_text_is_unknown_and_keeps_flag() {
        let mut draft = CallDraft::default();
        draft.set_appointment_booked(true);
        EditArgs {
            outcome_text: Some("call back later".to_string()),
            ..EditArgs::default()
        }
        .apply(&mut draft);

        assert_eq!(draft.outcome(), CallOutcome::Unknown);
        assert!(draft.appointment_booked());
    }
}
