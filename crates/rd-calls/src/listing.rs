use serde::Serialize;
use std::cmp::Reverse;
use std::str::FromStr;

use crate::outcome::{CallOutcome, OutcomeParseError, View};
use crate::record::CallRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutcomeFilter {
    #[default]
    All,
    Only(CallOutcome),
}

impl OutcomeFilter {
    pub fn matches(self, outcome: CallOutcome) -> bool {
        match self {
            OutcomeFilter::All => true,
            OutcomeFilter::Only(wanted) => wanted == outcome,
        }
    }
}

impl FromStr for OutcomeFilter {
    type Err = OutcomeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(OutcomeFilter::All);
        }
        raw.parse().map(OutcomeFilter::Only)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub total: usize,
    pub booked: usize,
    pub info_only: usize,
    pub follow_up: usize,
    pub unknown: usize,
}

impl OutcomeCounts {
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a CallRecord>) -> Self {
        let mut counts = OutcomeCounts::default();
        for record in records {
            counts.total += 1;
            match record.outcome(View::List) {
                CallOutcome::Booked => counts.booked += 1,
                CallOutcome::InfoOnly => counts.info_only += 1,
                CallOutcome::FollowUp => counts.follow_up += 1,
                CallOutcome::Unknown => counts.unknown += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallRow {
    pub record: CallRecord,
    pub outcome: CallOutcome,
}

/// The calls list: newest first, searched and filtered, with counts taken
/// over every record regardless of search or filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallsView {
    pub rows: Vec<CallRow>,
    pub counts: OutcomeCounts,
}

impl CallsView {
    pub fn build(mut records: Vec<CallRecord>, query: &str, filter: OutcomeFilter) -> Self {
        let counts = OutcomeCounts::tally(&records);
        sort_newest_first(&mut records);

        let rows = records
            .into_iter()
            .filter(|record| matches_search(record, query))
            .map(|record| {
                let outcome = record.outcome(View::List);
                CallRow { record, outcome }
            })
            .filter(|row| filter.matches(row.outcome))
            .collect();

        Self { rows, counts }
    }
}

/// Descending by `createdAt`. Records whose timestamp does not parse go last;
/// equal keys keep backend order.
pub fn sort_newest_first(records: &mut [CallRecord]) {
    records.sort_by_cached_key(|record| Reverse(record.created_at()));
}

/// Name and intent match case-insensitively; the phone number is matched as typed.
pub fn matches_search(record: &CallRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let lowered = query.to_lowercase();
    let contains_lowered = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|value| value.to_lowercase().contains(&lowered))
    };

    contains_lowered(&record.caller_name)
        || record
            .caller_phone
            .as_deref()
            .is_some_and(|phone| phone.contains(query))
        || contains_lowered(&record.intent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, created_at: &str, extra: serde_json::Value) -> CallRecord {
        let mut value = json!({ "id": id, "createdAt": created_at });
        if let (Some(base), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            for (key, field) in extra {
                base.insert(key.clone(), field.clone());
            }
        }
        serde_json::from_value(value).expect("record")
    }

    fn sample() -> Vec<CallRecord> {
        vec![
            record(
                "old",
                "2025-01-01T09:00:00Z",
                json!({ "caller_name": "Ana Ruiz", "appointment_booked": true }),
            ),
            record(
                "new",
                "2025-01-03T09:00:00Z",
                json!({
                    "caller_name": "Ben",
                    "caller_phone": "+1-555-0100",
                    "call_outcome": "info only"
                }),
            ),
            record(
                "mid",
                "2025-01-02T09:00:00Z",
                json!({
                    "intent": "Reschedule",
                    "appointment_booked": false,
                    "callback_requested": true
                }),
            ),
            record("bad", "not a date", json!({})),
        ]
    }

    #[test]
    fn sorts_newest_first_with_unparsable_last() {
        let mut records = sample();
        sort_newest_first(&mut records);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old", "bad"]);
    }

    #[test]
    fn search_matches_name_phone_and_intent() {
        let records = sample();
        assert!(matches_search(&records[0], "ana"));
        assert!(matches_search(&records[1], "555-01"));
        assert!(matches_search(&records[2], "RESCHED"));
        assert!(!matches_search(&records[3], "ana"));
        assert!(matches_search(&records[3], ""));
    }

    #[test]
    fn counts_cover_all_records_with_list_fallback() {
        let view = CallsView::build(sample(), "zzz", OutcomeFilter::All);
        assert!(view.rows.is_empty());
        assert_eq!(
            view.counts,
            OutcomeCounts {
                total: 4,
                booked: 1,
                info_only: 1,
                follow_up: 1,
                unknown: 1,
            }
        );
    }

    #[test]
    fn filter_selects_one_outcome() {
        let view = CallsView::build(sample(), "", OutcomeFilter::Only(CallOutcome::FollowUp));
        let ids: Vec<_> = view.rows.iter().map(|row| row.record.id.as_str()).collect();
        assert_eq!(ids, vec!["mid"]);
        assert_eq!(view.rows[0].outcome, CallOutcome::FollowUp);
    }

    #[test]
    fn filter_parses_all_and_outcomes() {
        assert_eq!("ALL".parse::<OutcomeFilter>(), Ok(OutcomeFilter::All));
        assert_eq!(
            "info_only".parse::<OutcomeFilter>(),
            Ok(OutcomeFilter::Only(CallOutcome::InfoOnly))
        );
        assert!("everything".parse::<OutcomeFilter>().is_err());
    }
}
