use rd_calls::{CallDraft, CallRecord, CallsView};
use std::fmt::Write;

const PLACEHOLDER: &str = "—";

pub fn render_list(view: &CallsView) -> String {
    let counts = &view.counts;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Total {}  Booked {}  Info Only {}  Follow Up {}  Unknown {}",
        counts.total, counts.booked, counts.info_only, counts.follow_up, counts.unknown
    );
    let _ = writeln!(out, "Showing {} call(s)", view.rows.len());

    if view.rows.is_empty() {
        let _ = writeln!(out, "No calls match your search/filter.");
        return out;
    }

    let _ = writeln!(
        out,
        "{:<26} {:<22} {:<16} {:<10} {:<20} {}",
        "ID", "CALLER", "PHONE", "STATUS", "INTENT", "CREATED"
    );
    for row in &view.rows {
        let record = &row.record;
        let _ = writeln!(
            out,
            "{:<26} {:<22} {:<16} {:<10} {:<20} {}",
            record.id,
            record.caller_name.as_deref().unwrap_or("Unknown Caller"),
            or_placeholder(&record.caller_phone),
            row.outcome.label(),
            or_placeholder(&record.intent),
            created(record),
        );
    }
    out
}

/// One record as the detail view shows it: editable projection plus status.
pub fn render_detail(record: &CallRecord, draft: &CallDraft) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:                 {}", record.id);
    let _ = writeln!(out, "Created:            {}", created(record));
    let _ = writeln!(
        out,
        "Status:             {} ({})",
        draft.outcome().label(),
        draft.outcome()
    );
    for (label, value) in [
        ("Name", &draft.caller_name),
        ("Phone", &draft.caller_phone),
        ("Email", &draft.caller_email),
        ("Intent", &draft.intent),
        ("Customer type", &draft.customer_type),
        ("Preferred date", &draft.preferred_date),
        ("Preferred time", &draft.preferred_time),
        ("Notes", &draft.notes),
        ("Summary", &draft.call_summary),
    ] {
        let shown = if value.is_empty() { PLACEHOLDER } else { value };
        let _ = writeln!(out, "{:<20}{}", format!("{label}:"), shown);
    }
    let _ = writeln!(out, "Appointment booked: {}", yes_no(draft.appointment_booked()));
    let _ = writeln!(out, "Callback requested: {}", yes_no(draft.callback_requested));
    let _ = writeln!(out, "Call successful:    {}", yes_no(draft.call_successful));
    out
}

fn created(record: &CallRecord) -> String {
    record
        .created_at()
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| record.created_at.clone())
}

fn or_placeholder(value: &Option<String>) -> &str {
    value
        .as_deref()
        .filter(|value| !value.is_empty())
        .unwrap_or(PLACEHOLDER)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
