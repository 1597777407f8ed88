//! Call records as served by the voice-agent backend, and the pure logic that
//! turns their overlapping outcome fields into one display state.

pub mod draft;
pub mod listing;
pub mod outcome;
pub mod record;

pub use draft::{CallDraft, CallPatch};
pub use listing::{CallRow, CallsView, OutcomeCounts, OutcomeFilter};
pub use outcome::{derive, normalize, CallOutcome, OutcomeFields, OutcomeParseError, View};
pub use record::CallRecord;
