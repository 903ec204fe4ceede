//! SentiScope Core
//!
//! Types and policy shared across SentiScope components.
//!
//! This crate provides:
//! - The fixed six-label table the sentiment model emits
//! - The grouping policy (label → group → polarity score)
//! - Persisted record types
//! - Error types and result handling

pub mod error;
pub mod grouping;
pub mod label;
pub mod month;
pub mod record;

pub use error::{Error, Result};
pub use grouping::{classify_group, grouping, Group};
pub use label::{label_names, Label, LABELS};
pub use month::{month_names, Month, MONTHS};
pub use record::{ActionRecord, EventRecord, NewAction, NewSentiment, SentimentRecord};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::grouping::{grouping, Group};
    pub use crate::label::{Label, LABELS};
    pub use crate::month::Month;
    pub use crate::record::{ActionRecord, NewAction, NewSentiment, SentimentRecord};
}
