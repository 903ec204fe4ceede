//! SentiScope Store
//!
//! SQLite persistence for sentiment records, actions and the entities they
//! reference, plus the aggregate queries behind the dashboard endpoints.
//!
//! Repository functions take a `&Connection`; run them through
//! [`Store::call`] so each one gets its own connection and transaction.

pub mod actions;
pub mod analytics;
pub mod error;
pub mod import;
pub mod schema;
pub mod sentiments;
pub mod store;

pub use analytics::{Distribution, GroupCounts, MonthlyEvolution, Ranking, ScoreEntry};
pub use error::{Result, StoreError};
pub use import::{ImportFormat, ImportRow, ImportSummary};
pub use sentiments::SentimentFilter;
pub use store::Store;
