//! Infrastructure layer: the in-memory inventory store and everything around it.
//!
//! - `store`: the single application-wide state, guarded by one lock
//! - `journal`: append-only log of every domain event the store applied
//! - `read_model`: keyed tables holding the live aggregates
//! - `seed`: the demo data set the service starts with
//! - `reports` / `dashboard`: read-only views computed from the tables

pub mod config;
pub mod dashboard;
pub mod error;
pub mod journal;
pub mod read_model;
pub mod reports;
pub mod seed;
pub mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use journal::Journal;
pub use store::{ApprovalOutcome, InventoryStore, JournalBus, NewArticle, Verification};
