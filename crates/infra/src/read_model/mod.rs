//! Read model storage for the store's live records.

pub mod table;

pub use table::Table;
