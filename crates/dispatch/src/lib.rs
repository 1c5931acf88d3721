//! Dispatch domain module (goods leaving the stockroom).
//!
//! An outbound dispatch records one customer order: its header (order number,
//! client, optional serial numbers) and the part lines that were shipped.
//! Subtracting the lines from stock is the store's job, since it spans parts.

pub mod dispatch;

pub use dispatch::{
    DispatchCommand, DispatchEvent, DispatchHeader, DispatchId, DispatchLine, DispatchRecorded,
    DispatchRemoved, DispatchUpdated, HeaderPatch, MAX_DISPATCH_UNITS, OutboundDispatch, RecordDispatch,
    RemoveDispatch, UpdateDispatch,
};
