//! Inventory domain module: parts, stock levels and bills of materials.
//!
//! This crate contains business rules for inventory, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod bom;
pub mod part;
pub mod part_number;
pub mod production;
pub mod stock;

pub use bom::{
    Bom, BomCommand, BomCreated, BomEvent, BomId, BomLine, BomRemoved, BomUpdated, CreateBom,
    RemoveBom, UpdateBom, buildable_units,
};
pub use part::{
    AdjustStock, CreatePart, Part, PartCategory, PartCommand, PartCreated, PartDetails, PartEvent,
    PartId, PartPatch, PartRemoved, PartUpdated, RemovePart, StockAdjusted, StockMovementReason,
    UpdatePart,
};
pub use part_number::format_part_number;
pub use production::{CompletionId, CompletionRecorded, ProductionCompletion};
pub use stock::StockStatus;
