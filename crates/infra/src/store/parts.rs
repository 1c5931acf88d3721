use chrono::Utc;

use stockroom_core::DomainError;
use stockroom_events::EventBus;
use stockroom_inventory::{
    AdjustStock, CreatePart, Part, PartCommand, PartDetails, PartId, PartPatch, RemovePart,
    StockMovementReason, UpdatePart,
};
use stockroom_vendors::VendorId;

use super::{InventoryStore, PART, State, decide, missing};
use crate::error::StoreResult;
use crate::journal::JournalEntry;

impl State {
    pub(crate) fn ensure_vendor(&self, vendor_id: VendorId) -> StoreResult<()> {
        if self.vendors.contains(&vendor_id) {
            return Ok(());
        }
        Err(DomainError::validation(format!("unknown vendor {vendor_id}")).into())
    }

    /// Part numbers are unique across live parts.
    fn ensure_part_number_free(&self, part_number: &str, except: Option<PartId>) -> StoreResult<()> {
        let taken = self
            .parts
            .any(|p| p.part_number() == part_number && Some(p.id_typed()) != except);
        if taken {
            return Err(DomainError::conflict(format!("part number {part_number} is already in use")).into());
        }
        Ok(())
    }
}

impl<B> InventoryStore<B>
where
    B: EventBus<JournalEntry>,
{
    pub fn list_parts(&self) -> StoreResult<Vec<Part>> {
        Ok(self.read()?.parts.list().into_iter().cloned().collect())
    }

    pub fn part(&self, id: PartId) -> StoreResult<Part> {
        self.read()?.parts.get(&id).cloned().ok_or_else(missing)
    }

    /// Look a part up by part number; `"3"` finds `VD-000003`.
    pub fn part_by_number(&self, part_number: &str) -> StoreResult<Part> {
        let state = self.read()?;
        state
            .part_id_by_number(part_number)
            .and_then(|id| state.parts.get(&id).cloned())
            .ok_or_else(missing)
    }

    pub fn create_part(&self, details: PartDetails, initial_stock: u64) -> StoreResult<Part> {
        let part_id = PartId::generate();
        let command = PartCommand::CreatePart(CreatePart {
            part_id,
            details,
            initial_stock,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let (part, events) = decide(&Part::empty(part_id), &command)?;
            state.ensure_vendor(part.vendor_id())?;
            state.ensure_part_number_free(part.part_number(), None)?;

            let entries = state.journal_events(part_id.0, PART, &events)?;
            state.parts.upsert(part_id, part.clone());
            tracing::info!("created part {} ({part_id}) with stock {initial_stock}", part.part_number());
            Ok((part, entries))
        })
    }

    /// Merge `patch` into a part. Stock is not patchable; see [`Self::adjust_stock`].
    pub fn update_part(&self, part_id: PartId, patch: PartPatch) -> StoreResult<Part> {
        let command = PartCommand::UpdatePart(UpdatePart {
            part_id,
            patch,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let current = state.parts.get(&part_id).ok_or_else(missing)?;
            let (part, events) = decide(current, &command)?;
            state.ensure_vendor(part.vendor_id())?;
            state.ensure_part_number_free(part.part_number(), Some(part_id))?;

            let entries = state.journal_events(part_id.0, PART, &events)?;
            state.parts.upsert(part_id, part.clone());
            Ok((part, entries))
        })
    }

    pub fn delete_part(&self, part_id: PartId) -> StoreResult<()> {
        let command = PartCommand::RemovePart(RemovePart {
            part_id,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let current = state.parts.get(&part_id).ok_or_else(missing)?;
            if let Some(bom) = state.boms.find(|b| b.quantity_of(part_id).is_some()) {
                return Err(DomainError::conflict(format!(
                    "part {} is a component of BOM {}; remove it from the BOM first",
                    current.part_number(),
                    bom.name()
                ))
                .into());
            }
            let (_, events) = decide(current, &command)?;
            let entries = state.journal_events(part_id.0, PART, &events)?;
            state.parts.remove(&part_id);
            tracing::info!("removed part {part_id}");
            Ok(((), entries))
        })
    }

    /// Manual stock correction. Zero deltas and results below zero are rejected.
    pub fn adjust_stock(&self, part_id: PartId, delta: i64, note: Option<String>) -> StoreResult<Part> {
        let command = PartCommand::AdjustStock(AdjustStock {
            part_id,
            delta,
            reason: StockMovementReason::Manual { note },
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let current = state.parts.get(&part_id).ok_or_else(missing)?;
            let (part, events) = decide(current, &command)?;
            let entries = state.journal_events(part_id.0, PART, &events)?;
            state.parts.upsert(part_id, part.clone());
            tracing::info!(
                "adjusted stock of {} by {delta}, now {}",
                part.part_number(),
                part.current_stock()
            );
            Ok((part, entries))
        })
    }
}
