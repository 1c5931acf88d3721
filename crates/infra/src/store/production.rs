use chrono::Utc;

use stockroom_core::DomainError;
use stockroom_events::EventBus;
use stockroom_inventory::{BomId, CompletionId, CompletionRecorded, ProductionCompletion};

use super::{COMPLETION, InventoryStore};
use crate::error::StoreResult;
use crate::journal::JournalEntry;

impl<B> InventoryStore<B>
where
    B: EventBus<JournalEntry>,
{
    /// Record finished units. Stock is not touched.
    pub fn record_completion(&self, units: u64, bom_id: Option<BomId>) -> StoreResult<ProductionCompletion> {
        let completion = ProductionCompletion::record(CompletionId::generate(), units, bom_id, Utc::now())?;

        self.mutate(|state| {
            if let Some(bom_id) = bom_id {
                if !state.boms.contains(&bom_id) {
                    return Err(DomainError::validation(format!("unknown BOM {bom_id}")).into());
                }
            }
            let event = CompletionRecorded {
                completion: completion.clone(),
            };
            let entries = state.journal_events(completion.id.0, COMPLETION, &[event])?;
            state.completions.push(completion.clone());
            tracing::info!("recorded production completion of {units} units");
            Ok((completion, entries))
        })
    }

    /// Completions, oldest first.
    pub fn completions(&self) -> StoreResult<Vec<ProductionCompletion>> {
        Ok(self.read()?.completions.clone())
    }
}
