use chrono::Utc;

use stockroom_core::DomainError;
use stockroom_events::EventBus;
use stockroom_inventory::{
    Bom, BomCommand, BomId, BomLine, CreateBom, PartCategory, RemoveBom, UpdateBom,
};

use super::{BOM, InventoryStore, State, decide, missing};
use crate::error::StoreResult;
use crate::journal::JournalEntry;

impl State {
    fn ensure_parts_exist(&self, lines: &[BomLine]) -> StoreResult<()> {
        match lines.iter().find(|l| !self.parts.contains(&l.part_id)) {
            Some(line) => Err(DomainError::validation(format!("unknown part {}", line.part_id)).into()),
            None => Ok(()),
        }
    }
}

impl<B> InventoryStore<B>
where
    B: EventBus<JournalEntry>,
{
    pub fn list_boms(&self) -> StoreResult<Vec<Bom>> {
        Ok(self.read()?.boms.list().into_iter().cloned().collect())
    }

    pub fn bom(&self, id: BomId) -> StoreResult<Bom> {
        self.read()?.boms.get(&id).cloned().ok_or_else(missing)
    }

    pub fn create_bom(&self, name: String, category: PartCategory, lines: Vec<BomLine>) -> StoreResult<Bom> {
        let bom_id = BomId::generate();
        let command = BomCommand::CreateBom(CreateBom {
            bom_id,
            name,
            category,
            lines,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let (bom, events) = decide(&Bom::empty(bom_id), &command)?;
            state.ensure_parts_exist(bom.lines())?;
            let entries = state.journal_events(bom_id.0, BOM, &events)?;
            state.boms.upsert(bom_id, bom.clone());
            tracing::info!("created BOM {} ({bom_id}) with {} lines", bom.name(), bom.lines().len());
            Ok((bom, entries))
        })
    }

    /// Rename a BOM and/or replace its lines.
    pub fn update_bom(
        &self,
        bom_id: BomId,
        name: Option<String>,
        lines: Option<Vec<BomLine>>,
    ) -> StoreResult<Bom> {
        let command = BomCommand::UpdateBom(UpdateBom {
            bom_id,
            name,
            lines,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let current = state.boms.get(&bom_id).ok_or_else(missing)?;
            let (bom, events) = decide(current, &command)?;
            state.ensure_parts_exist(bom.lines())?;
            let entries = state.journal_events(bom_id.0, BOM, &events)?;
            state.boms.upsert(bom_id, bom.clone());
            Ok((bom, entries))
        })
    }

    pub fn delete_bom(&self, bom_id: BomId) -> StoreResult<()> {
        let command = BomCommand::RemoveBom(RemoveBom {
            bom_id,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let current = state.boms.get(&bom_id).ok_or_else(missing)?;
            let (_, events) = decide(current, &command)?;
            let entries = state.journal_events(bom_id.0, BOM, &events)?;
            state.boms.remove(&bom_id);
            Ok(((), entries))
        })
    }

    /// Complete units of `bom_id` buildable from current stock.
    pub fn buildable_units(&self, bom_id: BomId) -> StoreResult<u64> {
        let state = self.read()?;
        let bom = state.boms.get(&bom_id).ok_or_else(missing)?;
        Ok(bom.buildable_units(|part_id| state.stock_of(part_id)))
    }
}
