use std::collections::BTreeMap;

use chrono::Utc;

use stockroom_core::DomainError;
use stockroom_dispatch::{
    DispatchCommand, DispatchHeader, DispatchId, DispatchLine, HeaderPatch, OutboundDispatch,
    RecordDispatch, RemoveDispatch, UpdateDispatch,
};
use stockroom_events::EventBus;
use stockroom_inventory::{
    AdjustStock, BomId, Part, PartCommand, PartEvent, PartId, StockMovementReason,
};

use super::{DISPATCH, InventoryStore, PART, decide, missing};
use crate::error::StoreResult;
use crate::journal::JournalEntry;

impl<B> InventoryStore<B>
where
    B: EventBus<JournalEntry>,
{
    pub fn list_dispatches(&self) -> StoreResult<Vec<OutboundDispatch>> {
        Ok(self.read()?.dispatches.list().into_iter().cloned().collect())
    }

    pub fn dispatch(&self, id: DispatchId) -> StoreResult<OutboundDispatch> {
        self.read()?.dispatches.get(&id).cloned().ok_or_else(missing)
    }

    /// Record a dispatch and take its lines out of stock.
    ///
    /// Lines are matched to parts by part number. If any matched part would
    /// drop below zero the whole dispatch is rejected and nothing changes.
    /// Lines matching no part are recorded as shipped but move no stock.
    pub fn record_dispatch(
        &self,
        header: DispatchHeader,
        lines: Vec<DispatchLine>,
    ) -> StoreResult<OutboundDispatch> {
        let dispatch_id = DispatchId::generate();
        let occurred_at = Utc::now();

        self.mutate(|state| {
            let lines = lines
                .into_iter()
                .map(|line| DispatchLine {
                    part_id: state.part_id_by_number(&line.part_number),
                    ..line
                })
                .collect();
            let command = DispatchCommand::RecordDispatch(RecordDispatch {
                dispatch_id,
                header,
                lines,
                occurred_at,
            });
            let (dispatch, dispatch_events) = decide(&OutboundDispatch::empty(dispatch_id), &command)?;

            // Staged copies: a part on several lines is adjusted once per line, in order.
            let mut staged: BTreeMap<PartId, (Part, Vec<PartEvent>)> = BTreeMap::new();
            for line in dispatch.lines() {
                let Some(part_id) = line.part_id else {
                    tracing::warn!(
                        "dispatch {} line {} matches no part; stock unchanged",
                        dispatch.order_number(),
                        line.part_number
                    );
                    continue;
                };
                let delta = i64::try_from(line.quantity)
                    .map(|q| -q)
                    .map_err(|_| DomainError::validation("line quantity is too large"))?;
                let adjust = PartCommand::AdjustStock(AdjustStock {
                    part_id,
                    delta,
                    reason: StockMovementReason::Dispatch {
                        dispatch_id: dispatch_id.0,
                    },
                    occurred_at,
                });

                let (part, mut events) = match staged.remove(&part_id) {
                    Some(entry) => entry,
                    None => (state.parts.get(&part_id).cloned().ok_or_else(missing)?, Vec::new()),
                };
                let (part, new_events) = decide(&part, &adjust)?;
                events.extend(new_events);
                staged.insert(part_id, (part, events));
            }

            let mut batch = state.journal.batch();
            batch.push(dispatch_id.0, DISPATCH, &dispatch_events)?;
            for (part_id, (_, events)) in &staged {
                batch.push(part_id.0, PART, events)?;
            }
            let entries = state.journal.commit(batch);

            state.dispatches.upsert(dispatch_id, dispatch.clone());
            for (part_id, (part, _)) in staged {
                state.parts.upsert(part_id, part);
            }

            tracing::info!(
                "recorded dispatch {} for {} ({} units)",
                dispatch.order_number(),
                dispatch.client_name(),
                dispatch.total_units()
            );
            Ok((dispatch, entries))
        })
    }

    /// Edit the header of a dispatch. Lines and stock are not touched.
    pub fn update_dispatch(&self, dispatch_id: DispatchId, patch: HeaderPatch) -> StoreResult<OutboundDispatch> {
        let command = DispatchCommand::UpdateDispatch(UpdateDispatch {
            dispatch_id,
            patch,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let current = state.dispatches.get(&dispatch_id).ok_or_else(missing)?;
            let (dispatch, events) = decide(current, &command)?;
            let entries = state.journal_events(dispatch_id.0, DISPATCH, &events)?;
            state.dispatches.upsert(dispatch_id, dispatch.clone());
            Ok((dispatch, entries))
        })
    }

    /// Delete a dispatch record. Stock already taken out stays out.
    pub fn delete_dispatch(&self, dispatch_id: DispatchId) -> StoreResult<()> {
        let command = DispatchCommand::RemoveDispatch(RemoveDispatch {
            dispatch_id,
            occurred_at: Utc::now(),
        });

        self.mutate(|state| {
            let current = state.dispatches.get(&dispatch_id).ok_or_else(missing)?;
            let (_, events) = decide(current, &command)?;
            let entries = state.journal_events(dispatch_id.0, DISPATCH, &events)?;
            state.dispatches.remove(&dispatch_id);
            tracing::info!("removed dispatch {dispatch_id}");
            Ok(((), entries))
        })
    }

    /// Dispatch lines for `units` finished units of a BOM.
    ///
    /// Components whose part no longer exists are left out with a warning.
    pub fn lines_from_bom(&self, bom_id: BomId, units: u64) -> StoreResult<Vec<DispatchLine>> {
        if units == 0 {
            return Err(DomainError::validation("units must be positive").into());
        }
        let state = self.read()?;
        let bom = state.boms.get(&bom_id).ok_or_else(missing)?;

        let lines = bom
            .scaled(units)
            .into_iter()
            .filter_map(|line| match state.parts.get(&line.part_id) {
                Some(part) => Some(DispatchLine {
                    part_id: Some(line.part_id),
                    part_number: part.part_number().to_string(),
                    quantity: line.quantity,
                }),
                None => {
                    tracing::warn!("BOM {} lists missing part {}", bom.name(), line.part_id);
                    None
                }
            })
            .collect();
        Ok(lines)
    }
}
