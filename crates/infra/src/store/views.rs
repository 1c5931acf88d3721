use chrono::Utc;

use stockroom_events::EventBus;

use super::InventoryStore;
use crate::dashboard::{self, Dashboard};
use crate::error::StoreResult;
use crate::journal::JournalEntry;
use crate::reports::{self, DateRange, InboundReport, OutboundReport};

impl<B> InventoryStore<B>
where
    B: EventBus<JournalEntry>,
{
    pub fn dashboard(&self) -> StoreResult<Dashboard> {
        let state = self.read()?;
        Ok(dashboard::build(
            &state.parts.list(),
            &state.boms.list(),
            &state.articles.list(),
            state.vendors.len(),
        ))
    }

    pub fn outbound_report(&self, range: DateRange) -> StoreResult<OutboundReport> {
        let state = self.read()?;
        Ok(reports::outbound(state.dispatches.list(), range, Utc::now()))
    }

    pub fn inbound_report(&self, range: DateRange) -> StoreResult<InboundReport> {
        let state = self.read()?;
        let vendor_name = |id| state.vendors.get(&id).map(|v| v.name().to_string());
        Ok(reports::inbound(state.articles.list(), vendor_name, range, Utc::now()))
    }
}
