//! The application-wide inventory store.
//!
//! ## Operation flow
//!
//! ```text
//! store method
//!   ↓
//! 1. Take the write lock (one lock for every table)
//!   ↓
//! 2. Decide: run commands on copies of the affected aggregates
//!   ↓
//! 3. Stage the emitted events in a journal batch (serialization happens here)
//!   ↓
//! 4. Commit: append the batch, replace the copies in their tables
//!   ↓
//! 5. Release the lock, publish the committed entries on the bus
//! ```
//!
//! Any failure in steps 2-3 returns before step 4, so an operation touching
//! several aggregates (approval adds stock, a dispatch subtracts it) either
//! lands completely or not at all.
//!
//! The bus is fire-and-forget: publication happens after the state change and
//! a failure is logged, never returned. Subscribers that need every event can
//! read the journal.

mod boms;
mod dispatch;
mod parts;
mod production;
mod receiving;
mod vendors;
mod views;

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use stockroom_core::{Aggregate, AggregateId, DomainError};
use stockroom_dispatch::{DispatchId, OutboundDispatch};
use stockroom_events::{Event, EventBus, InMemoryEventBus, Subscription};
use stockroom_inventory::{
    Bom, BomId, Part, PartId, ProductionCompletion, format_part_number,
};
use stockroom_receiving::{ArticleId, IncomingArticle};
use stockroom_vendors::{Vendor, VendorId};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::journal::{Journal, JournalEntry};
use crate::read_model::Table;
use crate::seed;

pub use receiving::{ApprovalOutcome, NewArticle, Verification};

/// The bus the store publishes journal entries on.
pub type JournalBus = InMemoryEventBus<JournalEntry>;

pub(crate) const VENDOR: &str = "vendors.vendor";
pub(crate) const PART: &str = "inventory.part";
pub(crate) const BOM: &str = "inventory.bom";
pub(crate) const COMPLETION: &str = "inventory.production";
pub(crate) const ARTICLE: &str = "receiving.article";
pub(crate) const DISPATCH: &str = "dispatch.outbound";

/// A committed change: the resulting value plus the journal entries to publish.
pub(crate) type Applied<T> = (T, Vec<JournalEntry>);

/// Everything the store holds. Tables contain live records only.
#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) vendors: Table<VendorId, Vendor>,
    pub(crate) parts: Table<PartId, Part>,
    pub(crate) articles: Table<ArticleId, IncomingArticle>,
    pub(crate) dispatches: Table<DispatchId, OutboundDispatch>,
    pub(crate) boms: Table<BomId, Bom>,
    pub(crate) completions: Vec<ProductionCompletion>,
    pub(crate) journal: Journal,
}

impl State {
    /// Stage and commit the events of a single aggregate.
    pub(crate) fn journal_events<E>(
        &mut self,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        events: &[E],
    ) -> StoreResult<Vec<JournalEntry>>
    where
        E: Event + Serialize,
    {
        let mut batch = self.journal.batch();
        batch.push(aggregate_id, aggregate_type, events)?;
        Ok(self.journal.commit(batch))
    }

    /// Id of the live part carrying `part_number` (normalized before matching).
    pub(crate) fn part_id_by_number(&self, part_number: &str) -> Option<PartId> {
        let wanted = format_part_number(part_number);
        self.parts
            .find(|p| p.part_number() == wanted)
            .map(Part::id_typed)
    }

    pub(crate) fn stock_of(&self, part_id: PartId) -> Option<u64> {
        self.parts.get(&part_id).map(Part::current_stock)
    }
}

/// Run `command` against a copy of `current`.
///
/// The copy comes back together with its events; `current` is untouched, so
/// nothing changes until the caller commits the copy.
pub(crate) fn decide<A>(current: &A, command: &A::Command) -> Result<(A, Vec<A::Event>), DomainError>
where
    A: Aggregate<Error = DomainError> + Clone,
{
    let mut next = current.clone();
    let events = next.execute(command)?;
    Ok((next, events))
}

pub(crate) fn missing() -> StoreError {
    StoreError::Domain(DomainError::not_found())
}

/// In-memory store for vendors, parts, incoming articles, dispatches, BOMs
/// and production completions.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
#[derive(Debug)]
pub struct InventoryStore<B = JournalBus> {
    state: RwLock<State>,
    bus: B,
}

impl InventoryStore<JournalBus> {
    /// Empty store with its own in-memory bus.
    pub fn new() -> Self {
        Self::with_bus(JournalBus::new())
    }

    /// Store configured from `config`, seeded with the demo data when enabled.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let store = Self::new();
        if config.seed {
            store.load_seed()?;
        }
        Ok(store)
    }

    /// Subscribe to committed journal entries.
    pub fn subscribe(&self) -> Subscription<JournalEntry> {
        self.bus.subscribe()
    }
}

impl Default for InventoryStore<JournalBus> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> InventoryStore<B>
where
    B: EventBus<JournalEntry>,
{
    pub fn with_bus(bus: B) -> Self {
        Self {
            state: RwLock::new(State::default()),
            bus,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Load the demo data set. Seed events are journaled but not published.
    pub fn load_seed(&self) -> StoreResult<()> {
        let mut state = self.write()?;
        seed::load(&mut state)?;
        tracing::info!(
            vendors = state.vendors.len(),
            parts = state.parts.len(),
            articles = state.articles.len(),
            dispatches = state.dispatches.len(),
            boms = state.boms.len(),
            "demo data loaded"
        );
        Ok(())
    }

    /// Journal entries after sequence number `after`, oldest first.
    pub fn journal(&self, after: u64, limit: usize) -> StoreResult<Vec<JournalEntry>> {
        Ok(self.read()?.journal.since(after, limit))
    }

    /// Journal entries of a single aggregate.
    pub fn history(&self, aggregate_id: AggregateId) -> StoreResult<Vec<JournalEntry>> {
        Ok(self.read()?.journal.stream(aggregate_id))
    }

    pub(crate) fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }

    /// Run `change` under the write lock, then publish what it committed.
    pub(crate) fn mutate<T, F>(&self, change: F) -> StoreResult<T>
    where
        F: FnOnce(&mut State) -> StoreResult<Applied<T>>,
    {
        let (value, entries) = {
            let mut state = self.write()?;
            change(&mut state)?
        };
        self.publish(entries);
        Ok(value)
    }

    fn publish(&self, entries: Vec<JournalEntry>) {
        for entry in entries {
            let sequence = entry.sequence_number();
            if let Err(err) = self.bus.publish(entry) {
                tracing::warn!("failed to publish journal entry {sequence}: {err:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests;
