//! Append-only journal of applied domain events.

use serde::Serialize;
use serde_json::Value as JsonValue;

use stockroom_core::AggregateId;
use stockroom_events::{Event, EventEnvelope};

pub type JournalEntry = EventEnvelope<JsonValue>;

/// Events of one store operation, serialized but not yet appended.
///
/// Serialization happens while staging so that a payload that fails to
/// serialize aborts the operation before any table is touched.
#[derive(Debug)]
pub struct Batch {
    next_sequence: u64,
    entries: Vec<JournalEntry>,
}

impl Batch {
    /// Stage `events` emitted by one aggregate.
    pub fn push<E>(
        &mut self,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        events: &[E],
    ) -> Result<(), serde_json::Error>
    where
        E: Event + Serialize,
    {
        for event in events {
            let entry =
                EventEnvelope::from_typed(aggregate_id, aggregate_type, self.next_sequence, event)?;
            self.next_sequence += 1;
            self.entries.push(entry);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// In-memory, append-only event journal.
///
/// Sequence numbers start at 1 and increase by one per entry, across all
/// aggregates.
#[derive(Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Start staging the events of an operation.
    ///
    /// The store holds its write lock from `batch` to `commit`, so no other
    /// batch can claim the same sequence numbers.
    pub fn batch(&self) -> Batch {
        Batch {
            next_sequence: self.entries.len() as u64 + 1,
            entries: Vec::new(),
        }
    }

    /// Append a staged batch, returning the committed entries.
    pub fn commit(&mut self, batch: Batch) -> Vec<JournalEntry> {
        self.entries.extend(batch.entries.iter().cloned());
        batch.entries
    }

    /// Entries with a sequence number greater than `after`, oldest first, at most `limit`.
    pub fn since(&self, after: u64, limit: usize) -> Vec<JournalEntry> {
        // Sequence n sits at index n - 1.
        let start = usize::try_from(after).unwrap_or(usize::MAX).min(self.entries.len());
        self.entries[start..].iter().take(limit).cloned().collect()
    }

    /// Every entry for one aggregate, in order.
    pub fn stream(&self, aggregate_id: AggregateId) -> Vec<JournalEntry> {
        self.entries
            .iter()
            .filter(|e| e.aggregate_id() == aggregate_id)
            .cloned()
            .collect()
    }
}
