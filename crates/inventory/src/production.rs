//! Production completions: finished units reported off the assembly line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, typed_id};
use stockroom_events::Event;

use crate::bom::BomId;

typed_id!(
    /// Production completion identifier.
    CompletionId
);

/// A batch of finished units reported complete.
///
/// Completions are records only; they do not move stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCompletion {
    pub id: CompletionId,
    pub units_completed: u64,
    #[serde(default)]
    pub bom_id: Option<BomId>,
    pub completed_at: DateTime<Utc>,
}

impl ProductionCompletion {
    pub fn record(
        id: CompletionId,
        units_completed: u64,
        bom_id: Option<BomId>,
        completed_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if units_completed == 0 {
            return Err(DomainError::validation("units completed must be positive"));
        }
        Ok(Self {
            id,
            units_completed,
            bom_id,
            completed_at,
        })
    }
}

/// Event: CompletionRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecorded {
    pub completion: ProductionCompletion,
}

impl Event for CompletionRecorded {
    fn event_type(&self) -> &'static str {
        "inventory.production.completion_recorded"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.completion.completed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_units_is_rejected() {
        let err = ProductionCompletion::record(CompletionId::generate(), 0, None, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn event_carries_completion_time() {
        let at = Utc::now();
        let completion = ProductionCompletion::record(CompletionId::generate(), 12, None, at).unwrap();
        let event = CompletionRecorded { completion };
        assert_eq!(event.occurred_at(), at);
        assert_eq!(event.event_type(), "inventory.production.completion_recorded");
    }
}
