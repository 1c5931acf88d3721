use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Aggregate, AggregateRoot, DomainError, require_non_blank, typed_id};
use stockroom_events::Event;
use stockroom_inventory::{PartId, format_part_number};

/// Upper bound on the units a single dispatch may carry.
pub const MAX_DISPATCH_UNITS: u64 = i64::MAX as u64;

typed_id!(
    /// Outbound dispatch identifier.
    DispatchId
);

/// One shipped part line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchLine {
    /// Set when the line was picked from the part table; free-typed lines carry only a part number.
    #[serde(default)]
    pub part_id: Option<PartId>,
    pub part_number: String,
    pub quantity: u64,
}

/// Order header of a dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchHeader {
    pub order_number: String,
    pub client_name: String,
    #[serde(default)]
    pub drone_serial_no: Option<String>,
    #[serde(default)]
    pub battery_serial_no: Option<String>,
}

impl DispatchHeader {
    fn validated(&self) -> Result<Self, DomainError> {
        require_non_blank("order_number", &self.order_number)?;
        require_non_blank("client_name", &self.client_name)?;
        Ok(Self {
            order_number: self.order_number.trim().to_string(),
            client_name: self.client_name.trim().to_string(),
            drone_serial_no: trimmed(&self.drone_serial_no),
            battery_serial_no: trimmed(&self.battery_serial_no),
        })
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Partial update of a dispatch header; lines are fixed once recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPatch {
    pub order_number: Option<String>,
    pub client_name: Option<String>,
    pub drone_serial_no: Option<String>,
    pub battery_serial_no: Option<String>,
}

/// Aggregate root: OutboundDispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundDispatch {
    id: DispatchId,
    #[serde(flatten)]
    header: DispatchHeader,
    dispatched_at: DateTime<Utc>,
    lines: Vec<DispatchLine>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
    #[serde(skip)]
    removed: bool,
}

impl OutboundDispatch {
    pub fn empty(id: DispatchId) -> Self {
        Self {
            id,
            header: DispatchHeader::default(),
            dispatched_at: DateTime::<Utc>::UNIX_EPOCH,
            lines: Vec::new(),
            version: 0,
            created: false,
            removed: false,
        }
    }

    pub fn id_typed(&self) -> DispatchId {
        self.id
    }

    pub fn header(&self) -> &DispatchHeader {
        &self.header
    }

    pub fn order_number(&self) -> &str {
        &self.header.order_number
    }

    pub fn client_name(&self) -> &str {
        &self.header.client_name
    }

    pub fn dispatched_at(&self) -> DateTime<Utc> {
        self.dispatched_at
    }

    pub fn lines(&self) -> &[DispatchLine] {
        &self.lines
    }

    pub fn total_units(&self) -> u64 {
        self.lines.iter().fold(0, |acc, l| acc.saturating_add(l.quantity))
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

impl AggregateRoot for OutboundDispatch {
    type Id = DispatchId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RecordDispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDispatch {
    pub dispatch_id: DispatchId,
    pub header: DispatchHeader,
    pub lines: Vec<DispatchLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateDispatch (header only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDispatch {
    pub dispatch_id: DispatchId,
    pub patch: HeaderPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveDispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveDispatch {
    pub dispatch_id: DispatchId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchCommand {
    RecordDispatch(RecordDispatch),
    UpdateDispatch(UpdateDispatch),
    RemoveDispatch(RemoveDispatch),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRecorded {
    pub dispatch_id: DispatchId,
    pub header: DispatchHeader,
    pub lines: Vec<DispatchLine>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchUpdated {
    pub dispatch_id: DispatchId,
    pub header: DispatchHeader,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchRemoved {
    pub dispatch_id: DispatchId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchEvent {
    DispatchRecorded(DispatchRecorded),
    DispatchUpdated(DispatchUpdated),
    DispatchRemoved(DispatchRemoved),
}

impl Event for DispatchEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DispatchEvent::DispatchRecorded(_) => "dispatch.outbound.recorded",
            DispatchEvent::DispatchUpdated(_) => "dispatch.outbound.updated",
            DispatchEvent::DispatchRemoved(_) => "dispatch.outbound.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DispatchEvent::DispatchRecorded(e) => e.occurred_at,
            DispatchEvent::DispatchUpdated(e) => e.occurred_at,
            DispatchEvent::DispatchRemoved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for OutboundDispatch {
    type Command = DispatchCommand;
    type Event = DispatchEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            DispatchEvent::DispatchRecorded(e) => {
                self.id = e.dispatch_id;
                self.header = e.header.clone();
                self.lines = e.lines.clone();
                self.dispatched_at = e.occurred_at;
                self.created = true;
            }
            DispatchEvent::DispatchUpdated(e) => {
                self.header = e.header.clone();
            }
            DispatchEvent::DispatchRemoved(_) => {
                self.removed = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            DispatchCommand::RecordDispatch(cmd) => self.handle_record(cmd),
            DispatchCommand::UpdateDispatch(cmd) => self.handle_update(cmd),
            DispatchCommand::RemoveDispatch(cmd) => self.handle_remove(cmd),
        }
    }
}

impl OutboundDispatch {
    fn ensure_live(&self, dispatch_id: DispatchId) -> Result<(), DomainError> {
        if !self.created || self.removed {
            return Err(DomainError::not_found());
        }
        if self.id != dispatch_id {
            return Err(DomainError::invariant("dispatch_id mismatch"));
        }
        Ok(())
    }

    fn handle_record(&self, cmd: &RecordDispatch) -> Result<Vec<DispatchEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("dispatch already exists"));
        }
        let header = cmd.header.validated()?;

        if cmd.lines.is_empty() {
            return Err(DomainError::validation("a dispatch needs at least one line"));
        }
        let mut lines = Vec::with_capacity(cmd.lines.len());
        let mut total: u64 = 0;
        for line in &cmd.lines {
            require_non_blank("part_number", &line.part_number)?;
            if line.quantity == 0 {
                return Err(DomainError::validation(format!(
                    "quantity for {} must be positive",
                    line.part_number.trim()
                )));
            }
            // Stock moves are signed; every line and the sum must fit an i64.
            total = total
                .checked_add(line.quantity)
                .filter(|t| *t <= MAX_DISPATCH_UNITS)
                .ok_or_else(|| {
                    DomainError::validation(format!("quantity for {} is too large", line.part_number.trim()))
                })?;
            lines.push(DispatchLine {
                part_id: line.part_id,
                part_number: format_part_number(&line.part_number),
                quantity: line.quantity,
            });
        }

        Ok(vec![DispatchEvent::DispatchRecorded(DispatchRecorded {
            dispatch_id: cmd.dispatch_id,
            header,
            lines,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateDispatch) -> Result<Vec<DispatchEvent>, DomainError> {
        self.ensure_live(cmd.dispatch_id)?;

        let patch = &cmd.patch;
        let merged = DispatchHeader {
            order_number: patch
                .order_number
                .clone()
                .unwrap_or_else(|| self.header.order_number.clone()),
            client_name: patch
                .client_name
                .clone()
                .unwrap_or_else(|| self.header.client_name.clone()),
            drone_serial_no: patch
                .drone_serial_no
                .clone()
                .or_else(|| self.header.drone_serial_no.clone()),
            battery_serial_no: patch
                .battery_serial_no
                .clone()
                .or_else(|| self.header.battery_serial_no.clone()),
        };

        Ok(vec![DispatchEvent::DispatchUpdated(DispatchUpdated {
            dispatch_id: cmd.dispatch_id,
            header: merged.validated()?,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveDispatch) -> Result<Vec<DispatchEvent>, DomainError> {
        self.ensure_live(cmd.dispatch_id)?;

        Ok(vec![DispatchEvent::DispatchRemoved(DispatchRemoved {
            dispatch_id: cmd.dispatch_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn header() -> DispatchHeader {
        DispatchHeader {
            order_number: "ORD-2025-001".to_string(),
            client_name: " AgriTech Solutions ".to_string(),
            drone_serial_no: Some("VD-DRONE-001".to_string()),
            battery_serial_no: Some("".to_string()),
        }
    }

    fn line(part_number: &str, quantity: u64) -> DispatchLine {
        DispatchLine {
            part_id: None,
            part_number: part_number.to_string(),
            quantity,
        }
    }

    fn record(lines: Vec<DispatchLine>) -> (DispatchId, DispatchCommand) {
        let id = DispatchId::generate();
        let cmd = DispatchCommand::RecordDispatch(RecordDispatch {
            dispatch_id: id,
            header: header(),
            lines,
            occurred_at: test_time(),
        });
        (id, cmd)
    }

    #[test]
    fn record_normalizes_header_and_lines() {
        let (id, cmd) = record(vec![line("1", 4), line("VD-000003", 1)]);
        let mut dispatch = OutboundDispatch::empty(id);
        dispatch.execute(&cmd).unwrap();

        assert_eq!(dispatch.client_name(), "AgriTech Solutions");
        assert_eq!(dispatch.header().battery_serial_no, None);
        assert_eq!(dispatch.lines()[0].part_number, "VD-000001");
        assert_eq!(dispatch.total_units(), 5);
        assert_eq!(dispatch.version(), 1);
    }

    #[test]
    fn record_requires_lines_with_positive_quantity() {
        let (id, cmd) = record(vec![]);
        let err = OutboundDispatch::empty(id).handle(&cmd).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let (id, cmd) = record(vec![line("VD-000001", 0)]);
        let err = OutboundDispatch::empty(id).handle(&cmd).unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("VD-000001")));
    }

    #[test]
    fn record_requires_order_number_and_client() {
        let id = DispatchId::generate();
        let err = OutboundDispatch::empty(id)
            .handle(&DispatchCommand::RecordDispatch(RecordDispatch {
                dispatch_id: id,
                header: DispatchHeader {
                    client_name: "Someone".to_string(),
                    ..DispatchHeader::default()
                },
                lines: vec![line("VD-000001", 1)],
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(msg) if msg.contains("order_number")));
    }

    #[test]
    fn update_merges_header_and_keeps_lines() {
        let (id, cmd) = record(vec![line("VD-000006", 2)]);
        let mut dispatch = OutboundDispatch::empty(id);
        dispatch.execute(&cmd).unwrap();

        dispatch
            .execute(&DispatchCommand::UpdateDispatch(UpdateDispatch {
                dispatch_id: id,
                patch: HeaderPatch {
                    client_name: Some("City Surveillance".to_string()),
                    ..HeaderPatch::default()
                },
                occurred_at: test_time(),
            }))
            .unwrap();

        assert_eq!(dispatch.client_name(), "City Surveillance");
        assert_eq!(dispatch.order_number(), "ORD-2025-001");
        assert_eq!(dispatch.header().drone_serial_no.as_deref(), Some("VD-DRONE-001"));
        assert_eq!(dispatch.lines().len(), 1);
    }

    #[test]
    fn removed_dispatch_is_not_found() {
        let (id, cmd) = record(vec![line("VD-000006", 2)]);
        let mut dispatch = OutboundDispatch::empty(id);
        dispatch.execute(&cmd).unwrap();
        let remove = DispatchCommand::RemoveDispatch(RemoveDispatch {
            dispatch_id: id,
            occurred_at: test_time(),
        });
        dispatch.execute(&remove).unwrap();

        assert!(dispatch.is_removed());
        assert_eq!(dispatch.handle(&remove), Err(DomainError::NotFound));
    }

    #[test]
    fn record_rejects_quantities_beyond_signed_range() {
        let (id, cmd) = record(vec![line("NOPE-1", 1 << 63)]);
        let err = OutboundDispatch::empty(id).handle(&cmd).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref msg) if msg.contains("too large")));

        // Each line fits on its own, the sum does not.
        let half = MAX_DISPATCH_UNITS / 2 + 1;
        let (id, cmd) = record(vec![line("NOPE-1", half), line("NOPE-2", half)]);
        let err = OutboundDispatch::empty(id).handle(&cmd).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let (id, cmd) = record(vec![line("VD-000006", MAX_DISPATCH_UNITS)]);
        let mut dispatch = OutboundDispatch::empty(id);
        dispatch.execute(&cmd).unwrap();
        assert_eq!(dispatch.total_units(), MAX_DISPATCH_UNITS);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let (id, cmd) = record(vec![line("VD-000006", 2)]);
        let dispatch = OutboundDispatch::empty(id);
        let before = dispatch.clone();
        let _ = dispatch.handle(&cmd).unwrap();
        assert_eq!(dispatch, before);
    }

    proptest! {
        #[test]
        fn recorded_totals_never_exceed_the_cap(
            quantities in proptest::collection::vec(1u64..=u64::MAX, 1..5)
        ) {
            let lines = quantities.iter().enumerate().map(|(i, q)| line(&format!("VD-{i}"), *q)).collect();
            let (id, cmd) = record(lines);
            let mut dispatch = OutboundDispatch::empty(id);
            let exact: u128 = quantities.iter().map(|q| u128::from(*q)).sum();

            match dispatch.execute(&cmd) {
                Ok(_) => prop_assert_eq!(u128::from(dispatch.total_units()), exact),
                Err(err) => {
                    prop_assert!(matches!(err, DomainError::Validation(_)));
                    prop_assert!(exact > u128::from(MAX_DISPATCH_UNITS));
                }
            }
        }
    }
}
