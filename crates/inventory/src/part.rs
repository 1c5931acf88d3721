use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, Money, require_non_blank, typed_id,
};
use stockroom_events::Event;
use stockroom_vendors::VendorId;

use crate::part_number::format_part_number;
use crate::stock::StockStatus;

typed_id!(
    /// Part identifier.
    PartId
);

/// Which line of business a part is stocked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartCategory {
    Production,
    Spare,
    Addon,
}

impl PartCategory {
    pub const ALL: [PartCategory; 3] = [PartCategory::Production, PartCategory::Spare, PartCategory::Addon];

    pub fn as_str(self) -> &'static str {
        match self {
            PartCategory::Production => "production",
            PartCategory::Spare => "spare",
            PartCategory::Addon => "addon",
        }
    }
}

impl core::str::FromStr for PartCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(PartCategory::Production),
            "spare" => Ok(PartCategory::Spare),
            "addon" | "add-on" => Ok(PartCategory::Addon),
            other => Err(DomainError::validation(format!(
                "category must be one of: production, spare, addon (got '{other}')"
            ))),
        }
    }
}

/// Descriptive fields of a part (everything except identity and stock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDetails {
    pub part_number: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: PartCategory,
    pub min_stock: u64,
    pub vendor_id: VendorId,
    pub unit_price: Money,
}

impl PartDetails {
    fn validated(mut self) -> Result<Self, DomainError> {
        require_non_blank("part_number", &self.part_number)?;
        require_non_blank("name", &self.name)?;
        self.part_number = format_part_number(&self.part_number);
        self.name = self.name.trim().to_string();
        Ok(self)
    }
}

/// Partial update of a part; `None` keeps the current value.
///
/// Stock is deliberately absent: it only moves through [`AdjustStock`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartPatch {
    pub part_number: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<PartCategory>,
    pub min_stock: Option<u64>,
    pub vendor_id: Option<VendorId>,
    pub unit_price: Option<Money>,
}

/// Why stock moved; carried on every [`StockAdjusted`] event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StockMovementReason {
    /// An incoming article passed QC and was approved.
    Receipt { article_id: AggregateId },
    /// An outbound dispatch consumed the stock.
    Dispatch { dispatch_id: AggregateId },
    /// Manual correction (stock take, damage write-off).
    Manual { note: Option<String> },
}

/// Aggregate root: Part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    id: PartId,
    #[serde(flatten)]
    details: PartDetails,
    current_stock: u64,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
    #[serde(skip)]
    removed: bool,
}

impl Part {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: PartId) -> Self {
        Self {
            id,
            details: PartDetails {
                part_number: String::new(),
                name: String::new(),
                description: String::new(),
                category: PartCategory::Production,
                min_stock: 0,
                vendor_id: VendorId::new(AggregateId::from_u128(0)),
                unit_price: Money::ZERO,
            },
            current_stock: 0,
            version: 0,
            created: false,
            removed: false,
        }
    }

    pub fn id_typed(&self) -> PartId {
        self.id
    }

    pub fn details(&self) -> &PartDetails {
        &self.details
    }

    pub fn part_number(&self) -> &str {
        &self.details.part_number
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn category(&self) -> PartCategory {
        self.details.category
    }

    pub fn vendor_id(&self) -> VendorId {
        self.details.vendor_id
    }

    pub fn current_stock(&self) -> u64 {
        self.current_stock
    }

    pub fn min_stock(&self) -> u64 {
        self.details.min_stock
    }

    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.current_stock, self.details.min_stock)
    }

    /// Value of the stock on hand at the catalogue unit price.
    pub fn stock_value(&self) -> Money {
        self.details.unit_price.times(self.current_stock)
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

impl AggregateRoot for Part {
    type Id = PartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreatePart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePart {
    pub part_id: PartId,
    pub details: PartDetails,
    pub initial_stock: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdatePart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePart {
    pub part_id: PartId,
    pub patch: PartPatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AdjustStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustStock {
    pub part_id: PartId,
    pub delta: i64,
    pub reason: StockMovementReason,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemovePart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovePart {
    pub part_id: PartId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartCommand {
    CreatePart(CreatePart),
    UpdatePart(UpdatePart),
    AdjustStock(AdjustStock),
    RemovePart(RemovePart),
}

/// Event: PartCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartCreated {
    pub part_id: PartId,
    pub details: PartDetails,
    pub initial_stock: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PartUpdated (carries the full post-update details).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartUpdated {
    pub part_id: PartId,
    pub details: PartDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockAdjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjusted {
    pub part_id: PartId,
    pub part_number: String,
    pub delta: i64,
    pub new_stock: u64,
    pub reason: StockMovementReason,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PartRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRemoved {
    pub part_id: PartId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartEvent {
    PartCreated(PartCreated),
    PartUpdated(PartUpdated),
    StockAdjusted(StockAdjusted),
    PartRemoved(PartRemoved),
}

impl Event for PartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PartEvent::PartCreated(_) => "inventory.part.created",
            PartEvent::PartUpdated(_) => "inventory.part.updated",
            PartEvent::StockAdjusted(_) => "inventory.part.stock_adjusted",
            PartEvent::PartRemoved(_) => "inventory.part.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PartEvent::PartCreated(e) => e.occurred_at,
            PartEvent::PartUpdated(e) => e.occurred_at,
            PartEvent::StockAdjusted(e) => e.occurred_at,
            PartEvent::PartRemoved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Part {
    type Command = PartCommand;
    type Event = PartEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PartEvent::PartCreated(e) => {
                self.id = e.part_id;
                self.details = e.details.clone();
                self.current_stock = e.initial_stock;
                self.created = true;
            }
            PartEvent::PartUpdated(e) => {
                self.details = e.details.clone();
            }
            PartEvent::StockAdjusted(e) => {
                self.current_stock = e.new_stock;
            }
            PartEvent::PartRemoved(_) => {
                self.removed = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PartCommand::CreatePart(cmd) => self.handle_create(cmd),
            PartCommand::UpdatePart(cmd) => self.handle_update(cmd),
            PartCommand::AdjustStock(cmd) => self.handle_adjust(cmd),
            PartCommand::RemovePart(cmd) => self.handle_remove(cmd),
        }
    }
}

impl Part {
    fn ensure_live(&self, part_id: PartId) -> Result<(), DomainError> {
        if !self.created || self.removed {
            return Err(DomainError::not_found());
        }
        if self.id != part_id {
            return Err(DomainError::invariant("part_id mismatch"));
        }
        Ok(())
    }

    /// Stock level after applying `delta`, or an invariant violation if it would go negative.
    pub fn stock_after(&self, delta: i64) -> Result<u64, DomainError> {
        let next = i128::from(self.current_stock) + i128::from(delta);
        if next < 0 {
            return Err(DomainError::invariant(format!(
                "stock cannot go negative (part {}: on hand {}, change {})",
                self.details.part_number, self.current_stock, delta
            )));
        }
        u64::try_from(next).map_err(|_| DomainError::invariant("stock overflow"))
    }

    fn handle_create(&self, cmd: &CreatePart) -> Result<Vec<PartEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("part already exists"));
        }
        let details = cmd.details.clone().validated()?;

        Ok(vec![PartEvent::PartCreated(PartCreated {
            part_id: cmd.part_id,
            details,
            initial_stock: cmd.initial_stock,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdatePart) -> Result<Vec<PartEvent>, DomainError> {
        self.ensure_live(cmd.part_id)?;

        let patch = cmd.patch.clone();
        let current = &self.details;
        let details = PartDetails {
            part_number: patch.part_number.unwrap_or_else(|| current.part_number.clone()),
            name: patch.name.unwrap_or_else(|| current.name.clone()),
            description: patch.description.unwrap_or_else(|| current.description.clone()),
            category: patch.category.unwrap_or(current.category),
            min_stock: patch.min_stock.unwrap_or(current.min_stock),
            vendor_id: patch.vendor_id.unwrap_or(current.vendor_id),
            unit_price: patch.unit_price.unwrap_or(current.unit_price),
        }
        .validated()?;

        Ok(vec![PartEvent::PartUpdated(PartUpdated {
            part_id: cmd.part_id,
            details,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_adjust(&self, cmd: &AdjustStock) -> Result<Vec<PartEvent>, DomainError> {
        self.ensure_live(cmd.part_id)?;

        if cmd.delta == 0 {
            return Err(DomainError::validation("delta cannot be zero"));
        }
        let new_stock = self.stock_after(cmd.delta)?;

        Ok(vec![PartEvent::StockAdjusted(StockAdjusted {
            part_id: cmd.part_id,
            part_number: self.details.part_number.clone(),
            delta: cmd.delta,
            new_stock,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemovePart) -> Result<Vec<PartEvent>, DomainError> {
        self.ensure_live(cmd.part_id)?;

        Ok(vec![PartEvent::PartRemoved(PartRemoved {
            part_id: cmd.part_id,
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

    fn details(part_number: &str) -> PartDetails {
        PartDetails {
            part_number: part_number.to_string(),
            name: "Flight Controller F7".to_string(),
            description: "F7 flight controller with gyro".to_string(),
            category: PartCategory::Production,
            min_stock: 25,
            vendor_id: VendorId::generate(),
            unit_price: Money::from_major_minor(3500, 0),
        }
    }

    fn created(stock: u64) -> Part {
        let id = PartId::generate();
        let mut part = Part::empty(id);
        part.execute(&PartCommand::CreatePart(CreatePart {
            part_id: id,
            details: details("VD-000003"),
            initial_stock: stock,
            occurred_at: test_time(),
        }))
        .unwrap();
        part
    }

    fn adjust(part: &Part, delta: i64) -> PartCommand {
        PartCommand::AdjustStock(AdjustStock {
            part_id: part.id_typed(),
            delta,
            reason: StockMovementReason::Manual { note: None },
            occurred_at: test_time(),
        })
    }

    #[test]
    fn create_normalizes_bare_part_numbers() {
        let id = PartId::generate();
        let part = Part::empty(id);
        let events = part
            .handle(&PartCommand::CreatePart(CreatePart {
                part_id: id,
                details: details("3"),
                initial_stock: 10,
                occurred_at: test_time(),
            }))
            .unwrap();

        match &events[0] {
            PartEvent::PartCreated(e) => {
                assert_eq!(e.details.part_number, "VD-000003");
                assert_eq!(e.initial_stock, 10);
            }
            _ => panic!("Expected PartCreated event"),
        }
    }

    #[test]
    fn create_rejects_blank_name() {
        let id = PartId::generate();
        let mut d = details("VD-000001");
        d.name = "  ".to_string();
        let err = Part::empty(id)
            .handle(&PartCommand::CreatePart(CreatePart {
                part_id: id,
                details: d,
                initial_stock: 0,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn adjust_stock_moves_stock_and_records_reason() {
        let mut part = created(65);
        let events = part.execute(&adjust(&part, -15)).unwrap();

        assert_eq!(part.current_stock(), 50);
        match &events[0] {
            PartEvent::StockAdjusted(e) => {
                assert_eq!(e.new_stock, 50);
                assert_eq!(e.part_number, "VD-000003");
            }
            _ => panic!("Expected StockAdjusted event"),
        }
    }

    #[test]
    fn adjust_stock_rejects_zero_and_negative_results() {
        let part = created(5);

        let err = part.handle(&adjust(&part, 0)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = part.handle(&adjust(&part, -6)).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(msg) if msg.contains("negative")));
    }

    #[test]
    fn update_keeps_stock_and_unpatched_fields() {
        let mut part = created(30);
        part.execute(&PartCommand::UpdatePart(UpdatePart {
            part_id: part.id_typed(),
            patch: PartPatch {
                min_stock: Some(40),
                ..PartPatch::default()
            },
            occurred_at: test_time(),
        }))
        .unwrap();

        assert_eq!(part.current_stock(), 30);
        assert_eq!(part.min_stock(), 40);
        assert_eq!(part.name(), "Flight Controller F7");
        assert_eq!(part.stock_status(), StockStatus::Low);
    }

    #[test]
    fn removed_part_cannot_be_adjusted() {
        let mut part = created(30);
        part.execute(&PartCommand::RemovePart(RemovePart {
            part_id: part.id_typed(),
            occurred_at: test_time(),
        }))
        .unwrap();

        assert_eq!(part.handle(&adjust(&part, 1)).unwrap_err(), DomainError::NotFound);
    }

    #[test]
    fn stock_value_uses_unit_price() {
        let part = created(2);
        assert_eq!(part.stock_value(), Money::from_major_minor(7000, 0));
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Spare".parse::<PartCategory>().unwrap(), PartCategory::Spare);
        assert_eq!("add-on".parse::<PartCategory>().unwrap(), PartCategory::Addon);
        assert!("widgets".parse::<PartCategory>().is_err());
    }

    proptest! {
        #[test]
        fn stock_never_goes_negative(start in 0u64..500, deltas in proptest::collection::vec(-200i64..200, 0..40)) {
            let mut part = created(start);
            let mut expected = start as i64;
            for delta in deltas {
                let result = part.execute(&adjust(&part, delta));
                if delta != 0 && expected + delta >= 0 {
                    prop_assert!(result.is_ok());
                    expected += delta;
                } else {
                    prop_assert!(result.is_err());
                }
                prop_assert_eq!(part.current_stock() as i64, expected);
            }
        }

        #[test]
        fn version_counts_applied_events(deltas in proptest::collection::vec(1i64..50, 0..20)) {
            let mut part = created(0);
            for delta in &deltas {
                part.execute(&adjust(&part, *delta)).unwrap();
            }
            prop_assert_eq!(part.version(), 1 + deltas.len() as u64);
        }
    }
}
