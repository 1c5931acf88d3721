//! Bills of materials and the buildable-units calculation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Aggregate, AggregateRoot, DomainError, require_non_blank, typed_id};
use stockroom_events::Event;

use crate::part::{PartCategory, PartId};

typed_id!(
    /// Bill-of-materials identifier.
    BomId
);

/// One component of a BOM: how many of a part go into a single unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomLine {
    pub part_id: PartId,
    pub quantity: u64,
}

/// Maximum number of complete units buildable from current stock.
///
/// The scarcest component decides: `min(floor(stock / quantity))` over all
/// lines. A part the lookup does not know counts as zero stock. An empty line
/// list builds nothing.
pub fn buildable_units<F>(lines: &[BomLine], stock_of: F) -> u64
where
    F: Fn(PartId) -> Option<u64>,
{
    lines
        .iter()
        .map(|line| match line.quantity {
            0 => 0,
            per_unit => stock_of(line.part_id).unwrap_or(0) / per_unit,
        })
        .min()
        .unwrap_or(0)
}

/// Validate lines: non-empty, positive quantities; repeated parts are merged
/// into one line, keeping first-seen order.
fn normalize_lines(lines: &[BomLine]) -> Result<Vec<BomLine>, DomainError> {
    if lines.is_empty() {
        return Err(DomainError::validation("a BOM needs at least one line"));
    }

    let mut merged: Vec<BomLine> = Vec::with_capacity(lines.len());
    let mut index: BTreeMap<PartId, usize> = BTreeMap::new();
    for line in lines {
        if line.quantity == 0 {
            return Err(DomainError::validation(format!(
                "quantity for part {} must be positive",
                line.part_id
            )));
        }
        match index.get(&line.part_id) {
            Some(&at) => {
                merged[at].quantity = merged[at].quantity.checked_add(line.quantity).ok_or_else(|| {
                    DomainError::validation(format!("quantity for part {} is too large", line.part_id))
                })?;
            }
            None => {
                index.insert(line.part_id, merged.len());
                merged.push(*line);
            }
        }
    }
    Ok(merged)
}

/// Aggregate root: Bom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bom {
    id: BomId,
    name: String,
    category: PartCategory,
    lines: Vec<BomLine>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
    #[serde(skip)]
    removed: bool,
}

impl Bom {
    pub fn empty(id: BomId) -> Self {
        Self {
            id,
            name: String::new(),
            category: PartCategory::Production,
            lines: Vec::new(),
            version: 0,
            created: false,
            removed: false,
        }
    }

    pub fn id_typed(&self) -> BomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> PartCategory {
        self.category
    }

    pub fn lines(&self) -> &[BomLine] {
        &self.lines
    }

    /// Per-unit quantity of `part_id`, if the part is a component.
    pub fn quantity_of(&self, part_id: PartId) -> Option<u64> {
        self.lines.iter().find(|l| l.part_id == part_id).map(|l| l.quantity)
    }

    pub fn buildable_units<F>(&self, stock_of: F) -> u64
    where
        F: Fn(PartId) -> Option<u64>,
    {
        buildable_units(&self.lines, stock_of)
    }

    /// Lines scaled to `units` finished units.
    pub fn scaled(&self, units: u64) -> Vec<BomLine> {
        self.lines
            .iter()
            .map(|l| BomLine {
                part_id: l.part_id,
                quantity: l.quantity.saturating_mul(units),
            })
            .collect()
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

impl AggregateRoot for Bom {
    type Id = BomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateBom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBom {
    pub bom_id: BomId,
    pub name: String,
    pub category: PartCategory,
    pub lines: Vec<BomLine>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateBom (replaces name and/or lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBom {
    pub bom_id: BomId,
    pub name: Option<String>,
    pub lines: Option<Vec<BomLine>>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveBom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveBom {
    pub bom_id: BomId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BomCommand {
    CreateBom(CreateBom),
    UpdateBom(UpdateBom),
    RemoveBom(RemoveBom),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomCreated {
    pub bom_id: BomId,
    pub name: String,
    pub category: PartCategory,
    pub lines: Vec<BomLine>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomUpdated {
    pub bom_id: BomId,
    pub name: String,
    pub lines: Vec<BomLine>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomRemoved {
    pub bom_id: BomId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BomEvent {
    BomCreated(BomCreated),
    BomUpdated(BomUpdated),
    BomRemoved(BomRemoved),
}

impl Event for BomEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BomEvent::BomCreated(_) => "inventory.bom.created",
            BomEvent::BomUpdated(_) => "inventory.bom.updated",
            BomEvent::BomRemoved(_) => "inventory.bom.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BomEvent::BomCreated(e) => e.occurred_at,
            BomEvent::BomUpdated(e) => e.occurred_at,
            BomEvent::BomRemoved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Bom {
    type Command = BomCommand;
    type Event = BomEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BomEvent::BomCreated(e) => {
                self.id = e.bom_id;
                self.name = e.name.clone();
                self.category = e.category;
                self.lines = e.lines.clone();
                self.created = true;
            }
            BomEvent::BomUpdated(e) => {
                self.name = e.name.clone();
                self.lines = e.lines.clone();
            }
            BomEvent::BomRemoved(_) => {
                self.removed = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BomCommand::CreateBom(cmd) => {
                if self.created {
                    return Err(DomainError::conflict("bom already exists"));
                }
                require_non_blank("name", &cmd.name)?;
                Ok(vec![BomEvent::BomCreated(BomCreated {
                    bom_id: cmd.bom_id,
                    name: cmd.name.trim().to_string(),
                    category: cmd.category,
                    lines: normalize_lines(&cmd.lines)?,
                    occurred_at: cmd.occurred_at,
                })])
            }
            BomCommand::UpdateBom(cmd) => {
                self.ensure_live(cmd.bom_id)?;
                let name = cmd.name.clone().unwrap_or_else(|| self.name.clone());
                require_non_blank("name", &name)?;
                let lines = match &cmd.lines {
                    Some(lines) => normalize_lines(lines)?,
                    None => self.lines.clone(),
                };
                Ok(vec![BomEvent::BomUpdated(BomUpdated {
                    bom_id: cmd.bom_id,
                    name: name.trim().to_string(),
                    lines,
                    occurred_at: cmd.occurred_at,
                })])
            }
            BomCommand::RemoveBom(cmd) => {
                self.ensure_live(cmd.bom_id)?;
                Ok(vec![BomEvent::BomRemoved(BomRemoved {
                    bom_id: cmd.bom_id,
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }
}

impl Bom {
    fn ensure_live(&self, bom_id: BomId) -> Result<(), DomainError> {
        if !self.created || self.removed {
            return Err(DomainError::not_found());
        }
        if self.id != bom_id {
            return Err(DomainError::invariant("bom_id mismatch"));
        }
        Ok(())
    }
}

impl From<(PartId, u64)> for BomLine {
    fn from((part_id, quantity): (PartId, u64)) -> Self {
        Self { part_id, quantity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn line(part_id: PartId, quantity: u64) -> BomLine {
        BomLine { part_id, quantity }
    }

    fn created(lines: Vec<BomLine>) -> Bom {
        let id = BomId::generate();
        let mut bom = Bom::empty(id);
        bom.execute(&BomCommand::CreateBom(CreateBom {
            bom_id: id,
            name: "Quad standard".to_string(),
            category: PartCategory::Production,
            lines,
            occurred_at: Utc::now(),
        }))
        .unwrap();
        bom
    }

    #[test]
    fn scarcest_component_limits_buildable_units() {
        let (props, motors, fc) = (PartId::generate(), PartId::generate(), PartId::generate());
        let stock: HashMap<PartId, u64> = [(props, 120), (motors, 85), (fc, 65)].into_iter().collect();
        let lines = [line(props, 4), line(motors, 4), line(fc, 1)];

        // 120/4 = 30, 85/4 = 21, 65/1 = 65
        assert_eq!(buildable_units(&lines, |id| stock.get(&id).copied()), 21);
    }

    #[test]
    fn unknown_parts_count_as_zero_stock() {
        let known = PartId::generate();
        let lines = [line(known, 1), line(PartId::generate(), 1)];
        assert_eq!(buildable_units(&lines, |id| (id == known).then_some(100)), 0);
    }

    #[test]
    fn empty_bom_builds_nothing() {
        assert_eq!(buildable_units(&[], |_| Some(100)), 0);
    }

    #[test]
    fn create_merges_repeated_parts_and_rejects_zero_quantities() {
        let p = PartId::generate();
        let q = PartId::generate();
        let bom = created(vec![line(p, 2), line(q, 1), line(p, 2)]);
        assert_eq!(bom.lines(), &[line(p, 4), line(q, 1)]);
        assert_eq!(bom.quantity_of(p), Some(4));

        let id = BomId::generate();
        let err = Bom::empty(id)
            .handle(&BomCommand::CreateBom(CreateBom {
                bom_id: id,
                name: "Broken".to_string(),
                category: PartCategory::Spare,
                lines: vec![line(p, 0)],
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn merging_repeated_parts_rejects_overflowing_quantities() {
        let p = PartId::generate();
        let id = BomId::generate();
        let err = Bom::empty(id)
            .handle(&BomCommand::CreateBom(CreateBom {
                bom_id: id,
                name: "Huge".to_string(),
                category: PartCategory::Addon,
                lines: vec![line(p, u64::MAX), line(p, 1)],
                occurred_at: Utc::now(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref msg) if msg.contains("too large")));

        // The same part at exactly u64::MAX is fine on its own.
        let bom = created(vec![line(p, u64::MAX)]);
        assert_eq!(bom.quantity_of(p), Some(u64::MAX));
        assert_eq!(bom.scaled(2), vec![line(p, u64::MAX)]);
    }

    #[test]
    fn update_replaces_lines_but_keeps_name() {
        let p = PartId::generate();
        let mut bom = created(vec![line(p, 1)]);
        bom.execute(&BomCommand::UpdateBom(UpdateBom {
            bom_id: bom.id_typed(),
            name: None,
            lines: Some(vec![line(p, 3)]),
            occurred_at: Utc::now(),
        }))
        .unwrap();
        assert_eq!(bom.name(), "Quad standard");
        assert_eq!(bom.lines(), &[line(p, 3)]);
    }

    #[test]
    fn scaled_multiplies_every_line() {
        let (p, q) = (PartId::generate(), PartId::generate());
        let bom = created(vec![line(p, 4), line(q, 1)]);
        assert_eq!(bom.scaled(3), vec![line(p, 12), line(q, 3)]);
    }

    proptest! {
        #[test]
        fn buildable_units_can_actually_be_built(
            components in proptest::collection::vec((1u64..10, 0u64..500), 1..8)
        ) {
            let ids: Vec<PartId> = components.iter().map(|_| PartId::generate()).collect();
            let lines: Vec<BomLine> = ids.iter().zip(&components).map(|(id, (q, _))| line(*id, *q)).collect();
            let stock: HashMap<PartId, u64> = ids.iter().zip(&components).map(|(id, (_, s))| (*id, *s)).collect();

            let n = buildable_units(&lines, |id| stock.get(&id).copied());

            // n units fit, n + 1 do not.
            for l in &lines {
                prop_assert!(l.quantity * n <= stock[&l.part_id]);
            }
            prop_assert!(lines.iter().any(|l| l.quantity * (n + 1) > stock[&l.part_id]));
        }
    }
}
