use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Aggregate, AggregateRoot, DomainError, Money, require_non_blank, typed_id};
use stockroom_events::Event;
use stockroom_inventory::format_part_number;
use stockroom_vendors::VendorId;

typed_id!(
    /// Incoming article identifier.
    ArticleId
);

/// QC lifecycle of an incoming article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Pending,
    Counted,
    QcComplete,
    Approved,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleStatus::Pending => "pending",
            ArticleStatus::Counted => "counted",
            ArticleStatus::QcComplete => "qc_complete",
            ArticleStatus::Approved => "approved",
        }
    }
}

/// Per-unit cost lines of a consignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub unit_price: Money,
    pub customs_duty: Money,
    /// Social welfare surcharge levied on the customs duty.
    pub sws: Money,
    pub gst: Money,
    pub carrier_charges: Money,
}

impl CostBreakdown {
    /// Landed cost per unit before GST (GST is recoverable, so it is left out).
    pub fn landed_unit_cost(&self) -> Money {
        self.unit_price + self.customs_duty + self.sws + self.carrier_charges
    }
}

/// Partial update of a pending article; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePatch {
    pub part_number: Option<String>,
    pub vendor_id: Option<VendorId>,
    pub quantity: Option<u64>,
    pub costs: Option<CostBreakdown>,
}

/// Aggregate root: IncomingArticle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomingArticle {
    id: ArticleId,
    part_number: String,
    vendor_id: VendorId,
    quantity: u64,
    #[serde(flatten)]
    costs: CostBreakdown,
    landed_unit_cost: Money,
    created_at: DateTime<Utc>,
    status: ArticleStatus,
    final_accepted_quantity: Option<u64>,
    qc_remarks: Option<String>,
    qc_checklist_url: Option<String>,
    approved_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
    #[serde(skip)]
    removed: bool,
}

impl IncomingArticle {
    pub fn empty(id: ArticleId) -> Self {
        Self {
            id,
            part_number: String::new(),
            vendor_id: VendorId::new(stockroom_core::AggregateId::from_u128(0)),
            quantity: 0,
            costs: CostBreakdown::default(),
            landed_unit_cost: Money::ZERO,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            status: ArticleStatus::Pending,
            final_accepted_quantity: None,
            qc_remarks: None,
            qc_checklist_url: None,
            approved_at: None,
            version: 0,
            created: false,
            removed: false,
        }
    }

    pub fn id_typed(&self) -> ArticleId {
        self.id
    }

    pub fn part_number(&self) -> &str {
        &self.part_number
    }

    pub fn vendor_id(&self) -> VendorId {
        self.vendor_id
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn costs(&self) -> &CostBreakdown {
        &self.costs
    }

    pub fn landed_unit_cost(&self) -> Money {
        self.landed_unit_cost
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> ArticleStatus {
        self.status
    }

    pub fn final_accepted_quantity(&self) -> Option<u64> {
        self.final_accepted_quantity
    }

    pub fn qc_remarks(&self) -> Option<&str> {
        self.qc_remarks.as_deref()
    }

    pub fn qc_checklist_url(&self) -> Option<&str> {
        self.qc_checklist_url.as_deref()
    }

    /// Quantity that turns into stock on approval: the counted quantity when
    /// one was recorded, otherwise the ordered quantity.
    pub fn accepted_quantity(&self) -> u64 {
        self.final_accepted_quantity.unwrap_or(self.quantity)
    }

    /// Invoice value at the vendor's unit price (ordered quantity).
    pub fn order_value(&self) -> Money {
        self.costs.unit_price.times(self.quantity)
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

impl AggregateRoot for IncomingArticle {
    type Id = ArticleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterArticle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterArticle {
    pub article_id: ArticleId,
    pub part_number: String,
    pub vendor_id: VendorId,
    pub quantity: u64,
    pub costs: CostBreakdown,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateArticle (only while pending).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateArticle {
    pub article_id: ArticleId,
    pub patch: ArticlePatch,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordCount (goods counted at the dock).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCount {
    pub article_id: ArticleId,
    pub final_accepted_quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteQc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteQc {
    pub article_id: ArticleId,
    pub remarks: Option<String>,
    pub checklist_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Verify.
///
/// The single "save verification" step: the two checkboxes decide the target
/// status and the article is moved there, forwards or back to pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verify {
    pub article_id: ArticleId,
    pub counted: bool,
    pub final_accepted_quantity: Option<u64>,
    pub qc_complete: bool,
    pub remarks: Option<String>,
    pub checklist_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Approve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approve {
    pub article_id: ArticleId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveArticle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveArticle {
    pub article_id: ArticleId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleCommand {
    RegisterArticle(RegisterArticle),
    UpdateArticle(UpdateArticle),
    RecordCount(RecordCount),
    CompleteQc(CompleteQc),
    Verify(Verify),
    Approve(Approve),
    RemoveArticle(RemoveArticle),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRegistered {
    pub article_id: ArticleId,
    pub part_number: String,
    pub vendor_id: VendorId,
    pub quantity: u64,
    pub costs: CostBreakdown,
    pub landed_unit_cost: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleUpdated {
    pub article_id: ArticleId,
    pub part_number: String,
    pub vendor_id: VendorId,
    pub quantity: u64,
    pub costs: CostBreakdown,
    pub landed_unit_cost: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleCounted {
    pub article_id: ArticleId,
    pub final_accepted_quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QcCompleted {
    pub article_id: ArticleId,
    pub remarks: Option<String>,
    pub checklist_url: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ArticleReverted (back to pending; count and QC results are discarded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleReverted {
    pub article_id: ArticleId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ArticleApproved.
///
/// Carries what the stock rule needs: the part number to look up and the
/// quantity to add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleApproved {
    pub article_id: ArticleId,
    pub part_number: String,
    pub accepted_quantity: u64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRemoved {
    pub article_id: ArticleId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleEvent {
    ArticleRegistered(ArticleRegistered),
    ArticleUpdated(ArticleUpdated),
    ArticleCounted(ArticleCounted),
    QcCompleted(QcCompleted),
    ArticleReverted(ArticleReverted),
    ArticleApproved(ArticleApproved),
    ArticleRemoved(ArticleRemoved),
}

impl Event for ArticleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ArticleEvent::ArticleRegistered(_) => "receiving.article.registered",
            ArticleEvent::ArticleUpdated(_) => "receiving.article.updated",
            ArticleEvent::ArticleCounted(_) => "receiving.article.counted",
            ArticleEvent::QcCompleted(_) => "receiving.article.qc_completed",
            ArticleEvent::ArticleReverted(_) => "receiving.article.reverted",
            ArticleEvent::ArticleApproved(_) => "receiving.article.approved",
            ArticleEvent::ArticleRemoved(_) => "receiving.article.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ArticleEvent::ArticleRegistered(e) => e.occurred_at,
            ArticleEvent::ArticleUpdated(e) => e.occurred_at,
            ArticleEvent::ArticleCounted(e) => e.occurred_at,
            ArticleEvent::QcCompleted(e) => e.occurred_at,
            ArticleEvent::ArticleReverted(e) => e.occurred_at,
            ArticleEvent::ArticleApproved(e) => e.occurred_at,
            ArticleEvent::ArticleRemoved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for IncomingArticle {
    type Command = ArticleCommand;
    type Event = ArticleEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ArticleEvent::ArticleRegistered(e) => {
                self.id = e.article_id;
                self.part_number = e.part_number.clone();
                self.vendor_id = e.vendor_id;
                self.quantity = e.quantity;
                self.costs = e.costs;
                self.landed_unit_cost = e.landed_unit_cost;
                self.created_at = e.occurred_at;
                self.status = ArticleStatus::Pending;
                self.created = true;
            }
            ArticleEvent::ArticleUpdated(e) => {
                self.part_number = e.part_number.clone();
                self.vendor_id = e.vendor_id;
                self.quantity = e.quantity;
                self.costs = e.costs;
                self.landed_unit_cost = e.landed_unit_cost;
            }
            ArticleEvent::ArticleCounted(e) => {
                self.final_accepted_quantity = Some(e.final_accepted_quantity);
                self.status = ArticleStatus::Counted;
            }
            ArticleEvent::QcCompleted(e) => {
                self.qc_remarks = e.remarks.clone();
                self.qc_checklist_url = e.checklist_url.clone();
                self.status = ArticleStatus::QcComplete;
            }
            ArticleEvent::ArticleReverted(_) => {
                self.final_accepted_quantity = None;
                self.qc_remarks = None;
                self.qc_checklist_url = None;
                self.status = ArticleStatus::Pending;
            }
            ArticleEvent::ArticleApproved(e) => {
                self.status = ArticleStatus::Approved;
                self.approved_at = Some(e.occurred_at);
            }
            ArticleEvent::ArticleRemoved(_) => {
                self.removed = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ArticleCommand::RegisterArticle(cmd) => self.handle_register(cmd),
            ArticleCommand::UpdateArticle(cmd) => self.handle_update(cmd),
            ArticleCommand::RecordCount(cmd) => self.handle_record_count(cmd),
            ArticleCommand::CompleteQc(cmd) => self.handle_complete_qc(cmd),
            ArticleCommand::Verify(cmd) => self.handle_verify(cmd),
            ArticleCommand::Approve(cmd) => self.handle_approve(cmd),
            ArticleCommand::RemoveArticle(cmd) => self.handle_remove(cmd),
        }
    }
}

/// Empty strings from a form mean "no value".
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl IncomingArticle {
    fn ensure_live(&self, article_id: ArticleId) -> Result<(), DomainError> {
        if !self.created || self.removed {
            return Err(DomainError::not_found());
        }
        if self.id != article_id {
            return Err(DomainError::invariant("article_id mismatch"));
        }
        Ok(())
    }

    fn ensure_status(&self, allowed: &[ArticleStatus], action: &str) -> Result<(), DomainError> {
        if allowed.contains(&self.status) {
            return Ok(());
        }
        Err(DomainError::conflict(format!(
            "cannot {action} an article in status '{}'",
            self.status.as_str()
        )))
    }

    fn ensure_quantity(quantity: u64) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        Ok(())
    }

    fn counted_event(&self, quantity: u64, at: DateTime<Utc>) -> Result<ArticleEvent, DomainError> {
        if quantity > self.quantity {
            return Err(DomainError::validation(format!(
                "accepted quantity {quantity} exceeds ordered quantity {}",
                self.quantity
            )));
        }
        Ok(ArticleEvent::ArticleCounted(ArticleCounted {
            article_id: self.id,
            final_accepted_quantity: quantity,
            occurred_at: at,
        }))
    }

    fn handle_register(&self, cmd: &RegisterArticle) -> Result<Vec<ArticleEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("article already exists"));
        }
        require_non_blank("part_number", &cmd.part_number)?;
        Self::ensure_quantity(cmd.quantity)?;

        Ok(vec![ArticleEvent::ArticleRegistered(ArticleRegistered {
            article_id: cmd.article_id,
            part_number: format_part_number(&cmd.part_number),
            vendor_id: cmd.vendor_id,
            quantity: cmd.quantity,
            costs: cmd.costs,
            landed_unit_cost: cmd.costs.landed_unit_cost(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateArticle) -> Result<Vec<ArticleEvent>, DomainError> {
        self.ensure_live(cmd.article_id)?;
        self.ensure_status(&[ArticleStatus::Pending], "edit")?;

        let patch = &cmd.patch;
        let part_number = match &patch.part_number {
            Some(pn) => {
                require_non_blank("part_number", pn)?;
                format_part_number(pn)
            }
            None => self.part_number.clone(),
        };
        let quantity = patch.quantity.unwrap_or(self.quantity);
        Self::ensure_quantity(quantity)?;
        let costs = patch.costs.unwrap_or(self.costs);

        Ok(vec![ArticleEvent::ArticleUpdated(ArticleUpdated {
            article_id: cmd.article_id,
            part_number,
            vendor_id: patch.vendor_id.unwrap_or(self.vendor_id),
            quantity,
            costs,
            landed_unit_cost: costs.landed_unit_cost(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_count(&self, cmd: &RecordCount) -> Result<Vec<ArticleEvent>, DomainError> {
        self.ensure_live(cmd.article_id)?;
        self.ensure_status(&[ArticleStatus::Pending, ArticleStatus::Counted], "count")?;

        Ok(vec![self.counted_event(cmd.final_accepted_quantity, cmd.occurred_at)?])
    }

    fn handle_complete_qc(&self, cmd: &CompleteQc) -> Result<Vec<ArticleEvent>, DomainError> {
        self.ensure_live(cmd.article_id)?;
        self.ensure_status(&[ArticleStatus::Counted, ArticleStatus::QcComplete], "complete QC for")?;

        Ok(vec![ArticleEvent::QcCompleted(QcCompleted {
            article_id: cmd.article_id,
            remarks: non_empty(&cmd.remarks),
            checklist_url: non_empty(&cmd.checklist_url),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_verify(&self, cmd: &Verify) -> Result<Vec<ArticleEvent>, DomainError> {
        self.ensure_live(cmd.article_id)?;
        self.ensure_status(
            &[ArticleStatus::Pending, ArticleStatus::Counted, ArticleStatus::QcComplete],
            "verify",
        )?;

        // QC cannot be complete on goods that were never counted.
        if !cmd.counted {
            return Ok(match self.status {
                ArticleStatus::Pending => Vec::new(),
                _ => vec![ArticleEvent::ArticleReverted(ArticleReverted {
                    article_id: cmd.article_id,
                    occurred_at: cmd.occurred_at,
                })],
            });
        }

        let quantity = cmd
            .final_accepted_quantity
            .or(self.final_accepted_quantity)
            .unwrap_or(self.quantity);
        let mut events = vec![self.counted_event(quantity, cmd.occurred_at)?];

        if cmd.qc_complete {
            events.push(ArticleEvent::QcCompleted(QcCompleted {
                article_id: cmd.article_id,
                remarks: non_empty(&cmd.remarks),
                checklist_url: non_empty(&cmd.checklist_url),
                occurred_at: cmd.occurred_at,
            }));
        }
        Ok(events)
    }

    fn handle_approve(&self, cmd: &Approve) -> Result<Vec<ArticleEvent>, DomainError> {
        self.ensure_live(cmd.article_id)?;
        self.ensure_status(&[ArticleStatus::QcComplete], "approve")?;

        Ok(vec![ArticleEvent::ArticleApproved(ArticleApproved {
            article_id: cmd.article_id,
            part_number: self.part_number.clone(),
            accepted_quantity: self.accepted_quantity(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveArticle) -> Result<Vec<ArticleEvent>, DomainError> {
        self.ensure_live(cmd.article_id)?;
        if self.status == ArticleStatus::Approved {
            return Err(DomainError::conflict(
                "approved articles are part of the stock history and cannot be deleted",
            ));
        }

        Ok(vec![ArticleEvent::ArticleRemoved(ArticleRemoved {
            article_id: cmd.article_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
