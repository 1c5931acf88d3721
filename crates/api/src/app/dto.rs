use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use stockroom_dispatch::{DispatchHeader, DispatchLine};
use stockroom_infra::NewArticle;
use stockroom_infra::reports::DateRange;
use stockroom_inventory::{BomId, BomLine, Part, PartCategory, PartDetails};
use stockroom_receiving::CostBreakdown;
use stockroom_vendors::{ContactInfo, VendorId};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterVendorRequest {
    pub name: String,
    #[serde(flatten)]
    pub contact: ContactInfo,
}

#[derive(Debug, Deserialize)]
pub struct CreatePartRequest {
    #[serde(flatten)]
    pub details: PartDetails,
    #[serde(default)]
    pub current_stock: u64,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i64,
    pub note: Option<String>,
}

/// Costs travel flat next to the other fields, in paise.
#[derive(Debug, Deserialize)]
pub struct RegisterArticleRequest {
    pub part_number: String,
    pub vendor_id: VendorId,
    pub quantity: u64,
    #[serde(flatten)]
    pub costs: CostBreakdown,
}

impl From<RegisterArticleRequest> for NewArticle {
    fn from(body: RegisterArticleRequest) -> Self {
        NewArticle {
            part_number: body.part_number,
            vendor_id: body.vendor_id,
            quantity: body.quantity,
            costs: body.costs,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordCountRequest {
    pub final_accepted_quantity: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteQcRequest {
    pub remarks: Option<String>,
    pub checklist_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordDispatchRequest {
    #[serde(flatten)]
    pub header: DispatchHeader,
    pub lines: Vec<DispatchLine>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBomRequest {
    pub name: String,
    pub category: PartCategory,
    pub lines: Vec<BomLine>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBomRequest {
    pub name: Option<String>,
    pub lines: Option<Vec<BomLine>>,
}

#[derive(Debug, Deserialize)]
pub struct UnitsQuery {
    pub units: u64,
}

#[derive(Debug, Deserialize)]
pub struct RecordCompletionRequest {
    pub units_completed: u64,
    pub bom_id: Option<BomId>,
}

#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    #[serde(default)]
    pub after: u64,
    pub limit: Option<usize>,
}

pub const DEFAULT_JOURNAL_LIMIT: usize = 100;

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD`; either bound may be left out.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ReportQuery {
    /// Resolve against a default range ending at `end` (today unless given).
    ///
    /// The outbound report defaults to the last seven days
    /// ([`DateRange::last_week`]); the inbound report defaults to month-to-date
    /// ([`DateRange::month_to_date`]).
    pub fn resolve(self, default: fn(NaiveDate) -> DateRange) -> stockroom_core::DomainResult<DateRange> {
        let end = self.end.unwrap_or_else(|| Utc::now().date_naive());
        let start = self.start.unwrap_or_else(|| default(end).start());
        DateRange::new(start, end)
    }
}

// -------------------------
// Response mapping
// -------------------------

/// A part plus its derived stock status.
pub fn part_to_json(part: &Part) -> JsonValue {
    let mut value = serde_json::to_value(part).unwrap_or_else(|_| json!({}));
    if let Some(obj) = value.as_object_mut() {
        obj.insert("stock_status".to_string(), json!(part.stock_status()));
    }
    value
}

pub fn items<T: serde::Serialize>(items: Vec<T>) -> JsonValue {
    json!({ "items": items })
}
