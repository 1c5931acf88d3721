//! Report data: the weekly outbound and monthly inbound reports.
//!
//! Only the data is produced here (filtering, grouping, totals); rendering
//! is up to the client.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Money};
use stockroom_dispatch::OutboundDispatch;
use stockroom_receiving::IncomingArticle;
use stockroom_vendors::VendorId;

/// Name used for articles whose vendor no longer exists.
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    WeeklyInventoryOut,
    MonthlyInventoryIn,
}

/// Inclusive calendar-date range (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if start > end {
            return Err(DomainError::validation(format!(
                "report range starts ({start}) after it ends ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// The seven days ending on `today`.
    pub fn last_week(today: NaiveDate) -> Self {
        Self {
            start: today.checked_sub_days(Days::new(6)).unwrap_or(today),
            end: today,
        }
    }

    /// From the first of `today`'s month through `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self {
            start: today.with_day(1).unwrap_or(today),
            end: today,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start <= day && day <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMeta {
    pub kind: ReportKind,
    pub range: DateRange,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundReport {
    #[serde(flatten)]
    pub meta: ReportMeta,
    pub dispatches: Vec<OutboundDispatch>,
    pub total_units: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VendorGroup {
    pub vendor_id: VendorId,
    pub vendor_name: String,
    pub articles: Vec<IncomingArticle>,
    /// Sum of unit price x ordered quantity over the group.
    pub total_value: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundReport {
    #[serde(flatten)]
    pub meta: ReportMeta,
    pub groups: Vec<VendorGroup>,
    pub total_value: Money,
}

/// Dispatches made within `range`, oldest first.
pub fn outbound<'a, I>(dispatches: I, range: DateRange, generated_at: DateTime<Utc>) -> OutboundReport
where
    I: IntoIterator<Item = &'a OutboundDispatch>,
{
    let mut selected: Vec<OutboundDispatch> = dispatches
        .into_iter()
        .filter(|d| range.contains(d.dispatched_at()))
        .cloned()
        .collect();
    selected.sort_by_key(|d| d.dispatched_at());

    OutboundReport {
        meta: ReportMeta {
            kind: ReportKind::WeeklyInventoryOut,
            range,
            generated_at,
        },
        total_units: selected.iter().map(OutboundDispatch::total_units).fold(0, u64::saturating_add),
        dispatches: selected,
    }
}

/// Articles received within `range`, grouped by vendor.
///
/// Groups appear in order of their vendor's first delivery in the range.
pub fn inbound<'a, I, F>(
    articles: I,
    vendor_name: F,
    range: DateRange,
    generated_at: DateTime<Utc>,
) -> InboundReport
where
    I: IntoIterator<Item = &'a IncomingArticle>,
    F: Fn(VendorId) -> Option<String>,
{
    let mut selected: Vec<&IncomingArticle> = articles
        .into_iter()
        .filter(|a| range.contains(a.created_at()))
        .collect();
    selected.sort_by_key(|a| a.created_at());

    let mut groups: Vec<VendorGroup> = Vec::new();
    for article in selected {
        let at = match groups.iter().position(|g| g.vendor_id == article.vendor_id()) {
            Some(at) => at,
            None => {
                groups.push(VendorGroup {
                    vendor_id: article.vendor_id(),
                    vendor_name: vendor_name(article.vendor_id())
                        .unwrap_or_else(|| UNKNOWN_VENDOR.to_string()),
                    articles: Vec::new(),
                    total_value: Money::ZERO,
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[at];
        group.total_value = group.total_value + article.order_value();
        group.articles.push(article.clone());
    }

    InboundReport {
        meta: ReportMeta {
            kind: ReportKind::MonthlyInventoryIn,
            range,
            generated_at,
        },
        total_value: groups.iter().map(|g| g.total_value).sum(),
        groups,
    }
}
