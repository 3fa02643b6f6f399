//! # CityAds Data Models
//!
//! Normalized entities returned by `CityadsApi`. The provider's wire format
//! mixes string-encoded numbers, Russian and English status names and field
//! names that drifted over time; these structs are the single canonical
//! shape. Each struct documents the wire fields it is built from.
//!
//! All models serialize in camelCase. Timestamps serialize as epoch
//! milliseconds.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::normalize::round_cents;

/// # Profile
///
/// The webmaster's identity record. Only `id` is typed; every other field the
/// provider returns is passed through untouched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// Numeric webmaster id (wire `id`, often string-encoded).
    pub id: i64,
    /// Remaining profile fields as sent by the provider.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// # Balance
///
/// Account balance, with every amount coerced from its string encoding.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    /// Account currency code (wire `currency`).
    pub currency: String,
    /// Wire `main_balance`.
    pub main_balance: f64,
    /// Commission on hold by the advertiser (wire `commission_hold_adv`).
    pub hold_adv: f64,
    /// Commission on hold by CityAds (wire `commission_hold_city`).
    pub hold_city: f64,
    /// Wire `available_balance`.
    pub available_balance: f64,
}

/// An active traffic channel registered by the webmaster.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TrafficChannel {
    pub id: i64,
    pub name: String,
}

/// # Offer Statistics Row
///
/// Grouped per-offer performance for a date range.
///
/// Wire mapping:
/// - `offerId` ← `actionID`
/// - `offerName` ← `actionName`
/// - `leadsOpen` ← `saleOpen`, else `leadsOpen`
/// - `leadsApproved` ← `saleApproved`, else `leadsApproved`
/// - `leadsRejected` is always 0; the endpoint does not report it
/// - `clicks` ← `clickCount`
/// - `backUrlCount` ← `backUrlRedirectCount`
/// - `commissionRejected` ← `commissionCancelled`, else `commissionRejected`
/// - `crTotal` ← `crTotal` (a fraction, not a percentage)
///
/// Counts default to 0 when absent or unparsable; money is rounded to cents.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OfferStatisticsRow {
    pub offer_id: i64,
    pub offer_name: String,
    pub leads_open: i64,
    pub leads_approved: i64,
    pub leads_rejected: i64,
    pub clicks: i64,
    pub back_url_count: i64,
    pub commission_open: f64,
    pub commission_approved: f64,
    pub commission_rejected: f64,
    pub cr_total: f64,
}

/// Lifecycle state of a lead.
///
/// The provider's vocabulary is open-ended: statuses outside the known table
/// are carried verbatim in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LeadStatus {
    Open,
    Approved,
    Rejected,
    Other(String),
}

impl LeadStatus {
    pub const OPEN: &'static str = "open";
    pub const APPROVED: &'static str = "approved";
    pub const REJECTED: &'static str = "rejected";

    pub fn as_str(&self) -> &str {
        match self {
            LeadStatus::Open => Self::OPEN,
            LeadStatus::Approved => Self::APPROVED,
            LeadStatus::Rejected => Self::REJECTED,
            LeadStatus::Other(raw) => raw,
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LeadStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::OPEN => LeadStatus::Open,
            Self::APPROVED => LeadStatus::Approved,
            Self::REJECTED => LeadStatus::Rejected,
            _ => LeadStatus::Other(value),
        }
    }
}

impl From<LeadStatus> for String {
    fn from(value: LeadStatus) -> Self {
        match value {
            LeadStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// # Lead Record
///
/// One conversion event from `orderstatistics`.
///
/// Wire mapping: `orderId` ← `submissionID`, `offerId` ← `offerID`,
/// `leadTime` ← `leadTime`, `saleTime` ← `saleTime`. `commission` is the
/// first non-zero of `commissionApproved`, `commissionCancelled` and
/// `commissionOpen`. `commissionRejected` is also read, after
/// `commissionCancelled`, as an alternate spelling of the cancelled amount.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub order_id: String,
    pub offer_id: i64,
    pub status: LeadStatus,
    pub commission: f64,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub lead_time: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub sale_time: Option<DateTime<Utc>>,
    /// Derived, see `normalize::upload_time`. Depends on the wall clock for
    /// rejected leads and for approved leads without a sale time.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub upload_time: Option<DateTime<Utc>>,
}

/// # Offer Link
///
/// A promotional link for an offer. Only links flagged as default are ever
/// returned by the client.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OfferLink {
    /// Wire `id`; `None` when missing or not numeric.
    pub id: Option<i64>,
    pub name: Option<String>,
    pub url: Option<String>,
    /// Wire `is_default`.
    pub is_default: bool,
    /// Remaining link fields as sent by the provider.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Commission sums for a date range.
///
/// Every addition is rounded to cents before the next one, matching the
/// provider's own rounding granularity. The result can differ from rounding
/// an unrounded sum once; that difference is expected and reproducible.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTotals {
    pub commission_open: f64,
    pub commission_approved: f64,
    pub commission_rejected: f64,
}

impl CommissionTotals {
    /// Adds one statistics row, rounding each running total to cents.
    pub fn add_row(&mut self, row: &OfferStatisticsRow) {
        self.commission_open = round_cents(
            self.commission_open + row.commission_open,
        );
        self.commission_approved = round_cents(
            self.commission_approved + row.commission_approved,
        );
        self.commission_rejected = round_cents(
            self.commission_rejected + row.commission_rejected,
        );
    }
}

impl<'a> FromIterator<&'a OfferStatisticsRow> for CommissionTotals {
    fn from_iter<I: IntoIterator<Item = &'a OfferStatisticsRow>>(iter: I) -> Self {
        let mut totals = CommissionTotals::default();
        for row in iter {
            totals.add_row(row);
        }
        totals
    }
}

/// Conversion figures for one offer, taken from its first statistics row.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversionSummary {
    /// Conversion rate as a percentage (the provider's fraction × 100).
    pub cr_total: f64,
    pub open_leads: i64,
    pub click_count: i64,
}
