//! # Response Normalization
//!
//! Pure functions that turn raw CityAds JSON items into the typed models.
//! Nothing here performs I/O; the only clock dependency (`upload_time`) takes
//! the current instant as an argument.
//!
//! The provider encodes numbers inconsistently (JSON numbers, numeric
//! strings, empty strings, `null`), so every numeric field goes through
//! `coerce_f64` and falls back to 0 when it cannot be read.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Map, Value};

use super::dates::parse_text_timestamp;
use super::error::{CityadsError, Result};
use super::models::{
    Balance, LeadRecord, LeadStatus, OfferLink, OfferStatisticsRow, Profile, TrafficChannel,
};

/// JavaScript-style truthiness of a JSON value.
///
/// `null`, `false`, `0`, `NaN` and `""` are falsy; every array and object,
/// even an empty one, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Reads a JSON value as a float.
///
/// Numbers pass through, numeric strings are parsed after trimming, an empty
/// string, `null` and `false` read as 0 and `true` as 1. Anything else
/// (arrays, objects, non-numeric text) is `None`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().ok()?
            }
        }
        Value::Array(_) | Value::Object(_) => return None,
    };
    number.is_finite().then_some(number)
}

/// Numeric field of `item`, 0 when missing or unreadable.
pub fn number_or_zero(item: &Value, key: &str) -> f64 {
    item.get(key).and_then(coerce_f64).unwrap_or(0.0)
}

/// Integer field of `item` (fractional part truncated), 0 when missing or unreadable.
pub fn int_or_zero(item: &Value, key: &str) -> i64 {
    number_or_zero(item, key) as i64
}

/// The first of `keys` holding a non-zero number, or 0.
pub fn first_nonzero(item: &Value, keys: &[&str]) -> f64 {
    keys.iter()
        .map(|key| number_or_zero(item, key))
        .find(|n| *n != 0.0)
        .unwrap_or(0.0)
}

/// Rounds to two decimals the way the provider does (`toFixed(2)` semantics).
///
/// The decision is made on the exact binary value: `1.005` is stored just
/// below the midpoint and becomes `1.00`, while an exact midpoint such as
/// `0.125` rounds away from zero to `0.13`.
pub fn round_cents(value: f64) -> f64 {
    let Some(exact) = Decimal::from_f64_retain(value) else {
        return if value.is_finite() { value } else { 0.0 };
    };
    exact
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .to_string()
        .parse()
        .unwrap_or(value)
}

/// String field of `item`; numbers are rendered, anything else is `None`.
pub fn text(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Provider flag: `true`, a non-zero number, `"1"` or `"true"`.
pub fn flag(item: &Value, key: &str) -> bool {
    match item.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "TRUE" | "True"),
        _ => false,
    }
}

/// Maps a raw status (English or Russian) onto `LeadStatus`.
pub fn lead_status(raw: &str) -> LeadStatus {
    match raw {
        "Open" | "Открытая" => LeadStatus::Open,
        "Approved" | "Одобрена" => LeadStatus::Approved,
        "Rejected" | "Отклонена" => LeadStatus::Rejected,
        other => LeadStatus::Other(other.to_string()),
    }
}

/// When a lead counts as uploaded.
///
/// Approved leads use their sale time, or `now` when the provider sent none;
/// rejected leads always use `now`; every other status has no upload time.
/// The `now` fallback makes the result depend on when normalization runs.
pub fn upload_time(
    status: &LeadStatus,
    sale_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match status {
        LeadStatus::Approved => Some(sale_time.unwrap_or(now)),
        LeadStatus::Rejected => Some(now),
        _ => None,
    }
}

pub fn profile(data: Value) -> Result<Profile> {
    let Value::Object(mut fields) = data else {
        return Err(CityadsError::UnexpectedShape("profile is not an object".into()));
    };
    let id = fields
        .remove("id")
        .as_ref()
        .and_then(coerce_f64)
        .unwrap_or(0.0) as i64;
    Ok(Profile { id, extra: fields })
}

pub fn balance(data: &Value) -> Balance {
    Balance {
        currency: text(data, "currency").unwrap_or_default(),
        main_balance: number_or_zero(data, "main_balance"),
        hold_adv: number_or_zero(data, "commission_hold_adv"),
        hold_city: number_or_zero(data, "commission_hold_city"),
        available_balance: number_or_zero(data, "available_balance"),
    }
}

/// `None` for inactive channels.
pub fn traffic_channel(item: &Value) -> Option<TrafficChannel> {
    flag(item, "is_active").then(|| TrafficChannel {
        id: int_or_zero(item, "id"),
        name: text(item, "name").unwrap_or_default(),
    })
}

pub fn statistics_row(item: &Value) -> OfferStatisticsRow {
    OfferStatisticsRow {
        offer_id: int_or_zero(item, "actionID"),
        offer_name: text(item, "actionName").unwrap_or_default(),
        leads_open: first_nonzero(item, &["saleOpen", "leadsOpen"]) as i64,
        leads_approved: first_nonzero(item, &["saleApproved", "leadsApproved"]) as i64,
        leads_rejected: 0,
        clicks: int_or_zero(item, "clickCount"),
        back_url_count: int_or_zero(item, "backUrlRedirectCount"),
        commission_open: round_cents(number_or_zero(item, "commissionOpen")),
        commission_approved: round_cents(number_or_zero(item, "commissionApproved")),
        commission_rejected: round_cents(first_nonzero(
            item,
            &["commissionCancelled", "commissionRejected"],
        )),
        cr_total: number_or_zero(item, "crTotal"),
    }
}

pub fn lead_record(item: &Value, now: DateTime<Utc>) -> LeadRecord {
    let status = match item.get("status") {
        Some(Value::String(raw)) => lead_status(raw),
        Some(Value::Null) | None => LeadStatus::Other(String::new()),
        Some(other) => LeadStatus::Other(other.to_string()),
    };
    let lead_time = parse_text_timestamp(item.get("leadTime").and_then(Value::as_str));
    let sale_time = parse_text_timestamp(item.get("saleTime").and_then(Value::as_str));

    LeadRecord {
        order_id: text(item, "submissionID").unwrap_or_default(),
        offer_id: int_or_zero(item, "offerID"),
        commission: first_nonzero(
            item,
            &[
                "commissionApproved",
                "commissionCancelled",
                "commissionRejected",
                "commissionOpen",
            ],
        ),
        lead_time,
        sale_time,
        upload_time: upload_time(&status, sale_time, now),
        status,
    }
}

/// `None` unless the link is flagged as default.
pub fn offer_link(item: &Value) -> Option<OfferLink> {
    if !flag(item, "is_default") {
        return None;
    }
    let mut extra: Map<String, Value> = item.as_object().cloned().unwrap_or_default();
    for key in ["id", "name", "url", "is_default"] {
        extra.remove(key);
    }
    Some(OfferLink {
        id: item.get("id").and_then(coerce_f64).map(|f| f as i64),
        name: text(item, "name"),
        url: text(item, "url"),
        is_default: true,
        extra,
    })
}
