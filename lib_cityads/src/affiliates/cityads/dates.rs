//! Date handling in the formats CityAds speaks.
//!
//! Request paths embed plain calendar dates (`YYYY-MM-DD`) taken from the
//! *local* calendar of the input. Lead records report timestamps as
//! `DD.MM.YYYY HH:MM:SS`, optionally followed by a UTC offset.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

const PROVIDER_DATE_FORMAT: &str = "%Y-%m-%d";
const TEXT_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Anything that can name a local calendar day.
pub trait ProviderDate {
    /// The local calendar date this value falls on.
    fn local_date(&self) -> NaiveDate;
}

impl ProviderDate for NaiveDate {
    fn local_date(&self) -> NaiveDate {
        *self
    }
}

/// A naive date-time is taken to already be local wall-clock time.
impl ProviderDate for NaiveDateTime {
    fn local_date(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> ProviderDate for DateTime<Tz> {
    fn local_date(&self) -> NaiveDate {
        self.with_timezone(&Local).date_naive()
    }
}

impl<T: ProviderDate + ?Sized> ProviderDate for &T {
    fn local_date(&self) -> NaiveDate {
        (**self).local_date()
    }
}

/// An instant given as milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpochMillis(DateTime<Utc>);

impl EpochMillis {
    /// `None` when `millis` is outside the range chrono can represent.
    pub fn new(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

impl ProviderDate for EpochMillis {
    fn local_date(&self) -> NaiveDate {
        self.0.with_timezone(&Local).date_naive()
    }
}

/// Formats a date-like value as `YYYY-MM-DD` using its local calendar date.
pub fn to_provider_date_format<D: ProviderDate + ?Sized>(input: &D) -> String {
    input.local_date().format(PROVIDER_DATE_FORMAT).to_string()
}

/// Parses a `DD.MM.YYYY HH:MM:SS[ <offset>]` timestamp.
///
/// Without an offset the wall-clock time is read in the local timezone.
/// Empty, absent or malformed input yields `None`, as does a local time that
/// falls into a DST gap.
pub fn parse_text_timestamp(text: Option<&str>) -> Option<DateTime<Utc>> {
    let text = text.map(str::trim).filter(|t| !t.is_empty())?;
    let mut parts = text.split_whitespace();
    let date = parts.next()?;
    let time = parts.next()?;
    let naive = NaiveDateTime::parse_from_str(&format!("{date} {time}"), TEXT_TIMESTAMP_FORMAT).ok()?;

    match parts.next().and_then(parse_offset) {
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
        None => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

fn parse_offset(token: &str) -> Option<FixedOffset> {
    let token = token.trim_start_matches("UTC").trim_start_matches("GMT");
    if token.is_empty() {
        return FixedOffset::east_opt(0);
    }
    DateTime::parse_from_str(&format!("2000-01-01 00:00:00 {token}"), "%Y-%m-%d %H:%M:%S %z")
        .ok()
        .map(|dt| *dt.offset())
}
