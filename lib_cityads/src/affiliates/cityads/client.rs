//! # CityAds Client
//!
//! `CityadsApi` wraps the webmaster endpoints behind typed async methods.
//! Every method is one or more serial GET requests followed by pure
//! normalization (see `normalize`); the client holds no mutable state and can
//! be shared between tasks.
//!
//! ## Pagination
//! List endpoints are fetched page by page with `limit` / `start`. The loop
//! keeps going while the server-reported total exceeds
//! `page_size * pages_fetched`, and stops early on an empty page or after
//! `MAX_PAGES`. A failure on the first page fails the call; a failure on a
//! later page ends the loop and returns what was collected so far.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use super::apicall::{ApiCall, CITYADS_API_URL};
use super::dates::{to_provider_date_format, ProviderDate};
use super::error::{CityadsError, Result};
use super::models::{
    Balance, CommissionTotals, ConversionSummary, LeadRecord, OfferLink, OfferStatisticsRow,
    Profile, TrafficChannel,
};
use super::normalize;

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Hard stop for pagination regardless of what the server reports.
pub const MAX_PAGES: u64 = 1000;

/// Optional filters for `get_leads_by_offer_id`.
///
/// An id of 0 is treated as absent, like `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadQuery {
    pub offer_id: Option<i64>,
    pub channel_id: Option<i64>,
    /// Click id passed through to the provider's `xid` filter.
    pub xid: Option<String>,
}

impl LeadQuery {
    pub fn offer(offer_id: i64) -> Self {
        Self {
            offer_id: Some(offer_id),
            ..Default::default()
        }
    }

    pub fn channel(mut self, channel_id: i64) -> Self {
        self.channel_id = Some(channel_id);
        self
    }

    pub fn xid(mut self, xid: impl Into<String>) -> Self {
        self.xid = Some(xid.into());
        self
    }
}

/// Builder for `CityadsApi`.
#[derive(Debug, Clone)]
pub struct CityadsApiBuilder {
    token: String,
    base_url: String,
    page_size: u32,
    timeout: Option<Duration>,
}

impl CityadsApiBuilder {
    /// Overrides the API root (useful for staging hosts and mock servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Items per page for paginated endpoints. Zero is treated as 1.
    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Total timeout per HTTP request. Unset means the transport default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client. No network traffic happens here.
    pub fn build(self) -> Result<CityadsApi> {
        Ok(CityadsApi {
            api_call: ApiCall::new(&self.base_url, &self.token, self.timeout)?,
            page_size: self.page_size,
        })
    }
}

/// Client for the CityAds webmaster API.
#[derive(Debug, Clone)]
pub struct CityadsApi {
    api_call: ApiCall,
    page_size: u32,
}

impl CityadsApi {
    /// Creates a client for the production API authenticated by `webmaster_token`.
    pub fn new(webmaster_token: impl Into<String>) -> Result<Self> {
        Self::builder(webmaster_token).build()
    }

    pub fn builder(webmaster_token: impl Into<String>) -> CityadsApiBuilder {
        CityadsApiBuilder {
            token: webmaster_token.into(),
            base_url: CITYADS_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: None,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The webmaster's profile.
    pub async fn get_profile(&self) -> Result<Profile> {
        let data = self.api_call.fetch_cityads("profile", &[]).await?;
        normalize::profile(data)
    }

    /// Account balance with every amount coerced to a float.
    pub async fn get_balance(&self) -> Result<Balance> {
        let data = self.api_call.fetch_cityads("balanceinfo", &[]).await?;
        Ok(normalize::balance(&data))
    }

    /// Active traffic channels, in provider order.
    pub async fn get_traffic_channels(&self) -> Result<Vec<TrafficChannel>> {
        let data = self.api_call.fetch_cityads("traffic_channels", &[]).await?;
        let items = items_of(&data)?;
        Ok(items.iter().filter_map(normalize::traffic_channel).collect())
    }

    /// The provider's offer record, untouched.
    pub async fn get_offer_data_by_offer_id(&self, offer_id: i64) -> Result<Value> {
        self.api_call
            .fetch_cityads(&format!("offer/{offer_id}"), &[])
            .await
    }

    /// Conversion figures from the first statistics row for an offer.
    ///
    /// `Ok(None)` when the provider has no statistics for the range.
    pub async fn get_cr_by_offer_id(
        &self,
        date_from: impl ProviderDate,
        date_to: impl ProviderDate,
        offer_id: i64,
        channel_id: Option<i64>,
    ) -> Result<Option<ConversionSummary>> {
        let rows = self
            .statistics_rows(
                &to_provider_date_format(&date_from),
                &to_provider_date_format(&date_to),
                Some(offer_id),
                channel_id,
            )
            .await?;

        Ok(rows.first().map(|row| ConversionSummary {
            cr_total: row.cr_total * 100.0,
            open_leads: row.leads_open,
            click_count: row.clicks,
        }))
    }

    /// Every lead uploaded in the date range, normalized.
    pub async fn get_leads_by_offer_id(
        &self,
        date_from: impl ProviderDate,
        date_to: impl ProviderDate,
        query: &LeadQuery,
    ) -> Result<Vec<LeadRecord>> {
        let path = format!(
            "orderstatistics/{}/{}",
            to_provider_date_format(&date_from),
            to_provider_date_format(&date_to)
        );
        let mut params = vec![("date_type", "order_upload".to_string())];
        if let Some(offer_id) = nonzero(query.offer_id) {
            params.push(("action_id", offer_id.to_string()));
        }
        if let Some(channel_id) = nonzero(query.channel_id) {
            params.push(("channel_id", channel_id.to_string()));
        }
        if let Some(xid) = query.xid.as_deref().filter(|x| !x.is_empty()) {
            params.push(("xid", xid.to_string()));
        }

        let items = self.paginate(&path, &params).await?;
        let now = Utc::now();
        Ok(items.iter().map(|item| normalize::lead_record(item, now)).collect())
    }

    /// Per-offer statistics grouped by offer for the date range.
    pub async fn get_statistics_offers_by_offer_id(
        &self,
        date_from: impl ProviderDate,
        date_to: impl ProviderDate,
        offer_id: Option<i64>,
        channel_id: Option<i64>,
    ) -> Result<Vec<OfferStatisticsRow>> {
        self.statistics_rows(
            &to_provider_date_format(&date_from),
            &to_provider_date_format(&date_to),
            offer_id,
            channel_id,
        )
        .await
    }

    /// Commission totals across every statistics row of the range.
    pub async fn get_webmaster_commissions(
        &self,
        date_from: impl ProviderDate,
        date_to: impl ProviderDate,
        offer_id: Option<i64>,
    ) -> Result<CommissionTotals> {
        let rows = self
            .statistics_rows(
                &to_provider_date_format(&date_from),
                &to_provider_date_format(&date_to),
                offer_id,
                None,
            )
            .await?;
        Ok(rows.iter().collect())
    }

    /// Default promotional links of an offer, in provider order.
    pub async fn get_offer_links_by_offer_id(
        &self,
        offer_id: i64,
        channel_id: Option<i64>,
    ) -> Result<Vec<OfferLink>> {
        let mut params = Vec::new();
        if let Some(channel_id) = nonzero(channel_id) {
            params.push(("traffic_channel_id", channel_id.to_string()));
        }
        let data = self
            .api_call
            .fetch_cityads(&format!("offer-links/{offer_id}"), &params)
            .await?;
        let items = items_of(&data)?;
        Ok(items.iter().filter_map(normalize::offer_link).collect())
    }

    /// Offers available to the webmaster, as raw provider records.
    pub async fn get_web_offers(&self) -> Result<Vec<Value>> {
        self.paginate("offers/web", &[]).await
    }

    /// Account charge history, as raw provider records.
    pub async fn get_charge_history(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<Value>> {
        let mut params = Vec::new();
        if let Some(date_from) = date_from {
            params.push(("date_from", to_provider_date_format(&date_from)));
        }
        if let Some(date_to) = date_to {
            params.push(("date_to", to_provider_date_format(&date_to)));
        }
        self.paginate("chargehistorylist", &params).await
    }

    async fn statistics_rows(
        &self,
        date_from: &str,
        date_to: &str,
        offer_id: Option<i64>,
        channel_id: Option<i64>,
    ) -> Result<Vec<OfferStatisticsRow>> {
        let path = format!("statistics-offers/action_id/{date_from}/{date_to}");
        let mut params = Vec::new();
        if let Some(offer_id) = nonzero(offer_id) {
            params.push(("action_id", offer_id.to_string()));
        }
        if let Some(channel_id) = nonzero(channel_id) {
            params.push(("channel_id", channel_id.to_string()));
        }

        let items = self.paginate(&path, &params).await?;
        Ok(items.iter().map(normalize::statistics_row).collect())
    }

    /// Fetches every page of a list endpoint and concatenates the raw items.
    async fn paginate(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<Value>> {
        let page_size = u64::from(self.page_size);
        let mut items: Vec<Value> = Vec::new();
        let mut pages_fetched: u64 = 0;

        loop {
            let mut page_params = params.to_vec();
            page_params.push(("limit", page_size.to_string()));
            page_params.push(("start", (pages_fetched * page_size).to_string()));

            let (page, total) = match self.fetch_page(path, &page_params).await {
                Ok(page) => page,
                Err(e) if pages_fetched == 0 => return Err(e),
                Err(e) => {
                    warn!(
                        path,
                        pages_fetched,
                        collected = items.len(),
                        error = %e,
                        "CityAds page failed, returning partial result"
                    );
                    break;
                }
            };
            pages_fetched += 1;

            let page_len = page.len();
            items.extend(page);
            let total = total.unwrap_or(items.len() as u64);
            debug!(path, pages_fetched, page_len, total, "CityAds page received");

            if page_len == 0 || total <= page_size * pages_fetched {
                break;
            }
            if pages_fetched >= MAX_PAGES {
                warn!(path, total, pages_fetched, "CityAds pagination cap reached");
                break;
            }
        }

        Ok(items)
    }

    async fn fetch_page(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(Vec<Value>, Option<u64>)> {
        let mut data = self.api_call.fetch_cityads(path, params).await?;
        let total = reported_total(&data);
        match data.get_mut("items").map(Value::take) {
            Some(Value::Array(items)) => Ok((items, total)),
            _ => Err(CityadsError::UnexpectedShape(format!("{path}: `items` is not an array"))),
        }
    }
}

/// Ids are optional filters; 0 means "no filter" and is never sent.
fn nonzero(id: Option<i64>) -> Option<i64> {
    id.filter(|id| *id != 0)
}

fn items_of(data: &Value) -> Result<&Vec<Value>> {
    data.get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| CityadsError::UnexpectedShape("`items` is not an array".into()))
}

/// Item count the server reports for the whole query (`total`, or `total_count`).
fn reported_total(data: &Value) -> Option<u64> {
    ["total", "total_count"]
        .iter()
        .filter_map(|key| data.get(*key))
        .find_map(|value| normalize::coerce_f64(value).filter(|n| *n >= 0.0))
        .map(|n| n as u64)
}
