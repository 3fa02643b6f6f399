//! Statistics-backed operations, leads and offer links.

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lib_cityads::affiliates::cityads::{EpochMillis, LeadQuery, LeadStatus};
use project_tests::{api_path, client, envelope, page};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

const STATS_JANUARY: &str = "statistics-offers/action_id/2024-01-01/2024-01-31";

#[tokio::test]
async fn statistics_rows_use_canonical_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(STATS_JANUARY)))
        .and(query_param("action_id", "42"))
        .and(query_param("channel_id", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![json!({
                "actionID": "42",
                "actionName": "Shop",
                "saleOpen": "4",
                "saleApproved": 2,
                "clickCount": "160",
                "backUrlRedirectCount": "5",
                "commissionOpen": "10.456",
                "commissionApproved": 0,
                "commissionCancelled": "1.2",
                "crTotal": "0.25"
            })],
            1,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let rows = client(&server, 1000)
        .get_statistics_offers_by_offer_id(date(2024, 1, 1), date(2024, 1, 31), Some(42), Some(7))
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.offer_id, 42);
    assert_eq!(row.offer_name, "Shop");
    assert_eq!(row.leads_open, 4);
    assert_eq!(row.leads_approved, 2);
    assert_eq!(row.leads_rejected, 0);
    assert_eq!(row.clicks, 160);
    assert_eq!(row.back_url_count, 5);
    assert_eq!(row.commission_open, 10.46);
    assert_eq!(row.commission_rejected, 1.2);
    assert_eq!(row.cr_total, 0.25);
}

#[tokio::test]
async fn conversion_rate_is_a_percentage_of_the_first_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(STATS_JANUARY)))
        .and(query_param("action_id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                json!({"actionID": 42, "crTotal": "0.25", "saleOpen": "4", "clickCount": 160}),
                json!({"actionID": 42, "crTotal": "0.9"}),
            ],
            2,
        )))
        .mount(&server)
        .await;

    // Any date-like value works; only the local calendar date is sent.
    let to = date(2024, 1, 31).and_hms_opt(23, 59, 0).unwrap();
    let summary = client(&server, 1000)
        .get_cr_by_offer_id(date(2024, 1, 1), to, 42, None)
        .await
        .unwrap()
        .expect("one row");

    assert_eq!(summary.cr_total, 25.0);
    assert_eq!(summary.open_leads, 4);
    assert_eq!(summary.click_count, 160);
}

#[tokio::test]
async fn conversion_rate_without_rows_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(STATS_JANUARY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(Vec::new(), 0)))
        .mount(&server)
        .await;

    let summary = client(&server, 1000)
        .get_cr_by_offer_id(date(2024, 1, 1), date(2024, 1, 31), 42, Some(3))
        .await
        .unwrap();
    assert_eq!(summary, None);
}

#[tokio::test]
async fn commissions_are_rounded_at_every_step() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(STATS_JANUARY)))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                json!({"commissionOpen": 10.456, "commissionApproved": "1.005", "commissionCancelled": 1.2}),
                json!({"commissionOpen": "7.333", "commissionApproved": 2.005, "commissionRejected": "0.3"}),
            ],
            2,
        )))
        .mount(&server)
        .await;

    let totals = client(&server, 1000)
        .get_webmaster_commissions(date(2024, 1, 1), date(2024, 1, 31), None)
        .await
        .unwrap();

    assert_eq!(totals.commission_open, 17.79);
    assert_eq!(totals.commission_approved, 3.0);
    assert_eq!(totals.commission_rejected, 1.5);
}

#[tokio::test]
async fn leads_are_normalized_with_upload_times() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("orderstatistics/2024-01-01/2024-01-31")))
        .and(query_param("date_type", "order_upload"))
        .and(query_param("action_id", "17"))
        .and(query_param("xid", "click-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                json!({
                    "submissionID": "A1",
                    "offerID": "17",
                    "status": "Одобрена",
                    "commissionApproved": "12.5",
                    "leadTime": "01.02.2023 10:20:30",
                    "saleTime": "03.02.2023 08:00:00"
                }),
                json!({
                    "submissionID": 2002,
                    "offerID": 17,
                    "status": "Open",
                    "commissionOpen": 3
                }),
            ],
            2,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let query = LeadQuery::offer(17).xid("click-1");
    let leads = client(&server, 1000)
        .get_leads_by_offer_id(date(2024, 1, 1), date(2024, 1, 31), &query)
        .await
        .unwrap();

    assert_eq!(leads.len(), 2);

    let approved = &leads[0];
    assert_eq!(approved.order_id, "A1");
    assert_eq!(approved.offer_id, 17);
    assert_eq!(approved.status, LeadStatus::Approved);
    assert_eq!(approved.commission, 12.5);
    assert!(approved.lead_time.is_some());
    assert!(approved.sale_time.is_some());
    assert_eq!(approved.upload_time, approved.sale_time);

    let open = &leads[1];
    assert_eq!(open.order_id, "2002");
    assert_eq!(open.status, LeadStatus::Open);
    assert_eq!(open.commission, 3.0);
    assert_eq!(open.upload_time, None);
}

#[tokio::test]
async fn only_default_links_are_kept_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path("offer-links/42")))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({"items": [
            {"id": 1, "url": "u1", "is_default": 0},
            {"id": "3", "url": "u3", "is_default": "1"},
            {"id": 2, "url": "u2", "is_default": true}
        ]}))))
        .mount(&server)
        .await;

    let links = client(&server, 1000)
        .get_offer_links_by_offer_id(42, None)
        .await
        .unwrap();

    let ids: Vec<Option<i64>> = links.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![Some(3), Some(2)]);
    assert_eq!(links[0].url.as_deref(), Some("u3"));
    assert!(links.iter().all(|l| l.is_default));
}

#[tokio::test]
async fn zero_ids_are_left_out_of_the_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(STATS_JANUARY)))
        .and(query_param_is_missing("action_id"))
        .and(query_param_is_missing("channel_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(Vec::new(), 0)))
        .expect(1)
        .mount(&server)
        .await;

    let rows = client(&server, 1000)
        .get_statistics_offers_by_offer_id(date(2024, 1, 1), date(2024, 1, 31), Some(0), Some(0))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn epoch_millis_dates_are_sent_as_local_days() {
    let from = EpochMillis::new(1_709_424_000_000).unwrap();
    let to = EpochMillis::new(1_709_510_400_000).unwrap();
    let endpoint = format!(
        "statistics-offers/action_id/{}/{}",
        lib_cityads::affiliates::cityads::to_provider_date_format(&from),
        lib_cityads::affiliates::cityads::to_provider_date_format(&to)
    );

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(&endpoint)))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(Vec::new(), 0)))
        .expect(1)
        .mount(&server)
        .await;

    let totals = client(&server, 1000)
        .get_webmaster_commissions(from, to, None)
        .await
        .unwrap();
    assert_eq!(totals.commission_open, 0.0);
}
