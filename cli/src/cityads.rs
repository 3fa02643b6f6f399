//! # `cityads`: Command Line Client for the CityAds Webmaster API
//!
//! Runs one CityAds operation and prints the normalized result as pretty JSON
//! on stdout.
//!
//! ## Usage
//!
//! ```text
//! cityads [OPTIONS] <COMMAND>
//!
//! COMMANDS:
//!   profile      Webmaster profile
//!   balance      Account balance
//!   channels     Active traffic channels
//!   offer        Raw offer record
//!   cr           Conversion rate of an offer
//!   leads        Leads uploaded in a date range
//!   stats        Per-offer statistics in a date range
//!   commissions  Commission totals in a date range
//!   links        Default promotional links of an offer
//!   offers       Offers available to the webmaster
//!   charges      Charge history
//! ```
//!
//! Settings come from `cityads.json`, `CITYADS_*` environment variables and
//! `.env` (see `lib_cityads::configs`); command-line options override them.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;

use lib_cityads::configs::CityadsConfig;
use lib_cityads::loggers::{setup_logging, LogSettings};
use lib_cityads::affiliates::cityads::{CityadsApi, LeadQuery};

#[derive(Parser, Debug)]
#[clap(about = "Query the CityAds webmaster API", version)]
struct Cli {
    #[clap(long, help = "Webmaster token (overrides configuration).")]
    token: Option<String>,

    #[clap(long, help = "API base URL.")]
    base_url: Option<String>,

    #[clap(long, help = "Items per page for paginated endpoints.")]
    page_size: Option<u32>,

    #[clap(long, help = "Per-request timeout in seconds.")]
    timeout_secs: Option<u64>,

    #[clap(long, help = "Logging level (trace, debug, info, warn, error, fatal).")]
    log_level: Option<String>,

    #[clap(long, help = "Directory for JSON log files.")]
    log_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Webmaster profile.
    Profile,
    /// Account balance.
    Balance,
    /// Active traffic channels.
    Channels,
    /// Raw offer record.
    Offer { offer_id: i64 },
    /// Conversion rate of an offer.
    Cr {
        from: NaiveDate,
        to: NaiveDate,
        offer_id: i64,
        #[clap(long)]
        channel: Option<i64>,
    },
    /// Leads uploaded in a date range.
    Leads {
        from: NaiveDate,
        to: NaiveDate,
        #[clap(long)]
        offer: Option<i64>,
        #[clap(long)]
        channel: Option<i64>,
        #[clap(long)]
        xid: Option<String>,
    },
    /// Per-offer statistics in a date range.
    Stats {
        from: NaiveDate,
        to: NaiveDate,
        #[clap(long)]
        offer: Option<i64>,
        #[clap(long)]
        channel: Option<i64>,
    },
    /// Commission totals in a date range.
    Commissions {
        from: NaiveDate,
        to: NaiveDate,
        #[clap(long)]
        offer: Option<i64>,
    },
    /// Default promotional links of an offer.
    Links {
        offer_id: i64,
        #[clap(long)]
        channel: Option<i64>,
    },
    /// Offers available to the webmaster.
    Offers,
    /// Charge history.
    Charges {
        #[clap(long)]
        from: Option<NaiveDate>,
        #[clap(long)]
        to: Option<NaiveDate>,
    },
}

impl Cli {
    /// Overlays command-line options on the loaded configuration.
    fn merge_into(&self, mut config: CityadsConfig) -> CityadsConfig {
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = Some(timeout_secs);
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone();
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = Some(log_dir.clone());
        }
        config
    }
}

fn build_client(config: &CityadsConfig) -> Result<CityadsApi> {
    let mut builder = CityadsApi::builder(config.token()?)
        .base_url(config.base_url.clone())
        .page_size(config.page_size);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("Failed to build CityAds client")
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(api: &CityadsApi, command: Command) -> Result<()> {
    match command {
        Command::Profile => print_json(&api.get_profile().await?),
        Command::Balance => print_json(&api.get_balance().await?),
        Command::Channels => print_json(&api.get_traffic_channels().await?),
        Command::Offer { offer_id } => print_json(&api.get_offer_data_by_offer_id(offer_id).await?),
        Command::Cr { from, to, offer_id, channel } => {
            print_json(&api.get_cr_by_offer_id(from, to, offer_id, channel).await?)
        }
        Command::Leads { from, to, offer, channel, xid } => {
            let query = LeadQuery { offer_id: offer, channel_id: channel, xid };
            print_json(&api.get_leads_by_offer_id(from, to, &query).await?)
        }
        Command::Stats { from, to, offer, channel } => {
            print_json(&api.get_statistics_offers_by_offer_id(from, to, offer, channel).await?)
        }
        Command::Commissions { from, to, offer } => {
            print_json(&api.get_webmaster_commissions(from, to, offer).await?)
        }
        Command::Links { offer_id, channel } => {
            print_json(&api.get_offer_links_by_offer_id(offer_id, channel).await?)
        }
        Command::Offers => print_json(&api.get_web_offers().await?),
        Command::Charges { from, to } => print_json(&api.get_charge_history(from, to).await?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.merge_into(CityadsConfig::load().context("Failed to load configuration")?);

    let _guard = setup_logging(&LogSettings {
        app_name: "cityads".to_string(),
        level: config.log_level.clone(),
        log_dir: config.log_dir.clone(),
        ansi: true,
    })?;

    let api = build_client(&config)?;
    if let Err(e) = run(&api, cli.command).await {
        error!(error = %e, "CityAds command failed");
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lead_filters() {
        let cli = Cli::try_parse_from([
            "cityads", "leads", "2024-01-01", "2024-01-31", "--offer", "42", "--xid", "abc",
        ])
        .unwrap();
        match cli.command {
            Command::Leads { from, offer, channel, xid, .. } => {
                assert_eq!(from, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
                assert_eq!(offer, Some(42));
                assert_eq!(channel, None);
                assert_eq!(xid.as_deref(), Some("abc"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(Cli::try_parse_from(["cityads", "stats", "01.01.2024", "2024-01-31"]).is_err());
    }

    #[test]
    fn command_line_overrides_configuration() {
        let cli = Cli::try_parse_from(["cityads", "--token", "cli", "--page-size", "50", "balance"]).unwrap();
        let config = cli.merge_into(CityadsConfig {
            token: Some("file".into()),
            ..Default::default()
        });
        assert_eq!(config.token().unwrap(), "cli");
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn builds_client_only_with_token() {
        assert!(build_client(&CityadsConfig::default()).is_err());
        let config = CityadsConfig {
            token: Some("t".into()),
            ..Default::default()
        };
        assert!(build_client(&config).is_ok());
    }
}
