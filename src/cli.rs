//! Command line interface

use crate::config::{non_empty, ApiAccess, Config, CountOptions, ListOptions};
use crate::error::Result;
use crate::models::parse_timestamp;
use crate::pagerduty::PagerDutyClient;
use crate::reporting::{Granularity, ReportEngine, ReportExporter};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "pdreport", version)]
#[command(about = "A CLI for generating reports based on PagerDuty data", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Credentials and scope shared by every report
#[derive(Args, Debug)]
pub struct AccessArgs {
    /// PagerDuty API key
    #[arg(short = 'k', long, env = "PAGERDUTY_KEY", hide_env_values = true)]
    pub pagerduty_key: String,

    /// Comma separated list of PagerDuty team IDs
    #[arg(short = 't', long, env = "PAGERDUTY_TEAM_IDS")]
    pub team_ids: String,

    /// Comma separated list of PagerDuty service IDs
    #[arg(short = 'r', long, env = "PAGERDUTY_SERVICE_IDS")]
    pub service_ids: String,
}

impl AccessArgs {
    pub fn access(&self) -> ApiAccess {
        ApiAccess::new(&self.pagerduty_key, &self.team_ids, &self.service_ids)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all incidents in a given timeframe
    List {
        #[command(flatten)]
        access: AccessArgs,

        /// Retrieve incidents created after this date, e.g. 2024-01-01T01:00:00
        #[arg(short, long)]
        since: String,

        /// Retrieve incidents created before this date [default: now]
        #[arg(short, long)]
        until: Option<String>,

        /// Only list incidents whose title contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Comma separated list of custom detail fields to add as columns
        #[arg(long)]
        custom_details: Option<String>,

        /// Pattern applied to every custom detail value; the first group is kept
        #[arg(long)]
        custom_details_regex: Option<String>,

        /// File to write output to [default: output.csv]
        #[arg(short, long)]
        output_filename: Option<PathBuf>,
    },

    /// Count occurrences of incidents in a given timeframe
    Count {
        #[command(flatten)]
        access: AccessArgs,

        /// First day to count, e.g. 2024-01-01T00:00:00
        #[arg(short, long)]
        since: String,

        /// Length of time to group incident counts by
        #[arg(short, long, value_enum, default_value_t = Granularity::Week)]
        iteration: Granularity,

        /// How many iterations to retrieve starting at the given date
        #[arg(short = 'c', long, default_value_t = 1)]
        iteration_count: u32,

        /// Only count incidents whose title contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// JSON file of date windows; only days inside them are counted
        #[arg(short = 'd', long)]
        include_dates_filename: Option<PathBuf>,

        /// JSON file of date windows to skip; wins over the include list
        #[arg(short = 'x', long)]
        exclude_dates_filename: Option<PathBuf>,

        /// File to write output to [default: output.csv]
        #[arg(short, long)]
        output_filename: Option<PathBuf>,
    },
}

impl Commands {
    pub fn access(&self) -> ApiAccess {
        match self {
            Commands::List { access, .. } | Commands::Count { access, .. } => access.access(),
        }
    }

    /// Validated options of the `list` subcommand
    pub fn list_options(&self, config: &Config) -> Result<Option<ListOptions>> {
        let Commands::List {
            since,
            until,
            filter,
            custom_details,
            custom_details_regex,
            output_filename,
            ..
        } = self
        else {
            return Ok(None);
        };

        let until = match until {
            Some(raw) => parse_timestamp(raw)?,
            None => Utc::now(),
        };

        let mut options = ListOptions::new(parse_timestamp(since)?, until).with_output(
            output_filename
                .clone()
                .unwrap_or_else(|| config.output.default_filename.clone()),
        );
        if let Some(filter) = non_empty(filter.clone()) {
            options = options.with_filter(filter);
        }
        if let Some(fields) = custom_details {
            options = options.with_custom_fields(fields);
        }
        if let Some(pattern) = non_empty(custom_details_regex.clone()) {
            options = options.with_custom_fields_regex(pattern);
        }

        options.validated().map(Some)
    }

    /// Validated options of the `count` subcommand
    pub fn count_options(&self, config: &Config) -> Result<Option<CountOptions>> {
        let Commands::Count {
            since,
            iteration,
            iteration_count,
            filter,
            include_dates_filename,
            exclude_dates_filename,
            output_filename,
            ..
        } = self
        else {
            return Ok(None);
        };

        let mut options = CountOptions::new(parse_timestamp(since)?, *iteration, *iteration_count)
            .with_output(
                output_filename
                    .clone()
                    .unwrap_or_else(|| config.output.default_filename.clone()),
            );
        if let Some(filter) = non_empty(filter.clone()) {
            options = options.with_filter(filter);
        }
        if let Some(path) = include_dates_filename {
            options = options.with_include_dates(path);
        }
        if let Some(path) = exclude_dates_filename {
            options = options.with_exclude_dates(path);
        }

        options.validated().map(Some)
    }
}

/// Run the selected report and write its output file
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let access = cli.command.access();
    info!(access = ?access, "Using PagerDuty scope");

    // options are validated before the client is built so bad input never
    // reaches the network
    let list_options = cli.command.list_options(&config)?;
    let count_options = cli.command.count_options(&config)?;

    let client = PagerDutyClient::new(&config.pagerduty, access)?;
    let engine = ReportEngine::new(client, config.pagination.clone());

    if let Some(options) = list_options {
        info!(options = ?options, "Using options");
        let report = engine.list(&options).await?;
        ReportExporter::write_csv(&report.csv, &options.output).await?;
    } else if let Some(options) = count_options {
        info!(options = ?options, "Using options");
        let report = engine.count(&options).await?;
        ReportExporter::write_csv(&report.csv, &options.output).await?;
    }

    Ok(())
}
