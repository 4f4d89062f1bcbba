pub mod dashboard;
pub mod init;
pub mod report;
pub mod status;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::error::{Result, SalesError};
use crate::loader::{load_dataset, Dataset, DatasetCache};
use crate::models::Transaction;
use crate::pipeline::{date_bounds, DateRange, FilterSet, Selection};
use crate::settings::{load_settings, resolve_data_dir, Settings};

#[derive(Parser)]
#[command(
    name = "salesboard",
    about = "Sales analytics over pre-aggregated CSV exports.",
    version
)]
pub struct Cli {
    /// Directory containing the sales CSV files (default: from settings)
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remember a data directory for later runs.
    Init {
        /// Path to the directory holding the CSV exports
        path: String,
    },
    /// Show the data directory, which inputs exist and the date coverage.
    Status,
    /// Headline metrics: total value, sales count, mean ticket, unique clients.
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Sales per period with a running cumulative total.
    Monthly {
        #[command(flatten)]
        filters: FilterArgs,
        /// Grouping period: month, semester, year
        #[arg(long, default_value = "month")]
        period: String,
    },
    /// Top clients by total value.
    Clients {
        #[command(flatten)]
        filters: FilterArgs,
        /// Number of clients to show (default: 15)
        #[arg(long)]
        top: Option<usize>,
        /// Show only the top 10 clients
        #[arg(long, conflicts_with = "top")]
        top10: bool,
    },
    /// Totals and mean ticket per salesperson.
    Salespeople {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Distribution of value and sales count per currency.
    Currencies {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// First vs second half comparison for the top 10 clients.
    Semesters {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Detailed insights for one client.
    Client {
        /// Client name, exactly as in the data
        name: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Interactive terminal dashboard.
    Dashboard {
        #[command(flatten)]
        filters: FilterArgs,
    },
}

/// Filter flags shared by every reporting command.
#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    /// Start date: YYYY-MM-DD (default: first sale)
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date: YYYY-MM-DD (default: last sale)
    #[arg(long = "to")]
    pub to_date: Option<String>,
    /// Only sales in this currency
    #[arg(long)]
    pub currency: Option<String>,
    /// Only sales by this salesperson
    #[arg(long)]
    pub salesperson: Option<String>,
}

fn parse_date_arg(flag: &str, value: &Option<String>) -> Result<Option<NaiveDate>> {
    value
        .as_deref()
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| {
                SalesError::InvalidFilter(format!("{flag} expects YYYY-MM-DD, got '{v}'"))
            })
        })
        .transpose()
}

impl FilterArgs {
    /// The date ends as typed, before any fallback to the table's bounds.
    pub fn requested_dates(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>)> {
        Ok((
            parse_date_arg("--from", &self.from_date)?,
            parse_date_arg("--to", &self.to_date)?,
        ))
    }

    /// Turn the flags into predicates. Open date ends fall back to the
    /// table's first and last sale.
    pub fn build(&self, table: &[Transaction]) -> Result<FilterSet> {
        let (from, to) = self.requested_dates()?;
        let mut filters = FilterSet::new()
            .with_currency(Selection::from_opt(self.currency.clone()))
            .with_salesperson(Selection::from_opt(self.salesperson.clone()));
        if let Some(range) = DateRange::resolve(from, to, date_bounds(table))? {
            filters = filters.with_date_range(range);
        }
        Ok(filters)
    }
}

/// Settings, resolved data directory and loaded dataset for one command.
pub(crate) struct Session {
    pub settings: Settings,
    pub data_dir: PathBuf,
    pub data: Dataset,
}

impl Session {
    pub fn open(data_dir: Option<&str>, cache: &mut DatasetCache) -> Result<Self> {
        let settings = load_settings();
        let data_dir = resolve_data_dir(data_dir, &settings);
        let data = load_dataset(&data_dir, &settings.transactions_file, cache)?;
        Ok(Self {
            settings,
            data_dir,
            data,
        })
    }
}
