use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use serde::de::DeserializeOwned;

use crate::cache::FileCache;
use crate::error::{Result, SalesError};
use crate::models::{
    ClientBehavior, ClientSemester, CurrencySummary, RawTransaction, SalespersonSummary,
    Transaction,
};

pub const TRANSACTIONS_FILE: &str = "Vendas2024_Processado.csv";
pub const SALESPEOPLE_FILE: &str = "analise_vendedores.csv";
pub const SEMESTERS_FILE: &str = "analise_top10_clientes.csv";
pub const BEHAVIOR_FILE: &str = "analise_comportamento_clientes.csv";
pub const CURRENCIES_FILE: &str = "analise_resumo_moedas.csv";

const TRANSACTION_COLUMNS: &[&str] = &["Data", "Cliente", "Vendedor", "Moeda", "Valor_USD"];

/// Historical and English column names, mapped to the canonical header.
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("Data de Ganho", "Data"),
    ("Valor USD Convertido", "Valor_USD"),
    ("date", "Data"),
    ("client", "Cliente"),
    ("salesperson", "Vendedor"),
    ("currency", "Moeda"),
    ("amount_usd", "Valor_USD"),
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse the date formats the upstream exports use: ISO dates, ISO
/// date-times (space or `T` separated) and US `MM/DD/YYYY`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(raw, "%m/%d/%Y").ok()
}

/// Trim every header and rename aliases, unless the canonical column is
/// already present.
pub fn normalize_headers(headers: &StringRecord) -> StringRecord {
    let trimmed: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    let renamed: Vec<String> = trimmed
        .iter()
        .map(|h| {
            HEADER_ALIASES
                .iter()
                .find(|(alias, _)| alias == h)
                .filter(|(_, canonical)| !trimmed.iter().any(|t| t == canonical))
                .map(|(_, canonical)| canonical.to_string())
                .unwrap_or_else(|| h.clone())
        })
        .collect();
    StringRecord::from(renamed)
}

fn reader(path: &Path) -> Result<csv::Reader<std::io::BufReader<std::fs::File>>> {
    let file = std::fs::File::open(path)?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(std::io::BufReader::new(file)))
}

// ---------------------------------------------------------------------------
// Table loaders
// ---------------------------------------------------------------------------

/// Load the processed sales table. A row whose date cannot be parsed fails
/// the whole load.
pub fn load_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let mut rdr = reader(path)?;
    let headers = normalize_headers(rdr.headers()?);
    for column in TRANSACTION_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(SalesError::MissingColumn {
                file: path.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let raw: RawTransaction = record.deserialize(Some(&headers))?;
        let date = parse_date(&raw.date).ok_or_else(|| SalesError::InvalidDate {
            file: path.to_path_buf(),
            line: record.position().map_or(0, |p| p.line()),
            value: raw.date.clone(),
        })?;
        rows.push(Transaction {
            date,
            client: raw.client,
            salesperson: raw.salesperson,
            currency: raw.currency,
            amount_usd: raw.amount_usd,
        });
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded transactions");
    Ok(rows)
}

/// Load one of the pre-aggregated analysis tables.
pub fn load_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = reader(path)?;
    let rows = rdr.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded analysis table");
    Ok(rows)
}

fn load_behavior(path: &Path) -> Result<Vec<ClientBehavior>> {
    let mut rows: Vec<ClientBehavior> = load_table(path)?;
    rows.retain(|r| !r.client.is_empty());
    Ok(rows)
}

/// Load an optional table through the cache. An absent file means the
/// feature is unavailable, not an error.
fn load_optional<T, F>(cache: &mut FileCache<Vec<T>>, path: &Path, load: F) -> Result<Option<Arc<Vec<T>>>>
where
    F: FnOnce(&Path) -> Result<Vec<T>>,
{
    if !path.is_file() {
        cache.invalidate(path);
        tracing::debug!(path = %path.display(), "optional input missing");
        return Ok(None);
    }
    cache.get_or_load(path, load).map(Some)
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Everything the reports read. The transaction table is required; the
/// analysis tables are `None` when their file is absent.
#[derive(Clone)]
pub struct Dataset {
    pub transactions: Arc<Vec<Transaction>>,
    pub salespeople: Option<Arc<Vec<SalespersonSummary>>>,
    pub semesters: Option<Arc<Vec<ClientSemester>>>,
    pub behavior: Option<Arc<Vec<ClientBehavior>>>,
    pub currencies: Option<Arc<Vec<CurrencySummary>>>,
}

/// One cache per input table, owned by whoever reloads the dataset.
#[derive(Default)]
pub struct DatasetCache {
    transactions: FileCache<Vec<Transaction>>,
    salespeople: FileCache<Vec<SalespersonSummary>>,
    semesters: FileCache<Vec<ClientSemester>>,
    behavior: FileCache<Vec<ClientBehavior>>,
    currencies: FileCache<Vec<CurrencySummary>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
        self.salespeople.clear();
        self.semesters.clear();
        self.behavior.clear();
        self.currencies.clear();
    }
}

/// The input files in `data_dir`, with whether each one is required.
pub fn input_files(data_dir: &Path, transactions_file: &str) -> Vec<(PathBuf, bool)> {
    vec![
        (data_dir.join(transactions_file), true),
        (data_dir.join(SALESPEOPLE_FILE), false),
        (data_dir.join(SEMESTERS_FILE), false),
        (data_dir.join(BEHAVIOR_FILE), false),
        (data_dir.join(CURRENCIES_FILE), false),
    ]
}

pub fn load_dataset(
    data_dir: &Path,
    transactions_file: &str,
    cache: &mut DatasetCache,
) -> Result<Dataset> {
    let tx_path = data_dir.join(transactions_file);
    if !tx_path.is_file() {
        return Err(SalesError::Other(format!(
            "Sales file not found: {}",
            tx_path.display()
        )));
    }
    let transactions = cache.transactions.get_or_load(&tx_path, load_transactions)?;
    let salespeople = load_optional(
        &mut cache.salespeople,
        &data_dir.join(SALESPEOPLE_FILE),
        load_table,
    )?;
    let semesters = load_optional(&mut cache.semesters, &data_dir.join(SEMESTERS_FILE), load_table)?;
    let behavior = load_optional(&mut cache.behavior, &data_dir.join(BEHAVIOR_FILE), load_behavior)?;
    let currencies = load_optional(
        &mut cache.currencies,
        &data_dir.join(CURRENCIES_FILE),
        load_table,
    )?;

    tracing::info!(
        data_dir = %data_dir.display(),
        transactions = transactions.len(),
        "dataset ready"
    );
    Ok(Dataset {
        transactions,
        salespeople,
        semesters,
        behavior,
        currencies,
    })
}
