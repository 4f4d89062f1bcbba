use chrono::NaiveDate;
use serde::Deserialize;

/// One recorded sale, with its value already converted to USD.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub client: String,
    pub salesperson: String,
    pub currency: String,
    pub amount_usd: f64,
}

/// Raw transaction row as read from the processed sales CSV, after header
/// normalization. The date is validated separately so the loader can report
/// the offending line.
#[derive(Debug, Deserialize)]
pub(crate) struct RawTransaction {
    #[serde(rename = "Data")]
    pub date: String,
    #[serde(rename = "Cliente")]
    pub client: String,
    #[serde(rename = "Vendedor")]
    pub salesperson: String,
    #[serde(rename = "Moeda")]
    pub currency: String,
    #[serde(rename = "Valor_USD")]
    pub amount_usd: f64,
}

// ---------------------------------------------------------------------------
// Pre-aggregated analysis tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SalespersonSummary {
    #[serde(rename = "Vendedor")]
    pub salesperson: String,
    #[serde(rename = "Valor_Total_USD")]
    pub total_usd: f64,
    #[serde(rename = "Ticket_Medio_USD")]
    pub mean_usd: f64,
}

/// First-half vs second-half totals for one of the top clients.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSemester {
    #[serde(rename = "Cliente")]
    pub client: String,
    #[serde(rename = "Valor_S1_USD")]
    pub first_half_usd: f64,
    #[serde(rename = "Valor_S2_USD")]
    pub second_half_usd: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientBehavior {
    #[serde(rename = "Cliente")]
    pub client: String,
    #[serde(rename = "Valor_Total_USD")]
    pub total_usd: f64,
    #[serde(rename = "Num_Projetos")]
    pub projects: u64,
    #[serde(rename = "Ticket_Medio_USD")]
    pub mean_usd: f64,
    #[serde(rename = "Primeira_Compra")]
    pub first_purchase: String,
    #[serde(rename = "Ultima_Compra")]
    pub last_purchase: String,
    #[serde(rename = "Recorrencia_Media_Dias")]
    pub mean_recurrence_days: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrencySummary {
    #[serde(rename = "Moeda")]
    pub currency: String,
    #[serde(rename = "Valor_Total_USD")]
    pub total_usd: f64,
    #[serde(rename = "Percentual")]
    pub share_pct: f64,
    #[serde(rename = "Num_Projetos")]
    pub projects: u64,
}

// ---------------------------------------------------------------------------
// Derived records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub total_value: f64,
    pub count: usize,
    pub mean_value: f64,
    pub unique_clients: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodAggregate {
    pub period: String,
    pub total_value: f64,
    pub count: usize,
    pub mean_value: f64,
    pub cumulative_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupAggregate {
    pub key: String,
    pub total_value: f64,
    pub count: usize,
    pub mean_value: f64,
    /// Percentage of the grouped table's total value.
    pub share_pct: f64,
}
