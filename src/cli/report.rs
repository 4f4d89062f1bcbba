use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{FilterArgs, Session};
use crate::error::{Result, SalesError};
use crate::fmt::{day_month_year, money, number, period_label};
use crate::loader::DatasetCache;
use crate::models::{
    ClientBehavior, ClientSemester, CurrencySummary, GroupAggregate, PeriodAggregate,
    SalespersonSummary, Summary, Transaction,
};
use crate::pipeline::{
    self, consistency_notes, FilterSet, GroupKey, Period, PreAggregated,
};
use crate::settings::Settings;

const NO_SALES: &str = "No sales found.";

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

pub fn describe_filters(filters: &FilterSet) -> String {
    if filters.is_empty() {
        return "Filters: none (all sales)".to_string();
    }
    let period = match filters.date_range {
        Some(r) => format!("{} to {}", r.start, r.end),
        None => "all dates".to_string(),
    };
    format!(
        "Period: {period} | Currency: {} | Salesperson: {}",
        filters.currency.label(),
        filters.salesperson.label()
    )
}

fn with_notes(mut out: String, notes: &[&str]) -> String {
    for note in notes {
        out.push_str(&format!("\n{}", note.dimmed()));
    }
    out
}

pub fn format_summary(s: &Summary) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![Cell::new("Total Value (USD)"), Cell::new(money(s.total_value))]);
    table.add_row(vec![Cell::new("Sales"), Cell::new(number(s.count))]);
    table.add_row(vec![Cell::new("Mean Ticket (USD)"), Cell::new(money(s.mean_value))]);
    table.add_row(vec![Cell::new("Unique Clients"), Cell::new(number(s.unique_clients))]);
    format!("Key Metrics\n{table}")
}

pub fn format_periods(rows: &[PeriodAggregate], period: Period) -> String {
    if rows.is_empty() {
        return NO_SALES.to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["Period", "Sales", "Total", "Mean", "Cumulative"]);
    for r in rows {
        table.add_row(vec![
            Cell::new(period_label(&r.period)),
            Cell::new(r.count),
            Cell::new(money(r.total_value)),
            Cell::new(money(r.mean_value)),
            Cell::new(money(r.cumulative_value)),
        ]);
    }
    format!("Sales per {} (USD)\n{table}", period.label())
}

pub fn format_top_clients(rows: &[GroupAggregate], n: usize) -> String {
    if rows.is_empty() {
        return NO_SALES.to_string();
    }
    let mut table = Table::new();
    table.set_header(vec!["#", "Client", "Total", "Sales", "Mean"]);
    for (i, r) in rows.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&r.key),
            Cell::new(money(r.total_value)),
            Cell::new(r.count),
            Cell::new(money(r.mean_value)),
        ]);
    }
    format!("Top {n} Clients by Total Value (USD)\n{table}")
}

/// Recomputed breakdown over the filtered rows for one dimension.
pub fn format_groups(rows: &[GroupAggregate], key: GroupKey) -> String {
    if rows.is_empty() {
        return NO_SALES.to_string();
    }
    let mut table = Table::new();
    table.set_header(vec![key.label(), "Total", "Share", "Sales", "Mean"]);
    for r in rows {
        table.add_row(vec![
            Cell::new(&r.key),
            Cell::new(money(r.total_value)),
            Cell::new(format!("{:.2}%", r.share_pct)),
            Cell::new(r.count),
            Cell::new(money(r.mean_value)),
        ]);
    }
    let total: f64 = rows.iter().map(|r| r.total_value).sum();
    let count: usize = rows.iter().map(|r| r.count).sum();
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(total)),
        Cell::new(""),
        Cell::new(count),
        Cell::new(""),
    ]);
    format!("By {} (filtered)\n{table}", key.label())
}

pub fn format_salesperson_table(rows: &[SalespersonSummary]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Salesperson", "Total (USD)", "Mean Ticket (USD)"]);
    for r in rows {
        table.add_row(vec![
            Cell::new(&r.salesperson),
            Cell::new(money(r.total_usd)),
            Cell::new(money(r.mean_usd)),
        ]);
    }
    format!("Salespeople (pre-aggregated)\n{table}")
}

pub fn format_currency_table(rows: &[CurrencySummary]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Currency", "Total (USD)", "Share (%)", "Projects"]);
    for r in rows {
        table.add_row(vec![
            Cell::new(&r.currency),
            Cell::new(money(r.total_usd)),
            Cell::new(format!("{:.2}%", r.share_pct)),
            Cell::new(r.projects),
        ]);
    }
    format!("Currency Summary (pre-aggregated)\n{table}")
}

pub fn format_semesters(rows: &[ClientSemester]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Client", "Jan-Jun", "Jul-Dec", "Change"]);
    for r in rows {
        let change = r.second_half_usd - r.first_half_usd;
        let change_str = if change >= 0.0 {
            money(change).green().to_string()
        } else {
            money(change).red().to_string()
        };
        table.add_row(vec![
            Cell::new(&r.client),
            Cell::new(money(r.first_half_usd)),
            Cell::new(money(r.second_half_usd)),
            Cell::new(change_str),
        ]);
    }
    format!("Semester Comparison - Top 10 Clients (USD)\n{table}")
}

pub fn format_client(name: &str, behavior: Option<&ClientBehavior>, timeline: &[Transaction]) -> String {
    let mut out = format!("Client: {}", name.bold());

    match behavior {
        Some(b) => {
            let mut table = Table::new();
            table.set_header(vec!["Metric", "Value"]);
            table.add_row(vec![Cell::new("Total Value (USD)"), Cell::new(money(b.total_usd))]);
            table.add_row(vec![Cell::new("Projects"), Cell::new(b.projects)]);
            table.add_row(vec![Cell::new("Mean Ticket (USD)"), Cell::new(money(b.mean_usd))]);
            table.add_row(vec![
                Cell::new("First Purchase"),
                Cell::new(day_month_year(&b.first_purchase)),
            ]);
            table.add_row(vec![
                Cell::new("Last Purchase"),
                Cell::new(day_month_year(&b.last_purchase)),
            ]);
            table.add_row(vec![
                Cell::new("Recurrence (days)"),
                Cell::new(format!("{:.1}", b.mean_recurrence_days)),
            ]);
            out.push_str(&format!("\n\nBehaviour\n{table}"));
        }
        None => out.push_str("\n\nNo behaviour summary available for this client."),
    }

    if timeline.is_empty() {
        out.push_str(&format!("\n\nNo data available for {name} in the selected period."));
        return out;
    }
    let mut table = Table::new();
    table.set_header(vec!["Date", "Salesperson", "Currency", "Value (USD)"]);
    for t in timeline {
        table.add_row(vec![
            Cell::new(t.date.format("%d/%m/%Y")),
            Cell::new(&t.salesperson),
            Cell::new(&t.currency),
            Cell::new(money(t.amount_usd)),
        ]);
    }
    out.push_str(&format!("\n\nPurchases Over Time\n{table}"));
    out
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

fn open(data_dir: Option<&str>, args: &FilterArgs) -> Result<(Session, FilterSet, Vec<Transaction>)> {
    let session = Session::open(data_dir, &mut DatasetCache::new())?;
    let filters = args.build(&session.data.transactions)?;
    let filtered = pipeline::filter(&session.data.transactions, &filters);
    tracing::debug!(rows = filtered.len(), filters = %describe_filters(&filters), "filtered");
    Ok((session, filters, filtered))
}

pub fn summary(data_dir: Option<&str>, args: &FilterArgs) -> Result<()> {
    let (_session, filters, rows) = open(data_dir, args)?;
    println!("{}\n", describe_filters(&filters));
    println!("{}", format_summary(&pipeline::summarize(&rows)));
    Ok(())
}

pub fn monthly(data_dir: Option<&str>, args: &FilterArgs, period: &str) -> Result<()> {
    let period: Period = period.parse()?;
    let (_session, filters, rows) = open(data_dir, args)?;
    println!("{}\n", describe_filters(&filters));
    println!("{}", format_periods(&pipeline::group_by_period(&rows, period), period));
    Ok(())
}

/// Ranking size from `--top`/`--top10`, falling back to settings.
fn top_count(top: Option<usize>, top10: bool, settings: &Settings) -> Result<usize> {
    let n = match (top, top10) {
        (Some(n), _) => n,
        (None, true) => settings.top_clients_compact,
        (None, false) => settings.top_clients,
    };
    if n == 0 {
        return Err(SalesError::InvalidFilter(
            "top client count must be at least 1".to_string(),
        ));
    }
    Ok(n)
}

pub fn clients(data_dir: Option<&str>, args: &FilterArgs, top: Option<usize>, top10: bool) -> Result<()> {
    let (session, filters, rows) = open(data_dir, args)?;
    let n = top_count(top, top10, &session.settings)?;
    println!("{}\n", describe_filters(&filters));
    println!("{}", format_top_clients(&pipeline::top_n_by_value(&rows, n, GroupKey::Client), n));
    Ok(())
}

pub fn salespeople(data_dir: Option<&str>, args: &FilterArgs) -> Result<()> {
    let (session, filters, rows) = open(data_dir, args)?;
    println!("{}\n", describe_filters(&filters));
    println!("{}", format_groups(&pipeline::group_by(&rows, GroupKey::Salesperson), GroupKey::Salesperson));
    match &session.data.salespeople {
        Some(table) => {
            let notes = consistency_notes(&filters, PreAggregated::Salespeople);
            println!("\n{}", with_notes(format_salesperson_table(table), &notes));
        }
        None => println!(
            "\nSalesperson summary unavailable: no salesperson table in {}.",
            session.data_dir.display()
        ),
    }
    Ok(())
}

pub fn currencies(data_dir: Option<&str>, args: &FilterArgs) -> Result<()> {
    let (session, filters, rows) = open(data_dir, args)?;
    println!("{}\n", describe_filters(&filters));
    println!("{}", format_groups(&pipeline::group_by(&rows, GroupKey::Currency), GroupKey::Currency));
    match &session.data.currencies {
        Some(table) => println!("\n{}", format_currency_table(table)),
        None => println!(
            "\nCurrency summary unavailable: no currency table in {}.",
            session.data_dir.display()
        ),
    }
    Ok(())
}

pub fn semesters(data_dir: Option<&str>, args: &FilterArgs) -> Result<()> {
    let (session, filters, _rows) = open(data_dir, args)?;
    match &session.data.semesters {
        Some(table) if !table.is_empty() => {
            let notes = consistency_notes(&filters, PreAggregated::Semesters);
            println!("{}", with_notes(format_semesters(table), &notes));
        }
        _ => println!("Semester comparison unavailable: no top-10 client table in {}.", session.data_dir.display()),
    }
    Ok(())
}

pub fn client(data_dir: Option<&str>, args: &FilterArgs, name: &str) -> Result<()> {
    let (session, filters, rows) = open(data_dir, args)?;
    let behavior = session
        .data
        .behavior
        .as_ref()
        .and_then(|b| b.iter().find(|c| c.client == name));
    let timeline = pipeline::client_timeline(&rows, name);
    println!("{}\n", describe_filters(&filters));
    println!("{}", format_client(name, behavior, &timeline));
    Ok(())
}
