use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const SALES: &str = "\
Data de Ganho,Cliente,Vendedor,Moeda,Valor USD Convertido
2024-01-05,Acme,Ana,USD,100.0
2024-02-10,Acme,Bruno,USD,200.0
2024-01-20,Globex,Ana,EUR,50.0
";

fn write_sales(dir: &Path) {
    std::fs::write(dir.join("Vendas2024_Processado.csv"), SALES).unwrap();
}

fn write_analysis(dir: &Path) {
    std::fs::write(
        dir.join("analise_vendedores.csv"),
        "Vendedor,Valor_Total_USD,Ticket_Medio_USD\nAna,150.0,75.0\nBruno,200.0,200.0\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("analise_top10_clientes.csv"),
        "Cliente,Valor_S1_USD,Valor_S2_USD\nAcme,300.0,0.0\nGlobex,50.0,0.0\n",
    )
    .unwrap();
}

/// Run the binary with an isolated HOME so no real settings are read.
fn salesboard(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("salesboard").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn summary_reports_totals() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_sales(data.path());

    salesboard(home.path())
        .args(["summary", "--data-dir"])
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("$350.00"))
        .stdout(predicate::str::contains("$116.67"));
}

#[test]
fn summary_applies_date_range() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_sales(data.path());

    salesboard(home.path())
        .args(["summary", "--from", "2024-01-01", "--to", "2024-01-31", "--data-dir"])
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("$150.00"))
        .stdout(predicate::str::contains("2024-01-01 to 2024-01-31"));
}

#[test]
fn monthly_shows_cumulative() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_sales(data.path());

    salesboard(home.path())
        .args(["monthly", "--data-dir"])
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Jan 2024"))
        .stdout(predicate::str::contains("Feb 2024"))
        .stdout(predicate::str::contains("$350.00"));
}

#[test]
fn monthly_rejects_unknown_period() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_sales(data.path());

    salesboard(home.path())
        .args(["monthly", "--period", "weekly", "--data-dir"])
        .arg(data.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown period"));
}

#[test]
fn clients_top10_and_empty_filter() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_sales(data.path());

    salesboard(home.path())
        .args(["clients", "--top10", "--data-dir"])
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 10 Clients"))
        .stdout(predicate::str::contains("Acme"));

    salesboard(home.path())
        .args(["clients", "--currency", "JPY", "--data-dir"])
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No sales found."));
}

#[test]
fn salespeople_notes_currency_filter() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_sales(data.path());
    write_analysis(data.path());

    salesboard(home.path())
        .args(["salespeople", "--currency", "EUR", "--data-dir"])
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Salespeople (pre-aggregated)"))
        .stdout(predicate::str::contains("regardless of the currency filter"));
}

#[test]
fn semesters_unavailable_without_table() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_sales(data.path());

    salesboard(home.path())
        .args(["semesters", "--data-dir"])
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Semester comparison unavailable"));
}

#[test]
fn client_timeline_for_unknown_client() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_sales(data.path());

    salesboard(home.path())
        .args(["client", "Initech", "--data-dir"])
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No data available for Initech"));
}

#[test]
fn invalid_date_is_rejected_at_load() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    std::fs::write(
        data.path().join("Vendas2024_Processado.csv"),
        "Data,Cliente,Vendedor,Moeda,Valor_USD\nsometime,Acme,Ana,USD,1.0\n",
    )
    .unwrap();

    salesboard(home.path())
        .args(["summary", "--data-dir"])
        .arg(data.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date 'sometime'"));
}

#[test]
fn missing_sales_file_fails() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();

    salesboard(home.path())
        .args(["summary", "--data-dir"])
        .arg(data.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sales file not found"));
}

#[test]
fn init_remembers_data_dir_for_status() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_sales(data.path());

    salesboard(home.path())
        .arg("init")
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Data directory set to"));

    salesboard(home.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sales:         3"))
        .stdout(predicate::str::contains("2024-01-05 to 2024-02-10"))
        .stdout(predicate::str::contains("feature unavailable"));
}

#[test]
fn salespeople_and_currencies_report_missing_tables() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_sales(data.path());

    salesboard(home.path())
        .args(["salespeople", "--data-dir"])
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("By Salesperson (filtered)"))
        .stdout(predicate::str::contains(
            "Salesperson summary unavailable: no salesperson table in",
        ));

    salesboard(home.path())
        .args(["currencies", "--data-dir"])
        .arg(data.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("By Currency (filtered)"))
        .stdout(predicate::str::contains(
            "Currency summary unavailable: no currency table in",
        ));
}

#[test]
fn clients_rejects_zero_top() {
    let home = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_sales(data.path());

    salesboard(home.path())
        .args(["clients", "--top", "0", "--data-dir"])
        .arg(data.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("top client count must be at least 1"));
}
