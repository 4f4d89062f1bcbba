use crate::error::Result;
use crate::fmt::number;
use crate::loader::{input_files, load_dataset, DatasetCache};
use crate::pipeline::{date_bounds, distinct_values, GroupKey};
use crate::settings::{load_settings, resolve_data_dir};

pub fn run(data_dir: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let data_dir = resolve_data_dir(data_dir, &settings);

    println!("Data dir:   {}", data_dir.display());
    println!();
    for (path, required) in input_files(&data_dir, &settings.transactions_file) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let state = if path.is_file() {
            "found"
        } else if required {
            "MISSING"
        } else {
            "not found (feature unavailable)"
        };
        println!("  {name:<40} {state}");
    }

    let sales = data_dir.join(&settings.transactions_file);
    if !sales.is_file() {
        println!();
        println!("Sales file not found. Run `salesboard init <dir>` to point at your exports.");
        return Ok(());
    }

    let data = load_dataset(&data_dir, &settings.transactions_file, &mut DatasetCache::new())?;
    let table = &data.transactions;
    println!();
    println!("Sales:         {}", number(table.len()));
    println!("Clients:       {}", number(distinct_values(table, GroupKey::Client).len()));
    println!("Salespeople:   {}", number(distinct_values(table, GroupKey::Salesperson).len()));
    println!("Currencies:    {}", distinct_values(table, GroupKey::Currency).join(", "));
    match date_bounds(table) {
        Some((first, last)) => println!("Coverage:      {first} to {last}"),
        None => println!("Coverage:      (no rows)"),
    }
    Ok(())
}
