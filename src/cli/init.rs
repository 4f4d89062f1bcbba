use std::path::Path;

use crate::error::{Result, SalesError};
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(path: &str) -> Result<()> {
    let resolved = shellexpand_path(path);
    if !Path::new(&resolved).is_dir() {
        return Err(SalesError::Other(format!("Not a directory: {resolved}")));
    }

    let mut settings = load_settings();
    settings.data_dir = resolved.clone();
    save_settings(&settings)?;
    tracing::info!(data_dir = %resolved, "saved data directory");

    println!("Data directory set to {resolved}");
    let sales = Path::new(&resolved).join(&settings.transactions_file);
    if !sales.is_file() {
        println!(
            "Warning: {} not found there yet.",
            settings.transactions_file
        );
    }
    Ok(())
}
