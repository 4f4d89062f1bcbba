mod cache;
mod cli;
mod error;
mod fmt;
mod loader;
mod logging;
mod models;
mod pipeline;
mod settings;
mod tui;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Dashboard { .. }) {
        if let Err(e) = logging::init_file(&settings::log_path()) {
            eprintln!("Warning: file logging disabled: {e}");
        }
    } else {
        logging::init_stderr();
    }

    let data_dir = cli.data_dir.as_deref();
    let result = match &cli.command {
        Commands::Init { path } => cli::init::run(path),
        Commands::Status => cli::status::run(data_dir),
        Commands::Summary { filters } => cli::report::summary(data_dir, filters),
        Commands::Monthly { filters, period } => cli::report::monthly(data_dir, filters, period),
        Commands::Clients {
            filters,
            top,
            top10,
        } => cli::report::clients(data_dir, filters, *top, *top10),
        Commands::Salespeople { filters } => cli::report::salespeople(data_dir, filters),
        Commands::Currencies { filters } => cli::report::currencies(data_dir, filters),
        Commands::Semesters { filters } => cli::report::semesters(data_dir, filters),
        Commands::Client { name, filters } => cli::report::client(data_dir, filters, name),
        Commands::Dashboard { filters } => cli::dashboard::run(data_dir, filters),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
