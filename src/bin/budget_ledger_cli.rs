use budget_ledger::{cli::run_cli, config::ConfigManager, init};

fn main() {
    let filter = ConfigManager::new()
        .and_then(|manager| manager.load())
        .ok()
        .and_then(|config| config.log_filter);
    init(filter.as_deref());

    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
