use expense_core::{cli::run_cli, init_with, ConfigManager};

fn main() {
    let config = ConfigManager::new()
        .and_then(|manager| manager.load())
        .unwrap_or_default();
    init_with(&config);

    if let Err(err) = run_cli() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
