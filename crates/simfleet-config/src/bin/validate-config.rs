//! Config validation CLI tool
//!
//! Validates a simfleet configuration file and reports any errors.

use simfleet_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) if path == "-h" || path == "--help" => {
            print_usage();
            return ExitCode::from(2);
        }
        Some(path) => PathBuf::from(path),
        None => default_config_path(),
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        print_usage();
        return ExitCode::from(1);
    }

    match simfleet_config::load_config(&config_path) {
        Ok(settings) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version:  {}", simfleet_config::CURRENT_CONFIG_VERSION);
            println!("  API base URL:    {}", settings.api.base_url);
            println!("  Page size:       {}", settings.api.page_size);
            println!("  Session file:    {}", settings.paths.session_file().display());
            println!("  Audit log:       {}", settings.paths.audit_log().display());
            println!(
                "  Usage window:    {} days (max {})",
                settings.usage.default_window_days, settings.usage.max_window_days
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                simfleet_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                simfleet_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                simfleet_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                simfleet_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        simfleet_config::CURRENT_CONFIG_VERSION
                    );
                }
                simfleet_config::ConfigError::NotFound(path) => {
                    eprintln!("Config file not found: {}", path.display());
                }
            }
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    let default_path = default_config_path();
    eprintln!("Usage: simfleet-validate-config [config-file]");
    eprintln!();
    eprintln!("Validates a simfleet configuration file.");
    eprintln!("If no path is provided, uses: {}", default_path.display());
}
