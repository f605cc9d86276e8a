use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};

use padron::{Argon2Hasher, Config, Console, IdentityRegistry, RegistrySnapshot};

fn main() -> ExitCode {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = padron::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        padron::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> padron::Result<()> {
    info!("Padron identity registry");

    let hasher = Argon2Hasher::from_config(&config.hashing).map_err(padron::AccessError::from)?;
    let registry = IdentityRegistry::new(Arc::new(hasher), config.bootstrap.clone())?;

    let snapshot_path = config.storage.snapshot_path();
    if let Some(path) = snapshot_path {
        if path.exists() {
            registry.restore(RegistrySnapshot::load(path)?)?;
        } else {
            warn!(path = %path.display(), "Snapshot not found, starting empty");
        }
    }

    let stdin = io::stdin();
    let mut console = Console::new(&registry, stdin.lock(), io::stdout());
    console.run()?;

    if let Some(path) = snapshot_path {
        registry.snapshot().save(path)?;
        info!(path = %path.display(), identities = registry.len(), "Snapshot saved");
    }
    Ok(())
}
