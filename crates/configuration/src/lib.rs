use crate::error::ConfigError;
use rust_decimal::Decimal;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, PaperParams};

/// Loads the session configuration from a TOML file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, deserializes it into our strongly-typed `Config`
/// struct, validates it, and returns it.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.cash_currency.is_empty() {
        return Err(ConfigError::ValidationError(
            "cash_currency must not be empty".to_string(),
        ));
    }
    if config.paper.fee_pct < Decimal::ZERO {
        return Err(ConfigError::ValidationError(format!(
            "paper.fee_pct must not be negative, got {}",
            config.paper.fee_pct
        )));
    }
    if let Some((currency, amount)) = config
        .deposits
        .iter()
        .find(|(_, amount)| **amount < Decimal::ZERO)
    {
        return Err(ConfigError::ValidationError(format!(
            "deposit for {currency} must not be negative, got {amount}"
        )));
    }
    Ok(())
}
