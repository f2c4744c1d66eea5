//! Reading of friction force configurations.

use std::{
    fs,
    io::{self, Read},
    path::Path,
};

#[cfg(feature = "json")]
use crate::{
    error::{FrictionError, FrictionResult},
    force::FrictionForceConfig,
};

/// Reads and returns the content of the specified text file.
pub fn read_text_file(file_path: &Path) -> io::Result<String> {
    let file = fs::File::open(file_path)?;
    let mut text = String::new();
    let _ = io::BufReader::new(file).read_to_string(&mut text)?;
    Ok(text)
}

/// Parses a friction force configuration from JSON text and validates it.
///
/// Fields missing from the text take their default values.
#[cfg(feature = "json")]
pub fn parse_config_from_json(text: &str) -> FrictionResult<FrictionForceConfig> {
    let config: FrictionForceConfig = serde_json::from_str(text)
        .map_err(|err| FrictionError::InvalidConfig(format!("Could not parse JSON: {}", err)))?;
    config.validate()?;
    Ok(config)
}

/// Reads a friction force configuration from the JSON file at the given path.
#[cfg(feature = "json")]
pub fn read_config_from_json(file_path: &Path) -> FrictionResult<FrictionForceConfig> {
    log::debug!("Reading friction force configuration from {}", file_path.display());
    let text = read_text_file(file_path).map_err(|err| {
        FrictionError::InvalidConfig(format!(
            "Could not read {}: {}",
            file_path.display(),
            err
        ))
    })?;
    parse_config_from_json(&text)
}

/// Serializes the given friction force configuration into pretty-printed JSON.
#[cfg(feature = "json")]
pub fn config_to_json(config: &FrictionForceConfig) -> FrictionResult<String> {
    serde_json::to_string_pretty(config)
        .map_err(|err| FrictionError::InvalidConfig(format!("Could not serialize to JSON: {}", err)))
}
