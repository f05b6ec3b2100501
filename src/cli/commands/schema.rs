//! Schema command implementation

use std::path::PathBuf;

use crate::cli::commands::run::load_config;
use crate::cli::error::CliError;
use crate::schema::{schema_descriptor, to_json_pretty};

/// Print the schema document, optionally writing it to a file
pub fn handle_schema(config: Option<PathBuf>, output: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config.as_deref(), None, None)?;
    let json = to_json_pretty(&schema_descriptor(&config.schema))?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json)
                .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
            eprintln!("Schema written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
