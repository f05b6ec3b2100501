//! Sample configuration command

use std::path::PathBuf;

use crate::cli::error::CliError;
use crate::config::sample_config;

/// Print the sample configuration or write it to `output`
pub fn handle_sample_config(output: Option<PathBuf>, force: bool) -> Result<(), CliError> {
    let Some(path) = output else {
        print!("{}", sample_config());
        return Ok(());
    };

    if path.exists() && !force {
        return Err(CliError::InvalidArgument(format!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        )));
    }
    std::fs::write(&path, sample_config())
        .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
    eprintln!("Sample configuration written to {}", path.display());
    Ok(())
}
