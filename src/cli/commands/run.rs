//! Run command implementation

use std::path::{Path, PathBuf};

use tracing::info;

use crate::cancel::CancelToken;
use crate::cli::error::CliError;
use crate::config::{CONFIG_FILENAME, RefinerConfig};
use crate::error::RefinerError;
use crate::refiner::Refiner;
use crate::report::RefineReport;
use crate::schema::to_json_pretty;

/// Filename of the result document written next to the store
pub const OUTPUT_FILENAME: &str = "output.json";

/// Run command arguments
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Explicit config file; `refiner.toml` in the working directory otherwise
    pub config: Option<PathBuf>,
    /// Input directory override
    pub input: Option<PathBuf>,
    /// Output directory override
    pub output: Option<PathBuf>,
    /// Pretty-print the result document
    pub pretty: bool,
}

/// Resolve configuration: file, then environment, then command-line flags
pub fn load_config(
    config: Option<&Path>,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<RefinerConfig, CliError> {
    let default_path = Path::new(CONFIG_FILENAME);
    let config_path = match config {
        Some(path) => Some(path),
        None if default_path.is_file() => Some(default_path),
        None => None,
    };

    let mut config = RefinerConfig::load(config_path)?;
    if let Some(input) = input {
        config.paths.input_dir = input.to_path_buf();
    }
    if let Some(output) = output {
        config.paths.output_dir = output.to_path_buf();
    }
    config.validate()?;
    Ok(config)
}

/// Handle the run command
pub fn handle_run(args: &RunArgs, cancel: CancelToken) -> Result<RefineReport, CliError> {
    let config = load_config(
        args.config.as_deref(),
        args.input.as_deref(),
        args.output.as_deref(),
    )?;
    let output_path = config.paths.output_dir.join(OUTPUT_FILENAME);

    let refiner = Refiner::from_config(config, cancel)?;
    let report = match refiner.run() {
        Ok(report) => report,
        Err(RefinerError::Cancelled) => return Err(CliError::Interrupted),
        Err(e) => return Err(e.into()),
    };

    let document = to_json_pretty(&report.output)?;
    std::fs::write(&output_path, &document)
        .map_err(|e| CliError::FileWriteError(output_path.clone(), e.to_string()))?;
    info!("Result document written to {}", output_path.display());

    for diagnostic in &report.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    if args.pretty {
        println!("{}", document);
    } else {
        let compact = serde_json::to_string(&report.output)
            .map_err(|e| CliError::SerializationError(e.to_string()))?;
        println!("{}", compact);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &config_path,
            "[paths]\ninput_dir = \"/from/file\"\noutput_dir = \"/from/file/out\"\n",
        )
        .unwrap();

        let config = load_config(
            Some(&config_path),
            Some(Path::new("/from/flag")),
            None,
        )
        .unwrap();
        assert_eq!(config.paths.input_dir, PathBuf::from("/from/flag"));
        assert_eq!(config.paths.output_dir, PathBuf::from("/from/file/out"));
    }

    #[test]
    fn test_invalid_config_file_is_reported() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&config_path, "[paths\n").unwrap();

        assert!(matches!(
            load_config(Some(&config_path), None, None),
            Err(CliError::RefinerError(RefinerError::Configuration(_)))
        ));
    }
}
