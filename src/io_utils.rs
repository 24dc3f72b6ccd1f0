use std::fmt;
use std::io;
use std::path::Path;

use crate::BruteForceError;

#[derive(Debug)]
pub struct CliError {
    pub msg: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.msg.fmt(f)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Format a user friendly I/O error message with suggestions.
pub fn format_io_error(operation: &str, path: &Path, err: &io::Error) -> String {
    use io::ErrorKind::*;
    let suggestion = match err.kind() {
        NotFound => "Check that the file exists and the path is correct.",
        PermissionDenied => "Check permissions or run as a different user.",
        UnexpectedEof => "File appears truncated.",
        _ => "Check the path and permissions.",
    };
    format!(
        "Error {} '{}': {}. {}",
        operation,
        path.display(),
        err,
        suggestion
    )
}

/// Convert an I/O error into a CLI error with context.
pub fn io_cli_error(operation: &str, path: &Path, err: io::Error) -> CliError {
    CliError {
        msg: format_io_error(operation, path, &err),
        source: Some(Box::new(err)),
    }
}

/// Simple CLI error from string.
pub fn simple_cli_error(msg: &str) -> CliError {
    CliError {
        msg: msg.to_string(),
        source: None,
    }
}

/// Convert a search error into a CLI error with a hint.
pub fn search_cli_error(context: &str, err: BruteForceError) -> CliError {
    CliError {
        msg: format!("{}: {}", context, cli_hint(&err)),
        source: Some(Box::new(err)),
    }
}

/// Return an actionable hint for a search error variant.
pub fn cli_hint(err: &BruteForceError) -> String {
    use BruteForceError::*;
    match err {
        Config(msg) => format!("{msg}. Check --min, --max, --unit and --workers."),
        DistanceTooLarge { .. } => format!("{err}. Lower --max."),
        RankOutOfRange { .. } => format!("{err}. This is a bug."),
        Overflow { .. } => format!("{err}. Lower --max or shorten the input."),
        Predicate(e) => format!("predicate failed: {e}"),
        Io(io) => format!("{io}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_mention_flags() {
        let err = BruteForceError::Config("min distance 3 is greater than max distance 1".into());
        let cli = search_cli_error("invalid search", err);
        assert!(cli.msg.starts_with("invalid search: min distance 3"));
        assert!(cli.msg.contains("--max"));
    }

    #[test]
    fn io_errors_name_the_path() {
        let err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let cli = io_cli_error("reading input", Path::new("pcr.bin"), err);
        assert!(cli.msg.contains("'pcr.bin'"));
        assert!(cli.msg.contains("Check that the file exists"));
    }
}
