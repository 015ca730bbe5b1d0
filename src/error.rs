use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Environment variable {0} is not optional")]
    MissingVariable(&'static str),

    #[error("Environment variable {0} is not valid UTF-8")]
    InvalidVariable(&'static str),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid cucumber JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No cucumber JSON result files found in {}", .0.display())]
    NoResults(PathBuf),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Adapter for `map_err` that tags an I/O failure with the path involved.
    pub fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| AppError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable_error() {
        let error = AppError::MissingVariable("INPUT_DIRECTORY");
        assert_eq!(
            error.to_string(),
            "Environment variable INPUT_DIRECTORY is not optional"
        );
    }

    #[test]
    fn test_invalid_variable_error() {
        let error = AppError::InvalidVariable("OUTPUT_DIRECTORY");
        assert_eq!(
            error.to_string(),
            "Environment variable OUTPUT_DIRECTORY is not valid UTF-8"
        );
    }

    #[test]
    fn test_io_error_names_path() {
        let path = Path::new("/results/missing");
        let error = AppError::io(path)(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(error.to_string(), "I/O error at /results/missing: gone");
    }

    #[test]
    fn test_parse_error_names_path() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let error = AppError::Parse {
            path: PathBuf::from("hosts.feature-report.json"),
            source,
        };
        assert!(
            error
                .to_string()
                .starts_with("Invalid cucumber JSON in hosts.feature-report.json: ")
        );
    }

    #[test]
    fn test_no_results_error() {
        let error = AppError::NoResults(PathBuf::from("/results"));
        assert_eq!(
            error.to_string(),
            "No cucumber JSON result files found in /results"
        );
    }

    #[test]
    fn test_app_result_err() {
        fn returns_err() -> AppResult<i32> {
            Err(AppError::MissingVariable("OUTPUT_DIRECTORY"))
        }
        let result = returns_err();
        assert!(result.is_err());
    }
}
