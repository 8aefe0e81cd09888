//! Error types for the load pipeline

use thiserror::Error;

/// Fatal pipeline error.
///
/// Every failure that aborts a run is reported through this type so the
/// runner can tell pipeline failures apart from anything else.
#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Extraction failed: {message}")]
    SourceRead { message: String },

    #[error("Transformation failed: {message}")]
    Transformation { message: String },

    #[error("Loading failed: {message}")]
    SinkWrite { message: String },
}

impl EtlError {
    pub fn source_read(message: impl Into<String>) -> Self {
        EtlError::SourceRead {
            message: message.into(),
        }
    }

    pub fn transformation(message: impl Into<String>) -> Self {
        EtlError::Transformation {
            message: message.into(),
        }
    }

    pub fn sink_write(message: impl Into<String>) -> Self {
        EtlError::SinkWrite {
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for EtlError {
    fn from(err: rusqlite::Error) -> Self {
        EtlError::SinkWrite {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_stage() {
        assert_eq!(
            EtlError::source_read("no such file").to_string(),
            "Extraction failed: no such file"
        );
        assert_eq!(
            EtlError::transformation("ragged row").to_string(),
            "Transformation failed: ragged row"
        );
        assert_eq!(
            EtlError::sink_write("locked").to_string(),
            "Loading failed: locked"
        );
    }
}
