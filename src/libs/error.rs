//! Typed failures of the import, reconciliation and invoicing pipeline.
//!
//! Every failure aborts the enclosing batch operation. Nothing here is retried
//! automatically; [`Error::kind`] tells the caller which class of failure it is
//! looking at so that it can decide between reporting a client error and
//! retrying a persistence problem.

use thiserror::Error;

/// Convenience alias used throughout the library layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad column mapping, unknown timezone or invalid settings. Fatal to the import.
    Configuration,
    /// An input row could not be turned into a time entry. Fatal to the whole file.
    RowParse,
    /// The store failed. Propagated unchanged.
    Persistence,
    /// A referenced record does not exist.
    NotFound,
    /// An update request carried nothing to update, or tried to overwrite a write-once field.
    NoUpdateRequested,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing column '{column}'")]
    MissingColumn { column: String },

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("invalid invoice settings: {0}")]
    InvalidSettings(String),

    #[error("invalid column mapping: {0}")]
    InvalidColumnMapping(String),

    #[error("failed to parse {column} '{value}' in row {row}")]
    RowParse { row: usize, column: String, value: String },

    #[error("row {row} ends before it starts")]
    EmptyInterval { row: usize },

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("no update requested")]
    NoUpdateRequested,

    #[error("{field} has already been set")]
    AlreadySet { field: &'static str },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingColumn { .. }
            | Error::UnknownTimezone(_)
            | Error::InvalidSettings(_)
            | Error::InvalidColumnMapping(_) => ErrorKind::Configuration,
            Error::RowParse { .. } | Error::EmptyInterval { .. } | Error::Csv(_) => ErrorKind::RowParse,
            Error::Persistence(_) => ErrorKind::Persistence,
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::NoUpdateRequested | Error::AlreadySet { .. } => ErrorKind::NoUpdateRequested,
        }
    }

    /// Whether the caller can fix the failure by changing its input.
    pub fn is_client_error(&self) -> bool {
        self.kind() != ErrorKind::Persistence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        let missing = Error::MissingColumn { column: "comment".to_string() };
        assert_eq!(missing.kind(), ErrorKind::Configuration);
        assert_eq!(missing.to_string(), "missing column 'comment'");

        let row = Error::RowParse {
            row: 3,
            column: "time started".to_string(),
            value: "yesterday EST".to_string(),
        };
        assert_eq!(row.kind(), ErrorKind::RowParse);
        assert!(row.is_client_error());

        let db = Error::Persistence(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(db.kind(), ErrorKind::Persistence);
        assert!(!db.is_client_error());

        assert_eq!(Error::AlreadySet { field: "sent_to_client" }.kind(), ErrorKind::NoUpdateRequested);
    }
}
