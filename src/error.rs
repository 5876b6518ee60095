use std::{io, path::PathBuf};

use thiserror::Error;

/// Why a single line failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Malformed {
    #[error("missing `;` separator")]
    MissingSeparator,
    #[error("empty station name")]
    EmptyName,
    #[error("empty measurement")]
    EmptyMeasurement,
    #[error("no digits before the decimal point")]
    MissingIntegerDigits,
    #[error("unexpected byte {0:#04x} in measurement")]
    UnexpectedByte(u8),
    #[error("missing decimal point")]
    MissingDecimalPoint,
    #[error("expected exactly one fractional digit")]
    FractionDigits,
    #[error("measurement out of range")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    MalformedRecord,
    NumericOverflow,
    Config,
    Profile,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed record at byte offset {offset} ({record:?}): {reason}")]
    MalformedRecord {
        offset: usize,
        record: String,
        #[source]
        reason: Malformed,
    },
    #[error("sum overflowed for station {station:?}")]
    NumericOverflow { station: String },
    #[error("{0}")]
    Config(String),
    #[error("profile {}: {message}", path.display())]
    Profile { path: PathBuf, message: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::MalformedRecord { .. } => ErrorKind::MalformedRecord,
            Error::NumericOverflow { .. } => ErrorKind::NumericOverflow,
            Error::Config(_) => ErrorKind::Config,
            Error::Profile { .. } => ErrorKind::Profile,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(offset: usize, line: &[u8], reason: Malformed) -> Self {
        Error::MalformedRecord {
            offset,
            record: String::from_utf8_lossy(line).into_owned(),
            reason,
        }
    }

    pub(crate) fn overflow(station: &[u8]) -> Self {
        Error::NumericOverflow {
            station: String::from_utf8_lossy(station).into_owned(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        let err = Error::malformed(12, b"Hamburg;1.23", Malformed::FractionDigits);
        assert_eq!(err.kind(), ErrorKind::MalformedRecord);
        assert_eq!(
            err.to_string(),
            "malformed record at byte offset 12 (\"Hamburg;1.23\"): expected exactly one fractional digit"
        );
        assert_eq!(Error::overflow(b"Oslo").kind(), ErrorKind::NumericOverflow);
        assert_eq!(
            Error::io("missing.txt", io::ErrorKind::NotFound.into()).kind(),
            ErrorKind::Io
        );
    }
}
