//! This module implements the error type for data source operations.

use alloc::borrow::Cow;
use alloc::string::String;
use core::fmt;

/// The kind of a [`DataSourceError`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The requested capability was never implemented by the active data source.
    #[default]
    MissingDataSource,
    /// A time zone identifier was not found or is ill-formed.
    InvalidIdentifier,
    /// An ISO 3166-1 alpha-2 country code was not found or is ill-formed.
    InvalidCountryCode,
    /// A data source was selected with the wrong selector or arguments.
    Usage,
    /// An explicitly provided zoneinfo directory is not a valid data corpus.
    InvalidDirectory,
    /// No valid zoneinfo directory could be found on the search path.
    DirectoryNotFound,
    /// Data inside a corpus could not be decoded.
    InvalidData,
    /// An I/O operation failed.
    Io,
    /// An internal invariant was violated.
    Assert,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingDataSource => "MissingDataSource",
            Self::InvalidIdentifier => "InvalidIdentifier",
            Self::InvalidCountryCode => "InvalidCountryCode",
            Self::Usage => "UsageError",
            Self::InvalidDirectory => "InvalidDirectory",
            Self::DirectoryNotFound => "DirectoryNotFound",
            Self::InvalidData => "InvalidData",
            Self::Io => "IoError",
            Self::Assert => "ImplementationError",
        })
    }
}

/// The error type for `tzinfo_provider`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSourceError {
    kind: ErrorKind,
    msg: Cow<'static, str>,
}

impl DataSourceError {
    fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            msg: Cow::Borrowed(""),
        }
    }

    /// Create a `MissingDataSource` error.
    ///
    /// Returned whenever a capability of the data source trait is reached
    /// without an implementation behind it.
    #[inline]
    #[must_use]
    pub fn missing_data_source() -> Self {
        Self::new(ErrorKind::MissingDataSource)
            .with_message("No data source has implemented this operation.")
    }

    /// Create an `InvalidIdentifier` error.
    #[inline]
    #[must_use]
    pub fn invalid_identifier() -> Self {
        Self::new(ErrorKind::InvalidIdentifier)
    }

    /// Create an `InvalidCountryCode` error.
    #[inline]
    #[must_use]
    pub fn invalid_country_code() -> Self {
        Self::new(ErrorKind::InvalidCountryCode)
    }

    /// Create a usage error.
    #[inline]
    #[must_use]
    pub fn usage() -> Self {
        Self::new(ErrorKind::Usage)
    }

    /// Create an `InvalidDirectory` error.
    #[inline]
    #[must_use]
    pub fn invalid_directory() -> Self {
        Self::new(ErrorKind::InvalidDirectory)
    }

    /// Create a `DirectoryNotFound` error.
    #[inline]
    #[must_use]
    pub fn directory_not_found() -> Self {
        Self::new(ErrorKind::DirectoryNotFound)
    }

    /// Create an `InvalidData` error.
    #[inline]
    #[must_use]
    pub fn invalid_data() -> Self {
        Self::new(ErrorKind::InvalidData)
    }

    /// Create an I/O error.
    #[inline]
    #[must_use]
    pub fn io() -> Self {
        Self::new(ErrorKind::Io)
    }

    /// Create an assertion error.
    #[inline]
    #[must_use]
    pub fn assert() -> Self {
        Self::new(ErrorKind::Assert)
    }

    /// Add a message to the error.
    #[inline]
    #[must_use]
    pub fn with_message<S>(mut self, msg: S) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        self.msg = msg.into();
        self
    }

    /// Returns this error's kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Extracts the error message.
    #[inline]
    #[must_use]
    pub fn into_message(self) -> String {
        self.msg.into_owned()
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for DataSourceError {
    fn from(value: std::io::Error) -> Self {
        use alloc::string::ToString;
        Self::io().with_message(value.to_string())
    }
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        let msg = self.msg.trim();
        if !msg.is_empty() {
            write!(f, ": {msg}")?;
        }

        Ok(())
    }
}

impl core::error::Error for DataSourceError {}

#[cfg(test)]
mod tests {
    use super::{DataSourceError, ErrorKind};
    use alloc::string::ToString;

    #[test]
    fn missing_data_source_is_distinct_from_not_found() {
        let missing = DataSourceError::missing_data_source();
        let not_found = DataSourceError::invalid_identifier().with_message("Europe/Nowhere");
        assert_eq!(missing.kind(), ErrorKind::MissingDataSource);
        assert_eq!(not_found.kind(), ErrorKind::InvalidIdentifier);
        assert_ne!(missing, not_found);
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = DataSourceError::usage().with_message("unknown data source kind: ruby");
        assert_eq!(err.to_string(), "UsageError: unknown data source kind: ruby");
        assert_eq!(DataSourceError::assert().to_string(), "ImplementationError");
    }
}
