//! The `DataSource` trait.

use alloc::borrow::Cow;
use alloc::collections::BTreeSet;
use core::fmt::Debug;

use crate::{CountryInfo, DataSourceError, DataSourceResult, TimezoneInfo};

/// The `DataSource` trait provides the methods a backend implements in order
/// to supply time zone and country data from its corpus.
///
/// Every method has a default body that fails with
/// [`ErrorKind::MissingDataSource`][crate::ErrorKind::MissingDataSource], so an
/// incomplete implementation reports the missing capability rather than an
/// empty result. A backend is shared between threads once constructed and all
/// methods are read-only.
pub trait DataSource: Debug + Send + Sync {
    /// Loads the definition of the time zone `identifier`.
    ///
    /// Fails with `InvalidIdentifier` if the identifier does not exist or is ill-formed.
    fn load_timezone_info(&self, identifier: &str) -> DataSourceResult<TimezoneInfo> {
        let _ = identifier;
        Err(DataSourceError::missing_data_source())
    }

    /// Returns every time zone identifier, data and linked combined.
    fn timezone_identifiers(&self) -> DataSourceResult<BTreeSet<&str>> {
        let mut identifiers = self.data_timezone_identifiers()?;
        identifiers.extend(self.linked_timezone_identifiers()?);
        Ok(identifiers)
    }

    /// Returns the identifiers that carry their own transition data.
    fn data_timezone_identifiers(&self) -> DataSourceResult<BTreeSet<&str>> {
        Err(DataSourceError::missing_data_source())
    }

    /// Returns the identifiers that are aliases of another identifier.
    fn linked_timezone_identifiers(&self) -> DataSourceResult<BTreeSet<&str>> {
        Err(DataSourceError::missing_data_source())
    }

    /// Loads the definition of the country with the ISO 3166-1 alpha-2 `code`.
    ///
    /// Fails with `InvalidCountryCode` if the code does not exist or is ill-formed.
    fn load_country_info(&self, code: &str) -> DataSourceResult<CountryInfo> {
        let _ = code;
        Err(DataSourceError::missing_data_source())
    }

    /// Returns every ISO 3166-1 alpha-2 code known to this data source.
    fn country_codes(&self) -> DataSourceResult<BTreeSet<&str>> {
        Err(DataSourceError::missing_data_source())
    }

    /// Returns a human readable name for this data source.
    fn display_name(&self) -> DataSourceResult<Cow<'_, str>> {
        Err(DataSourceError::missing_data_source())
    }
}

/// A data source that implements nothing.
///
/// Every operation fails with `MissingDataSource`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NeverDataSource;

impl DataSource for NeverDataSource {}

#[cfg(test)]
mod tests {
    use super::{DataSource, NeverDataSource};
    use crate::{ErrorKind, TimezoneInfo};
    use alloc::borrow::Cow;
    use alloc::collections::BTreeSet;

    #[test]
    fn never_data_source_reports_missing() {
        let source = NeverDataSource;
        let kind = |result: Result<(), crate::DataSourceError>| result.unwrap_err().kind();

        assert_eq!(
            kind(source.load_timezone_info("UTC").map(|_| ())),
            ErrorKind::MissingDataSource
        );
        assert_eq!(
            kind(source.timezone_identifiers().map(|_| ())),
            ErrorKind::MissingDataSource
        );
        assert_eq!(
            kind(source.data_timezone_identifiers().map(|_| ())),
            ErrorKind::MissingDataSource
        );
        assert_eq!(
            kind(source.linked_timezone_identifiers().map(|_| ())),
            ErrorKind::MissingDataSource
        );
        assert_eq!(
            kind(source.load_country_info("GB").map(|_| ())),
            ErrorKind::MissingDataSource
        );
        assert_eq!(
            kind(source.country_codes().map(|_| ())),
            ErrorKind::MissingDataSource
        );
        assert_eq!(
            kind(source.display_name().map(|_| ())),
            ErrorKind::MissingDataSource
        );
    }

    /// Implements only the identifier listings.
    #[derive(Debug)]
    struct PartialSource;

    impl DataSource for PartialSource {
        fn data_timezone_identifiers(&self) -> crate::DataSourceResult<BTreeSet<&str>> {
            Ok(["Europe/London", "UTC"].into_iter().collect())
        }

        fn linked_timezone_identifiers(&self) -> crate::DataSourceResult<BTreeSet<&str>> {
            Ok(["Europe/Belfast"].into_iter().collect())
        }

        fn display_name(&self) -> crate::DataSourceResult<Cow<'_, str>> {
            Ok(Cow::Borrowed("Partial"))
        }
    }

    #[test]
    fn partial_implementation() {
        let source = PartialSource;
        let all: alloc::vec::Vec<&str> =
            source.timezone_identifiers().unwrap().into_iter().collect();
        assert_eq!(all, ["Europe/Belfast", "Europe/London", "UTC"]);

        let err = source.load_timezone_info("UTC").map(|_: TimezoneInfo| ());
        assert_eq!(err.unwrap_err().kind(), ErrorKind::MissingDataSource);
        let err = source.country_codes().map(|_| ());
        assert_eq!(err.unwrap_err().kind(), ErrorKind::MissingDataSource);
    }
}
