//! The `tzinfo_rs` crate provides time zone and country data through a
//! pluggable, process-wide data source.
//!
//! ```rust
//! use tzinfo_rs::DataSource;
//!
//! # #[cfg(feature = "compiled_data")]
//! # {
//! // The first access installs the data compiled into the library.
//! let source = tzinfo_rs::current();
//! let info = source.load_timezone_info("Europe/London").unwrap();
//! assert_eq!(info.identifier(), "Europe/London");
//!
//! let country = source.load_country_info("GB").unwrap();
//! assert_eq!(country.name(), "Britain (UK)");
//! # }
//! ```
//!
//! A different data source can be selected before any data is loaded, either
//! one of the built-in [`DataSourceKind`]s or any implementation of
//! [`DataSource`]:
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tzinfo_rs::DataSourceKind;
//!
//! tzinfo_rs::set_kind(DataSourceKind::Zoneinfo, &[Path::new("/usr/share/zoneinfo")]).unwrap();
//! ```
//!
//! Code that wants isolation from the process-wide state can hold its own
//! [`DataSourceRegistry`].
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![allow(
    unused_crate_dependencies,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod registry;

use std::path::Path;
use std::sync::{Arc, LazyLock};

pub use registry::{DataSourceKind, DataSourceRegistry};

pub use tzinfo_provider::{
    CountryCode, CountryInfo, CountryTimezone, DataSource, DataSourceError, DataSourceResult,
    DataTimezoneInfo, ErrorKind, LinkedTimezoneInfo, NeverDataSource, Timestamp, TimezoneInfo,
    TimezoneOffset, TimezoneTransition,
};

#[cfg(feature = "compiled_data")]
pub use tzinfo_provider::compiled::CompiledDataSource;

#[cfg(feature = "zoneinfo")]
pub use tzinfo_provider::zoneinfo::{ZoneinfoDataSource, ZoneinfoSearchPath};

static GLOBAL: LazyLock<DataSourceRegistry> = LazyLock::new(DataSourceRegistry::new);

/// The process-wide [`DataSourceRegistry`].
pub fn global() -> &'static DataSourceRegistry {
    &GLOBAL
}

/// Returns the process-wide data source, installing the default if none is set.
pub fn current() -> Arc<dyn DataSource> {
    GLOBAL.current()
}

/// Makes `source` the process-wide data source.
pub fn set_source(source: Arc<dyn DataSource>) -> Arc<dyn DataSource> {
    GLOBAL.set_source(source)
}

/// Selects a built-in data source for the process.
///
/// See [`DataSourceRegistry::set_kind`].
pub fn set_kind(kind: DataSourceKind, args: &[&Path]) -> DataSourceResult<Arc<dyn DataSource>> {
    GLOBAL.set_kind(kind, args)
}

/// Selects a built-in data source for the process by name.
pub fn set_named(kind: &str, args: &[&Path]) -> DataSourceResult<Arc<dyn DataSource>> {
    GLOBAL.set_named(kind, args)
}
