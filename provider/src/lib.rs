//! Data sources for time zone and country information.
//!
//! This crate defines the [`DataSource`] trait, the values a data source
//! returns, and two backends:
//!
//! - [`compiled::CompiledDataSource`] (feature `compiled_data`), reading data
//!   compiled into the library.
//! - [`zoneinfo::ZoneinfoDataSource`] (feature `zoneinfo`), reading a zoneinfo
//!   directory such as `/usr/share/zoneinfo`.
//!
//! A time zone is described by a list of [`TimezoneTransition`]s, each
//! recording the instant a new [`TimezoneOffset`] takes effect.
#![no_std]
#![cfg_attr(not(test), forbid(clippy::unwrap_used))]
#![allow(
    unused_crate_dependencies,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

#[macro_use]
mod logging;

mod error;
mod info;
mod offset;
mod source;
mod tab;
mod timestamp;
mod transition;

#[cfg(feature = "tzif")]
pub mod tzif;

#[cfg(feature = "compiled_data")]
pub mod compiled;

#[cfg(feature = "zoneinfo")]
pub mod zoneinfo;

pub use error::{DataSourceError, ErrorKind};
pub use info::{
    parse_country_code, CountryCode, CountryInfo, CountryTimezone, DataTimezoneInfo,
    LinkedTimezoneInfo, TimezoneInfo,
};
pub use offset::TimezoneOffset;
pub use source::{DataSource, NeverDataSource};
pub use timestamp::Timestamp;
pub use transition::TimezoneTransition;

/// The `Result` returned by data source operations.
pub type DataSourceResult<T> = Result<T, DataSourceError>;
