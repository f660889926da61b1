//! A data source backed by data compiled into the binary.
//!
//! Zone data is sourced from the TZif files bundled by `jiff-tzdb`, and
//! country data from the tab files in `src/data`.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::ToString;
use std::sync::RwLock;

use once_cell::race::OnceBox;

use crate::info::{parse_country_code, CountryCode};
use crate::tab;
use crate::tzif::Tzif;
use crate::{CountryInfo, DataSource, DataSourceError, DataSourceResult, TimezoneInfo};

/// The display name of [`CompiledDataSource`].
pub const COMPILED_DISPLAY_NAME: &str = "Compiled DataSource";

const ISO3166_TAB: &str = include_str!("./data/iso3166.tab");
const ZONE1970_TAB: &str = include_str!("./data/zone1970.tab");

type CountryTable = DataSourceResult<BTreeMap<CountryCode, CountryInfo>>;

/// A [`DataSource`] that reads data compiled into the library.
///
/// Every bundled identifier is reported as a data identifier: the bundle
/// does not record which names are links.
///
/// Parsed zones are cached; the country tables are parsed on first use.
#[derive(Debug)]
pub struct CompiledDataSource {
    identifiers: BTreeSet<&'static str>,
    cache: RwLock<BTreeMap<&'static str, TimezoneInfo>>,
    countries: OnceBox<CountryTable>,
}

impl Default for CompiledDataSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CompiledDataSource {
    pub fn new() -> Self {
        Self {
            identifiers: jiff_tzdb::available().collect(),
            cache: RwLock::default(),
            countries: OnceBox::new(),
        }
    }

    /// The version of the bundled time zone database, e.g. "2025b".
    pub fn version(&self) -> Option<&'static str> {
        jiff_tzdb::VERSION
    }

    fn countries(&self) -> DataSourceResult<&BTreeMap<CountryCode, CountryInfo>> {
        self.countries
            .get_or_init(|| Box::new(parse_countries()))
            .as_ref()
            .map_err(Clone::clone)
    }
}

fn parse_countries() -> CountryTable {
    let names = tab::parse_iso3166(ISO3166_TAB)?;
    let zones = tab::parse_zone_tab(ZONE1970_TAB)?;
    Ok(tab::build_countries(names, zones))
}

impl DataSource for CompiledDataSource {
    fn load_timezone_info(&self, identifier: &str) -> DataSourceResult<TimezoneInfo> {
        // Lookups are case sensitive, unlike `jiff_tzdb::get`.
        let Some(&identifier) = self.identifiers.get(identifier) else {
            return Err(DataSourceError::invalid_identifier()
                .with_message("Time zone identifier does not exist."));
        };

        if let Some(info) = self
            .cache
            .read()
            .map_err(|_| DataSourceError::assert().with_message("poisoned RwLock"))?
            .get(identifier)
        {
            return Ok(info.clone());
        }

        trace!("compiled cache miss for {identifier}");
        let Some((_, data)) = jiff_tzdb::get(identifier) else {
            return Err(DataSourceError::invalid_identifier()
                .with_message("Time zone identifier does not exist."));
        };
        let info = TimezoneInfo::Data(Tzif::from_bytes(data)?.to_timezone_info(identifier.to_string())?);

        Ok(self
            .cache
            .write()
            .map_err(|_| DataSourceError::assert().with_message("poisoned RwLock"))?
            .entry(identifier)
            .or_insert(info)
            .clone())
    }

    fn data_timezone_identifiers(&self) -> DataSourceResult<BTreeSet<&str>> {
        Ok(self.identifiers.clone())
    }

    fn linked_timezone_identifiers(&self) -> DataSourceResult<BTreeSet<&str>> {
        Ok(BTreeSet::new())
    }

    fn load_country_info(&self, code: &str) -> DataSourceResult<CountryInfo> {
        let code = parse_country_code(code)?;
        self.countries()?
            .get(&code)
            .cloned()
            .ok_or(DataSourceError::invalid_country_code().with_message("Unknown country code."))
    }

    fn country_codes(&self) -> DataSourceResult<BTreeSet<&str>> {
        Ok(self.countries()?.keys().map(CountryCode::as_str).collect())
    }

    fn display_name(&self) -> DataSourceResult<Cow<'_, str>> {
        Ok(Cow::Borrowed(COMPILED_DISPLAY_NAME))
    }
}
