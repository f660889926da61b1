//! Time zone and country definitions returned by a [`DataSource`][crate::DataSource].

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use tinystr::TinyAsciiStr;

use crate::{DataSourceError, DataSourceResult, Timestamp, TimezoneOffset, TimezoneTransition};

/// The definition of a single time zone identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimezoneInfo {
    /// A time zone carrying its own transition data.
    Data(DataTimezoneInfo),
    /// A time zone that is an alias of another identifier.
    Linked(LinkedTimezoneInfo),
}

impl TimezoneInfo {
    /// Returns the identifier this definition was loaded for.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Data(data) => data.identifier(),
            Self::Linked(linked) => linked.identifier(),
        }
    }

    /// Returns the data definition, if this is not a link.
    pub fn as_data(&self) -> Option<&DataTimezoneInfo> {
        match self {
            Self::Data(data) => Some(data),
            Self::Linked(_) => None,
        }
    }

    /// Returns the link definition, if this is a link.
    pub fn as_linked(&self) -> Option<&LinkedTimezoneInfo> {
        match self {
            Self::Data(_) => None,
            Self::Linked(linked) => Some(linked),
        }
    }
}

/// A time zone defined by an initial offset and an ordered list of transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTimezoneInfo {
    identifier: String,
    initial_offset: TimezoneOffset,
    transitions: Arc<[TimezoneTransition]>,
}

impl DataTimezoneInfo {
    /// Creates a new `DataTimezoneInfo`.
    ///
    /// The transitions must be sorted by their timestamp.
    pub fn try_new(
        identifier: String,
        initial_offset: TimezoneOffset,
        transitions: Vec<TimezoneTransition>,
    ) -> DataSourceResult<Self> {
        if transitions
            .windows(2)
            .any(|pair| pair[0].timestamp_value() >= pair[1].timestamp_value())
        {
            return Err(DataSourceError::invalid_data()
                .with_message("Transitions must be in strictly ascending order."));
        }
        Ok(Self {
            identifier,
            initial_offset,
            transitions: transitions.into(),
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The offset observed before the first transition.
    pub fn initial_offset(&self) -> &TimezoneOffset {
        &self.initial_offset
    }

    pub fn transitions(&self) -> &[TimezoneTransition] {
        &self.transitions
    }

    /// Returns the offset observed at the UTC instant `at`.
    pub fn offset_for_utc(&self, at: Timestamp) -> &TimezoneOffset {
        let idx = self
            .transitions
            .partition_point(|t| t.timestamp_value() <= at.as_seconds());
        match idx.checked_sub(1) {
            Some(prev) => self.transitions[prev].offset(),
            None => &self.initial_offset,
        }
    }
}

/// A time zone that is an alias for another identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedTimezoneInfo {
    identifier: String,
    link_to_identifier: String,
}

impl LinkedTimezoneInfo {
    pub fn new(identifier: String, link_to_identifier: String) -> Self {
        Self {
            identifier,
            link_to_identifier,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The identifier of the time zone this link points to.
    pub fn link_to_identifier(&self) -> &str {
        &self.link_to_identifier
    }
}

/// An ISO 3166-1 alpha-2 country code.
pub type CountryCode = TinyAsciiStr<2>;

/// Parses an ISO 3166-1 alpha-2 code, which must be two uppercase ASCII letters.
pub fn parse_country_code(code: &str) -> DataSourceResult<CountryCode> {
    let bytes = code.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_uppercase) {
        return Err(DataSourceError::invalid_country_code().with_message("Invalid country code."));
    }
    CountryCode::try_from_utf8(bytes)
        .map_err(|_| DataSourceError::invalid_country_code().with_message("Invalid country code."))
}

/// The definition of a country and the time zones observed within it.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryInfo {
    code: CountryCode,
    name: String,
    zones: Vec<CountryTimezone>,
}

impl CountryInfo {
    pub fn new(code: CountryCode, name: String, zones: Vec<CountryTimezone>) -> Self {
        Self { code, name, zones }
    }

    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// The English name of the country.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The time zones observed in the country, most populous region first.
    pub fn zones(&self) -> &[CountryTimezone] {
        &self.zones
    }

    pub fn zone_identifiers(&self) -> impl Iterator<Item = &str> {
        self.zones.iter().map(CountryTimezone::identifier)
    }
}

/// A time zone observed in a country with the location of its principal city.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryTimezone {
    identifier: String,
    latitude: f64,
    longitude: f64,
    description: Option<String>,
}

impl CountryTimezone {
    pub fn new(
        identifier: String,
        latitude: f64,
        longitude: f64,
        description: Option<String>,
    ) -> Self {
        Self {
            identifier,
            latitude,
            longitude,
            description,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Latitude in degrees, positive north of the equator.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees, positive east of Greenwich.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// The comment describing the region covered, when a country has more than one zone.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
