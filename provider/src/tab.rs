//! Parsing of the tzdb country tables: `iso3166.tab`, `zone1970.tab` and `zone.tab`.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::info::{parse_country_code, CountryCode};
use crate::{CountryInfo, CountryTimezone, DataSourceError, DataSourceResult};

/// Iterates over the non-comment, non-blank lines of a table with their line numbers.
fn table_lines(src: &str) -> impl Iterator<Item = (usize, &str)> {
    src.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn line_error(line_number: usize, msg: &str) -> DataSourceError {
    DataSourceError::invalid_data().with_message(format!("line {line_number}: {msg}"))
}

/// Parses an `iso3166.tab` table into a map of country code to English name.
///
/// Both the tzdb layout (`code<TAB>name`) and the BSD layout found at
/// `/usr/share/misc/iso3166` (`code<TAB>alpha3<TAB>numeric<TAB>name`) are accepted.
pub fn parse_iso3166(src: &str) -> DataSourceResult<BTreeMap<CountryCode, String>> {
    let mut countries = BTreeMap::new();
    for (line_number, line) in table_lines(src) {
        let columns: Vec<&str> = line.split('\t').collect();
        let (code, name) = match columns.as_slice() {
            [code, name] => (code, name),
            [code, _alpha3, _numeric, name] => (code, name),
            _ => return Err(line_error(line_number, "expected a code and a name")),
        };
        let code = parse_country_code(code)
            .map_err(|_| line_error(line_number, "invalid country code"))?;
        countries.insert(code, name.trim().to_string());
    }
    Ok(countries)
}

/// A single row of `zone1970.tab` or `zone.tab`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneTabEntry {
    pub codes: Vec<CountryCode>,
    pub zone: CountryTimezone,
}

/// Parses a `zone1970.tab` or `zone.tab` table.
///
/// `zone.tab` rows carry a single country code; `zone1970.tab` rows may list
/// several separated by commas. Both are handled by the same parser.
pub fn parse_zone_tab(src: &str) -> DataSourceResult<Vec<ZoneTabEntry>> {
    let mut entries = Vec::new();
    for (line_number, line) in table_lines(src) {
        let mut columns = line.split('\t');
        let (Some(codes), Some(coordinates), Some(identifier)) =
            (columns.next(), columns.next(), columns.next())
        else {
            return Err(line_error(line_number, "expected codes, coordinates and a zone"));
        };
        let description = columns
            .next()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(ToString::to_string);

        let codes = codes
            .split(',')
            .map(parse_country_code)
            .collect::<DataSourceResult<Vec<_>>>()
            .map_err(|_| line_error(line_number, "invalid country code"))?;
        let (latitude, longitude) = parse_coordinates(coordinates)
            .ok_or_else(|| line_error(line_number, "invalid ISO 6709 coordinates"))?;

        entries.push(ZoneTabEntry {
            codes,
            zone: CountryTimezone::new(identifier.to_string(), latitude, longitude, description),
        });
    }
    Ok(entries)
}

/// Joins the country names with the zones observed in each country.
///
/// Zones are kept in table order. Rows naming a country missing from the name
/// table are skipped.
pub fn build_countries(
    names: BTreeMap<CountryCode, String>,
    zones: Vec<ZoneTabEntry>,
) -> BTreeMap<CountryCode, CountryInfo> {
    let mut country_zones: BTreeMap<CountryCode, Vec<CountryTimezone>> = BTreeMap::new();
    for entry in zones {
        for code in entry.codes {
            if !names.contains_key(&code) {
                trace!("skipping zone {} for unknown country {code}", entry.zone.identifier());
                continue;
            }
            country_zones
                .entry(code)
                .or_default()
                .push(entry.zone.clone());
        }
    }

    names
        .into_iter()
        .map(|(code, name)| {
            let zones = country_zones.remove(&code).unwrap_or_default();
            (code, CountryInfo::new(code, name, zones))
        })
        .collect()
}

/// Parses ISO 6709 coordinates of the form `±DDMM±DDDMM` or `±DDMMSS±DDDMMSS`.
fn parse_coordinates(src: &str) -> Option<(f64, f64)> {
    let split = src
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '+' || *c == '-')
        .map(|(idx, _)| idx)?;
    let (latitude, longitude) = src.split_at(split);
    Some((parse_angle(latitude, 2)?, parse_angle(longitude, 3)?))
}

fn parse_angle(src: &str, degree_digits: usize) -> Option<f64> {
    let (sign, digits) = match src.as_bytes().first()? {
        b'+' => (1.0, &src[1..]),
        b'-' => (-1.0, &src[1..]),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let field = |range: core::ops::Range<usize>| -> Option<f64> {
        digits.get(range)?.parse::<u32>().ok().map(f64::from)
    };
    let degrees = field(0..degree_digits)?;
    let minutes = field(degree_digits..degree_digits + 2)?;
    let seconds = match digits.len() - degree_digits {
        2 => 0.0,
        4 => field(degree_digits + 2..degree_digits + 4)?,
        _ => return None,
    };
    Some(sign * (degrees + minutes / 60.0 + seconds / 3600.0))
}
