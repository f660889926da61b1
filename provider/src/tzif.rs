//! Decoding of TZif data into time zone definitions.

use alloc::string::String;
use alloc::vec::Vec;

use combine::Parser;

use tzif::{
    self,
    data::{
        posix::PosixTzString,
        tzif::{DataBlock, LocalTimeTypeRecord, TzifData, TzifHeader},
    },
};

use crate::{DataSourceError, DataSourceResult, DataTimezoneInfo, TimezoneOffset, TimezoneTransition};

/// The four magic bytes every TZif file starts with.
pub const TZIF_MAGIC: &[u8; 4] = b"TZif";

/// Returns true if `bytes` could be the start of a TZif file.
#[inline]
pub fn is_possibly_tzif(bytes: &[u8]) -> bool {
    bytes.starts_with(TZIF_MAGIC)
}

/// `TZif` stands for Time zone information format is laid out by [RFC 8536][rfc8536] and
/// laid out by the [tzdata manual][tzif-manual]
///
/// This representation of `TZif` extends the parsed type from the `tzif`
/// [rust crate][tzif-crate] with conversion into a [`DataTimezoneInfo`].
///
/// [rfc8536]: https://datatracker.ietf.org/doc/html/rfc8536
/// [tzif-manual]: https://man7.org/linux/man-pages/man5/tzfile.5.html
/// [tzif-crate]: https://docs.rs/tzif/latest/tzif/
#[derive(Debug, Clone)]
pub struct Tzif {
    pub header1: TzifHeader,
    pub data_block1: DataBlock,
    pub header2: Option<TzifHeader>,
    pub data_block2: Option<DataBlock>,
    pub footer: Option<PosixTzString>,
}

impl From<TzifData> for Tzif {
    fn from(value: TzifData) -> Self {
        let TzifData {
            header1,
            data_block1,
            header2,
            data_block2,
            footer,
        } = value;

        Self {
            header1,
            data_block1,
            header2,
            data_block2,
            footer,
        }
    }
}

impl Tzif {
    pub fn from_bytes(data: &[u8]) -> DataSourceResult<Self> {
        if !is_possibly_tzif(data) {
            return Err(DataSourceError::invalid_data().with_message("Missing TZif magic."));
        }
        let Ok((parse_result, _)) = tzif::parse::tzif::tzif().parse(data) else {
            return Err(DataSourceError::invalid_data().with_message("Illformed Tzif data."));
        };
        Ok(Self::from(parse_result))
    }

    /// Returns the 64-bit data block, falling back to the version 1 block.
    pub fn data_block(&self) -> &DataBlock {
        self.data_block2.as_ref().unwrap_or(&self.data_block1)
    }

    /// Converts the transitions of this TZif into a [`DataTimezoneInfo`].
    ///
    /// Transitions past the last explicit one, described by the POSIX footer,
    /// are not expanded.
    pub fn to_timezone_info(&self, identifier: String) -> DataSourceResult<DataTimezoneInfo> {
        let db = self.data_block();
        let offsets = db
            .local_time_type_records
            .iter()
            .map(|record| local_record_to_offset(db, record))
            .collect::<DataSourceResult<Vec<_>>>()?;

        // Local time type 0 applies to every instant before the first transition.
        let initial_offset = *offsets.first().ok_or(
            DataSourceError::invalid_data().with_message("TZif has no local time types."),
        )?;

        if db.transition_times.len() != db.transition_types.len() {
            return Err(DataSourceError::invalid_data()
                .with_message("TZif transition times and types are misaligned."));
        }

        let mut previous = initial_offset;
        let mut transitions = Vec::with_capacity(db.transition_times.len());
        for (time, &type_idx) in db.transition_times.iter().zip(&db.transition_types) {
            let offset = *offsets.get(type_idx).ok_or(
                DataSourceError::invalid_data().with_message("TZif transition type out of range."),
            )?;
            transitions.push(TimezoneTransition::new(offset, previous, time.0));
            previous = offset;
        }

        DataTimezoneInfo::try_new(identifier, initial_offset, transitions)
    }
}

fn local_record_to_offset(
    db: &DataBlock,
    record: &LocalTimeTypeRecord,
) -> DataSourceResult<TimezoneOffset> {
    let abbreviation = designation(&db.time_zone_designations, record.idx).ok_or(
        DataSourceError::invalid_data().with_message("TZif designation index out of range."),
    )?;
    TimezoneOffset::try_new(record.utoff.0, record.is_dst, abbreviation)
}

/// Resolves a byte index into the NUL separated designation table.
///
/// An index may point into the middle of a designation, in which case the
/// designation's suffix is returned. An index pointing at a NUL terminator
/// names no designation.
fn designation(designations: &[String], idx: usize) -> Option<&str> {
    let mut start = 0;
    for designation in designations {
        let end = start + designation.len();
        if idx < end && idx >= start {
            return designation.get(idx - start..);
        }
        start = end + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{designation, is_possibly_tzif, Tzif};
    use crate::Timestamp;
    use alloc::string::String;
    use alloc::vec;

    #[test]
    fn designation_by_byte_index() {
        // "LMT\0EDT\0EST\0"
        let table = vec![String::from("LMT"), String::from("EDT"), String::from("EST")];
        assert_eq!(designation(&table, 0), Some("LMT"));
        assert_eq!(designation(&table, 4), Some("EDT"));
        assert_eq!(designation(&table, 5), Some("DT"));
        assert_eq!(designation(&table, 8), Some("EST"));
        // NUL terminators and indices past the table.
        assert_eq!(designation(&table, 3), None);
        assert_eq!(designation(&table, 11), None);
        assert_eq!(designation(&table, 12), None);
    }

    #[test]
    fn magic() {
        assert!(is_possibly_tzif(b"TZif2\0\0"));
        assert!(!is_possibly_tzif(b"# tzdb"));
        assert!(Tzif::from_bytes(b"not a tzif").is_err());
    }

    #[test]
    fn new_york_from_bytes() {
        let (_, data) = jiff_tzdb::get("America/New_York").unwrap();
        let tzif = Tzif::from_bytes(data).unwrap();
        let info = tzif.to_timezone_info("America/New_York".into()).unwrap();

        assert_eq!(info.initial_offset().abbreviation(), "LMT");
        assert_eq!(info.initial_offset().utc_total_offset(), -17762);

        // 2004-10-31T06:00:00Z, EDT -> EST
        let transition = info
            .transitions()
            .iter()
            .find(|t| t.timestamp_value() == 1_099_202_400)
            .unwrap();
        assert_eq!(transition.previous_offset().abbreviation(), "EDT");
        assert_eq!(transition.offset().abbreviation(), "EST");
        assert!(transition.previous_offset().is_dst());
        assert_eq!(transition.local_end_at().as_seconds(), 1_099_202_400 - 14400);
        assert_eq!(transition.local_start_at().as_seconds(), 1_099_202_400 - 18000);

        // 2005-07-01T12:00:00Z
        let summer = info.offset_for_utc(Timestamp::from_seconds(1_120_219_200));
        assert_eq!(summer.abbreviation(), "EDT");
    }

    #[test]
    fn transitions_chain_offsets() {
        let (_, data) = jiff_tzdb::get("Europe/London").unwrap();
        let info = Tzif::from_bytes(data)
            .unwrap()
            .to_timezone_info("Europe/London".into())
            .unwrap();
        let transitions = info.transitions();
        assert!(!transitions.is_empty());
        assert_eq!(transitions[0].previous_offset(), info.initial_offset());
        for pair in transitions.windows(2) {
            assert_eq!(pair[0].offset(), pair[1].previous_offset());
        }
    }
}
