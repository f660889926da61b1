//! A data source backed by a zoneinfo directory on the file system.
//!
//! A zoneinfo directory holds one TZif file per time zone identifier, laid out
//! by identifier (`America/New_York` lives at `<dir>/America/New_York`), along
//! with the `iso3166.tab` and `zone1970.tab` (or older `zone.tab`) country
//! tables.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use once_cell::race::OnceBox;

use crate::info::{parse_country_code, CountryCode};
use crate::tab;
use crate::tzif::{is_possibly_tzif, Tzif};
use crate::{
    CountryInfo, DataSource, DataSourceError, DataSourceResult, LinkedTimezoneInfo, TimezoneInfo,
};

/// The zoneinfo directories probed when none is given explicitly.
pub const ZONEINFO_DIRECTORIES: &[&str] = &[
    "/usr/share/zoneinfo",
    "/usr/share/lib/zoneinfo",
    "/etc/zoneinfo",
];

/// Places some systems keep the country table outside the zoneinfo directory.
pub const ISO3166_ALTERNATES: &[&str] = &["/usr/share/misc/iso3166.tab", "/usr/share/misc/iso3166"];

const ISO3166_TAB: &str = "iso3166.tab";
const ZONE1970_TAB: &str = "zone1970.tab";
const ZONE_TAB: &str = "zone.tab";

/// Top level entries of a zoneinfo directory that are never identifiers.
const SKIPPED_ENTRIES: &[&str] = &["posix", "right", "localtime", "posixrules"];

type CountryTable = DataSourceResult<BTreeMap<CountryCode, CountryInfo>>;

/// Where to look for a zoneinfo directory.
///
/// When enabled, the `TZDIR` environment variable is consulted before the
/// configured directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneinfoSearchPath {
    directories: Vec<PathBuf>,
    iso3166_alternates: Vec<PathBuf>,
    use_tzdir: bool,
}

impl Default for ZoneinfoSearchPath {
    fn default() -> Self {
        Self {
            directories: ZONEINFO_DIRECTORIES.iter().map(PathBuf::from).collect(),
            iso3166_alternates: ISO3166_ALTERNATES.iter().map(PathBuf::from).collect(),
            use_tzdir: true,
        }
    }
}

impl ZoneinfoSearchPath {
    pub fn new(directories: Vec<PathBuf>, iso3166_alternates: Vec<PathBuf>) -> Self {
        Self {
            directories,
            iso3166_alternates,
            use_tzdir: true,
        }
    }

    /// Sets whether `TZDIR` is tried before the configured directories.
    pub fn with_tzdir(mut self, use_tzdir: bool) -> Self {
        self.use_tzdir = use_tzdir;
        self
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn iso3166_alternates(&self) -> &[PathBuf] {
        &self.iso3166_alternates
    }

    /// The directories to probe, in order.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::with_capacity(self.directories.len() + 1);
        if self.use_tzdir {
            if let Some(tzdir) = std::env::var_os("TZDIR").filter(|dir| !dir.is_empty()) {
                candidates.push(PathBuf::from(tzdir));
            }
        }
        candidates.extend(self.directories.iter().cloned());
        candidates
    }
}

/// A [`DataSource`] reading a zoneinfo directory.
///
/// The directory is indexed once on construction. Identifiers are only ever
/// resolved against that index, so a lookup can never open a file outside it.
#[derive(Debug)]
pub struct ZoneinfoDataSource {
    directory: PathBuf,
    display_name: String,
    data_identifiers: BTreeSet<String>,
    links: BTreeMap<String, String>,
    iso3166_path: PathBuf,
    zone_tab_path: PathBuf,
    cache: RwLock<BTreeMap<String, TimezoneInfo>>,
    countries: OnceBox<CountryTable>,
}

impl ZoneinfoDataSource {
    /// Opens the zoneinfo directory at `directory`.
    ///
    /// Fails with `InvalidDirectory` if `directory` is not a zoneinfo directory.
    pub fn new(directory: &Path) -> DataSourceResult<Self> {
        Self::with_search_path(directory, &ZoneinfoSearchPath::default())
    }

    /// Opens `directory`, looking for the country name table in the
    /// alternate locations of `search_path` when the directory has none.
    pub fn with_search_path(
        directory: &Path,
        search_path: &ZoneinfoSearchPath,
    ) -> DataSourceResult<Self> {
        if !directory.is_dir() {
            return Err(DataSourceError::invalid_directory()
                .with_message(format!("{} is not a directory", directory.display())));
        }

        let iso3166_path = core::iter::once(directory.join(ISO3166_TAB))
            .chain(search_path.iso3166_alternates.iter().cloned())
            .find(|path| path.is_file())
            .ok_or_else(|| {
                DataSourceError::invalid_directory().with_message(format!(
                    "{} has no {ISO3166_TAB}",
                    directory.display()
                ))
            })?;
        let zone_tab_path = [ZONE1970_TAB, ZONE_TAB]
            .into_iter()
            .map(|name| directory.join(name))
            .find(|path| path.is_file())
            .ok_or_else(|| {
                DataSourceError::invalid_directory().with_message(format!(
                    "{} has neither {ZONE1970_TAB} nor {ZONE_TAB}",
                    directory.display()
                ))
            })?;

        let (data_identifiers, links) = walk(directory)?;
        debug!(
            "indexed {} zones and {} links in {}",
            data_identifiers.len(),
            links.len(),
            directory.display()
        );

        Ok(Self {
            directory: directory.to_path_buf(),
            display_name: format!("Zoneinfo DataSource: {}", directory.display()),
            data_identifiers,
            links,
            iso3166_path,
            zone_tab_path,
            cache: RwLock::default(),
            countries: OnceBox::new(),
        })
    }

    /// Opens the first valid zoneinfo directory of `search_path`.
    ///
    /// Fails with `DirectoryNotFound` if no candidate is a valid zoneinfo directory.
    pub fn search(search_path: &ZoneinfoSearchPath) -> DataSourceResult<Self> {
        let candidates = search_path.candidates();
        for candidate in &candidates {
            debug!("probing zoneinfo directory {}", candidate.display());
            match Self::with_search_path(candidate, search_path) {
                Ok(source) => {
                    debug!("using zoneinfo directory {}", candidate.display());
                    return Ok(source);
                }
                Err(_err) => {
                    debug!("skipping {}: {_err}", candidate.display());
                }
            }
        }

        let tried = candidates
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        warn!("no zoneinfo directory found, tried: {tried}");
        Err(DataSourceError::directory_not_found()
            .with_message(format!("No zoneinfo directory found, tried: [{tried}]")))
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn countries(&self) -> DataSourceResult<&BTreeMap<CountryCode, CountryInfo>> {
        self.countries
            .get_or_init(|| Box::new(self.parse_countries()))
            .as_ref()
            .map_err(Clone::clone)
    }

    fn parse_countries(&self) -> CountryTable {
        trace!("reading {}", self.iso3166_path.display());
        let names = tab::parse_iso3166(&fs::read_to_string(&self.iso3166_path)?)?;
        trace!("reading {}", self.zone_tab_path.display());
        let zones = tab::parse_zone_tab(&fs::read_to_string(&self.zone_tab_path)?)?;
        Ok(tab::build_countries(names, zones))
    }

    fn read_timezone_info(&self, identifier: &str) -> DataSourceResult<TimezoneInfo> {
        if let Some(target) = self.links.get(identifier) {
            return Ok(TimezoneInfo::Linked(LinkedTimezoneInfo::new(
                identifier.to_string(),
                target.clone(),
            )));
        }
        if !self.data_identifiers.contains(identifier) {
            return Err(DataSourceError::invalid_identifier()
                .with_message("Time zone identifier does not exist."));
        }

        let bytes = fs::read(self.directory.join(identifier))?;
        let info = Tzif::from_bytes(&bytes)?.to_timezone_info(identifier.to_string())?;
        Ok(TimezoneInfo::Data(info))
    }
}

impl DataSource for ZoneinfoDataSource {
    fn load_timezone_info(&self, identifier: &str) -> DataSourceResult<TimezoneInfo> {
        if let Some(info) = self
            .cache
            .read()
            .map_err(|_| DataSourceError::assert().with_message("poisoned RwLock"))?
            .get(identifier)
        {
            return Ok(info.clone());
        }

        trace!("zoneinfo cache miss for {identifier}");
        let info = self.read_timezone_info(identifier)?;

        Ok(self
            .cache
            .write()
            .map_err(|_| DataSourceError::assert().with_message("poisoned RwLock"))?
            .entry(identifier.to_string())
            .or_insert(info)
            .clone())
    }

    fn data_timezone_identifiers(&self) -> DataSourceResult<BTreeSet<&str>> {
        Ok(self.data_identifiers.iter().map(String::as_str).collect())
    }

    fn linked_timezone_identifiers(&self) -> DataSourceResult<BTreeSet<&str>> {
        Ok(self.links.keys().map(String::as_str).collect())
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
        Ok(Cow::Borrowed(&self.display_name))
    }
}

/// Converts `path` below `root` into a `/` separated identifier.
fn identifier_for(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let components = relative
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    (!components.is_empty()).then(|| components.join("/"))
}

fn starts_with_tzif_magic(path: &Path) -> bool {
    let mut buf = [0; 4];
    match File::open(path).and_then(|mut f| f.read_exact(&mut buf)) {
        Ok(()) => is_possibly_tzif(&buf),
        Err(_err) => {
            trace!("not reading {}: {_err}", path.display());
            false
        }
    }
}

/// Indexes the TZif files below `root`.
///
/// Returns the data identifiers and a map of link identifiers to their target.
/// A symbolic link whose target is not itself an indexed data identifier is
/// treated as data.
fn walk(root: &Path) -> DataSourceResult<(BTreeSet<String>, BTreeMap<String, String>)> {
    let canonical_root = fs::canonicalize(root)?;
    let mut data = BTreeSet::new();
    let mut symlinks = Vec::new();

    let mut stack = Vec::from([root.to_path_buf()]);
    while let Some(dir) = stack.pop() {
        let readdir = match dir.read_dir() {
            Ok(readdir) => readdir,
            Err(err) if dir == root => return Err(err.into()),
            Err(_err) => {
                warn!("error when reading {} as a directory: {_err}", dir.display());
                continue;
            }
        };
        for result in readdir {
            let dent = match result {
                Ok(dent) => dent,
                Err(_err) => {
                    warn!("error when reading directory entry from {}: {_err}", dir.display());
                    continue;
                }
            };
            let path = dent.path();
            let Some(identifier) = identifier_for(root, &path) else {
                trace!("skipping non UTF-8 path {}", path.display());
                continue;
            };
            if SKIPPED_ENTRIES.contains(&identifier.as_str()) {
                trace!("skipping {}", path.display());
                continue;
            }
            let file_type = match dent.file_type() {
                Ok(file_type) => file_type,
                Err(_err) => {
                    warn!("error when reading file type from {}: {_err}", path.display());
                    continue;
                }
            };

            if file_type.is_dir() {
                stack.push(path);
            } else if file_type.is_symlink() {
                // Directory links are not followed, so the walk cannot loop.
                if !path.is_dir() && starts_with_tzif_magic(&path) {
                    symlinks.push((identifier, path));
                }
            } else if starts_with_tzif_magic(&path) {
                data.insert(identifier);
            } else {
                trace!("skipping non TZif file {}", path.display());
            }
        }
    }

    let mut links = BTreeMap::new();
    for (identifier, path) in symlinks {
        let target = fs::canonicalize(&path)
            .ok()
            .and_then(|target| identifier_for(&canonical_root, &target))
            .filter(|target| *target != identifier && data.contains(target));
        match target {
            Some(target) => {
                links.insert(identifier, target);
            }
            None => {
                data.insert(identifier);
            }
        }
    }
    Ok((data, links))
}

#[cfg(test)]
mod tests {
    use super::{ZoneinfoDataSource, ZoneinfoSearchPath};
    use crate::{DataSource, ErrorKind};
    use alloc::vec;
    use std::fs;
    use std::path::Path;

    const ISO3166: &str = "\
# ISO 3166 alpha-2 country codes
GB\tBritain (UK)
US\tUnited States
";

    const ZONE1970: &str = "\
#codes\tcoordinates\tTZ\tcomments
GB,GG,IM,JE\t+513030-0000731\tEurope/London
US\t+404251-0740023\tAmerica/New_York\tEastern (most areas)
";

    const ZONE: &str = "\
#code\tcoordinates\tTZ\tcomments
GB\t+513030-0000731\tEurope/London
US\t+404251-0740023\tAmerica/New_York\tEastern (most areas)
US\t+415100-0873900\tAmerica/Chicago\tCentral (most areas)
";

    fn write_zone(dir: &Path, identifier: &str) {
        let (_, data) = jiff_tzdb::get(identifier).unwrap();
        let path = dir.join(identifier);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    /// Builds a small zoneinfo directory.
    fn zoneinfo_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for id in ["America/New_York", "America/Chicago", "Europe/London", "UTC"] {
            write_zone(root, id);
        }
        write_zone(&root.join("posix"), "America/New_York");
        write_zone(&root.join("right"), "Europe/London");
        fs::copy(root.join("UTC"), root.join("localtime")).unwrap();
        fs::write(root.join("leapseconds"), "# leap seconds\n").unwrap();
        fs::write(root.join("tzdata.zi"), "# version 2025b\n").unwrap();
        fs::write(root.join("iso3166.tab"), ISO3166).unwrap();
        fs::write(root.join("zone1970.tab"), ZONE1970).unwrap();

        #[cfg(unix)]
        {
            fs::create_dir(root.join("US")).unwrap();
            std::os::unix::fs::symlink("../America/New_York", root.join("US/Eastern")).unwrap();
            std::os::unix::fs::symlink(".", root.join("loop")).unwrap();
        }
        dir
    }

    #[test]
    fn indexes_identifiers() {
        let dir = zoneinfo_dir();
        let source = ZoneinfoDataSource::new(dir.path()).unwrap();

        let data: vec::Vec<&str> = source
            .data_timezone_identifiers()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            data,
            ["America/Chicago", "America/New_York", "Europe/London", "UTC"]
        );

        #[cfg(unix)]
        {
            let linked = source.linked_timezone_identifiers().unwrap();
            assert_eq!(linked.into_iter().collect::<vec::Vec<_>>(), ["US/Eastern"]);
            assert_eq!(source.timezone_identifiers().unwrap().len(), 5);
        }
    }

    #[test]
    fn loads_data_zone() {
        let dir = zoneinfo_dir();
        let source = ZoneinfoDataSource::new(dir.path()).unwrap();
        let info = source.load_timezone_info("America/New_York").unwrap();
        let data = info.as_data().unwrap();
        assert_eq!(data.identifier(), "America/New_York");
        assert_eq!(data.initial_offset().abbreviation(), "LMT");
        assert!(!data.transitions().is_empty());

        // A cached result survives the file going away.
        fs::remove_file(dir.path().join("America/New_York")).unwrap();
        assert_eq!(source.load_timezone_info("America/New_York").unwrap(), info);
    }

    #[cfg(unix)]
    #[test]
    fn loads_linked_zone() {
        let dir = zoneinfo_dir();
        let source = ZoneinfoDataSource::new(dir.path()).unwrap();
        let info = source.load_timezone_info("US/Eastern").unwrap();
        let linked = info.as_linked().unwrap();
        assert_eq!(linked.identifier(), "US/Eastern");
        assert_eq!(linked.link_to_identifier(), "America/New_York");
    }

    #[test]
    fn rejects_unindexed_identifiers() {
        let dir = zoneinfo_dir();
        let source = ZoneinfoDataSource::new(dir.path()).unwrap();
        for id in [
            "posix/America/New_York",
            "right/Europe/London",
            "localtime",
            "leapseconds",
            "iso3166.tab",
            "../UTC",
            "America/../UTC",
            "America",
            "utc",
            "",
        ] {
            let err = source.load_timezone_info(id).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidIdentifier, "{id}");
        }
    }

    #[test]
    fn countries_prefer_zone1970() {
        let dir = zoneinfo_dir();
        fs::write(dir.path().join("zone.tab"), ZONE).unwrap();
        let source = ZoneinfoDataSource::new(dir.path()).unwrap();

        let codes: vec::Vec<&str> = source.country_codes().unwrap().into_iter().collect();
        assert_eq!(codes, ["GB", "US"]);
        let us = source.load_country_info("US").unwrap();
        assert_eq!(us.name(), "United States");
        assert_eq!(us.zone_identifiers().collect::<vec::Vec<_>>(), ["America/New_York"]);
        assert_eq!(us.zones()[0].description(), Some("Eastern (most areas)"));

        let err = source.load_country_info("FR").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCountryCode);
    }

    #[test]
    fn countries_fall_back_to_zone_tab() {
        let dir = zoneinfo_dir();
        fs::remove_file(dir.path().join("zone1970.tab")).unwrap();
        fs::write(dir.path().join("zone.tab"), ZONE).unwrap();
        let source = ZoneinfoDataSource::new(dir.path()).unwrap();

        let us = source.load_country_info("US").unwrap();
        assert_eq!(
            us.zone_identifiers().collect::<vec::Vec<_>>(),
            ["America/New_York", "America/Chicago"]
        );
    }

    #[test]
    fn malformed_country_table() {
        let dir = zoneinfo_dir();
        fs::write(dir.path().join("iso3166.tab"), "GB Britain\n").unwrap();
        let source = ZoneinfoDataSource::new(dir.path()).unwrap();
        let err = source.load_country_info("GB").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.message().starts_with("line 1:"));
    }

    #[test]
    fn invalid_directories() {
        let dir = zoneinfo_dir();
        let no_alternates = ZoneinfoSearchPath::new(vec![], vec![]).with_tzdir(false);

        let missing = dir.path().join("does-not-exist");
        let err = ZoneinfoDataSource::with_search_path(&missing, &no_alternates).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDirectory);

        let file = dir.path().join("UTC");
        let err = ZoneinfoDataSource::with_search_path(&file, &no_alternates).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDirectory);

        let no_zone_tab = tempfile::tempdir().unwrap();
        fs::write(no_zone_tab.path().join("iso3166.tab"), ISO3166).unwrap();
        let err =
            ZoneinfoDataSource::with_search_path(no_zone_tab.path(), &no_alternates).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDirectory);

        let no_iso3166 = tempfile::tempdir().unwrap();
        fs::write(no_iso3166.path().join("zone.tab"), ZONE).unwrap();
        let err =
            ZoneinfoDataSource::with_search_path(no_iso3166.path(), &no_alternates).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDirectory);
    }

    #[test]
    fn alternate_iso3166() {
        let dir = zoneinfo_dir();
        fs::remove_file(dir.path().join("iso3166.tab")).unwrap();
        let misc = tempfile::tempdir().unwrap();
        let alternate = misc.path().join("iso3166");
        fs::write(&alternate, "GB\tGBR\t826\tUnited Kingdom\nUS\tUSA\t840\tUnited States\n")
            .unwrap();

        let search_path = ZoneinfoSearchPath::new(vec![], vec![alternate]).with_tzdir(false);
        let source = ZoneinfoDataSource::with_search_path(dir.path(), &search_path).unwrap();
        assert_eq!(source.load_country_info("GB").unwrap().name(), "United Kingdom");
    }

    #[test]
    fn search_picks_first_valid() {
        let empty = tempfile::tempdir().unwrap();
        let dir = zoneinfo_dir();
        let search_path = ZoneinfoSearchPath::new(
            vec![empty.path().join("missing"), empty.path().to_path_buf(), dir.path().to_path_buf()],
            vec![],
        )
        .with_tzdir(false);

        let source = ZoneinfoDataSource::search(&search_path).unwrap();
        assert_eq!(source.directory(), dir.path());
        assert_eq!(
            source.display_name().unwrap(),
            alloc::format!("Zoneinfo DataSource: {}", dir.path().display())
        );
    }

    #[test]
    fn search_lists_candidates() {
        let empty = tempfile::tempdir().unwrap();
        let missing = empty.path().join("missing");
        let search_path =
            ZoneinfoSearchPath::new(vec![missing.clone(), empty.path().to_path_buf()], vec![])
                .with_tzdir(false);

        let err = ZoneinfoDataSource::search(&search_path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
        assert!(err.message().contains(&*missing.to_string_lossy()));
        assert!(err.message().contains(&*empty.path().to_string_lossy()));
    }

    #[test]
    fn default_search_path() {
        let search_path = ZoneinfoSearchPath::default().with_tzdir(false);
        let candidates = search_path.candidates();
        assert_eq!(candidates[0], Path::new("/usr/share/zoneinfo"));
        assert_eq!(candidates.len(), 3);
        assert_eq!(search_path.iso3166_alternates().len(), 2);
    }
}
