//! The registry holding the active [`DataSource`].

use core::fmt;
use core::str::FromStr;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tzinfo_provider::{DataSource, DataSourceError, DataSourceResult};

#[cfg(feature = "zoneinfo")]
use tzinfo_provider::zoneinfo::{ZoneinfoDataSource, ZoneinfoSearchPath};

/// The built-in kinds of data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSourceKind {
    /// Data compiled into the library. Takes no arguments.
    Compiled,
    /// A zoneinfo directory. Takes an optional path to the directory.
    Zoneinfo,
}

impl DataSourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compiled => "compiled",
            Self::Zoneinfo => "zoneinfo",
        }
    }
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSourceKind {
    type Err = DataSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compiled" => Ok(Self::Compiled),
            "zoneinfo" => Ok(Self::Zoneinfo),
            _ => Err(DataSourceError::usage()
                .with_message(format!("data source kind must be compiled or zoneinfo, got {s:?}"))),
        }
    }
}

/// Holds the active [`DataSource`].
///
/// A registry starts out unset. The first call to [`current`][Self::current]
/// installs the default data source unless one was selected beforehand.
/// Selecting a new data source affects later calls to `current` only; values
/// already loaded from the previous one are left as they are.
#[derive(Debug)]
pub struct DataSourceRegistry {
    current: RwLock<Option<Arc<dyn DataSource>>>,
    #[cfg(feature = "zoneinfo")]
    search_path: RwLock<ZoneinfoSearchPath>,
}

impl Default for DataSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSourceRegistry {
    /// Creates an unset registry.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(None),
            #[cfg(feature = "zoneinfo")]
            search_path: RwLock::default(),
        }
    }

    /// Creates a registry with `source` already selected.
    pub fn with_source(source: Arc<dyn DataSource>) -> Self {
        let registry = Self::new();
        registry.set_source(source);
        registry
    }

    /// Returns the active data source, installing the default if none is set.
    ///
    /// Threads racing to install the default may each construct one; only
    /// the first to be published is kept and returned to all of them.
    pub fn current(&self) -> Arc<dyn DataSource> {
        if let Some(source) = self.get() {
            return source;
        }

        let default = default_source();
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        current
            .get_or_insert_with(|| {
                #[cfg(feature = "log")]
                log::debug!("installed default data source {default:?}");
                default
            })
            .clone()
    }

    /// Returns the active data source without installing the default.
    pub fn get(&self) -> Option<Arc<dyn DataSource>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns true if a data source has been selected or installed.
    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }

    /// Makes `source` the active data source and returns it.
    pub fn set_source(&self, source: Arc<dyn DataSource>) -> Arc<dyn DataSource> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        #[cfg(feature = "log")]
        log::debug!("replacing data source {:?} with {source:?}", current.as_ref());
        *current = Some(source.clone());
        source
    }

    /// Constructs a built-in data source of `kind` from `args` and makes it
    /// the active one.
    ///
    /// [`DataSourceKind::Compiled`] takes no arguments.
    /// [`DataSourceKind::Zoneinfo`] takes the path to a zoneinfo directory, or
    /// no arguments to search for one. Any other number of arguments is a
    /// `Usage` error. Construction errors are returned unchanged and leave the
    /// active data source as it was.
    pub fn set_kind(
        &self,
        kind: DataSourceKind,
        args: &[&Path],
    ) -> DataSourceResult<Arc<dyn DataSource>> {
        let source = self.construct(kind, args)?;
        Ok(self.set_source(source))
    }

    /// Like [`set_kind`][Self::set_kind], with the kind given by name.
    pub fn set_named(&self, kind: &str, args: &[&Path]) -> DataSourceResult<Arc<dyn DataSource>> {
        self.set_kind(kind.parse()?, args)
    }

    /// Returns the registry to its unset state.
    pub fn reset(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The directories searched when the zoneinfo kind is selected without a path.
    #[cfg(feature = "zoneinfo")]
    pub fn search_path(&self) -> ZoneinfoSearchPath {
        self.search_path
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[cfg(feature = "zoneinfo")]
    pub fn set_search_path(&self, search_path: ZoneinfoSearchPath) {
        *self.search_path.write().unwrap_or_else(PoisonError::into_inner) = search_path;
    }

    fn construct(&self, kind: DataSourceKind, args: &[&Path]) -> DataSourceResult<Arc<dyn DataSource>> {
        match kind {
            DataSourceKind::Compiled => {
                if !args.is_empty() {
                    return Err(DataSourceError::usage()
                        .with_message("the compiled data source takes no arguments"));
                }
                compiled_source()
            }
            DataSourceKind::Zoneinfo => {
                if args.len() > 1 {
                    return Err(DataSourceError::usage()
                        .with_message("the zoneinfo data source takes at most one argument"));
                }
                self.zoneinfo_source(args.first().copied())
            }
        }
    }

    #[cfg(feature = "zoneinfo")]
    fn zoneinfo_source(&self, directory: Option<&Path>) -> DataSourceResult<Arc<dyn DataSource>> {
        let search_path = self.search_path();
        let source = match directory {
            Some(directory) => ZoneinfoDataSource::with_search_path(directory, &search_path)?,
            None => ZoneinfoDataSource::search(&search_path)?,
        };
        Ok(Arc::new(source))
    }

    #[cfg(not(feature = "zoneinfo"))]
    fn zoneinfo_source(&self, _directory: Option<&Path>) -> DataSourceResult<Arc<dyn DataSource>> {
        Err(DataSourceError::usage().with_message("the zoneinfo feature is not enabled"))
    }
}

#[cfg(feature = "compiled_data")]
fn compiled_source() -> DataSourceResult<Arc<dyn DataSource>> {
    Ok(Arc::new(tzinfo_provider::compiled::CompiledDataSource::new()))
}

#[cfg(not(feature = "compiled_data"))]
fn compiled_source() -> DataSourceResult<Arc<dyn DataSource>> {
    Err(DataSourceError::usage().with_message("the compiled_data feature is not enabled"))
}

fn default_source() -> Arc<dyn DataSource> {
    #[cfg(feature = "compiled_data")]
    let source = Arc::new(tzinfo_provider::compiled::CompiledDataSource::new());
    #[cfg(not(feature = "compiled_data"))]
    let source = Arc::new(tzinfo_provider::NeverDataSource);
    source
}
