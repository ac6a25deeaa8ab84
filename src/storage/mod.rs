//! Maps the ledger model onto remote storage: a root folder, a config file,
//! and one spreadsheet per calendar year with a sheet per month.

mod bootstrap;
mod ledger;

pub use bootstrap::BootstrapResolver;
pub use ledger::{LedgerStore, MonthData, MonthRef};

use std::collections::HashMap;

/// Value of the `dirType` property tagging the root folder.
pub(crate) const ROOT_DIR_TYPE: &str = "pefin.root";
/// Value of the `fileType` property tagging the config file.
pub(crate) const CONFIG_FILE_TYPE: &str = "pefin.config";
/// Value of the `fileType` property tagging a yearly spreadsheet.
pub(crate) const MOVEMENTS_FILE_TYPE: &str = "pefin.movements";

pub(crate) const DIR_TYPE_KEY: &str = "dirType";
pub(crate) const FILE_TYPE_KEY: &str = "fileType";
pub(crate) const YEAR_KEY: &str = "year";

/// Per-session resolution state: the root folder plus the year cache.
///
/// The cache maps 4-digit year strings to spreadsheet ids. Entries are only
/// ever added; once a year is resolved it stays resolved for the rest of the
/// session. The state is produced by the [`BootstrapResolver`] with an empty
/// cache and owned exclusively by the [`LedgerStore`] afterwards.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct StorageState {
    root_folder_id: String,
    spreadsheets: HashMap<String, String>,
}

impl StorageState {
    pub(crate) fn new(root_folder_id: String) -> Self {
        Self {
            root_folder_id,
            spreadsheets: HashMap::new(),
        }
    }

    /// The id of the folder scoping all of this application's resources.
    pub fn root_folder_id(&self) -> &str {
        &self.root_folder_id
    }

    /// The cached spreadsheet id for a year, if it was resolved before.
    pub fn cached(&self, year: &str) -> Option<&str> {
        self.spreadsheets.get(year).map(|s| s.as_str())
    }

    /// Adds newly resolved years to the cache. Entries already present win
    /// over incoming ones; a resolved year never changes its id.
    pub(crate) fn merge(&mut self, resolved: &HashMap<String, String>) {
        for (year, id) in resolved {
            self.spreadsheets
                .entry(year.clone())
                .or_insert_with(|| id.clone());
        }
    }
}

/// The two mutually exclusive phases of a remote-storage session. Callers
/// hold one of these and match on it: ledger operations are only reachable
/// once bootstrap has produced a [`LedgerStore`].
pub enum RemoteStorage {
    /// Bootstrap has not run yet.
    Uninitialized(BootstrapResolver),
    /// Bootstrap completed; ledger operations are available.
    Ready(LedgerStore),
}
