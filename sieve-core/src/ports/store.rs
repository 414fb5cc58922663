// sieve-core/src/ports/store.rs

// Where tables come from and where they go. The core never opens a file itself.

use crate::domain::table::RecordTable;
use crate::error::SieveError;
use std::path::Path;

pub trait TableStore: Send + Sync {
    /// Loads one table. A directory is read as the concatenation of its files.
    fn load(&self, path: &Path) -> Result<RecordTable, SieveError>;

    /// Writes the whole table, replacing any previous content.
    fn save(&self, table: &RecordTable, path: &Path) -> Result<(), SieveError>;
}
