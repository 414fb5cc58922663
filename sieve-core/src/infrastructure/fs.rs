// sieve-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `content` to `path` atomically.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    atomic_write_with(path, |w| w.write_all(content.as_ref()).map_err(Into::into))
}

/// Streams into a temporary file next to `path`, then renames it over `path`.
/// Readers see either the previous file or the complete new one. Missing parent
/// directories are created.
pub fn atomic_write_with<P, F>(path: P, write: F) -> Result<(), InfrastructureError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<&File>) -> Result<(), InfrastructureError>,
{
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp_file = tempfile::NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;
    Ok(())
}
