use std::io::Read;
use std::path::Path;

use crate::error::{ArchiveError, ArchiveResult};
use crate::reader::{ArchiveReader, ArchivedFile};

/// Extract every record of `archive` into `dest_dir`, returning the count.
///
/// `dest_dir` is created if needed and existing files are overwritten, so
/// extracting the same archive twice leaves the same result. Records are
/// written as they are read; on error, files already written stay in place.
pub fn extract<R: Read>(dest_dir: &Path, archive: R) -> ArchiveResult<usize> {
    std::fs::create_dir_all(dest_dir).map_err(|e| ArchiveError::io(dest_dir, e))?;

    let mut count = 0;
    for file in ArchiveReader::new(archive) {
        write_file(dest_dir, &file?)?;
        count += 1;
    }

    tracing::debug!(dest = %dest_dir.display(), count, "extracted archive");
    Ok(count)
}

fn write_file(dest_dir: &Path, file: &ArchivedFile) -> ArchiveResult<()> {
    let path = dest_dir.join(&file.name);
    std::fs::write(&path, &file.content).map_err(|e| ArchiveError::io(&path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(extracted_mode(file.mode));
        std::fs::set_permissions(&path, perms).map_err(|e| ArchiveError::io(&path, e))?;
    }
    Ok(())
}

/// Permission bits given to an extracted file: the recorded owner, group and
/// other bits, always owner read-write, never setuid, setgid or sticky.
#[cfg(unix)]
fn extracted_mode(recorded: u32) -> u32 {
    (recorded & 0o777) | crate::entry::PERMISSION_MODE
}
