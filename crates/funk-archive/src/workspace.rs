use std::path::Path;

use walkdir::WalkDir;

/// Extension of the configuration files collected by default.
pub const DEFAULT_EXTENSION: &str = "tf";

/// List base names of the regular files directly inside `dir` whose
/// extension is `extension`, sorted by name.
///
/// Never fails: a missing directory or unreadable entry is logged and
/// skipped, so an empty workspace simply yields an empty list.
pub fn list_workspace(dir: &Path, extension: &str) -> Vec<String> {
    let extension = extension.trim_start_matches('.');
    let mut names = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("skipping workspace entry in {:?}: {}", dir, e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == extension) {
            match entry.file_name().to_str() {
                Some(name) => names.push(name.to_string()),
                None => tracing::warn!("skipping non UTF-8 file name {:?}", path),
            }
        }
    }

    tracing::debug!(dir = %dir.display(), matches = names.len(), "listed workspace");
    names
}
