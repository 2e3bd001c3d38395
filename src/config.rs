use crate::error::DetfileError;
use std::path::{Path, PathBuf};

/// File names searched for in the current directory when no detfile is named explicitly, in order
/// of preference.
pub const DETFILE_NAMES: [&str; 2] = ["detfile.yaml", "detfile.yml"];

/// Returns the path to the detfile that should be loaded.
///
/// If `explicit` is provided, it is the only candidate. Otherwise, each of [DETFILE_NAMES] is
/// tried in the current directory.
///
/// # Errors
///
/// Returns [DetfileError::MissingConfiguration] if no candidate exists. When searching the current
/// directory, the error names the preferred file name.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf, DetfileError> {
    locate_in(Path::new("."), explicit)
}

/// [locate], relative to `dir` instead of the current directory.
pub fn locate_in(dir: &Path, explicit: Option<&Path>) -> Result<PathBuf, DetfileError> {
    if let Some(path) = explicit {
        let path = dir.join(path);
        return match path.is_file() {
            true => Ok(path),
            false => Err(DetfileError::MissingConfiguration(path)),
        };
    }

    DETFILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| DetfileError::MissingConfiguration(dir.join(DETFILE_NAMES[0])))
}
