use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;

use log::debug;

use crate::error::SetupError;

pub enum DirEntryCategory {
    DoesNotExist,
    RegularFile,
    Directory,
    Unknown,
}

pub fn classify_file(path: &Path) -> DirEntryCategory {
    match fs::metadata(path) {
        Ok(metadata) => {
            if metadata.is_file() {
                DirEntryCategory::RegularFile
            } else if metadata.is_dir() {
                DirEntryCategory::Directory
            } else {
                DirEntryCategory::Unknown
            }
        },
        Err(_) => DirEntryCategory::DoesNotExist,
    }
}

/// Creates `path` unless it is already a directory. Returns whether it was created.
pub fn ensure_dir(path: &Path) -> Result<bool, SetupError> {
    match classify_file(path) {
        DirEntryCategory::Directory => Ok(false),
        DirEntryCategory::DoesNotExist => {
            debug!("creating {:?}", path);
            fs::create_dir_all(path)
                .map(|_| true)
                .map_err(|e| SetupError::for_path(path, &format!("cannot create directory ({e})")))
        },
        DirEntryCategory::RegularFile => Err(SetupError::for_path(path, "is a regular file, expected a directory")),
        DirEntryCategory::Unknown => Err(SetupError::for_path(path, "unable to classify")),
    }
}

/// Names of the regular files in `dir` ending with `extension`, sorted.
/// Names are kept as the OS reports them, valid unicode or not.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<OsString>, SetupError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| SetupError::for_path(dir, &format!("cannot list directory ({e})")))?;
    let mut names: Vec<OsString> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
        .map(|e| e.file_name())
        .filter(|name| name.as_encoded_bytes().ends_with(extension.as_bytes()))
        .collect();
    names.sort();
    Ok(names)
}

/// Swaps the last extension of `file_name` for `extension` (which carries its dot).
pub fn output_file_name(file_name: &OsStr, extension: &str) -> OsString {
    let mut out = match Path::new(file_name).file_stem() {
        Some(stem) => stem.to_os_string(),
        None => file_name.to_os_string(),
    };
    out.push(extension);
    out
}
