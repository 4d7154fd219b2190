//! Log directory preparation and log file maintenance.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extension of files handled by reset and cleanup.
pub const LOG_EXTENSION: &str = "log";

/// Mode of the per-subsystem log directories.
pub const LOG_DIR_MODE: u32 = 0o777;

/// Mode of the pre-created log files.
pub const LOG_FILE_MODE: u32 = 0o666;

/// All `*.log` files below `root`, recursively. A missing root yields none;
/// a root that is not a directory is an error.
pub fn find_log_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    match fs::read_dir(root) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry?;
        let is_log = entry.path().extension().is_some_and(|ext| ext == LOG_EXTENSION);
        if entry.file_type().is_file() && is_log {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Cut a file to zero length, keeping the file.
pub fn truncate_file(path: &Path) -> io::Result<()> {
    OpenOptions::new().write(true).open(path)?.set_len(0)
}

/// Remove a file. A file that is already gone is not an error.
pub fn remove_file(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Create `<log_path>/<name>/` and touch `<name>.log` inside it, leaving
/// existing content alone. Returns the log file path.
pub fn prepare_log_subdir(log_path: &Path, name: &str) -> io::Result<PathBuf> {
    let dir = log_path.join(name);
    fs::create_dir_all(&dir)?;
    set_mode(&dir, LOG_DIR_MODE)?;

    let file = dir.join(format!("{}.{}", name, LOG_EXTENSION));
    OpenOptions::new().create(true).append(true).open(&file)?;
    set_mode(&file, LOG_FILE_MODE)?;
    Ok(file)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
