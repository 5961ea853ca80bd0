use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, instrument};

use crate::path::FilePath;

use super::traits::{EntryKind, Pal, ReadSeek};

/* 📖 # Why use std::fs instead of raw syscalls or async crates?

std::fs already is the per-platform glue: stat, readdir, mkdir, rmdir, rename and copy
map onto the right primitive on every target, and its io::ErrorKind values
(AlreadyExists, CrossesDevices, DirectoryNotEmpty) are exactly the signals the handles
need to inspect. Operations are synchronous by contract, so no async runtime is involved.
*/

/// Concrete PAL implementation using the real filesystem via std::fs.
///
/// Paths are handed to the OS as they are; relative paths resolve against the process
/// working directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealPal;

impl RealPal {
    pub fn new() -> Self {
        Self
    }
}

impl Pal for RealPal {
    #[instrument(level = "trace", skip(self), fields(path = %path))]
    fn entry_kind(&self, path: &FilePath) -> Option<EntryKind> {
        let metadata = fs::metadata(path.to_std_path()).ok()?;
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        Some(kind)
    }

    fn is_symlink(&self, path: &FilePath) -> bool {
        fs::symlink_metadata(path.to_std_path())
            .map(|metadata| metadata.file_type().is_symlink())
            .unwrap_or(false)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn read_directory(&self, path: &FilePath) -> io::Result<Vec<String>> {
        let entries = fs::read_dir(path.to_std_path()).inspect_err(|e| {
            debug!(error = %e, "failed to open directory");
        })?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.inspect_err(|e| debug!(error = %e, "failed to read entry"))?;
            // A lossy name would point at a file that does not exist.
            let name = entry.file_name().into_string().map_err(|raw| {
                debug!(name = ?raw, "entry name is not valid UTF-8");
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("entry name {:?} in {} is not valid UTF-8", raw, path),
                )
            })?;
            names.push(name);
        }
        debug!(count = names.len(), "enumerated directory");
        Ok(names)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_directory(&self, path: &FilePath) -> io::Result<()> {
        fs::create_dir(path.to_std_path()).inspect_err(|e| {
            debug!(error = %e, "failed to create directory");
        })?;
        debug!("directory created");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_directory_all(&self, path: &FilePath) -> io::Result<()> {
        fs::create_dir_all(path.to_std_path()).inspect_err(|e| {
            debug!(error = %e, "failed to create directory and parents");
        })?;
        debug!("directory and parents created");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn remove_directory(&self, path: &FilePath) -> io::Result<()> {
        fs::remove_dir(path.to_std_path()).inspect_err(|e| {
            debug!(error = %e, "failed to remove directory");
        })?;
        debug!("directory removed");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn open_file(&self, path: &FilePath) -> io::Result<Box<dyn ReadSeek + 'static>> {
        let file = fs::File::open(path.to_std_path()).inspect_err(|e| {
            debug!(error = %e, "failed to open file");
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_file(&self, path: &FilePath) -> io::Result<Box<dyn Write>> {
        let file = fs::File::create(path.to_std_path()).inspect_err(|e| {
            debug!(error = %e, "failed to create file");
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn file_size(&self, path: &FilePath) -> io::Result<u64> {
        let metadata = fs::metadata(path.to_std_path()).inspect_err(|e| {
            debug!(error = %e, "failed to stat file");
        })?;
        Ok(metadata.len())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn remove_file(&self, path: &FilePath) -> io::Result<()> {
        fs::remove_file(path.to_std_path()).inspect_err(|e| {
            debug!(error = %e, "failed to remove file");
        })?;
        debug!("file removed");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    fn remove_symlink(&self, path: &FilePath) -> io::Result<()> {
        unlink(&path.to_std_path()).inspect_err(|e| {
            debug!(error = %e, "failed to remove symbolic link");
        })?;
        debug!("symbolic link removed");
        Ok(())
    }

    #[instrument(skip(self), fields(from = %from, to = %to))]
    fn rename(&self, from: &FilePath, to: &FilePath) -> io::Result<()> {
        fs::rename(from.to_std_path(), to.to_std_path()).inspect_err(|e| {
            debug!(error = %e, kind = ?e.kind(), "rename failed");
        })?;
        debug!("renamed");
        Ok(())
    }

    #[instrument(skip(self), fields(from = %from, to = %to))]
    fn copy_file(&self, from: &FilePath, to: &FilePath) -> io::Result<u64> {
        let copied = fs::copy(from.to_std_path(), to.to_std_path()).inspect_err(|e| {
            debug!(error = %e, "copy failed");
        })?;
        debug!(bytes = copied, "copied");
        Ok(copied)
    }

    fn current_directory(&self) -> Option<String> {
        env::current_dir()
            .ok()
            .map(|dir| dir.to_string_lossy().into_owned())
    }

    fn home_directory(&self) -> Option<String> {
        dirs::home_dir().map(|dir| dir.to_string_lossy().into_owned())
    }

    fn temp_directory(&self) -> Option<String> {
        Some(env::temp_dir().to_string_lossy().into_owned())
    }
}

#[cfg(windows)]
fn unlink(path: &Path) -> io::Result<()> {
    use std::os::windows::fs::FileTypeExt;

    if fs::symlink_metadata(path)?.file_type().is_symlink_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(not(windows))]
fn unlink(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}
