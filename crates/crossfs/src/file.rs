use std::fmt;
use std::io::{self, Write};

use crossfs_base::{CrossfsError, CrossfsResult, ErrorKind, FilePath, PalHandle};
use tracing::{debug, instrument};

/// A handle to a file path.
///
/// Like [`Directory`](crate::Directory), a `File` is only a path plus the platform layer
/// to resolve it with. Nothing is cached between calls.
///
/// # Examples
///
/// ```no_run
/// use crossfs::File;
///
/// let notes = File::new("notes/today.txt");
/// notes.write_text("hello").unwrap();
/// assert_eq!(notes.read_text().unwrap(), "hello");
/// let archived = notes.move_to("archive/today.txt").unwrap();
/// assert!(!notes.exists());
/// assert!(archived.exists());
/// ```
#[derive(Clone)]
pub struct File {
    path: FilePath,
    pal: PalHandle,
}

impl File {
    /// A file on the real filesystem.
    pub fn new(path: impl Into<FilePath>) -> Self {
        Self::with_pal(path, PalHandle::real())
    }

    pub fn with_pal(path: impl Into<FilePath>, pal: PalHandle) -> Self {
        Self {
            path: path.into(),
            pal,
        }
    }

    pub fn path(&self) -> &FilePath {
        &self.path
    }

    /// True if something exists at the path and it is a regular file.
    pub fn exists(&self) -> bool {
        self.path.is_file_in(&*self.pal)
    }

    /// Size in bytes.
    pub fn size(&self) -> CrossfsResult<u64> {
        self.pal
            .file_size(&self.path)
            .map_err(|source| self.failure(|path| ErrorKind::FileSizeUnavailable { path, source }))
    }

    pub fn read_binary(&self) -> CrossfsResult<Vec<u8>> {
        self.pal
            .read_file_to_end(&self.path)
            .map_err(|source| self.failure(|path| ErrorKind::FileReadFailed { path, source }))
    }

    /// Reads the whole file as UTF-8.
    pub fn read_text(&self) -> CrossfsResult<String> {
        let bytes = self.read_binary()?;
        String::from_utf8(bytes).map_err(|e| {
            let source = io::Error::new(io::ErrorKind::InvalidData, e);
            self.failure(|path| ErrorKind::FileReadFailed { path, source })
        })
    }

    /// Replaces the content of the file, creating it if needed.
    #[instrument(skip(self, content), fields(path = %self.path, bytes = content.len()))]
    pub fn write_binary(&self, content: &[u8]) -> CrossfsResult<()> {
        self.write_all(content)
            .map_err(|source| self.failure(|path| ErrorKind::FileWriteFailed { path, source }))
    }

    pub fn write_text(&self, content: &str) -> CrossfsResult<()> {
        self.write_binary(content.as_bytes())
    }

    fn write_all(&self, content: &[u8]) -> io::Result<()> {
        let mut writer = self.pal.create_file(&self.path)?;
        writer.write_all(content)?;
        writer.flush()
    }

    /// Copies the content to `to`, replacing whatever file is there, and returns a handle
    /// to the copy.
    #[instrument(skip(self, to), fields(from = %self.path))]
    pub fn copy(&self, to: impl Into<FilePath>) -> CrossfsResult<File> {
        let to = to.into();
        let copied = self.pal.copy_file(&self.path, &to).map_err(|source| {
            ErrorKind::FileCopyFailed {
                from: self.path.clone(),
                to: to.clone(),
                source,
            }
        })?;
        debug!(to = %to, bytes = copied, "file copied");
        Ok(self.sibling(to))
    }

    /// Moves the file to `to` and returns a handle to the new location.
    ///
    /// The move is an atomic rename where possible. Only when the rename is refused
    /// because source and destination are on different devices does it fall back to
    /// copying and then removing the source; the source is only removed once the full
    /// content has been copied.
    #[instrument(skip(self, to), fields(from = %self.path))]
    pub fn move_to(&self, to: impl Into<FilePath>) -> CrossfsResult<File> {
        let to = to.into();
        match self.pal.rename(&self.path, &to) {
            Ok(()) => debug!(to = %to, "file renamed"),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                debug!(to = %to, "rename crosses devices, copying instead");
                self.copy_then_remove(&to)
                    .map_err(|source| self.move_failure(&to, source))?;
            }
            Err(source) => return Err(self.move_failure(&to, source)),
        }
        Ok(self.sibling(to))
    }

    fn copy_then_remove(&self, to: &FilePath) -> io::Result<()> {
        let expected = self.pal.file_size(&self.path)?;
        let copied = self.pal.copy_file(&self.path, to)?;
        if copied != expected {
            return Err(io::Error::other(format!(
                "copied {} of {} bytes, source kept",
                copied, expected
            )));
        }
        self.pal.remove_file(&self.path)
    }

    pub fn remove(&self) -> CrossfsResult<()> {
        self.pal
            .remove_file(&self.path)
            .map_err(|source| self.failure(|path| ErrorKind::FileRemoveFailed { path, source }))
    }

    fn sibling(&self, path: FilePath) -> File {
        File::with_pal(path, self.pal.clone())
    }

    fn failure(&self, kind: impl FnOnce(FilePath) -> ErrorKind) -> Box<CrossfsError> {
        let kind = kind(self.path.clone());
        debug!(error = %kind, "file operation failed");
        kind.into()
    }

    fn move_failure(&self, to: &FilePath, source: io::Error) -> Box<CrossfsError> {
        debug!(to = %to, error = %source, "move failed");
        ErrorKind::FileMoveFailed {
            from: self.path.clone(),
            to: to.clone(),
            source,
        }
        .into()
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("File").field(&self.path).finish()
    }
}
