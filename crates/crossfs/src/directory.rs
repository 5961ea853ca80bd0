use std::fmt;
use std::io;

use crossfs_base::{CrossfsResult, ErrorKind, FilePath, PalHandle};
use tracing::{debug, instrument};

use crate::traversal;

/// A handle to a directory path.
///
/// The handle holds no OS resources; every call asks the platform layer afresh.
///
/// # Examples
///
/// ```no_run
/// use crossfs::Directory;
///
/// let scratch = Directory::new("/tmp/scratch");
/// scratch.create().unwrap();
/// for entry in scratch.list(true) {
///     println!("{}", entry);
/// }
/// scratch.remove(true).unwrap();
/// ```
#[derive(Clone)]
pub struct Directory {
    path: FilePath,
    pal: PalHandle,
}

impl Directory {
    /// A directory on the real filesystem.
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

    /// True if something exists at the path and it is a directory.
    pub fn exists(&self) -> bool {
        self.path.is_directory_in(&*self.pal)
    }

    /// Creates the directory. The parent has to exist.
    ///
    /// Succeeds without doing anything if the directory already exists.
    #[instrument(skip(self), fields(path = %self.path))]
    pub fn create(&self) -> CrossfsResult<()> {
        let result = self.pal.create_directory(&self.path);
        self.accept_existing(result)
    }

    /// Creates the directory along with any missing ancestors.
    #[instrument(skip(self), fields(path = %self.path))]
    pub fn create_all(&self) -> CrossfsResult<()> {
        let result = self.pal.create_directory_all(&self.path);
        self.accept_existing(result)
    }

    // A file squatting on the path is still a failure.
    fn accept_existing(&self, result: io::Result<()>) -> CrossfsResult<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.exists() => {
                debug!("directory already exists");
                Ok(())
            }
            Err(source) => Err(ErrorKind::DirectoryCreateFailed {
                path: self.path.clone(),
                source,
            }
            .into()),
        }
    }

    /// Removes the directory.
    ///
    /// Without `recursive` the directory has to be empty. With `recursive` everything
    /// below it is removed first; the first failure stops the removal and leaves the rest
    /// of the tree in place. Removing a directory that does not exist is an error.
    pub fn remove(&self, recursive: bool) -> CrossfsResult<()> {
        if recursive {
            return traversal::remove_tree(&*self.pal, &self.path);
        }
        self.pal.remove_directory(&self.path).map_err(|source| {
            ErrorKind::DirectoryRemoveFailed {
                path: self.path.clone(),
                source,
            }
            .into()
        })
    }

    /// Paths of the entries below this directory, directories before their contents.
    ///
    /// A missing or unreadable directory lists as empty.
    pub fn list(&self, recursive: bool) -> Vec<FilePath> {
        traversal::list_entries(&*self.pal, &self.path, recursive)
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Directory").field(&self.path).finish()
    }
}
