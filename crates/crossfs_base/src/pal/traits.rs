use std::io::{self, Read, Seek, Write};
use std::sync::Arc;

use crate::path::FilePath;

/// Trait combining Read + Seek for file operations.
///
/// This trait enables returning opaque file handles that support both reading
/// and seeking, useful for different implementations (real files, in-memory buffers, etc.)
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// What a path refers to, after following symbolic links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    /// Anything else: sockets, fifos, devices.
    Other,
}

impl EntryKind {
    pub fn is_file(self) -> bool {
        self == EntryKind::File
    }

    pub fn is_directory(self) -> bool {
        self == EntryKind::Directory
    }
}

/* 📖 # Why does Pal return io::Result instead of CrossfsResult?

The same OS failure means different things to different callers. "Already exists" is
success for Directory::create, and "crosses devices" triggers the copy fallback in
File::move_to. Returning the raw io::Error lets those callers inspect io::ErrorKind and
decide, and only then wrap the failure in the ErrorKind naming their operation.
*/

/// Platform Abstraction Layer trait providing the OS primitives crossfs is built on.
///
/// Two implementations are provided:
/// - `RealPal`: Uses the real filesystem via `std::fs`
/// - `MockPal`: In-memory implementation for testing
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Stat `path`, following symbolic links. `None` if nothing is there.
    fn entry_kind(&self, path: &FilePath) -> Option<EntryKind>;

    /// Whether `path` itself is a symbolic link.
    fn is_symlink(&self, path: &FilePath) -> bool;

    /// Names of the immediate children of a directory, in enumeration order.
    fn read_directory(&self, path: &FilePath) -> io::Result<Vec<String>>;

    /// Create a single directory; the parent must exist.
    fn create_directory(&self, path: &FilePath) -> io::Result<()>;

    /// Create a directory and all missing parents.
    fn create_directory_all(&self, path: &FilePath) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_directory(&self, path: &FilePath) -> io::Result<()>;

    /// Open a file for reading.
    fn open_file(&self, path: &FilePath) -> io::Result<Box<dyn ReadSeek + 'static>>;

    /// Read the entire file.
    ///
    /// This is a convenience method with a default implementation on top of `open_file`.
    fn read_file_to_end(&self, path: &FilePath) -> io::Result<Vec<u8>> {
        let mut reader = self.open_file(path)?;
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Create a file, truncating it if it exists.
    fn create_file(&self, path: &FilePath) -> io::Result<Box<dyn Write>>;

    /// Size of the file in bytes.
    fn file_size(&self, path: &FilePath) -> io::Result<u64>;

    /// Remove a regular file.
    fn remove_file(&self, path: &FilePath) -> io::Result<()>;

    /// Remove a symbolic link itself, leaving its target untouched.
    ///
    /// Windows needs a directory removal for links to directories (and junctions) and a
    /// file removal for everything else; Unix unlinks either kind.
    fn remove_symlink(&self, path: &FilePath) -> io::Result<()>;

    /// Atomic rename. Fails with `io::ErrorKind::CrossesDevices` across volumes.
    fn rename(&self, from: &FilePath, to: &FilePath) -> io::Result<()>;

    /// Copy file contents, returning the number of bytes written to `to`.
    fn copy_file(&self, from: &FilePath, to: &FilePath) -> io::Result<u64>;

    /// The process working directory, if the OS reports one.
    fn current_directory(&self) -> Option<String>;

    /// The user's home directory, if the environment or user database has one.
    fn home_directory(&self) -> Option<String>;

    /// The system temporary directory, if the OS reports one.
    fn temp_directory(&self) -> Option<String>;
}

/* 📖 # Why use Arc<dyn Pal> with PalHandle?

File and Directory handles each carry the PAL they resolve against. Arc makes that
cheap to clone and share, and PalHandle wraps it for ergonomic Deref access.
This pattern avoids lifetime parameters on the handles.
*/

/// Handle to a PAL implementation, enabling shared ownership.
///
/// # Examples
///
/// ```
/// use crossfs_base::{MockPal, PalHandle};
///
/// let pal = PalHandle::new(MockPal::new());
/// let pal_clone = pal.clone(); // Cheap clone, shares the same implementation
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }

    /// A handle to the real filesystem.
    pub fn real() -> Self {
        Self::new(super::RealPal::new())
    }
}

impl Default for PalHandle {
    fn default() -> Self {
        Self::real()
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_predicates() {
        assert!(EntryKind::File.is_file());
        assert!(!EntryKind::File.is_directory());
        assert!(EntryKind::Directory.is_directory());
        assert!(!EntryKind::Other.is_file());
        assert!(!EntryKind::Other.is_directory());
    }

    #[test]
    fn test_pal_handle_clone_shares_state() {
        use crate::pal::mock::MockPal;
        let mock = MockPal::new();
        let pal = PalHandle::new(mock.clone());
        let pal_clone = pal.clone();

        mock.add_file(FilePath::from("/shared.txt"), b"x".to_vec());
        assert_eq!(
            pal_clone.entry_kind(&FilePath::from("/shared.txt")),
            Some(EntryKind::File)
        );
    }
}
