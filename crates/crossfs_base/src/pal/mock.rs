use std::collections::{BTreeMap, HashMap};
use std::io::{self, Cursor, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::path::FilePath;

use super::traits::{EntryKind, Pal, ReadSeek};

/* 📖 # Why an in-memory tree for MockPal?

MockPal stores the whole filesystem as a BTreeMap from path to entry:
1. **Determinism**: enumeration order is the map's sorted order, so listing and removal
   sequences can be asserted exactly
2. **Failure injection**: any operation on any path can be told to fail with a chosen
   io::ErrorKind, which is how partial removals and cross-device moves are exercised
3. **Journal**: every mutating call is recorded, so ordering guarantees such as
   "children are removed before their parent" can be checked after the fact
4. **Isolation**: no side effects on the real filesystem

Clones share the same state, like several handles onto one disk.

Symbolic links are entries of their own. Reads (kind, enumeration, open, size, copy source)
follow them, including through a linked ancestor directory. Mutations act on the literal
path and never write through a link. `remove_file` refuses a link to a directory the way
Windows does, so callers have to use `remove_symlink` for those.
*/

const MAX_LINK_HOPS: usize = 16;

/// Operations a failure can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    ReadDirectory,
    CreateDirectory,
    RemoveDirectory,
    OpenFile,
    CreateFile,
    FileSize,
    RemoveFile,
    /// Keyed on the source path.
    Rename,
    /// Keyed on the source path.
    CopyFile,
    RemoveSymlink,
}

/// A mutating call recorded by MockPal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    CreateDirectory(FilePath),
    RemoveDirectory(FilePath),
    WriteFile(FilePath),
    RemoveFile(FilePath),
    Rename { from: FilePath, to: FilePath },
    CopyFile { from: FilePath, to: FilePath },
    RemoveSymlink(FilePath),
}

#[derive(Debug, Clone)]
enum MockEntry {
    Directory,
    File(Vec<u8>),
    Symlink(FilePath),
}

#[derive(Debug)]
struct MockState {
    entries: BTreeMap<FilePath, MockEntry>,
    failures: HashMap<(FailurePoint, FilePath), io::ErrorKind>,
    journal: Vec<MockOperation>,
    current_directory: Option<String>,
    home_directory: Option<String>,
    temp_directory: Option<String>,
}

impl MockState {
    fn check_failure(&self, point: FailurePoint, path: &FilePath) -> io::Result<()> {
        match self.failures.get(&(point, path.clone())) {
            Some(kind) => Err(io::Error::new(
                *kind,
                format!("injected {:?} failure at {}", point, path),
            )),
            None => Ok(()),
        }
    }

    fn children(&self, directory: &FilePath) -> Vec<FilePath> {
        let prefix = child_prefix(directory);
        self.entries
            .keys()
            .filter(|path| {
                path.as_str()
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains(FilePath::separator()))
            })
            .cloned()
            .collect()
    }

    fn descendants(&self, directory: &FilePath) -> Vec<FilePath> {
        let prefix = child_prefix(directory);
        self.entries
            .keys()
            .filter(|path| path.as_str().len() > prefix.len() && path.as_str().starts_with(&prefix))
            .cloned()
            .collect()
    }

    /// The entry a read of `path` ends up at, with links followed, and the path it lives at.
    ///
    /// Never returns a symlink entry; dangling links and link cycles resolve to `None`.
    fn resolve(&self, path: &FilePath) -> Option<(FilePath, &MockEntry)> {
        let mut current = path.clone();
        for _ in 0..MAX_LINK_HOPS {
            match self.entries.get(&current) {
                Some(MockEntry::Symlink(target)) => current = target.clone(),
                Some(entry) => return Some((current, entry)),
                None => current = self.through_linked_ancestor(&current)?,
            }
        }
        None
    }

    /// Rewrites `path` onto the target of its nearest ancestor that is a link.
    fn through_linked_ancestor(&self, path: &FilePath) -> Option<FilePath> {
        let mut ancestor = path.parent();
        while !ancestor.is_empty() && ancestor.as_str() != "." {
            if let Some(MockEntry::Symlink(target)) = self.entries.get(&ancestor) {
                let rest = path.as_str()[ancestor.as_str().len()..]
                    .trim_start_matches(FilePath::separator());
                return Some(target.join(rest));
            }
            let next = ancestor.parent();
            if next == ancestor {
                break;
            }
            ancestor = next;
        }
        None
    }

    fn kind(&self, path: &FilePath) -> Option<EntryKind> {
        match self.resolve(path)? {
            (_, MockEntry::Directory) => Some(EntryKind::Directory),
            (_, MockEntry::File(_)) => Some(EntryKind::File),
            (_, MockEntry::Symlink(_)) => None,
        }
    }

    /// Parents of relative paths (`.` or empty) always exist.
    fn require_parent_directory(&self, path: &FilePath) -> io::Result<()> {
        let parent = path.parent();
        if parent == *path || parent.is_empty() || parent.as_str() == "." {
            return Ok(());
        }
        match self.entries.get(&parent) {
            Some(MockEntry::Directory) => Ok(()),
            Some(MockEntry::File(_)) | Some(MockEntry::Symlink(_)) => {
                Err(not_a_directory(&parent))
            }
            None => Err(not_found(&parent)),
        }
    }

    fn file(&self, path: &FilePath) -> io::Result<&Vec<u8>> {
        match self.resolve(path) {
            Some((_, MockEntry::File(content))) => Ok(content),
            Some((_, MockEntry::Directory)) => Err(is_a_directory(path)),
            Some((_, MockEntry::Symlink(_))) | None => Err(not_found(path)),
        }
    }

    fn insert_with_ancestors(&mut self, path: FilePath, entry: MockEntry) {
        let mut ancestor = path.parent();
        while ancestor != ancestor.parent() && !ancestor.is_empty() && ancestor.as_str() != "." {
            self.entries
                .entry(ancestor.clone())
                .or_insert(MockEntry::Directory);
            ancestor = ancestor.parent();
        }
        if ancestor.is_root() {
            self.entries.entry(ancestor).or_insert(MockEntry::Directory);
        }
        self.entries.insert(path, entry);
    }
}

fn child_prefix(directory: &FilePath) -> String {
    if directory.is_root() {
        directory.as_str().to_string()
    } else {
        format!("{}{}", directory, FilePath::separator())
    }
}

fn not_found(path: &FilePath) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such entry: {}", path))
}

fn not_a_directory(path: &FilePath) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotADirectory,
        format!("not a directory: {}", path),
    )
}

fn is_a_directory(path: &FilePath) -> io::Error {
    io::Error::new(
        io::ErrorKind::IsADirectory,
        format!("is a directory: {}", path),
    )
}

/// In-memory PAL implementation for testing.
///
/// Starts out with the root directory, a working directory of `/work`, a home
/// directory of `/home/mock` and a temp directory of `/tmp` (only the root exists as an
/// entry; the environment values are just strings).
///
/// # Examples
///
/// ```
/// use crossfs_base::{FilePath, MockPal, Pal};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("/docs/test.txt"), b"content".to_vec());
/// let content = mock.read_file_to_end(&FilePath::from("/docs/test.txt")).unwrap();
/// assert_eq!(content, b"content");
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    state: Arc<Mutex<MockState>>,
}

impl MockPal {
    /// Create a new MockPal holding only the root directory.
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(FilePath::root(), MockEntry::Directory);
        Self {
            state: Arc::new(Mutex::new(MockState {
                entries,
                failures: HashMap::new(),
                journal: Vec::new(),
                current_directory: Some("/work".to_string()),
                home_directory: Some("/home/mock".to_string()),
                temp_directory: Some("/tmp".to_string()),
            })),
        }
    }

    /// Add a file, creating missing parent directories. Not journaled.
    pub fn add_file(&self, path: FilePath, content: Vec<u8>) {
        self.state
            .lock()
            .insert_with_ancestors(path, MockEntry::File(content));
    }

    /// Add a directory, creating missing parent directories. Not journaled.
    pub fn add_directory(&self, path: FilePath) {
        self.state
            .lock()
            .insert_with_ancestors(path, MockEntry::Directory);
    }

    /// Add a symbolic link at `link` pointing to `target`, creating missing parent
    /// directories of the link. The target does not have to exist. Not journaled.
    pub fn add_symlink(&self, link: FilePath, target: FilePath) {
        self.state
            .lock()
            .insert_with_ancestors(link, MockEntry::Symlink(target));
    }

    /// Content of a file, if there is a file at `path`.
    pub fn file_content(&self, path: &FilePath) -> Option<Vec<u8>> {
        match self.state.lock().entries.get(path) {
            Some(MockEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    /// Number of entries, including the root.
    pub fn entry_count(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Make the next and every following `point` operation on `path` fail with `kind`.
    pub fn inject_failure(&self, point: FailurePoint, path: FilePath, kind: io::ErrorKind) {
        self.state.lock().failures.insert((point, path), kind);
    }

    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Mutating operations performed through the Pal trait, oldest first.
    pub fn journal(&self) -> Vec<MockOperation> {
        self.state.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }

    pub fn set_current_directory(&self, value: Option<&str>) {
        self.state.lock().current_directory = value.map(str::to_string);
    }

    pub fn set_home_directory(&self, value: Option<&str>) {
        self.state.lock().home_directory = value.map(str::to_string);
    }

    pub fn set_temp_directory(&self, value: Option<&str>) {
        self.state.lock().temp_directory = value.map(str::to_string);
    }
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pal for MockPal {
    fn entry_kind(&self, path: &FilePath) -> Option<EntryKind> {
        self.state.lock().kind(path)
    }

    fn is_symlink(&self, path: &FilePath) -> bool {
        matches!(
            self.state.lock().entries.get(path),
            Some(MockEntry::Symlink(_))
        )
    }

    fn read_directory(&self, path: &FilePath) -> io::Result<Vec<String>> {
        let state = self.state.lock();
        state.check_failure(FailurePoint::ReadDirectory, path)?;
        match state.resolve(path) {
            Some((resolved, MockEntry::Directory)) => Ok(state
                .children(&resolved)
                .iter()
                .map(|child| child.filename().to_string())
                .collect()),
            Some(_) => Err(not_a_directory(path)),
            None => Err(not_found(path)),
        }
    }

    fn create_directory(&self, path: &FilePath) -> io::Result<()> {
        let mut state = self.state.lock();
        state.check_failure(FailurePoint::CreateDirectory, path)?;
        if state.entries.contains_key(path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("already exists: {}", path),
            ));
        }
        state.require_parent_directory(path)?;
        state.entries.insert(path.clone(), MockEntry::Directory);
        state
            .journal
            .push(MockOperation::CreateDirectory(path.clone()));
        Ok(())
    }

    fn create_directory_all(&self, path: &FilePath) -> io::Result<()> {
        let mut state = self.state.lock();
        state.check_failure(FailurePoint::CreateDirectory, path)?;
        let mut missing = Vec::new();
        let mut current = path.clone();
        loop {
            match state.entries.get(&current) {
                Some(MockEntry::Directory) => break,
                Some(MockEntry::Symlink(_))
                    if state.kind(&current) == Some(EntryKind::Directory) =>
                {
                    break;
                }
                Some(_) => return Err(not_a_directory(&current)),
                None => {
                    missing.push(current.clone());
                    let parent = current.parent();
                    if parent == current || parent.is_empty() || parent.as_str() == "." {
                        break;
                    }
                    current = parent;
                }
            }
        }
        for directory in missing.into_iter().rev() {
            state.entries.insert(directory.clone(), MockEntry::Directory);
            state.journal.push(MockOperation::CreateDirectory(directory));
        }
        Ok(())
    }

    fn remove_directory(&self, path: &FilePath) -> io::Result<()> {
        let mut state = self.state.lock();
        state.check_failure(FailurePoint::RemoveDirectory, path)?;
        match state.entries.get(path) {
            Some(MockEntry::Directory) => {}
            Some(_) => return Err(not_a_directory(path)),
            None => return Err(not_found(path)),
        }
        if !state.children(path).is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::DirectoryNotEmpty,
                format!("directory not empty: {}", path),
            ));
        }
        state.entries.remove(path);
        state
            .journal
            .push(MockOperation::RemoveDirectory(path.clone()));
        Ok(())
    }

    fn open_file(&self, path: &FilePath) -> io::Result<Box<dyn ReadSeek + 'static>> {
        let state = self.state.lock();
        state.check_failure(FailurePoint::OpenFile, path)?;
        let content = state.file(path)?.clone();
        Ok(Box::new(Cursor::new(content)))
    }

    fn create_file(&self, path: &FilePath) -> io::Result<Box<dyn Write>> {
        let mut state = self.state.lock();
        state.check_failure(FailurePoint::CreateFile, path)?;
        if let Some(MockEntry::Directory) = state.entries.get(path) {
            return Err(is_a_directory(path));
        }
        state.require_parent_directory(path)?;
        state
            .entries
            .insert(path.clone(), MockEntry::File(Vec::new()));
        state.journal.push(MockOperation::WriteFile(path.clone()));
        // Return a writer that will store in the mock storage when dropped
        Ok(Box::new(MockFileWriter {
            path: path.clone(),
            state: Arc::clone(&self.state),
            buffer: Vec::new(),
        }))
    }

    fn file_size(&self, path: &FilePath) -> io::Result<u64> {
        let state = self.state.lock();
        state.check_failure(FailurePoint::FileSize, path)?;
        Ok(state.file(path)?.len() as u64)
    }

    fn remove_file(&self, path: &FilePath) -> io::Result<()> {
        let mut state = self.state.lock();
        state.check_failure(FailurePoint::RemoveFile, path)?;
        match state.entries.get(path) {
            Some(MockEntry::File(_)) => {}
            Some(MockEntry::Symlink(_)) if state.kind(path) != Some(EntryKind::Directory) => {}
            Some(_) => return Err(is_a_directory(path)),
            None => return Err(not_found(path)),
        }
        state.entries.remove(path);
        state.journal.push(MockOperation::RemoveFile(path.clone()));
        Ok(())
    }

    fn remove_symlink(&self, path: &FilePath) -> io::Result<()> {
        let mut state = self.state.lock();
        state.check_failure(FailurePoint::RemoveSymlink, path)?;
        match state.entries.get(path) {
            Some(MockEntry::Symlink(_)) => {}
            Some(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("not a symbolic link: {}", path),
                ));
            }
            None => return Err(not_found(path)),
        }
        state.entries.remove(path);
        state
            .journal
            .push(MockOperation::RemoveSymlink(path.clone()));
        Ok(())
    }

    fn rename(&self, from: &FilePath, to: &FilePath) -> io::Result<()> {
        let mut state = self.state.lock();
        state.check_failure(FailurePoint::Rename, from)?;
        let entry = state.entries.get(from).cloned().ok_or_else(|| not_found(from))?;
        state.require_parent_directory(to)?;
        let descendants = state.descendants(from);
        state.entries.remove(from);
        state.entries.insert(to.clone(), entry);
        let from_prefix = from.as_str().len();
        for descendant in descendants {
            if let Some(moved) = state.entries.remove(&descendant) {
                let renamed = FilePath::new(format!(
                    "{}{}",
                    to,
                    &descendant.as_str()[from_prefix..]
                ));
                state.entries.insert(renamed, moved);
            }
        }
        state.journal.push(MockOperation::Rename {
            from: from.clone(),
            to: to.clone(),
        });
        Ok(())
    }

    fn copy_file(&self, from: &FilePath, to: &FilePath) -> io::Result<u64> {
        let mut state = self.state.lock();
        state.check_failure(FailurePoint::CopyFile, from)?;
        let content = state.file(from)?.clone();
        if let Some(MockEntry::Directory) = state.entries.get(to) {
            return Err(is_a_directory(to));
        }
        state.require_parent_directory(to)?;
        let copied = content.len() as u64;
        state.entries.insert(to.clone(), MockEntry::File(content));
        state.journal.push(MockOperation::CopyFile {
            from: from.clone(),
            to: to.clone(),
        });
        Ok(copied)
    }

    fn current_directory(&self) -> Option<String> {
        self.state.lock().current_directory.clone()
    }

    fn home_directory(&self) -> Option<String> {
        self.state.lock().home_directory.clone()
    }

    fn temp_directory(&self) -> Option<String> {
        self.state.lock().temp_directory.clone()
    }
}

/// Helper struct for writing files to MockPal.
struct MockFileWriter {
    path: FilePath,
    state: Arc<Mutex<MockState>>,
    buffer: Vec<u8>,
}

impl Write for MockFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl MockFileWriter {
    fn commit(&self) {
        self.state
            .lock()
            .entries
            .insert(self.path.clone(), MockEntry::File(self.buffer.clone()));
    }
}

impl Drop for MockFileWriter {
    fn drop(&mut self) {
        self.commit();
    }
}
