/* 📖 # Why explicit work stacks instead of recursion?

Both listing and removal are naturally recursive: list a directory, then list each child
directory right after it; remove every child, then the directory itself. Written as
recursive functions, the call stack grows with the depth of the tree. Here each level is a
frame on a Vec instead, holding the children not yet visited. The top frame is always the
directory currently being worked on, so the visiting order is exactly the recursive one:
- listing emits an entry and then pushes its children, which yields pre-order
- removal pops a frame only once its children are exhausted, so every directory is
  removed after all of its children
*/

use std::vec;

use crossfs_base::{CrossfsResult, ErrorKind, FilePath, Pal, ResultExt};
use tracing::{debug, instrument, trace};

/// Immediate children of `directory`, joined onto it.
///
/// A directory that is missing or cannot be opened has no children.
pub(crate) fn children(pal: &dyn Pal, directory: &FilePath) -> Vec<FilePath> {
    let names = match pal.read_directory(directory) {
        Ok(names) => names,
        Err(e) => {
            debug!(path = %directory, error = %e, "directory not enumerable, treating as empty");
            return Vec::new();
        }
    };
    names
        .into_iter()
        .filter(|name| name != "." && name != "..")
        .map(|name| directory.join(name))
        .collect()
}

/// Lists the entries below `root`.
///
/// Without `recursive` this is the enumeration order of `root` itself. With `recursive`
/// every directory is followed immediately by its own listing. Symbolic links to
/// directories are followed and there is no cycle detection.
#[instrument(skip(pal), fields(root = %root))]
pub fn list_entries(pal: &dyn Pal, root: &FilePath, recursive: bool) -> Vec<FilePath> {
    let mut entries = Vec::new();
    let mut pending: Vec<vec::IntoIter<FilePath>> = vec![children(pal, root).into_iter()];

    while let Some(frame) = pending.last_mut() {
        let Some(entry) = frame.next() else {
            pending.pop();
            continue;
        };
        trace!(path = %entry, "visiting");
        let nested = (recursive && entry.is_directory_in(pal)).then(|| children(pal, &entry));
        entries.push(entry);
        if let Some(nested) = nested {
            pending.push(nested.into_iter());
        }
    }

    debug!(count = entries.len(), "listed entries");
    entries
}

struct RemovalFrame {
    directory: FilePath,
    remaining: vec::IntoIter<FilePath>,
}

impl RemovalFrame {
    fn new(pal: &dyn Pal, directory: FilePath) -> Self {
        let remaining = children(pal, &directory).into_iter();
        Self {
            directory,
            remaining,
        }
    }
}

/// Removes `root` and everything below it, children before parents.
///
/// The first failure stops the removal and is returned; whatever was not yet removed stays
/// in place. A symbolic link is removed as a link, never descended into; that includes
/// `root` itself, in which case only the link goes and its target is left alone.
#[instrument(skip(pal), fields(root = %root))]
pub fn remove_tree(pal: &dyn Pal, root: &FilePath) -> CrossfsResult<()> {
    let result: CrossfsResult<()> = if pal.is_symlink(root) {
        debug!("root is a symbolic link, removing the link only");
        pal.remove_symlink(root).map_err(|source| {
            ErrorKind::DirectoryRemoveFailed {
                path: root.clone(),
                source,
            }
            .into()
        })
    } else {
        remove_frames(pal, root)
    };
    result.with_context(|| format!("removing directory tree {}", root))
}

fn remove_frames(pal: &dyn Pal, root: &FilePath) -> CrossfsResult<()> {
    let mut removed = 0usize;
    let mut pending = vec![RemovalFrame::new(pal, root.clone())];

    while let Some(frame) = pending.last_mut() {
        match frame.remaining.next() {
            Some(child) if pal.is_symlink(&child) => {
                trace!(path = %child, "removing symbolic link");
                pal.remove_symlink(&child).map_err(|source| {
                    debug!(path = %child, error = %source, "link removal failed");
                    ErrorKind::FileRemoveFailed {
                        path: child.clone(),
                        source,
                    }
                })?;
                removed += 1;
            }
            Some(child) if child.is_directory_in(pal) => {
                pending.push(RemovalFrame::new(pal, child));
            }
            Some(child) => {
                trace!(path = %child, "removing file");
                pal.remove_file(&child).map_err(|source| {
                    debug!(path = %child, error = %source, "file removal failed");
                    ErrorKind::FileRemoveFailed {
                        path: child.clone(),
                        source,
                    }
                })?;
                removed += 1;
            }
            None => {
                let directory = frame.directory.clone();
                trace!(path = %directory, "removing directory");
                pal.remove_directory(&directory).map_err(|source| {
                    debug!(path = %directory, error = %source, "directory removal failed");
                    ErrorKind::DirectoryRemoveFailed {
                        path: directory.clone(),
                        source,
                    }
                })?;
                removed += 1;
                pending.pop();
            }
        }
    }

    debug!(removed, "directory tree removed");
    Ok(())
}
