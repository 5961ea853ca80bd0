/* 📖 # Why thin handles instead of an open-file object?

`File` and `Directory` wrap nothing but a normalized path and the platform layer. No
descriptor is kept open and nothing is cached, so a handle can outlive renames, deletions
and other processes touching the same path: every call asks the OS what is there now.
Single-file operations pass straight through to the platform layer. The only logic of its
own lives in `traversal` (recursive listing and removal) and in the cross-device fallback
of `File::move_to`.
*/

mod directory;
mod file;
pub mod traversal;

pub use directory::Directory;
pub use file::File;
pub use traversal::{list_entries, remove_tree};

pub use crossfs_base::{
    CrossfsError, CrossfsResult, EntryKind, ErrorKind, FilePath, Pal, PalHandle,
};
