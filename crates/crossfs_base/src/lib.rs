/* 📖 # Why have crossfs_base as a separate crate?
crossfs_base holds everything the filesystem handles are built on: the error type, the
tracing setup, the normalized path value and the platform abstraction layer (PAL).
Keeping these apart from the File/Directory handles lets the PAL and the path model be
tested on their own, and lets a consumer plug in its own Pal without pulling the handles.
*/

pub mod error;
mod error_tests;
pub mod pal;
pub mod path;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{CrossfsError, CrossfsResult, ErrorKind, ResultExt, WellKnownDirectory};
pub use pal::{
    EntryKind, FailurePoint, MockOperation, MockPal, Pal, PalHandle, ReadSeek, RealPal,
};
pub use path::{FilePath, NativeStyle, PathStyle, StyledPath, UnixStyle, WindowsStyle};
