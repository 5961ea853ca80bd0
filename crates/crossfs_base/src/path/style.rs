use std::fmt::Debug;
use std::hash::Hash;

/// Platform rules for path normalization.
///
/// Both `/` and `\` are accepted as separators on input; a style decides which one
/// paths are normalized to and how the parent of a separator-free path is spelled.
pub trait PathStyle:
    Copy + Default + Debug + Eq + Ord + Hash + Send + Sync + 'static
{
    /// The canonical separator every input separator is replaced with.
    const SEPARATOR: char;

    /// Parent of a path that contains no separator at all.
    const BARE_PARENT: &'static str;

    /// Parent of a path whose only separator is the leading one, such as `/etc`.
    const ROOT_CHILD_PARENT: &'static str;

    /// Whether `c` is accepted as a separator on input.
    fn is_separator(c: char) -> bool {
        c == '/' || c == '\\'
    }
}

/// Forward slashes; the parent of `name` is `.` and the parent of `/etc` is `/`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnixStyle;

impl PathStyle for UnixStyle {
    const SEPARATOR: char = '/';
    const BARE_PARENT: &'static str = ".";
    const ROOT_CHILD_PARENT: &'static str = "/";
}

/// Backslashes; the parent of `name` and of `\Windows` is the empty path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowsStyle;

impl PathStyle for WindowsStyle {
    const SEPARATOR: char = '\\';
    const BARE_PARENT: &'static str = "";
    const ROOT_CHILD_PARENT: &'static str = "";
}

#[cfg(windows)]
pub type NativeStyle = WindowsStyle;

#[cfg(not(windows))]
pub type NativeStyle = UnixStyle;
