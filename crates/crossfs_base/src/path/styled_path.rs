use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CrossfsResult, ErrorKind, WellKnownDirectory};
use crate::pal::{EntryKind, Pal, RealPal};

use super::style::{NativeStyle, PathStyle};

/// An immutable, separator-normalized path string.
///
/// Construction replaces every `/` and `\` with the style's separator and strips one
/// trailing separator unless the path is the root itself. Nothing else is touched:
/// `.` and `..` segments and repeated separators are kept verbatim, so this is not a
/// resolving path type.
///
/// # Examples
///
/// ```
/// use crossfs_base::{StyledPath, UnixStyle, WindowsStyle};
///
/// let unix = StyledPath::<UnixStyle>::new("a\\b/c.txt/");
/// assert_eq!(unix.as_str(), "a/b/c.txt");
/// assert_eq!(unix.extension(), ".txt");
///
/// let windows = StyledPath::<WindowsStyle>::new("a/b");
/// assert_eq!(windows.as_str(), "a\\b");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StyledPath<S: PathStyle> {
    normalized: String,
    style: PhantomData<S>,
}

/// A path normalized with the rules of the platform this crate was built for.
pub type FilePath = StyledPath<NativeStyle>;

impl<S: PathStyle> StyledPath<S> {
    /// Normalizes `raw`. Never fails; the empty string is a valid (empty) path.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let mut normalized: String = raw
            .as_ref()
            .chars()
            .map(|c| if S::is_separator(c) { S::SEPARATOR } else { c })
            .collect();
        if normalized.len() > 1 && normalized.ends_with(S::SEPARATOR) {
            normalized.pop();
        }
        Self {
            normalized,
            style: PhantomData,
        }
    }

    /// The filesystem root, i.e. the separator alone.
    pub fn root() -> Self {
        Self::new(S::SEPARATOR.to_string())
    }

    /// The canonical separator of this style.
    pub fn separator() -> char {
        S::SEPARATOR
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.normalized.len() == 1 && self.normalized.ends_with(S::SEPARATOR)
    }

    /// Everything after the last separator, or the whole path if there is none.
    pub fn filename(&self) -> &str {
        match self.normalized.rfind(S::SEPARATOR) {
            Some(index) => &self.normalized[index + 1..],
            None => &self.normalized,
        }
    }

    /// The filename from its last `.` on, including the dot; empty without a dot.
    ///
    /// A dot file such as `.bashrc` is its own extension.
    pub fn extension(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(index) => &filename[index..],
            None => "",
        }
    }

    /// Everything before the last separator.
    ///
    /// A path without separators yields the style's bare parent (`.` or empty). A path
    /// whose only separator is the leading one yields the root under Unix rules and the
    /// empty path under Windows rules.
    pub fn parent(&self) -> Self {
        match self.normalized.rfind(S::SEPARATOR) {
            None => Self::new(S::BARE_PARENT),
            Some(0) => Self::new(S::ROOT_CHILD_PARENT),
            Some(index) => Self::new(&self.normalized[..index]),
        }
    }

    /// Appends `name` after a separator.
    ///
    /// An empty path joins to `name` itself and the root does not get a doubled separator.
    pub fn join(&self, name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        if self.normalized.is_empty() {
            Self::new(name)
        } else if self.normalized.ends_with(S::SEPARATOR) {
            Self::new(format!("{}{}", self.normalized, name))
        } else {
            Self::new(format!("{}{}{}", self.normalized, S::SEPARATOR, name))
        }
    }

    /// The path as handed to the operating system.
    pub fn to_std_path(&self) -> PathBuf {
        PathBuf::from(&self.normalized)
    }
}

impl FilePath {
    /// The process working directory.
    pub fn current_directory() -> CrossfsResult<Self> {
        Self::current_directory_in(&RealPal::new())
    }

    /// The user's home directory.
    pub fn home_directory() -> CrossfsResult<Self> {
        Self::home_directory_in(&RealPal::new())
    }

    /// The system temporary directory.
    pub fn temp_directory() -> CrossfsResult<Self> {
        Self::temp_directory_in(&RealPal::new())
    }

    pub fn current_directory_in(pal: &dyn Pal) -> CrossfsResult<Self> {
        Self::well_known(WellKnownDirectory::Current, pal.current_directory())
    }

    pub fn home_directory_in(pal: &dyn Pal) -> CrossfsResult<Self> {
        Self::well_known(WellKnownDirectory::Home, pal.home_directory())
    }

    pub fn temp_directory_in(pal: &dyn Pal) -> CrossfsResult<Self> {
        Self::well_known(WellKnownDirectory::Temp, pal.temp_directory())
    }

    /// Whether anything exists at this path on the real filesystem.
    pub fn exists(&self) -> bool {
        self.exists_in(&RealPal::new())
    }

    /// Whether this path is a directory on the real filesystem, following symbolic links.
    pub fn is_directory(&self) -> bool {
        self.is_directory_in(&RealPal::new())
    }

    /// Whether this path is a regular file on the real filesystem, following symbolic links.
    pub fn is_file(&self) -> bool {
        self.is_file_in(&RealPal::new())
    }

    pub fn exists_in(&self, pal: &dyn Pal) -> bool {
        pal.entry_kind(self).is_some()
    }

    pub fn is_directory_in(&self, pal: &dyn Pal) -> bool {
        pal.entry_kind(self).is_some_and(EntryKind::is_directory)
    }

    pub fn is_file_in(&self, pal: &dyn Pal) -> bool {
        pal.entry_kind(self).is_some_and(EntryKind::is_file)
    }

    fn well_known(directory: WellKnownDirectory, value: Option<String>) -> CrossfsResult<Self> {
        match value {
            Some(value) if !value.is_empty() => Ok(Self::new(value)),
            _ => {
                debug!(%directory, "no value reported for well-known directory");
                Err(ErrorKind::DirectoryUnavailable { directory }.into())
            }
        }
    }
}

impl<S: PathStyle> From<&str> for StyledPath<S> {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<S: PathStyle> From<String> for StyledPath<S> {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl<S: PathStyle> From<&String> for StyledPath<S> {
    fn from(s: &String) -> Self {
        Self::new(s)
    }
}

impl<S: PathStyle> From<&Path> for StyledPath<S> {
    fn from(p: &Path) -> Self {
        Self::new(p.to_string_lossy())
    }
}

impl<S: PathStyle> From<&StyledPath<S>> for StyledPath<S> {
    fn from(p: &StyledPath<S>) -> Self {
        p.clone()
    }
}

impl<S: PathStyle> AsRef<str> for StyledPath<S> {
    fn as_ref(&self) -> &str {
        &self.normalized
    }
}

impl<S: PathStyle> fmt::Display for StyledPath<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

impl<S: PathStyle> fmt::Debug for StyledPath<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FilePath({:?})", self.normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{UnixStyle, WindowsStyle};
    use crate::{MockPal, WellKnownDirectory};

    type UnixPath = StyledPath<UnixStyle>;
    type WindowsPath = StyledPath<WindowsStyle>;

    #[test]
    fn test_mixed_separators_normalize_to_style_separator() {
        let inputs = ["a/b\\c", "a\\b/c", "a/b/c/", "a\\b\\c\\"];
        for input in inputs {
            assert_eq!(UnixPath::new(input).as_str(), "a/b/c", "input {input}");
            assert_eq!(WindowsPath::new(input).as_str(), "a\\b\\c", "input {input}");
        }
    }

    #[test]
    fn test_no_trailing_separator_except_root() {
        assert_eq!(UnixPath::new("/").as_str(), "/");
        assert_eq!(UnixPath::new("\\").as_str(), "/");
        assert!(UnixPath::new("\\").is_root());
        assert_eq!(WindowsPath::new("/").as_str(), "\\");
        assert_eq!(UnixPath::new("/tmp/").as_str(), "/tmp");
        assert!(!UnixPath::new("/tmp").is_root());
    }

    #[test]
    fn test_only_one_trailing_separator_is_stripped() {
        assert_eq!(UnixPath::new("a//").as_str(), "a/");
        assert_eq!(UnixPath::new("//").as_str(), "/");
    }

    #[test]
    fn test_dot_segments_and_repeated_separators_are_kept() {
        assert_eq!(UnixPath::new("a/./b/../c").as_str(), "a/./b/../c");
        assert_eq!(UnixPath::new("a//b").as_str(), "a//b");
    }

    #[test]
    fn test_empty_path() {
        let path = UnixPath::new("");
        assert!(path.is_empty());
        assert_eq!(path.filename(), "");
        assert_eq!(path.extension(), "");
        assert_eq!(path.parent().as_str(), ".");
    }

    #[test]
    fn test_filename_extension_parent() {
        let path = UnixPath::new("a/b/c.txt");
        assert_eq!(path.filename(), "c.txt");
        assert_eq!(path.extension(), ".txt");
        let parent = path.parent();
        assert!(parent.as_str().contains('a'));
        assert!(parent.as_str().contains('b'));
        assert!(!parent.as_str().contains("c.txt"));
        assert_eq!(parent.as_str(), "a/b");
    }

    #[test]
    fn test_extension_uses_last_dot() {
        assert_eq!(UnixPath::new("archive.tar.gz").extension(), ".gz");
        assert_eq!(UnixPath::new("dir.d/readme").extension(), "");
        assert_eq!(UnixPath::new("trailing.").extension(), ".");
    }

    #[test]
    fn test_hidden_file_is_its_own_extension() {
        let path = UnixPath::new("/home/user/.bashrc");
        assert_eq!(path.filename(), ".bashrc");
        assert_eq!(path.extension(), ".bashrc");
    }

    #[test]
    fn test_bare_name_parent_differs_per_style() {
        assert_eq!(UnixPath::new("name").parent().as_str(), ".");
        assert_eq!(WindowsPath::new("name").parent().as_str(), "");
    }

    #[test]
    fn test_unix_root_child_parent_is_root() {
        assert_eq!(UnixPath::new("/etc").parent().as_str(), "/");
        assert_eq!(UnixPath::new("\\etc").parent(), UnixPath::root());
        assert_eq!(UnixPath::root().parent(), UnixPath::root());
    }

    #[test]
    fn test_windows_root_child_parent_is_empty() {
        assert_eq!(WindowsPath::new("\\Windows").parent().as_str(), "");
        assert_eq!(WindowsPath::new("/Windows").parent().as_str(), "");
        assert!(WindowsPath::root().parent().is_empty());
    }

    #[test]
    fn test_windows_drive_paths() {
        let path = WindowsPath::new("C:/Users/me/notes.md");
        assert_eq!(path.as_str(), "C:\\Users\\me\\notes.md");
        assert_eq!(path.parent().as_str(), "C:\\Users\\me");
        assert_eq!(WindowsPath::new("C:\\Users").parent().as_str(), "C:");
    }

    #[test]
    fn test_parent_is_a_new_value() {
        let path = UnixPath::new("a/b");
        let parent = path.parent();
        assert_eq!(path.as_str(), "a/b");
        assert_eq!(parent.as_str(), "a");
    }

    #[test]
    fn test_join() {
        assert_eq!(UnixPath::new("a").join("b").as_str(), "a/b");
        assert_eq!(UnixPath::new("a").join("b\\c").as_str(), "a/b/c");
        assert_eq!(UnixPath::root().join("etc").as_str(), "/etc");
        assert_eq!(UnixPath::new("").join("x").as_str(), "x");
        assert_eq!(WindowsPath::new("C:\\dir").join("f.txt").as_str(), "C:\\dir\\f.txt");
    }

    #[test]
    fn test_join_then_parent_round_trips() {
        let base = UnixPath::new("/var/log");
        assert_eq!(base.join("syslog").parent(), base);
    }

    #[test]
    fn test_separator() {
        assert_eq!(UnixPath::separator(), '/');
        assert_eq!(WindowsPath::separator(), '\\');
    }

    #[test]
    fn test_conversions_and_display() {
        let path = UnixPath::from(String::from("src/lib.rs"));
        assert_eq!(path.to_string(), "src/lib.rs");
        assert_eq!(format!("{:?}", path), "FilePath(\"src/lib.rs\")");
        assert_eq!(UnixPath::from(Path::new("src/lib.rs")), path);
        assert_eq!(path.to_std_path(), PathBuf::from("src/lib.rs"));
        assert_eq!(AsRef::<str>::as_ref(&path), "src/lib.rs");
    }

    #[test]
    fn test_ordering_and_hash() {
        use std::collections::{BTreeSet, HashSet};

        let set: BTreeSet<_> = ["b", "a/c", "a"].into_iter().map(UnixPath::new).collect();
        let ordered: Vec<_> = set.iter().map(UnixPath::as_str).collect();
        assert_eq!(ordered, vec!["a", "a/c", "b"]);

        let mut hashed = HashSet::new();
        hashed.insert(UnixPath::new("a/b"));
        assert!(hashed.contains(&UnixPath::new("a\\b\\")));
    }

    #[test]
    fn test_well_known_directories_from_pal() {
        let pal = MockPal::new();
        pal.set_home_directory(Some("/home/someone/"));
        pal.set_temp_directory(Some("/var/tmp"));
        pal.set_current_directory(Some("/srv/app"));

        assert_eq!(
            FilePath::home_directory_in(&pal).unwrap(),
            FilePath::new("/home/someone")
        );
        assert_eq!(
            FilePath::temp_directory_in(&pal).unwrap(),
            FilePath::new("/var/tmp")
        );
        assert_eq!(
            FilePath::current_directory_in(&pal).unwrap(),
            FilePath::new("/srv/app")
        );
    }

    #[test]
    fn test_missing_home_directory_is_unavailable() {
        let pal = MockPal::new();
        pal.set_home_directory(None);

        let error = FilePath::home_directory_in(&pal).unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::DirectoryUnavailable {
                directory: WellKnownDirectory::Home
            }
        ));
    }

    #[test]
    fn test_empty_temp_directory_is_unavailable() {
        let pal = MockPal::new();
        pal.set_temp_directory(Some(""));

        let error = FilePath::temp_directory_in(&pal).unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::DirectoryUnavailable {
                directory: WellKnownDirectory::Temp
            }
        ));
    }

    #[test]
    fn test_entry_predicates_from_pal() {
        let pal = MockPal::new();
        pal.add_file(FilePath::new("/docs/readme.md"), b"hi".to_vec());

        let dir = FilePath::new("/docs");
        let file = FilePath::new("/docs/readme.md");
        let missing = FilePath::new("/docs/missing.md");

        assert!(dir.exists_in(&pal));
        assert!(dir.is_directory_in(&pal));
        assert!(!dir.is_file_in(&pal));
        assert!(file.is_file_in(&pal));
        assert!(!file.is_directory_in(&pal));
        assert!(!missing.exists_in(&pal));
        assert!(!missing.is_file_in(&pal));
        assert!(!missing.is_directory_in(&pal));
    }

    #[test]
    fn test_entry_predicates_on_real_filesystem() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("f.txt"), "x").unwrap();
        let root = FilePath::from(temp_dir.path());

        assert!(root.is_directory());
        assert!(root.join("f.txt").is_file());
        assert!(root.join("f.txt").exists());
        assert!(!root.join("nothing").exists());
    }

    #[test]
    fn test_real_current_directory() {
        let current = FilePath::current_directory().unwrap();
        let expected = FilePath::from(std::env::current_dir().unwrap().as_path());
        assert_eq!(current, expected);
    }
}
