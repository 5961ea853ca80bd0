/* 📖 # Why is the path style a type parameter?

Windows and Unix disagree on the separator and on what the parent of a bare name is.
Rather than branching on the platform inside every path operation, each platform gets a
small PathStyle adapter and StyledPath is generic over it. FilePath fixes the parameter to
the style of the build target, while tests can still exercise the other platform's rules
directly through StyledPath<WindowsStyle> or StyledPath<UnixStyle>.
*/

mod style;
mod styled_path;

pub use style::{NativeStyle, PathStyle, UnixStyle, WindowsStyle};
pub use styled_path::{FilePath, StyledPath};
