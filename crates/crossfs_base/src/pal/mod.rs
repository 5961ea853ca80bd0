/* 📖 # What is the Platform Abstraction Layer?

The PAL is the one place where crossfs touches the operating system. Every stat,
directory enumeration, create, remove, rename and copy goes through the Pal trait.
Key benefits:
- Testability: MockPal keeps a deterministic in-memory tree, can inject failures at any
  operation and journals mutating calls so ordering guarantees can be asserted
- Portability: RealPal maps onto std::fs and std::env, which already cover each platform
- Inspectability: Pal calls return raw io::Result so callers can react to specific OS
  conditions (already exists, cross-device) before turning them into CrossfsErrors
*/

pub mod mock;
pub mod real_pal;
mod traits;

pub use mock::{FailurePoint, MockOperation, MockPal};
pub use real_pal::RealPal;
pub use traits::{EntryKind, Pal, PalHandle, ReadSeek};
