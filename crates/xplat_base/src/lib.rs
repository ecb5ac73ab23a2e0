/* 📖 # Why have xplat_base as a core library?
xplat_base holds everything a cross-platform tool needs below its own logic: the
error type, tracing setup, platform tags, the path engine and the platform
abstraction layer. The CLI and any other consumer depend on this crate only.
*/

pub mod config;
pub mod error;
pub mod pal;
pub mod path;
pub mod platform;
pub mod tracing;

// Re-export commonly used types for convenience
pub use config::{HostConfig, load_config};
pub use error::{ErrorKind, ResultExt, XplatError, XplatResult};
pub use pal::{FileMode, FileSystem, Host, MemoryFs, OpenFlags, RealFs};
pub use path::{Comparison, FilePath, Processor};
pub use platform::{Arch, Platform};
