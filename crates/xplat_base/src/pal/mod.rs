/* 📖 # What is the Platform Abstraction Layer?

The PAL puts the filesystem and the operating system behind traits so tools can
run against the real machine or against a simulated one.
- `FileSystem`: `RealFs` uses `std::fs`, `MemoryFs` keeps entries in memory and
  `SubFs` narrows either to one directory
- `Os`: `RealOs` reads `std::env`, `MockOs` answers with fixed Linux, Darwin or
  Windows values
- `Host` bundles an OS, a filesystem and a path processor that agree on the
  platform
*/

mod host;
mod memory;
mod os;
mod real_fs;
mod sub;
mod traits;

pub use host::Host;
pub use memory::{MemoryFile, MemoryFs};
pub use os::{
    MOCK_LINUX_EXECUTABLE, MOCK_LINUX_HOME_DIRECTORY, MOCK_LINUX_WORKING_DIRECTORY,
    MOCK_WINDOWS_EXECUTABLE, MOCK_WINDOWS_HOME_DIRECTORY, MOCK_WINDOWS_WORKING_DIRECTORY, MockOs,
    Os, OsHandle, RealOs,
};
pub use real_fs::{RealFile, RealFs};
pub use sub::SubFs;
pub use traits::{DirEntry, File, FileInfo, FileMode, FileSystem, OpenFlags};
