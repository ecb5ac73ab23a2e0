use std::sync::Arc;

use tracing::{debug, instrument};

use crate::error::{XplatError, XplatResult};
use crate::platform::{Arch, Platform};

/* 📖 # Why is the operating system behind a trait?

Path resolution (`abs`) needs the working directory, and tools built on xplat ask
for the home directory or the running executable. Reading those from `std::env`
directly would make every test depend on the machine running it. `MockOs`
answers with fixed Windows or Unix values instead, so a Linux CI box can exercise
`c:\working` just as well as `/working`.
*/

/// Facts about the operating system a program runs on.
pub trait Os: std::fmt::Debug + Send + Sync + 'static {
    fn working_directory(&self) -> XplatResult<String>;

    /// Full path of the running executable.
    fn executable(&self) -> XplatResult<String>;

    fn platform(&self) -> Platform;

    fn architecture(&self) -> Arch;

    /// The user's home directory, or `""` when it can't be determined.
    fn home(&self) -> String;
}

/// [`Os`] backed by `std::env`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealOs;

impl RealOs {
    pub fn new() -> Self {
        Self
    }
}

impl Os for RealOs {
    #[instrument(skip(self))]
    fn working_directory(&self) -> XplatResult<String> {
        let dir = std::env::current_dir().map_err(|e| {
            debug!(error = %e, "failed to read working directory");
            Box::new(XplatError::file_error("<working directory>", e))
        })?;
        Ok(dir.to_string_lossy().into_owned())
    }

    #[instrument(skip(self))]
    fn executable(&self) -> XplatResult<String> {
        let exe = std::env::current_exe().map_err(|e| {
            debug!(error = %e, "failed to get current executable path");
            Box::new(XplatError::file_error("<current_exe>", e))
        })?;
        Ok(exe.to_string_lossy().into_owned())
    }

    fn platform(&self) -> Platform {
        Platform::current()
    }

    fn architecture(&self) -> Arch {
        Arch::current()
    }

    fn home(&self) -> String {
        let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
        std::env::var(var).unwrap_or_default()
    }
}

pub const MOCK_LINUX_WORKING_DIRECTORY: &str = "/working";
pub const MOCK_LINUX_HOME_DIRECTORY: &str = "/home/fake";
pub const MOCK_LINUX_EXECUTABLE: &str = "/opt/test/fake";

pub const MOCK_WINDOWS_WORKING_DIRECTORY: &str = r"c:\working";
pub const MOCK_WINDOWS_HOME_DIRECTORY: &str = r"c:\users\fake";
pub const MOCK_WINDOWS_EXECUTABLE: &str = r"c:\ProgramData\test\fake.exe";

/// [`Os`] answering with fixed values.
///
/// ```
/// use xplat_base::pal::{MockOs, Os};
/// use xplat_base::platform::Arch;
///
/// let os = MockOs::windows().with_architecture(Arch::Arm64);
/// assert_eq!(os.working_directory().unwrap(), r"c:\working");
/// assert_eq!(os.architecture(), Arch::Arm64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockOs {
    working_directory: String,
    home_directory: String,
    executable: String,
    platform: Platform,
    architecture: Arch,
}

impl MockOs {
    pub fn linux() -> Self {
        Self {
            working_directory: MOCK_LINUX_WORKING_DIRECTORY.to_string(),
            home_directory: MOCK_LINUX_HOME_DIRECTORY.to_string(),
            executable: MOCK_LINUX_EXECUTABLE.to_string(),
            platform: Platform::Linux,
            architecture: Arch::Amd64,
        }
    }

    pub fn darwin() -> Self {
        Self {
            platform: Platform::Darwin,
            ..Self::linux()
        }
    }

    pub fn windows() -> Self {
        Self {
            working_directory: MOCK_WINDOWS_WORKING_DIRECTORY.to_string(),
            home_directory: MOCK_WINDOWS_HOME_DIRECTORY.to_string(),
            executable: MOCK_WINDOWS_EXECUTABLE.to_string(),
            platform: Platform::Windows,
            architecture: Arch::Amd64,
        }
    }

    /// Windows preset for Windows, Unix directories for everything else.
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Windows => Self::windows(),
            Platform::Darwin => Self::darwin(),
            platform => Self::linux().with_platform(platform),
        }
    }

    pub fn with_working_directory(mut self, dir: impl Into<String>) -> Self {
        self.working_directory = dir.into();
        self
    }

    pub fn with_home_directory(mut self, dir: impl Into<String>) -> Self {
        self.home_directory = dir.into();
        self
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_architecture(mut self, architecture: Arch) -> Self {
        self.architecture = architecture;
        self
    }
}

impl Os for MockOs {
    fn working_directory(&self) -> XplatResult<String> {
        Ok(self.working_directory.clone())
    }

    fn executable(&self) -> XplatResult<String> {
        Ok(self.executable.clone())
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn architecture(&self) -> Arch {
        self.architecture
    }

    fn home(&self) -> String {
        self.home_directory.clone()
    }
}

/// Shared handle to an [`Os`] implementation.
#[derive(Debug, Clone)]
pub struct OsHandle(Arc<dyn Os>);

impl OsHandle {
    pub fn new(os: impl Os) -> Self {
        Self(Arc::new(os))
    }
}

impl std::ops::Deref for OsHandle {
    type Target = dyn Os;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
