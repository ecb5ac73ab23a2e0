use crate::config::HostConfig;
use crate::path::Processor;
use crate::platform::{Arch, Platform};

use super::memory::MemoryFs;
use super::os::{MockOs, OsHandle, RealOs};
use super::real_fs::RealFs;
use super::traits::FileSystem;

/// Everything a cross-platform tool needs from its environment.
///
/// ```
/// use xplat_base::pal::Host;
/// use xplat_base::platform::{Arch, Platform};
///
/// let host = Host::new_test(Platform::Windows, Arch::Amd64);
/// assert_eq!(host.path.abs("bin").unwrap(), r"c:\working\bin");
/// ```
#[derive(Debug)]
pub struct Host {
    pub os: OsHandle,
    pub fs: Box<dyn FileSystem>,
    pub path: Processor,
}

impl Host {
    /// The machine this program runs on.
    pub fn new() -> Self {
        let os = OsHandle::new(RealOs::new());
        let path = Processor::from_os(os.clone());
        Self {
            fs: Box::new(RealFs::with_processor(path.clone())),
            os,
            path,
        }
    }

    /// A simulated machine: mock OS preset, empty in-memory filesystem.
    pub fn new_test(platform: Platform, arch: Arch) -> Self {
        Self::with_mock(MockOs::for_platform(platform).with_architecture(arch), None)
    }

    /// A simulated machine described by a configuration.
    pub fn from_config(config: &HostConfig) -> Self {
        Self::with_mock(config.os(), Some(config))
    }

    fn with_mock(os: MockOs, config: Option<&HostConfig>) -> Self {
        let os = OsHandle::new(os);
        let path = match config {
            Some(config) => config.processor(os.clone()),
            None => Processor::from_os(os.clone()),
        };
        Self {
            fs: Box::new(MemoryFs::new(path.clone())),
            os,
            path,
        }
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::FileMode;
    use crate::path::Comparison;

    #[test]
    fn test_new_test_linux() {
        let host = Host::new_test(Platform::Linux, Arch::Arm64);
        assert_eq!(host.os.platform(), Platform::Linux);
        assert_eq!(host.os.architecture(), Arch::Arm64);
        assert_eq!(host.path.separator(), '/');
        assert_eq!(host.path.abs("x/../y").unwrap(), "/working/y");
        assert!(!host.fs.exists("/working").unwrap());
    }

    #[test]
    fn test_new_test_windows_fs_uses_windows_rules() {
        let host = Host::new_test(Platform::Windows, Arch::Amd64);
        let home = host.os.home();
        host.fs.mkdir_all(&home, FileMode::new(0o755)).unwrap();
        assert!(host.fs.exists(r"C:\Users\Fake").unwrap());
        assert_eq!(host.path.comparison(), Comparison::IgnoreCase);
    }

    #[test]
    fn test_from_config() {
        let config = HostConfig::from_toml_str(
            r#"
            platform = "darwin"
            working_directory = "/Users/me/src"
            case_sensitive = false
            "#,
        )
        .unwrap();
        let host = Host::from_config(&config);
        assert_eq!(host.os.platform(), Platform::Darwin);
        assert_eq!(host.path.abs("app").unwrap(), "/Users/me/src/app");
        host.fs.mkdir_all("/Users/me", FileMode::new(0o755)).unwrap();
        assert!(host.fs.exists("/users/ME").unwrap());
    }

    #[test]
    fn test_real_host() {
        let host = Host::new();
        assert_eq!(host.os.platform(), Platform::current());
        assert_eq!(host.path.platform(), Platform::current());
        let cwd = host.os.working_directory().unwrap();
        assert!(host.fs.stat(&cwd).unwrap().is_dir());
    }
}
