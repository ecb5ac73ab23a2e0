use serde::Deserialize;

use crate::error::{ResultExt, XplatResult};
use crate::pal::{FileSystem, MockOs, OsHandle};
use crate::path::{Comparison, Processor};
use crate::platform::{Arch, Platform};

/// Description of a simulated host, read from TOML.
///
/// Every field is optional; missing values come from the platform's mock preset.
///
/// ```toml
/// platform = "windows"
/// architecture = "arm64"
/// working_directory = 'd:\src'
/// case_sensitive = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Defaults to the platform this binary was built for.
    pub platform: Option<Platform>,
    pub architecture: Option<Arch>,
    pub working_directory: Option<String>,
    pub home_directory: Option<String>,
    pub executable: Option<String>,
    /// Separator used when rendering paths.
    pub separator: Option<char>,
    pub case_sensitive: Option<bool>,
}

impl HostConfig {
    pub fn from_toml_str(source: &str) -> XplatResult<Self> {
        toml::from_str(source).map_err(|e| crate::err!("Invalid host configuration: {}", e))
    }

    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }

    /// The mock OS described by this configuration.
    pub fn os(&self) -> MockOs {
        let mut os = MockOs::for_platform(self.platform());
        if let Some(architecture) = self.architecture {
            os = os.with_architecture(architecture);
        }
        if let Some(dir) = &self.working_directory {
            os = os.with_working_directory(dir);
        }
        if let Some(dir) = &self.home_directory {
            os = os.with_home_directory(dir);
        }
        if let Some(executable) = &self.executable {
            os = os.with_executable(executable);
        }
        os
    }

    /// A processor for the configured platform with the rendering overrides applied.
    pub fn processor(&self, os: OsHandle) -> Processor {
        let mut processor = Processor::from_os(os);
        if let Some(separator) = self.separator {
            processor = processor.with_separator(separator);
        }
        if let Some(case_sensitive) = self.case_sensitive {
            processor = processor.with_comparison(if case_sensitive {
                Comparison::CaseSensitive
            } else {
                Comparison::IgnoreCase
            });
        }
        processor
    }
}

/// Reads a [`HostConfig`] through a filesystem.
pub fn load_config(fs: &dyn FileSystem, name: &str) -> XplatResult<HostConfig> {
    let source = fs
        .read_to_string(name)
        .with_context(|| format!("reading host configuration '{}'", name))?;
    HostConfig::from_toml_str(&source).with_context(|| format!("parsing '{}'", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::{FileMode, MemoryFs, Os};

    #[test]
    fn test_parse_full_config() {
        let config = HostConfig::from_toml_str(
            r#"
            platform = "windows"
            architecture = "386"
            working_directory = 'd:\src'
            home_directory = 'd:\home'
            executable = 'd:\bin\tool.exe'
            separator = "/"
            case_sensitive = true
            "#,
        )
        .unwrap();
        assert_eq!(config.platform, Some(Platform::Windows));
        assert_eq!(config.architecture, Some(Arch::I386));
        assert_eq!(config.separator, Some('/'));

        let os = config.os();
        assert_eq!(os.working_directory().unwrap(), r"d:\src");
        assert_eq!(os.home(), r"d:\home");
        assert_eq!(os.executable().unwrap(), r"d:\bin\tool.exe");

        let processor = config.processor(OsHandle::new(os));
        assert_eq!(processor.separator(), '/');
        assert_eq!(processor.comparison(), Comparison::CaseSensitive);
        assert_eq!(processor.abs("x").unwrap(), "d:/src/x");
    }

    #[test]
    fn test_missing_fields_use_preset() {
        let config = HostConfig::from_toml_str("platform = \"linux\"").unwrap();
        assert_eq!(config.os(), MockOs::linux());
        let processor = config.processor(OsHandle::new(config.os()));
        assert_eq!(processor.separator(), '/');
        assert_eq!(processor.comparison(), Comparison::CaseSensitive);
    }

    #[test]
    fn test_empty_config_uses_current_platform() {
        let config = HostConfig::from_toml_str("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.platform(), Platform::current());
    }

    #[test]
    fn test_invalid_config() {
        assert!(HostConfig::from_toml_str("platform = \"beos\"").is_err());
        assert!(HostConfig::from_toml_str("colour = \"blue\"").is_err());
        assert!(HostConfig::from_toml_str("separator = \"//\"").is_err());
    }

    #[test]
    fn test_load_config_from_filesystem() {
        let fs = MemoryFs::for_platform(Platform::Linux);
        fs.mkdir_all("/etc", FileMode::new(0o755)).unwrap();
        fs.write_file("/etc/host.toml", b"platform = \"darwin\"", FileMode::new(0o644))
            .unwrap();
        let config = load_config(&fs, "/etc/host.toml").unwrap();
        assert_eq!(config.platform, Some(Platform::Darwin));

        let error = load_config(&fs, "/etc/missing.toml").unwrap_err();
        assert!(error.is_not_exist());
        assert_eq!(
            error.to_string(),
            "reading host configuration '/etc/missing.toml': '/etc/missing.toml' does not exist"
        );
    }
}
