use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{XplatError, XplatResult};

/// Operating system tag, spelled the way Go's `GOOS` values are.
///
/// The platform decides which path grammar the parser accepts, which separator
/// the processor renders with and whether path comparison ignores case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Aix,
    Android,
    Darwin,
    Dragonfly,
    FreeBsd,
    Hurd,
    Illumos,
    Ios,
    Js,
    Linux,
    Nacl,
    NetBsd,
    OpenBsd,
    Plan9,
    Solaris,
    Wasip1,
    Windows,
    Zos,
}

const PLATFORMS: [Platform; 18] = [
    Platform::Aix,
    Platform::Android,
    Platform::Darwin,
    Platform::Dragonfly,
    Platform::FreeBsd,
    Platform::Hurd,
    Platform::Illumos,
    Platform::Ios,
    Platform::Js,
    Platform::Linux,
    Platform::Nacl,
    Platform::NetBsd,
    Platform::OpenBsd,
    Platform::Plan9,
    Platform::Solaris,
    Platform::Wasip1,
    Platform::Windows,
    Platform::Zos,
];

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Aix => "aix",
            Platform::Android => "android",
            Platform::Darwin => "darwin",
            Platform::Dragonfly => "dragonfly",
            Platform::FreeBsd => "freebsd",
            Platform::Hurd => "hurd",
            Platform::Illumos => "illumos",
            Platform::Ios => "ios",
            Platform::Js => "js",
            Platform::Linux => "linux",
            Platform::Nacl => "nacl",
            Platform::NetBsd => "netbsd",
            Platform::OpenBsd => "openbsd",
            Platform::Plan9 => "plan9",
            Platform::Solaris => "solaris",
            Platform::Wasip1 => "wasip1",
            Platform::Windows => "windows",
            Platform::Zos => "zos",
        }
    }

    pub fn is_unix(&self) -> bool {
        matches!(
            self,
            Platform::Aix
                | Platform::Android
                | Platform::Darwin
                | Platform::Dragonfly
                | Platform::FreeBsd
                | Platform::Hurd
                | Platform::Illumos
                | Platform::Ios
                | Platform::Linux
                | Platform::NetBsd
                | Platform::OpenBsd
                | Platform::Solaris
        )
    }

    pub fn is_windows(&self) -> bool {
        *self == Platform::Windows
    }

    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => Platform::Darwin,
            "windows" => Platform::Windows,
            "android" => Platform::Android,
            "ios" => Platform::Ios,
            "freebsd" => Platform::FreeBsd,
            "dragonfly" => Platform::Dragonfly,
            "netbsd" => Platform::NetBsd,
            "openbsd" => Platform::OpenBsd,
            "solaris" => Platform::Solaris,
            "illumos" => Platform::Illumos,
            "aix" => Platform::Aix,
            "hurd" => Platform::Hurd,
            "wasi" => Platform::Wasip1,
            _ => Platform::Linux,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Box<XplatError>;

    fn from_str(s: &str) -> XplatResult<Self> {
        PLATFORMS
            .iter()
            .find(|platform| platform.as_str() == s)
            .copied()
            .ok_or_else(|| crate::err!("unknown platform '{}'", s))
    }
}

/// Processor architecture tag, spelled the way Go's `GOARCH` values are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    #[serde(rename = "386")]
    I386,
    Amd64,
    Amd64p32,
    Arm,
    Arm64,
    Arm64be,
    Loong64,
    Mips,
    Mipsle,
    Mips64,
    Mips64le,
    Mips64p32,
    Mips64p32le,
    Ppc,
    Ppc64le,
    Riscv,
    Riscv64,
    S390,
    S390x,
    Sparc,
    Sparc64,
    Wasm,
}

const ARCHES: [Arch; 22] = [
    Arch::I386,
    Arch::Amd64,
    Arch::Amd64p32,
    Arch::Arm,
    Arch::Arm64,
    Arch::Arm64be,
    Arch::Loong64,
    Arch::Mips,
    Arch::Mipsle,
    Arch::Mips64,
    Arch::Mips64le,
    Arch::Mips64p32,
    Arch::Mips64p32le,
    Arch::Ppc,
    Arch::Ppc64le,
    Arch::Riscv,
    Arch::Riscv64,
    Arch::S390,
    Arch::S390x,
    Arch::Sparc,
    Arch::Sparc64,
    Arch::Wasm,
];

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::I386 => "386",
            Arch::Amd64 => "amd64",
            Arch::Amd64p32 => "amd64p32",
            Arch::Arm => "arm",
            Arch::Arm64 => "arm64",
            Arch::Arm64be => "arm64be",
            Arch::Loong64 => "loong64",
            Arch::Mips => "mips",
            Arch::Mipsle => "mipsle",
            Arch::Mips64 => "mips64",
            Arch::Mips64le => "mips64le",
            Arch::Mips64p32 => "mips64p32",
            Arch::Mips64p32le => "mips64p32le",
            Arch::Ppc => "ppc",
            Arch::Ppc64le => "ppc64le",
            Arch::Riscv => "riscv",
            Arch::Riscv64 => "riscv64",
            Arch::S390 => "s390",
            Arch::S390x => "s390x",
            Arch::Sparc => "sparc",
            Arch::Sparc64 => "sparc64",
            Arch::Wasm => "wasm",
        }
    }

    /// The architecture this binary was compiled for.
    pub fn current() -> Self {
        match std::env::consts::ARCH {
            "x86" => Arch::I386,
            "aarch64" => Arch::Arm64,
            "arm" => Arch::Arm,
            "loongarch64" => Arch::Loong64,
            "mips" => Arch::Mips,
            "mips64" => Arch::Mips64,
            "powerpc" => Arch::Ppc,
            "powerpc64" => Arch::Ppc64le,
            "riscv64" => Arch::Riscv64,
            "s390x" => Arch::S390x,
            "sparc64" => Arch::Sparc64,
            "wasm32" => Arch::Wasm,
            _ => Arch::Amd64,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = Box<XplatError>;

    fn from_str(s: &str) -> XplatResult<Self> {
        ARCHES
            .iter()
            .find(|arch| arch.as_str() == s)
            .copied()
            .ok_or_else(|| crate::err!("unknown architecture '{}'", s))
    }
}
