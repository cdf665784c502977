use serde::{Deserialize, Serialize};

/// Operating system whose conventions drive key naming and protection lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Windows,
    #[serde(alias = "mac", alias = "darwin")]
    Macos,
    Linux,
}

impl Os {
    pub fn as_str(self) -> &'static str {
        match self {
            Os::Windows => "windows",
            Os::Macos => "macos",
            Os::Linux => "linux",
        }
    }

    /// Parse a platform string the way browsers and configs spell it.
    /// Unknown strings return `None` so callers can fall back to detection.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" | "win32" | "win64" => Some(Os::Windows),
            "macos" | "mac" | "macintel" | "darwin" | "osx" => Some(Os::Macos),
            "linux" | "x11" | "wayland" => Some(Os::Linux),
            _ => None,
        }
    }

    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Os::Macos
        } else if cfg!(target_os = "windows") {
            Os::Windows
        } else {
            Os::Linux
        }
    }

    pub fn all() -> &'static [Os] {
        &[Os::Windows, Os::Macos, Os::Linux]
    }

    /// Label shown for the internal `Meta` modifier.
    pub fn meta_label(self) -> &'static str {
        match self {
            Os::Windows => "Win",
            Os::Macos => "Cmd",
            Os::Linux => "Super",
        }
    }

    /// Label shown for the internal `Alt` modifier.
    pub fn alt_label(self) -> &'static str {
        match self {
            Os::Macos => "Option",
            _ => "Alt",
        }
    }
}

impl Default for Os {
    fn default() -> Self {
        Self::detect()
    }
}
