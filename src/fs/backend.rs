//! Backend selection.
//!
//! [`detect_backend`] is a pure function of the [`Environment`] flags it is given.
//! It never caches; the coordinator decides when to ask again.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Host shell with native filesystem access, handled outside this crate
    Native,
    /// File System Access API directory handles
    WebFs,
    /// Namespaced virtual store
    Virtual,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Native => "native",
            BackendKind::WebFs => "webfs",
            BackendKind::Virtual => "virtual",
        };
        write!(f, "{name}")
    }
}

/// Ambient capabilities of the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Environment {
    /// The host exposes a native shell bridge
    pub native_shell: bool,
    /// A directory picker (`showDirectoryPicker`) is available
    pub directory_picker: bool,
}

impl Environment {
    pub fn native() -> Self {
        Self {
            native_shell: true,
            directory_picker: false,
        }
    }

    pub fn with_directory_picker() -> Self {
        Self {
            native_shell: false,
            directory_picker: true,
        }
    }

    pub fn virtual_only() -> Self {
        Self::default()
    }
}

/// Native shell > directory picker > virtual fallback.
pub fn detect_backend(env: &Environment) -> BackendKind {
    if env.native_shell {
        BackendKind::Native
    } else if env.directory_picker {
        BackendKind::WebFs
    } else {
        BackendKind::Virtual
    }
}
