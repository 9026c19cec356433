use crate::core::error::GitWorkspaceError;
use std::path::PathBuf;

pub fn get_config_directory() -> Result<PathBuf, GitWorkspaceError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| home_dir().map(|home| home.join(".config")))?,
        "macos" => home_dir()?.join("Library/Application Support"),
        _ => dirs::config_dir().ok_or(GitWorkspaceError::ConfigDirectoryNotFound)?,
    };

    Ok(base.join("git-workspace"))
}

/// Root under which virtual filesystems persist their namespaces.
pub fn get_data_directory() -> Result<PathBuf, GitWorkspaceError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|_| home_dir().map(|home| home.join(".local/share")))?,
        "macos" => home_dir()?.join("Library/Application Support"),
        _ => dirs::data_dir().ok_or(GitWorkspaceError::ConfigDirectoryNotFound)?,
    };

    Ok(base.join("git-workspace"))
}

fn home_dir() -> Result<PathBuf, GitWorkspaceError> {
    dirs::home_dir().ok_or(GitWorkspaceError::ConfigDirectoryNotFound)
}
