//! Shared building blocks: errors, configuration, the state container, events and
//! terminal output.

pub mod colors;
pub mod config;
pub mod dirs;
pub mod error;
pub mod events;
pub mod git_status;
pub mod output;
pub mod state;

// === Error handling ===
pub use error::{GitWorkspaceError, Result};

// === Configuration ===
pub use config::{GitAuthor, GitConfig, GitSettings};

// === Status types ===
pub use git_status::FileStatus;

// === State and events ===
pub use events::{EventDispatcher, GitEvent};
pub use state::{
    BlameLine, BranchEntry, CommitEntry, Credentials, FileStatusEntry, GitState,
    GitStatusSnapshot, OperationKind, OperationState, RemoteEntry, StashEntry, StateStore,
};

// === Terminal output ===
pub use colors::{format_file_status, get_aligned_status, get_colored_path, get_status_color_style};
pub use output::{print_detail, print_error, print_info, print_section_header, print_success};
