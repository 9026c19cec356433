//! CLI subcommands. Each one opens a [`CommandContext`] on the working directory,
//! runs one coordinator operation and prints the outcome.

pub mod blame;
pub mod branches;
pub mod commit;
pub mod conflicts;
pub mod context;
pub mod history;
pub mod stage;
pub mod stash;
pub mod status;

pub use blame::*;
pub use branches::*;
pub use commit::*;
pub use conflicts::*;
pub use context::CommandContext;
pub use history::*;
pub use stage::*;
pub use stash::*;
pub use status::*;
