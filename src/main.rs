use clap::{ArgGroup, Parser, Subcommand};
use git_workspace::commands::*;
use git_workspace::core::{
    error::{GitWorkspaceError, Result},
    print_error,
};
use git_workspace::merge::Resolution;
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-workspace")]
#[command(about = "Source control for editor workspaces")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show staged, unstaged and untracked files
    Status,
    /// Stage one file
    Stage { path: String },
    /// Stage every changed and untracked file
    StageAll,
    /// Remove one file from the index
    Unstage { path: String },
    /// Drop working-tree changes to one file
    Discard { path: String },
    /// Commit the staged changes
    Commit {
        #[arg(short, long)]
        message: String,
    },
    /// Summarize the staged changes
    Summary,
    /// List local and remote branches
    Branches,
    /// Switch to a branch
    Checkout { name: String },
    /// Create (and switch to) or delete a branch
    Branch {
        name: String,
        #[arg(short, long)]
        delete: bool,
        /// Create without switching
        #[arg(long, conflicts_with = "delete")]
        no_checkout: bool,
    },
    /// Show recent commits
    Log {
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
    },
    /// List conflict blocks in a file
    Conflicts { file: PathBuf },
    /// Resolve every conflict block in a file
    #[command(group(ArgGroup::new("side").required(true).args(["ours", "theirs", "both"])))]
    Resolve {
        file: PathBuf,
        #[arg(long)]
        ours: bool,
        #[arg(long)]
        theirs: bool,
        #[arg(long)]
        both: bool,
    },
    /// Show who last changed each line of a file
    Blame { path: String },
    /// Set local changes aside, or work with the stash list
    Stash {
        #[command(subcommand)]
        action: Option<StashCommand>,
    },
}

#[derive(Subcommand)]
enum StashCommand {
    /// Stash every change, untracked files included
    Push {
        #[arg(short, long)]
        message: Option<String>,
    },
    /// List stashes, newest first
    List,
    /// Apply a stash and remove it
    Pop {
        #[arg(default_value_t = 0)]
        index: usize,
    },
    /// Apply a stash and keep it
    Apply {
        #[arg(default_value_t = 0)]
        index: usize,
    },
    /// Remove a stash
    Drop {
        #[arg(default_value_t = 0)]
        index: usize,
    },
    /// Remove every stash
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configure logging based on --debug flag
    if cli.debug {
        env::set_var("RUST_LOG", "debug");
    } else {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    if let Err(e) = run(cli.command).await {
        if let GitWorkspaceError::NotInGitRepo = e {
            print_error("Not in a git repository");
        } else {
            print_error(&e.operation_message());
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands) -> Result<()> {
    let workspace = env::current_dir()?;

    match command {
        Commands::Status => execute_status(&workspace).await,
        Commands::Stage { path } => execute_stage(&workspace, &path).await,
        Commands::StageAll => execute_stage_all(&workspace).await,
        Commands::Unstage { path } => execute_unstage(&workspace, &path).await,
        Commands::Discard { path } => execute_discard(&workspace, &path).await,
        Commands::Commit { message } => execute_commit(&workspace, &message).await,
        Commands::Summary => execute_summary(&workspace).await,
        Commands::Branches => execute_branches(&workspace).await,
        Commands::Checkout { name } => execute_checkout(&workspace, &name).await,
        Commands::Branch {
            name,
            delete,
            no_checkout,
        } => execute_branch(&workspace, &name, delete, no_checkout).await,
        Commands::Log { limit } => execute_log(&workspace, limit).await,
        Commands::Conflicts { file } => execute_conflicts(&file),
        Commands::Resolve {
            file, ours, theirs, ..
        } => {
            let resolution = if ours {
                Resolution::Ours
            } else if theirs {
                Resolution::Theirs
            } else {
                Resolution::Both
            };
            execute_resolve(&file, resolution)
        }
        Commands::Blame { path } => execute_blame(&workspace, &path).await,
        Commands::Stash { action } => match action.unwrap_or(StashCommand::Push { message: None }) {
            StashCommand::Push { message } => {
                execute_stash_push(&workspace, message.as_deref()).await
            }
            StashCommand::List => execute_stash_list(&workspace).await,
            StashCommand::Pop { index } => execute_stash_pop(&workspace, index).await,
            StashCommand::Apply { index } => execute_stash_apply(&workspace, index).await,
            StashCommand::Drop { index } => execute_stash_drop(&workspace, index).await,
            StashCommand::Clear => execute_stash_clear(&workspace).await,
        },
    }
}
