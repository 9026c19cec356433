//! Git plumbing: the capability trait, its libgit2 implementation and the
//! status matrix translator.

mod git2_backend;
pub mod plumbing;
mod remote;
pub mod repo;
pub mod status_matrix;

pub use git2_backend::Git2Plumbing;
pub use plumbing::{
    BlameHunk, CloneOptions, GitPlumbing, ProgressCallback, RemoteOptions, TransferProgress,
};
pub use repo::GitRepo;
pub use status_matrix::{classify_row, translate_status_matrix, RowClass, StatusMatrix, StatusRow};
