//! Synchronous repository operations on top of `git2`.
//!
//! [`GitRepo`] wraps a [`git2::Repository`] discovered from a working directory and
//! exposes the operations the async plumbing needs. Every method is blocking; callers
//! on the async side run them through `spawn_blocking`.

use super::{
    plumbing::{BlameHunk, CloneOptions, RemoteOptions},
    remote::{fetch_options, push_options, remote_default_branch},
    status_matrix::{StatusMatrix, StatusRow, ABSENT, CHANGED, STAGE_PARTIAL, UNCHANGED},
};
use crate::core::{
    config::GitAuthor,
    error::{GitWorkspaceError, Result},
    state::{CommitEntry, RemoteEntry, StashEntry},
};
use git2::{
    build::{CheckoutBuilder, RepoBuilder},
    BranchType, Commit, ErrorCode, IndexAddOption, ObjectType, Oid, Repository,
    RepositoryInitOptions, RepositoryState, Signature, StashFlags, StatusOptions, TreeWalkMode,
    TreeWalkResult,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

const INDEX_STAGE_SHIFT: u16 = 12;
const INDEX_STAGE_MASK: u16 = 0x3;

pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).map_err(|e| match e.code() {
            ErrorCode::NotFound => GitWorkspaceError::NotInGitRepo,
            _ => GitWorkspaceError::Git(e),
        })?;
        Ok(GitRepo { repo })
    }

    pub fn init<P: AsRef<Path>>(path: P, default_branch: &str) -> Result<Self> {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head(default_branch);
        let repo = Repository::init_opts(path, &opts)?;
        Ok(GitRepo { repo })
    }

    /// Shallow clone into `path`.
    ///
    /// Depth is not applied to local sources, which the local transport always copies
    /// in full.
    pub fn clone_into<P: AsRef<Path>>(path: P, options: &CloneOptions) -> Result<Self> {
        let mut fetch = fetch_options(&options.remote);
        if options.depth > 0 && !is_local_url(&options.url) {
            fetch.depth(options.depth as i32);
        }

        let branch = match &options.branch {
            Some(branch) => Some(branch.clone()),
            None if options.single_branch => remote_default_branch(&options.url, &options.remote)?,
            None => None,
        };

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch);

        if let Some(branch) = branch {
            builder.branch(&branch);
            if options.single_branch {
                let refspec = format!("+refs/heads/{branch}:refs/remotes/{{}}/{branch}");
                builder.remote_create(move |repo, name, url| {
                    repo.remote_with_fetch(name, url, &refspec.replace("{}", name))
                });
            }
        }

        let repo = builder.clone(&options.url, path.as_ref())?;
        Ok(GitRepo { repo })
    }

    pub fn get_repository(&self) -> &Repository {
        &self.repo
    }

    pub fn workdir(&self) -> Result<&Path> {
        self.repo.workdir().ok_or(GitWorkspaceError::NotInGitRepo)
    }

    pub fn workdir_string(&self) -> Result<String> {
        let workdir = self.workdir()?;
        let path = workdir.to_str().ok_or(GitWorkspaceError::InvalidUtf8Path)?;
        Ok(path.trim_end_matches('/').to_string())
    }

    fn head_commit(&self) -> Result<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Branch HEAD points at, also for a branch with no commits yet.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = self.repo.find_reference("HEAD")?;
        let Some(target) = head.symbolic_target() else {
            // Detached HEAD
            return Ok(None);
        };
        Ok(target.strip_prefix("refs/heads/").map(str::to_string))
    }

    pub fn status_matrix(&self) -> Result<StatusMatrix> {
        let workdir = self.workdir()?.to_path_buf();

        let mut head: BTreeMap<String, Oid> = BTreeMap::new();
        if let Some(commit) = self.head_commit()? {
            commit
                .tree()?
                .walk(TreeWalkMode::PreOrder, |root, entry| {
                    if entry.kind() == Some(ObjectType::Blob) {
                        if let Some(name) = entry.name() {
                            head.insert(format!("{root}{name}"), entry.id());
                        }
                    }
                    TreeWalkResult::Ok
                })?;
        }

        let mut stage: BTreeMap<String, Oid> = BTreeMap::new();
        let mut conflicted: BTreeSet<String> = BTreeSet::new();
        for entry in self.repo.index()?.iter() {
            let path =
                String::from_utf8(entry.path).map_err(|_| GitWorkspaceError::InvalidUtf8Path)?;
            if (entry.flags >> INDEX_STAGE_SHIFT) & INDEX_STAGE_MASK != 0 {
                conflicted.insert(path);
            } else {
                stage.insert(path, entry.id);
            }
        }

        let mut paths: BTreeSet<String> = head.keys().chain(stage.keys()).cloned().collect();

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);
        for entry in self.repo.statuses(Some(&mut opts))?.iter() {
            if entry.status().is_wt_new() {
                let path = entry.path().ok_or(GitWorkspaceError::InvalidUtf8Path)?;
                paths.insert(path.to_string());
            }
        }

        let mut rows = Vec::with_capacity(paths.len());
        for path in paths {
            if conflicted.contains(&path) {
                continue;
            }

            let full = workdir.join(&path);
            let in_workdir = if full.is_file() {
                Some(Oid::hash_file(ObjectType::Blob, &full)?)
            } else {
                None
            };
            let in_head = head.get(&path).copied();
            let in_stage = stage.get(&path).copied();

            let head_state = if in_head.is_some() { UNCHANGED } else { ABSENT };
            let workdir_state = match in_workdir {
                None => ABSENT,
                Some(oid) if Some(oid) == in_head => UNCHANGED,
                Some(_) => CHANGED,
            };
            let stage_state = match in_stage {
                None => ABSENT,
                Some(oid) if Some(oid) == in_head => UNCHANGED,
                Some(oid) if Some(oid) == in_workdir => CHANGED,
                Some(_) => STAGE_PARTIAL,
            };

            rows.push(StatusRow::new(path, head_state, workdir_state, stage_state));
        }

        Ok(StatusMatrix {
            rows,
            conflicted: conflicted.into_iter().collect(),
            merge_in_progress: self.repo.state() == RepositoryState::Merge,
        })
    }

    /// Stage `path`; stages a removal when it no longer exists in the working tree.
    pub fn add_path(&self, path: &str) -> Result<()> {
        let mut index = self.repo.index()?;
        if self.workdir()?.join(path).exists() {
            index.add_all([path], IndexAddOption::DEFAULT, None)?;
        } else {
            index.remove_all([path], None)?;
        }
        index.write()?;
        Ok(())
    }

    pub fn reset_path(&self, path: &str) -> Result<()> {
        match self.head_commit()? {
            Some(commit) => self.repo.reset_default(Some(commit.as_object()), [path])?,
            None => {
                let mut index = self.repo.index()?;
                index.remove_all([path], None)?;
                index.write()?;
            }
        }
        Ok(())
    }

    pub fn checkout_paths(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut builder = CheckoutBuilder::new();
        builder.force();
        for path in paths {
            builder.path(path);
        }
        self.repo.checkout_head(Some(&mut builder))?;
        Ok(())
    }

    /// Commit the index on top of HEAD, and of MERGE_HEAD when a merge is pending.
    pub fn commit(&self, message: &str, author: &GitAuthor) -> Result<String> {
        let mut index = self.repo.index()?;
        let tree_oid = index.write_tree()?;
        let tree = self.repo.find_tree(tree_oid)?;
        let signature = Signature::now(&author.name, &author.email)?;

        let mut parents: Vec<Commit<'_>> = self.head_commit()?.into_iter().collect();
        let merging = self.repo.state() == RepositoryState::Merge;
        if merging {
            for oid in self.merge_heads()? {
                parents.push(self.repo.find_commit(oid)?);
            }
        }
        let parent_refs: Vec<&Commit<'_>> = parents.iter().collect();

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parent_refs,
        )?;

        if merging {
            self.repo.cleanup_state()?;
        }

        Ok(oid.to_string())
    }

    /// Commits recorded in `MERGE_HEAD`, one per line.
    fn merge_heads(&self) -> Result<Vec<Oid>> {
        let content = match std::fs::read_to_string(self.repo.path().join("MERGE_HEAD")) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| Oid::from_str(line).map_err(GitWorkspaceError::from))
            .collect()
    }

    pub fn fetch(&self, options: &RemoteOptions) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(&options.remote)
            .map_err(|_| GitWorkspaceError::remote_not_found(&options.remote))?;
        let mut fetch = fetch_options(options);
        remote.fetch::<&str>(&[], Some(&mut fetch), None)?;
        Ok(())
    }

    pub fn push(&self, branch: &str, options: &RemoteOptions) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(&options.remote)
            .map_err(|_| GitWorkspaceError::remote_not_found(&options.remote))?;
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        let mut push = push_options(options);
        remote.push(&[refspec.as_str()], Some(&mut push))?;
        Ok(())
    }

    /// Fetch, then fast-forward or merge `branch` from the remote.
    ///
    /// A conflicting merge is left in progress for resolution and reported as
    /// [`GitWorkspaceError::MergeConflict`].
    pub fn pull(&self, branch: &str, author: &GitAuthor, options: &RemoteOptions) -> Result<()> {
        self.fetch(options)?;

        let tracking = format!("refs/remotes/{}/{branch}", options.remote);
        let reference = self
            .repo
            .find_reference(&tracking)
            .map_err(|_| GitWorkspaceError::branch_not_found(format!("{}/{branch}", options.remote)))?;
        let theirs = self.repo.reference_to_annotated_commit(&reference)?;
        let (analysis, _) = self.repo.merge_analysis(&[&theirs])?;

        if analysis.is_up_to_date() {
            return Ok(());
        }

        // Local edits survive unless the incoming commits touch the same files, in which
        // case checkout fails before any ref moves.
        let local = format!("refs/heads/{branch}");
        if analysis.is_unborn() {
            let target = self.repo.find_object(theirs.id(), None)?;
            self.repo
                .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
            self.repo
                .reference(&local, theirs.id(), true, "pull: initial")?;
            self.repo.set_head(&local)?;
            return Ok(());
        }

        if analysis.is_fast_forward() {
            let target = self.repo.find_object(theirs.id(), None)?;
            self.repo
                .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
            let mut head_ref = self.repo.find_reference(&local)?;
            head_ref.set_target(theirs.id(), "pull: fast-forward")?;
            self.repo.set_head(&local)?;
            return Ok(());
        }

        self.repo.merge(&[&theirs], None, None)?;
        let index = self.repo.index()?;
        if index.has_conflicts() {
            let count = index.conflicts()?.count();
            return Err(GitWorkspaceError::MergeConflict { count });
        }

        let message = format!("Merge branch '{branch}' of {}", options.remote);
        self.commit(&message, author)?;
        Ok(())
    }

    /// Switch to a local branch, creating it from the default remote's branch of the
    /// same name when only that exists.
    pub fn checkout_branch(&self, name: &str, remote: &str) -> Result<()> {
        let branch = match self.repo.find_branch(name, BranchType::Local) {
            Ok(branch) => branch,
            Err(_) => {
                let upstream = format!("{remote}/{name}");
                let remote_branch = self
                    .repo
                    .find_branch(&upstream, BranchType::Remote)
                    .map_err(|_| GitWorkspaceError::branch_not_found(name))?;
                let commit = remote_branch.get().peel_to_commit()?;
                let mut branch = self.repo.branch(name, &commit, false)?;
                branch.set_upstream(Some(&upstream))?;
                branch
            }
        };

        let refname = branch
            .get()
            .name()
            .ok_or(GitWorkspaceError::InvalidUtf8Path)?
            .to_string();
        let target = branch.get().peel(ObjectType::Commit)?;

        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))?;
        self.repo.set_head(&refname)?;
        Ok(())
    }

    pub fn create_branch(&self, name: &str) -> Result<()> {
        let commit = self.head_commit()?.ok_or(GitWorkspaceError::NoHead)?;
        self.repo.branch(name, &commit, false)?;
        Ok(())
    }

    pub fn delete_branch(&self, name: &str) -> Result<()> {
        let mut branch = self
            .repo
            .find_branch(name, BranchType::Local)
            .map_err(|_| GitWorkspaceError::branch_not_found(name))?;
        branch.delete()?;
        Ok(())
    }

    pub fn local_branches(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Branches of `remote`, without the `remote/` prefix and without `HEAD`.
    pub fn remote_branches(&self, remote: &str) -> Result<Vec<String>> {
        self.repo
            .find_remote(remote)
            .map_err(|_| GitWorkspaceError::remote_not_found(remote))?;

        let prefix = format!("{remote}/");
        let mut names = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = branch?;
            let Some(name) = branch.name()? else {
                continue;
            };
            if let Some(short) = name.strip_prefix(&prefix) {
                if short != "HEAD" {
                    names.push(short.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn remotes(&self) -> Result<Vec<RemoteEntry>> {
        let mut remotes = Vec::new();
        for name in self.repo.remotes()?.iter().flatten() {
            let remote = self.repo.find_remote(name)?;
            remotes.push(RemoteEntry {
                name: name.to_string(),
                url: remote.url().unwrap_or_default().to_string(),
            });
        }
        Ok(remotes)
    }

    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.repo.remote(name, url)?;
        Ok(())
    }

    pub fn log(&self, depth: usize) -> Result<Vec<CommitEntry>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;

        let mut commits = Vec::new();
        for oid in revwalk.take(depth) {
            commits.push(commit_entry(&self.repo.find_commit(oid?)?));
        }
        Ok(commits)
    }

    pub fn blame(&self, path: &str) -> Result<Vec<BlameHunk>> {
        let blame = self.repo.blame_file(Path::new(path), None)?;
        let mut hunks = Vec::with_capacity(blame.len());
        for hunk in blame.iter() {
            let commit = self.repo.find_commit(hunk.final_commit_id())?;
            hunks.push(BlameHunk {
                start_line: hunk.final_start_line(),
                lines: hunk.lines_in_hunk(),
                commit: commit_entry(&commit),
            });
        }
        Ok(hunks)
    }

    pub fn stash_save(&mut self, message: &str, author: &GitAuthor) -> Result<String> {
        let signature = Signature::now(&author.name, &author.email)?;
        let oid = self.repo.stash_save(
            &signature,
            message,
            Some(StashFlags::INCLUDE_UNTRACKED),
        )?;
        Ok(oid.to_string())
    }

    pub fn stash_list(&mut self) -> Result<Vec<StashEntry>> {
        let mut stashes = Vec::new();
        self.repo.stash_foreach(|index, message, oid| {
            stashes.push(StashEntry {
                index,
                message: message.to_string(),
                oid: oid.to_string(),
            });
            true
        })?;
        Ok(stashes)
    }

    pub fn stash_apply(&mut self, index: usize) -> Result<()> {
        self.repo.stash_apply(index, None)?;
        Ok(())
    }

    pub fn stash_pop(&mut self, index: usize) -> Result<()> {
        self.repo.stash_pop(index, None)?;
        Ok(())
    }

    pub fn stash_drop(&mut self, index: usize) -> Result<()> {
        self.repo.stash_drop(index)?;
        Ok(())
    }

    pub fn resolve_ref(&self, reference: &str) -> Result<String> {
        let commit = self.repo.revparse_single(reference)?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    pub fn read_blob(&self, oid: &str, path: &str) -> Result<Vec<u8>> {
        let commit = self.repo.find_commit(Oid::from_str(oid)?)?;
        let entry = commit
            .tree()?
            .get_path(Path::new(path))
            .map_err(|_| GitWorkspaceError::not_found_at_head(path))?;
        let blob = entry
            .to_object(&self.repo)?
            .into_blob()
            .map_err(|_| GitWorkspaceError::not_found_at_head(path))?;
        Ok(blob.content().to_vec())
    }
}

fn commit_entry(commit: &Commit<'_>) -> CommitEntry {
    let author = commit.author();
    CommitEntry {
        oid: commit.id().to_string(),
        message: commit.message().unwrap_or_default().to_string(),
        author: GitAuthor {
            name: author.name().unwrap_or_default().to_string(),
            email: author.email().unwrap_or_default().to_string(),
        },
        timestamp: author.when().seconds(),
    }
}

/// Plain paths and `file://` URLs.
pub fn is_local_url(url: &str) -> bool {
    url.starts_with("file://") || (!url.contains("://") && !url.contains('@'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn author() -> GitAuthor {
        GitAuthor {
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
        }
    }

    fn setup_test_repo() -> Result<(TempDir, GitRepo)> {
        let temp_dir = TempDir::new()?;
        let repo = GitRepo::init(temp_dir.path(), "main")?;
        Ok((temp_dir, repo))
    }

    fn write(temp_dir: &TempDir, path: &str, content: &str) -> Result<()> {
        let full = temp_dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, content)?;
        Ok(())
    }

    fn row<'a>(matrix: &'a StatusMatrix, path: &str) -> Option<&'a StatusRow> {
        matrix.rows.iter().find(|r| r.path == path)
    }

    #[test]
    fn test_open_non_git_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let result = GitRepo::open(temp_dir.path().join("missing"));
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_init_uses_default_branch() -> Result<()> {
        let (_temp_dir, repo) = setup_test_repo()?;
        assert_eq!(repo.current_branch()?, Some("main".to_string()));
        Ok(())
    }

    #[test]
    fn test_matrix_of_empty_repo_is_empty() -> Result<()> {
        let (_temp_dir, repo) = setup_test_repo()?;
        let matrix = repo.status_matrix()?;
        assert!(matrix.rows.is_empty());
        assert!(!matrix.merge_in_progress);
        Ok(())
    }

    #[test]
    fn test_matrix_tracks_lifecycle() -> Result<()> {
        let (temp_dir, repo) = setup_test_repo()?;
        write(&temp_dir, "src/a.txt", "one\n")?;

        let matrix = repo.status_matrix()?;
        assert_eq!(row(&matrix, "src/a.txt"), Some(&StatusRow::new("src/a.txt", 0, 2, 0)));

        repo.add_path("src/a.txt")?;
        let matrix = repo.status_matrix()?;
        assert_eq!(row(&matrix, "src/a.txt"), Some(&StatusRow::new("src/a.txt", 0, 2, 2)));

        repo.commit("first", &author())?;
        let matrix = repo.status_matrix()?;
        assert_eq!(row(&matrix, "src/a.txt"), Some(&StatusRow::new("src/a.txt", 1, 1, 1)));

        write(&temp_dir, "src/a.txt", "two\n")?;
        repo.add_path("src/a.txt")?;
        write(&temp_dir, "src/a.txt", "three\n")?;
        let matrix = repo.status_matrix()?;
        assert_eq!(row(&matrix, "src/a.txt"), Some(&StatusRow::new("src/a.txt", 1, 2, 3)));
        Ok(())
    }

    #[test]
    fn test_deleted_file_staging() -> Result<()> {
        let (temp_dir, repo) = setup_test_repo()?;
        write(&temp_dir, "gone.txt", "bye\n")?;
        repo.add_path("gone.txt")?;
        repo.commit("add", &author())?;

        std::fs::remove_file(temp_dir.path().join("gone.txt"))?;
        let matrix = repo.status_matrix()?;
        assert_eq!(row(&matrix, "gone.txt"), Some(&StatusRow::new("gone.txt", 1, 0, 1)));

        repo.add_path("gone.txt")?;
        let matrix = repo.status_matrix()?;
        assert_eq!(row(&matrix, "gone.txt"), Some(&StatusRow::new("gone.txt", 1, 0, 0)));
        Ok(())
    }

    #[test]
    fn test_reset_and_checkout_paths() -> Result<()> {
        let (temp_dir, repo) = setup_test_repo()?;
        write(&temp_dir, "file.txt", "original\n")?;
        repo.add_path("file.txt")?;
        repo.commit("add", &author())?;

        write(&temp_dir, "file.txt", "changed\n")?;
        repo.add_path("file.txt")?;
        repo.reset_path("file.txt")?;
        let matrix = repo.status_matrix()?;
        assert_eq!(row(&matrix, "file.txt"), Some(&StatusRow::new("file.txt", 1, 2, 1)));

        repo.checkout_paths(&["file.txt".to_string()])?;
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join("file.txt"))?,
            "original\n"
        );
        Ok(())
    }

    #[test]
    fn test_reset_without_commits_unstages() -> Result<()> {
        let (temp_dir, repo) = setup_test_repo()?;
        write(&temp_dir, "new.txt", "x")?;
        repo.add_path("new.txt")?;
        repo.reset_path("new.txt")?;

        let matrix = repo.status_matrix()?;
        assert_eq!(row(&matrix, "new.txt"), Some(&StatusRow::new("new.txt", 0, 2, 0)));
        Ok(())
    }

    #[test]
    fn test_branches_and_log() -> Result<()> {
        let (temp_dir, repo) = setup_test_repo()?;
        write(&temp_dir, "a.txt", "a")?;
        repo.add_path("a.txt")?;
        let first = repo.commit("first", &author())?;
        write(&temp_dir, "a.txt", "b")?;
        repo.add_path("a.txt")?;
        let second = repo.commit("second", &author())?;

        let log = repo.log(10)?;
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].oid, second);
        assert_eq!(log[1].oid, first);
        assert_eq!(log[0].author, author());
        assert_eq!(repo.log(1)?.len(), 1);

        repo.create_branch("feature")?;
        assert_eq!(repo.local_branches()?, vec!["feature", "main"]);

        repo.checkout_branch("feature", "origin")?;
        assert_eq!(repo.current_branch()?, Some("feature".to_string()));

        repo.checkout_branch("main", "origin")?;
        repo.delete_branch("feature")?;
        assert_eq!(repo.local_branches()?, vec!["main"]);
        Ok(())
    }

    #[test]
    fn test_read_blob_at_head() -> Result<()> {
        let (temp_dir, repo) = setup_test_repo()?;
        write(&temp_dir, "dir/readme.md", "hello\n")?;
        repo.add_path("dir/readme.md")?;
        repo.commit("docs", &author())?;

        let head = repo.resolve_ref("HEAD")?;
        assert_eq!(repo.read_blob(&head, "dir/readme.md")?, b"hello\n");
        assert!(matches!(
            repo.read_blob(&head, "missing.md"),
            Err(GitWorkspaceError::NotFoundAtHead { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_remotes() -> Result<()> {
        let (_temp_dir, repo) = setup_test_repo()?;
        repo.add_remote("origin", "https://example.com/repo.git")?;

        let remotes = repo.remotes()?;
        assert_eq!(remotes.len(), 1);
        assert_eq!(remotes[0].url, "https://example.com/repo.git");
        assert!(repo.remote_branches("origin")?.is_empty());
        assert!(repo.remote_branches("upstream").is_err());
        Ok(())
    }

    #[test]
    fn test_single_branch_clone_follows_remote_head() -> Result<()> {
        let (source_dir, source) = setup_test_repo()?;
        write(&source_dir, "a.txt", "a\n")?;
        source.add_path("a.txt")?;
        source.commit("first", &author())?;
        source.create_branch("other")?;

        let target = TempDir::new()?;
        let options = CloneOptions {
            url: source_dir.path().to_string_lossy().into_owned(),
            depth: 1,
            single_branch: true,
            ..Default::default()
        };
        let cloned = GitRepo::clone_into(target.path(), &options)?;

        assert_eq!(cloned.current_branch()?, Some("main".to_string()));
        assert_eq!(cloned.remote_branches("origin")?, vec!["main"]);
        Ok(())
    }

    #[test]
    fn test_commit_during_merge_records_both_parents() -> Result<()> {
        let (temp_dir, repo) = setup_test_repo()?;
        write(&temp_dir, "a.txt", "base\n")?;
        repo.add_path("a.txt")?;
        repo.commit("base", &author())?;

        repo.create_branch("feature")?;
        repo.checkout_branch("feature", "origin")?;
        write(&temp_dir, "a.txt", "feature\n")?;
        repo.add_path("a.txt")?;
        let feature = repo.commit("feature", &author())?;

        repo.checkout_branch("main", "origin")?;
        write(&temp_dir, "a.txt", "main\n")?;
        repo.add_path("a.txt")?;
        repo.commit("main", &author())?;

        let reference = repo.get_repository().find_reference("refs/heads/feature")?;
        let theirs = repo.get_repository().reference_to_annotated_commit(&reference)?;
        repo.get_repository().merge(&[&theirs], None, None)?;
        assert!(repo.status_matrix()?.merge_in_progress);

        write(&temp_dir, "a.txt", "both\n")?;
        repo.add_path("a.txt")?;
        let merge = repo.commit("merge", &author())?;

        let commit = repo.get_repository().find_commit(Oid::from_str(&merge)?)?;
        assert_eq!(commit.parent_count(), 2);
        assert_eq!(commit.parent_id(1)?.to_string(), feature);
        assert_eq!(repo.get_repository().state(), RepositoryState::Clean);
        Ok(())
    }

    #[test]
    fn test_blame_splits_by_commit() -> Result<()> {
        let (temp_dir, repo) = setup_test_repo()?;
        write(&temp_dir, "poem.txt", "one\ntwo\n")?;
        repo.add_path("poem.txt")?;
        let first = repo.commit("first", &author())?;
        write(&temp_dir, "poem.txt", "one\ntwo\nthree\n")?;
        repo.add_path("poem.txt")?;
        let second = repo.commit("second", &author())?;

        let hunks = repo.blame("poem.txt")?;
        assert_eq!(hunks.len(), 2);
        assert_eq!((hunks[0].start_line, hunks[0].lines), (1, 2));
        assert_eq!(hunks[0].commit.oid, first);
        assert_eq!((hunks[1].start_line, hunks[1].lines), (3, 1));
        assert_eq!(hunks[1].commit.oid, second);

        assert!(repo.blame("missing.txt").is_err());
        Ok(())
    }

    #[test]
    fn test_stash_round_trip() -> Result<()> {
        let (temp_dir, mut repo) = setup_test_repo()?;
        write(&temp_dir, "a.txt", "base\n")?;
        repo.add_path("a.txt")?;
        repo.commit("base", &author())?;

        write(&temp_dir, "a.txt", "edited\n")?;
        write(&temp_dir, "loose.txt", "untracked\n")?;
        repo.stash_save("parking", &author())?;
        assert_eq!(std::fs::read_to_string(temp_dir.path().join("a.txt"))?, "base\n");
        assert!(!temp_dir.path().join("loose.txt").exists());

        let stashes = repo.stash_list()?;
        assert_eq!(stashes.len(), 1);
        assert_eq!(stashes[0].index, 0);
        assert!(stashes[0].message.contains("parking"));

        repo.stash_pop(0)?;
        assert_eq!(std::fs::read_to_string(temp_dir.path().join("a.txt"))?, "edited\n");
        assert!(temp_dir.path().join("loose.txt").exists());
        assert!(repo.stash_list()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_local_url_detection() {
        assert!(is_local_url("/tmp/repo.git"));
        assert!(is_local_url("file:///tmp/repo.git"));
        assert!(!is_local_url("https://github.com/a/b.git"));
        assert!(!is_local_url("git@github.com:a/b.git"));
    }
}
