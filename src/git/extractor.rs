use crate::error::{ExtractionError, Result};
use chrono::{DateTime, FixedOffset};
use git2::{DiffFormat, DiffOptions, Repository, Sort};
use std::path::{Path, PathBuf};

/// Upper bound on collected patch text per commit. Pathological commits
/// (vendored trees, generated files) would otherwise dominate the embedding
/// input and the grounding context.
const MAX_PATCH_BYTES: usize = 100_000;

/// One commit as captured from the repository walk
#[derive(Debug, Clone)]
pub struct CommitRecord {
    /// Full commit SHA (40 hex characters)
    pub sha: String,
    /// Author name
    pub author: String,
    /// Commit timestamp in the committer's timezone
    pub committed_at: DateTime<FixedOffset>,
    /// Full commit message (subject and body, trailing whitespace trimmed)
    pub message: String,
    /// Number of parent commits
    pub parent_count: usize,
    /// What the diff retrieval produced for this commit
    pub diff: DiffOutcome,
}

/// Closed set of diff-retrieval outcomes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// Full rendered show-output: header, indented message, unified patch
    Rendered(String),
    /// Merge commit; diff computation skipped by policy
    MergeSkipped,
    /// Non-merge commit whose diff could not be retrieved
    Unavailable,
}

/// Walks a repository's history and extracts one [`CommitRecord`] per commit
pub struct CommitExtractor {
    repo: Repository,
    repo_path: PathBuf,
}

impl CommitExtractor {
    /// Open the repository containing `path`
    ///
    /// Fails with `PathNotFound` when the path does not exist and with
    /// `InvalidRepository` when no repository is discoverable from it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ExtractionError::PathNotFound(path.display().to_string()).into());
        }

        let repo = Repository::discover(path)
            .map_err(|_| ExtractionError::InvalidRepository(path.display().to_string()))?;

        let repo_path = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();

        tracing::info!("Opened git repository at: {}", repo_path.display());

        Ok(Self { repo, repo_path })
    }

    /// Repository root path
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Extract every commit reachable from HEAD, newest first
    ///
    /// Re-invocation re-walks the full history; deduplication against prior
    /// runs happens downstream against the store's id set.
    pub fn extract_commits(&self) -> Result<Vec<CommitRecord>> {
        if self
            .repo
            .is_empty()
            .map_err(|e| ExtractionError::WalkFailed(e.to_string()))?
        {
            tracing::info!("Repository has no commits");
            return Ok(Vec::new());
        }

        let mut revwalk = self
            .repo
            .revwalk()
            .map_err(|e| ExtractionError::WalkFailed(e.to_string()))?;
        revwalk
            .set_sorting(Sort::TIME | Sort::TOPOLOGICAL)
            .map_err(|e| ExtractionError::WalkFailed(e.to_string()))?;
        revwalk
            .push_head()
            .map_err(|e| ExtractionError::HeadNotFound(e.to_string()))?;

        let mut records = Vec::new();
        for oid in revwalk {
            let oid = oid.map_err(|e| ExtractionError::WalkFailed(e.to_string()))?;
            let commit =
                self.repo
                    .find_commit(oid)
                    .map_err(|e| ExtractionError::CommitReadFailed {
                        sha: oid.to_string(),
                        reason: e.to_string(),
                    })?;

            records.push(self.extract_record(&commit));

            if records.len() % 50 == 0 {
                tracing::debug!("Processed {} commits", records.len());
            }
        }

        tracing::info!(
            "Extracted {} commits from {}",
            records.len(),
            self.repo_path.display()
        );
        Ok(records)
    }

    /// Capture one commit, never failing on diff retrieval
    fn extract_record(&self, commit: &git2::Commit) -> CommitRecord {
        let sha = commit.id().to_string();
        let author = commit.author().name().unwrap_or("Unknown").to_string();
        let message = commit.message().unwrap_or("").trim_end().to_string();
        let committed_at = commit_datetime(&commit.time());
        let parent_count = commit.parent_count();

        let diff = if parent_count > 1 {
            tracing::debug!("Merge commit {}, diff skipped", sha);
            DiffOutcome::MergeSkipped
        } else {
            match self.render_show_output(commit) {
                Ok(text) => DiffOutcome::Rendered(text),
                Err(e) => {
                    tracing::warn!("Could not retrieve diff for {}: {}", sha, e);
                    DiffOutcome::Unavailable
                }
            }
        };

        CommitRecord {
            sha,
            author,
            committed_at,
            message,
            parent_count,
            diff,
        }
    }

    /// Render the commit the way `git show` presents it: a commit header,
    /// the message indented by four spaces, then the unified patch against
    /// the first parent (or the empty tree for a root commit).
    fn render_show_output(&self, commit: &git2::Commit) -> std::result::Result<String, git2::Error> {
        let mut out = String::new();

        out.push_str(&format!("commit {}\n", commit.id()));
        let author = commit.author();
        match (author.name(), author.email()) {
            (Some(name), Some(email)) => {
                out.push_str(&format!("Author: {} <{}>\n", name, email));
            }
            (Some(name), None) => out.push_str(&format!("Author: {}\n", name)),
            _ => out.push_str("Author: Unknown\n"),
        }
        let when = commit_datetime(&commit.time());
        out.push_str(&format!("Date:   {}\n\n", when.format("%a %b %e %H:%M:%S %Y %z")));

        for line in commit.message().unwrap_or("").trim_end().lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');

        out.push_str(&self.render_patch(commit)?);
        Ok(out)
    }

    /// Produce the unified patch text for a non-merge commit
    fn render_patch(&self, commit: &git2::Commit) -> std::result::Result<String, git2::Error> {
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };

        let mut diff_opts = DiffOptions::new();
        diff_opts
            .context_lines(3)
            .interhunk_lines(0)
            .ignore_whitespace(false);

        let diff =
            self.repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut diff_opts))?;

        let mut patch = String::new();
        let mut truncated = false;

        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if truncated {
                return true;
            }

            // Binary content carries no useful embedding signal
            if line.origin() == 'B' {
                return true;
            }

            if patch.len() >= MAX_PATCH_BYTES {
                truncated = true;
                return true;
            }

            if let Ok(content) = std::str::from_utf8(line.content()) {
                match line.origin() {
                    '+' | '-' | ' ' => {
                        patch.push(line.origin());
                        patch.push_str(content);
                    }
                    // File and hunk headers arrive fully formed
                    _ => patch.push_str(content),
                }
            } else {
                tracing::debug!("Skipping diff line with invalid UTF-8");
            }

            true
        })?;

        if truncated {
            patch.push_str("\n[... diff truncated ...]\n");
            tracing::warn!("Truncated large diff for commit {}", commit.id());
        }

        Ok(patch)
    }
}

/// Convert a git timestamp into a chrono datetime carrying the committer's
/// UTC offset
fn commit_datetime(time: &git2::Time) -> DateTime<FixedOffset> {
    let utc = DateTime::from_timestamp(time.seconds(), 0).unwrap_or_default();
    match FixedOffset::east_opt(time.offset_minutes() * 60) {
        Some(offset) => utc.with_timezone(&offset),
        None => utc.fixed_offset(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Oid, Signature, Time};
    use tempfile::TempDir;

    fn signature(seconds: i64) -> Signature<'static> {
        Signature::new("Test Author", "test@example.com", &Time::new(seconds, 120)).unwrap()
    }

    fn add_commit(
        repo: &Repository,
        file: &str,
        content: &str,
        message: &str,
        seconds: i64,
        update_head: bool,
    ) -> Oid {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(file), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();

        let parent = repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| repo.find_commit(oid).unwrap());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let sig = signature(seconds);
        let update_ref = if update_head { Some("HEAD") } else { None };
        repo.commit(update_ref, &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn add_merge_commit(
        repo: &Repository,
        first: Oid,
        second: Oid,
        message: &str,
        seconds: i64,
    ) -> Oid {
        let first_commit = repo.find_commit(first).unwrap();
        let second_commit = repo.find_commit(second).unwrap();
        let tree = first_commit.tree().unwrap();
        let sig = signature(seconds);
        repo.commit(
            Some("HEAD"),
            &sig,
            &sig,
            message,
            &tree,
            &[&first_commit, &second_commit],
        )
        .unwrap()
    }

    #[test]
    fn test_path_not_found() {
        let err = CommitExtractor::open("/definitely/not/a/path").unwrap_err();
        assert!(err.to_string().contains("Path does not exist"));
    }

    #[test]
    fn test_invalid_repository() {
        let dir = TempDir::new().unwrap();
        let err = CommitExtractor::open(dir.path()).unwrap_err();
        assert!(err.to_string().contains("Not a git repository"));
    }

    #[test]
    fn test_empty_repository_yields_no_records() {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();

        let extractor = CommitExtractor::open(dir.path()).unwrap();
        let records = extractor.extract_commits().unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_extract_commits_newest_first() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        add_commit(&repo, "a.txt", "one\n", "first commit", 1_704_067_200, true);
        add_commit(&repo, "a.txt", "two\n", "second commit", 1_704_070_800, true);

        let extractor = CommitExtractor::open(dir.path()).unwrap();
        let records = extractor.extract_commits().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "second commit");
        assert_eq!(records[1].message, "first commit");
        for record in &records {
            assert_eq!(record.sha.len(), 40);
            assert_eq!(record.author, "Test Author");
        }
    }

    #[test]
    fn test_root_commit_renders_patch_against_empty_tree() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        add_commit(&repo, "a.txt", "hello\n", "first commit", 1_704_067_200, true);

        let extractor = CommitExtractor::open(dir.path()).unwrap();
        let records = extractor.extract_commits().unwrap();

        assert_eq!(records[0].parent_count, 0);
        match &records[0].diff {
            DiffOutcome::Rendered(text) => {
                assert!(text.starts_with(&format!("commit {}", records[0].sha)));
                assert!(text.contains("Author: Test Author <test@example.com>"));
                assert!(text.contains("    first commit"));
                assert!(text.contains("+hello"));
            }
            other => panic!("expected rendered diff, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_commit_skips_diff() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let base = add_commit(&repo, "a.txt", "one\n", "base", 1_704_067_200, true);
        let side = add_commit(&repo, "b.txt", "side\n", "side branch", 1_704_070_800, false);
        let tip = add_commit(&repo, "a.txt", "two\n", "mainline", 1_704_074_400, true);
        let merge = add_merge_commit(&repo, tip, side, "merge side branch", 1_704_078_000);

        assert_ne!(base, merge);

        let extractor = CommitExtractor::open(dir.path()).unwrap();
        let records = extractor.extract_commits().unwrap();

        let merge_record = records
            .iter()
            .find(|r| r.sha == merge.to_string())
            .expect("merge commit present");
        assert_eq!(merge_record.parent_count, 2);
        assert_eq!(merge_record.diff, DiffOutcome::MergeSkipped);
    }

    #[test]
    fn test_committer_offset_preserved() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        // 2024-01-01 00:00:00 UTC, committed at +02:00
        add_commit(&repo, "a.txt", "x\n", "tz check", 1_704_067_200, true);

        let extractor = CommitExtractor::open(dir.path()).unwrap();
        let records = extractor.extract_commits().unwrap();

        let local = records[0].committed_at;
        assert_eq!(local.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(
            local.format("%Y-%m-%d %H:%M:%S").to_string(),
            "2024-01-01 02:00:00"
        );
    }

    #[test]
    fn test_open_from_subdirectory() {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        add_commit(&repo, "a.txt", "x\n", "init", 1_704_067_200, true);
        let sub = dir.path().join("nested");
        std::fs::create_dir(&sub).unwrap();

        let extractor = CommitExtractor::open(&sub).unwrap();
        assert_eq!(extractor.extract_commits().unwrap().len(), 1);
    }
}
