//! Pure conversion from extracted commits to indexable documents
//!
//! Non-merge commits with a retrieved diff are stored as the extractor's
//! show-output verbatim; merge commits and failed retrievals fall back to a
//! fixed metadata-only template.

use crate::git::extractor::{CommitRecord, DiffOutcome};
use crate::types::{CommitMetadata, IndexDocument};
use chrono::{DateTime, FixedOffset};

/// Marker embedded for merge commits
pub const MERGE_DIFF_NOTE: &str = "Merge commit, no diff indexed";

/// Marker embedded when diff retrieval failed for a non-merge commit
pub const MISSING_DIFF_NOTE: &str = "Error retrieving diff";

/// Format a commit timestamp as `YYYY-MM-DD HH:MM:SS` in its own offset
///
/// This string lands both in stored metadata and, via the fallback template,
/// in embedded text, so it must stay stable across runs.
pub fn format_commit_date(committed_at: &DateTime<FixedOffset>) -> String {
    committed_at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Render one commit record into its stored document
pub fn build_document(record: &CommitRecord) -> IndexDocument {
    let date = format_commit_date(&record.committed_at);

    let text = match &record.diff {
        DiffOutcome::Rendered(show_output) => show_output.clone(),
        DiffOutcome::MergeSkipped => fallback_text(record, &date, MERGE_DIFF_NOTE),
        DiffOutcome::Unavailable => fallback_text(record, &date, MISSING_DIFF_NOTE),
    };

    IndexDocument {
        id: record.sha.clone(),
        text,
        metadata: CommitMetadata {
            author: record.author.clone(),
            date,
            sha: record.sha.clone(),
        },
    }
}

/// Convert a full extraction pass, preserving order
pub fn build_documents(records: &[CommitRecord]) -> Vec<IndexDocument> {
    records.iter().map(build_document).collect()
}

fn fallback_text(record: &CommitRecord, date: &str, reason: &str) -> String {
    format!(
        "Author: {}\nDate: {}\nMessage: {}\nDiff: --- {} ---",
        record.author, date, record.message, reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_record(diff: DiffOutcome) -> CommitRecord {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        CommitRecord {
            sha: "abc123def4567890abc123def4567890abc123de".to_string(),
            author: "Jane Smith".to_string(),
            committed_at: offset.with_ymd_and_hms(2024, 1, 1, 14, 30, 5).unwrap(),
            message: "Fix authentication bug".to_string(),
            parent_count: 1,
            diff,
        }
    }

    #[test]
    fn test_rendered_diff_passes_through_verbatim() {
        let show = "commit abc\nAuthor: Jane Smith <j@example.com>\n\n    Fix\n\n+new line\n";
        let record = create_test_record(DiffOutcome::Rendered(show.to_string()));

        let doc = build_document(&record);
        assert_eq!(doc.text, show);
        assert_eq!(doc.id, record.sha);
    }

    #[test]
    fn test_merge_commit_uses_fallback_template() {
        let mut record = create_test_record(DiffOutcome::MergeSkipped);
        record.parent_count = 2;

        let doc = build_document(&record);
        assert_eq!(
            doc.text,
            "Author: Jane Smith\nDate: 2024-01-01 14:30:05\nMessage: Fix authentication bug\n\
             Diff: --- Merge commit, no diff indexed ---"
        );
    }

    #[test]
    fn test_unavailable_diff_uses_error_marker() {
        let record = create_test_record(DiffOutcome::Unavailable);

        let doc = build_document(&record);
        assert!(doc.text.contains(MISSING_DIFF_NOTE));
        assert!(!doc.text.contains(MERGE_DIFF_NOTE));
    }

    #[test]
    fn test_metadata_populated_for_every_shape() {
        for diff in [
            DiffOutcome::Rendered("show".to_string()),
            DiffOutcome::MergeSkipped,
            DiffOutcome::Unavailable,
        ] {
            let record = create_test_record(diff);
            let doc = build_document(&record);

            assert_eq!(doc.metadata.author, "Jane Smith");
            assert_eq!(doc.metadata.date, "2024-01-01 14:30:05");
            assert_eq!(doc.metadata.sha, record.sha);
            assert_eq!(doc.id, doc.metadata.sha);
        }
    }

    #[test]
    fn test_date_formatted_in_committer_offset() {
        // 2024-06-30 23:45:00 UTC is already the next day at +05:30
        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let committed_at = chrono::Utc
            .with_ymd_and_hms(2024, 6, 30, 23, 45, 0)
            .unwrap()
            .with_timezone(&offset);

        assert_eq!(format_commit_date(&committed_at), "2024-07-01 05:15:00");
    }

    #[test]
    fn test_build_documents_preserves_order() {
        let mut first = create_test_record(DiffOutcome::MergeSkipped);
        first.sha = "1111111111111111111111111111111111111111".to_string();
        let mut second = create_test_record(DiffOutcome::Unavailable);
        second.sha = "2222222222222222222222222222222222222222".to_string();

        let docs = build_documents(&[first, second]);
        assert_eq!(docs.len(), 2);
        assert!(docs[0].id.starts_with('1'));
        assert!(docs[1].id.starts_with('2'));
    }
}
