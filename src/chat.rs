//! Interactive question-answering session over an indexed repository
//!
//! Line-oriented loop: blank input re-prompts, `exit`/`quit` (any case)
//! ends the session, and everything else is treated as a question. Errors
//! inside a turn are reported and the loop keeps going.

use std::io::Write;

use tokio::io::AsyncBufReadExt;

use crate::answer::AnswerSynthesizer;
use crate::error::Result;

/// What to do with one line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// End the session
    Exit,
    /// Blank line, prompt again
    Skip,
    /// Submit the trimmed question
    Ask(String),
}

/// Classify a raw input line
pub fn classify_input(line: &str) -> TurnOutcome {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return TurnOutcome::Skip;
    }
    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        return TurnOutcome::Exit;
    }
    TurnOutcome::Ask(trimmed.to_string())
}

/// Interactive chat loop bound to one [`AnswerSynthesizer`]
pub struct ChatSession {
    synthesizer: AnswerSynthesizer,
    indexed_commits: usize,
}

impl ChatSession {
    pub fn new(synthesizer: AnswerSynthesizer, indexed_commits: usize) -> Self {
        Self {
            synthesizer,
            indexed_commits,
        }
    }

    /// Run the session until `exit`/`quit` or end of input
    ///
    /// Interrupt handling lives in the binary, wrapped around this future,
    /// so a signal during a slow turn also ends the session.
    pub async fn run(&self) -> Result<()> {
        println!("--- Commit History Chat ---");
        println!(
            "Found {} indexed commits. Ask questions about the project's history.",
            self.indexed_commits
        );
        println!("Type 'exit' or 'quit' to end the session.");

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            print!("\nQuery: ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                // End of input
                println!();
                return Ok(());
            };

            match classify_input(&line) {
                TurnOutcome::Exit => {
                    println!("Exiting...");
                    return Ok(());
                }
                TurnOutcome::Skip => continue,
                TurnOutcome::Ask(question) => self.run_turn(&question).await,
            }
        }
    }

    /// One question-answer turn; failures are reported, never propagated
    async fn run_turn(&self, question: &str) {
        println!("Searching the commit database...");
        match self.synthesizer.answer(question).await {
            Ok(answer) => println!("\nAnswer: {}", answer),
            Err(e) => eprintln!("An error occurred: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Retriever;
    use crate::error::StoreError;
    use crate::generation::TextGenerator;
    use crate::store::CommitStore;
    use crate::types::{IndexDocument, RetrievedCommit};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_exit_commands_any_case() {
        assert_eq!(classify_input("exit"), TurnOutcome::Exit);
        assert_eq!(classify_input("EXIT"), TurnOutcome::Exit);
        assert_eq!(classify_input("Quit"), TurnOutcome::Exit);
        assert_eq!(classify_input("  quit  "), TurnOutcome::Exit);
    }

    #[test]
    fn test_blank_input_is_skipped() {
        assert_eq!(classify_input(""), TurnOutcome::Skip);
        assert_eq!(classify_input("   "), TurnOutcome::Skip);
        assert_eq!(classify_input("\t"), TurnOutcome::Skip);
    }

    #[test]
    fn test_questions_are_trimmed_and_submitted() {
        assert_eq!(
            classify_input("  who fixed the login bug?  "),
            TurnOutcome::Ask("who fixed the login bug?".to_string())
        );
    }

    #[test]
    fn test_exit_must_be_the_whole_line() {
        assert_eq!(
            classify_input("exit the building"),
            TurnOutcome::Ask("exit the building".to_string())
        );
    }

    struct FailingStore;

    #[async_trait]
    impl CommitStore for FailingStore {
        async fn existing_ids(&self) -> Result<HashSet<String>> {
            Ok(HashSet::new())
        }

        async fn add_documents(&self, _documents: &[IndexDocument]) -> Result<usize> {
            Ok(0)
        }

        async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<RetrievedCommit>> {
            Err(StoreError::SearchFailed("connection reset".to_string()).into())
        }

        async fn count(&self) -> Result<usize> {
            Ok(0)
        }
    }

    struct NeverGenerator;

    #[async_trait]
    impl TextGenerator for NeverGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            panic!("generation must not run when the search fails");
        }
    }

    #[tokio::test]
    async fn test_turn_failure_does_not_propagate() {
        let synthesizer = AnswerSynthesizer::new(
            Retriever::new(Arc::new(FailingStore), 5),
            Arc::new(NeverGenerator),
        );
        let session = ChatSession::new(synthesizer, 0);

        // The turn reports the failure and completes normally.
        session.run_turn("what broke?").await;
    }
}
