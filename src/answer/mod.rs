//! Query pipeline: similarity retrieval and grounded answer synthesis
//!
//! The synthesizer never lets the generative model answer from thin air: a
//! question either gets a prompt built from retrieved commit documents, or
//! the fixed no-context reply when retrieval comes back empty.

use std::sync::Arc;

use crate::error::Result;
use crate::generation::TextGenerator;
use crate::store::CommitStore;
use crate::types::RetrievedCommit;

/// Separator between context documents inside the prompt, distinct enough
/// that commit texts do not bleed into each other
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// Fixed reply when retrieval returns nothing to ground an answer on
pub const NO_CONTEXT_ANSWER: &str =
    "I couldn't find any relevant commits in the database to answer that question.";

/// Top-K similarity retrieval over the commit store
pub struct Retriever {
    store: Arc<dyn CommitStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(store: Arc<dyn CommitStore>, top_k: usize) -> Self {
        Self {
            store,
            top_k: top_k.max(1),
        }
    }

    /// Return the top-K nearest stored commits, best-first
    ///
    /// An empty result is a defined outcome ("nothing to ground an answer
    /// on"), not an error. Callers are expected to have rejected blank
    /// questions already.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievedCommit>> {
        self.store.search(question, self.top_k).await
    }
}

/// Assemble the grounded prompt: instructions, delimited context, question
pub fn build_prompt(context_texts: &[String], question: &str) -> String {
    let context = context_texts.join(CONTEXT_DELIMITER);
    format!(
        "You are a helpful Git project assistant. Your task is to answer the user's question \
         based *only* on the provided Git commit data. Do not make up information. If the \
         answer is not in the provided commits, say so.\n\n\
         Here is the relevant commit data:\n\
         ---\n\
         {context}\n\
         ---\n\n\
         User's Question:\n\
         {question}\n\n\
         Answer:"
    )
}

/// One question in, one answer out
pub struct AnswerSynthesizer {
    retriever: Retriever,
    generator: Arc<dyn TextGenerator>,
}

impl AnswerSynthesizer {
    pub fn new(retriever: Retriever, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    /// Answer one question against the indexed history
    ///
    /// The generative backend is invoked exactly once, and only when
    /// retrieval produced context.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let retrieved = self.retriever.retrieve(question).await?;
        if retrieved.is_empty() {
            return Ok(NO_CONTEXT_ANSWER.to_string());
        }

        tracing::debug!("Retrieved {} commits for grounding", retrieved.len());

        let texts: Vec<String> = retrieved.into_iter().map(|doc| doc.text).collect();
        let prompt = build_prompt(&texts, question);
        self.generator.generate(&prompt).await
    }
}
