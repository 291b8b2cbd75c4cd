//! Prompt composition for the chat flow.
//!
//! Produces the ordered message sequence the gateway sends: one system
//! message (persona, task framing, inlined farmer context, the
//! language-mirroring instruction), the memory snapshot, and one user
//! message carrying the question plus the retrieved knowledge section.
//! Injected text is interpolated literally; sanitization is out of scope
//! here.

use crate::llm::Message;
use crate::retrieval::RetrievedDocument;

/// Instruction asking the model to mirror the user's language. Best-effort:
/// present in every prompt, but compliance cannot be enforced.
pub const LANGUAGE_INSTRUCTION: &str =
    "Always respond in the SAME language as the user's question. Be concise but thorough.";

/// Builds the chat message sequence
#[derive(Debug, Clone)]
pub struct PromptComposer {
    persona: String,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new("AgriMind")
    }
}

impl PromptComposer {
    pub fn new(persona: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
        }
    }

    /// System message: persona, task framing, and the rendered context block
    pub fn system_prompt(&self, context_block: &str) -> String {
        format!(
            "You are a helpful farming assistant named {}.\n\
             Provide accurate, practical advice based on the knowledge base and the specific farmer context provided.\n\n\
             {}\n\n\
             {}",
            self.persona, context_block, LANGUAGE_INSTRUCTION
        )
    }

    /// User message: the question plus the knowledge-base section. The
    /// section stays present even when retrieval came back empty.
    pub fn user_prompt(&self, question: &str, documents: &[RetrievedDocument]) -> String {
        let knowledge: Vec<&str> = documents.iter().map(|d| d.text.as_str()).collect();
        format!(
            "Question: {}\n\nKnowledge Base:\n{}\n\nPlease provide a detailed, helpful answer:",
            question,
            knowledge.join("\n")
        )
    }

    /// Full ordered sequence: system, then history, then the current user
    /// message
    pub fn compose(
        &self,
        question: &str,
        context_block: &str,
        documents: &[RetrievedDocument],
        history: &[Message],
    ) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.system_prompt(context_block)));
        messages.extend_from_slice(history);
        messages.push(Message::user(self.user_prompt(question, documents)));
        messages
    }
}
