use serde::{Deserialize, Serialize};

use crate::corpus::CorpusCache;
use crate::llm::{ChatLlm, ChatMessage};
use crate::retrieve::retrieve;

mod prompts;

pub use prompts::{user_prompt, SYSTEM_PROMPT};

/// Shown to the user whenever the chat endpoint fails.
pub const FALLBACK_ANSWER: &str = "抱歉，我现在无法回答这个问题。请检查后端日志。";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    pub answer: String,
    pub context_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl AnswerEnvelope {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub fn build_messages(context: &str, query: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_prompt(context, query)),
    ]
}

/// Answer `query` from retrieved corpus context.
///
/// Never fails: upstream errors become the fallback answer plus error detail.
pub fn answer(
    corpus: &CorpusCache,
    chat: &dyn ChatLlm,
    model: &str,
    query: &str,
    top_k: usize,
) -> AnswerEnvelope {
    let context = retrieve(corpus, query, top_k);
    let messages = build_messages(&context, query);

    match chat.chat(model, &messages) {
        Ok(text) => AnswerEnvelope {
            answer: text,
            context_used: context,
            error: None,
            error_code: None,
        },
        Err(e) => {
            tracing::warn!(code = %e.code, error = %e.detail_line(), "chat completion failed");
            AnswerEnvelope {
                answer: FALLBACK_ANSWER.to_string(),
                context_used: context,
                error: Some(e.detail_line()),
                error_code: Some(e.code),
            }
        }
    }
}
