//! Conversation History
//!
//! The ordered, role-tagged turns sent to the model with every request.
//!
//! # Invariants
//!
//! - At most one system turn, always first, seeded from the system prompt.
//! - After it, turns strictly alternate user / assistant.
//! - A user turn is appended when an exchange begins; it is removed again if
//!   the exchange is cancelled, so a failed or abandoned answer never leaves
//!   an orphaned question behind.
//! - `reset` returns to the seeded state and invalidates every open exchange.

use serde::{Deserialize, Serialize};

/// Who authored a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Portfolio context prompt
    System,
    /// Visitor question
    User,
    /// Model answer
    Assistant,
}

/// A single turn in the conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who authored the turn
    pub role: Role,
    /// Turn text
    pub content: String,
}

impl ConversationTurn {
    /// Create a new turn
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Ticket for an exchange that has begun but not finished
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exchange {
    generation: u64,
    user_index: usize,
}

/// Conversation history
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    system_prompt: Option<String>,
    turns: Vec<ConversationTurn>,
    open_exchange: Option<Exchange>,
    generation: u64,
}

impl Conversation {
    /// Create a conversation seeded with `system_prompt` (empty = no system turn)
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let prompt = system_prompt.into();
        let mut conversation = Self {
            system_prompt: (!prompt.is_empty()).then_some(prompt),
            ..Self::default()
        };
        conversation.reset();
        conversation
    }

    /// Start an exchange by appending the user turn
    ///
    /// Returns `None` while another exchange is still open.
    pub fn begin_exchange(&mut self, question: impl Into<String>) -> Option<Exchange> {
        if self.open_exchange.is_some() {
            return None;
        }
        let exchange = Exchange {
            generation: self.generation,
            user_index: self.turns.len(),
        };
        self.turns.push(ConversationTurn::new(Role::User, question));
        self.open_exchange = Some(exchange);
        Some(exchange)
    }

    /// Finish an exchange by appending the assistant turn
    ///
    /// Returns false (and changes nothing) if the exchange is stale, i.e. the
    /// conversation was reset after it began.
    pub fn commit_exchange(&mut self, exchange: Exchange, answer: impl Into<String>) -> bool {
        if self.open_exchange != Some(exchange) {
            return false;
        }
        self.turns.push(ConversationTurn::new(Role::Assistant, answer));
        self.open_exchange = None;
        true
    }

    /// Abandon an exchange, removing its user turn
    pub fn cancel_exchange(&mut self, exchange: Exchange) {
        if self.open_exchange != Some(exchange) {
            return;
        }
        self.turns.truncate(exchange.user_index);
        self.open_exchange = None;
    }

    /// Whether an exchange is in flight
    pub fn has_open_exchange(&self) -> bool {
        self.open_exchange.is_some()
    }

    /// Return to the seeded state (system turn only, or empty)
    pub fn reset(&mut self) {
        self.turns.clear();
        self.open_exchange = None;
        self.generation = self.generation.wrapping_add(1);
        if let Some(ref prompt) = self.system_prompt {
            self.turns
                .push(ConversationTurn::new(Role::System, prompt.clone()));
        }
    }

    /// Drop everything, including the system prompt
    pub fn clear(&mut self) {
        self.system_prompt = None;
        self.reset();
    }

    /// All turns in order
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether there are no turns at all
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The seeded system prompt, if any
    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(conversation: &Conversation) -> Vec<Role> {
        conversation.turns().iter().map(|t| t.role).collect()
    }

    #[test]
    fn test_seeded_with_system_turn() {
        let conversation = Conversation::new("You are helpful");
        assert_eq!(conversation.len(), 1);
        assert_eq!(conversation.turns()[0].role, Role::System);
        assert_eq!(conversation.system_prompt(), Some("You are helpful"));
    }

    #[test]
    fn test_empty_prompt_means_no_system_turn() {
        let conversation = Conversation::new("");
        assert!(conversation.is_empty());
        assert_eq!(conversation.system_prompt(), None);
    }

    #[test]
    fn test_exchange_alternates() {
        let mut conversation = Conversation::new("sys");

        let first = conversation.begin_exchange("Hi").unwrap();
        assert!(conversation.commit_exchange(first, "Hello!"));
        let second = conversation.begin_exchange("Projects?").unwrap();
        assert!(conversation.commit_exchange(second, "Several."));

        assert_eq!(
            roles(&conversation),
            vec![Role::System, Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
    }

    #[test]
    fn test_only_one_open_exchange() {
        let mut conversation = Conversation::new("");
        let _open = conversation.begin_exchange("first").unwrap();
        assert!(conversation.begin_exchange("second").is_none());
        assert_eq!(conversation.len(), 1);
    }

    #[test]
    fn test_cancel_removes_user_turn() {
        let mut conversation = Conversation::new("sys");
        let exchange = conversation.begin_exchange("doomed").unwrap();
        conversation.cancel_exchange(exchange);

        assert_eq!(roles(&conversation), vec![Role::System]);
        assert!(!conversation.has_open_exchange());
    }

    #[test]
    fn test_reset_invalidates_open_exchange() {
        let mut conversation = Conversation::new("sys");
        let exchange = conversation.begin_exchange("before reset").unwrap();
        conversation.reset();

        assert!(!conversation.commit_exchange(exchange, "late answer"));
        assert_eq!(roles(&conversation), vec![Role::System]);

        // Cancelling the stale exchange must not touch the fresh history
        let fresh = conversation.begin_exchange("after reset").unwrap();
        conversation.cancel_exchange(exchange);
        assert_eq!(conversation.len(), 2);
        assert!(conversation.commit_exchange(fresh, "ok"));
    }

    #[test]
    fn test_reset_keeps_at_most_system_turn() {
        let mut conversation = Conversation::new("sys");
        for i in 0..5 {
            let ex = conversation.begin_exchange(format!("q{i}")).unwrap();
            conversation.commit_exchange(ex, format!("a{i}"));
        }
        conversation.reset();
        assert_eq!(conversation.len(), 1);

        conversation.clear();
        assert!(conversation.is_empty());
    }

    #[test]
    fn test_turn_serializes_lowercase_role() {
        let turn = ConversationTurn::new(Role::Assistant, "x");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
