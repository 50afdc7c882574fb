use dashmap::DashMap;

use crate::models::Message;

// Conversation memory - per session, capped to the most recent messages
pub struct ConversationStore {
    sessions: DashMap<String, Vec<Message>>,
    max_messages: usize,
}

impl ConversationStore {
    pub fn new(max_messages: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_messages,
        }
    }

    // Record the user turn and return the history to send upstream
    pub fn push_user(&self, session: &str, content: &str) -> Vec<Message> {
        let mut history = self.sessions.entry(session.to_string()).or_default();
        history.push(Message::user(content));
        trim(&mut history, self.max_messages);
        history.value().clone()
    }

    pub fn push_assistant(&self, session: &str, content: &str) {
        let mut history = self.sessions.entry(session.to_string()).or_default();
        history.push(Message::assistant(content));
        trim(&mut history, self.max_messages);
    }

    // Clear one session, or everything when no session is given.
    // Returns how many sessions were dropped.
    pub fn reset(&self, session: Option<&str>) -> usize {
        match session {
            Some(id) => self.sessions.remove(id).map(|_| 1).unwrap_or(0),
            None => {
                let dropped = self.sessions.len();
                self.sessions.clear();
                dropped
            }
        }
    }

    pub fn history(&self, session: &str) -> Vec<Message> {
        self.sessions
            .get(session)
            .map(|h| h.value().clone())
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

fn trim(history: &mut Vec<Message>, max: usize) {
    if history.len() > max {
        let excess = history.len() - max;
        history.drain(..excess);
    }
}
