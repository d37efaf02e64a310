//! Player Messages
//!
//! Messages the perception pass produces for the player's log.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a message is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Bad,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Bad => write!(f, "bad"),
        }
    }
}

/// A single line in the message log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMessage {
    pub severity: Severity,
    pub text: String,
}

impl fmt::Display for GameMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => write!(f, "{}", self.text),
            severity => write!(f, "({}) {}", severity, self.text),
        }
    }
}

/// Resource collecting messages for the player
#[derive(Resource, Debug, Default)]
pub struct MessageLog {
    messages: Vec<GameMessage>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, severity: Severity, text: impl Into<String>) {
        self.messages.push(GameMessage {
            severity,
            text: text.into(),
        });
    }

    pub fn messages(&self) -> &[GameMessage] {
        &self.messages
    }

    /// True if any message has exactly this text.
    pub fn contains(&self, text: &str) -> bool {
        self.messages.iter().any(|m| m.text == text)
    }

    pub fn drain(&mut self) -> Vec<GameMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}
