//! Outbound Slack message payload.
//!
//! Mirrors the subset of Slack's incoming-webhook schema the relay produces:
//! a fallback `text`, optional sender overrides, and colour-accented
//! attachments made of Block Kit `section` and `context` blocks.

use serde::{Deserialize, Serialize};

/// A complete webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackMessage {
    /// Fallback text shown in notifications and clients without blocks.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Colour bar plus the blocks rendered beside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub color: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        text: Text,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        accessory: Option<Accessory>,
    },
    Context {
        elements: Vec<Text>,
    },
}

impl Block {
    /// Section holding markdown text.
    #[must_use]
    pub fn markdown(text: impl Into<String>) -> Self {
        Self::Section {
            text: Text::markdown(text),
            accessory: None,
        }
    }

    /// Section holding markdown text and a link button.
    #[must_use]
    pub fn markdown_with_button(
        text: impl Into<String>,
        label: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::Section {
            text: Text::markdown(text),
            accessory: Some(Accessory::Button {
                text: Text::plain(label),
                url: url.into(),
            }),
        }
    }

    /// Small muted footer line.
    #[must_use]
    pub fn context(text: impl Into<String>) -> Self {
        Self::Context {
            elements: vec![Text::markdown(text)],
        }
    }

    /// The block's primary text, for logging and assertions.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Section { text, .. } => text.as_str(),
            Self::Context { elements } => elements.first().map_or("", Text::as_str),
        }
    }

    /// URL of the block's button, if it has one.
    #[must_use]
    pub fn button_url(&self) -> Option<&str> {
        match self {
            Self::Section {
                accessory: Some(Accessory::Button { url, .. }),
                ..
            } => Some(url.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    Mrkdwn { text: String },
    PlainText { text: String },
}

impl Text {
    #[must_use]
    pub fn markdown(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Mrkdwn { text } | Self::PlainText { text } => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Accessory {
    Button { text: Text, url: String },
}
