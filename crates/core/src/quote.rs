//! Quote core types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a stored quote, issued by the backend on create
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(pub i64);

impl QuoteId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for QuoteId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A stored quote.
///
/// Field order is significant: it is the order the file backends write the
/// fields in (`id`, `content`, `author`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub content: String,
    pub author: String,
}

impl Quote {
    pub fn new(id: QuoteId, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            author: author.into(),
        }
    }

    /// Build the record that replaces this one on update; the id never changes.
    pub fn replaced_by(&self, draft: &QuoteDraft) -> Self {
        draft.clone().into_quote(self.id)
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.id, self.author, self.content)
    }
}

/// Author and content of a quote that has no id yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteDraft {
    pub author: String,
    pub content: String,
}

impl QuoteDraft {
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
        }
    }

    pub fn into_quote(self, id: QuoteId) -> Quote {
        Quote {
            id,
            content: self.content,
            author: self.author,
        }
    }
}
