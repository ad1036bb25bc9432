//! Search condition for paged quote listings

use crate::quote::Quote;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Substring filters over author and content.
///
/// A filter is active only when it is present and not blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCondition {
    pub author_contains: Option<String>,
    pub content_contains: Option<String>,
}

impl SearchCondition {
    pub fn new(author_contains: Option<String>, content_contains: Option<String>) -> Self {
        Self {
            author_contains,
            content_contains,
        }
    }

    /// No filtering at all
    pub fn none() -> Self {
        Self::default()
    }

    pub fn author(keyword: impl Into<String>) -> Self {
        Self::new(Some(keyword.into()), None)
    }

    pub fn content(keyword: impl Into<String>) -> Self {
        Self::new(None, Some(keyword.into()))
    }

    /// Build a condition from a keyword and the field it targets.
    ///
    /// A blank keyword disables filtering regardless of the type; `All`
    /// activates both fields with the same keyword.
    pub fn from_keyword(keyword_type: KeywordType, keyword: &str) -> Self {
        if keyword.trim().is_empty() {
            return Self::none();
        }
        match keyword_type {
            KeywordType::Author => Self::author(keyword),
            KeywordType::Content => Self::content(keyword),
            KeywordType::All => Self::new(Some(keyword.to_string()), Some(keyword.to_string())),
        }
    }

    /// Active author filter, if any
    pub fn author_filter(&self) -> Option<&str> {
        active(self.author_contains.as_deref())
    }

    /// Active content filter, if any
    pub fn content_filter(&self) -> Option<&str> {
        active(self.content_contains.as_deref())
    }

    pub fn is_unfiltered(&self) -> bool {
        self.author_filter().is_none() && self.content_filter().is_none()
    }

    /// Whether `quote` survives this condition.
    ///
    /// With both filters active a quote is kept when either one matches.
    /// Matching is a literal, case-sensitive substring test.
    pub fn matches(&self, quote: &Quote) -> bool {
        match (self.author_filter(), self.content_filter()) {
            (None, None) => true,
            (Some(author), None) => quote.author.contains(author),
            (None, Some(content)) => quote.content.contains(content),
            (Some(author), Some(content)) => {
                quote.author.contains(author) || quote.content.contains(content)
            }
        }
    }
}

fn active(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Which field a listing keyword searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordType {
    Author,
    Content,
    #[default]
    All,
}

impl FromStr for KeywordType {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to `All`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "author" => KeywordType::Author,
            "content" => KeywordType::Content,
            _ => KeywordType::All,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::QuoteId;

    fn quote(author: &str, content: &str) -> Quote {
        Quote::new(QuoteId(1), author, content)
    }

    #[test]
    fn test_blank_filters_are_inactive() {
        let cond = SearchCondition::new(Some("  ".to_string()), Some(String::new()));
        assert!(cond.is_unfiltered());
        assert!(cond.matches(&quote("anyone", "anything")));
    }

    #[test]
    fn test_author_only() {
        let cond = SearchCondition::author("Marcus");
        assert!(cond.matches(&quote("Marcus Aurelius", "x")));
        assert!(!cond.matches(&quote("Seneca", "Marcus said")));
    }

    #[test]
    fn test_content_only() {
        let cond = SearchCondition::content("time");
        assert!(cond.matches(&quote("Seneca", "time is short")));
        assert!(!cond.matches(&quote("time lord", "nothing")));
    }

    #[test]
    fn test_both_active_is_union() {
        let cond = SearchCondition::new(Some("Seneca".into()), Some("river".into()));
        assert!(cond.matches(&quote("Seneca", "life is long")));
        assert!(cond.matches(&quote("Heraclitus", "no man steps in the same river")));
        assert!(!cond.matches(&quote("Epictetus", "wealth")));
    }

    #[test]
    fn test_matching_is_case_sensitive_and_literal() {
        assert!(!SearchCondition::author("seneca").matches(&quote("Seneca", "x")));
        assert!(!SearchCondition::content("l%e").matches(&quote("a", "life")));
    }

    #[test]
    fn test_from_keyword() {
        assert_eq!(
            SearchCondition::from_keyword(KeywordType::Author, "kim"),
            SearchCondition::author("kim")
        );
        assert_eq!(
            SearchCondition::from_keyword(KeywordType::Content, "kim"),
            SearchCondition::content("kim")
        );
        assert_eq!(
            SearchCondition::from_keyword(KeywordType::All, "kim"),
            SearchCondition::new(Some("kim".into()), Some("kim".into()))
        );
        assert!(SearchCondition::from_keyword(KeywordType::Author, " ").is_unfiltered());
    }

    #[test]
    fn test_keyword_type_parse() {
        assert_eq!("author".parse::<KeywordType>().unwrap(), KeywordType::Author);
        assert_eq!("content".parse::<KeywordType>().unwrap(), KeywordType::Content);
        assert_eq!("whatever".parse::<KeywordType>().unwrap(), KeywordType::All);
    }
}
