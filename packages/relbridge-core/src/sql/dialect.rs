//! Identifier quoting and placeholder styles.

use serde::{Deserialize, Serialize};

/// How identifiers are quoted in synthesized statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierQuote {
    /// Identifiers are emitted verbatim
    None,
    /// `"name"`
    #[default]
    Ansi,
    /// `` `name` ``
    Backtick,
    /// `[name]`
    Bracket,
}

/// How positional parameters are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderStyle {
    /// `?`
    #[default]
    Question,
    /// `?1`, `?2`, ...
    Numbered,
    /// `$1`, `$2`, ...
    Dollar,
}

/// Statement text conventions of the target datasource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlDialect {
    pub identifier_quote: IdentifierQuote,
    pub placeholder: PlaceholderStyle,
}

impl SqlDialect {
    pub fn new(identifier_quote: IdentifierQuote, placeholder: PlaceholderStyle) -> Self {
        Self {
            identifier_quote,
            placeholder,
        }
    }

    /// Quotes a catalog identifier, doubling any embedded closing quote.
    pub fn quote(&self, identifier: &str) -> String {
        match self.identifier_quote {
            IdentifierQuote::None => identifier.to_string(),
            IdentifierQuote::Ansi => format!("\"{}\"", identifier.replace('"', "\"\"")),
            IdentifierQuote::Backtick => format!("`{}`", identifier.replace('`', "``")),
            IdentifierQuote::Bracket => format!("[{}]", identifier.replace(']', "]]")),
        }
    }

    /// Placeholder for the 1-based parameter `position`.
    pub fn placeholder(&self, position: usize) -> String {
        match self.placeholder {
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Numbered => format!("?{}", position),
            PlaceholderStyle::Dollar => format!("${}", position),
        }
    }
}
