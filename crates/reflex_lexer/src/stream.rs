//! Collected token streams and the filters that operate on them.
//!
//! [`Lexer::eat_stream`](crate::Lexer::eat_stream) and friends return owned
//! [`LexItem`]s so callers can hold harvested runs (default arguments, enum
//! initializers) after the lexer has moved on.

use crate::token::{Token, TokenPattern};

/// Payload of one collected token.
#[derive(Clone, Debug, PartialEq)]
pub enum LexValue {
    /// Integer literal value.
    Int(i64),
    /// Float literal value.
    Float(f32),
    /// Source text for everything else (identifiers, strings, operators).
    Text(String),
}

/// One token detached from the lexer, with its literal payload.
#[derive(Clone, Debug, PartialEq)]
pub struct LexItem {
    pub token: Token,
    pub value: LexValue,
    /// Numeric suffix (`u`, `ull`, `f`); empty for non-numeric tokens.
    pub suffix: String,
}

impl LexItem {
    /// Render this item back to text.
    ///
    /// Strings drop their quotes, numeric literals render their value, and
    /// everything else falls back to the token's display form.
    pub fn text(&self) -> String {
        match (&self.value, self.token) {
            (LexValue::Int(n), _) => n.to_string(),
            (LexValue::Float(x), _) => x.to_string(),
            (LexValue::Text(s), Token::StrLit) => s.replace('"', ""),
            (LexValue::Text(s), Token::Ident | Token::Keyword | Token::CharLit) => s.clone(),
            _ => self.token.to_string(),
        }
    }
}

/// Copy the items matching any of `patterns` into a new list.
pub fn extract(items: &[LexItem], patterns: &[TokenPattern]) -> Vec<LexItem> {
    items
        .iter()
        .filter(|item| patterns.iter().any(|p| p.matches(item.token)))
        .cloned()
        .collect()
}

/// Remove the items matching any of `patterns` in place.
pub fn erase(items: &mut Vec<LexItem>, patterns: &[TokenPattern]) {
    items.retain(|item| !patterns.iter().any(|p| p.matches(item.token)));
}

/// Render a run of items as text, space-separated except before `;`.
pub fn write_text(items: &[LexItem]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 && !item.token.is_punct(b';') {
            out.push(' ');
        }
        out.push_str(&item.text());
    }
    out
}
