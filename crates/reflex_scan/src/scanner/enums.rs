//! Enum declarations and constant value expressions.

use reflex_db::{TraitList, TypeNode};
use reflex_lexer::Token;

use super::{is_stop, Driver};

impl Driver<'_> {
    /// `REFLECTED(...) enum` body. Captures `(name, value)` constant pairs
    /// in declaration order; an enum that yields no constants is dropped
    /// rather than registered.
    pub(super) fn process_enum(&mut self, traits: TraitList) {
        let mut token = self.advance();
        // Scoped enums spell `enum class` or `enum struct`.
        if token == Token::Ident && matches!(self.lexer.text(), "class" | "struct") {
            token = self.advance();
        }
        if token != Token::Ident {
            self.lexer.eat_line();
            return;
        }
        let mut node = TypeNode::named(self.lexer.text());
        node.binding_traits = traits;

        // Underlying-type clause and anything else before the body.
        loop {
            let token = self.advance();
            if is_stop(token) {
                return;
            }
            if token.is_punct(b'{') {
                break;
            }
        }

        let mut next_value: i64 = 0;
        let mut pending: Option<String> = None;
        loop {
            let token = self.advance();
            if is_stop(token) || token.is_punct(b'}') {
                break;
            }
            if token == Token::Ident && pending.is_none() {
                pending = Some(self.lexer.text().to_owned());
                continue;
            }
            if token.is_punct(b'=') {
                let (value, hit_close) = self.read_enum_value(next_value);
                if let Some(name) = pending.take() {
                    node.enum_values.push((name, value));
                    next_value = value + 1;
                }
                if hit_close {
                    break;
                }
                continue;
            }
            if token.is_punct(b',') {
                if let Some(name) = pending.take() {
                    node.enum_values.push((name, next_value));
                    next_value += 1;
                }
            }
        }
        // Final entry with no separator before the closer.
        if let Some(name) = pending.take() {
            node.enum_values.push((name, next_value));
        }

        if node.enum_values.is_empty() {
            tracing::debug!(name = %node.name, "enum with no constants dropped");
            return;
        }
        tracing::debug!(name = %node.name, constants = node.enum_values.len(), "captured enum");
        let id = self.db.alloc(node);
        self.db.register(id);
    }

    /// Value expression after `=`. Handles integer literals, the `FLAG(n)`
    /// shorthand, left-shifts, and references to previously captured
    /// constants. Returns the value and whether the expression ran into
    /// the body's closing brace.
    fn read_enum_value(&mut self, implicit: i64) -> (i64, bool) {
        let mut value = None;
        loop {
            let token = self.advance();
            if is_stop(token) || token.is_punct(b',') || token.is_punct(b')') {
                return (value.unwrap_or(implicit), false);
            }
            if token.is_punct(b'}') {
                return (value.unwrap_or(implicit), true);
            }
            if token == Token::IntLit {
                value = Some(self.lexer.int_value());
                continue;
            }
            if token == Token::ShiftLeft {
                if self.advance() == Token::IntLit {
                    let amount = u32::try_from(self.lexer.int_value()).unwrap_or(0);
                    value = Some(value.unwrap_or(implicit).wrapping_shl(amount));
                }
                continue;
            }
            if token == Token::Ident {
                if self.lexer.text() == "FLAG" {
                    value = Some(self.read_flag_value());
                } else {
                    value = Some(self.db.find_enum_value(self.lexer.text()));
                }
            }
            // `(` and anything else: keep scanning.
        }
    }

    /// `FLAG(n)` is shorthand for `1 << n`; `FLAG(Name)` resolves the
    /// named constant instead.
    fn read_flag_value(&mut self) -> i64 {
        self.advance();
        let token = self.advance();
        let value = if token == Token::IntLit {
            1i64.wrapping_shl(u32::try_from(self.lexer.int_value()).unwrap_or(0))
        } else if token == Token::Ident {
            self.db.find_enum_value(self.lexer.text())
        } else {
            0
        };
        if self.lexer.peek().is_punct(b')') {
            self.advance();
        }
        value
    }
}
