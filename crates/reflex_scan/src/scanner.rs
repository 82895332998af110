//! Marker-driven declaration scanner.
//!
//! The scan loop walks a depth-filtered source unit token by token and
//! ignores everything until it hits a reflection marker. `REFLECTED`
//! introduces a struct, class, or enum declaration; `METHOD_CMD` and
//! `REFLECT_GLOBAL` introduce free callables and globals. Everything the
//! grammar cannot place is skipped, not diagnosed: scanned headers are full
//! of constructs reflection does not model, and only lexically fatal
//! conditions (unterminated literals, comments, blocks) abort a unit.

use reflex_db::{Modifiers, TraitList, TypeDatabase, TypeId, TypeNode};
use reflex_lexer::{Lexer, Token};

use crate::depth::{minimalize, DepthFilter};
use crate::options::ScanOptions;

mod enums;
mod member;

// === Errors ===

/// Fatal lexical failure surfaced by a scan.
///
/// Grammar-level surprises are absorbed by recovery; only conditions the
/// tokenizer cannot advance past produce one of these.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ScanError {
    /// Tokenizer diagnostic.
    pub message: String,
    /// One-based line in the filtered unit where scanning stopped.
    pub line: u32,
}

// === Scanner ===

/// Reflection-marker scanner.
///
/// Construct once, feed any number of source units through [`scan`], then
/// [`finish`] to run the resolution pass and take the accumulated database.
///
/// [`scan`]: Scanner::scan
/// [`finish`]: Scanner::finish
#[derive(Debug)]
pub struct Scanner {
    options: ScanOptions,
    db: TypeDatabase,
}

impl Scanner {
    /// Scanner with default options and the default baseline catalog.
    pub fn new() -> Self {
        Self::with_options(ScanOptions::default())
    }

    pub fn with_options(options: ScanOptions) -> Self {
        let mut db = TypeDatabase::new();
        options.baseline.apply(&mut db);
        Self { options, db }
    }

    /// Scan one source unit into the shared database.
    ///
    /// Units may reference types declared by earlier or later units; the
    /// dangling references become stand-ins that [`finish`](Self::finish)
    /// resolves once every unit has been merged.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] when the tokenizer hits an unterminated
    /// literal, comment, or block. The database keeps everything captured
    /// before the failure point.
    pub fn scan(&mut self, source: &str, depth: &impl DepthFilter) -> Result<(), ScanError> {
        let filtered = minimalize(source, depth, self.options.depth_threshold);
        tracing::debug!(bytes = filtered.len(), "scanning filtered unit");
        let mut driver = Driver {
            options: &self.options,
            db: &mut self.db,
            lexer: Lexer::new(&filtered),
            src: &filtered,
        };
        driver.run()
    }

    /// Database as accumulated so far, references unresolved.
    pub fn database(&self) -> &TypeDatabase {
        &self.db
    }

    /// Consume the scanner, resolve cross-unit references, and hand the
    /// database over.
    #[must_use]
    pub fn finish(self) -> TypeDatabase {
        let mut db = self.db;
        db.resolve();
        db
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

// === Driver ===

/// How a member parse left the token stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MemberEnd {
    /// Already at a statement boundary; no resynchronization needed.
    Synced,
    /// Stopped mid-declaration; the caller skips to the next terminator.
    NeedsSync,
    /// The declaration was abandoned by dropping its line; the token left
    /// current belongs to the dropped text and must not be re-read.
    LineDropped,
}

fn is_stop(token: Token) -> bool {
    token.is_eof() || token.is_parse_error()
}

/// Per-unit scan state. The grammar methods live here; member and enum
/// parsing are in the sibling modules.
struct Driver<'a> {
    options: &'a ScanOptions,
    db: &'a mut TypeDatabase,
    lexer: Lexer<'a>,
    /// The filtered unit, for verbatim span capture.
    src: &'a str,
}

impl Driver<'_> {
    /// Top-level loop: skip tokens until a marker, dispatch, repeat.
    fn run(&mut self) -> Result<(), ScanError> {
        loop {
            let token = self.advance();
            if token.is_eof() {
                return Ok(());
            }
            if token.is_parse_error() {
                return Err(self.fatal());
            }
            if token != Token::Ident {
                continue;
            }
            if self.lexer.text() == "REFLECTED" {
                self.process_reflected();
            } else if matches!(self.lexer.text(), "METHOD_CMD" | "REFLECT_GLOBAL") {
                self.read_member(None);
            }
            if self.lexer.token().is_parse_error() {
                return Err(self.fatal());
            }
        }
    }

    /// Next token, transparently discarding configured export macros.
    fn advance(&mut self) -> Token {
        loop {
            let token = self.lexer.next_token();
            if token == Token::Ident && self.options.api_macros.contains(self.lexer.text()) {
                continue;
            }
            return token;
        }
    }

    /// Error value for the current lexical failure.
    fn fatal(&self) -> ScanError {
        ScanError {
            message: self.lexer.error().unwrap_or("parse error").to_owned(),
            line: self.lexer.location_of(self.lexer.token_start()).line,
        }
    }

    /// Skip to the statement terminator unless already on a boundary.
    fn resync_statement(&mut self) {
        let token = self.lexer.token();
        if is_stop(token) || token.is_punct(b';') || token.is_punct(b'}') {
            return;
        }
        self.lexer.eat_stream(Token::Punct(b';'));
    }

    /// Parse a marker's parenthesized trait list. Entered on the marker
    /// identifier, exits on the closing `)`.
    ///
    /// Keys are bare identifiers or quoted strings; `key = value` pairs
    /// capture the value token's text, extended across one `:` so range
    /// bounds (`range = 0:100`) and scoped accessors (`get = Node::GetPos`)
    /// survive as single values.
    fn read_trait_list(&mut self) -> TraitList {
        let mut traits = TraitList::new();
        loop {
            let token = self.advance();
            if is_stop(token) || token.is_punct(b')') {
                return traits;
            }
            if token != Token::Ident && token != Token::StrLit {
                continue;
            }
            let key = self.lexer.token_text().into_owned();
            let value = if self.lexer.peek().is_punct(b'=') {
                self.advance();
                self.advance();
                let mut value = self.lexer.token_text().into_owned();
                if self.lexer.peek().is_punct(b':') {
                    self.advance();
                    value.push(':');
                    if self.lexer.peek().is_punct(b':') {
                        self.advance();
                        value.push(':');
                    }
                    self.advance();
                    value.push_str(&self.lexer.token_text());
                }
                Some(value)
            } else {
                None
            };
            traits.push(key, value);
        }
    }

    /// `REFLECTED(...)` followed by one struct, class, or enum declaration.
    fn process_reflected(&mut self) {
        let traits = self.read_trait_list();
        if self.advance() != Token::Ident {
            return;
        }
        if self.lexer.text() == "struct" {
            self.process_struct(traits, true);
        } else if self.lexer.text() == "class" {
            self.process_struct(traits, false);
        } else if self.lexer.text() == "enum" {
            self.process_enum(traits);
        }
    }

    /// `struct`/`class` declaration: name, modifier run, one-base clause,
    /// member body under scope labels. The node is allocated up front so
    /// members can reference their owner, and registered only when the
    /// declaration parse is over.
    fn process_struct(&mut self, traits: TraitList, default_public: bool) {
        if self.advance() != Token::Ident {
            // Anonymous declarations carry nothing reflection can address.
            self.lexer.eat_line();
            return;
        }
        let mut node = TypeNode::named(self.lexer.text());
        node.binding_traits = traits;

        let mut token = self.advance();
        while !is_stop(token) && !token.is_punct(b'{') && !token.is_punct(b':') {
            if token == Token::Ident {
                if self.lexer.text() == "abstract" {
                    node.is_abstract = true;
                }
                if self.lexer.text() == "final" {
                    node.is_final = true;
                }
            }
            token = self.advance();
        }

        let id = self.db.alloc(node);

        if token.is_punct(b':') {
            let (_, base_name) = self.read_name_or_modifiers();
            if base_name.is_empty() {
                tracing::debug!("inheritance clause without a base name");
            } else {
                let base = match self.db.lookup(&base_name) {
                    Some(base) => base,
                    None => self.db.add_standin(&base_name),
                };
                self.db.node_mut(id).base_classes.push(base);
            }
            // Secondary bases contribute nothing to the primary chain;
            // skip ahead to the body.
            while !is_stop(self.lexer.token()) && !self.lexer.token().is_punct(b'{') {
                self.advance();
            }
        }

        if self.lexer.token().is_punct(b'{') {
            self.struct_body(id, default_public);
        }

        self.db.register(id);
    }

    /// A run of identifiers in modifier-or-name position, stopping at the
    /// first non-identifier token. The last identifier that is not a
    /// recognized modifier keyword wins as the name.
    fn read_name_or_modifiers(&mut self) -> (Modifiers, String) {
        let mut modifiers = Modifiers::empty();
        let mut name = String::new();
        loop {
            if self.advance() != Token::Ident {
                return (modifiers, name);
            }
            match self.lexer.text() {
                "public" => modifiers |= Modifiers::PUBLIC,
                "protected" => modifiers |= Modifiers::PROTECTED,
                "private" => modifiers |= Modifiers::PRIVATE,
                "virtual" => modifiers |= Modifiers::VIRTUAL,
                "abstract" => modifiers |= Modifiers::ABSTRACT,
                "const" => modifiers |= Modifiers::CONST,
                text => name = text.to_owned(),
            }
        }
    }

    /// Members between the body braces. `public:`/`protected:`/`private:`
    /// labels flip the scope; members out of scope are skipped to their
    /// terminator without being parsed.
    fn struct_body(&mut self, owner: TypeId, default_public: bool) {
        let mut in_public = default_public;
        let mut token = self.advance();
        loop {
            if is_stop(token) || token.is_punct(b'}') {
                return;
            }

            if token == Token::Ident
                && matches!(self.lexer.text(), "public" | "protected" | "private")
                && self.lexer.peek().is_punct(b':')
            {
                in_public = self.lexer.text() == "public";
                self.advance();
                token = self.advance();
                continue;
            }

            if in_public || self.options.include_private {
                match self.read_member(Some(owner)) {
                    MemberEnd::NeedsSync => self.resync_statement(),
                    MemberEnd::LineDropped => {
                        token = self.advance();
                        continue;
                    }
                    MemberEnd::Synced => {}
                }
            } else {
                self.resync_statement();
            }

            token = self.lexer.token();
            if is_stop(token) || token.is_punct(b'}') {
                return;
            }
            token = self.advance();
        }
    }
}
