//! Backtracking tokenizer over C-family header text.
//!
//! One token per [`Lexer::next_token`] call. The lexer tracks line numbers
//! and an indent-aware column, skips comments and preprocessor lines unless
//! configured to surface them, and supports exact backtracking: a
//! [`Checkpoint`] is a full value snapshot of the mutable state, and
//! restoring one puts the lexer back byte-for-byte. `peek`, `peek_text`,
//! and `satisfies` are defined purely as snapshot, scan, restore.
//!
//! # Numeric literals
//!
//! Integers accumulate by repeated `n*10 + digit`; floats accumulate the
//! integer and fractional parts the same way (fraction divided by the
//! accumulated power of ten) and apply an optional signed exponent by
//! repeated multiply/divide. Parsing is deliberately not delegated to a
//! library parser, so intermediate rounding follows this exact algorithm.
//! A trailing run of letters is captured as a suffix (`u`, `ull`, `f`)
//! rather than lexed as a separate identifier.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::stream::{LexItem, LexValue};
use crate::token::{Token, TokenPattern};

/// Configuration for a [`Lexer`].
#[derive(Clone, Debug)]
pub struct LexOptions {
    /// Surface `//`, `/*`, `*/` as tokens instead of skipping comments.
    pub parse_comments: bool,
    /// Surface `#` to the caller instead of skipping to end of line.
    pub parse_preprocessor: bool,
    /// Produce [`Token::XmlClose`] for `/>`.
    pub xml_close_token: bool,
    /// Skip `<!-- -->` blocks like whitespace.
    pub eat_xml_comments: bool,
    /// Column width credited for a tab when computing the indent column.
    pub tab_size: u32,
    /// Identifiers in this set are promoted to [`Token::Keyword`].
    pub keywords: HashSet<String>,
}

impl Default for LexOptions {
    fn default() -> Self {
        Self {
            parse_comments: false,
            parse_preprocessor: false,
            xml_close_token: false,
            eat_xml_comments: false,
            tab_size: 4,
            keywords: HashSet::new(),
        }
    }
}

/// Line/column position, line 1-based, column 0-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LexLocation {
    pub line: u32,
    pub column: u32,
}

/// Full value snapshot of a lexer's mutable state.
///
/// Restoring a checkpoint makes every externally observable field equal to
/// what it was at capture time, including the pending token, literal
/// values, and span.
#[derive(Clone, Debug, PartialEq)]
pub struct Checkpoint {
    parse_point: usize,
    token_start: usize,
    token_end: usize,
    line_number: u32,
    line_start: u32,
    token: Token,
    int_value: i64,
    float_value: f32,
    text: String,
    suffix: String,
    error: Option<String>,
}

/// Backtracking tokenizer.
///
/// Borrows the source text; all state is value state, so the lexer itself
/// is [`Clone`] for callers that want an independent cursor.
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    src: &'a str,
    eof: usize,
    options: LexOptions,
    parse_point: usize,
    token_start: usize,
    token_end: usize,
    line_number: u32,
    line_start: u32,
    token: Token,
    int_value: i64,
    float_value: f32,
    text: String,
    suffix: String,
    error: Option<String>,
    saved: Option<Box<Checkpoint>>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer with default options.
    pub fn new(src: &'a str) -> Self {
        Self::with_options(src, LexOptions::default())
    }

    /// Create a lexer with explicit options.
    pub fn with_options(src: &'a str, options: LexOptions) -> Self {
        Self {
            src,
            eof: src.len(),
            options,
            parse_point: 0,
            token_start: 0,
            token_end: 0,
            line_number: 0,
            line_start: 0,
            token: Token::ParseError,
            int_value: 0,
            float_value: 0.0,
            text: String::new(),
            suffix: String::new(),
            error: None,
            saved: None,
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────────

    /// Token last returned by [`next_token`](Self::next_token).
    #[inline]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Raw source text of the current token (quotes and suffix included).
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Value of the most recent integer or char literal.
    #[inline]
    pub fn int_value(&self) -> i64 {
        self.int_value
    }

    /// Value of the most recent float literal.
    #[inline]
    pub fn float_value(&self) -> f32 {
        self.float_value
    }

    /// Suffix of the most recent numeric literal (`u`, `ull`, `f`, ...).
    #[inline]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Diagnostic for the most recent [`Token::ParseError`].
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Byte offset where the current token starts.
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Byte offset one past the current token.
    #[inline]
    pub fn token_end(&self) -> usize {
        self.token_end
    }

    /// Current line, counted from zero, incremented at each `\n`.
    #[inline]
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Indent column of the current token. Only meaningful for the first
    /// token of a line; wiped at every [`next_token`](Self::next_token).
    #[inline]
    pub fn line_start(&self) -> u32 {
        self.line_start
    }

    /// True when the last token was [`Token::Eof`].
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.token == Token::Eof
    }

    /// True when the read position has consumed the whole source.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.parse_point >= self.eof
    }

    /// Meaningful text of the current token: strings drop their quotes,
    /// char literals yield the text between the quotes, identifiers and
    /// numeric literals their raw text, everything else the token's
    /// display form.
    pub fn token_text(&self) -> Cow<'_, str> {
        match self.token {
            Token::StrLit => Cow::Owned(self.text.replace('"', "")),
            Token::CharLit => Cow::Borrowed(
                self.text
                    .get(1..self.text.len().saturating_sub(1))
                    .unwrap_or_default(),
            ),
            Token::Ident | Token::Keyword | Token::IntLit | Token::FloatLit => {
                Cow::Borrowed(&self.text)
            }
            _ => Cow::Owned(self.token.to_string()),
        }
    }

    /// Detach the current token as an owned [`LexItem`].
    pub fn lex_item(&self) -> LexItem {
        match self.token {
            Token::IntLit => LexItem {
                token: self.token,
                value: LexValue::Int(self.int_value),
                suffix: self.suffix.clone(),
            },
            Token::FloatLit => LexItem {
                token: self.token,
                value: LexValue::Float(self.float_value),
                suffix: self.suffix.clone(),
            },
            _ => LexItem {
                token: self.token,
                value: LexValue::Text(self.text.clone()),
                suffix: String::new(),
            },
        }
    }

    // ─── Checkpointing ──────────────────────────────────────────────────

    /// Capture a full snapshot of the mutable state.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            parse_point: self.parse_point,
            token_start: self.token_start,
            token_end: self.token_end,
            line_number: self.line_number,
            line_start: self.line_start,
            token: self.token,
            int_value: self.int_value,
            float_value: self.float_value,
            text: self.text.clone(),
            suffix: self.suffix.clone(),
            error: self.error.clone(),
        }
    }

    /// Restore a snapshot captured by [`checkpoint`](Self::checkpoint).
    pub fn restore(&mut self, cp: Checkpoint) {
        self.parse_point = cp.parse_point;
        self.token_start = cp.token_start;
        self.token_end = cp.token_end;
        self.line_number = cp.line_number;
        self.line_start = cp.line_start;
        self.token = cp.token;
        self.int_value = cp.int_value;
        self.float_value = cp.float_value;
        self.text = cp.text;
        self.suffix = cp.suffix;
        self.error = cp.error;
    }

    /// Save a snapshot into the lexer's single state slot.
    pub fn save_state(&mut self) {
        self.saved = Some(Box::new(self.checkpoint()));
    }

    /// Restore the slot saved by [`save_state`](Self::save_state), if any.
    /// The slot is kept, so the same state can be restored again.
    pub fn restore_state(&mut self) {
        if let Some(cp) = self.saved.clone() {
            self.restore(*cp);
        }
    }

    /// Next token without consuming it.
    pub fn peek(&mut self) -> Token {
        let cp = self.checkpoint();
        let token = self.next_token();
        self.restore(cp);
        token
    }

    /// Meaningful text of the next token without consuming it.
    pub fn peek_text(&mut self) -> String {
        let cp = self.checkpoint();
        self.next_token();
        let text = self.token_text().into_owned();
        self.restore(cp);
        text
    }

    /// Next token and its start offset, without consuming it.
    pub fn peek_start(&mut self) -> (Token, usize) {
        let cp = self.checkpoint();
        let token = self.next_token();
        let start = self.token_start;
        self.restore(cp);
        (token, start)
    }

    /// True when the next tokens satisfy `patterns` in order. Always
    /// restores, whether or not the sequence matched. Empty patterns
    /// never match.
    pub fn satisfies(&mut self, patterns: &[TokenPattern]) -> bool {
        if patterns.is_empty() {
            return false;
        }
        let cp = self.checkpoint();
        let ok = patterns.iter().all(|pat| pat.matches(self.next_token()));
        self.restore(cp);
        ok
    }

    /// Like [`satisfies`](Self::satisfies), but on a match the tokens are
    /// consumed and returned; on a mismatch the lexer is restored.
    pub fn eat_matching(&mut self, patterns: &[TokenPattern]) -> Option<Vec<LexItem>> {
        if patterns.is_empty() {
            return None;
        }
        let cp = self.checkpoint();
        let mut items = Vec::with_capacity(patterns.len());
        for pat in patterns {
            let token = self.next_token();
            if !pat.matches(token) {
                self.restore(cp);
                return None;
            }
            items.push(self.lex_item());
        }
        Some(items)
    }

    // ─── Stream utilities ───────────────────────────────────────────────

    /// Consume tokens until `until`, EOF, or a parse error, collecting
    /// everything before the stop token. The stop token is consumed but
    /// not collected; stopping at EOF is not an error.
    pub fn eat_stream(&mut self, until: Token) -> Vec<LexItem> {
        let mut items = Vec::new();
        loop {
            let tk = self.next_token();
            if tk == until || tk == Token::Eof || tk == Token::ParseError {
                return items;
            }
            items.push(self.lex_item());
        }
    }

    /// Consume tokens matching `patterns` in order, optionally cycling the
    /// pattern list (`wrap`) for runs like `Numeric, ','` repeated. Stops
    /// at the first mismatch, EOF, or parse error, or at the end of a
    /// non-wrapping pattern. State is left at the failing token, not
    /// rolled back.
    pub fn eat_sequence(&mut self, patterns: &[TokenPattern], wrap: bool) -> Vec<LexItem> {
        let mut items = Vec::new();
        if patterns.is_empty() {
            return items;
        }
        let mut i = 0;
        loop {
            if i >= patterns.len() {
                if !wrap {
                    return items;
                }
                i = 0;
            }
            let tk = self.next_token();
            if tk == Token::Eof || tk == Token::ParseError || !patterns[i].matches(tk) {
                return items;
            }
            items.push(self.lex_item());
            i += 1;
        }
    }

    /// Consume the rest of the current line, leaving the lexer positioned
    /// before the first token of the next line (or before EOF).
    pub fn eat_line(&mut self) {
        let line = self.line_number;
        let mut cp = self.checkpoint();
        while self.line_number == line {
            cp = self.checkpoint();
            if self.next_token() == Token::Eof {
                break;
            }
        }
        self.restore(cp);
    }

    // ─── Block extraction ───────────────────────────────────────────────

    /// Capture the text strictly inside the outermost `open`/`close` pair,
    /// tracking nesting depth over raw bytes.
    ///
    /// If the byte just before the read position is `open` (the caller
    /// already consumed the opener as a token), capture starts at the read
    /// position with one level open. Otherwise capture starts after the
    /// first `open` found. Newlines scanned over are counted.
    ///
    /// Returns `None` when no opener is found (position unchanged). An
    /// opened but unterminated block surfaces the partial text, flags
    /// [`Token::ParseError`], and moves the position to EOF. A stray
    /// `close` before any opener yields an empty capture.
    pub fn eat_block(&mut self, open: u8, close: u8) -> Option<String> {
        let bytes = self.src.as_bytes();
        let have_opened =
            self.parse_point > 0 && bytes.get(self.parse_point - 1) == Some(&open);
        let mut depth: i32 = i32::from(have_opened);
        let mut content_start = have_opened.then_some(self.parse_point);

        let mut q = self.parse_point;
        while q < self.eof {
            let b = bytes[q];
            if b == b'\n' {
                self.line_number += 1;
            }
            if b == open {
                depth += 1;
                if content_start.is_none() {
                    content_start = Some(q + 1);
                }
            } else if b == close {
                depth -= 1;
                if depth <= 0 {
                    let start = content_start.unwrap_or(q);
                    let text = self.src.get(start..q).unwrap_or_default().to_owned();
                    self.parse_point = q + 1;
                    return Some(text);
                }
            }
            q += 1;
        }

        if let Some(start) = content_start {
            let partial = self.src.get(start..self.eof).unwrap_or_default().to_owned();
            self.error = Some(format!("unterminated `{}` block", open as char));
            self.token = Token::ParseError;
            self.parse_point = self.eof;
            return Some(partial);
        }
        None
    }

    /// Capture the text between two occurrences of a doubled marker
    /// (`[[section]] body [[next]]` with marker `[` yields
    /// `section]] body `-style captures).
    ///
    /// Returns `None` when no doubled marker follows the read position.
    /// EOF is a valid terminator for the final section. The position moves
    /// to the start of the terminating pair (or EOF), so repeated calls
    /// walk marker-delimited sections.
    pub fn eat_between(&mut self, marker: u8) -> Option<String> {
        let open = self.find_doubled(self.parse_point, marker)?;
        let content_start = open + 2;
        let content_end = self
            .find_doubled(content_start, marker)
            .unwrap_or(self.eof);

        let text = self
            .src
            .get(content_start..content_end)
            .unwrap_or_default()
            .to_owned();
        self.bump_lines(self.parse_point, content_end);
        self.parse_point = content_end;
        Some(text)
    }

    /// Re-point a just-lexed `>>` so the current token reads as `>` and
    /// the second `>` is produced by the next call. Used by generic
    /// argument lists, where `>>` closes two levels.
    pub fn split_shift_right(&mut self) {
        if self.token == Token::ShiftRight {
            self.token = Token::Punct(b'>');
            self.token_end = self.token_start + 1;
            self.parse_point = self.token_start + 1;
            self.text.truncate(1);
        }
    }

    // ─── Location ───────────────────────────────────────────────────────

    /// Line/column of the current read position.
    pub fn location(&self) -> LexLocation {
        self.location_of(self.parse_point)
    }

    /// Line/column of a byte offset, computed by a fresh scan from the
    /// start of the source. Lines are 1-based, columns 0-based; `\r\n`
    /// counts as one newline.
    pub fn location_of(&self, pos: usize) -> LexLocation {
        let bytes = self.src.as_bytes();
        let end = pos.min(self.eof);
        let mut line = 1u32;
        let mut column = 0u32;
        let mut p = 0;
        while p < end {
            match bytes[p] {
                b'\n' => {
                    line += 1;
                    column = 0;
                    p += 1;
                }
                b'\r' => {
                    line += 1;
                    column = 0;
                    p += 1;
                    if p < end && bytes[p] == b'\n' {
                        p += 1;
                    }
                }
                _ => {
                    column += 1;
                    p += 1;
                }
            }
        }
        LexLocation { line, column }
    }

    // ─── Tokenization ───────────────────────────────────────────────────

    /// Produce the next token. Returns [`Token::Eof`] at the end of input
    /// (and keeps returning it), or [`Token::ParseError`] with a
    /// diagnostic in [`error`](Self::error) for fatal lexical conditions.
    pub fn next_token(&mut self) -> Token {
        // Wiped on every call; callers that care must read them per token.
        self.line_start = 0;
        self.error = None;

        let bytes = self.src.as_bytes();
        let mut p = self.parse_point;

        loop {
            let mut bump_indent = false;
            while p < self.eof {
                let b = bytes[p];
                if !b.is_ascii_whitespace() {
                    break;
                }
                if b == b'\n' {
                    self.line_number += 1;
                    self.line_start = 0;
                    bump_indent = true;
                } else if bump_indent {
                    self.line_start += if b == b'\t' { self.options.tab_size } else { 1 };
                }
                p += 1;
            }

            if !self.options.parse_comments {
                if self.stream_matches(p, b"//") {
                    p = self.skip_to_line_end(p);
                    continue;
                }
                if self.stream_matches(p, b"/*") {
                    match self.skip_block_comment(p + 2) {
                        Some(after) => {
                            p = after;
                            continue;
                        }
                        None => {
                            self.error = Some("unterminated block comment".to_owned());
                            return self.finish(Token::ParseError, p, self.eof);
                        }
                    }
                }
            }

            if self.options.eat_xml_comments && self.stream_matches(p, b"<!--") {
                match self.skip_xml_comment(p + 4) {
                    Some(after) => {
                        p = after;
                        continue;
                    }
                    None => {
                        self.error = Some("unterminated `<!--` comment".to_owned());
                        return self.finish(Token::ParseError, p, self.eof);
                    }
                }
            }

            if !self.options.parse_preprocessor && p < self.eof && bytes[p] == b'#' {
                p = self.skip_to_line_end(p);
                continue;
            }

            break;
        }

        if p >= self.eof {
            return self.finish(Token::Eof, self.eof, self.eof);
        }

        match bytes[p] {
            b'"' => self.string_literal(p),
            b'\'' => self.char_literal(p),
            b'0'..=b'9' => self.number(p),
            b'+' => self.plus(p),
            b'-' => self.minus(p),
            b'&' => self.ampersand(p),
            b'|' => self.pipe(p),
            b'=' => self.equal(p),
            b'!' => self.bang(p),
            b'^' => self.caret(p),
            b'%' => self.percent(p),
            b'*' => self.star(p),
            b'/' => self.slash(p),
            b'<' => self.less(p),
            b'>' => self.greater(p),
            b'~' => self.tilde(p),
            b'{' => self.brace_open(p),
            b'}' => self.brace_close(p),
            b => {
                if is_ident_start(b) {
                    self.identifier(p)
                } else {
                    self.finish(Token::Punct(b), p, p + 1)
                }
            }
        }
    }

    // ─── Identifiers & literals ─────────────────────────────────────────

    fn identifier(&mut self, p: usize) -> Token {
        let bytes = self.src.as_bytes();
        let mut q = p;
        while q < self.eof && is_ident_continue(bytes[q]) {
            q += 1;
        }
        self.finish(Token::Ident, p, q)
    }

    fn string_literal(&mut self, p: usize) -> Token {
        let bytes = self.src.as_bytes();
        let mut q = p + 1;
        while q < self.eof && bytes[q] != b'"' {
            if bytes[q] == b'\\' && q + 1 < self.eof && bytes[q + 1] == b'"' {
                q += 1;
            }
            q += 1;
        }
        if q >= self.eof {
            self.error = Some("unterminated string literal".to_owned());
            return self.finish(Token::ParseError, p, self.eof);
        }
        self.finish(Token::StrLit, p, q + 1)
    }

    fn char_literal(&mut self, p: usize) -> Token {
        let bytes = self.src.as_bytes();
        let mut q = p + 1;
        if q >= self.eof {
            self.error = Some("unterminated character literal".to_owned());
            return self.finish(Token::ParseError, p, self.eof);
        }
        if bytes[q] == b'\\' {
            q += 1;
            if q >= self.eof {
                self.error = Some("unterminated character literal".to_owned());
                return self.finish(Token::ParseError, p, self.eof);
            }
            self.int_value = i64::from(match bytes[q] {
                b't' => b'\t',
                b'r' => b'\r',
                b'n' => b'\n',
                b'0' => 0,
                other => other,
            });
            q += 1;
        } else if let Some(c) = self.src.get(q..).and_then(|s| s.chars().next()) {
            self.int_value = i64::from(u32::from(c));
            q += c.len_utf8();
        }
        if q < self.eof && bytes[q] == b'\'' {
            return self.finish(Token::CharLit, p, q + 1);
        }
        self.error = Some("unterminated character literal".to_owned());
        self.finish(Token::ParseError, p, q.min(self.eof))
    }

    fn number(&mut self, p: usize) -> Token {
        let bytes = self.src.as_bytes();
        let mut q = p;
        while q < self.eof && bytes[q].is_ascii_digit() {
            q += 1;
        }

        if q < self.eof && (bytes[q] == b'.' || bytes[q] == b'e' || bytes[q] == b'E') {
            let end = self.scan_float(p);
            let end = self.eat_suffixes(end);
            return self.finish(Token::FloatLit, p, end);
        }

        let mut n: i64 = 0;
        let mut q = p;
        while q < self.eof && bytes[q].is_ascii_digit() {
            n = n.wrapping_mul(10).wrapping_add(i64::from(bytes[q] - b'0'));
            q += 1;
        }
        self.int_value = n;
        let end = self.eat_suffixes(q);
        self.finish(Token::IntLit, p, end)
    }

    /// Hand-accumulated float scan; returns the end offset and stores the
    /// value. The exponent part tolerates `+` as well as `-`, and an `e`
    /// with no digits after it simply contributes nothing (the letters
    /// fall to the suffix scan).
    fn scan_float(&mut self, p: usize) -> usize {
        let bytes = self.src.as_bytes();
        let mut q = p;
        let mut value = 0f32;
        while q < self.eof && bytes[q].is_ascii_digit() {
            value = value * 10.0 + f32::from(bytes[q] - b'0');
            q += 1;
        }

        if q < self.eof && bytes[q] == b'.' {
            q += 1;
            let mut powten = 1f32;
            let mut addend = 0f32;
            while q < self.eof && bytes[q].is_ascii_digit() {
                addend = addend * 10.0 + f32::from(bytes[q] - b'0');
                powten *= 10.0;
                q += 1;
            }
            value += addend / powten;
        }

        if q < self.eof && (bytes[q] == b'e' || bytes[q] == b'E') {
            q += 1;
            let negative = q < self.eof && bytes[q] == b'-';
            if q < self.eof && (bytes[q] == b'-' || bytes[q] == b'+') {
                q += 1;
            }
            let mut exponent: i32 = 0;
            while q < self.eof && bytes[q].is_ascii_digit() {
                exponent = exponent
                    .saturating_mul(10)
                    .saturating_add(i32::from(bytes[q] - b'0'));
                q += 1;
            }
            let mut pow10 = 1f32;
            for _ in 0..exponent {
                pow10 *= 10.0;
            }
            if negative {
                value /= pow10;
            } else {
                value *= pow10;
            }
        }

        self.float_value = value;
        q
    }

    fn eat_suffixes(&mut self, mut p: usize) -> usize {
        let bytes = self.src.as_bytes();
        self.suffix.clear();
        while p < self.eof && bytes[p].is_ascii_alphabetic() {
            self.suffix.push(char::from(bytes[p]));
            p += 1;
        }
        p
    }

    // ─── Operators ──────────────────────────────────────────────────────

    fn plus(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'+') => self.finish(Token::PlusPlus, p, p + 2),
            Some(b'=') => self.finish(Token::PlusEqual, p, p + 2),
            _ => self.finish(Token::Punct(b'+'), p, p + 1),
        }
    }

    fn minus(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'-') => self.finish(Token::MinusMinus, p, p + 2),
            Some(b'=') => self.finish(Token::MinusEqual, p, p + 2),
            Some(b'>') => self.finish(Token::Arrow, p, p + 2),
            _ => self.finish(Token::Punct(b'-'), p, p + 1),
        }
    }

    fn ampersand(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'&') => self.finish(Token::AndAnd, p, p + 2),
            Some(b'=') => self.finish(Token::AndEqual, p, p + 2),
            _ => self.finish(Token::Punct(b'&'), p, p + 1),
        }
    }

    fn pipe(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'|') => self.finish(Token::OrOr, p, p + 2),
            Some(b'=') => self.finish(Token::OrEqual, p, p + 2),
            _ => self.finish(Token::Punct(b'|'), p, p + 1),
        }
    }

    fn equal(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'=') => self.finish(Token::EqualEqual, p, p + 2),
            Some(b'>') => self.finish(Token::FatArrow, p, p + 2),
            _ => self.finish(Token::Punct(b'='), p, p + 1),
        }
    }

    fn bang(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'=') => self.finish(Token::NotEqual, p, p + 2),
            _ => self.finish(Token::Punct(b'!'), p, p + 1),
        }
    }

    fn caret(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'=') => self.finish(Token::XorEqual, p, p + 2),
            _ => self.finish(Token::Punct(b'^'), p, p + 1),
        }
    }

    fn percent(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'=') => self.finish(Token::PercentEqual, p, p + 2),
            _ => self.finish(Token::Punct(b'%'), p, p + 1),
        }
    }

    fn star(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'=') => self.finish(Token::StarEqual, p, p + 2),
            Some(b'/') if self.options.parse_comments => {
                self.finish(Token::CommentClose, p, p + 2)
            }
            _ => self.finish(Token::Punct(b'*'), p, p + 1),
        }
    }

    fn slash(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'=') => self.finish(Token::SlashEqual, p, p + 2),
            Some(b'/') => self.finish(Token::LineComment, p, p + 2),
            Some(b'*') if self.options.parse_comments => {
                self.finish(Token::CommentOpen, p, p + 2)
            }
            Some(b'>') if self.options.xml_close_token => {
                self.finish(Token::XmlClose, p, p + 2)
            }
            _ => self.finish(Token::Punct(b'/'), p, p + 1),
        }
    }

    fn less(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'<') => {
                if self.byte_at(p + 2) == Some(b'=') {
                    self.finish(Token::ShiftLeftEqual, p, p + 3)
                } else {
                    self.finish(Token::ShiftLeft, p, p + 2)
                }
            }
            Some(b'=') => self.finish(Token::LessEqual, p, p + 2),
            Some(b'>') => self.finish(Token::LessGreater, p, p + 2),
            _ => self.finish(Token::Punct(b'<'), p, p + 1),
        }
    }

    fn greater(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'>') => {
                if self.byte_at(p + 2) == Some(b'=') {
                    self.finish(Token::ShiftRightEqual, p, p + 3)
                } else {
                    self.finish(Token::ShiftRight, p, p + 2)
                }
            }
            Some(b'=') => self.finish(Token::GreaterEqual, p, p + 2),
            _ => self.finish(Token::Punct(b'>'), p, p + 1),
        }
    }

    fn tilde(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'=') => self.finish(Token::TildeEqual, p, p + 2),
            _ => self.finish(Token::Punct(b'~'), p, p + 1),
        }
    }

    fn brace_open(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'{') => self.finish(Token::MustacheOpen, p, p + 2),
            _ => self.finish(Token::Punct(b'{'), p, p + 1),
        }
    }

    fn brace_close(&mut self, p: usize) -> Token {
        match self.byte_at(p + 1) {
            Some(b'}') => self.finish(Token::MustacheClose, p, p + 2),
            _ => self.finish(Token::Punct(b'}'), p, p + 1),
        }
    }

    // ─── Internals ──────────────────────────────────────────────────────

    /// Record the token's span and text, move the read position, and
    /// promote identifiers found in the keyword set.
    fn finish(&mut self, token: Token, start: usize, end: usize) -> Token {
        self.token_start = start;
        self.token_end = end;
        self.text.clear();
        self.text
            .push_str(self.src.get(start..end).unwrap_or_default());
        self.parse_point = end;

        let token = if token == Token::Ident && self.options.keywords.contains(&self.text) {
            Token::Keyword
        } else {
            token
        };
        self.token = token;
        token
    }

    fn byte_at(&self, p: usize) -> Option<u8> {
        if p < self.eof {
            Some(self.src.as_bytes()[p])
        } else {
            None
        }
    }

    fn stream_matches(&self, p: usize, needle: &[u8]) -> bool {
        self.src
            .as_bytes()
            .get(p..p + needle.len())
            .is_some_and(|window| window == needle)
    }

    /// Skip to the next `\r` or `\n` (exclusive) or EOF.
    fn skip_to_line_end(&self, p: usize) -> usize {
        let tail = &self.src.as_bytes()[p.min(self.eof)..self.eof];
        match memchr::memchr2(b'\r', b'\n', tail) {
            Some(off) => p + off,
            None => self.eof,
        }
    }

    /// Skip past the `*/` terminator, counting newlines. `None` when the
    /// comment never closes.
    fn skip_block_comment(&mut self, from: usize) -> Option<usize> {
        let bytes = self.src.as_bytes();
        let mut p = from;
        while p < self.eof {
            let tail = &bytes[p..self.eof];
            let star = memchr::memchr(b'*', tail)?;
            let at = p + star;
            if bytes.get(at + 1) == Some(&b'/') {
                self.bump_lines(from, at);
                return Some(at + 2);
            }
            p = at + 1;
        }
        None
    }

    /// Skip past the `-->` terminator, counting newlines. `None` when the
    /// block never closes.
    fn skip_xml_comment(&mut self, from: usize) -> Option<usize> {
        let mut p = from;
        while p < self.eof {
            if self.stream_matches(p, b"-->") {
                self.bump_lines(from, p);
                return Some(p + 3);
            }
            p += 1;
        }
        None
    }

    /// Find the next doubled `marker` pair at or after `from`.
    fn find_doubled(&self, from: usize, marker: u8) -> Option<usize> {
        let bytes = self.src.as_bytes();
        let mut p = from;
        while p + 1 < self.eof {
            let tail = &bytes[p..self.eof];
            let hit = p + memchr::memchr(marker, tail)?;
            if bytes.get(hit + 1) == Some(&marker) {
                return Some(hit);
            }
            p = hit + 1;
        }
        None
    }

    /// Add the newlines in `start..end` to the line counter.
    fn bump_lines(&mut self, start: usize, end: usize) {
        let (start, end) = (start.min(self.eof), end.min(self.eof));
        if start < end {
            let count = memchr::memchr_iter(b'\n', &self.src.as_bytes()[start..end]).count();
            self.line_number += u32::try_from(count).unwrap_or(u32::MAX);
        }
    }
}

/// Letters and `$` open an identifier. Bytes outside ASCII are treated as
/// letters so multi-byte characters stay whole.
#[inline]
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'$' || b >= 0x80
}

#[inline]
fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b == b'_' || b.is_ascii_digit()
}
