//! Token model: concrete tokens, coarse classes, and match patterns.
//!
//! Single-character punctuation is carried as its character code
//! ([`Token::Punct`]) rather than one variant per character; multi-character
//! operators get named variants. Lookahead matchers and stream filters accept
//! either an exact token or a coarse [`TokenClass`] via [`TokenPattern`].

use std::fmt;

/// A token produced by [`Lexer::next_token`](crate::Lexer::next_token).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    /// End of input. Repeated calls keep returning this.
    Eof,
    /// Fatal lexical condition; the diagnostic is in [`Lexer::error`](crate::Lexer::error).
    ParseError,
    /// Identifier: letter or `$` first, then letters, digits, `$`, `_`.
    Ident,
    /// Identifier promoted through the configured keyword set.
    Keyword,
    /// Double-quoted string literal, `\"` escapes honored.
    StrLit,
    /// Single-quoted character literal.
    CharLit,
    /// Integer literal, accumulated by repeated `n*10 + digit`.
    IntLit,
    /// Float literal, hand-accumulated (see the lexer module docs).
    FloatLit,

    // Two-character operators.
    /// `==`
    EqualEqual,
    /// `!=`
    NotEqual,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `+=`
    PlusEqual,
    /// `-=`
    MinusEqual,
    /// `*=`
    StarEqual,
    /// `/=`
    SlashEqual,
    /// `%=`
    PercentEqual,
    /// `&=`
    AndEqual,
    /// `|=`
    OrEqual,
    /// `^=`
    XorEqual,
    /// `~=`
    TildeEqual,
    /// `->`
    Arrow,
    /// `=>`
    FatArrow,
    /// `<>`
    LessGreater,
    /// `{{`
    MustacheOpen,
    /// `}}`
    MustacheClose,

    // Three-character operators.
    /// `<<=`
    ShiftLeftEqual,
    /// `>>=`
    ShiftRightEqual,

    // Comment markers, only produced when comments are surfaced.
    /// `//`
    LineComment,
    /// `/*`
    CommentOpen,
    /// `*/`
    CommentClose,
    /// `/>`, only produced when the XML close token is enabled.
    XmlClose,

    /// Any other single character, carried as its character code.
    Punct(u8),
}

impl Token {
    /// True when this token is exactly the single character `c`.
    #[inline]
    pub fn is_punct(self, c: u8) -> bool {
        self == Token::Punct(c)
    }

    /// True for [`Token::Eof`].
    #[inline]
    pub fn is_eof(self) -> bool {
        self == Token::Eof
    }

    /// True for [`Token::ParseError`].
    #[inline]
    pub fn is_parse_error(self) -> bool {
        self == Token::ParseError
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Eof => "EOF",
            Token::ParseError => "parse error",
            Token::Ident => "identifier",
            Token::Keyword => "keyword",
            Token::StrLit => "string",
            Token::CharLit => "char",
            Token::IntLit => "integer",
            Token::FloatLit => "float",
            Token::EqualEqual => "==",
            Token::NotEqual => "!=",
            Token::LessEqual => "<=",
            Token::GreaterEqual => ">=",
            Token::AndAnd => "&&",
            Token::OrOr => "||",
            Token::ShiftLeft => "<<",
            Token::ShiftRight => ">>",
            Token::PlusPlus => "++",
            Token::MinusMinus => "--",
            Token::PlusEqual => "+=",
            Token::MinusEqual => "-=",
            Token::StarEqual => "*=",
            Token::SlashEqual => "/=",
            Token::PercentEqual => "%=",
            Token::AndEqual => "&=",
            Token::OrEqual => "|=",
            Token::XorEqual => "^=",
            Token::TildeEqual => "~=",
            Token::Arrow => "->",
            Token::FatArrow => "=>",
            Token::LessGreater => "<>",
            Token::MustacheOpen => "{{",
            Token::MustacheClose => "}}",
            Token::ShiftLeftEqual => "<<=",
            Token::ShiftRightEqual => ">>=",
            Token::LineComment => "//",
            Token::CommentOpen => "/*",
            Token::CommentClose => "*/",
            Token::XmlClose => "/>",
            Token::Punct(c) => return write!(f, "{}", *c as char),
        };
        f.write_str(text)
    }
}

/// Coarse token categories for lookahead matchers and stream filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenClass {
    /// Integer or float literal.
    Numeric,
    /// `<`, `>`, `<=`, `>=`, `!=`, `==`.
    Compare,
    /// Arithmetic/bitwise operators, their compound assignments, and `=`.
    Math,
    /// `&&`, `||`.
    Combo,
    /// Union of [`Compare`](Self::Compare), [`Math`](Self::Math), and
    /// [`Combo`](Self::Combo).
    Expression,
}

impl TokenClass {
    /// True when `token` belongs to this category.
    pub fn contains(self, token: Token) -> bool {
        match self {
            TokenClass::Numeric => matches!(token, Token::IntLit | Token::FloatLit),
            TokenClass::Compare => matches!(
                token,
                Token::Punct(b'<')
                    | Token::Punct(b'>')
                    | Token::LessEqual
                    | Token::GreaterEqual
                    | Token::NotEqual
                    | Token::EqualEqual
            ),
            TokenClass::Math => matches!(
                token,
                Token::Punct(b'+')
                    | Token::Punct(b'-')
                    | Token::Punct(b'*')
                    | Token::Punct(b'/')
                    | Token::Punct(b'%')
                    | Token::Punct(b'|')
                    | Token::Punct(b'&')
                    | Token::Punct(b'^')
                    | Token::Punct(b'=')
                    | Token::PlusEqual
                    | Token::MinusEqual
                    | Token::StarEqual
                    | Token::SlashEqual
                    | Token::PercentEqual
                    | Token::OrEqual
                    | Token::AndEqual
                    | Token::XorEqual
            ),
            TokenClass::Combo => matches!(token, Token::AndAnd | Token::OrOr),
            TokenClass::Expression => {
                TokenClass::Compare.contains(token)
                    || TokenClass::Math.contains(token)
                    || TokenClass::Combo.contains(token)
            }
        }
    }
}

/// An exact token or a coarse class, for sequence matchers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenPattern {
    /// Matches one concrete token.
    Exact(Token),
    /// Matches any token in the class.
    Class(TokenClass),
}

impl TokenPattern {
    /// True when `token` satisfies this pattern.
    #[inline]
    pub fn matches(self, token: Token) -> bool {
        match self {
            TokenPattern::Exact(t) => t == token,
            TokenPattern::Class(c) => c.contains(token),
        }
    }
}

impl From<Token> for TokenPattern {
    fn from(t: Token) -> Self {
        TokenPattern::Exact(t)
    }
}

impl From<TokenClass> for TokenPattern {
    fn from(c: TokenClass) -> Self {
        TokenPattern::Class(c)
    }
}
