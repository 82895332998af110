//! Backtracking tokenizer for C-family header text.
//!
//! The lexer produces one [`Token`] per call and keeps all of its state as
//! plain values, so any position can be captured with
//! [`Lexer::checkpoint`] and restored exactly. On top of that sit
//! non-consuming lookahead ([`Lexer::peek`], [`Lexer::satisfies`]),
//! collectors that pull token runs into [`LexItem`] streams, and raw
//! text extraction for brace-delimited blocks.
//!
//! Comments, preprocessor lines, and XML comment blocks are skipped like
//! whitespace unless [`LexOptions`] asks for them as tokens.

mod lexer;
mod stream;
mod token;

pub use lexer::{Checkpoint, LexLocation, LexOptions, Lexer};
pub use stream::{erase, extract, write_text, LexItem, LexValue};
pub use token::{Token, TokenClass, TokenPattern};
