//! HQL scanner/tokenizer.
//!
//! Turns UTF-8 source text into a stream of positioned tokens. The scanner
//! knows nothing about list structure; balancing and reader macros are the
//! reader's job. Every token carries both a byte [`Span`] and a
//! line/column [`Position`].

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Token, TokenKind};
