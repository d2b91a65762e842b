mod esl_parse;
mod esl_token_data;
mod esl_token_kind;
mod esl_tokenize;
mod reader;

pub mod ast;

pub use esl_parse::parse_chunk;
pub use esl_token_data::EslTokenData;
pub use esl_token_kind::EslTokenKind;
pub use esl_tokenize::EslTokenize;
pub use reader::{Reader, SourceRange};

/// Tokenize source text, returning the full token stream (trivia included).
pub fn tokenize(text: &str) -> Result<Vec<EslTokenData>, crate::esl_error::EslSyntaxError> {
    EslTokenize::new(Reader::new(text)).tokenize()
}
