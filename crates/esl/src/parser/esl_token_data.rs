use super::esl_token_kind::EslTokenKind;
use super::reader::SourceRange;

/// A lexed token: kind, byte range into the source, and the line it ends on.
#[derive(Debug, Clone, Copy)]
pub struct EslTokenData {
    pub kind: EslTokenKind,
    pub range: SourceRange,
    pub line: u32,
}

impl EslTokenData {
    pub fn new(kind: EslTokenKind, range: SourceRange, line: u32) -> Self {
        EslTokenData { kind, range, line }
    }
}
