use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum EslTokenKind {
    None,
    // Keywords
    TkAnd,
    TkBreak,
    TkDo,
    TkElse,
    TkElseIf,
    TkEnd,
    TkFalse,
    TkFor,
    TkFunction,
    TkIf,
    TkIn,
    TkLocal,
    TkNil,
    TkNot,
    TkOr,
    TkRepeat,
    TkReturn,
    TkThen,
    TkTrue,
    TkUntil,
    TkWhile,

    TkWhitespace, // whitespace
    TkEndOfLine,  // end of line
    TkPlus,       // +
    TkMinus,      // -
    TkMul,        // *
    TkDiv,        // /
    TkMod,        // %
    TkPow,        // ^
    TkLen,        // #
    TkDot,        // .
    TkConcat,     // ..
    TkDots,       // ...
    TkComma,      // ,
    TkAssign,     // =
    TkEq,         // ==
    TkGe,         // >=
    TkLe,         // <=
    TkNe,         // ~=
    TkLt,         // <
    TkGt,         // >
    TkColon,      // :
    TkSemicolon,  // ;

    TkLeftBracket,  // [
    TkRightBracket, // ]
    TkLeftParen,    // (
    TkRightParen,   // )
    TkLeftBrace,    // {
    TkRightBrace,   // }

    TkInt,          // integer literal
    TkName,         // name
    TkString,       // short string
    TkLongString,   // long-bracket string
    TkShortComment, // -- comment
    TkLongComment,  // --[[ comment ]]
    TkEof,          // eof
}

impl fmt::Display for EslTokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl EslTokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            EslTokenKind::TkAnd
                | EslTokenKind::TkBreak
                | EslTokenKind::TkDo
                | EslTokenKind::TkElse
                | EslTokenKind::TkElseIf
                | EslTokenKind::TkEnd
                | EslTokenKind::TkFalse
                | EslTokenKind::TkFor
                | EslTokenKind::TkFunction
                | EslTokenKind::TkIf
                | EslTokenKind::TkIn
                | EslTokenKind::TkLocal
                | EslTokenKind::TkNil
                | EslTokenKind::TkNot
                | EslTokenKind::TkOr
                | EslTokenKind::TkRepeat
                | EslTokenKind::TkReturn
                | EslTokenKind::TkThen
                | EslTokenKind::TkTrue
                | EslTokenKind::TkUntil
                | EslTokenKind::TkWhile
        )
    }

    /// Trivia is produced by the lexer but skipped by the parser.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            EslTokenKind::TkWhitespace
                | EslTokenKind::TkEndOfLine
                | EslTokenKind::TkShortComment
                | EslTokenKind::TkLongComment
        )
    }
}
