use crate::esl_error::EslSyntaxError;

use super::esl_token_data::EslTokenData;
use super::esl_token_kind::EslTokenKind;
use super::reader::Reader;

/// Hand-written lexer for the scripting dialect.
///
/// Two states: default, and long-bracket (entered on `[=*[`, including the
/// `--[=*[` comment form). Short strings are double-quoted and taken
/// verbatim, without escape processing. Numeric literals are decimal
/// integer runs.
pub struct EslTokenize<'a> {
    reader: Reader<'a>,
    error: Option<EslSyntaxError>,
    line: u32,
}

impl<'a> EslTokenize<'a> {
    pub fn new(reader: Reader<'a>) -> Self {
        EslTokenize {
            reader,
            error: None,
            line: 1,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<EslTokenData>, EslSyntaxError> {
        let mut tokens = vec![];

        while !self.reader.is_eof() {
            let kind = self.lex();
            if kind == EslTokenKind::TkEof || self.error.is_some() {
                break;
            }

            // A token carries the line it ends on.
            tokens.push(EslTokenData::new(
                kind,
                self.reader.current_range(),
                self.line,
            ));
        }

        if let Some(err) = &self.error {
            return Err(err.clone());
        }

        Ok(tokens)
    }

    fn name_to_kind(&self, name: &str) -> EslTokenKind {
        match name {
            "and" => EslTokenKind::TkAnd,
            "break" => EslTokenKind::TkBreak,
            "do" => EslTokenKind::TkDo,
            "else" => EslTokenKind::TkElse,
            "elseif" => EslTokenKind::TkElseIf,
            "end" => EslTokenKind::TkEnd,
            "false" => EslTokenKind::TkFalse,
            "for" => EslTokenKind::TkFor,
            "function" => EslTokenKind::TkFunction,
            "if" => EslTokenKind::TkIf,
            "in" => EslTokenKind::TkIn,
            "local" => EslTokenKind::TkLocal,
            "nil" => EslTokenKind::TkNil,
            "not" => EslTokenKind::TkNot,
            "or" => EslTokenKind::TkOr,
            "repeat" => EslTokenKind::TkRepeat,
            "return" => EslTokenKind::TkReturn,
            "then" => EslTokenKind::TkThen,
            "true" => EslTokenKind::TkTrue,
            "until" => EslTokenKind::TkUntil,
            "while" => EslTokenKind::TkWhile,
            _ => EslTokenKind::TkName,
        }
    }

    fn lex(&mut self) -> EslTokenKind {
        self.reader.reset_buff();

        match self.reader.current_char() {
            '\n' | '\r' => self.lex_new_line(),
            ' ' | '\t' => self.lex_white_space(),
            '-' => {
                self.reader.bump();

                if self.reader.current_char() != '-' {
                    return EslTokenKind::TkMinus;
                }

                self.reader.bump();
                if self.reader.current_char() == '[' {
                    self.reader.bump();
                    let sep = self.skip_sep();
                    if self.reader.current_char() == '[' {
                        self.reader.bump();
                        self.lex_long_bracket(sep);
                        return EslTokenKind::TkLongComment;
                    }
                }

                self.reader.eat_while(|ch| ch != '\n' && ch != '\r');
                EslTokenKind::TkShortComment
            }
            '[' => {
                self.reader.bump();
                let sep = self.skip_sep();
                if sep == 0 && self.reader.current_char() != '[' {
                    return EslTokenKind::TkLeftBracket;
                }
                if self.reader.current_char() != '[' {
                    self.error("invalid long string delimiter");
                    return EslTokenKind::TkLongString;
                }

                self.reader.bump();
                self.lex_long_bracket(sep)
            }
            '=' => {
                self.reader.bump();
                if self.reader.current_char() != '=' {
                    return EslTokenKind::TkAssign;
                }
                self.reader.bump();
                EslTokenKind::TkEq
            }
            '<' => {
                self.reader.bump();
                if self.reader.current_char() != '=' {
                    return EslTokenKind::TkLt;
                }
                self.reader.bump();
                EslTokenKind::TkLe
            }
            '>' => {
                self.reader.bump();
                if self.reader.current_char() != '=' {
                    return EslTokenKind::TkGt;
                }
                self.reader.bump();
                EslTokenKind::TkGe
            }
            '~' => {
                self.reader.bump();
                if self.reader.current_char() != '=' {
                    self.error("unexpected character `~'");
                    return EslTokenKind::TkNe;
                }
                self.reader.bump();
                EslTokenKind::TkNe
            }
            ':' => {
                self.reader.bump();
                EslTokenKind::TkColon
            }
            '"' => {
                self.reader.bump();
                self.lex_string()
            }
            '.' => {
                self.reader.bump();
                if self.reader.current_char() != '.' {
                    return EslTokenKind::TkDot;
                }
                self.reader.bump();
                if self.reader.current_char() != '.' {
                    return EslTokenKind::TkConcat;
                }
                self.reader.bump();
                EslTokenKind::TkDots
            }
            '0'..='9' => {
                self.reader.eat_while(|ch| ch.is_ascii_digit());
                EslTokenKind::TkInt
            }
            '/' => {
                self.reader.bump();
                EslTokenKind::TkDiv
            }
            '*' => {
                self.reader.bump();
                EslTokenKind::TkMul
            }
            '+' => {
                self.reader.bump();
                EslTokenKind::TkPlus
            }
            '%' => {
                self.reader.bump();
                EslTokenKind::TkMod
            }
            '^' => {
                self.reader.bump();
                EslTokenKind::TkPow
            }
            '#' => {
                self.reader.bump();
                EslTokenKind::TkLen
            }
            '(' => {
                self.reader.bump();
                EslTokenKind::TkLeftParen
            }
            ')' => {
                self.reader.bump();
                EslTokenKind::TkRightParen
            }
            '{' => {
                self.reader.bump();
                EslTokenKind::TkLeftBrace
            }
            '}' => {
                self.reader.bump();
                EslTokenKind::TkRightBrace
            }
            ']' => {
                self.reader.bump();
                EslTokenKind::TkRightBracket
            }
            ';' => {
                self.reader.bump();
                EslTokenKind::TkSemicolon
            }
            ',' => {
                self.reader.bump();
                EslTokenKind::TkComma
            }
            _ if self.reader.is_eof() => EslTokenKind::TkEof,
            ch if is_name_start(ch) => {
                self.reader.bump();
                self.reader.eat_while(is_name_continue);
                let name = self.reader.current_text();
                self.name_to_kind(name)
            }
            ch => {
                self.reader.bump();
                self.error(format!("unexpected character `{}'", ch));
                EslTokenKind::None
            }
        }
    }

    fn lex_new_line(&mut self) -> EslTokenKind {
        match self.reader.current_char() {
            // \n or \n\r
            '\n' => {
                self.reader.bump();
                if self.reader.current_char() == '\r' {
                    self.reader.bump();
                }
            }
            // \r or \r\n
            '\r' => {
                self.reader.bump();
                if self.reader.current_char() == '\n' {
                    self.reader.bump();
                }
            }
            _ => {}
        }
        self.line += 1;

        EslTokenKind::TkEndOfLine
    }

    fn lex_white_space(&mut self) -> EslTokenKind {
        self.reader.eat_while(|ch| ch == ' ' || ch == '\t');
        EslTokenKind::TkWhitespace
    }

    fn skip_sep(&mut self) -> usize {
        self.reader.eat_when('=')
    }

    /// Short string: `"..."` with no escape processing. A raw newline or
    /// EOF before the closing quote is an error.
    fn lex_string(&mut self) -> EslTokenKind {
        self.reader
            .eat_while(|ch| ch != '"' && ch != '\n' && ch != '\r');

        if self.reader.current_char() != '"' {
            self.error("unfinished string");
            return EslTokenKind::TkString;
        }

        self.reader.bump();
        EslTokenKind::TkString
    }

    /// Body of a long string or comment; exits on `]=*]` of the same level.
    fn lex_long_bracket(&mut self, sep: usize) -> EslTokenKind {
        let mut end = false;
        while !self.reader.is_eof() {
            match self.reader.current_char() {
                ']' => {
                    self.reader.bump();
                    let count = self.reader.eat_when('=');
                    if count == sep && self.reader.current_char() == ']' {
                        self.reader.bump();
                        end = true;
                        break;
                    }
                }
                '\n' | '\r' => {
                    self.lex_new_line();
                }
                _ => {
                    self.reader.bump();
                }
            }
        }

        if !end {
            self.error("unfinished long string or comment near <eof>");
        }

        EslTokenKind::TkLongString
    }

    fn error(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(EslSyntaxError::Lex {
                line: self.line,
                message: message.into(),
            });
        }
    }
}

fn is_name_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_name_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
