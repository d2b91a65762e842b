use std::rc::Rc;

use smol_str::SmolStr;

use crate::esl_error::EslSyntaxError;

use super::ast::*;
use super::esl_token_data::EslTokenData;
use super::esl_token_kind::EslTokenKind;
use super::esl_tokenize::EslTokenize;
use super::reader::Reader;

type ParseResult<T> = Result<T, EslSyntaxError>;

/// Recursive-descent parser over the token stream, one-token lookahead.
///
/// Expression parsing is an explicit precedence cascade, lowest binding
/// first: `or`, `and`, comparison, `..` (right-assoc), additive,
/// multiplicative, unary, `^` (right-assoc), atoms.
pub struct EslParser<'a> {
    text: &'a str,
    tokens: Vec<EslTokenData>,
    index: usize,
    current: EslTokenKind,
}

/// Parse a complete script into a chunk.
pub fn parse_chunk(text: &str) -> ParseResult<Chunk> {
    let tokens = EslTokenize::new(Reader::new(text)).tokenize()?;
    let mut parser = EslParser::new(text, tokens);
    let block = parser.parse_block()?;
    if parser.current != EslTokenKind::TkEof {
        return Err(parser.unexpected());
    }
    Ok(Chunk { block })
}

impl<'a> EslParser<'a> {
    fn new(text: &'a str, tokens: Vec<EslTokenData>) -> Self {
        let mut parser = EslParser {
            text,
            tokens,
            index: 0,
            current: EslTokenKind::TkEof,
        };
        parser.sync_current();
        parser
    }

    fn sync_current(&mut self) {
        while self.index < self.tokens.len() && self.tokens[self.index].kind.is_trivia() {
            self.index += 1;
        }
        self.current = if self.index < self.tokens.len() {
            self.tokens[self.index].kind
        } else {
            EslTokenKind::TkEof
        };
    }

    fn bump(&mut self) {
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        self.sync_current();
    }

    fn line(&self) -> u32 {
        if self.index < self.tokens.len() {
            self.tokens[self.index].line
        } else {
            self.tokens.last().map(|t| t.line).unwrap_or(1)
        }
    }

    fn token_text(&self) -> &'a str {
        if self.index < self.tokens.len() {
            let range = self.tokens[self.index].range;
            &self.text[range.start..range.end()]
        } else {
            "<eof>"
        }
    }

    fn unexpected(&self) -> EslSyntaxError {
        EslSyntaxError::Parse {
            line: self.line(),
            column: self.column(),
            near: self.token_text().to_string(),
        }
    }

    /// 1-based character column of the current token on its line.
    fn column(&self) -> u32 {
        let offset = if self.index < self.tokens.len() {
            self.tokens[self.index].range.start
        } else {
            self.text.len()
        };
        let line_start = self.text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
        self.text[line_start..offset].chars().count() as u32 + 1
    }

    fn expect(&mut self, kind: EslTokenKind) -> ParseResult<()> {
        if self.current == kind {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn accept(&mut self, kind: EslTokenKind) -> bool {
        if self.current == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_name(&mut self) -> ParseResult<SmolStr> {
        if self.current != EslTokenKind::TkName {
            return Err(self.unexpected());
        }
        let name = SmolStr::new(self.token_text());
        self.bump();
        Ok(name)
    }

    fn peek_next(&self) -> EslTokenKind {
        let mut next = self.index + 1;
        while next < self.tokens.len() && self.tokens[next].kind.is_trivia() {
            next += 1;
        }
        if next < self.tokens.len() {
            self.tokens[next].kind
        } else {
            EslTokenKind::TkEof
        }
    }

    // ---- statements ---------------------------------------------------

    fn parse_block(&mut self) -> ParseResult<Block> {
        use EslTokenKind::*;

        let lineno = self.line();
        let mut stats = Vec::new();

        loop {
            match self.current {
                TkSemicolon => {
                    self.bump();
                }
                TkBreak => {
                    let line = self.line();
                    self.bump();
                    self.accept(TkSemicolon);
                    stats.push(Stat {
                        kind: StatKind::Break,
                        lineno: line,
                    });
                    break;
                }
                TkReturn => {
                    let line = self.line();
                    self.bump();
                    let exprs = if block_follow(self.current) || self.current == TkSemicolon {
                        Vec::new()
                    } else {
                        self.parse_exprlist()?
                    };
                    self.accept(TkSemicolon);
                    stats.push(Stat {
                        kind: StatKind::Return(exprs),
                        lineno: line,
                    });
                    break;
                }
                kind if block_follow(kind) => break,
                _ => stats.push(self.parse_statement()?),
            }
        }

        Ok(Block { stats, lineno })
    }

    fn parse_statement(&mut self) -> ParseResult<Stat> {
        use EslTokenKind::*;

        let lineno = self.line();
        let kind = match self.current {
            TkDo => {
                self.bump();
                let body = self.parse_block()?;
                self.expect(TkEnd)?;
                StatKind::Do(body)
            }
            TkWhile => {
                self.bump();
                let cond = self.parse_expr()?;
                self.expect(TkDo)?;
                let body = self.parse_block()?;
                self.expect(TkEnd)?;
                StatKind::While {
                    cond,
                    body,
                    check_before: true,
                }
            }
            TkRepeat => {
                self.bump();
                let body = self.parse_block()?;
                self.expect(TkUntil)?;
                let cond = self.parse_expr()?;
                StatKind::While {
                    cond,
                    body,
                    check_before: false,
                }
            }
            TkIf => self.parse_if()?,
            TkFor => self.parse_for()?,
            TkFunction => {
                self.bump();
                let path = self.parse_funcname()?;
                let body = self.parse_funcbody()?;
                StatKind::Function {
                    path,
                    body,
                    local: false,
                }
            }
            TkLocal => {
                self.bump();
                if self.current == TkFunction {
                    self.bump();
                    let name = self.expect_name()?;
                    let body = self.parse_funcbody()?;
                    StatKind::Function {
                        path: FuncPath {
                            parts: vec![name],
                            method: Option::None,
                        },
                        body,
                        local: true,
                    }
                } else {
                    let mut targets = vec![Target {
                        kind: TargetKind::Name(self.expect_name()?),
                        lineno,
                    }];
                    while self.accept(TkComma) {
                        let line = self.line();
                        targets.push(Target {
                            kind: TargetKind::Name(self.expect_name()?),
                            lineno: line,
                        });
                    }
                    let values = if self.accept(TkAssign) {
                        self.parse_exprlist()?
                    } else {
                        Vec::new()
                    };
                    StatKind::Assign {
                        targets,
                        values,
                        local: true,
                    }
                }
            }
            TkName | TkLeftParen => self.parse_expr_statement()?,
            _ => return Err(self.unexpected()),
        };

        Ok(Stat { kind, lineno })
    }

    fn parse_if(&mut self) -> ParseResult<StatKind> {
        use EslTokenKind::*;

        self.bump();
        let cond = self.parse_expr()?;
        self.expect(TkThen)?;
        let body = self.parse_block()?;

        let mut elseifs = Vec::new();
        while self.current == TkElseIf {
            let lineno = self.line();
            self.bump();
            let cond = self.parse_expr()?;
            self.expect(TkThen)?;
            let body = self.parse_block()?;
            elseifs.push(ElseIf { cond, body, lineno });
        }

        let else_body = if self.accept(TkElse) {
            Some(self.parse_block()?)
        } else {
            Option::None
        };
        self.expect(TkEnd)?;

        Ok(StatKind::If {
            cond,
            body,
            elseifs,
            else_body,
        })
    }

    fn parse_for(&mut self) -> ParseResult<StatKind> {
        use EslTokenKind::*;

        self.bump();
        let name = self.expect_name()?;

        if self.current == TkAssign {
            self.bump();
            let start = self.parse_expr()?;
            self.expect(TkComma)?;
            let limit = self.parse_expr()?;
            let step = if self.accept(TkComma) {
                Some(self.parse_expr()?)
            } else {
                Option::None
            };
            self.expect(TkDo)?;
            let body = self.parse_block()?;
            self.expect(TkEnd)?;
            return Ok(StatKind::NumericFor {
                name,
                start,
                limit,
                step,
                body,
            });
        }

        let mut names = vec![name];
        while self.accept(TkComma) {
            names.push(self.expect_name()?);
        }
        self.expect(TkIn)?;
        let exprs = self.parse_exprlist()?;
        self.expect(TkDo)?;
        let body = self.parse_block()?;
        self.expect(TkEnd)?;

        Ok(StatKind::GenericFor { names, exprs, body })
    }

    /// A statement starting with a name or `(`: either a multi-assignment
    /// or a bare function call.
    fn parse_expr_statement(&mut self) -> ParseResult<StatKind> {
        use EslTokenKind::*;

        let first = self.parse_suffixed_expr()?;

        if self.current == TkAssign || self.current == TkComma {
            let mut targets = vec![self.to_target(first)?];
            while self.accept(TkComma) {
                let expr = self.parse_suffixed_expr()?;
                targets.push(self.to_target(expr)?);
            }
            self.expect(TkAssign)?;
            let values = self.parse_exprlist()?;
            return Ok(StatKind::Assign {
                targets,
                values,
                local: false,
            });
        }

        match first.kind {
            ExprKind::Call { .. } => Ok(StatKind::Call(first)),
            _ => Err(self.unexpected()),
        }
    }

    fn to_target(&self, expr: Expr) -> ParseResult<Target> {
        let lineno = expr.lineno;
        match expr.kind {
            ExprKind::Name(name) => Ok(Target {
                kind: TargetKind::Name(name),
                lineno,
            }),
            ExprKind::Index { object, key } => Ok(Target {
                kind: TargetKind::Index {
                    object: *object,
                    key,
                },
                lineno,
            }),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_funcname(&mut self) -> ParseResult<FuncPath> {
        use EslTokenKind::*;

        let mut parts = vec![self.expect_name()?];
        while self.accept(TkDot) {
            parts.push(self.expect_name()?);
        }
        let method = if self.accept(TkColon) {
            Some(self.expect_name()?)
        } else {
            Option::None
        };
        Ok(FuncPath { parts, method })
    }

    fn parse_funcbody(&mut self) -> ParseResult<Rc<FunctionBody>> {
        use EslTokenKind::*;

        let lineno = self.line();
        self.expect(TkLeftParen)?;
        let mut params = Vec::new();
        if self.current == TkName {
            params.push(self.expect_name()?);
            while self.accept(TkComma) {
                params.push(self.expect_name()?);
            }
        }
        if self.current == TkDots {
            // The dialect reserves `...` but does not implement varargs.
            return Err(self.unexpected());
        }
        self.expect(TkRightParen)?;
        let body = self.parse_block()?;
        self.expect(TkEnd)?;

        Ok(Rc::new(FunctionBody {
            params,
            body,
            lineno,
        }))
    }

    fn parse_exprlist(&mut self) -> ParseResult<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.accept(EslTokenKind::TkComma) {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    // ---- expressions --------------------------------------------------

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.current == EslTokenKind::TkOr {
            let lineno = self.line();
            self.bump();
            let rhs = self.parse_and()?;
            lhs = Expr {
                kind: ExprKind::Logical {
                    op: LogicalOp::Or,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                lineno,
            };
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_compare()?;
        while self.current == EslTokenKind::TkAnd {
            let lineno = self.line();
            self.bump();
            let rhs = self.parse_compare()?;
            lhs = Expr {
                kind: ExprKind::Logical {
                    op: LogicalOp::And,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                lineno,
            };
        }
        Ok(lhs)
    }

    fn parse_compare(&mut self) -> ParseResult<Expr> {
        use EslTokenKind::*;

        let mut lhs = self.parse_concat()?;
        loop {
            let op = match self.current {
                TkEq => CompareOp::Eq,
                TkNe => CompareOp::Ne,
                TkLt => CompareOp::Lt,
                TkGt => CompareOp::Gt,
                TkLe => CompareOp::Le,
                TkGe => CompareOp::Ge,
                _ => break,
            };
            let lineno = self.line();
            self.bump();
            let rhs = self.parse_concat()?;
            lhs = Expr {
                kind: ExprKind::Compare {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                lineno,
            };
        }
        Ok(lhs)
    }

    fn parse_concat(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_additive()?;
        if self.current == EslTokenKind::TkConcat {
            let lineno = self.line();
            self.bump();
            // Right-associative.
            let rhs = self.parse_concat()?;
            return Ok(Expr {
                kind: ExprKind::Concat {
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                lineno,
            });
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        use EslTokenKind::*;

        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current {
                TkPlus => ArithOp::Add,
                TkMinus => ArithOp::Sub,
                _ => break,
            };
            let lineno = self.line();
            self.bump();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr {
                kind: ExprKind::Arith {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                lineno,
            };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        use EslTokenKind::*;

        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current {
                TkMul => ArithOp::Mul,
                TkDiv => ArithOp::Div,
                TkMod => ArithOp::Mod,
                _ => break,
            };
            let lineno = self.line();
            self.bump();
            let rhs = self.parse_unary()?;
            lhs = Expr {
                kind: ExprKind::Arith {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                lineno,
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        use EslTokenKind::*;

        let op = match self.current {
            TkNot => UnaryOp::Not,
            TkLen => UnaryOp::Len,
            TkMinus => UnaryOp::Neg,
            _ => return self.parse_pow(),
        };
        let lineno = self.line();
        self.bump();
        let expr = self.parse_unary()?;
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                expr: Box::new(expr),
            },
            lineno,
        })
    }

    fn parse_pow(&mut self) -> ParseResult<Expr> {
        let lhs = self.parse_simple_expr()?;
        if self.current == EslTokenKind::TkPow {
            let lineno = self.line();
            self.bump();
            // Right-associative; the exponent admits unary operators
            // (`2 ^ -3` parses).
            let rhs = self.parse_unary()?;
            return Ok(Expr {
                kind: ExprKind::Arith {
                    op: ArithOp::Pow,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                lineno,
            });
        }
        Ok(lhs)
    }

    fn parse_simple_expr(&mut self) -> ParseResult<Expr> {
        use EslTokenKind::*;

        let lineno = self.line();
        let kind = match self.current {
            TkNil => {
                self.bump();
                ExprKind::Nil
            }
            TkTrue => {
                self.bump();
                ExprKind::True
            }
            TkFalse => {
                self.bump();
                ExprKind::False
            }
            TkInt => {
                let value: i64 = self.token_text().parse().map_err(|_| self.unexpected())?;
                self.bump();
                ExprKind::Int(value)
            }
            TkString | TkLongString => {
                let text = self.string_token_text();
                self.bump();
                ExprKind::Str(text)
            }
            TkFunction => {
                self.bump();
                ExprKind::Function(self.parse_funcbody()?)
            }
            TkLeftBrace => self.parse_table()?,
            TkName | TkLeftParen => return self.parse_suffixed_expr(),
            _ => return Err(self.unexpected()),
        };

        Ok(Expr { kind, lineno })
    }

    /// Strip the delimiters off a string token. Short strings lose the
    /// quotes; long strings lose `[=*[` and `]=*]` of the recorded level.
    /// Inner text is verbatim in both forms.
    fn string_token_text(&self) -> SmolStr {
        let text = self.token_text();
        if self.current == EslTokenKind::TkString {
            SmolStr::new(&text[1..text.len() - 1])
        } else {
            let sep = text[1..].chars().take_while(|&c| c == '=').count();
            SmolStr::new(&text[sep + 2..text.len() - sep - 2])
        }
    }

    fn parse_table(&mut self) -> ParseResult<ExprKind> {
        use EslTokenKind::*;

        self.expect(TkLeftBrace)?;
        let mut fields = Vec::new();

        while self.current != TkRightBrace {
            let field = match self.current {
                TkLeftBracket => {
                    self.bump();
                    let key = self.parse_expr()?;
                    self.expect(TkRightBracket)?;
                    self.expect(TkAssign)?;
                    let value = self.parse_expr()?;
                    Field {
                        key: Some(FieldKey::Expr(key)),
                        value,
                    }
                }
                TkName if self.peek_next() == TkAssign => {
                    let name = self.expect_name()?;
                    self.expect(TkAssign)?;
                    let value = self.parse_expr()?;
                    Field {
                        key: Some(FieldKey::Name(name)),
                        value,
                    }
                }
                _ => Field {
                    key: Option::None,
                    value: self.parse_expr()?,
                },
            };
            fields.push(field);

            if !self.accept(TkComma) && !self.accept(TkSemicolon) {
                break;
            }
        }
        self.expect(TkRightBrace)?;

        Ok(ExprKind::Table(fields))
    }

    /// A primary expression (`Name` or parenthesized expression) followed
    /// by any run of `.name`, `[exp]`, `:name(args)` and call suffixes.
    fn parse_suffixed_expr(&mut self) -> ParseResult<Expr> {
        use EslTokenKind::*;

        let mut expr = match self.current {
            TkName => {
                let lineno = self.line();
                let name = self.expect_name()?;
                Expr {
                    kind: ExprKind::Name(name),
                    lineno,
                }
            }
            TkLeftParen => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(TkRightParen)?;
                inner
            }
            _ => return Err(self.unexpected()),
        };

        loop {
            match self.current {
                TkDot => {
                    let lineno = self.line();
                    self.bump();
                    let name = self.expect_name()?;
                    expr = Expr {
                        kind: ExprKind::Index {
                            object: Box::new(expr),
                            key: IndexKey::Attr(name),
                        },
                        lineno,
                    };
                }
                TkLeftBracket => {
                    let lineno = self.line();
                    self.bump();
                    let key = self.parse_expr()?;
                    self.expect(TkRightBracket)?;
                    expr = Expr {
                        kind: ExprKind::Index {
                            object: Box::new(expr),
                            key: IndexKey::Expr(Box::new(key)),
                        },
                        lineno,
                    };
                }
                TkColon => {
                    let lineno = self.line();
                    self.bump();
                    let name = self.expect_name()?;
                    let args = self.parse_call_args()?;
                    expr = Expr {
                        kind: ExprKind::Call {
                            callee: Box::new(expr),
                            method: Some(name),
                            args,
                            colon: true,
                        },
                        lineno,
                    };
                }
                TkLeftParen | TkString | TkLongString | TkLeftBrace => {
                    let lineno = self.line();
                    let args = self.parse_call_args()?;
                    expr = Expr {
                        kind: ExprKind::Call {
                            callee: Box::new(expr),
                            method: Option::None,
                            args,
                            colon: false,
                        },
                        lineno,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Call arguments: `(explist?)`, a single string literal, or a table
    /// constructor.
    fn parse_call_args(&mut self) -> ParseResult<Vec<Expr>> {
        use EslTokenKind::*;

        match self.current {
            TkLeftParen => {
                self.bump();
                let args = if self.current == TkRightParen {
                    Vec::new()
                } else {
                    self.parse_exprlist()?
                };
                self.expect(TkRightParen)?;
                Ok(args)
            }
            TkString | TkLongString => {
                let lineno = self.line();
                let text = self.string_token_text();
                self.bump();
                Ok(vec![Expr {
                    kind: ExprKind::Str(text),
                    lineno,
                }])
            }
            TkLeftBrace => {
                let lineno = self.line();
                let kind = self.parse_table()?;
                Ok(vec![Expr { kind, lineno }])
            }
            _ => Err(self.unexpected()),
        }
    }
}

fn block_follow(kind: EslTokenKind) -> bool {
    matches!(
        kind,
        EslTokenKind::TkEnd
            | EslTokenKind::TkElse
            | EslTokenKind::TkElseIf
            | EslTokenKind::TkUntil
            | EslTokenKind::TkEof
    )
}
