//! AST node definitions produced by the parser and walked by the evaluator.

use std::rc::Rc;

use smol_str::SmolStr;

/// Top-level parsed unit of a script.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub block: Block,
}

/// A statement sequence with its own lexical scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stats: Vec<Stat>,
    pub lineno: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    pub kind: StatKind,
    pub lineno: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatKind {
    /// Equal-count multi-assignment, or a `local` declaration without
    /// values (every target then binds to nil).
    Assign {
        targets: Vec<Target>,
        values: Vec<Expr>,
        local: bool,
    },

    /// `do ... end`
    Do(Block),

    /// `while e do ... end` when `check_before`, `repeat ... until e`
    /// otherwise.
    While {
        cond: Expr,
        body: Block,
        check_before: bool,
    },

    If {
        cond: Expr,
        body: Block,
        elseifs: Vec<ElseIf>,
        else_body: Option<Block>,
    },

    /// `for name = start, limit [, step] do ... end`
    NumericFor {
        name: SmolStr,
        start: Expr,
        limit: Expr,
        step: Option<Expr>,
        body: Block,
    },

    /// `for names in exprs do ... end`
    GenericFor {
        names: Vec<SmolStr>,
        exprs: Vec<Expr>,
        body: Block,
    },

    /// `function a.b.c(...)`, `function a:m(...)` or `local function f(...)`
    Function {
        path: FuncPath,
        body: Rc<FunctionBody>,
        local: bool,
    },

    /// An expression statement; always a call.
    Call(Expr),

    Break,

    Return(Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseIf {
    pub cond: Expr,
    pub body: Block,
    pub lineno: u32,
}

/// Declaration path of a function statement: dotted parts plus the
/// optional `:`-separated method name.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncPath {
    pub parts: Vec<SmolStr>,
    pub method: Option<SmolStr>,
}

impl FuncPath {
    /// Diagnostic rendering, e.g. `a.b:m`.
    pub fn display_name(&self) -> SmolStr {
        let mut s = self.parts.join(".");
        if let Some(m) = &self.method {
            s.push(':');
            s.push_str(m);
        }
        SmolStr::new(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBody {
    pub params: Vec<SmolStr>,
    pub body: Block,
    pub lineno: u32,
}

/// Assignment target: a bare name or an indexed location.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub kind: TargetKind,
    pub lineno: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetKind {
    Name(SmolStr),
    Index { object: Expr, key: IndexKey },
}

/// `a.b` carries the static name; `a[e]` the computed key expression.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexKey {
    Attr(SmolStr),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub lineno: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Nil,
    True,
    False,
    Int(i64),
    Str(SmolStr),
    Name(SmolStr),

    Index {
        object: Box<Expr>,
        key: IndexKey,
    },

    /// Short-circuit `and` / `or`.
    Logical {
        op: LogicalOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// `..` string/number concatenation, right-associative.
    Concat {
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    Arith {
        op: ArithOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },

    Call {
        callee: Box<Expr>,
        method: Option<SmolStr>,
        args: Vec<Expr>,
        colon: bool,
    },

    /// Anonymous `function (...) ... end` expression.
    Function(Rc<FunctionBody>),

    /// Table constructor.
    Table(Vec<Field>),
}

/// One field of a table constructor. Unnamed fields receive increasing
/// integer keys starting at 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: Option<FieldKey>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKey {
    Name(SmolStr),
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    Len,
}
