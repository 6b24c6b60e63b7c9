use alloc::{boxed::Box, string::String, sync::Arc, vec::Vec};
use core::{
    fmt,
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
};

use serde_derive::{Deserialize, Serialize};

use crate::{Span, Spanned};

/// Identifies an expression node for the type checker's side tables.
///
/// Ids are handed out by whoever builds the tree (a parser or the
/// [`dsl`][crate::dsl] helpers). Nodes synthesized after type checking
/// carry [`NodeId::DUMMY`] and have no type information.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// The id of synthesized nodes.
    pub const DUMMY: Self = Self(0);

    /// Returns a new id that has not been handed out before.
    pub fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Reports whether this is [`NodeId::DUMMY`].
    pub fn is_dummy(self) -> bool {
        self == Self::DUMMY
    }
}

/// An identifier.
#[derive(Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Ident {
    /// The identifier name
    pub name: String,
    /// The source location of this identifier
    pub span: Span,
}

impl Ident {
    /// Creates an identifier.
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Reports whether this is the blank identifier `_`.
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)?;
        write!(f, " @ {:?}", self.span)?;
        Ok(())
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}

impl<T> PartialEq<T> for Ident
where
    T: AsRef<str> + ?Sized,
{
    fn eq(&self, other: &T) -> bool {
        self.name == other.as_ref()
    }
}

impl Spanned for Ident {
    fn span(&self) -> Span {
        self.span
    }
}

/// An operator spelling was not recognized.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown operator `{0}`")]
pub struct UnknownOperator(pub String);

macro_rules! operators {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Returns the source spelling of the operator.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOperator;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownOperator(s.into())),
                }
            }
        }
    };
}

operators! {
    /// A unary operator.
    ///
    /// Pointer dereference is [`ExprKind::Star`], not a unary
    /// operator.
    pub enum UnaryOp {
        /// `+x`
        Pos => "+",
        /// `-x`
        Neg => "-",
        /// `!x`
        Not => "!",
        /// `^x`
        Xor => "^",
        /// `&x`
        Addr => "&",
        /// `<-x`
        Recv => "<-",
    }
}

operators! {
    /// A binary operator.
    pub enum BinaryOp {
        /// `+`
        Add => "+",
        /// `-`
        Sub => "-",
        /// `*`
        Mul => "*",
        /// `/`
        Quo => "/",
        /// `%`
        Rem => "%",
        /// `&`
        And => "&",
        /// `|`
        Or => "|",
        /// `^`
        Xor => "^",
        /// `<<`
        Shl => "<<",
        /// `>>`
        Shr => ">>",
        /// `&^`
        AndNot => "&^",
        /// `&&`
        LAnd => "&&",
        /// `||`
        LOr => "||",
        /// `==`
        Eql => "==",
        /// `!=`
        Neq => "!=",
        /// `<`
        Lss => "<",
        /// `<=`
        Leq => "<=",
        /// `>`
        Gtr => ">",
        /// `>=`
        Geq => ">=",
    }
}

impl BinaryOp {
    /// Reports whether the operator short-circuits (`&&` or `||`).
    pub fn is_logical(self) -> bool {
        matches!(self, Self::LAnd | Self::LOr)
    }
}

/// The operator of an [`AssignStmt`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum AssignOp {
    /// `:=`
    Define,
    /// `=`
    Assign,
    /// `op=`, e.g. `+=`
    Op(BinaryOp),
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Define => f.write_str(":="),
            Self::Assign => f.write_str("="),
            Self::Op(op) => write!(f, "{op}="),
        }
    }
}

/// `++` or `--`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum IncDecOp {
    /// `x++`
    Inc,
    /// `x--`
    Dec,
}

/// The keyword of a [`BranchStmt`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum BranchTok {
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `goto`
    Goto,
    /// `fallthrough`
    Fallthrough,
}

/// The kind of a literal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum LitKind {
    /// `42`
    Int,
    /// `4.2`
    Float,
    /// `4.2i`
    Imag,
    /// `'a'`
    Char,
    /// `"text"` or `` `text` ``
    String,
}

/// A basic literal, kept in its source spelling.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Lit {
    /// The literal kind
    pub kind: LitKind,
    /// The literal as written, quotes included
    pub value: String,
}

/// The direction of a channel type.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ChanDir {
    /// `chan T`
    Both,
    /// `chan<- T`
    Send,
    /// `<-chan T`
    Recv,
}

/// A parameter, result, or struct field declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// The declared names, empty for anonymous fields
    pub names: Vec<Ident>,
    /// The field type
    pub ty: Arc<Expr>,
}

/// A function signature.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FuncType {
    /// Parameters
    pub params: Vec<Field>,
    /// Results
    pub results: Vec<Field>,
}

/// A type literal. Type expressions are never evaluated at run
/// time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// `[N]T`, or `[]T` if `len` is `None`
    Array {
        /// The array length
        len: Option<Arc<Expr>>,
        /// The element type
        elem: Arc<Expr>,
    },
    /// `map[K]V`
    Map {
        /// The key type
        key: Arc<Expr>,
        /// The value type
        value: Arc<Expr>,
    },
    /// `chan T`, `chan<- T`, `<-chan T`
    Chan {
        /// The channel direction
        dir: ChanDir,
        /// The element type
        elem: Arc<Expr>,
    },
    /// `func(...) ...`
    Func(FuncType),
    /// `struct { ... }`
    Struct(Vec<Field>),
    /// `interface { ... }`
    Interface(Vec<Field>),
}

/// An element of a composite literal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// The key, if this is a `key: value` element
    pub key: Option<Arc<Expr>>,
    /// The value
    pub value: Arc<Expr>,
}

/// A composite literal, e.g. `T{a, b: c}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeLit {
    /// The literal type, elided in nested literals
    pub ty: Option<Arc<Expr>>,
    /// The elements
    pub elts: Vec<Element>,
}

/// A function literal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuncLit {
    /// The signature
    pub ty: FuncType,
    /// The body
    pub body: Block,
}

/// A slice expression, `x[low:high]` or `x[low:high:max]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SliceExpr {
    /// The operand
    pub x: Arc<Expr>,
    /// The lower bound
    pub low: Option<Arc<Expr>>,
    /// The upper bound
    pub high: Option<Arc<Expr>>,
    /// The capacity bound
    pub max: Option<Arc<Expr>>,
    /// Whether this is a three-index slice
    pub slice3: bool,
}

/// A call, conversion, or builtin invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    /// The callee
    pub fun: Arc<Expr>,
    /// The arguments
    pub args: Vec<Arc<Expr>>,
    /// Whether the last argument is followed by `...`
    pub ellipsis: bool,
}

/// An expression.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    /// Key into the type checker's side tables
    pub id: NodeId,
    /// The expression kind
    pub kind: ExprKind,
    /// The source location of this expression
    pub span: Span,
}

impl Expr {
    /// Creates an expression with a fresh [`NodeId`].
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self {
            id: NodeId::next(),
            kind,
            span,
        }
    }

    /// Creates an expression that has no type information.
    pub fn synthetic(kind: ExprKind, span: Span) -> Self {
        Self {
            id: NodeId::DUMMY,
            kind,
            span,
        }
    }

    /// Creates a node that replaces `self`, keeping its id and
    /// span.
    pub fn rebuild(&self, kind: ExprKind) -> Self {
        Self {
            id: self.id,
            kind,
            span: self.span,
        }
    }

    /// Returns the call if this is a call expression.
    pub fn as_call(&self) -> Option<&CallExpr> {
        match &self.kind {
            ExprKind::Call(call) => Some(call),
            _ => None,
        }
    }

    /// Returns the identifier if this is an identifier
    /// expression.
    pub fn as_ident(&self) -> Option<&Ident> {
        match &self.kind {
            ExprKind::Ident(ident) => Some(ident),
            _ => None,
        }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)?;
        write!(f, " @ {:?}", self.span)?;
        Ok(())
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

/// The kind of [`Expr`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprKind {
    /// A basic literal
    BasicLit(Lit),
    /// A variable, constant, function, package, or type name
    Ident(Ident),
    /// `T{...}`
    CompositeLit(CompositeLit),
    /// `func(...) { ... }`
    FuncLit(FuncLit),
    /// `(x)`
    Paren(Arc<Expr>),
    /// `x.sel`
    Selector(Arc<Expr>, Ident),
    /// `x[index]`
    Index(Arc<Expr>, Arc<Expr>),
    /// `x[low:high:max]`
    Slice(SliceExpr),
    /// `x.(T)`, or `x.(type)` if the type is `None`
    TypeAssert(Arc<Expr>, Option<Arc<Expr>>),
    /// `fun(args...)`
    Call(CallExpr),
    /// `*x`
    Star(Arc<Expr>),
    /// `op x`
    Unary(UnaryOp, Arc<Expr>),
    /// `x op y`
    Binary(BinaryOp, Arc<Expr>, Arc<Expr>),
    /// A type literal
    Type(TypeExpr),
}

/// A braced statement list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// The statements
    pub stmts: Vec<Stmt>,
    /// The source location of this block
    pub span: Span,
}

impl Block {
    /// Creates a block.
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Self { stmts, span }
    }
}

/// `lhs op rhs`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssignStmt {
    /// Assignment targets
    pub lhs: Vec<Arc<Expr>>,
    /// `=`, `:=`, or `op=`
    pub op: AssignOp,
    /// Assigned values
    pub rhs: Vec<Arc<Expr>>,
}

/// `break`, `continue`, `goto`, or `fallthrough`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BranchStmt {
    /// The keyword
    pub tok: BranchTok,
    /// The target label, if any
    pub label: Option<Ident>,
}

/// `if init; cond { body } else els`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    /// Initialization statement
    pub init: Option<Box<Stmt>>,
    /// The condition
    pub cond: Arc<Expr>,
    /// Taken when `cond` holds
    pub body: Block,
    /// Either a block or another `if`
    pub els: Option<Box<Stmt>>,
}

/// One clause of an expression or type switch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseClause {
    /// Match expressions (or types); empty for `default`
    pub list: Vec<Arc<Expr>>,
    /// The clause body
    pub body: Vec<Stmt>,
    /// The source location of this clause
    pub span: Span,
}

impl CaseClause {
    /// Reports whether this is the `default` clause.
    pub fn is_default(&self) -> bool {
        self.list.is_empty()
    }
}

impl Spanned for CaseClause {
    fn span(&self) -> Span {
        self.span
    }
}

/// `switch init; tag { clauses }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwitchStmt {
    /// Initialization statement
    pub init: Option<Box<Stmt>>,
    /// The discriminant; `true` if absent
    pub tag: Option<Arc<Expr>>,
    /// The clauses
    pub clauses: Vec<CaseClause>,
}

/// `switch init; bind := guard { clauses }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeSwitchStmt {
    /// Initialization statement
    pub init: Option<Box<Stmt>>,
    /// The variable bound in each clause, if any
    pub bind: Option<Ident>,
    /// The `x.(type)` assertion
    pub guard: Arc<Expr>,
    /// The clauses
    pub clauses: Vec<CaseClause>,
}

/// The receive operation of a [`CommClause`]: `lhs := x`,
/// `lhs = x`, or just `x`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecvStmt {
    /// Assignment targets; empty for a bare receive
    pub lhs: Vec<Arc<Expr>>,
    /// Whether the targets are declared (`:=`)
    pub define: bool,
    /// The `<-ch` expression
    pub x: Arc<Expr>,
}

/// The communication operation of a [`CommClause`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Comm {
    /// `ch <- value`
    Send {
        /// The channel
        chan: Arc<Expr>,
        /// The value sent
        value: Arc<Expr>,
    },
    /// A receive
    Recv(RecvStmt),
}

/// One clause of a `select`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommClause {
    /// The operation; `None` for `default`
    pub comm: Option<Comm>,
    /// The clause body
    pub body: Vec<Stmt>,
    /// The source location of this clause
    pub span: Span,
}

/// `select { clauses }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectStmt {
    /// The clauses
    pub clauses: Vec<CommClause>,
}

/// `for init; cond; post { body }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    /// Initialization statement
    pub init: Option<Box<Stmt>>,
    /// Loop condition; absent means `true`
    pub cond: Option<Arc<Expr>>,
    /// Post-iteration statement
    pub post: Option<Box<Stmt>>,
    /// The loop body
    pub body: Block,
}

/// `for key, value := range x { body }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeStmt {
    /// The key target
    pub key: Option<Arc<Expr>>,
    /// The value target
    pub value: Option<Arc<Expr>>,
    /// Whether the targets are declared (`:=`)
    pub define: bool,
    /// The ranged-over operand
    pub x: Arc<Expr>,
    /// The loop body
    pub body: Block,
}

/// Statements.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    /// The statement kind
    pub kind: StmtKind,
    /// The source location of this statement
    pub span: Span,
}

impl Stmt {
    /// Creates a statement.
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Reports whether this is a `fallthrough` statement.
    pub fn is_fallthrough(&self) -> bool {
        matches!(
            &self.kind,
            StmtKind::Branch(BranchStmt {
                tok: BranchTok::Fallthrough,
                ..
            })
        )
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)?;
        write!(f, " @ {:?}", self.span)?;
        Ok(())
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

/// The kind of [`Stmt`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// An empty statement
    Empty,
    /// A declaration inside a function body
    Decl(GenDecl),
    /// `label: stmt`
    Labeled(Ident, Box<Stmt>),
    /// An expression evaluated for its effects
    Expr(Arc<Expr>),
    /// `ch <- value`
    Send(Arc<Expr>, Arc<Expr>),
    /// `x++` or `x--`
    IncDec(Arc<Expr>, IncDecOp),
    /// An [`AssignStmt`]
    Assign(AssignStmt),
    /// `go call`
    Go(Arc<Expr>),
    /// `defer call`
    Defer(Arc<Expr>),
    /// `return results`
    Return(Vec<Arc<Expr>>),
    /// A [`BranchStmt`]
    Branch(BranchStmt),
    /// A nested [`Block`]
    Block(Block),
    /// An [`IfStmt`]
    If(IfStmt),
    /// A [`SwitchStmt`]
    Switch(SwitchStmt),
    /// A [`TypeSwitchStmt`]
    TypeSwitch(TypeSwitchStmt),
    /// A [`SelectStmt`]
    Select(SelectStmt),
    /// A [`ForStmt`]
    For(ForStmt),
    /// A [`RangeStmt`]
    Range(RangeStmt),
}

/// The keyword of a [`GenDecl`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum DeclTok {
    /// `import`
    Import,
    /// `const`
    Const,
    /// `type`
    Type,
    /// `var`
    Var,
}

impl fmt::Display for DeclTok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Import => "import",
            Self::Const => "const",
            Self::Type => "type",
            Self::Var => "var",
        })
    }
}

/// `import name "path"`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImportSpec {
    /// Local package name
    pub name: Option<Ident>,
    /// The import path literal
    pub path: Lit,
}

/// `names type = values` in a `var` or `const` declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    /// Declared names
    pub names: Vec<Ident>,
    /// Declared type
    pub ty: Option<Arc<Expr>>,
    /// Initial values
    pub values: Vec<Arc<Expr>>,
}

/// `name type`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    /// The type name
    pub name: Ident,
    /// The underlying type
    pub ty: Arc<Expr>,
}

/// A single specification in a [`GenDecl`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Spec {
    /// An [`ImportSpec`]
    Import(ImportSpec),
    /// A [`ValueSpec`]
    Value(ValueSpec),
    /// A [`TypeSpec`]
    Type(TypeSpec),
}

/// An `import`, `const`, `type`, or `var` declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenDecl {
    /// The keyword
    pub tok: DeclTok,
    /// The specifications
    pub specs: Vec<Spec>,
    /// The source location of this declaration
    pub span: Span,
}

/// A function or method declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    /// The method receiver
    pub recv: Option<Field>,
    /// The function name
    pub name: Ident,
    /// The signature
    pub ty: FuncType,
    /// The body; absent for externally implemented functions
    pub body: Option<Block>,
    /// The source location of this declaration
    pub span: Span,
}

/// A top-level declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    /// A [`GenDecl`]
    Gen(GenDecl),
    /// A [`FuncDecl`]
    Func(FuncDecl),
}

/// A compilation unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct File {
    /// The package clause
    pub package: Ident,
    /// Top-level declarations
    pub decls: Vec<Decl>,
    /// The source location of this file
    pub span: Span,
}
