//! The Groovy AST.
//!
//! Nodes live in per-kind arenas owned by [`File`]; ids are plain `u32`
//! newtypes. Node kinds are closed sum types so every consumer match is
//! checked for exhaustiveness by the compiler.

use std::fmt;

use groove_core::{Name, Span};

use crate::literals::StringKind;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtId(u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId(u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u32);

macro_rules! impl_ast_id {
    ($($id:ident),+) => {
        $(
            impl $id {
                pub(crate) fn from_raw(raw: u32) -> Self {
                    $id(raw)
                }

                #[must_use]
                pub fn idx(self) -> usize {
                    self.0 as usize
                }
            }

            impl fmt::Debug for $id {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!(stringify!($id), "({})"), self.0)
                }
            }
        )+
    };
}

impl_ast_id!(ExprId, StmtId, ClassId, MethodId, FieldId);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Arena<T> {
    data: Vec<T>,
}

impl<T> Arena<T> {
    fn alloc(&mut self, value: T) -> u32 {
        let idx = self.data.len() as u32;
        self.data.push(value);
        idx
    }

    fn get(&self, idx: usize) -> &T {
        &self.data[idx]
    }

    fn get_mut(&mut self, idx: usize) -> &mut T {
        &mut self.data[idx]
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena { data: Vec::new() }
    }
}

/// One parsed Groovy source file.
///
/// Files hold every node of every class declared in them, plus loose script
/// statements. A file with script statements implies a synthetic script
/// class named after the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub name: Name,
    pub package: Option<Name>,
    top_level: Vec<ClassId>,
    script_body: Vec<StmtId>,
    classes: Arena<ClassDecl>,
    methods: Arena<MethodDecl>,
    fields: Arena<FieldDecl>,
    stmts: Arena<Stmt>,
    exprs: Arena<Expr>,
}

impl File {
    #[must_use]
    pub fn new(name: impl Into<Name>) -> Self {
        File {
            name: name.into(),
            package: None,
            top_level: Vec::new(),
            script_body: Vec::new(),
            classes: Arena::default(),
            methods: Arena::default(),
            fields: Arena::default(),
            stmts: Arena::default(),
            exprs: Arena::default(),
        }
    }

    pub fn alloc_expr(&mut self, kind: ExprKind, span: Span) -> ExprId {
        ExprId::from_raw(self.exprs.alloc(Expr { kind, span }))
    }

    pub fn alloc_stmt(&mut self, kind: StmtKind, span: Span) -> StmtId {
        StmtId::from_raw(self.stmts.alloc(Stmt { kind, span }))
    }

    pub fn alloc_method(&mut self, method: MethodDecl) -> MethodId {
        MethodId::from_raw(self.methods.alloc(method))
    }

    pub fn alloc_field(&mut self, field: FieldDecl) -> FieldId {
        FieldId::from_raw(self.fields.alloc(field))
    }

    /// Allocate a class without exposing it at the top level (nested and
    /// anonymous classes).
    pub fn alloc_class(&mut self, class: ClassDecl) -> ClassId {
        ClassId::from_raw(self.classes.alloc(class))
    }

    pub fn add_top_level_class(&mut self, class: ClassDecl) -> ClassId {
        let id = self.alloc_class(class);
        self.top_level.push(id);
        id
    }

    pub fn push_script_stmt(&mut self, stmt: StmtId) {
        self.script_body.push(stmt);
    }

    #[must_use]
    pub fn top_level_classes(&self) -> &[ClassId] {
        &self.top_level
    }

    #[must_use]
    pub fn script_body(&self) -> &[StmtId] {
        &self.script_body
    }

    pub fn all_classes(&self) -> impl Iterator<Item = ClassId> + '_ {
        (0..self.classes.len() as u32).map(ClassId::from_raw)
    }

    #[must_use]
    pub fn class(&self, id: ClassId) -> &ClassDecl {
        self.classes.get(id.idx())
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDecl {
        self.classes.get_mut(id.idx())
    }

    #[must_use]
    pub fn method(&self, id: MethodId) -> &MethodDecl {
        self.methods.get(id.idx())
    }

    pub fn method_mut(&mut self, id: MethodId) -> &mut MethodDecl {
        self.methods.get_mut(id.idx())
    }

    #[must_use]
    pub fn field(&self, id: FieldId) -> &FieldDecl {
        self.fields.get(id.idx())
    }

    #[must_use]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        self.stmts.get(id.idx())
    }

    #[must_use]
    pub fn expr(&self, id: ExprId) -> &Expr {
        self.exprs.get(id.idx())
    }

    pub fn all_exprs(&self) -> impl Iterator<Item = ExprId> + '_ {
        (0..self.exprs.len() as u32).map(ExprId::from_raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: Name,
    pub name_span: Span,
    pub kind: ClassKind,
    pub modifiers: ModifierList,
    pub annotations: Vec<Annotation>,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub methods: Vec<MethodId>,
    pub fields: Vec<FieldId>,
    pub initializers: Vec<Initializer>,
    pub is_anonymous: bool,
    pub span: Span,
}

impl ClassDecl {
    #[must_use]
    pub fn new(name: impl Into<Name>, kind: ClassKind, name_span: Span) -> Self {
        ClassDecl {
            name: name.into(),
            name_span,
            kind,
            modifiers: ModifierList::default(),
            annotations: Vec::new(),
            type_params: Vec::new(),
            extends: None,
            implements: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
            initializers: Vec::new(),
            is_anonymous: false,
            span: name_span,
        }
    }

    #[must_use]
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: Name,
    pub name_span: Span,
    pub modifiers: ModifierList,
    pub annotations: Vec<Annotation>,
    pub type_params: Vec<TypeParam>,
    /// `None` for constructors and untyped `def` methods.
    pub return_type: Option<TypeRef>,
    pub params: Vec<Param>,
    pub body: Option<StmtId>,
    pub is_constructor: bool,
}

impl MethodDecl {
    #[must_use]
    pub fn new(name: impl Into<Name>, name_span: Span) -> Self {
        MethodDecl {
            name: name.into(),
            name_span,
            modifiers: ModifierList::default(),
            annotations: Vec::new(),
            type_params: Vec::new(),
            return_type: None,
            params: Vec::new(),
            body: None,
            is_constructor: false,
        }
    }

    #[must_use]
    pub fn constructor(name: impl Into<Name>, name_span: Span) -> Self {
        let mut m = MethodDecl::new(name, name_span);
        m.is_constructor = true;
        m
    }

    /// `void` return, spelled explicitly.
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(&self.return_type, Some(tr) if tr.name == "void" && tr.array_dims == 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: Name,
    pub name_span: Span,
    pub modifiers: ModifierList,
    pub annotations: Vec<Annotation>,
    pub ty: Option<TypeRef>,
    pub initializer: Option<ExprId>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initializer {
    pub is_static: bool,
    pub body: StmtId,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: Name,
    pub bounds: Vec<TypeRef>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Name,
    pub ty: Option<TypeRef>,
    pub default: Option<ExprId>,
    pub span: Span,
}

impl Param {
    #[must_use]
    pub fn untyped(name: impl Into<Name>, span: Span) -> Self {
        Param {
            name: name.into(),
            ty: None,
            default: None,
            span,
        }
    }
}

/// A textual type reference, resolved later against the type environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: Name,
    pub args: Vec<TypeRef>,
    pub array_dims: u8,
    pub span: Span,
}

impl TypeRef {
    #[must_use]
    pub fn simple(name: impl Into<Name>, span: Span) -> Self {
        TypeRef {
            name: name.into(),
            args: Vec::new(),
            array_dims: 0,
            span,
        }
    }

    #[must_use]
    pub fn generic(name: impl Into<Name>, args: Vec<TypeRef>, span: Span) -> Self {
        TypeRef {
            name: name.into(),
            args,
            array_dims: 0,
            span,
        }
    }

    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.array_dims == 0
            && matches!(
                self.name.as_str(),
                "boolean" | "char" | "byte" | "short" | "int" | "long" | "float" | "double"
            )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Default,
}

impl Modifier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Abstract => "abstract",
            Modifier::Native => "native",
            Modifier::Synchronized => "synchronized",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Strictfp => "strictfp",
            Modifier::Default => "default",
        }
    }

    #[must_use]
    pub const fn is_visibility(self) -> bool {
        matches!(self, Modifier::Public | Modifier::Protected | Modifier::Private)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierEntry {
    pub modifier: Modifier,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModifierList {
    pub entries: Vec<ModifierEntry>,
}

impl ModifierList {
    #[must_use]
    pub fn of(entries: &[(Modifier, Span)]) -> Self {
        ModifierList {
            entries: entries
                .iter()
                .map(|&(modifier, span)| ModifierEntry { modifier, span })
                .collect(),
        }
    }

    #[must_use]
    pub fn has(&self, modifier: Modifier) -> bool {
        self.entries.iter().any(|e| e.modifier == modifier)
    }

    #[must_use]
    pub fn span_of(&self, modifier: Modifier) -> Option<Span> {
        self.entries
            .iter()
            .find(|e| e.modifier == modifier)
            .map(|e| e.span)
    }

    /// The explicit visibility modifier, if exactly one class of visibility
    /// keyword is present. Conflicts are the checker's concern.
    #[must_use]
    pub fn visibility(&self) -> Option<Modifier> {
        self.entries
            .iter()
            .map(|e| e.modifier)
            .find(|m| m.is_visibility())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub name: Name,
    pub span: Span,
}

impl Annotation {
    #[must_use]
    pub fn new(name: impl Into<Name>, span: Span) -> Self {
        Annotation {
            name: name.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// Explicit constructor delegation target: `this(...)` or `super(...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtorTarget {
    This,
    Super,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    Block {
        statements: Vec<StmtId>,
    },
    VarDecl {
        name: Name,
        name_span: Span,
        declared: Option<TypeRef>,
        initializer: Option<ExprId>,
    },
    Expr(ExprId),
    If {
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        condition: ExprId,
        body: StmtId,
    },
    For {
        init: Option<StmtId>,
        condition: Option<ExprId>,
        update: Option<ExprId>,
        body: StmtId,
    },
    ForIn {
        name: Name,
        iterable: ExprId,
        body: StmtId,
    },
    Return(Option<ExprId>),
    Break {
        label: Option<Name>,
    },
    Continue {
        label: Option<Name>,
    },
    Labeled {
        label: Name,
        body: StmtId,
    },
    ConstructorCall {
        target: CtorTarget,
        args: Vec<ExprId>,
    },
    Throw(ExprId),
    Nop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLit {
    pub kind: StringKind,
    /// The raw token text, delimiters included.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i32),
    Long(i64),
    /// `G`-suffixed integer; kept textual, magnitude is not analysis-relevant.
    BigInteger(String),
    /// Groovy decimal literals default to `BigDecimal`; kept textual.
    Decimal(String),
    Bool(bool),
    Null,
    Str(StringLit),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapKey {
    Name(Name),
    Expr(ExprId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub key: MapKey,
    pub key_span: Span,
    pub value: ExprId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Elvis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
    BitNot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Literal(Literal),
    /// A `"...${...}..."` interpolated string; `text` is the raw token.
    GString {
        lit: StringLit,
        embedded: Vec<ExprId>,
    },
    List {
        elements: Vec<ExprId>,
    },
    MapLit {
        entries: Vec<MapEntry>,
    },
    /// A `name: value` argument inside a call argument list.
    NamedArg {
        name: Name,
        name_span: Span,
        value: ExprId,
    },
    Range {
        left: ExprId,
        right: ExprId,
        inclusive: bool,
    },
    Closure {
        params: Vec<Param>,
        body: StmtId,
    },
    Call {
        receiver: Option<ExprId>,
        name: Name,
        name_span: Span,
        args: Vec<ExprId>,
    },
    New {
        type_ref: TypeRef,
        args: Vec<ExprId>,
        /// Anonymous class body, when present.
        anonymous: Option<ClassId>,
    },
    /// `expr as T` / `expr as T1, T2` coercion; more than one target means a
    /// trait composition.
    Cast {
        expr: ExprId,
        targets: Vec<TypeRef>,
    },
    Ref(Name),
    FieldAccess {
        receiver: ExprId,
        name: Name,
        name_span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Assign {
        target: ExprId,
        value: ExprId,
    },
    Paren(ExprId),
}
