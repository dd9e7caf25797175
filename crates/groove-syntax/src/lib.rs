//! Groovy syntax model.
//!
//! A closed, arena-allocated AST (sum type per node kind, exhaustively
//! matched by consumers), the Groovy language-level/feature gate, and
//! literal scanning utilities. The tree is read-only once built: any parser
//! can populate it, and the analysis crates only traverse it.

pub mod ast;
pub mod language_level;
pub mod literals;

pub use crate::ast::{
    Annotation, BinaryOp, ClassDecl, ClassId, ClassKind, CtorTarget, Expr, ExprId, ExprKind,
    FieldDecl, FieldId, File, Initializer, Literal, MapEntry, MapKey, MethodDecl, MethodId,
    Modifier, ModifierEntry, ModifierList, Param, Stmt, StmtId, StmtKind, StringLit, TypeParam,
    TypeRef, UnaryOp,
};
pub use crate::language_level::{FeatureAvailability, GroovyFeature, GroovyLanguageLevel};
pub use crate::literals::{LiteralError, StringKind};
