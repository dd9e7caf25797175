//! The semantic-database facade the diagnostics pass consumes.
//!
//! Implementations are expected to be synchronous, side-effect-free, and
//! idempotent within one analysis pass. Every query may answer "don't know"
//! (`None`/empty); the dependent check is then skipped, since a missing
//! resolution is usually a separate, already-reported problem.

use groove_syntax::ExprId;
use groove_types::{Substitution, Type, TypeEnv, Visibility};

use crate::lower::SourceMap;
use crate::resolver::{MethodRef, Resolution};
use crate::scopes::LocalSource;

/// An opaque handle to a declaration the facade can answer questions about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolRef {
    Class(groove_types::ClassId),
    Method(MethodRef),
    Field {
        class: groove_types::ClassId,
        index: usize,
    },
    Local(LocalSource),
}

/// The modifier surface of a symbol, flattened for checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberFlags {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
}

/// One candidate a reference may resolve to, with per-candidate flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveCandidate {
    pub resolution: Resolution,
    pub accessible: bool,
    pub applicable: bool,
    pub static_context_ok: bool,
    pub substitution: Substitution,
}

impl ResolveCandidate {
    #[must_use]
    pub fn plain(resolution: Resolution) -> Self {
        ResolveCandidate {
            resolution,
            accessible: true,
            applicable: true,
            static_context_ok: true,
            substitution: Substitution::new(),
        }
    }
}

/// In-process service contract between the analysis core and its host.
pub trait SemanticDb {
    fn type_env(&self) -> &dyn TypeEnv;

    fn source_map(&self) -> &SourceMap;

    /// Candidate symbols for a reference expression; zero, one, or many.
    fn resolve_reference(&self, expr: ExprId) -> Vec<ResolveCandidate>;

    /// The declared (spelled) type of a symbol, when one exists.
    fn declared_type(&self, symbol: &SymbolRef) -> Option<Type>;

    fn modifiers(&self, symbol: &SymbolRef) -> Option<MemberFlags>;

    fn containing_class(&self, symbol: &SymbolRef) -> Option<groove_types::ClassId>;

    /// Substituted super-signatures of a method, in supertype order.
    fn super_signatures(&self, method: MethodRef) -> Vec<(MethodRef, Substitution)>;

    /// The flow-sensitive type of an assignment's right-hand side as
    /// observed at a specific write site.
    fn initializer_type_at(&self, write: ExprId) -> Option<Type>;

    /// Best-effort type of an expression; `None` when inference gives up.
    fn expr_type(&self, expr: ExprId) -> Option<Type>;
}
