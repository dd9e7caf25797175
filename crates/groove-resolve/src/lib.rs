//! Name and type resolution over a Groovy file.
//!
//! `lower_file` registers a file's declarations into the type store;
//! `ExprScopes` models lexical scoping per body; `Resolver` answers lookups;
//! `SemanticDb` is the facade contract the diagnostics pass consumes.

mod db;
mod lower;
mod resolver;
mod scopes;

pub use crate::db::{MemberFlags, ResolveCandidate, SemanticDb, SymbolRef};
pub use crate::lower::{lower_file, lower_type_ref, MethodLoc, SourceMap, TypeParamScope};
pub use crate::resolver::{
    erased_signature, erased_text, MethodRef, NameResolution, Resolution, Resolver, TypeLookup,
};
pub use crate::scopes::{ExprScopes, LocalSource, ScopeId, ScopeKind};
