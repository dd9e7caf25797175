//! The Groovy type model and compatibility engine.
//!
//! One [`Type`] sum type covers nominal class types, structural literal types
//! (maps, tuples, ranges, closures), trait compositions, and anonymous
//! classes. The shared behaviors (canonical text, assignability, least upper
//! bound, erasure) are free functions over a [`TypeEnv`].

mod compat;
mod store;
mod text;
mod traits;
mod ty;

pub use crate::compat::{
    boxed, canonicalize_named, is_assignable, is_subtype, is_valid, least_upper_bound, raw_type,
    substitute, unbox, Substitution,
};
pub use crate::store::{
    ClassDef, ClassId, ClassKind, ClassOrigin, FieldDef, MethodDef, ParamDef, TypeEnv,
    TypeParamDef, TypeStore, TypeVarId, Visibility, WellKnown,
};
pub use crate::text::{
    canonical_text, erasure_class, java_class_name, presentable_text, type_arguments,
};
pub use crate::traits::{compose_traits, compose_traits_cached, TraitCache, TraitSynthesis};
pub use crate::ty::{
    anonymous_simple_class_type, range_iteration_type, AnonymousType, ClassType, ClosureType,
    MapType, PrimitiveType, RangeType, TraitType, TupleType, Type,
};
