//! Erasure and text rendering.
//!
//! `canonical_text` is reconstructible from `(java_class_name,
//! type_arguments)`: generic arguments render `<T1,...,Tn>` when non-empty,
//! zero-argument types render bare.

use crate::compat::{boxed, canonicalize_named, least_upper_bound};
use crate::store::{ClassId, TypeEnv};
use crate::ty::{anonymous_simple_class_type, range_is_integral, range_iteration_type, Type};

/// The class a type erases to, if it nominally refers to one.
#[must_use]
pub fn erasure_class(env: &dyn TypeEnv, ty: &Type) -> Option<ClassId> {
    let wk = env.well_known();
    match ty {
        Type::Class(ct) => Some(ct.def),
        Type::Array(_) => Some(wk.object),
        Type::Closure(_) => Some(wk.closure),
        Type::Map(_) => Some(wk.linked_hash_map),
        Type::Tuple(_) => Some(wk.array_list),
        Type::Range(r) => Some(if range_is_integral(env, r) {
            wk.int_range
        } else {
            wk.object_range
        }),
        Type::Traits(t) => erasure_class(env, &t.base),
        Type::Anonymous(a) => Some(a.class),
        Type::Named(_) => match canonicalize_named(env, ty) {
            Type::Class(ct) => Some(ct.def),
            _ => None,
        },
        Type::TypeVar(id) => env
            .type_param(*id)
            .and_then(|tp| tp.upper_bounds.first())
            .and_then(|bound| erasure_class(env, bound))
            .or(Some(wk.object)),
        Type::Primitive(_) | Type::Void | Type::Null | Type::Unknown => None,
    }
}

/// The qualified name of the class this type erases to.
///
/// An anonymous type reports its declared supertype; when that reference does
/// not resolve, the textual class-name token is used rather than failing.
#[must_use]
pub fn java_class_name(env: &dyn TypeEnv, ty: &Type) -> String {
    match ty {
        Type::Primitive(p) => p.as_str().to_string(),
        Type::Array(component) => format!("{}[]", java_class_name(env, component)),
        Type::Void => "void".to_string(),
        Type::Null => "null".to_string(),
        Type::Unknown => "?".to_string(),
        Type::Named(name) => match canonicalize_named(env, ty) {
            Type::Class(ct) => class_name(env, ct.def),
            _ => name.to_string(),
        },
        Type::TypeVar(id) => env
            .type_param(*id)
            .map(|tp| tp.name.clone())
            .unwrap_or_else(|| "?".to_string()),
        Type::Anonymous(a) => {
            let Some(base) = anonymous_simple_class_type(env, a) else {
                return "?".to_string();
            };
            java_class_name(env, &base)
        }
        _ => match erasure_class(env, ty) {
            Some(id) => class_name(env, id),
            None => "?".to_string(),
        },
    }
}

fn class_name(env: &dyn TypeEnv, id: ClassId) -> String {
    env.class(id)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| "?".to_string())
}

/// The generic arguments a type exposes.
///
/// A closure exposes its inferred return type, boxed, so it can stand in for
/// a functional-interface context; a tuple exposes the least upper bound of
/// its known components; a range exposes its iteration type.
#[must_use]
pub fn type_arguments(env: &dyn TypeEnv, ty: &Type) -> Vec<Type> {
    match ty {
        Type::Class(ct) => ct.args.clone(),
        Type::Closure(c) => vec![boxed(env, &c.return_type)],
        Type::Tuple(t) => {
            let known: Vec<Type> = t.components.iter().flatten().cloned().collect();
            if known.is_empty() {
                vec![]
            } else {
                vec![least_upper_bound(env, &known)]
            }
        }
        Type::Range(r) => vec![range_iteration_type(env, r)],
        _ => vec![],
    }
}

/// Fully qualified rendering.
#[must_use]
pub fn canonical_text(env: &dyn TypeEnv, ty: &Type) -> String {
    render(env, ty, false)
}

/// Simple-name rendering for UI surfaces.
#[must_use]
pub fn presentable_text(env: &dyn TypeEnv, ty: &Type) -> String {
    render(env, ty, true)
}

fn render(env: &dyn TypeEnv, ty: &Type, simple: bool) -> String {
    let base = java_class_name(env, ty);
    let base = if simple {
        base.rsplit('.').next().unwrap_or(&base).to_string()
    } else {
        base
    };

    let args = type_arguments(env, ty);
    if args.is_empty() {
        return base;
    }

    let rendered: Vec<String> = args.iter().map(|a| render(env, a, simple)).collect();
    format!("{base}<{}>", rendered.join(","))
}
