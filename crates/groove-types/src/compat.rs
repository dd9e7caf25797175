//! Assignability, subtyping, least upper bounds, boxing, and erasure.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::store::{ClassId, ClassKind, TypeEnv, TypeVarId};
use crate::text::erasure_class;
use crate::ty::{ClassType, PrimitiveType, Type};

/// A `TypeVarId -> Type` mapping applied to generic declarations.
pub type Substitution = HashMap<TypeVarId, Type>;

/// Apply `subst` recursively.
#[must_use]
pub fn substitute(ty: &Type, subst: &Substitution) -> Type {
    match ty {
        Type::TypeVar(id) => subst.get(id).cloned().unwrap_or_else(|| ty.clone()),
        Type::Class(ct) => Type::class(
            ct.def,
            ct.args.iter().map(|a| substitute(a, subst)).collect(),
        ),
        Type::Closure(c) => Type::closure(
            c.params.iter().map(|p| substitute(p, subst)).collect(),
            substitute(&c.return_type, subst),
        ),
        Type::Map(m) => Type::Map(crate::ty::MapType {
            string_entries: m
                .string_entries
                .iter()
                .map(|(n, t)| (n.clone(), substitute(t, subst)))
                .collect(),
            other_entries: m
                .other_entries
                .iter()
                .map(|(k, v)| (substitute(k, subst), substitute(v, subst)))
                .collect(),
        }),
        Type::Tuple(t) => Type::tuple(
            t.components
                .iter()
                .map(|c| c.as_ref().map(|t| substitute(t, subst)))
                .collect(),
        ),
        Type::Range(r) => Type::range(
            r.left.as_deref().map(|t| substitute(t, subst)),
            r.right.as_deref().map(|t| substitute(t, subst)),
        ),
        Type::Traits(t) => Type::Traits(crate::ty::TraitType {
            base: Box::new(substitute(&t.base, subst)),
            traits: t.traits.iter().map(|t| substitute(t, subst)).collect(),
        }),
        Type::Array(component) => Type::array(substitute(component, subst)),
        Type::Anonymous(_)
        | Type::Primitive(_)
        | Type::Named(_)
        | Type::Void
        | Type::Null
        | Type::Unknown => ty.clone(),
    }
}

/// Resolve a `Named` spelling against the environment, probing the default
/// packages a bare Groovy name sees.
#[must_use]
pub fn canonicalize_named(env: &dyn TypeEnv, ty: &Type) -> Type {
    let Type::Named(name) = ty else {
        return ty.clone();
    };

    if let Some(id) = env.class_id(name) {
        return Type::class(id, vec![]);
    }
    if !name.contains('.') {
        for package in ["java.lang", "java.util", "java.io", "java.net", "groovy.lang", "java.math"] {
            if let Some(id) = env.class_id(&format!("{package}.{name}")) {
                return Type::class(id, vec![]);
            }
        }
    }
    ty.clone()
}

fn wrapper_class(env: &dyn TypeEnv, primitive: PrimitiveType) -> ClassId {
    let wk = env.well_known();
    match primitive {
        PrimitiveType::Boolean => wk.boolean,
        PrimitiveType::Char => wk.character,
        PrimitiveType::Byte => wk.byte,
        PrimitiveType::Short => wk.short,
        PrimitiveType::Int => wk.integer,
        PrimitiveType::Long => wk.long,
        PrimitiveType::Float => wk.float,
        PrimitiveType::Double => wk.double,
    }
}

/// Box a primitive to its wrapper; all other types pass through.
#[must_use]
pub fn boxed(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Primitive(p) => Type::class(wrapper_class(env, *p), vec![]),
        _ => ty.clone(),
    }
}

/// The primitive counterpart of a wrapper type, if it has one.
#[must_use]
pub fn unbox(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    let ty = canonicalize_named(env, ty);
    let Type::Class(ClassType { def, .. }) = ty else {
        return match ty {
            Type::Primitive(p) => Some(p),
            _ => None,
        };
    };
    let wk = env.well_known();
    Some(if def == wk.boolean {
        PrimitiveType::Boolean
    } else if def == wk.character {
        PrimitiveType::Char
    } else if def == wk.byte {
        PrimitiveType::Byte
    } else if def == wk.short {
        PrimitiveType::Short
    } else if def == wk.integer {
        PrimitiveType::Int
    } else if def == wk.long {
        PrimitiveType::Long
    } else if def == wk.float {
        PrimitiveType::Float
    } else if def == wk.double {
        PrimitiveType::Double
    } else {
        return None;
    })
}

/// Erase generic arguments, yielding the raw nominal type.
#[must_use]
pub fn raw_type(ty: &Type) -> Type {
    match ty {
        Type::Class(ct) => Type::class(ct.def, vec![]),
        _ => ty.clone(),
    }
}

/// A type is valid iff every symbol reference and every nested component it
/// depends on is valid. Recomputed on demand; never cached across
/// invalidation.
#[must_use]
pub fn is_valid(env: &dyn TypeEnv, ty: &Type) -> bool {
    match ty {
        Type::Class(ct) => {
            env.class(ct.def).is_some() && ct.args.iter().all(|a| is_valid(env, a))
        }
        Type::Closure(c) => {
            c.params.iter().all(|p| is_valid(env, p)) && is_valid(env, &c.return_type)
        }
        Type::Map(m) => {
            m.string_entries.iter().all(|(_, t)| is_valid(env, t))
                && m.other_entries
                    .iter()
                    .all(|(k, v)| is_valid(env, k) && is_valid(env, v))
        }
        Type::Tuple(t) => t
            .components
            .iter()
            .flatten()
            .all(|c| is_valid(env, c)),
        Type::Range(r) => {
            r.left.as_deref().map_or(true, |t| is_valid(env, t))
                && r.right.as_deref().map_or(true, |t| is_valid(env, t))
        }
        Type::Traits(t) => {
            is_valid(env, &t.base) && t.traits.iter().all(|t| is_valid(env, t))
        }
        Type::Array(component) => is_valid(env, component),
        Type::Anonymous(a) => env.class(a.class).is_some(),
        Type::TypeVar(id) => env.type_param(*id).is_some(),
        Type::Primitive(_) | Type::Named(_) | Type::Void | Type::Null | Type::Unknown => true,
    }
}

/// Walk `sub`'s supertype graph looking for an instantiation of `target`,
/// applying type-argument substitution along the way. Returns the argument
/// list at `target` plus whether rawness was encountered on the path.
fn find_as_supertype(
    env: &dyn TypeEnv,
    sub: &ClassType,
    target: ClassId,
) -> Option<(Vec<Type>, bool)> {
    let mut queue: VecDeque<(ClassId, Vec<Type>, bool)> = VecDeque::new();
    let mut seen: HashSet<(ClassId, Vec<Type>)> = HashSet::new();
    queue.push_back((sub.def, sub.args.clone(), false));

    // The seen-set alone does not bound hierarchies whose instantiations
    // keep growing (`A<T> extends A<List<T>>`); cap the walk outright.
    let mut budget = 256usize;

    while let Some((def, args, raw_path)) = queue.pop_front() {
        budget = budget.checked_sub(1)?;
        if !seen.insert((def, args.clone())) {
            continue;
        }

        let Some(class_def) = env.class(def) else {
            continue;
        };

        let raw_here = args.is_empty() && !class_def.type_params.is_empty();
        let raw_path = raw_path || raw_here;

        if def == target {
            return Some((args, raw_path));
        }

        if raw_here {
            if let Some(sc) = &class_def.super_class {
                if let Type::Class(ct) = canonicalize_named(env, sc) {
                    queue.push_back((ct.def, vec![], true));
                }
            }
            for iface in &class_def.interfaces {
                if let Type::Class(ct) = canonicalize_named(env, iface) {
                    queue.push_back((ct.def, vec![], true));
                }
            }
        } else {
            let mut subst: Substitution = HashMap::with_capacity(class_def.type_params.len());
            for (idx, formal) in class_def.type_params.iter().copied().enumerate() {
                subst.insert(formal, args.get(idx).cloned().unwrap_or(Type::Unknown));
            }

            if let Some(sc) = &class_def.super_class {
                if let Type::Class(ct) = canonicalize_named(env, &substitute(sc, &subst)) {
                    queue.push_back((ct.def, ct.args, raw_path));
                }
            }
            for iface in &class_def.interfaces {
                if let Type::Class(ct) = canonicalize_named(env, &substitute(iface, &subst)) {
                    queue.push_back((ct.def, ct.args, raw_path));
                }
            }
        }

        // Interfaces and traits implicitly sit under Object.
        if matches!(class_def.kind, ClassKind::Interface | ClassKind::Trait) {
            queue.push_back((env.well_known().object, vec![], raw_path));
        }
    }

    None
}

/// Nominal subtyping with invariant generics.
#[must_use]
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    let sub = canonicalize_named(env, sub);
    let sup = canonicalize_named(env, sup);

    if sub == sup {
        return true;
    }

    match &sup {
        // Arrays are covariant in their component, as on the JVM.
        Type::Array(sup_component) => match &sub {
            Type::Array(sub_component) => is_subtype(env, sub_component, sup_component),
            Type::Null => true,
            _ => false,
        },
        Type::Class(sup_ct) => {
            match &sub {
                Type::Null => true,
                Type::Array(_) => sup_ct.def == env.well_known().object,
                Type::Class(sub_ct) => {
                    let Some((found_args, raw_path)) = find_as_supertype(env, sub_ct, sup_ct.def)
                    else {
                        return false;
                    };
                    // Raw on either side waives the invariant-argument check.
                    if sup_ct.args.is_empty() || raw_path || found_args.is_empty() {
                        return true;
                    }
                    found_args == sup_ct.args
                }
                Type::TypeVar(id) => env
                    .type_param(*id)
                    .is_some_and(|tp| tp.upper_bounds.iter().any(|b| is_subtype(env, b, &sup))),
                Type::Primitive(_) => is_subtype(env, &boxed(env, &sub), &sup),
                Type::Traits(t) => {
                    is_subtype(env, &t.base, &sup)
                        || t.traits.iter().any(|t| is_subtype(env, t, &sup))
                }
                Type::Map(_) | Type::Tuple(_) | Type::Closure(_) | Type::Range(_)
                | Type::Anonymous(_) => {
                    let Some(er) = erasure_class(env, &sub) else {
                        return false;
                    };
                    is_subtype(env, &Type::class(er, vec![]), &sup)
                }
                _ => false,
            }
        }
        Type::Traits(sup_t) => {
            is_subtype(env, &sub, &sup_t.base)
                && sup_t.traits.iter().all(|t| is_subtype(env, &sub, t))
        }
        _ => false,
    }
}

const fn primitive_widens(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    match from {
        Boolean => matches!(to, Boolean),
        Byte => matches!(to, Byte | Short | Int | Long | Float | Double),
        Short => matches!(to, Short | Int | Long | Float | Double),
        Char => matches!(to, Char | Int | Long | Float | Double),
        Int => matches!(to, Int | Long | Float | Double),
        Long => matches!(to, Long | Float | Double),
        Float => matches!(to, Float | Double),
        Double => matches!(to, Double),
    }
}

/// Structural assignability: can a value of `source` be assigned into a slot
/// of type `target`?
#[must_use]
pub fn is_assignable(env: &dyn TypeEnv, target: &Type, source: &Type) -> bool {
    let target = canonicalize_named(env, target);
    let source = canonicalize_named(env, source);

    // Reflexive for structurally equal values, even separately constructed.
    if target == source {
        return true;
    }

    // The placeholder participates in nothing meaningfully.
    if target.is_unknown() || source.is_unknown() {
        return false;
    }

    match (&target, &source) {
        (Type::Primitive(tp), _) => match &source {
            Type::Primitive(sp) => primitive_widens(*sp, *tp),
            _ => unbox(env, &source).is_some_and(|sp| primitive_widens(sp, *tp)),
        },
        (_, Type::Null) => !matches!(target, Type::Void),
        // Maps are always structurally compatible with map-typed targets at
        // this layer.
        (Type::Map(_), Type::Map(_)) => true,
        (Type::Tuple(tt), Type::Tuple(st)) => {
            let object = env.well_known().object;
            let len = tt.components.len().min(st.components.len());
            (0..len).all(|i| match (&tt.components[i], &st.components[i]) {
                (None, _) => true,
                (Some(t), None) => matches!(t, Type::Class(ct) if ct.def == object),
                (Some(t), Some(s)) => is_assignable(env, t, s),
            })
        }
        (Type::Closure(tc), Type::Closure(sc)) => {
            let arity = tc.params.len().min(sc.params.len());
            is_assignable(env, &tc.return_type, &sc.return_type)
                && (0..arity).all(|i| is_assignable(env, &sc.params[i], &tc.params[i]))
        }
        (_, Type::Primitive(_)) => is_assignable(env, &target, &boxed(env, &source)),
        _ => is_subtype(env, &source, &target),
    }
}

/// All supertype class ids of `def`, most specific first.
fn supertype_ids(env: &dyn TypeEnv, def: ClassId) -> Vec<ClassId> {
    let mut out = Vec::new();
    let mut seen: HashSet<ClassId> = HashSet::new();
    let mut queue: VecDeque<ClassId> = VecDeque::new();
    queue.push_back(def);

    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        out.push(id);
        let Some(class_def) = env.class(id) else {
            continue;
        };
        if let Some(sc) = &class_def.super_class {
            if let Type::Class(ct) = canonicalize_named(env, sc) {
                queue.push_back(ct.def);
            }
        }
        for iface in &class_def.interfaces {
            if let Type::Class(ct) = canonicalize_named(env, iface) {
                queue.push_back(ct.def);
            }
        }
        if matches!(class_def.kind, ClassKind::Interface | ClassKind::Trait) {
            queue.push_back(env.well_known().object);
        }
    }

    out
}

fn lub_pair(env: &dyn TypeEnv, a: &Type, b: &Type) -> Type {
    if a == b {
        return a.clone();
    }
    // LUB against "untyped" yields the other operand unchanged.
    if matches!(a, Type::Unknown | Type::Null) {
        return b.clone();
    }
    if matches!(b, Type::Unknown | Type::Null) {
        return a.clone();
    }

    if is_assignable(env, a, b) {
        return a.clone();
    }
    if is_assignable(env, b, a) {
        return b.clone();
    }

    // Nearest common raw supertype; Object only as the floor.
    let object = env.well_known().object;
    let (Some(a_er), Some(b_er)) = (erasure_class(env, a), erasure_class(env, b)) else {
        return Type::class(object, vec![]);
    };
    let a_supers: HashSet<ClassId> = supertype_ids(env, a_er).into_iter().collect();
    for candidate in supertype_ids(env, b_er) {
        if candidate != object && a_supers.contains(&candidate) {
            return Type::class(candidate, vec![]);
        }
    }
    Type::class(object, vec![])
}

/// Least upper bound over a set of types. Primitives are boxed before
/// participating; the empty input yields `Object`.
#[must_use]
pub fn least_upper_bound(env: &dyn TypeEnv, types: &[Type]) -> Type {
    let mut acc: Option<Type> = None;
    for ty in types {
        let ty = boxed(env, ty);
        acc = Some(match acc {
            None => ty,
            Some(prev) => lub_pair(env, &prev, &ty),
        });
    }
    acc.unwrap_or_else(|| Type::class(env.well_known().object, vec![]))
}
