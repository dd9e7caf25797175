//! Lookup answers over a lowered file.

use std::collections::{HashSet, VecDeque};

use groove_syntax::{ExprId, File, TypeRef};
use groove_types::{
    canonicalize_named, erasure_class, substitute, MethodDef, Substitution, Type, TypeEnv,
    TypeStore,
};

use crate::lower::{lower_type_ref, SourceMap, TypeParamScope};
use crate::scopes::{ExprScopes, LocalSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeLookup {
    Found(groove_types::ClassId),
    NotFound,
}

/// A method or constructor position inside a store class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub class: groove_types::ClassId,
    pub is_constructor: bool,
    pub index: usize,
}

impl MethodRef {
    /// Look up the definition this reference points at.
    #[must_use]
    pub fn def<'a>(&self, env: &'a dyn TypeEnv) -> Option<&'a MethodDef> {
        let class = env.class(self.class)?;
        if self.is_constructor {
            class.constructors.get(self.index)
        } else {
            class.methods.get(self.index)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Local(LocalSource),
    Field {
        class: groove_types::ClassId,
        index: usize,
    },
    Methods(Vec<MethodRef>),
    Class(groove_types::ClassId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameResolution {
    Resolved(Resolution),
    Unresolved,
    Ambiguous(Vec<Resolution>),
}

impl NameResolution {
    #[must_use]
    pub fn into_option(self) -> Option<Resolution> {
        match self {
            NameResolution::Resolved(res) => Some(res),
            NameResolution::Unresolved | NameResolution::Ambiguous(_) => None,
        }
    }
}

/// Resolves references against the file's scopes, its lowered classes, and
/// the type environment.
pub struct Resolver<'a> {
    pub file: &'a File,
    pub store: &'a TypeStore,
    pub map: &'a SourceMap,
}

impl Resolver<'_> {
    #[must_use]
    pub fn resolve_type_ref(&self, tr: &TypeRef) -> TypeLookup {
        let scope = TypeParamScope::new();
        match lower_type_ref(self.store, self.map, &scope, tr) {
            Type::Class(ct) => TypeLookup::Found(ct.def),
            _ => TypeLookup::NotFound,
        }
    }

    /// Resolve an unqualified name at an expression: locals first, then the
    /// file's classes by simple name.
    #[must_use]
    pub fn resolve_name(&self, scopes: &ExprScopes, at: ExprId, name: &str) -> NameResolution {
        if let Some(local) = scopes.resolve_local(at, name) {
            return NameResolution::Resolved(Resolution::Local(local));
        }
        if let Some(class) = self.map.local_class(name) {
            return NameResolution::Resolved(Resolution::Class(class));
        }
        tracing::trace!(name, "unqualified name did not resolve");
        NameResolution::Unresolved
    }

    /// Every super-signature a method overrides, with the substitution of
    /// the supertype instantiation it was found through, in supertype-walk
    /// order.
    #[must_use]
    pub fn super_signatures(&self, method: MethodRef) -> Vec<(MethodRef, Substitution)> {
        let env: &dyn TypeEnv = self.store;
        let Some(def) = method.def(env) else {
            return Vec::new();
        };
        if method.is_constructor || def.is_static {
            return Vec::new();
        }
        let name = def.name.clone();
        let key = erased_signature(env, def);

        let mut out: Vec<(MethodRef, Substitution)> = Vec::new();
        let mut queue: VecDeque<(groove_types::ClassId, Substitution)> = VecDeque::new();
        let mut seen: HashSet<groove_types::ClassId> = HashSet::new();
        seen.insert(method.class);
        push_supers(env, method.class, &Substitution::new(), &mut queue);

        while let Some((class_id, subst)) = queue.pop_front() {
            if !seen.insert(class_id) {
                continue;
            }
            let Some(class_def) = env.class(class_id) else {
                continue;
            };
            for (index, candidate) in class_def.methods.iter().enumerate() {
                if candidate.is_static || candidate.name != name {
                    continue;
                }
                if erased_signature(env, candidate) != key {
                    continue;
                }
                out.push((
                    MethodRef {
                        class: class_id,
                        is_constructor: false,
                        index,
                    },
                    subst.clone(),
                ));
            }
            push_supers(env, class_id, &subst, &mut queue);
        }

        out
    }
}

/// Queue the direct supertypes of `class_id`, composing `incoming` into each
/// instantiation's substitution.
fn push_supers(
    env: &dyn TypeEnv,
    class_id: groove_types::ClassId,
    incoming: &Substitution,
    queue: &mut VecDeque<(groove_types::ClassId, Substitution)>,
) {
    let Some(class_def) = env.class(class_id) else {
        return;
    };

    let supers = class_def
        .super_class
        .iter()
        .chain(class_def.interfaces.iter());
    for super_ty in supers {
        let super_ty = canonicalize_named(env, &substitute(super_ty, incoming));
        let Type::Class(ct) = super_ty else {
            continue;
        };
        let Some(super_def) = env.class(ct.def) else {
            continue;
        };
        let mut subst = Substitution::new();
        for (idx, formal) in super_def.type_params.iter().copied().enumerate() {
            subst.insert(formal, ct.args.get(idx).cloned().unwrap_or(Type::Unknown));
        }
        queue.push_back((ct.def, subst));
    }
}

/// The erased parameter signature used for override/duplicate matching.
#[must_use]
pub fn erased_signature(env: &dyn TypeEnv, def: &MethodDef) -> Vec<String> {
    def.params
        .iter()
        .map(|p| erased_text(env, &p.ty))
        .collect()
}

/// Render a type's erasure for signature comparison.
#[must_use]
pub fn erased_text(env: &dyn TypeEnv, ty: &Type) -> String {
    match ty {
        Type::Primitive(p) => p.as_str().to_string(),
        Type::Void => "void".to_string(),
        Type::Array(component) => format!("{}[]", erased_text(env, component)),
        Type::TypeVar(id) => env
            .type_param(*id)
            .and_then(|tp| tp.upper_bounds.first())
            .map(|bound| erased_text(env, bound))
            .unwrap_or_else(|| "java.lang.Object".to_string()),
        Type::Named(name) => match canonicalize_named(env, ty) {
            Type::Class(ct) => class_name(env, ct.def),
            _ => name.to_string(),
        },
        _ => match erasure_class(env, ty) {
            Some(id) => class_name(env, id),
            None => "?".to_string(),
        },
    }
}

fn class_name(env: &dyn TypeEnv, id: groove_types::ClassId) -> String {
    env.class(id)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::lower_file;
    use groove_core::Span;
    use groove_syntax::{ClassDecl, ClassKind as AstClassKind, MethodDecl, Param};
    use pretty_assertions::assert_eq;

    fn span() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn super_signatures_find_overridden_methods() {
        let mut file = File::new("demo");

        let mut base_method = MethodDecl::new("run", span());
        base_method.params = vec![Param::untyped("x", span())];
        let base_method_id = file.alloc_method(base_method);
        let mut base = ClassDecl::new("Base", AstClassKind::Class, span());
        base.methods.push(base_method_id);
        file.add_top_level_class(base);

        let mut sub_method = MethodDecl::new("run", span());
        sub_method.params = vec![Param::untyped("y", span())];
        let sub_method_id = file.alloc_method(sub_method);
        let mut sub = ClassDecl::new("Sub", AstClassKind::Class, span());
        sub.extends = Some(TypeRef::simple("Base", span()));
        sub.methods.push(sub_method_id);
        file.add_top_level_class(sub);

        let mut store = TypeStore::with_minimal_runtime();
        let map = lower_file(&file, &mut store);
        let resolver = Resolver {
            file: &file,
            store: &store,
            map: &map,
        };

        let loc = map.method_loc(sub_method_id).expect("lowered");
        let supers = resolver.super_signatures(MethodRef {
            class: loc.class,
            is_constructor: false,
            index: loc.index,
        });
        assert_eq!(supers.len(), 1);
        let base_id = map.local_class("Base").expect("registered");
        assert_eq!(supers[0].0.class, base_id);
    }

    #[test]
    fn different_arity_is_not_an_override() {
        let mut file = File::new("demo");

        let base_method_id = file.alloc_method(MethodDecl::new("run", span()));
        let mut base = ClassDecl::new("Base", AstClassKind::Class, span());
        base.methods.push(base_method_id);
        file.add_top_level_class(base);

        let mut sub_method = MethodDecl::new("run", span());
        sub_method.params = vec![Param::untyped("x", span())];
        let sub_method_id = file.alloc_method(sub_method);
        let mut sub = ClassDecl::new("Sub", AstClassKind::Class, span());
        sub.extends = Some(TypeRef::simple("Base", span()));
        sub.methods.push(sub_method_id);
        file.add_top_level_class(sub);

        let mut store = TypeStore::with_minimal_runtime();
        let map = lower_file(&file, &mut store);
        let resolver = Resolver {
            file: &file,
            store: &store,
            map: &map,
        };

        let loc = map.method_loc(sub_method_id).expect("lowered");
        let supers = resolver.super_signatures(MethodRef {
            class: loc.class,
            is_constructor: false,
            index: loc.index,
        });
        assert_eq!(supers, vec![]);
    }

    #[test]
    fn resolve_type_ref_prefers_file_classes() {
        let mut file = File::new("demo");
        file.add_top_level_class(ClassDecl::new("String", AstClassKind::Class, span()));

        let mut store = TypeStore::with_minimal_runtime();
        let map = lower_file(&file, &mut store);
        let resolver = Resolver {
            file: &file,
            store: &store,
            map: &map,
        };

        let local = map.local_class("String").expect("registered");
        assert_eq!(
            resolver.resolve_type_ref(&TypeRef::simple("String", span())),
            TypeLookup::Found(local)
        );
    }
}
