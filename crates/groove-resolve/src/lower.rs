//! Lowering of a file's declarations into the type store.
//!
//! Every declared class (plus the synthetic script class and anonymous
//! bodies) becomes a `ClassDef`; the `SourceMap` keeps the id bookkeeping
//! between the AST and the store. Unresolvable type references lower to
//! `Type::Named` spellings, never an error at this layer.

use std::collections::HashMap;

use groove_core::Name;
use groove_syntax::{
    ClassKind as AstClassKind, ExprId, ExprKind, File, MethodId, Modifier, ModifierList, TypeRef,
};
use groove_types::{
    compose_traits, ClassDef, ClassKind, ClassOrigin, FieldDef, MethodDef, ParamDef,
    PrimitiveType, TraitSynthesis, Type, TypeEnv, TypeStore, TypeVarId, Visibility,
};

/// Type-parameter names in scope while lowering a declaration.
pub type TypeParamScope = HashMap<Name, TypeVarId>;

/// Where a lowered method landed in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodLoc {
    pub class: groove_types::ClassId,
    pub is_constructor: bool,
    pub index: usize,
}

/// Bookkeeping between AST ids and store ids for one lowered file.
#[derive(Debug, Default)]
pub struct SourceMap {
    class_to_store: HashMap<groove_syntax::ClassId, groove_types::ClassId>,
    store_to_class: HashMap<groove_types::ClassId, groove_syntax::ClassId>,
    method_to_store: HashMap<MethodId, MethodLoc>,
    by_simple_name: HashMap<Name, groove_types::ClassId>,
    type_param_scopes: HashMap<groove_syntax::ClassId, TypeParamScope>,
    trait_casts: HashMap<ExprId, TraitSynthesis>,
    /// The synthetic class a script file defines, when script statements
    /// exist.
    pub script_class: Option<groove_types::ClassId>,
}

impl SourceMap {
    #[must_use]
    pub fn store_class(&self, class: groove_syntax::ClassId) -> Option<groove_types::ClassId> {
        self.class_to_store.get(&class).copied()
    }

    #[must_use]
    pub fn ast_class(&self, class: groove_types::ClassId) -> Option<groove_syntax::ClassId> {
        self.store_to_class.get(&class).copied()
    }

    #[must_use]
    pub fn method_loc(&self, method: MethodId) -> Option<MethodLoc> {
        self.method_to_store.get(&method).copied()
    }

    #[must_use]
    pub fn local_class(&self, simple_name: &str) -> Option<groove_types::ClassId> {
        self.by_simple_name.get(simple_name).copied()
    }

    /// The memoized trait composition of a multi-target cast expression.
    #[must_use]
    pub fn trait_synthesis(&self, expr: ExprId) -> Option<&TraitSynthesis> {
        self.trait_casts.get(&expr)
    }

    #[must_use]
    pub fn type_param_scope(&self, class: groove_syntax::ClassId) -> Option<&TypeParamScope> {
        self.type_param_scopes.get(&class)
    }
}

fn qualified_name(package: Option<&Name>, name: &str) -> String {
    match package {
        Some(pkg) => format!("{pkg}.{name}"),
        None => name.to_string(),
    }
}

fn visibility_of(modifiers: &ModifierList) -> Visibility {
    match modifiers.visibility() {
        Some(Modifier::Private) => Visibility::Private,
        Some(Modifier::Protected) => Visibility::Protected,
        // Groovy declarations default to public.
        _ => Visibility::Public,
    }
}

fn lower_kind(kind: AstClassKind) -> ClassKind {
    match kind {
        AstClassKind::Class => ClassKind::Class,
        AstClassKind::Interface => ClassKind::Interface,
        AstClassKind::Trait => ClassKind::Trait,
        AstClassKind::Enum => ClassKind::Enum,
        AstClassKind::Annotation => ClassKind::Annotation,
    }
}

/// Lower a textual type reference to a `Type`.
///
/// Resolution order: primitives and `void`, type parameters in scope, the
/// file's own classes by simple name, then the environment by exact name and
/// by default-package probing. Anything else stays a `Named` spelling.
#[must_use]
pub fn lower_type_ref(
    env: &dyn TypeEnv,
    map: &SourceMap,
    tp_scope: &TypeParamScope,
    tr: &TypeRef,
) -> Type {
    let base = lower_type_ref_base(env, map, tp_scope, tr);
    (0..tr.array_dims).fold(base, |ty, _| Type::array(ty))
}

fn lower_type_ref_base(
    env: &dyn TypeEnv,
    map: &SourceMap,
    tp_scope: &TypeParamScope,
    tr: &TypeRef,
) -> Type {
    if let Some(primitive) = PrimitiveType::from_name(&tr.name) {
        return Type::Primitive(primitive);
    }
    if tr.name == "void" {
        return Type::Void;
    }
    if let Some(&var) = tp_scope.get(&tr.name) {
        return Type::TypeVar(var);
    }

    let args: Vec<Type> = tr
        .args
        .iter()
        .map(|arg| lower_type_ref(env, map, tp_scope, arg))
        .collect();

    if let Some(id) = map.local_class(&tr.name) {
        return Type::class(id, args);
    }
    if let Some(id) = env.class_id(&tr.name) {
        return Type::class(id, args);
    }
    if !tr.name.contains('.') {
        for package in ["java.lang", "java.util", "java.io", "java.net", "groovy.lang", "java.math"] {
            if let Some(id) = env.class_id(&format!("{package}.{}", tr.name)) {
                return Type::class(id, args);
            }
        }
    }

    tracing::trace!(name = %tr.name, "type reference did not resolve");
    Type::Named(tr.name.clone())
}

/// Register every class declared in `file` (plus synthetics) into `store`.
pub fn lower_file(file: &File, store: &mut TypeStore) -> SourceMap {
    let mut map = SourceMap::default();
    let package = file.package.clone();

    // Shells first so forward and mutual references resolve.
    let mut anonymous_counter = 0u32;
    for class_id in file.all_classes() {
        let class = file.class(class_id);
        let qualified = if class.is_anonymous {
            anonymous_counter += 1;
            format!(
                "{}${anonymous_counter}",
                qualified_name(package.as_ref(), &file.name)
            )
        } else {
            qualified_name(package.as_ref(), &class.name)
        };

        let mut def = ClassDef::new(qualified, lower_kind(class.kind));
        def.origin = if class.is_anonymous {
            ClassOrigin::Synthetic
        } else {
            ClassOrigin::Source
        };
        def.visibility = visibility_of(&class.modifiers);
        def.is_final = class.modifiers.has(Modifier::Final);
        def.is_abstract = class.modifiers.has(Modifier::Abstract)
            || !matches!(class.kind, AstClassKind::Class | AstClassKind::Enum);
        def.is_immutable = class.has_annotation("Immutable");
        def.inherit_constructors = class.has_annotation("InheritConstructors");

        let store_id = store.add_class(def);
        map.class_to_store.insert(class_id, store_id);
        map.store_to_class.insert(store_id, class_id);
        if !class.is_anonymous {
            map.by_simple_name
                .entry(class.name.clone())
                .or_insert(store_id);
        }
    }

    if !file.script_body().is_empty() {
        let mut def = ClassDef::new(
            qualified_name(package.as_ref(), &file.name),
            ClassKind::Class,
        );
        def.origin = ClassOrigin::Synthetic;
        def.super_class = Some(Type::class(store.well_known().object, vec![]));
        let script_id = store.add_class(def);
        map.script_class = Some(script_id);
        map.by_simple_name
            .entry(file.name.clone())
            .or_insert(script_id);
    }

    // Fill in type parameters, supertypes, and members.
    let object = Type::class(store.well_known().object, vec![]);
    for class_id in file.all_classes() {
        let class = file.class(class_id);
        let store_id = map
            .store_class(class_id)
            .expect("every class was registered above");

        let mut tp_scope = TypeParamScope::new();
        let mut tp_ids = Vec::with_capacity(class.type_params.len());
        for tp in &class.type_params {
            let id = store.add_type_param(tp.name.to_string(), Vec::new());
            tp_scope.insert(tp.name.clone(), id);
            tp_ids.push(id);
        }
        let lowered_bounds: Vec<Vec<Type>> = class
            .type_params
            .iter()
            .map(|tp| {
                tp.bounds
                    .iter()
                    .map(|b| lower_type_ref(&*store, &map, &tp_scope, b))
                    .collect()
            })
            .collect();
        for (&id, bounds) in tp_ids.iter().zip(lowered_bounds) {
            if let Some(param) = store.type_param_mut(id) {
                param.upper_bounds = bounds;
            }
        }

        let super_class = match &class.extends {
            Some(tr) => Some(lower_type_ref(&*store, &map, &tp_scope, tr)),
            None if matches!(class.kind, AstClassKind::Class | AstClassKind::Enum) => {
                Some(object.clone())
            }
            None => None,
        };
        let interfaces: Vec<Type> = class
            .implements
            .iter()
            .map(|tr| lower_type_ref(&*store, &map, &tp_scope, tr))
            .collect();

        let fields: Vec<FieldDef> = class
            .fields
            .iter()
            .map(|&field_id| {
                let field = file.field(field_id);
                FieldDef {
                    name: field.name.clone(),
                    ty: field
                        .ty
                        .as_ref()
                        .map(|tr| lower_type_ref(&*store, &map, &tp_scope, tr))
                        .unwrap_or(Type::Unknown),
                    visibility: visibility_of(&field.modifiers),
                    is_static: field.modifiers.has(Modifier::Static),
                    is_final: field.modifiers.has(Modifier::Final),
                }
            })
            .collect();

        let mut methods: Vec<MethodDef> = Vec::new();
        let mut constructors: Vec<MethodDef> = Vec::new();
        for &method_id in &class.methods {
            let method = file.method(method_id);
            let params: Vec<ParamDef> = method
                .params
                .iter()
                .map(|p| ParamDef {
                    name: p.name.clone(),
                    // Untyped parameters erase to Object.
                    ty: p
                        .ty
                        .as_ref()
                        .map(|tr| lower_type_ref(&*store, &map, &tp_scope, tr))
                        .unwrap_or_else(|| object.clone()),
                    has_default: p.default.is_some(),
                })
                .collect();

            let return_type = if method.is_constructor {
                Type::Void
            } else {
                match &method.return_type {
                    Some(tr) => lower_type_ref(&*store, &map, &tp_scope, tr),
                    // `def` methods type as Object.
                    None => object.clone(),
                }
            };

            let mut def = MethodDef::new(method.name.to_string(), params, return_type);
            def.visibility = visibility_of(&method.modifiers);
            def.is_static = method.modifiers.has(Modifier::Static);
            def.is_final = method.modifiers.has(Modifier::Final);
            def.is_abstract = method.modifiers.has(Modifier::Abstract)
                || (matches!(class.kind, AstClassKind::Interface) && method.body.is_none());

            let loc = if method.is_constructor {
                let loc = MethodLoc {
                    class: store_id,
                    is_constructor: true,
                    index: constructors.len(),
                };
                constructors.push(def);
                loc
            } else {
                let loc = MethodLoc {
                    class: store_id,
                    is_constructor: false,
                    index: methods.len(),
                };
                methods.push(def);
                loc
            };
            map.method_to_store.insert(method_id, loc);
        }

        map.type_param_scopes.insert(class_id, tp_scope);

        let class_def = store
            .class_mut(store_id)
            .expect("registered in the first pass");
        class_def.type_params = tp_ids;
        class_def.super_class = super_class;
        class_def.interfaces = interfaces;
        class_def.fields = fields;
        class_def.methods = methods;
        class_def.constructors = constructors;
    }

    // Synthesize trait compositions for multi-target casts, memoized per
    // originating expression for this analysis.
    let empty_scope = TypeParamScope::new();
    for expr_id in file.all_exprs() {
        let ExprKind::Cast { targets, .. } = &file.expr(expr_id).kind else {
            continue;
        };
        if targets.len() < 2 {
            continue;
        }
        let lowered: Vec<Type> = targets
            .iter()
            .map(|tr| lower_type_ref(&*store, &map, &empty_scope, tr))
            .collect();
        if let Some(synthesis) = compose_traits(store, &lowered[0], &lowered[1..]) {
            map.trait_casts.insert(expr_id, synthesis);
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_core::Span;
    use groove_syntax::{ClassDecl, MethodDecl, Param, TypeParam};
    use pretty_assertions::assert_eq;

    fn span() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn lowers_classes_with_forward_references() {
        let mut file = File::new("pair");
        let mut first = ClassDecl::new("First", AstClassKind::Class, span());
        first.extends = Some(TypeRef::simple("Second", span()));
        file.add_top_level_class(first);
        file.add_top_level_class(ClassDecl::new("Second", AstClassKind::Class, span()));

        let mut store = TypeStore::with_minimal_runtime();
        let map = lower_file(&file, &mut store);

        let first_id = map.local_class("First").expect("registered");
        let second_id = map.local_class("Second").expect("registered");
        let first_def = store.class(first_id).expect("exists");
        assert_eq!(
            first_def.super_class,
            Some(Type::class(second_id, vec![]))
        );
    }

    #[test]
    fn script_statements_imply_a_synthetic_class() {
        let mut file = File::new("build");
        file.package = Some("com.example".into());
        let nop = file.alloc_stmt(groove_syntax::StmtKind::Nop, span());
        file.push_script_stmt(nop);

        let mut store = TypeStore::with_minimal_runtime();
        let map = lower_file(&file, &mut store);

        let script = map.script_class.expect("script class registered");
        let def = store.class(script).expect("exists");
        assert_eq!(def.name, "com.example.build");
        assert_eq!(def.origin, ClassOrigin::Synthetic);
    }

    #[test]
    fn def_members_erase_to_object() {
        let mut file = File::new("demo");
        let mut method = MethodDecl::new("run", span());
        method.params = vec![Param::untyped("x", span())];
        let method_id = file.alloc_method(method);
        let mut class = ClassDecl::new("Demo", AstClassKind::Class, span());
        class.methods.push(method_id);
        file.add_top_level_class(class);

        let mut store = TypeStore::with_minimal_runtime();
        let map = lower_file(&file, &mut store);

        let loc = map.method_loc(method_id).expect("lowered");
        let object = Type::class(store.well_known().object, vec![]);
        let def = &store.class(loc.class).expect("exists").methods[loc.index];
        assert_eq!(def.return_type, object);
        assert_eq!(def.params[0].ty, object);
    }

    #[test]
    fn type_parameters_resolve_within_the_class() {
        let mut file = File::new("demo");
        let mut method = MethodDecl::new("get", span());
        method.return_type = Some(TypeRef::simple("T", span()));
        let method_id = file.alloc_method(method);

        let mut class = ClassDecl::new("Holder", AstClassKind::Class, span());
        class.type_params = vec![TypeParam {
            name: "T".into(),
            bounds: vec![],
            span: span(),
        }];
        class.methods.push(method_id);
        file.add_top_level_class(class);

        let mut store = TypeStore::with_minimal_runtime();
        let map = lower_file(&file, &mut store);

        let loc = map.method_loc(method_id).expect("lowered");
        let def = &store.class(loc.class).expect("exists").methods[loc.index];
        assert!(matches!(def.return_type, Type::TypeVar(_)));
    }
}
