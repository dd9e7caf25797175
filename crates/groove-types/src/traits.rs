//! Trait composition synthesis.
//!
//! `expr as Trait1, Trait2` needs a type usable in static checks as if a
//! synthetic class `class _ extends Base implements Trait1, Trait2` existed.
//! The synthesis mints fresh type-parameter slots for the base's and every
//! trait's parameters (base first, then traits in order) and builds a
//! positional substitution from the original parameters to the actual
//! argument types.

use groove_core::MemoMap;

use crate::compat::{canonicalize_named, Substitution};
use crate::store::{ClassDef, ClassId, ClassKind, ClassOrigin, TypeEnv, TypeStore, TypeVarId};
use crate::ty::Type;

/// The result of composing a base type with traits.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitSynthesis {
    /// The synthetic declaration registered in the store.
    pub class: ClassId,
    /// Original (and fresh) type parameters mapped to the actual argument
    /// types, base first, then each trait in order.
    pub substitution: Substitution,
}

/// Memoizes syntheses per originating expression for the lifetime of one
/// analysis; the tree owner clears it on structural change.
pub type TraitCache = MemoMap<u64, TraitSynthesis>;

/// Synthesize the virtual class for `base as traits`.
///
/// Returns `None` when the base or any trait does not resolve to a class;
/// the dependent check is then skipped.
pub fn compose_traits(
    store: &mut TypeStore,
    base: &Type,
    traits: &[Type],
) -> Option<TraitSynthesis> {
    struct Part {
        def: ClassId,
        args: Vec<Type>,
        params: Vec<TypeVarId>,
    }

    let resolve_part = |store: &TypeStore, ty: &Type| -> Option<Part> {
        let Type::Class(ct) = canonicalize_named(store, ty) else {
            return None;
        };
        let params = store.class(ct.def)?.type_params.clone();
        Some(Part {
            def: ct.def,
            args: ct.args,
            params,
        })
    };

    let base_part = resolve_part(store, base)?;
    let trait_parts: Vec<Part> = traits
        .iter()
        .map(|t| resolve_part(store, t))
        .collect::<Option<Vec<_>>>()?;

    let mut name = String::from("(");
    name.push_str(simple_name(&*store, base_part.def));
    name.push_str(" as ");
    for (idx, part) in trait_parts.iter().enumerate() {
        if idx > 0 {
            name.push_str(", ");
        }
        name.push_str(simple_name(&*store, part.def));
    }
    name.push(')');

    // Mint fresh slots in base-then-traits order, carrying over the original
    // bounds, and accumulate the positional substitution as we go.
    let mut fresh: Vec<TypeVarId> = Vec::new();
    let mut substitution: Substitution = Substitution::new();

    let mut mint = |store: &mut TypeStore, part: &Part| -> Vec<TypeVarId> {
        let mut slice = Vec::with_capacity(part.params.len());
        for (idx, &original) in part.params.iter().enumerate() {
            let (param_name, bounds) = store
                .type_param(original)
                .map(|tp| (tp.name.clone(), tp.upper_bounds.clone()))
                .unwrap_or_else(|| (format!("T{}", fresh.len()), Vec::new()));
            let slot = store.add_type_param(param_name, bounds);
            let actual = part.args.get(idx).cloned().unwrap_or(Type::Unknown);
            substitution.insert(original, actual.clone());
            substitution.insert(slot, actual);
            fresh.push(slot);
            slice.push(slot);
        }
        slice
    };

    let base_slice = mint(store, &base_part);
    let trait_slices: Vec<Vec<TypeVarId>> =
        trait_parts.iter().map(|part| mint(store, part)).collect();

    let mut def = ClassDef::new(name, ClassKind::Class);
    def.origin = ClassOrigin::Synthetic;
    def.type_params = fresh;
    def.super_class = Some(Type::class(
        base_part.def,
        base_slice.into_iter().map(Type::TypeVar).collect(),
    ));
    def.interfaces = trait_parts
        .iter()
        .zip(trait_slices)
        .map(|(part, slice)| {
            Type::class(part.def, slice.into_iter().map(Type::TypeVar).collect())
        })
        .collect();

    let class = store.add_class(def);
    Some(TraitSynthesis {
        class,
        substitution,
    })
}

/// [`compose_traits`] memoized per originating expression node.
pub fn compose_traits_cached(
    store: &mut TypeStore,
    cache: &TraitCache,
    key: u64,
    base: &Type,
    traits: &[Type],
) -> Option<TraitSynthesis> {
    if let Some(hit) = cache.get(&key) {
        return Some(hit);
    }
    let synthesis = compose_traits(store, base, traits)?;
    cache.insert(key, synthesis.clone());
    Some(synthesis)
}

fn simple_name(env: &dyn TypeEnv, id: ClassId) -> &str {
    env.class(id).map(|def| def.simple_name()).unwrap_or("?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn trait_class(store: &mut TypeStore, name: &str, param_names: &[&str]) -> (ClassId, Vec<TypeVarId>) {
        let object = Type::class(store.well_known().object, vec![]);
        let params: Vec<TypeVarId> = param_names
            .iter()
            .map(|n| store.add_type_param(*n, vec![object.clone()]))
            .collect();
        let mut def = ClassDef::new(name, ClassKind::Trait);
        def.type_params = params.clone();
        def.super_class = Some(object);
        let id = store.add_class(def);
        (id, params)
    }

    #[test]
    fn composition_orders_parameters_base_then_traits() {
        let mut store = TypeStore::with_minimal_runtime();
        let wk = *store.well_known();

        let object = Type::class(wk.object, vec![]);
        let base_x = store.add_type_param("X", vec![object.clone()]);
        let mut base_def = ClassDef::new("com.example.Base", ClassKind::Class);
        base_def.type_params = vec![base_x];
        base_def.super_class = Some(object);
        let base = store.add_class(base_def);

        let (trait1, t1_params) = trait_class(&mut store, "com.example.Trait1", &["Y"]);
        let (trait2, t2_params) = trait_class(&mut store, "com.example.Trait2", &["Z", "W"]);

        let string = Type::class(wk.string, vec![]);
        let integer = Type::class(wk.integer, vec![]);
        let list = Type::class(wk.list, vec![]);
        let number = Type::class(wk.number, vec![]);

        let synthesis = compose_traits(
            &mut store,
            &Type::class(base, vec![string.clone()]),
            &[
                Type::class(trait1, vec![integer.clone()]),
                Type::class(trait2, vec![list.clone(), number.clone()]),
            ],
        )
        .expect("all parts resolve");

        let synthetic = store.class(synthesis.class).expect("registered");
        assert_eq!(synthetic.type_params.len(), 4);
        assert_eq!(synthetic.origin, ClassOrigin::Synthetic);

        // Original parameters substitute positionally: X, Y, Z, W.
        assert_eq!(synthesis.substitution.get(&base_x), Some(&string));
        assert_eq!(synthesis.substitution.get(&t1_params[0]), Some(&integer));
        assert_eq!(synthesis.substitution.get(&t2_params[0]), Some(&list));
        assert_eq!(synthesis.substitution.get(&t2_params[1]), Some(&number));

        // The synthetic extends the base and implements both traits over its
        // own fresh parameters.
        let super_class = synthetic.super_class.clone().expect("extends the base");
        let Type::Class(super_ct) = super_class else {
            panic!("nominal supertype expected");
        };
        assert_eq!(super_ct.def, base);
        assert_eq!(super_ct.args, vec![Type::TypeVar(synthetic.type_params[0])]);
        assert_eq!(synthetic.interfaces.len(), 2);
    }

    #[test]
    fn missing_trait_argument_pads_with_unknown() {
        let mut store = TypeStore::with_minimal_runtime();
        let wk = *store.well_known();
        let object = Type::class(wk.object, vec![]);

        let base = store.add_class({
            let mut def = ClassDef::new("com.example.Plain", ClassKind::Class);
            def.super_class = Some(object);
            def
        });
        let (trait1, t1_params) = trait_class(&mut store, "com.example.Keyed", &["K"]);

        let synthesis = compose_traits(
            &mut store,
            &Type::class(base, vec![]),
            &[Type::class(trait1, vec![])],
        )
        .expect("raw instantiation still composes");
        assert_eq!(
            synthesis.substitution.get(&t1_params[0]),
            Some(&Type::Unknown)
        );
    }

    #[test]
    fn composition_is_memoized_per_expression_key() {
        let mut store = TypeStore::with_minimal_runtime();
        let wk = *store.well_known();
        let object = Type::class(wk.object, vec![]);
        let base = store.add_class({
            let mut def = ClassDef::new("com.example.Host", ClassKind::Class);
            def.super_class = Some(object.clone());
            def
        });
        let (trait1, _) = trait_class(&mut store, "com.example.Mix", &[]);

        let cache = TraitCache::new();
        let base_ty = Type::class(base, vec![]);
        let traits = [Type::class(trait1, vec![])];

        let first = compose_traits_cached(&mut store, &cache, 7, &base_ty, &traits)
            .expect("composes");
        let second = compose_traits_cached(&mut store, &cache, 7, &base_ty, &traits)
            .expect("cache hit");
        assert_eq!(first.class, second.class, "same expression reuses the synthesis");

        cache.clear();
        let third = compose_traits_cached(&mut store, &cache, 7, &base_ty, &traits)
            .expect("recomputes after invalidation");
        assert_ne!(first.class, third.class);
    }

    #[test]
    fn unresolvable_base_skips_composition() {
        let mut store = TypeStore::with_minimal_runtime();
        let missing = Type::Named("com.example.Gone".into());
        assert_eq!(compose_traits(&mut store, &missing, &[]), None);
    }
}
