//! Structural assignability properties over the minimal runtime.

use groove_types::{
    is_assignable, least_upper_bound, MapType, PrimitiveType, Type, TypeEnv, TypeStore,
};
use pretty_assertions::assert_eq;

fn int() -> Type {
    Type::Primitive(PrimitiveType::Int)
}

#[test]
fn assignability_is_reflexive_across_separately_constructed_values() {
    let store = TypeStore::with_minimal_runtime();
    let wk = *store.well_known();

    let samples = [
        Type::class(wk.string, vec![]),
        Type::class(wk.list, vec![Type::class(wk.string, vec![])]),
        Type::tuple(vec![Some(int()), None]),
        Type::Map(MapType::with_string_entries(vec![("a".into(), int())])),
        Type::closure(vec![int()], Type::class(wk.string, vec![])),
        Type::range(Some(int()), Some(int())),
        Type::array(Type::class(wk.string, vec![])),
        int(),
    ];

    for ty in &samples {
        // A structurally identical second construction, not the same value.
        let twin = ty.clone();
        assert!(
            is_assignable(&store, ty, &twin),
            "not reflexive: {ty:?}"
        );
    }
}

#[test]
fn tuple_components_treat_absence_as_wildcard() {
    let store = TypeStore::with_minimal_runtime();
    let wk = *store.well_known();
    let string = Type::class(wk.string, vec![]);

    let open = Type::tuple(vec![Some(int()), None]);
    let concrete = Type::tuple(vec![Some(int()), Some(string.clone())]);
    assert!(is_assignable(&store, &open, &concrete));

    let strings = Type::tuple(vec![Some(string)]);
    let ints = Type::tuple(vec![Some(int())]);
    assert!(!is_assignable(&store, &strings, &ints));
}

#[test]
fn tuple_trailing_extras_are_ignored() {
    let store = TypeStore::with_minimal_runtime();
    let short = Type::tuple(vec![Some(int())]);
    let long = Type::tuple(vec![Some(int()), Some(int()), Some(int())]);
    assert!(is_assignable(&store, &short, &long));
    assert!(is_assignable(&store, &long, &short));
}

#[test]
fn absent_source_component_needs_object_or_absence() {
    let store = TypeStore::with_minimal_runtime();
    let wk = *store.well_known();
    let object = Type::class(wk.object, vec![]);

    let into_object = Type::tuple(vec![Some(object)]);
    let into_int = Type::tuple(vec![Some(int())]);
    let unknown_component = Type::tuple(vec![None]);

    assert!(is_assignable(&store, &into_object, &unknown_component));
    assert!(!is_assignable(&store, &into_int, &unknown_component));
}

#[test]
fn any_map_fits_a_map_typed_slot() {
    let store = TypeStore::with_minimal_runtime();
    let wk = *store.well_known();

    let named = Type::Map(MapType::with_string_entries(vec![(
        "port".into(),
        int(),
    )]));
    let empty = Type::Map(MapType::default());
    assert!(is_assignable(&store, &empty, &named));
    assert!(is_assignable(&store, &named, &empty));

    // Nominal map conformance also holds through the erasure class.
    let map_iface = Type::class(wk.map, vec![]);
    assert!(is_assignable(&store, &map_iface, &named));
}

#[test]
fn map_merge_is_right_biased() {
    let store = TypeStore::with_minimal_runtime();
    let wk = *store.well_known();
    let string = Type::class(wk.string, vec![]);

    let left = MapType::with_string_entries(vec![("a".into(), int())]);
    let right = MapType::with_string_entries(vec![("a".into(), string.clone())]);
    let merged = MapType::merge(&left, &right);
    assert_eq!(merged.value_for("a"), Some(&string));
}

#[test]
fn lub_of_singleton_is_identity_and_empty_is_object() {
    let store = TypeStore::with_minimal_runtime();
    let wk = *store.well_known();
    let string = Type::class(wk.string, vec![]);

    assert_eq!(least_upper_bound(&store, &[string.clone()]), string);
    assert_eq!(
        least_upper_bound(&store, &[]),
        Type::class(wk.object, vec![])
    );
}

#[test]
fn boxing_applies_before_lub() {
    let store = TypeStore::with_minimal_runtime();
    let wk = *store.well_known();
    assert_eq!(
        least_upper_bound(&store, &[int()]),
        Type::class(wk.integer, vec![])
    );
}

#[test]
fn unknown_placeholder_assigns_from_nothing() {
    let store = TypeStore::with_minimal_runtime();
    let wk = *store.well_known();
    let string = Type::class(wk.string, vec![]);

    assert!(!is_assignable(&store, &Type::Unknown, &string));
    assert!(!is_assignable(&store, &string, &Type::Unknown));
    // Reflexivity still holds for the placeholder itself.
    assert!(is_assignable(&store, &Type::Unknown, &Type::Unknown));
}

#[test]
fn null_fits_reference_slots_only() {
    let store = TypeStore::with_minimal_runtime();
    let wk = *store.well_known();
    let string = Type::class(wk.string, vec![]);
    assert!(is_assignable(&store, &string, &Type::Null));
    assert!(!is_assignable(&store, &int(), &Type::Null));
}
