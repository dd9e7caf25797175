//! Class symbol definitions and the in-memory type environment.

use std::collections::HashMap;
use std::fmt;

use groove_core::Name;
use serde::{Deserialize, Serialize};

use crate::ty::Type;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassId(u32);

impl ClassId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        ClassId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId(u32);

impl TypeVarId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        TypeVarId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeVarId({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassKind {
    Class,
    Interface,
    Trait,
    Enum,
    Annotation,
}

/// Where a class definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassOrigin {
    /// Part of the seeded runtime (JDK/GDK subset).
    Runtime,
    /// Lowered from a source file under analysis.
    Source,
    /// Synthesized (script classes, anonymous bodies, trait compositions).
    Synthetic,
}

/// Declaration visibility, ordered from most to least restrictive so that
/// "narrower than" is a plain comparison.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Visibility {
    Private,
    PackagePrivate,
    Protected,
    Public,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::PackagePrivate => "package-private",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    pub upper_bounds: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDef {
    pub name: Name,
    pub ty: Type,
    /// Groovy default-valued parameter; a constructor whose parameters all
    /// have defaults is callable with no arguments.
    pub has_default: bool,
}

impl ParamDef {
    #[must_use]
    pub fn new(name: impl Into<Name>, ty: Type) -> Self {
        ParamDef {
            name: name.into(),
            ty,
            has_default: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<ParamDef>,
    pub return_type: Type,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_varargs: bool,
}

impl MethodDef {
    #[must_use]
    pub fn new(name: impl Into<String>, params: Vec<ParamDef>, return_type: Type) -> Self {
        MethodDef {
            name: name.into(),
            type_params: Vec::new(),
            params,
            return_type,
            visibility: Visibility::Public,
            is_static: false,
            is_abstract: false,
            is_final: false,
            is_varargs: false,
        }
    }

    /// Callable with zero arguments: either no parameters or all defaulted.
    #[must_use]
    pub fn callable_with_no_args(&self) -> bool {
        self.params.iter().all(|p| p.has_default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: Name,
    pub ty: Type,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    /// Qualified name, e.g. `java.util.List`.
    pub name: String,
    pub kind: ClassKind,
    pub origin: ClassOrigin,
    pub visibility: Visibility,
    pub is_final: bool,
    pub is_abstract: bool,
    /// `@Immutable` classes may not declare constructors.
    pub is_immutable: bool,
    /// `@InheritConstructors` waives the accessible-super-constructor rule.
    pub inherit_constructors: bool,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub constructors: Vec<MethodDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        ClassDef {
            name: name.into(),
            kind,
            origin: ClassOrigin::Source,
            visibility: Visibility::Public,
            is_final: false,
            is_abstract: false,
            is_immutable: false,
            inherit_constructors: false,
            type_params: Vec::new(),
            super_class: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// The simple (unqualified) class name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Ids of classes the engine needs to know by heart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellKnown {
    pub object: ClassId,
    pub string: ClassId,
    pub gstring: ClassId,
    pub closure: ClassId,
    pub collection: ClassId,
    pub list: ClassId,
    pub array_list: ClassId,
    pub map: ClassId,
    pub linked_hash_map: ClassId,
    pub range: ClassId,
    pub int_range: ClassId,
    pub object_range: ClassId,
    pub number: ClassId,
    pub boolean: ClassId,
    pub character: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
    pub big_integer: ClassId,
    pub big_decimal: ClassId,
}

/// Read-only access to class and type-parameter definitions.
///
/// The analysis only ever queries; it never constructs symbols through this
/// trait. Queries are synchronous, side-effect-free, and idempotent within
/// one analysis pass.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn class_id(&self, name: &str) -> Option<ClassId>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn well_known(&self) -> &WellKnown;
}

/// The in-memory [`TypeEnv`] implementation.
#[derive(Debug, Clone)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: WellKnown,
}

impl TypeStore {
    /// A store seeded with the minimal JDK/GDK surface the engine relies on:
    /// `java.lang` basics, the collection roots, `groovy.lang.Closure`, and
    /// the range classes.
    #[must_use]
    pub fn with_minimal_runtime() -> Self {
        let mut classes: Vec<ClassDef> = Vec::new();
        let mut by_name: HashMap<String, ClassId> = HashMap::new();

        fn runtime_class(
            classes: &mut Vec<ClassDef>,
            by_name: &mut HashMap<String, ClassId>,
            name: &str,
            kind: ClassKind,
            superclass: Option<ClassId>,
            interfaces: Vec<ClassId>,
        ) -> ClassId {
            let mut def = ClassDef::new(name, kind);
            def.origin = ClassOrigin::Runtime;
            def.super_class = superclass.map(|id| Type::class(id, vec![]));
            def.interfaces = interfaces
                .into_iter()
                .map(|id| Type::class(id, vec![]))
                .collect();
            let id = ClassId::from_raw(classes.len() as u32);
            by_name.insert(def.name.clone(), id);
            classes.push(def);
            id
        }

        let object = runtime_class(
            &mut classes,
            &mut by_name,
            "java.lang.Object",
            ClassKind::Class,
            None,
            vec![],
        );
        let comparable = runtime_class(
            &mut classes,
            &mut by_name,
            "java.lang.Comparable",
            ClassKind::Interface,
            Some(object),
            vec![],
        );
        let string = runtime_class(
            &mut classes,
            &mut by_name,
            "java.lang.String",
            ClassKind::Class,
            Some(object),
            vec![comparable],
        );
        let gstring = runtime_class(
            &mut classes,
            &mut by_name,
            "groovy.lang.GString",
            ClassKind::Class,
            Some(object),
            vec![],
        );
        let number = runtime_class(
            &mut classes,
            &mut by_name,
            "java.lang.Number",
            ClassKind::Class,
            Some(object),
            vec![],
        );

        let mut wrapper = |classes: &mut Vec<ClassDef>,
                           by_name: &mut HashMap<String, ClassId>,
                           name: &str,
                           is_numeric: bool| {
            runtime_class(
                classes,
                by_name,
                name,
                ClassKind::Class,
                Some(if is_numeric { number } else { object }),
                vec![comparable],
            )
        };

        let boolean = wrapper(&mut classes, &mut by_name, "java.lang.Boolean", false);
        let character = wrapper(&mut classes, &mut by_name, "java.lang.Character", false);
        let byte = wrapper(&mut classes, &mut by_name, "java.lang.Byte", true);
        let short = wrapper(&mut classes, &mut by_name, "java.lang.Short", true);
        let integer = wrapper(&mut classes, &mut by_name, "java.lang.Integer", true);
        let long = wrapper(&mut classes, &mut by_name, "java.lang.Long", true);
        let float = wrapper(&mut classes, &mut by_name, "java.lang.Float", true);
        let double = wrapper(&mut classes, &mut by_name, "java.lang.Double", true);
        let big_integer = wrapper(&mut classes, &mut by_name, "java.math.BigInteger", true);
        let big_decimal = wrapper(&mut classes, &mut by_name, "java.math.BigDecimal", true);

        let collection = runtime_class(
            &mut classes,
            &mut by_name,
            "java.util.Collection",
            ClassKind::Interface,
            Some(object),
            vec![],
        );
        let list = runtime_class(
            &mut classes,
            &mut by_name,
            "java.util.List",
            ClassKind::Interface,
            Some(object),
            vec![collection],
        );
        let array_list = runtime_class(
            &mut classes,
            &mut by_name,
            "java.util.ArrayList",
            ClassKind::Class,
            Some(object),
            vec![list],
        );
        let map = runtime_class(
            &mut classes,
            &mut by_name,
            "java.util.Map",
            ClassKind::Interface,
            Some(object),
            vec![],
        );
        let hash_map = runtime_class(
            &mut classes,
            &mut by_name,
            "java.util.HashMap",
            ClassKind::Class,
            Some(object),
            vec![map],
        );
        let linked_hash_map = runtime_class(
            &mut classes,
            &mut by_name,
            "java.util.LinkedHashMap",
            ClassKind::Class,
            Some(hash_map),
            vec![],
        );
        let range = runtime_class(
            &mut classes,
            &mut by_name,
            "groovy.lang.Range",
            ClassKind::Interface,
            Some(object),
            vec![list],
        );
        let int_range = runtime_class(
            &mut classes,
            &mut by_name,
            "groovy.lang.IntRange",
            ClassKind::Class,
            Some(object),
            vec![range],
        );
        let object_range = runtime_class(
            &mut classes,
            &mut by_name,
            "groovy.lang.ObjectRange",
            ClassKind::Class,
            Some(object),
            vec![range],
        );
        let closure = runtime_class(
            &mut classes,
            &mut by_name,
            "groovy.lang.Closure",
            ClassKind::Class,
            Some(object),
            vec![],
        );

        let well_known = WellKnown {
            object,
            string,
            gstring,
            closure,
            collection,
            list,
            array_list,
            map,
            linked_hash_map,
            range,
            int_range,
            object_range,
            number,
            boolean,
            character,
            byte,
            short,
            integer,
            long,
            float,
            double,
            big_integer,
            big_decimal,
        };

        let mut store = TypeStore {
            classes,
            by_name,
            type_params: Vec::new(),
            well_known,
        };

        // Generic shapes of the seeded collection/closure surface.
        let object_ty = Type::class(object, vec![]);
        let generic = [
            (collection, &["E"][..]),
            (list, &["E"][..]),
            (array_list, &["E"][..]),
            (map, &["K", "V"][..]),
            (hash_map, &["K", "V"][..]),
            (linked_hash_map, &["K", "V"][..]),
            (closure, &["V"][..]),
            (comparable, &["T"][..]),
            (range, &["T"][..]),
        ];
        for (id, names) in generic {
            let params: Vec<TypeVarId> = names
                .iter()
                .map(|n| store.add_type_param(*n, vec![object_ty.clone()]))
                .collect();
            if let Some(def) = store.class_mut(id) {
                def.type_params = params;
            }
        }

        // Propagate the element/key parameters through the supertype chain.
        let param_ty = |store: &TypeStore, id: ClassId, idx: usize| {
            store
                .class(id)
                .and_then(|def| def.type_params.get(idx).copied())
                .map(Type::TypeVar)
                .unwrap_or(Type::Unknown)
        };
        let list_elem = param_ty(&store, array_list, 0);
        if let Some(def) = store.class_mut(array_list) {
            def.interfaces = vec![Type::class(list, vec![list_elem])];
        }
        let coll_elem = param_ty(&store, list, 0);
        if let Some(def) = store.class_mut(list) {
            def.interfaces = vec![Type::class(collection, vec![coll_elem])];
        }
        let (k, v) = (param_ty(&store, hash_map, 0), param_ty(&store, hash_map, 1));
        if let Some(def) = store.class_mut(hash_map) {
            def.interfaces = vec![Type::class(map, vec![k, v])];
        }
        let (k, v) = (
            param_ty(&store, linked_hash_map, 0),
            param_ty(&store, linked_hash_map, 1),
        );
        if let Some(def) = store.class_mut(linked_hash_map) {
            def.super_class = Some(Type::class(hash_map, vec![k, v]));
        }

        store
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId::from_raw(self.classes.len() as u32);
        self.by_name.insert(def.name.clone(), id);
        self.classes.push(def);
        id
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.idx())
    }

    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId::from_raw(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
        });
        id
    }

    pub fn type_param_mut(&mut self, id: TypeVarId) -> Option<&mut TypeParamDef> {
        self.type_params.get_mut(id.idx())
    }

    pub fn all_classes(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(i, def)| (ClassId::from_raw(i as u32), def))
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.idx())
    }

    fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.idx())
    }

    fn well_known(&self) -> &WellKnown {
        &self.well_known
    }
}
