//! The bundled `SemanticDb` implementation over one lowered file.

use groove_core::{MemoMap, RecursionGuard};
use groove_syntax::{ExprId, ExprKind, File, StmtKind};
use groove_types::{Substitution, Type, TypeEnv, TypeStore, Visibility};

use groove_resolve::{
    lower_file, ExprScopes, LocalSource, MemberFlags, MethodRef, NameResolution, ResolveCandidate,
    Resolver, SemanticDb, SourceMap, SymbolRef,
};

use crate::flow::{FlowCtx, LocalTyping};

/// Everything the diagnostics pass needs about one file: the lowered store,
/// the scopes, and the flow caches. Caches are per-analysis; `clear_caches`
/// is the invalidation hook for the tree owner.
pub struct FileDb<'a> {
    file: &'a File,
    store: TypeStore,
    map: SourceMap,
    scopes: ExprScopes,
    expr_memo: MemoMap<ExprId, Type>,
    expr_guard: RecursionGuard<ExprId>,
    local_memo: MemoMap<LocalSource, LocalTyping>,
    local_guard: RecursionGuard<LocalSource>,
}

impl<'a> FileDb<'a> {
    #[must_use]
    pub fn new(file: &'a File) -> Self {
        Self::with_store(file, TypeStore::with_minimal_runtime())
    }

    #[must_use]
    pub fn with_store(file: &'a File, mut store: TypeStore) -> Self {
        let map = lower_file(file, &mut store);
        let scopes = ExprScopes::build(file);
        FileDb {
            file,
            store,
            map,
            scopes,
            expr_memo: MemoMap::new(),
            expr_guard: RecursionGuard::new(),
            local_memo: MemoMap::new(),
            local_guard: RecursionGuard::new(),
        }
    }

    #[must_use]
    pub fn file(&self) -> &'a File {
        self.file
    }

    #[must_use]
    pub fn store(&self) -> &TypeStore {
        &self.store
    }

    #[must_use]
    pub fn scopes(&self) -> &ExprScopes {
        &self.scopes
    }

    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver {
            file: self.file,
            store: &self.store,
            map: &self.map,
        }
    }

    fn ctx(&self) -> FlowCtx<'_> {
        FlowCtx {
            file: self.file,
            store: &self.store,
            map: &self.map,
            scopes: &self.scopes,
            expr_memo: &self.expr_memo,
            expr_guard: &self.expr_guard,
            local_memo: &self.local_memo,
            local_guard: &self.local_guard,
        }
    }

    /// Whether a nested closure after the declaration references the local's
    /// name, forcing the widened union type for reads.
    #[must_use]
    pub fn is_reassigned(&self, local: LocalSource) -> bool {
        self.ctx().local_typing(local).reassigned
    }

    /// The widened union type of a local.
    #[must_use]
    pub fn widened_type(&self, local: LocalSource) -> Option<Type> {
        self.ctx().local_typing(local).widened
    }

    /// Drop every memoized result. The external tree owner calls this when
    /// the underlying tree changes structurally.
    pub fn clear_caches(&self) {
        self.expr_memo.clear();
        self.local_memo.clear();
    }
}

impl SemanticDb for FileDb<'_> {
    fn type_env(&self) -> &dyn TypeEnv {
        &self.store
    }

    fn source_map(&self) -> &SourceMap {
        &self.map
    }

    fn resolve_reference(&self, expr: ExprId) -> Vec<ResolveCandidate> {
        let name = match &self.file.expr(expr).kind {
            ExprKind::Ref(name) => name.clone(),
            ExprKind::Call {
                receiver: None,
                name,
                ..
            } => name.clone(),
            _ => return Vec::new(),
        };
        match self.resolver().resolve_name(&self.scopes, expr, &name) {
            NameResolution::Resolved(resolution) => vec![ResolveCandidate::plain(resolution)],
            NameResolution::Ambiguous(candidates) => candidates
                .into_iter()
                .map(ResolveCandidate::plain)
                .collect(),
            NameResolution::Unresolved => Vec::new(),
        }
    }

    fn declared_type(&self, symbol: &SymbolRef) -> Option<Type> {
        match symbol {
            SymbolRef::Class(id) => Some(Type::class(*id, vec![])),
            SymbolRef::Method(method) => {
                method.def(&self.store).map(|def| def.return_type.clone())
            }
            SymbolRef::Field { class, index } => self
                .store
                .class(*class)
                .and_then(|def| def.fields.get(*index))
                .map(|field| field.ty.clone()),
            SymbolRef::Local(local) => self.ctx().declared_local_type(*local),
        }
    }

    fn modifiers(&self, symbol: &SymbolRef) -> Option<MemberFlags> {
        match symbol {
            SymbolRef::Class(id) => {
                let def = self.store.class(*id)?;
                Some(MemberFlags {
                    visibility: def.visibility,
                    is_static: false,
                    is_final: def.is_final,
                    is_abstract: def.is_abstract,
                })
            }
            SymbolRef::Method(method) => {
                let def = method.def(&self.store)?;
                Some(MemberFlags {
                    visibility: def.visibility,
                    is_static: def.is_static,
                    is_final: def.is_final,
                    is_abstract: def.is_abstract,
                })
            }
            SymbolRef::Field { class, index } => {
                let def = self.store.class(*class)?.fields.get(*index)?;
                Some(MemberFlags {
                    visibility: def.visibility,
                    is_static: def.is_static,
                    is_final: def.is_final,
                    is_abstract: false,
                })
            }
            SymbolRef::Local(_) => Some(MemberFlags {
                visibility: Visibility::Private,
                is_static: false,
                is_final: false,
                is_abstract: false,
            }),
        }
    }

    fn containing_class(&self, symbol: &SymbolRef) -> Option<groove_types::ClassId> {
        match symbol {
            SymbolRef::Method(method) => Some(method.class),
            SymbolRef::Field { class, .. } => Some(*class),
            SymbolRef::Class(_) | SymbolRef::Local(_) => None,
        }
    }

    fn super_signatures(&self, method: MethodRef) -> Vec<(MethodRef, Substitution)> {
        self.resolver().super_signatures(method)
    }

    fn initializer_type_at(&self, write: ExprId) -> Option<Type> {
        let ctx = self.ctx();
        let ty = match &self.file.expr(write).kind {
            // The write node is an assignment: observe its right-hand side.
            ExprKind::Assign { value, .. } => ctx.expr_type(*value),
            // Otherwise the node already is the right-hand side.
            _ => ctx.expr_type(write),
        };
        if ty.is_unknown() {
            None
        } else {
            Some(ty)
        }
    }

    fn expr_type(&self, expr: ExprId) -> Option<Type> {
        let ty = self.ctx().expr_type(expr);
        if ty.is_unknown() {
            None
        } else {
            Some(ty)
        }
    }
}

/// Convenience used by tests and hosts: the `LocalSource` of a `VarDecl`
/// statement.
#[must_use]
pub fn local_of_var_decl(file: &File, stmt: groove_syntax::StmtId) -> Option<LocalSource> {
    match &file.stmt(stmt).kind {
        StmtKind::VarDecl { .. } => Some(LocalSource::Var(stmt)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_core::Span;
    use groove_syntax::{ExprKind, Literal, Param, StmtKind, StringKind, StringLit};
    use groove_types::PrimitiveType;
    use pretty_assertions::assert_eq;

    fn str_lit(file: &mut File, text: &str, span: Span) -> ExprId {
        file.alloc_expr(
            ExprKind::Literal(Literal::Str(StringLit {
                kind: StringKind::Single,
                text: format!("'{text}'"),
            })),
            span,
        )
    }

    /// Builds:
    /// ```groovy
    /// def x = 1
    /// def c = { x }
    /// x = 'shifted'
    /// ```
    fn reassigned_script() -> (File, groove_syntax::StmtId) {
        let mut file = File::new("script");
        let one = file.alloc_expr(ExprKind::Literal(Literal::Int(1)), Span::new(8, 9));
        let decl = file.alloc_stmt(
            StmtKind::VarDecl {
                name: "x".into(),
                name_span: Span::new(4, 5),
                declared: None,
                initializer: Some(one),
            },
            Span::new(0, 9),
        );

        let read = file.alloc_expr(ExprKind::Ref("x".into()), Span::new(20, 21));
        let read_stmt = file.alloc_stmt(StmtKind::Expr(read), Span::new(20, 21));
        let closure_body = file.alloc_stmt(
            StmtKind::Block {
                statements: vec![read_stmt],
            },
            Span::new(18, 23),
        );
        let closure = file.alloc_expr(
            ExprKind::Closure {
                params: vec![],
                body: closure_body,
            },
            Span::new(18, 23),
        );
        let closure_decl = file.alloc_stmt(
            StmtKind::VarDecl {
                name: "c".into(),
                name_span: Span::new(14, 15),
                declared: None,
                initializer: Some(closure),
            },
            Span::new(10, 23),
        );

        let target = file.alloc_expr(ExprKind::Ref("x".into()), Span::new(24, 25));
        let value = str_lit(&mut file, "shifted", Span::new(28, 37));
        let assign = file.alloc_expr(ExprKind::Assign { target, value }, Span::new(24, 37));
        let assign_stmt = file.alloc_stmt(StmtKind::Expr(assign), Span::new(24, 37));

        file.push_script_stmt(decl);
        file.push_script_stmt(closure_decl);
        file.push_script_stmt(assign_stmt);
        (file, decl)
    }

    #[test]
    fn closure_capture_marks_local_reassigned() {
        let (file, decl) = reassigned_script();
        let db = FileDb::new(&file);
        let local = local_of_var_decl(&file, decl).expect("var decl");
        assert!(db.is_reassigned(local));
    }

    #[test]
    fn widened_type_unions_initializer_and_writes() {
        let (file, decl) = reassigned_script();
        let db = FileDb::new(&file);
        let local = local_of_var_decl(&file, decl).expect("var decl");
        // LUB(Integer, String) in the minimal runtime meets at Comparable.
        let widened = db.widened_type(local).expect("contributions exist");
        let name = groove_types::canonical_text(db.store(), &widened);
        assert_eq!(name, "java.lang.Comparable");
    }

    #[test]
    fn uncaptured_local_is_not_reassigned() {
        let mut file = File::new("script");
        let one = file.alloc_expr(ExprKind::Literal(Literal::Int(1)), Span::new(8, 9));
        let decl = file.alloc_stmt(
            StmtKind::VarDecl {
                name: "y".into(),
                name_span: Span::new(4, 5),
                declared: None,
                initializer: Some(one),
            },
            Span::new(0, 9),
        );
        file.push_script_stmt(decl);

        let db = FileDb::new(&file);
        let local = local_of_var_decl(&file, decl).expect("var decl");
        assert!(!db.is_reassigned(local));
    }

    #[test]
    fn list_literals_type_as_tuples() {
        let mut file = File::new("script");
        let one = file.alloc_expr(ExprKind::Literal(Literal::Int(1)), Span::new(1, 2));
        let s = str_lit(&mut file, "a", Span::new(4, 7));
        let list = file.alloc_expr(
            ExprKind::List {
                elements: vec![one, s],
            },
            Span::new(0, 8),
        );
        let stmt = file.alloc_stmt(StmtKind::Expr(list), Span::new(0, 8));
        file.push_script_stmt(stmt);

        let db = FileDb::new(&file);
        let ty = SemanticDb::expr_type(&db, list).expect("typed");
        let Type::Tuple(tuple) = ty else {
            panic!("expected a tuple type, got {ty:?}");
        };
        assert_eq!(
            tuple.components[0],
            Some(Type::Primitive(PrimitiveType::Int))
        );
        let string = Type::class(db.store().well_known().string, vec![]);
        assert_eq!(tuple.components[1], Some(string));
    }

    #[test]
    fn closure_expressions_infer_return_types() {
        let mut file = File::new("script");
        let value = file.alloc_expr(ExprKind::Literal(Literal::Int(42)), Span::new(2, 4));
        let value_stmt = file.alloc_stmt(StmtKind::Expr(value), Span::new(2, 4));
        let body = file.alloc_stmt(
            StmtKind::Block {
                statements: vec![value_stmt],
            },
            Span::new(0, 6),
        );
        let closure = file.alloc_expr(
            ExprKind::Closure {
                params: vec![Param::untyped("it", Span::new(1, 3))],
                body,
            },
            Span::new(0, 6),
        );
        let stmt = file.alloc_stmt(StmtKind::Expr(closure), Span::new(0, 6));
        file.push_script_stmt(stmt);

        let db = FileDb::new(&file);
        let ty = SemanticDb::expr_type(&db, closure).expect("typed");
        let Type::Closure(c) = ty else {
            panic!("expected a closure type, got {ty:?}");
        };
        assert_eq!(*c.return_type, Type::Primitive(PrimitiveType::Int));
    }
}
