//! The analysis kernel shared by `FileDb`.
//!
//! Expression typing never panics and never errors: where inference gives up
//! it answers `Type::Unknown`, and the dependent check skips. Local-variable
//! typing widens a reassigned variable to the least upper bound of
//! everything written to it.

use groove_core::{MemoMap, RecursionGuard, MAX_TYPE_RECURSION_DEPTH};
use groove_syntax::{
    BinaryOp, ExprId, ExprKind, File, Literal, MapKey, StmtId, StmtKind, UnaryOp,
};
use groove_types::{
    boxed, erasure_class, least_upper_bound, ClassKind, MapType, PrimitiveType, Type, TypeEnv,
    TypeStore,
};

use groove_resolve::{ExprScopes, LocalSource, SourceMap};

/// What the analysis decided about one local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalTyping {
    /// A nested closure after the declaration references the same name.
    pub reassigned: bool,
    /// The union type over declaration, initializer, and every write; `None`
    /// when nothing contributed a usable type.
    pub widened: Option<Type>,
}

impl LocalTyping {
    pub(crate) const UNKNOWN: LocalTyping = LocalTyping {
        reassigned: false,
        widened: None,
    };
}

pub(crate) struct FlowCtx<'a> {
    pub file: &'a File,
    pub store: &'a TypeStore,
    pub map: &'a SourceMap,
    pub scopes: &'a ExprScopes,
    pub expr_memo: &'a MemoMap<ExprId, Type>,
    pub expr_guard: &'a RecursionGuard<ExprId>,
    pub local_memo: &'a MemoMap<LocalSource, LocalTyping>,
    pub local_guard: &'a RecursionGuard<LocalSource>,
}

impl FlowCtx<'_> {
    pub(crate) fn expr_type(&self, expr: ExprId) -> Type {
        if let Some(hit) = self.expr_memo.get(&expr) {
            return hit;
        }
        match self.expr_guard.enter(expr, || self.compute_expr_type(expr)) {
            // Re-entrant request: answer "not yet known" without recursing.
            None => Type::Unknown,
            Some((ty, clean)) => {
                if clean {
                    self.expr_memo.insert(expr, ty.clone());
                }
                ty
            }
        }
    }

    fn compute_expr_type(&self, expr: ExprId) -> Type {
        let env: &dyn TypeEnv = self.store;
        let wk = *env.well_known();

        match &self.file.expr(expr).kind {
            ExprKind::Literal(lit) => match lit {
                Literal::Int(_) => Type::Primitive(PrimitiveType::Int),
                Literal::Long(_) => Type::Primitive(PrimitiveType::Long),
                Literal::BigInteger(_) => Type::class(wk.big_integer, vec![]),
                Literal::Decimal(_) => Type::class(wk.big_decimal, vec![]),
                Literal::Bool(_) => Type::Primitive(PrimitiveType::Boolean),
                Literal::Null => Type::Null,
                Literal::Str(_) => Type::class(wk.string, vec![]),
            },
            ExprKind::GString { .. } => Type::class(wk.gstring, vec![]),
            ExprKind::List { elements } => Type::tuple(
                elements
                    .iter()
                    .map(|&e| {
                        let ty = self.expr_type(e);
                        if ty.is_unknown() {
                            None
                        } else {
                            Some(ty)
                        }
                    })
                    .collect(),
            ),
            ExprKind::MapLit { entries } => {
                let mut map_ty = MapType::default();
                for entry in entries {
                    let value = self.expr_type(entry.value);
                    match &entry.key {
                        MapKey::Name(name) => {
                            map_ty.string_entries.push((name.clone(), value));
                        }
                        MapKey::Expr(key) => {
                            map_ty.other_entries.push((self.expr_type(*key), value));
                        }
                    }
                }
                Type::Map(map_ty)
            }
            ExprKind::NamedArg { value, .. } => self.expr_type(*value),
            ExprKind::Range { left, right, .. } => {
                let lower = self.expr_type(*left);
                let upper = self.expr_type(*right);
                Type::range(
                    (!lower.is_unknown()).then_some(lower),
                    (!upper.is_unknown()).then_some(upper),
                )
            }
            ExprKind::Closure { params, body } => {
                let object = Type::class(wk.object, vec![]);
                let param_types: Vec<Type> = params
                    .iter()
                    .map(|p| {
                        p.ty.as_ref()
                            .map(|tr| self.lower(tr))
                            .unwrap_or_else(|| object.clone())
                    })
                    .collect();
                Type::closure(param_types, self.closure_return_type(*body))
            }
            ExprKind::Call { receiver, name, .. } => match receiver {
                Some(receiver) => {
                    let receiver_ty = self.expr_type(*receiver);
                    self.method_return_type(&receiver_ty, name)
                }
                None => self.unqualified_call_type(expr, name),
            },
            ExprKind::New {
                type_ref,
                anonymous,
                ..
            } => match anonymous {
                Some(class) => match self.map.store_class(*class) {
                    Some(store_id) => {
                        Type::Anonymous(groove_types::AnonymousType { class: store_id })
                    }
                    None => Type::Unknown,
                },
                None => self.lower(type_ref),
            },
            ExprKind::Cast { targets, .. } => match targets.len() {
                0 => Type::Unknown,
                1 => self.lower(&targets[0]),
                _ => {
                    let base = Box::new(self.lower(&targets[0]));
                    let traits = targets[1..].iter().map(|tr| self.lower(tr)).collect();
                    Type::Traits(groove_types::TraitType { base, traits })
                }
            },
            ExprKind::Ref(name) => match self.scopes.resolve_local(expr, name) {
                Some(local) => self.local_type(local),
                None => match self.map.local_class(name) {
                    Some(class) => Type::class(class, vec![]),
                    None => Type::Unknown,
                },
            },
            ExprKind::FieldAccess { receiver, name, .. } => {
                let receiver_ty = self.expr_type(*receiver);
                self.field_type(&receiver_ty, name)
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs_ty = self.expr_type(*lhs);
                let rhs_ty = self.expr_type(*rhs);
                self.binary_type(*op, &lhs_ty, &rhs_ty)
            }
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not => Type::Primitive(PrimitiveType::Boolean),
                UnaryOp::Neg | UnaryOp::BitNot => self.expr_type(*operand),
            },
            ExprKind::Assign { value, .. } => self.expr_type(*value),
            ExprKind::Paren(inner) => self.expr_type(*inner),
        }
    }

    fn lower(&self, tr: &groove_syntax::TypeRef) -> Type {
        groove_resolve::lower_type_ref(
            self.store,
            self.map,
            &groove_resolve::TypeParamScope::new(),
            tr,
        )
    }

    /// The effective type of a read of a local: the widened union when the
    /// variable is reassigned across closures, the declared/initializer type
    /// otherwise.
    fn local_type(&self, local: LocalSource) -> Type {
        let typing = self.local_typing(local);
        if typing.reassigned {
            return typing.widened.unwrap_or(Type::Unknown);
        }

        if let Some(declared) = self.declared_local_type(local) {
            return declared;
        }
        match local {
            LocalSource::Var(stmt) => match &self.file.stmt(stmt).kind {
                StmtKind::VarDecl {
                    initializer: Some(init),
                    ..
                } => self.expr_type(*init),
                _ => Type::Unknown,
            },
            LocalSource::MethodParam { .. } | LocalSource::ClosureParam { .. } => {
                Type::class(self.store.well_known().object, vec![])
            }
            LocalSource::ForIn(_) => Type::Unknown,
        }
    }

    pub(crate) fn declared_local_type(&self, local: LocalSource) -> Option<Type> {
        match local {
            LocalSource::Var(stmt) => match &self.file.stmt(stmt).kind {
                StmtKind::VarDecl {
                    declared: Some(tr), ..
                } => Some(self.lower(tr)),
                _ => None,
            },
            LocalSource::MethodParam { method, index } => {
                let param = self.file.method(method).params.get(index)?;
                param.ty.as_ref().map(|tr| self.lower(tr))
            }
            LocalSource::ClosureParam { closure, index } => {
                match &self.file.expr(closure).kind {
                    ExprKind::Closure { params, .. } => params
                        .get(index)
                        .and_then(|p| p.ty.as_ref())
                        .map(|tr| self.lower(tr)),
                    _ => None,
                }
            }
            LocalSource::ForIn(_) => None,
        }
    }

    pub(crate) fn local_typing(&self, local: LocalSource) -> LocalTyping {
        if let Some(hit) = self.local_memo.get(&local) {
            return hit;
        }
        // Chained local computations (a's type needs b's, b's needs c's, …)
        // cap out rather than running away; the capped result stays uncached
        // so the next pass can retry.
        if self.local_guard.depth() >= MAX_TYPE_RECURSION_DEPTH {
            tracing::debug!(?local, "local typing recursion cap reached; not caching");
            return LocalTyping::UNKNOWN;
        }
        match self
            .local_guard
            .enter(local, || self.compute_local_typing(local))
        {
            // First re-entrant call for the same key: "not yet known".
            None => LocalTyping::UNKNOWN,
            Some((typing, clean)) => {
                if clean {
                    self.local_memo.insert(local, typing.clone());
                }
                typing
            }
        }
    }

    fn compute_local_typing(&self, local: LocalSource) -> LocalTyping {
        let Some((name, decl_pos)) = self.local_name_and_pos(local) else {
            return LocalTyping::UNKNOWN;
        };
        let Some(body) = self.enclosing_body(local) else {
            return LocalTyping::UNKNOWN;
        };

        let mut body_exprs = Vec::new();
        for &stmt in &body {
            self.collect_stmt_exprs(stmt, &mut body_exprs);
        }

        // Capture scan: name-based on purpose. A same-named variable in a
        // sibling closure also trips this; widening stays conservative.
        let mut reassigned = false;
        for &candidate in &body_exprs {
            let expr = self.file.expr(candidate);
            if !matches!(expr.kind, ExprKind::Closure { .. }) || expr.span.start <= decl_pos {
                continue;
            }
            let ExprKind::Closure { body, .. } = &expr.kind else {
                continue;
            };
            let mut closure_exprs = Vec::new();
            self.collect_stmt_exprs(*body, &mut closure_exprs);
            if closure_exprs.iter().any(|&e| {
                matches!(&self.file.expr(e).kind, ExprKind::Ref(n) if *n == name)
            }) {
                reassigned = true;
                break;
            }
        }

        // Widening folds the declared type, the initializer, and every write
        // that resolves to this local.
        let mut contributions: Vec<Type> = Vec::new();
        if let Some(declared) = self.declared_local_type(local) {
            contributions.push(declared);
        }
        if let LocalSource::Var(stmt) = local {
            if let StmtKind::VarDecl {
                initializer: Some(init),
                ..
            } = &self.file.stmt(stmt).kind
            {
                contributions.push(self.expr_type(*init));
            }
        }
        for &candidate in &body_exprs {
            let ExprKind::Assign { target, value } = &self.file.expr(candidate).kind else {
                continue;
            };
            let ExprKind::Ref(target_name) = &self.file.expr(*target).kind else {
                continue;
            };
            if *target_name != name {
                continue;
            }
            if self.scopes.resolve_local(*target, target_name) != Some(local) {
                continue;
            }
            contributions.push(self.expr_type(*value));
        }

        let usable: Vec<Type> = contributions
            .into_iter()
            .filter(|t| !t.is_unknown())
            .map(|t| boxed(self.store, &t))
            .collect();
        let widened = if usable.is_empty() {
            None
        } else {
            Some(least_upper_bound(self.store, &usable))
        };

        LocalTyping {
            reassigned,
            widened,
        }
    }

    fn local_name_and_pos(&self, local: LocalSource) -> Option<(groove_core::Name, usize)> {
        match local {
            LocalSource::Var(stmt) => {
                let data = self.file.stmt(stmt);
                match &data.kind {
                    StmtKind::VarDecl { name, .. } => Some((name.clone(), data.span.start)),
                    _ => None,
                }
            }
            LocalSource::ForIn(stmt) => {
                let data = self.file.stmt(stmt);
                match &data.kind {
                    StmtKind::ForIn { name, .. } => Some((name.clone(), data.span.start)),
                    _ => None,
                }
            }
            LocalSource::MethodParam { method, index } => {
                let param = self.file.method(method).params.get(index)?;
                Some((param.name.clone(), param.span.start))
            }
            LocalSource::ClosureParam { closure, index } => {
                match &self.file.expr(closure).kind {
                    ExprKind::Closure { params, .. } => {
                        let param = params.get(index)?;
                        Some((param.name.clone(), param.span.start))
                    }
                    _ => None,
                }
            }
        }
    }

    /// The statement list of the innermost body (method, closure, or script)
    /// enclosing the local's declaration.
    fn enclosing_body(&self, local: LocalSource) -> Option<Vec<StmtId>> {
        match local {
            LocalSource::Var(stmt) | LocalSource::ForIn(stmt) => self.body_of_stmt(stmt),
            LocalSource::MethodParam { method, .. } => {
                self.file.method(method).body.map(|b| vec![b])
            }
            LocalSource::ClosureParam { closure, .. } => match &self.file.expr(closure).kind {
                ExprKind::Closure { body, .. } => Some(vec![*body]),
                _ => None,
            },
        }
    }

    fn body_of_stmt(&self, target: StmtId) -> Option<Vec<StmtId>> {
        for class_id in self.file.all_classes() {
            let class = self.file.class(class_id);
            for &method_id in &class.methods {
                if let Some(body) = self.file.method(method_id).body {
                    if let Some(found) = self.search_body(body, &[body], target) {
                        return Some(found);
                    }
                }
            }
            for initializer in &class.initializers {
                if let Some(found) =
                    self.search_body(initializer.body, &[initializer.body], target)
                {
                    return Some(found);
                }
            }
        }

        let script: Vec<StmtId> = self.file.script_body().to_vec();
        for &stmt in &script {
            if let Some(found) = self.search_body(stmt, &script, target) {
                return Some(found);
            }
        }
        None
    }

    /// Depth-first search for `target`, tracking the innermost body root:
    /// entering a closure switches the root to the closure's body.
    fn search_body(&self, stmt: StmtId, root: &[StmtId], target: StmtId) -> Option<Vec<StmtId>> {
        if stmt == target {
            return Some(root.to_vec());
        }

        let mut child_stmts: Vec<StmtId> = Vec::new();
        let mut child_exprs: Vec<ExprId> = Vec::new();
        stmt_children(self.file, stmt, &mut child_stmts, &mut child_exprs);

        for child in child_stmts {
            if let Some(found) = self.search_body(child, root, target) {
                return Some(found);
            }
        }
        for expr in child_exprs {
            if let Some(found) = self.search_expr_for_body(expr, root, target) {
                return Some(found);
            }
        }
        None
    }

    fn search_expr_for_body(
        &self,
        expr: ExprId,
        root: &[StmtId],
        target: StmtId,
    ) -> Option<Vec<StmtId>> {
        let mut stmts: Vec<StmtId> = Vec::new();
        let mut exprs: Vec<ExprId> = Vec::new();
        expr_children(self.file, expr, &mut stmts, &mut exprs);

        let closure_body = match &self.file.expr(expr).kind {
            ExprKind::Closure { body, .. } => Some(*body),
            _ => None,
        };

        for child in stmts {
            let inner_root: Vec<StmtId> = match closure_body {
                Some(body) if body == child => vec![body],
                _ => root.to_vec(),
            };
            if let Some(found) = self.search_body(child, &inner_root, target) {
                return Some(found);
            }
        }
        for child in exprs {
            if let Some(found) = self.search_expr_for_body(child, root, target) {
                return Some(found);
            }
        }
        None
    }

    /// Every expression in a statement subtree, closures included.
    pub(crate) fn collect_stmt_exprs(&self, stmt: StmtId, out: &mut Vec<ExprId>) {
        let mut stmts: Vec<StmtId> = Vec::new();
        let mut exprs: Vec<ExprId> = Vec::new();
        stmt_children(self.file, stmt, &mut stmts, &mut exprs);
        for child in stmts {
            self.collect_stmt_exprs(child, out);
        }
        for child in exprs {
            self.collect_expr_exprs(child, out);
        }
    }

    pub(crate) fn collect_expr_exprs(&self, expr: ExprId, out: &mut Vec<ExprId>) {
        out.push(expr);
        let mut stmts: Vec<StmtId> = Vec::new();
        let mut exprs: Vec<ExprId> = Vec::new();
        expr_children(self.file, expr, &mut stmts, &mut exprs);
        for child in stmts {
            self.collect_stmt_exprs(child, out);
        }
        for child in exprs {
            self.collect_expr_exprs(child, out);
        }
    }

    fn unqualified_call_type(&self, at: ExprId, name: &str) -> Type {
        // A call through a closure-typed local: `action()`.
        if let Some(local) = self.scopes.resolve_local(at, name) {
            if let Type::Closure(c) = self.local_type(local) {
                return *c.return_type;
            }
            return Type::Unknown;
        }
        Type::Unknown
    }

    fn method_return_type(&self, receiver: &Type, name: &str) -> Type {
        if let Type::Closure(c) = receiver {
            if name == "call" {
                return (*c.return_type).clone();
            }
        }
        let Some(start) = erasure_class(self.store, receiver) else {
            return Type::Unknown;
        };
        let env: &dyn TypeEnv = self.store;
        let mut queue = vec![start];
        let mut seen = std::collections::HashSet::new();
        while let Some(id) = queue.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(def) = env.class(id) else { continue };
            if let Some(m) = def.methods.iter().find(|m| m.name == name) {
                return m.return_type.clone();
            }
            for super_ty in def.super_class.iter().chain(def.interfaces.iter()) {
                if let Some(super_id) = erasure_class(env, super_ty) {
                    queue.push(super_id);
                }
            }
            if matches!(def.kind, ClassKind::Interface | ClassKind::Trait) {
                queue.push(env.well_known().object);
            }
        }
        Type::Unknown
    }

    fn field_type(&self, receiver: &Type, name: &str) -> Type {
        if let Type::Map(map_ty) = receiver {
            if let Some(value) = map_ty.value_for(name) {
                return value.clone();
            }
        }
        let Some(start) = erasure_class(self.store, receiver) else {
            return Type::Unknown;
        };
        let env: &dyn TypeEnv = self.store;
        let mut queue = vec![start];
        let mut seen = std::collections::HashSet::new();
        while let Some(id) = queue.pop() {
            if !seen.insert(id) {
                continue;
            }
            let Some(def) = env.class(id) else { continue };
            if let Some(f) = def.fields.iter().find(|f| f.name == name) {
                return f.ty.clone();
            }
            for super_ty in def.super_class.iter().chain(def.interfaces.iter()) {
                if let Some(super_id) = erasure_class(env, super_ty) {
                    queue.push(super_id);
                }
            }
        }
        Type::Unknown
    }

    /// Union of every `return` expression plus the trailing expression
    /// statement; `Object` when nothing contributes.
    fn closure_return_type(&self, body: StmtId) -> Type {
        let mut returns: Vec<Type> = Vec::new();
        self.collect_returns(body, &mut returns);

        if let StmtKind::Block { statements } = &self.file.stmt(body).kind {
            if let Some(&last) = statements.last() {
                if let StmtKind::Expr(expr) = &self.file.stmt(last).kind {
                    returns.push(self.expr_type(*expr));
                }
            }
        } else if let StmtKind::Expr(expr) = &self.file.stmt(body).kind {
            returns.push(self.expr_type(*expr));
        }

        let mut usable: Vec<Type> = returns.into_iter().filter(|t| !t.is_unknown()).collect();
        match usable.len() {
            0 => Type::class(self.store.well_known().object, vec![]),
            // A single contribution keeps its spelling (boxing happens when
            // the closure stands in for a generic context).
            1 => usable.pop().expect("len checked"),
            _ => least_upper_bound(self.store, &usable),
        }
    }

    /// Collect `return` value types within a body, not descending into
    /// nested closures.
    fn collect_returns(&self, stmt: StmtId, out: &mut Vec<Type>) {
        if let StmtKind::Return(Some(value)) = &self.file.stmt(stmt).kind {
            out.push(self.expr_type(*value));
        }
        let mut stmts: Vec<StmtId> = Vec::new();
        let mut exprs: Vec<ExprId> = Vec::new();
        stmt_children(self.file, stmt, &mut stmts, &mut exprs);
        for child in stmts {
            self.collect_returns(child, out);
        }
    }

    fn binary_type(&self, op: BinaryOp, lhs: &Type, rhs: &Type) -> Type {
        let env: &dyn TypeEnv = self.store;
        let wk = *env.well_known();
        match op {
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::And
            | BinaryOp::Or => Type::Primitive(PrimitiveType::Boolean),
            BinaryOp::Elvis => least_upper_bound(env, &[lhs.clone(), rhs.clone()]),
            BinaryOp::Add => {
                let is_stringish = |ty: &Type| {
                    matches!(erasure_class(env, ty), Some(id) if id == wk.string || id == wk.gstring)
                };
                if is_stringish(lhs) || is_stringish(rhs) {
                    return Type::class(wk.string, vec![]);
                }
                self.numeric_promotion(lhs, rhs)
            }
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                self.numeric_promotion(lhs, rhs)
            }
        }
    }

    fn numeric_promotion(&self, lhs: &Type, rhs: &Type) -> Type {
        let env: &dyn TypeEnv = self.store;
        let (Some(l), Some(r)) = (groove_types::unbox(env, lhs), groove_types::unbox(env, rhs))
        else {
            return Type::Unknown;
        };
        if !l.is_numeric() || !r.is_numeric() {
            return Type::Unknown;
        }
        let rank = |p: PrimitiveType| match p {
            PrimitiveType::Double => 4,
            PrimitiveType::Float => 3,
            PrimitiveType::Long => 2,
            _ => 1,
        };
        let promoted = if rank(l) >= rank(r) { l } else { r };
        let promoted = match promoted {
            PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Char => PrimitiveType::Int,
            other => other,
        };
        Type::Primitive(promoted)
    }
}

/// Direct child statements and expressions of one statement.
pub(crate) fn stmt_children(
    file: &File,
    stmt: StmtId,
    stmts: &mut Vec<StmtId>,
    exprs: &mut Vec<ExprId>,
) {
    match &file.stmt(stmt).kind {
        StmtKind::Block { statements } => stmts.extend(statements.iter().copied()),
        StmtKind::VarDecl { initializer, .. } => exprs.extend(initializer.iter().copied()),
        StmtKind::Expr(expr) => exprs.push(*expr),
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            exprs.push(*condition);
            stmts.push(*then_branch);
            stmts.extend(else_branch.iter().copied());
        }
        StmtKind::While { condition, body } => {
            exprs.push(*condition);
            stmts.push(*body);
        }
        StmtKind::For {
            init,
            condition,
            update,
            body,
        } => {
            stmts.extend(init.iter().copied());
            exprs.extend(condition.iter().copied());
            exprs.extend(update.iter().copied());
            stmts.push(*body);
        }
        StmtKind::ForIn { iterable, body, .. } => {
            exprs.push(*iterable);
            stmts.push(*body);
        }
        StmtKind::Return(value) => exprs.extend(value.iter().copied()),
        StmtKind::Labeled { body, .. } => stmts.push(*body),
        StmtKind::ConstructorCall { args, .. } => exprs.extend(args.iter().copied()),
        StmtKind::Throw(value) => exprs.push(*value),
        StmtKind::Break { .. } | StmtKind::Continue { .. } | StmtKind::Nop => {}
    }
}

/// Direct child statements and expressions of one expression.
pub(crate) fn expr_children(
    file: &File,
    expr: ExprId,
    stmts: &mut Vec<StmtId>,
    exprs: &mut Vec<ExprId>,
) {
    match &file.expr(expr).kind {
        ExprKind::Literal(_) | ExprKind::Ref(_) => {}
        ExprKind::GString { embedded, .. } => exprs.extend(embedded.iter().copied()),
        ExprKind::List { elements } => exprs.extend(elements.iter().copied()),
        ExprKind::MapLit { entries } => {
            for entry in entries {
                if let MapKey::Expr(key) = &entry.key {
                    exprs.push(*key);
                }
                exprs.push(entry.value);
            }
        }
        ExprKind::NamedArg { value, .. } => exprs.push(*value),
        ExprKind::Range { left, right, .. } => {
            exprs.push(*left);
            exprs.push(*right);
        }
        ExprKind::Closure { params, body } => {
            for param in params {
                exprs.extend(param.default.iter().copied());
            }
            stmts.push(*body);
        }
        ExprKind::Call { receiver, args, .. } => {
            exprs.extend(receiver.iter().copied());
            exprs.extend(args.iter().copied());
        }
        ExprKind::New { args, .. } => exprs.extend(args.iter().copied()),
        ExprKind::Cast { expr: inner, .. } => exprs.push(*inner),
        ExprKind::FieldAccess { receiver, .. } => exprs.push(*receiver),
        ExprKind::Binary { lhs, rhs, .. } => {
            exprs.push(*lhs);
            exprs.push(*rhs);
        }
        ExprKind::Unary { operand, .. } => exprs.push(*operand),
        ExprKind::Assign { target, value } => {
            exprs.push(*target);
            exprs.push(*value);
        }
        ExprKind::Paren(inner) => exprs.push(*inner),
    }
}
