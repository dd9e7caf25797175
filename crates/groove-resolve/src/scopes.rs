//! Lexical scopes for expression bodies.
//!
//! A `VarDecl` introduces a binding visible to later siblings; blocks and
//! closures open child scopes. Closure scopes capture their parent chain, so
//! resolution is a plain walk up the chain.

use std::collections::HashMap;

use groove_core::Name;
use groove_syntax::{ExprId, ExprKind, File, MethodId, StmtId, StmtKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// A method, initializer, field-initializer, or script root.
    Root,
    Block,
    Closure { closure: ExprId },
}

/// Where a local binding comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalSource {
    /// A `VarDecl` statement.
    Var(StmtId),
    /// The loop variable of a `for (x in ...)` statement.
    ForIn(StmtId),
    MethodParam { method: MethodId, index: usize },
    ClosureParam { closure: ExprId, index: usize },
}

#[derive(Debug, Clone)]
struct Binding {
    name: Name,
    source: LocalSource,
}

#[derive(Debug)]
struct ScopeData {
    parent: Option<ScopeId>,
    kind: ScopeKind,
    bindings: Vec<Binding>,
}

#[derive(Debug, Default)]
pub struct ExprScopes {
    scopes: Vec<ScopeData>,
    scope_of_expr: HashMap<ExprId, ScopeId>,
}

impl ExprScopes {
    #[must_use]
    pub fn build(file: &File) -> Self {
        let mut builder = Builder {
            file,
            scopes: ExprScopes::default(),
        };
        builder.walk_file();
        builder.scopes
    }

    #[must_use]
    pub fn scope_of_expr(&self, expr: ExprId) -> Option<ScopeId> {
        self.scope_of_expr.get(&expr).copied()
    }

    #[must_use]
    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.scopes[scope.idx()].kind
    }

    /// Resolve an unqualified name at an expression to a local binding,
    /// innermost scope first.
    #[must_use]
    pub fn resolve_local(&self, from: ExprId, name: &str) -> Option<LocalSource> {
        let mut current = self.scope_of_expr(from);
        while let Some(scope) = current {
            let data = &self.scopes[scope.idx()];
            if let Some(binding) = data.bindings.iter().rev().find(|b| b.name == name) {
                return Some(binding.source);
            }
            current = data.parent;
        }
        None
    }

    /// The innermost enclosing closure scope of an expression, if any.
    #[must_use]
    pub fn enclosing_closure(&self, from: ExprId) -> Option<ExprId> {
        let mut current = self.scope_of_expr(from);
        while let Some(scope) = current {
            let data = &self.scopes[scope.idx()];
            if let ScopeKind::Closure { closure } = data.kind {
                return Some(closure);
            }
            current = data.parent;
        }
        None
    }

    fn new_scope(&mut self, parent: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(ScopeData {
            parent,
            kind,
            bindings: Vec::new(),
        });
        id
    }

    fn bind(&mut self, scope: ScopeId, name: Name, source: LocalSource) {
        self.scopes[scope.idx()].bindings.push(Binding { name, source });
    }
}

struct Builder<'a> {
    file: &'a File,
    scopes: ExprScopes,
}

impl Builder<'_> {
    fn walk_file(&mut self) {
        for class_id in self.file.all_classes() {
            let class = self.file.class(class_id);

            for &method_id in &class.methods {
                let method = self.file.method(method_id);
                let root = self.scopes.new_scope(None, ScopeKind::Root);
                for (index, param) in method.params.iter().enumerate() {
                    if let Some(default) = param.default {
                        self.walk_expr(default, root);
                    }
                    self.scopes.bind(
                        root,
                        param.name.clone(),
                        LocalSource::MethodParam {
                            method: method_id,
                            index,
                        },
                    );
                }
                if let Some(body) = method.body {
                    self.walk_stmt(body, root);
                }
            }

            for &field_id in &class.fields {
                let field = self.file.field(field_id);
                if let Some(init) = field.initializer {
                    let root = self.scopes.new_scope(None, ScopeKind::Root);
                    self.walk_expr(init, root);
                }
            }

            for initializer in &class.initializers {
                let root = self.scopes.new_scope(None, ScopeKind::Root);
                self.walk_stmt(initializer.body, root);
            }
        }

        // Script statements share one root; bindings persist across them.
        if !self.file.script_body().is_empty() {
            let root = self.scopes.new_scope(None, ScopeKind::Root);
            let mut current = root;
            for &stmt in self.file.script_body() {
                current = self.walk_stmt(stmt, current);
            }
        }
    }

    /// Walk a statement; the returned scope is the one later siblings see.
    fn walk_stmt(&mut self, stmt: StmtId, scope: ScopeId) -> ScopeId {
        match &self.file.stmt(stmt).kind {
            StmtKind::Block { statements } => {
                let mut current = self.scopes.new_scope(Some(scope), ScopeKind::Block);
                for &s in statements {
                    current = self.walk_stmt(s, current);
                }
                scope
            }
            StmtKind::VarDecl {
                name, initializer, ..
            } => {
                if let Some(init) = *initializer {
                    self.walk_expr(init, scope);
                }
                let next = self.scopes.new_scope(Some(scope), ScopeKind::Block);
                self.scopes.bind(next, name.clone(), LocalSource::Var(stmt));
                next
            }
            StmtKind::Expr(expr) => {
                self.walk_expr(*expr, scope);
                scope
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.walk_expr(*condition, scope);
                self.walk_stmt(*then_branch, scope);
                if let Some(else_branch) = *else_branch {
                    self.walk_stmt(else_branch, scope);
                }
                scope
            }
            StmtKind::While { condition, body } => {
                self.walk_expr(*condition, scope);
                self.walk_stmt(*body, scope);
                scope
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                let inner = match *init {
                    Some(init) => self.walk_stmt(init, scope),
                    None => scope,
                };
                if let Some(condition) = *condition {
                    self.walk_expr(condition, inner);
                }
                if let Some(update) = *update {
                    self.walk_expr(update, inner);
                }
                self.walk_stmt(*body, inner);
                scope
            }
            StmtKind::ForIn {
                name,
                iterable,
                body,
            } => {
                self.walk_expr(*iterable, scope);
                let inner = self.scopes.new_scope(Some(scope), ScopeKind::Block);
                self.scopes
                    .bind(inner, name.clone(), LocalSource::ForIn(stmt));
                self.walk_stmt(*body, inner);
                scope
            }
            StmtKind::Return(value) => {
                if let Some(value) = *value {
                    self.walk_expr(value, scope);
                }
                scope
            }
            StmtKind::Labeled { body, .. } => {
                self.walk_stmt(*body, scope);
                scope
            }
            StmtKind::ConstructorCall { args, .. } => {
                for &arg in args {
                    self.walk_expr(arg, scope);
                }
                scope
            }
            StmtKind::Throw(value) => {
                self.walk_expr(*value, scope);
                scope
            }
            StmtKind::Break { .. } | StmtKind::Continue { .. } | StmtKind::Nop => scope,
        }
    }

    fn walk_expr(&mut self, expr: ExprId, scope: ScopeId) {
        self.scopes.scope_of_expr.insert(expr, scope);

        match &self.file.expr(expr).kind {
            ExprKind::Literal(_) | ExprKind::Ref(_) => {}
            ExprKind::GString { embedded, .. } => {
                for &e in embedded {
                    self.walk_expr(e, scope);
                }
            }
            ExprKind::List { elements } => {
                for &e in elements {
                    self.walk_expr(e, scope);
                }
            }
            ExprKind::MapLit { entries } => {
                for entry in entries {
                    if let groove_syntax::MapKey::Expr(key) = &entry.key {
                        self.walk_expr(*key, scope);
                    }
                    self.walk_expr(entry.value, scope);
                }
            }
            ExprKind::NamedArg { value, .. } => self.walk_expr(*value, scope),
            ExprKind::Range { left, right, .. } => {
                self.walk_expr(*left, scope);
                self.walk_expr(*right, scope);
            }
            ExprKind::Closure { params, body } => {
                let inner = self
                    .scopes
                    .new_scope(Some(scope), ScopeKind::Closure { closure: expr });
                for (index, param) in params.iter().enumerate() {
                    if let Some(default) = param.default {
                        self.walk_expr(default, scope);
                    }
                    self.scopes.bind(
                        inner,
                        param.name.clone(),
                        LocalSource::ClosureParam {
                            closure: expr,
                            index,
                        },
                    );
                }
                self.walk_stmt(*body, inner);
            }
            ExprKind::Call { receiver, args, .. } => {
                if let Some(receiver) = *receiver {
                    self.walk_expr(receiver, scope);
                }
                for &arg in args {
                    self.walk_expr(arg, scope);
                }
            }
            // Anonymous bodies are walked through the class loop.
            ExprKind::New { args, .. } => {
                for &arg in args {
                    self.walk_expr(arg, scope);
                }
            }
            ExprKind::Cast { expr: inner, .. } => self.walk_expr(*inner, scope),
            ExprKind::FieldAccess { receiver, .. } => self.walk_expr(*receiver, scope),
            ExprKind::Binary { lhs, rhs, .. } => {
                self.walk_expr(*lhs, scope);
                self.walk_expr(*rhs, scope);
            }
            ExprKind::Unary { operand, .. } => self.walk_expr(*operand, scope),
            ExprKind::Assign { target, value } => {
                self.walk_expr(*target, scope);
                self.walk_expr(*value, scope);
            }
            ExprKind::Paren(inner) => self.walk_expr(*inner, scope),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_core::Span;
    use groove_syntax::{ClassDecl, ClassKind, Literal, MethodDecl, Param};

    fn span() -> Span {
        Span::new(0, 0)
    }

    #[test]
    fn var_decl_binds_later_siblings_only() {
        let mut file = File::new("script");
        let before = file.alloc_expr(ExprKind::Ref("x".into()), span());
        let before_stmt = file.alloc_stmt(StmtKind::Expr(before), span());

        let init = file.alloc_expr(ExprKind::Literal(Literal::Int(1)), span());
        let decl = file.alloc_stmt(
            StmtKind::VarDecl {
                name: "x".into(),
                name_span: span(),
                declared: None,
                initializer: Some(init),
            },
            span(),
        );

        let after = file.alloc_expr(ExprKind::Ref("x".into()), span());
        let after_stmt = file.alloc_stmt(StmtKind::Expr(after), span());

        file.push_script_stmt(before_stmt);
        file.push_script_stmt(decl);
        file.push_script_stmt(after_stmt);

        let scopes = ExprScopes::build(&file);
        assert_eq!(scopes.resolve_local(before, "x"), None);
        assert_eq!(scopes.resolve_local(after, "x"), Some(LocalSource::Var(decl)));
    }

    #[test]
    fn closure_captures_enclosing_bindings() {
        let mut file = File::new("script");
        let init = file.alloc_expr(ExprKind::Literal(Literal::Int(1)), span());
        let decl = file.alloc_stmt(
            StmtKind::VarDecl {
                name: "captured".into(),
                name_span: span(),
                declared: None,
                initializer: Some(init),
            },
            span(),
        );

        let read = file.alloc_expr(ExprKind::Ref("captured".into()), span());
        let read_stmt = file.alloc_stmt(StmtKind::Expr(read), span());
        let body = file.alloc_stmt(
            StmtKind::Block {
                statements: vec![read_stmt],
            },
            span(),
        );
        let closure = file.alloc_expr(
            ExprKind::Closure {
                params: vec![Param::untyped("it", span())],
                body,
            },
            span(),
        );
        let closure_stmt = file.alloc_stmt(StmtKind::Expr(closure), span());

        file.push_script_stmt(decl);
        file.push_script_stmt(closure_stmt);

        let scopes = ExprScopes::build(&file);
        assert_eq!(
            scopes.resolve_local(read, "captured"),
            Some(LocalSource::Var(decl))
        );
        assert_eq!(
            scopes.resolve_local(read, "it"),
            Some(LocalSource::ClosureParam { closure, index: 0 })
        );
        assert_eq!(scopes.enclosing_closure(read), Some(closure));
    }

    #[test]
    fn method_params_bind_in_the_body() {
        let mut file = File::new("demo");
        let read = file.alloc_expr(ExprKind::Ref("arg".into()), span());
        let read_stmt = file.alloc_stmt(StmtKind::Expr(read), span());
        let body = file.alloc_stmt(
            StmtKind::Block {
                statements: vec![read_stmt],
            },
            span(),
        );

        let mut method = MethodDecl::new("run", span());
        method.params = vec![Param::untyped("arg", span())];
        method.body = Some(body);
        let method_id = file.alloc_method(method);

        let mut class = ClassDecl::new("Demo", ClassKind::Class, span());
        class.methods.push(method_id);
        file.add_top_level_class(class);

        let scopes = ExprScopes::build(&file);
        assert_eq!(
            scopes.resolve_local(read, "arg"),
            Some(LocalSource::MethodParam {
                method: method_id,
                index: 0
            })
        );
    }
}
