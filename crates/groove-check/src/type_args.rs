//! Type-argument arity, bound conformance, and the primitive-argument ban.

use groove_core::{Cancelled, Diagnostic};
use groove_resolve::{lower_type_ref, TypeParamScope};
use groove_syntax::{ClassId, ExprId, ExprKind, StmtId, StmtKind, TypeRef};
use groove_types::{is_assignable, substitute, Substitution, Type, TypeEnv};

use crate::{codes, CheckContext};

pub(crate) fn check_class(ctx: &mut CheckContext<'_>, class_id: ClassId) -> Result<(), Cancelled> {
    let class = ctx.file.class(class_id);
    let empty = TypeParamScope::new();
    let tp_scope = ctx.map().type_param_scope(class_id).unwrap_or(&empty);

    let mut refs: Vec<&TypeRef> = Vec::new();
    refs.extend(class.extends.iter());
    refs.extend(class.implements.iter());
    for tp in &class.type_params {
        refs.extend(tp.bounds.iter());
    }
    for &field_id in &class.fields {
        refs.extend(ctx.file.field(field_id).ty.iter());
    }

    let mut body_roots: Vec<StmtId> = Vec::new();
    for &method_id in &class.methods {
        let method = ctx.file.method(method_id);
        refs.extend(method.return_type.iter());
        for param in &method.params {
            refs.extend(param.ty.iter());
        }
        body_roots.extend(method.body.iter().copied());
    }
    for initializer in &class.initializers {
        body_roots.push(initializer.body);
    }
    for root in body_roots {
        collect_stmt_refs(ctx, root, &mut refs);
    }

    for tr in refs {
        ctx.cancel.check()?;
        check_type_ref(ctx, tr, tp_scope);
    }
    Ok(())
}

/// Script statements sit outside any class; they get the same treatment
/// with an empty type-parameter scope.
pub(crate) fn check_script(ctx: &mut CheckContext<'_>) -> Result<(), Cancelled> {
    let empty = TypeParamScope::new();
    let mut refs: Vec<&TypeRef> = Vec::new();
    for &stmt in ctx.file.script_body() {
        collect_stmt_refs(ctx, stmt, &mut refs);
    }
    for tr in refs {
        ctx.cancel.check()?;
        check_type_ref(ctx, tr, &empty);
    }
    Ok(())
}

fn collect_stmt_refs<'a>(ctx: &CheckContext<'a>, stmt: StmtId, out: &mut Vec<&'a TypeRef>) {
    match &ctx.file.stmt(stmt).kind {
        StmtKind::Block { statements } => {
            for &s in statements {
                collect_stmt_refs(ctx, s, out);
            }
        }
        StmtKind::VarDecl {
            declared,
            initializer,
            ..
        } => {
            out.extend(declared.iter());
            if let Some(init) = *initializer {
                collect_expr_refs(ctx, init, out);
            }
        }
        StmtKind::Expr(expr) => collect_expr_refs(ctx, *expr, out),
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            collect_expr_refs(ctx, *condition, out);
            collect_stmt_refs(ctx, *then_branch, out);
            if let Some(else_branch) = *else_branch {
                collect_stmt_refs(ctx, else_branch, out);
            }
        }
        StmtKind::While { condition, body } => {
            collect_expr_refs(ctx, *condition, out);
            collect_stmt_refs(ctx, *body, out);
        }
        StmtKind::For {
            init,
            condition,
            update,
            body,
        } => {
            if let Some(init) = *init {
                collect_stmt_refs(ctx, init, out);
            }
            if let Some(condition) = *condition {
                collect_expr_refs(ctx, condition, out);
            }
            if let Some(update) = *update {
                collect_expr_refs(ctx, update, out);
            }
            collect_stmt_refs(ctx, *body, out);
        }
        StmtKind::ForIn { iterable, body, .. } => {
            collect_expr_refs(ctx, *iterable, out);
            collect_stmt_refs(ctx, *body, out);
        }
        StmtKind::Return(value) => {
            if let Some(value) = *value {
                collect_expr_refs(ctx, value, out);
            }
        }
        StmtKind::Labeled { body, .. } => collect_stmt_refs(ctx, *body, out),
        StmtKind::ConstructorCall { args, .. } => {
            for &arg in args {
                collect_expr_refs(ctx, arg, out);
            }
        }
        StmtKind::Throw(value) => collect_expr_refs(ctx, *value, out),
        StmtKind::Break { .. } | StmtKind::Continue { .. } | StmtKind::Nop => {}
    }
}

fn collect_expr_refs<'a>(ctx: &CheckContext<'a>, expr: ExprId, out: &mut Vec<&'a TypeRef>) {
    use groove_syntax::MapKey;
    match &ctx.file.expr(expr).kind {
        ExprKind::Literal(_) | ExprKind::Ref(_) => {}
        ExprKind::GString { embedded, .. } => {
            for &e in embedded {
                collect_expr_refs(ctx, e, out);
            }
        }
        ExprKind::List { elements } => {
            for &e in elements {
                collect_expr_refs(ctx, e, out);
            }
        }
        ExprKind::MapLit { entries } => {
            for entry in entries {
                if let MapKey::Expr(key) = &entry.key {
                    collect_expr_refs(ctx, *key, out);
                }
                collect_expr_refs(ctx, entry.value, out);
            }
        }
        ExprKind::NamedArg { value, .. } => collect_expr_refs(ctx, *value, out),
        ExprKind::Range { left, right, .. } => {
            collect_expr_refs(ctx, *left, out);
            collect_expr_refs(ctx, *right, out);
        }
        ExprKind::Closure { params, body } => {
            for param in params {
                out.extend(param.ty.iter());
                if let Some(default) = param.default {
                    collect_expr_refs(ctx, default, out);
                }
            }
            collect_stmt_refs(ctx, *body, out);
        }
        ExprKind::Call { receiver, args, .. } => {
            if let Some(receiver) = *receiver {
                collect_expr_refs(ctx, receiver, out);
            }
            for &arg in args {
                collect_expr_refs(ctx, arg, out);
            }
        }
        ExprKind::New { type_ref, args, .. } => {
            out.push(type_ref);
            for &arg in args {
                collect_expr_refs(ctx, arg, out);
            }
        }
        ExprKind::Cast { expr: inner, targets } => {
            out.extend(targets.iter());
            collect_expr_refs(ctx, *inner, out);
        }
        ExprKind::FieldAccess { receiver, .. } => collect_expr_refs(ctx, *receiver, out),
        ExprKind::Binary { lhs, rhs, .. } => {
            collect_expr_refs(ctx, *lhs, out);
            collect_expr_refs(ctx, *rhs, out);
        }
        ExprKind::Unary { operand, .. } => collect_expr_refs(ctx, *operand, out),
        ExprKind::Assign { target, value } => {
            collect_expr_refs(ctx, *target, out);
            collect_expr_refs(ctx, *value, out);
        }
        ExprKind::Paren(inner) => collect_expr_refs(ctx, *inner, out),
    }
}

fn check_type_ref(ctx: &mut CheckContext<'_>, tr: &TypeRef, tp_scope: &TypeParamScope) {
    // Generics require boxed types: a primitive anywhere in an argument
    // position is an error.
    for arg in &tr.args {
        if arg.is_primitive() {
            ctx.report(Diagnostic::error(
                codes::PRIMITIVE_TYPE_ARGUMENT,
                format!(
                    "Primitive type argument `{}` is not allowed; use the wrapper type",
                    arg.name
                ),
                arg.span,
            ));
        }
        check_type_ref(ctx, arg, tp_scope);
    }

    if tr.args.is_empty() {
        return;
    }

    let env = ctx.env();
    let lowered = lower_type_ref(env, ctx.map(), tp_scope, tr);
    let Type::Class(ct) = lowered else {
        return;
    };
    let Some(class_def) = env.class(ct.def) else {
        return;
    };

    let declared_arity = class_def.type_params.len();
    if declared_arity != tr.args.len() {
        ctx.report(Diagnostic::warning(
            codes::WRONG_TYPE_ARGUMENT_COUNT,
            format!(
                "Wrong number of type arguments for `{}`: {}; required: {declared_arity}",
                tr.name,
                tr.args.len()
            ),
            tr.span,
        ));
    }

    // Bound conformance after substituting the supplied arguments.
    let mut subst = Substitution::new();
    for (idx, formal) in class_def.type_params.iter().copied().enumerate() {
        subst.insert(formal, ct.args.get(idx).cloned().unwrap_or(Type::Unknown));
    }
    let formals = class_def.type_params.clone();
    for (idx, formal) in formals.iter().copied().enumerate() {
        let (Some(arg_ty), Some(arg_ref)) = (ct.args.get(idx), tr.args.get(idx)) else {
            break;
        };
        if matches!(arg_ty, Type::Unknown | Type::Named(_) | Type::TypeVar(_)) {
            continue;
        }
        let Some(param) = env.type_param(formal) else {
            continue;
        };
        for bound in param.upper_bounds.clone() {
            let bound = substitute(&bound, &subst);
            if matches!(bound, Type::Named(_) | Type::Unknown) {
                continue;
            }
            if !is_assignable(env, &bound, arg_ty) {
                ctx.report(Diagnostic::warning(
                    codes::TYPE_ARGUMENT_OUT_OF_BOUNDS,
                    format!(
                        "Type argument `{}` is not within the bound of type parameter `{}`",
                        arg_ref.name, param.name
                    ),
                    arg_ref.span,
                ));
            }
        }
    }
}
