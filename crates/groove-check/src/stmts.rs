//! Statement legality: value returns in void/constructor contexts, and
//! `break`/`continue` placement and label resolution.

use groove_core::{Cancelled, Diagnostic, FixKind, Name};
use groove_syntax::{ExprId, ExprKind, MapKey, StmtId, StmtKind};

use crate::{codes, CheckContext};

#[derive(Debug, Clone, Default)]
struct BodyState {
    in_constructor: bool,
    is_void: bool,
    loop_depth: u32,
    /// Enclosing labels; the flag records whether the label is attached to
    /// a loop.
    labels: Vec<(Name, bool)>,
}

pub(crate) fn check_bodies(ctx: &mut CheckContext<'_>) -> Result<(), Cancelled> {
    for class_id in ctx.file.all_classes() {
        let class = ctx.file.class(class_id);
        for &method_id in &class.methods {
            ctx.cancel.check()?;
            let method = ctx.file.method(method_id);
            let Some(body) = method.body else { continue };
            let state = BodyState {
                in_constructor: method.is_constructor,
                is_void: method.is_void(),
                ..BodyState::default()
            };
            walk_stmt(ctx, body, &state)?;
        }
        for initializer in &class.initializers {
            walk_stmt(ctx, initializer.body, &BodyState::default())?;
        }
        for &field_id in &class.fields {
            if let Some(init) = ctx.file.field(field_id).initializer {
                walk_expr(ctx, init)?;
            }
        }
    }

    // Script statements: a script may return a value from anywhere.
    for &stmt in ctx.file.script_body() {
        walk_stmt(ctx, stmt, &BodyState::default())?;
    }
    Ok(())
}

fn walk_stmt(ctx: &mut CheckContext<'_>, stmt: StmtId, state: &BodyState) -> Result<(), Cancelled> {
    ctx.cancel.check()?;
    match &ctx.file.stmt(stmt).kind {
        StmtKind::Block { statements } => {
            for &s in statements {
                walk_stmt(ctx, s, state)?;
            }
        }
        StmtKind::VarDecl { initializer, .. } => {
            if let Some(init) = *initializer {
                walk_expr(ctx, init)?;
            }
        }
        StmtKind::Expr(expr) => walk_expr(ctx, *expr)?,
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            walk_expr(ctx, *condition)?;
            walk_stmt(ctx, *then_branch, state)?;
            if let Some(else_branch) = *else_branch {
                walk_stmt(ctx, else_branch, state)?;
            }
        }
        StmtKind::While { condition, body } => {
            walk_expr(ctx, *condition)?;
            let inner = BodyState {
                loop_depth: state.loop_depth + 1,
                labels: state.labels.clone(),
                ..*state
            };
            walk_stmt(ctx, *body, &inner)?;
        }
        StmtKind::For {
            init,
            condition,
            update,
            body,
        } => {
            if let Some(init) = *init {
                walk_stmt(ctx, init, state)?;
            }
            if let Some(condition) = *condition {
                walk_expr(ctx, condition)?;
            }
            if let Some(update) = *update {
                walk_expr(ctx, update)?;
            }
            let inner = BodyState {
                loop_depth: state.loop_depth + 1,
                labels: state.labels.clone(),
                ..*state
            };
            walk_stmt(ctx, *body, &inner)?;
        }
        StmtKind::ForIn { iterable, body, .. } => {
            walk_expr(ctx, *iterable)?;
            let inner = BodyState {
                loop_depth: state.loop_depth + 1,
                labels: state.labels.clone(),
                ..*state
            };
            walk_stmt(ctx, *body, &inner)?;
        }
        StmtKind::Return(value) => {
            if let Some(value) = *value {
                walk_expr(ctx, value)?;
                let value_span = ctx.file.expr(value).span;
                if state.in_constructor {
                    ctx.report(
                        Diagnostic::error(
                            codes::RETURN_FROM_CONSTRUCTOR,
                            "Cannot return a value from a constructor",
                            value_span,
                        )
                        .with_fix(FixKind::RemoveReturnValue),
                    );
                } else if state.is_void {
                    ctx.report(
                        Diagnostic::error(
                            codes::RETURN_FROM_VOID,
                            "Cannot return a value from void method",
                            value_span,
                        )
                        .with_fix(FixKind::RemoveReturnValue),
                    );
                }
            }
        }
        StmtKind::Break { label } => {
            check_jump(ctx, stmt, label.as_ref(), state, codes::BREAK_OUTSIDE_LOOP, "break");
        }
        StmtKind::Continue { label } => {
            check_jump(
                ctx,
                stmt,
                label.as_ref(),
                state,
                codes::CONTINUE_OUTSIDE_LOOP,
                "continue",
            );
        }
        StmtKind::Labeled { label, body } => {
            let on_loop = matches!(
                ctx.file.stmt(*body).kind,
                StmtKind::While { .. } | StmtKind::For { .. } | StmtKind::ForIn { .. }
            );
            let mut inner = state.clone();
            inner.labels.push((label.clone(), on_loop));
            walk_stmt(ctx, *body, &inner)?;
        }
        StmtKind::ConstructorCall { args, .. } => {
            for &arg in args {
                walk_expr(ctx, arg)?;
            }
        }
        StmtKind::Throw(value) => walk_expr(ctx, *value)?,
        StmtKind::Nop => {}
    }
    Ok(())
}

fn check_jump(
    ctx: &mut CheckContext<'_>,
    stmt: StmtId,
    label: Option<&Name>,
    state: &BodyState,
    outside_code: &'static str,
    keyword: &str,
) {
    let span = ctx.file.stmt(stmt).span;
    match label {
        // A label must resolve to an enclosing labeled loop, even when some
        // unlabeled loop encloses the statement.
        Some(label) => {
            let resolves = state
                .labels
                .iter()
                .any(|(name, on_loop)| name == label && *on_loop);
            if !resolves {
                ctx.report(Diagnostic::error(
                    codes::UNRESOLVED_LABEL,
                    format!("Undefined label `{label}`"),
                    span,
                ));
            }
        }
        None => {
            if state.loop_depth == 0 {
                ctx.report(Diagnostic::error(
                    outside_code,
                    format!("`{keyword}` outside of loop"),
                    span,
                ));
            }
        }
    }
}

/// Closures reset the statement context: a `return` in a closure is not a
/// return from the enclosing method, and loops outside don't admit a
/// `break` inside.
fn walk_expr(ctx: &mut CheckContext<'_>, expr: ExprId) -> Result<(), Cancelled> {
    match &ctx.file.expr(expr).kind {
        ExprKind::Literal(_) | ExprKind::Ref(_) => {}
        ExprKind::GString { embedded, .. } => {
            for &e in embedded {
                walk_expr(ctx, e)?;
            }
        }
        ExprKind::List { elements } => {
            for &e in elements {
                walk_expr(ctx, e)?;
            }
        }
        ExprKind::MapLit { entries } => {
            for entry in entries {
                if let MapKey::Expr(key) = &entry.key {
                    walk_expr(ctx, *key)?;
                }
                walk_expr(ctx, entry.value)?;
            }
        }
        ExprKind::NamedArg { value, .. } => walk_expr(ctx, *value)?,
        ExprKind::Range { left, right, .. } => {
            walk_expr(ctx, *left)?;
            walk_expr(ctx, *right)?;
        }
        ExprKind::Closure { params, body } => {
            for param in params {
                if let Some(default) = param.default {
                    walk_expr(ctx, default)?;
                }
            }
            walk_stmt(ctx, *body, &BodyState::default())?;
        }
        ExprKind::Call { receiver, args, .. } => {
            if let Some(receiver) = *receiver {
                walk_expr(ctx, receiver)?;
            }
            for &arg in args {
                walk_expr(ctx, arg)?;
            }
        }
        ExprKind::New { args, .. } => {
            for &arg in args {
                walk_expr(ctx, arg)?;
            }
        }
        ExprKind::Cast { expr: inner, .. } => walk_expr(ctx, *inner)?,
        ExprKind::FieldAccess { receiver, .. } => walk_expr(ctx, *receiver)?,
        ExprKind::Binary { lhs, rhs, .. } => {
            walk_expr(ctx, *lhs)?;
            walk_expr(ctx, *rhs)?;
        }
        ExprKind::Unary { operand, .. } => walk_expr(ctx, *operand)?,
        ExprKind::Assign { target, value } => {
            walk_expr(ctx, *target)?;
            walk_expr(ctx, *value)?;
        }
        ExprKind::Paren(inner) => walk_expr(ctx, *inner)?,
    }
    Ok(())
}
