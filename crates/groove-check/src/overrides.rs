//! Override covariance, final-method protection, and visibility narrowing.

use groove_core::{Cancelled, Diagnostic, FixKind};
use groove_resolve::MethodRef;
use groove_syntax::{ClassId, Modifier};
use groove_types::{
    canonical_text, is_assignable, raw_type, substitute, Type, TypeEnv,
};

use crate::{codes, CheckContext};

pub(crate) fn check_class(ctx: &mut CheckContext<'_>, class_id: ClassId) -> Result<(), Cancelled> {
    let class = ctx.file.class(class_id);

    for &method_id in &class.methods {
        ctx.cancel.check()?;
        let method = ctx.file.method(method_id);
        if method.is_constructor || method.modifiers.has(Modifier::Static) {
            continue;
        }
        let Some(loc) = ctx.map().method_loc(method_id) else {
            continue;
        };
        let method_ref = MethodRef {
            class: loc.class,
            is_constructor: false,
            index: loc.index,
        };
        let Some(def) = method_ref.def(ctx.env()) else {
            continue;
        };
        let my_return = def.return_type.clone();
        let my_visibility = def.visibility;
        let name_span = method.name_span;
        let method_name = method.name.clone();

        for (super_ref, subst) in ctx.db.super_signatures(method_ref) {
            let Some(super_def) = super_ref.def(ctx.env()) else {
                continue;
            };
            let super_class_name = simple_class_name(ctx.env(), super_ref.class);

            if super_def.is_final {
                // One error per final super-method, return types regardless.
                ctx.report(Diagnostic::error(
                    codes::OVERRIDES_FINAL,
                    format!(
                        "Method `{method_name}` cannot override final method from `{super_class_name}`"
                    ),
                    name_span,
                ));
                continue;
            }

            if my_visibility < super_def.visibility {
                ctx.report(Diagnostic::error(
                    codes::WEAKER_ACCESS,
                    format!(
                        "Method `{method_name}` cannot have weaker access (`{}`) than `{}` in `{super_class_name}`",
                        my_visibility.as_str(),
                        super_def.visibility.as_str()
                    ),
                    name_span,
                ));
            }

            let super_return = substitute(&super_def.return_type, &subst);
            if !covariant_return_ok(ctx.env(), &my_return, &super_return) {
                ctx.report(
                    Diagnostic::error(
                        codes::INCOMPATIBLE_RETURN_TYPE,
                        format!(
                            "Return type `{}` of `{method_name}` is incompatible with `{}` declared in `{super_class_name}`",
                            canonical_text(ctx.env(), &my_return),
                            canonical_text(ctx.env(), &super_return),
                        ),
                        name_span,
                    )
                    .with_fix(FixKind::ChangeReturnType),
                );
            }
        }
    }
    Ok(())
}

/// Equal, or covariant-assignable; array return types must match exactly
/// after erasure.
fn covariant_return_ok(env: &dyn TypeEnv, mine: &Type, sup: &Type) -> bool {
    if mine == sup {
        return true;
    }
    if matches!(mine, Type::Array(_)) || matches!(sup, Type::Array(_)) {
        return raw_type(mine) == raw_type(sup);
    }
    if matches!(sup, Type::Void) || matches!(mine, Type::Void) {
        return false;
    }
    // Insufficient information is not a finding.
    if mine.is_unknown() || sup.is_unknown() {
        return true;
    }
    is_assignable(env, sup, mine)
}

fn simple_class_name(env: &dyn TypeEnv, class: groove_types::ClassId) -> String {
    env.class(class)
        .map(|def| def.simple_name().to_string())
        .unwrap_or_else(|| "?".to_string())
}
