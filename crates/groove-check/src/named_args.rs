//! Named-argument and map-literal key duplication.
//!
//! The asymmetry is intentional: a duplicated named argument at a call site
//! is definitely wrong (Error), a duplicated key in a map literal merely
//! shadows (Warning).

use std::collections::HashSet;

use groove_core::{Cancelled, Diagnostic, Name};
use groove_syntax::{ExprKind, MapKey};

use crate::{codes, CheckContext};

pub(crate) fn check_named_arguments(ctx: &mut CheckContext<'_>) -> Result<(), Cancelled> {
    for expr_id in ctx.file.all_exprs() {
        ctx.cancel.check()?;
        match &ctx.file.expr(expr_id).kind {
            ExprKind::Call { args, .. } => {
                let mut seen: HashSet<Name> = HashSet::new();
                for &arg in args {
                    let ExprKind::NamedArg {
                        name, name_span, ..
                    } = &ctx.file.expr(arg).kind
                    else {
                        continue;
                    };
                    if !seen.insert(name.clone()) {
                        ctx.report(Diagnostic::error(
                            codes::DUPLICATE_NAMED_ARGUMENT,
                            format!("Duplicated named argument `{name}`"),
                            *name_span,
                        ));
                    }
                }
            }
            ExprKind::MapLit { entries } => {
                if !ctx.config.report_map_literal_duplicates {
                    continue;
                }
                let mut seen: HashSet<Name> = HashSet::new();
                for entry in entries {
                    let MapKey::Name(ref name) = entry.key else {
                        continue;
                    };
                    if !seen.insert(name.clone()) {
                        ctx.report(Diagnostic::warning(
                            codes::DUPLICATE_MAP_KEY,
                            format!("Duplicated map key `{name}`"),
                            entry.key_span,
                        ));
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}
