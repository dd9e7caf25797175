//! String/GString literal re-scanning.

use groove_core::{Cancelled, Diagnostic, Span};
use groove_syntax::literals::scan_string_literal;
use groove_syntax::{ExprKind, Literal};

use crate::{codes, CheckContext};

pub(crate) fn check_string_literals(ctx: &mut CheckContext<'_>) -> Result<(), Cancelled> {
    for expr_id in ctx.file.all_exprs() {
        ctx.cancel.check()?;
        let expr = ctx.file.expr(expr_id);
        let lit = match &expr.kind {
            ExprKind::Literal(Literal::Str(lit)) => lit,
            ExprKind::GString { lit, .. } => lit,
            _ => continue,
        };
        if let Err(error) = scan_string_literal(lit.kind, &lit.text) {
            // Rebase the token-relative range onto the file.
            let start = expr.span.start + error.span.start;
            let end = expr.span.start + error.span.end;
            ctx.report(Diagnostic::error(
                codes::MALFORMED_STRING_LITERAL,
                error.message,
                Span::new(start, end.max(start)),
            ));
        }
    }
    Ok(())
}
