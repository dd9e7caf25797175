//! The semantic diagnostics pass.
//!
//! One traversal over a file's AST; each check is independent and purely
//! additive. A check never throws on malformed or partial trees: missing
//! children and failed resolutions short-circuit that check silently, since
//! a missing resolution is usually a separate, already-reported problem.
//! Cancellation aborts the traversal; the entry point then reports no
//! diagnostics for the pass.

mod constructors;
mod duplicates;
mod hierarchy;
mod literals;
mod modifiers;
mod named_args;
mod overrides;
mod stmts;
mod type_args;

use groove_core::{CancelToken, Cancelled, Diagnostic};
use groove_resolve::{SemanticDb, SourceMap};
use groove_syntax::{File, GroovyLanguageLevel};
use groove_types::TypeEnv;

/// Stable diagnostic codes, grouped by check.
pub mod codes {
    pub const DUPLICATE_MODIFIER: &str = "DUPLICATE_MODIFIER";
    pub const ILLEGAL_MODIFIER: &str = "ILLEGAL_MODIFIER";
    pub const CONFLICTING_MODIFIERS: &str = "CONFLICTING_MODIFIERS";
    pub const CONFLICTING_VISIBILITY: &str = "CONFLICTING_VISIBILITY";
    pub const NATIVE_WITH_BODY: &str = "NATIVE_WITH_BODY";
    pub const ABSTRACT_WITH_BODY: &str = "ABSTRACT_WITH_BODY";
    pub const TOP_LEVEL_VISIBILITY: &str = "TOP_LEVEL_VISIBILITY";

    pub const OVERRIDES_FINAL: &str = "OVERRIDES_FINAL";
    pub const INCOMPATIBLE_RETURN_TYPE: &str = "INCOMPATIBLE_RETURN_TYPE";
    pub const WEAKER_ACCESS: &str = "WEAKER_ACCESS";

    pub const NO_DEFAULT_SUPER_CONSTRUCTOR: &str = "NO_DEFAULT_SUPER_CONSTRUCTOR";
    pub const CONSTRUCTOR_IN_INTERFACE: &str = "CONSTRUCTOR_IN_INTERFACE";
    pub const CONSTRUCTOR_IN_ANONYMOUS: &str = "CONSTRUCTOR_IN_ANONYMOUS";
    pub const CONSTRUCTOR_IN_IMMUTABLE: &str = "CONSTRUCTOR_IN_IMMUTABLE";
    pub const RECURSIVE_CONSTRUCTOR: &str = "RECURSIVE_CONSTRUCTOR";

    pub const DUPLICATE_METHOD: &str = "DUPLICATE_METHOD";
    pub const MIXED_METHOD_VISIBILITY: &str = "MIXED_METHOD_VISIBILITY";
    pub const DUPLICATE_CLASS: &str = "DUPLICATE_CLASS";

    pub const CYCLIC_INHERITANCE: &str = "CYCLIC_INHERITANCE";
    pub const FINAL_SUPERCLASS: &str = "FINAL_SUPERCLASS";
    pub const EXTENDS_INTERFACE: &str = "EXTENDS_INTERFACE";
    pub const IMPLEMENTS_CLASS: &str = "IMPLEMENTS_CLASS";

    pub const MALFORMED_STRING_LITERAL: &str = "MALFORMED_STRING_LITERAL";

    pub const DUPLICATE_NAMED_ARGUMENT: &str = "DUPLICATE_NAMED_ARGUMENT";
    pub const DUPLICATE_MAP_KEY: &str = "DUPLICATE_MAP_KEY";

    pub const RETURN_FROM_VOID: &str = "RETURN_FROM_VOID";
    pub const RETURN_FROM_CONSTRUCTOR: &str = "RETURN_FROM_CONSTRUCTOR";
    pub const BREAK_OUTSIDE_LOOP: &str = "BREAK_OUTSIDE_LOOP";
    pub const CONTINUE_OUTSIDE_LOOP: &str = "CONTINUE_OUTSIDE_LOOP";
    pub const UNRESOLVED_LABEL: &str = "UNRESOLVED_LABEL";

    pub const WRONG_TYPE_ARGUMENT_COUNT: &str = "WRONG_TYPE_ARGUMENT_COUNT";
    pub const PRIMITIVE_TYPE_ARGUMENT: &str = "PRIMITIVE_TYPE_ARGUMENT";
    pub const TYPE_ARGUMENT_OUT_OF_BOUNDS: &str = "TYPE_ARGUMENT_OUT_OF_BOUNDS";
}

#[derive(Debug, Clone, Copy)]
pub struct CheckConfig {
    pub language_level: GroovyLanguageLevel,
    /// Duplicate keys in map literals merely shadow; report them as
    /// warnings.
    pub report_map_literal_duplicates: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            language_level: GroovyLanguageLevel::default(),
            report_map_literal_duplicates: true,
        }
    }
}

pub(crate) struct CheckContext<'a> {
    pub file: &'a File,
    pub db: &'a dyn SemanticDb,
    pub config: &'a CheckConfig,
    pub cancel: &'a CancelToken,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> CheckContext<'a> {
    /// Borrows through the facade, not through `self`, so checks can hold
    /// symbol data across `report` calls.
    pub(crate) fn env(&self) -> &'a dyn TypeEnv {
        self.db.type_env()
    }

    pub(crate) fn map(&self) -> &'a SourceMap {
        self.db.source_map()
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic)
    }
}

/// Run every check over `file`, consulting `db` for resolution and types.
///
/// Diagnostics come back in discovery order, not source order; consumers
/// sort by span for display. A cancellation observed mid-pass yields an
/// empty list.
#[must_use]
pub fn check_file(
    file: &File,
    db: &dyn SemanticDb,
    config: &CheckConfig,
    cancel: &CancelToken,
) -> Vec<Diagnostic> {
    let mut ctx = CheckContext {
        file,
        db,
        config,
        cancel,
        diagnostics: Vec::new(),
    };

    match run(&mut ctx) {
        Ok(()) => ctx.diagnostics,
        Err(Cancelled) => {
            tracing::debug!(file = %file.name, "analysis cancelled; dropping partial results");
            Vec::new()
        }
    }
}

fn run(ctx: &mut CheckContext<'_>) -> Result<(), Cancelled> {
    duplicates::check_duplicate_classes(ctx)?;

    for class_id in ctx.file.all_classes() {
        ctx.cancel.check()?;
        modifiers::check_class(ctx, class_id)?;
        hierarchy::check_class(ctx, class_id)?;
        overrides::check_class(ctx, class_id)?;
        constructors::check_class(ctx, class_id)?;
        duplicates::check_class_members(ctx, class_id)?;
        type_args::check_class(ctx, class_id)?;
    }
    type_args::check_script(ctx)?;

    literals::check_string_literals(ctx)?;
    named_args::check_named_arguments(ctx)?;
    stmts::check_bodies(ctx)?;
    Ok(())
}
