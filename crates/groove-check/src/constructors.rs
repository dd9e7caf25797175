//! Constructor placement, default-super-constructor availability, and
//! `this(...)` delegation cycles.

use std::collections::HashMap;

use groove_core::{Cancelled, Diagnostic, FixKind, Span};
use groove_syntax::{ClassId, ClassKind, CtorTarget, MethodId, StmtKind};
use groove_types::{ClassType, Type, TypeEnv, Visibility};

use crate::{codes, CheckContext};

pub(crate) fn check_class(ctx: &mut CheckContext<'_>, class_id: ClassId) -> Result<(), Cancelled> {
    let class = ctx.file.class(class_id);
    let constructors: Vec<MethodId> = class
        .methods
        .iter()
        .copied()
        .filter(|&m| ctx.file.method(m).is_constructor)
        .collect();

    // Placement: interfaces, annotations, anonymous classes, and @Immutable
    // classes may not declare constructors.
    let placement = match class.kind {
        ClassKind::Interface | ClassKind::Annotation | ClassKind::Trait => Some((
            codes::CONSTRUCTOR_IN_INTERFACE,
            "Constructors are not allowed in an interface or trait",
        )),
        _ if class.is_anonymous => Some((
            codes::CONSTRUCTOR_IN_ANONYMOUS,
            "Constructors are not allowed in an anonymous class",
        )),
        _ if class.has_annotation("Immutable") => Some((
            codes::CONSTRUCTOR_IN_IMMUTABLE,
            "Explicit constructors are not allowed in an `@Immutable` class",
        )),
        _ => None,
    };
    if let Some((code, message)) = placement {
        for &ctor in &constructors {
            ctx.report(Diagnostic::error(
                code,
                message,
                ctx.file.method(ctor).name_span,
            ));
        }
    }

    check_recursive_delegation(ctx, &constructors)?;
    check_super_default_availability(ctx, class_id, &constructors)?;
    Ok(())
}

/// Follow each constructor's `this(...)` edge; every constructor on a cycle
/// is flagged. The walk is bounded by the constructor count, so it
/// terminates no matter how the chains are wired.
fn check_recursive_delegation(
    ctx: &mut CheckContext<'_>,
    constructors: &[MethodId],
) -> Result<(), Cancelled> {
    if constructors.is_empty() {
        return Ok(());
    }

    let successor: Vec<Option<usize>> = constructors
        .iter()
        .map(|&ctor| delegation_target(ctx, constructors, ctor))
        .collect();

    let mut in_cycle = vec![false; constructors.len()];
    for start in 0..constructors.len() {
        ctx.cancel.check()?;
        let mut seen_at: HashMap<usize, usize> = HashMap::new();
        let mut path: Vec<usize> = Vec::new();
        let mut current = Some(start);
        while let Some(index) = current {
            if let Some(&position) = seen_at.get(&index) {
                for &member in &path[position..] {
                    in_cycle[member] = true;
                }
                break;
            }
            seen_at.insert(index, path.len());
            path.push(index);
            current = successor[index];
        }
    }

    for (index, &flagged) in in_cycle.iter().enumerate() {
        if flagged {
            ctx.report(Diagnostic::error(
                codes::RECURSIVE_CONSTRUCTOR,
                "Recursive constructor invocation",
                ctx.file.method(constructors[index]).name_span,
            ));
        }
    }
    Ok(())
}

/// The constructor a leading `this(...)` delegates to, resolved by arity
/// (default-valued parameters make a constructor callable with fewer
/// arguments).
fn delegation_target(
    ctx: &CheckContext<'_>,
    constructors: &[MethodId],
    ctor: MethodId,
) -> Option<usize> {
    let (target, arg_count) = leading_delegation(ctx, ctor)?;
    if target != CtorTarget::This {
        return None;
    }

    let mut fallback = None;
    let mut fallback_count = 0;
    for (index, &candidate) in constructors.iter().enumerate() {
        let params = &ctx.file.method(candidate).params;
        let required = params.iter().filter(|p| p.default.is_none()).count();
        if params.len() == arg_count {
            return Some(index);
        }
        if required <= arg_count && arg_count <= params.len() {
            fallback = Some(index);
            fallback_count += 1;
        }
    }
    // Ambiguous delegation is overload resolution's problem, not ours.
    if fallback_count == 1 {
        fallback
    } else {
        None
    }
}

/// The explicit `this(...)`/`super(...)` a constructor body begins with.
fn leading_delegation(ctx: &CheckContext<'_>, ctor: MethodId) -> Option<(CtorTarget, usize)> {
    let body = ctx.file.method(ctor).body?;
    let first = match &ctx.file.stmt(body).kind {
        StmtKind::Block { statements } => *statements.first()?,
        _ => body,
    };
    match &ctx.file.stmt(first).kind {
        StmtKind::ConstructorCall { target, args } => Some((*target, args.len())),
        _ => None,
    }
}

/// A class with an explicit superclass needs an accessible no-arg (or
/// all-optional-parameter) super constructor for every path that does not
/// delegate explicitly, unless the superclass declares no constructors at
/// all or `@InheritConstructors` is present.
fn check_super_default_availability(
    ctx: &mut CheckContext<'_>,
    class_id: ClassId,
    constructors: &[MethodId],
) -> Result<(), Cancelled> {
    let class = ctx.file.class(class_id);
    if class.extends.is_none() {
        return Ok(());
    }

    let Some(store_id) = ctx.map().store_class(class_id) else {
        return Ok(());
    };
    let env = ctx.env();
    let Some(class_def) = env.class(store_id) else {
        return Ok(());
    };
    if class_def.inherit_constructors {
        return Ok(());
    }
    // Unresolvable superclass: insufficient information, skip.
    let Some(Type::Class(ClassType { def: super_id, .. })) = class_def.super_class.clone() else {
        return Ok(());
    };
    let Some(super_def) = env.class(super_id) else {
        return Ok(());
    };
    if super_def.constructors.is_empty() {
        // Implicit default constructor.
        return Ok(());
    }

    let accessible_no_arg = super_def
        .constructors
        .iter()
        .any(|c| c.visibility != Visibility::Private && c.callable_with_no_args());
    if accessible_no_arg {
        return Ok(());
    }

    let super_name = super_def.simple_name().to_string();
    let mut sites: Vec<Span> = Vec::new();
    if constructors.is_empty() {
        sites.push(class.name_span);
    } else {
        for &ctor in constructors {
            if leading_delegation(ctx, ctor).is_none() {
                sites.push(ctx.file.method(ctor).name_span);
            }
        }
    }

    for span in sites {
        ctx.cancel.check()?;
        ctx.report(
            Diagnostic::error(
                codes::NO_DEFAULT_SUPER_CONSTRUCTOR,
                format!("There is no default constructor available in `{super_name}`"),
                span,
            )
            .with_fix(FixKind::AddNoArgConstructor),
        );
    }
    Ok(())
}
