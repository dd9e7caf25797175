//! Supertype sanity: final superclasses, kind mismatches, and cyclic
//! inheritance.

use std::collections::HashSet;

use groove_core::{Cancelled, Diagnostic};
use groove_syntax::{ClassId, ClassKind};
use groove_types::{canonicalize_named, ClassType, Type, TypeEnv};

use crate::{codes, CheckContext};

pub(crate) fn check_class(ctx: &mut CheckContext<'_>, class_id: ClassId) -> Result<(), Cancelled> {
    let class = ctx.file.class(class_id);
    let Some(store_id) = ctx.map().store_class(class_id) else {
        return Ok(());
    };
    let env = ctx.env();
    let Some(class_def) = env.class(store_id) else {
        return Ok(());
    };

    if class.extends.is_some() {
        if let Some(Type::Class(ClassType { def: super_id, .. })) = class_def
            .super_class
            .as_ref()
            .map(|ty| canonicalize_named(env, ty))
        {
            if let Some(super_def) = env.class(super_id) {
                if super_def.is_final {
                    ctx.report(Diagnostic::error(
                        codes::FINAL_SUPERCLASS,
                        format!("Final class `{}` cannot be extended", super_def.simple_name()),
                        class.name_span,
                    ));
                }
                let super_is_interface = matches!(
                    super_def.kind,
                    groove_types::ClassKind::Interface | groove_types::ClassKind::Trait
                );
                if super_is_interface && class.kind == ClassKind::Class {
                    ctx.report(Diagnostic::error(
                        codes::EXTENDS_INTERFACE,
                        format!(
                            "Class `{}` cannot extend interface `{}`",
                            class.name,
                            super_def.simple_name()
                        ),
                        class.name_span,
                    ));
                }
            }
        }
    }

    for (position, tr) in class.implements.iter().enumerate() {
        ctx.cancel.check()?;
        let Some(lowered) = class_def.interfaces.get(position) else {
            continue;
        };
        let Type::Class(ClassType { def: iface_id, .. }) = canonicalize_named(env, lowered) else {
            continue;
        };
        let Some(iface_def) = env.class(iface_id) else {
            continue;
        };
        if matches!(iface_def.kind, groove_types::ClassKind::Class | groove_types::ClassKind::Enum)
        {
            ctx.report(Diagnostic::error(
                codes::IMPLEMENTS_CLASS,
                format!(
                    "Only interfaces and traits may be implemented, not class `{}`",
                    iface_def.simple_name()
                ),
                tr.span,
            ));
        }
    }

    if participates_in_inheritance_cycle(env, store_id) {
        ctx.report(Diagnostic::error(
            codes::CYCLIC_INHERITANCE,
            format!("Cyclic inheritance involving `{}`", class.name),
            class.name_span,
        ));
    }

    Ok(())
}

/// Visited-set walk of the extends/implements graph starting above `start`;
/// true when `start` shows up among its own supertypes.
fn participates_in_inheritance_cycle(env: &dyn TypeEnv, start: groove_types::ClassId) -> bool {
    let mut seen: HashSet<groove_types::ClassId> = HashSet::new();
    let mut queue: Vec<groove_types::ClassId> = Vec::new();
    push_super_ids(env, start, &mut queue);

    while let Some(id) = queue.pop() {
        if id == start {
            return true;
        }
        if !seen.insert(id) {
            continue;
        }
        push_super_ids(env, id, &mut queue);
    }
    false
}

fn push_super_ids(
    env: &dyn TypeEnv,
    class: groove_types::ClassId,
    queue: &mut Vec<groove_types::ClassId>,
) {
    let Some(def) = env.class(class) else {
        return;
    };
    for super_ty in def.super_class.iter().chain(def.interfaces.iter()) {
        if let Type::Class(ct) = canonicalize_named(env, super_ty) {
            queue.push(ct.def);
        }
    }
}
