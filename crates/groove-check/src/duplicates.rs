//! Duplicate declarations: classes sharing a name, methods sharing an
//! erased signature, and overload sets mixing private with non-private.

use std::collections::HashMap;

use groove_core::{Cancelled, Diagnostic, FixKind, Name};
use groove_resolve::erased_signature;
use groove_syntax::{ClassId, MethodId, Modifier};

use crate::{codes, CheckContext};

/// A class whose name resolves to more than one declaration in this file
/// (the script's synthetic class included) flags every explicit declaration.
pub(crate) fn check_duplicate_classes(ctx: &mut CheckContext<'_>) -> Result<(), Cancelled> {
    let mut by_name: HashMap<Name, Vec<ClassId>> = HashMap::new();
    for class_id in ctx.file.all_classes() {
        let class = ctx.file.class(class_id);
        if class.is_anonymous {
            continue;
        }
        by_name.entry(class.name.clone()).or_default().push(class_id);
    }

    let script_name = ctx
        .map()
        .script_class
        .map(|_| ctx.file.name.clone());

    for (name, ids) in by_name {
        ctx.cancel.check()?;
        let script_occupant = script_name.as_ref() == Some(&name);
        if ids.len() + usize::from(script_occupant) < 2 {
            continue;
        }
        // The synthetic script class has no span; only explicit
        // declarations carry the diagnostic.
        for id in ids {
            ctx.report(Diagnostic::error(
                codes::DUPLICATE_CLASS,
                format!("Class `{name}` already exists"),
                ctx.file.class(id).name_span,
            ));
        }
    }
    Ok(())
}

pub(crate) fn check_class_members(
    ctx: &mut CheckContext<'_>,
    class_id: ClassId,
) -> Result<(), Cancelled> {
    let class = ctx.file.class(class_id);
    let env = ctx.env();

    // Identical erased signatures within one class.
    let mut by_signature: HashMap<(Name, bool, Vec<String>), Vec<MethodId>> = HashMap::new();
    for &method_id in &class.methods {
        ctx.cancel.check()?;
        let method = ctx.file.method(method_id);
        let Some(loc) = ctx.map().method_loc(method_id) else {
            continue;
        };
        let Some(class_def) = env.class(loc.class) else {
            continue;
        };
        let def = if loc.is_constructor {
            class_def.constructors.get(loc.index)
        } else {
            class_def.methods.get(loc.index)
        };
        let Some(def) = def else { continue };
        by_signature
            .entry((
                method.name.clone(),
                method.is_constructor,
                erased_signature(env, def),
            ))
            .or_default()
            .push(method_id);
    }

    for ((name, _, signature), ids) in &by_signature {
        if ids.len() < 2 {
            continue;
        }
        for &id in ids {
            ctx.report(
                Diagnostic::error(
                    codes::DUPLICATE_METHOD,
                    format!("Method `{name}({})` is already defined", signature.join(", ")),
                    ctx.file.method(id).name_span,
                )
                .with_fix(FixKind::RemoveDuplicate),
            );
        }
    }

    // Same-name overloads mixing private with non-private visibility.
    let mut by_name: HashMap<Name, Vec<MethodId>> = HashMap::new();
    for &method_id in &class.methods {
        let method = ctx.file.method(method_id);
        if method.is_constructor {
            continue;
        }
        by_name.entry(method.name.clone()).or_default().push(method_id);
    }
    for (name, ids) in by_name {
        if ids.len() < 2 {
            continue;
        }
        let private_count = ids
            .iter()
            .filter(|&&id| ctx.file.method(id).modifiers.has(Modifier::Private))
            .count();
        if private_count == 0 || private_count == ids.len() {
            continue;
        }
        for id in ids {
            ctx.report(Diagnostic::warning(
                codes::MIXED_METHOD_VISIBILITY,
                format!("Mixed private and public/protected overloads of `{name}`"),
                ctx.file.method(id).name_span,
            ));
        }
    }
    Ok(())
}
