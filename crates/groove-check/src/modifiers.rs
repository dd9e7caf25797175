//! Modifier legality: per-declaration-kind allow-lists, duplicates, and
//! conflicting combinations.

use groove_core::{Cancelled, Diagnostic, FixKind};
use groove_syntax::{ClassId, ClassKind, FieldId, MethodId, Modifier, ModifierList};

use crate::{codes, CheckContext};

const TYPE_MODIFIERS: &[Modifier] = &[
    Modifier::Public,
    Modifier::Protected,
    Modifier::Private,
    Modifier::Static,
    Modifier::Final,
    Modifier::Abstract,
    Modifier::Strictfp,
];

const METHOD_MODIFIERS: &[Modifier] = &[
    Modifier::Public,
    Modifier::Protected,
    Modifier::Private,
    Modifier::Static,
    Modifier::Final,
    Modifier::Abstract,
    Modifier::Native,
    Modifier::Synchronized,
    Modifier::Strictfp,
    Modifier::Default,
];

const CONSTRUCTOR_MODIFIERS: &[Modifier] =
    &[Modifier::Public, Modifier::Protected, Modifier::Private];

const FIELD_MODIFIERS: &[Modifier] = &[
    Modifier::Public,
    Modifier::Protected,
    Modifier::Private,
    Modifier::Static,
    Modifier::Final,
    Modifier::Transient,
    Modifier::Volatile,
];

pub(crate) fn check_class(ctx: &mut CheckContext<'_>, class_id: ClassId) -> Result<(), Cancelled> {
    let class = ctx.file.class(class_id);

    check_duplicates(ctx, &class.modifiers);
    check_visibility_conflicts(ctx, &class.modifiers);
    check_allow_list(ctx, &class.modifiers, TYPE_MODIFIERS, declaration_word(class.kind));
    check_conflict(ctx, &class.modifiers, Modifier::Abstract, Modifier::Final);

    if ctx.config.language_level.restricts_top_level_visibility()
        && ctx.file.top_level_classes().contains(&class_id)
    {
        for modifier in [Modifier::Private, Modifier::Protected] {
            if let Some(span) = class.modifiers.span_of(modifier) {
                ctx.report(
                    Diagnostic::error(
                        codes::TOP_LEVEL_VISIBILITY,
                        format!("Top-level class may not be `{}`", modifier.as_str()),
                        span,
                    )
                    .with_fix(FixKind::RemoveModifier),
                );
            }
        }
    }

    for &method_id in &class.methods {
        ctx.cancel.check()?;
        check_method(ctx, method_id);
    }
    for &field_id in &class.fields {
        check_field(ctx, field_id);
    }
    Ok(())
}

fn check_method(ctx: &mut CheckContext<'_>, method_id: MethodId) {
    let method = ctx.file.method(method_id);
    let mods = &method.modifiers;

    check_duplicates(ctx, mods);
    check_visibility_conflicts(ctx, mods);
    if method.is_constructor {
        check_allow_list(ctx, mods, CONSTRUCTOR_MODIFIERS, "constructor");
    } else {
        check_allow_list(ctx, mods, METHOD_MODIFIERS, "method");
    }

    check_conflict(ctx, mods, Modifier::Abstract, Modifier::Final);
    check_conflict(ctx, mods, Modifier::Abstract, Modifier::Static);
    check_conflict(ctx, mods, Modifier::Abstract, Modifier::Private);

    if method.body.is_some() {
        if let Some(span) = mods.span_of(Modifier::Native) {
            ctx.report(
                Diagnostic::error(
                    codes::NATIVE_WITH_BODY,
                    "Method with modifier `native` cannot have a body",
                    span,
                )
                .with_fix(FixKind::RemoveModifier),
            );
        }
        if let Some(span) = mods.span_of(Modifier::Abstract) {
            ctx.report(
                Diagnostic::error(
                    codes::ABSTRACT_WITH_BODY,
                    "Abstract method cannot have a body",
                    span,
                )
                .with_fix(FixKind::RemoveModifier),
            );
        }
    }
}

fn check_field(ctx: &mut CheckContext<'_>, field_id: FieldId) {
    let field = ctx.file.field(field_id);
    check_duplicates(ctx, &field.modifiers);
    check_visibility_conflicts(ctx, &field.modifiers);
    check_allow_list(ctx, &field.modifiers, FIELD_MODIFIERS, "field");
    check_conflict(ctx, &field.modifiers, Modifier::Final, Modifier::Volatile);
}

fn declaration_word(kind: ClassKind) -> &'static str {
    match kind {
        ClassKind::Class => "class",
        ClassKind::Interface => "interface",
        ClassKind::Trait => "trait",
        ClassKind::Enum => "enum",
        ClassKind::Annotation => "annotation",
    }
}

fn check_duplicates(ctx: &mut CheckContext<'_>, mods: &ModifierList) {
    for (idx, entry) in mods.entries.iter().enumerate() {
        let earlier = mods.entries[..idx]
            .iter()
            .any(|e| e.modifier == entry.modifier);
        if earlier {
            ctx.report(
                Diagnostic::error(
                    codes::DUPLICATE_MODIFIER,
                    format!("Duplicate modifier `{}`", entry.modifier.as_str()),
                    entry.span,
                )
                .with_fix(FixKind::RemoveModifier),
            );
        }
    }
}

fn check_visibility_conflicts(ctx: &mut CheckContext<'_>, mods: &ModifierList) {
    let mut first: Option<Modifier> = None;
    for entry in &mods.entries {
        if !entry.modifier.is_visibility() {
            continue;
        }
        match first {
            None => first = Some(entry.modifier),
            Some(existing) if existing != entry.modifier => {
                ctx.report(
                    Diagnostic::error(
                        codes::CONFLICTING_VISIBILITY,
                        format!(
                            "Conflicting access modifiers `{}` and `{}`",
                            existing.as_str(),
                            entry.modifier.as_str()
                        ),
                        entry.span,
                    )
                    .with_fix(FixKind::RemoveModifier),
                );
            }
            // An exact repeat is the duplicate check's finding.
            Some(_) => {}
        }
    }
}

fn check_allow_list(
    ctx: &mut CheckContext<'_>,
    mods: &ModifierList,
    allowed: &[Modifier],
    what: &str,
) {
    for entry in &mods.entries {
        if !allowed.contains(&entry.modifier) {
            ctx.report(
                Diagnostic::error(
                    codes::ILLEGAL_MODIFIER,
                    format!(
                        "Modifier `{}` is not allowed on a {what}",
                        entry.modifier.as_str()
                    ),
                    entry.span,
                )
                .with_fix(FixKind::RemoveModifier),
            );
        }
    }
}

fn check_conflict(ctx: &mut CheckContext<'_>, mods: &ModifierList, a: Modifier, b: Modifier) {
    if let (Some(_), Some(span)) = (mods.span_of(a), mods.span_of(b)) {
        ctx.report(
            Diagnostic::error(
                codes::CONFLICTING_MODIFIERS,
                format!(
                    "Illegal combination of modifiers `{}` and `{}`",
                    a.as_str(),
                    b.as_str()
                ),
                span,
            )
            .with_fix(FixKind::RemoveModifier),
        );
    }
}
