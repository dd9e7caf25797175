//! Groovy language level + feature availability model.
//!
//! Groove analyzes a superset Groovy grammar and gates language features on
//! the configured per-project language level. This module is the canonical
//! source of truth for "which Groovy version enables which feature?", used by
//! syntax feature gating and semantic analysis.

/// The effective Groovy language mode for a module/file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroovyLanguageLevel {
    pub major: u8,
    pub minor: u8,
}

impl GroovyLanguageLevel {
    pub const GROOVY_1_8: Self = Self { major: 1, minor: 8 };
    pub const GROOVY_2_0: Self = Self { major: 2, minor: 0 };
    pub const GROOVY_2_3: Self = Self { major: 2, minor: 3 };
    pub const GROOVY_2_5: Self = Self { major: 2, minor: 5 };
    pub const GROOVY_3_0: Self = Self { major: 3, minor: 0 };
    pub const GROOVY_4_0: Self = Self { major: 4, minor: 0 };

    pub fn availability(self, feature: GroovyFeature) -> FeatureAvailability {
        match feature.introduced_in() {
            Some(since) if self >= since => FeatureAvailability::Stable,
            _ => FeatureAvailability::Unavailable,
        }
    }

    pub fn is_enabled(self, feature: GroovyFeature) -> bool {
        self.availability(feature) == FeatureAvailability::Stable
    }

    #[inline]
    pub fn supports_traits(self) -> bool {
        self.is_enabled(GroovyFeature::TraitDeclarations)
    }

    /// From 2.0 on, top-level classes may not be `private` or `protected`.
    #[inline]
    pub fn restricts_top_level_visibility(self) -> bool {
        self.is_enabled(GroovyFeature::RestrictedTopLevelVisibility)
    }

    #[inline]
    pub fn supports_do_while(self) -> bool {
        self.is_enabled(GroovyFeature::DoWhileLoops)
    }

    #[inline]
    pub fn supports_var_keyword(self) -> bool {
        self.is_enabled(GroovyFeature::VarKeyword)
    }

    #[inline]
    pub fn supports_records(self) -> bool {
        self.is_enabled(GroovyFeature::Records)
    }

    #[inline]
    pub fn supports_sealed(self) -> bool {
        self.is_enabled(GroovyFeature::SealedClasses)
    }
}

impl Default for GroovyLanguageLevel {
    fn default() -> Self {
        GroovyLanguageLevel::GROOVY_4_0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroovyFeature {
    /// Static compilation annotations (`@CompileStatic`, `@TypeChecked`).
    StaticCompilation, // Groovy 2.0+
    /// Top-level classes may no longer be `private`/`protected`.
    RestrictedTopLevelVisibility, // Groovy 2.0+
    TraitDeclarations,       // Groovy 2.3+
    MacroMethods,            // Groovy 2.5+
    DoWhileLoops,            // Groovy 3.0+
    LambdaSyntax,            // Groovy 3.0+
    MethodReferences,        // Groovy 3.0+
    VarKeyword,              // Groovy 3.0+
    SafeIndexing,            // Groovy 3.0+
    Records,                 // Groovy 4.0+
    SealedClasses,           // Groovy 4.0+
    SwitchExpressions,       // Groovy 4.0+
}

impl GroovyFeature {
    pub const fn introduced_in(self) -> Option<GroovyLanguageLevel> {
        use GroovyLanguageLevel as L;
        match self {
            GroovyFeature::StaticCompilation => Some(L::GROOVY_2_0),
            GroovyFeature::RestrictedTopLevelVisibility => Some(L::GROOVY_2_0),
            GroovyFeature::TraitDeclarations => Some(L::GROOVY_2_3),
            GroovyFeature::MacroMethods => Some(L::GROOVY_2_5),
            GroovyFeature::DoWhileLoops => Some(L::GROOVY_3_0),
            GroovyFeature::LambdaSyntax => Some(L::GROOVY_3_0),
            GroovyFeature::MethodReferences => Some(L::GROOVY_3_0),
            GroovyFeature::VarKeyword => Some(L::GROOVY_3_0),
            GroovyFeature::SafeIndexing => Some(L::GROOVY_3_0),
            GroovyFeature::Records => Some(L::GROOVY_4_0),
            GroovyFeature::SealedClasses => Some(L::GROOVY_4_0),
            GroovyFeature::SwitchExpressions => Some(L::GROOVY_4_0),
        }
    }

    pub const fn diagnostic_code(self) -> &'static str {
        match self {
            GroovyFeature::StaticCompilation => "GROOVY_FEATURE_STATIC_COMPILATION",
            GroovyFeature::RestrictedTopLevelVisibility => {
                "GROOVY_FEATURE_RESTRICTED_TOP_LEVEL_VISIBILITY"
            }
            GroovyFeature::TraitDeclarations => "GROOVY_FEATURE_TRAITS",
            GroovyFeature::MacroMethods => "GROOVY_FEATURE_MACRO_METHODS",
            GroovyFeature::DoWhileLoops => "GROOVY_FEATURE_DO_WHILE",
            GroovyFeature::LambdaSyntax => "GROOVY_FEATURE_LAMBDAS",
            GroovyFeature::MethodReferences => "GROOVY_FEATURE_METHOD_REFERENCES",
            GroovyFeature::VarKeyword => "GROOVY_FEATURE_VAR",
            GroovyFeature::SafeIndexing => "GROOVY_FEATURE_SAFE_INDEXING",
            GroovyFeature::Records => "GROOVY_FEATURE_RECORDS",
            GroovyFeature::SealedClasses => "GROOVY_FEATURE_SEALED_CLASSES",
            GroovyFeature::SwitchExpressions => "GROOVY_FEATURE_SWITCH_EXPRESSIONS",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            GroovyFeature::StaticCompilation => "static compilation",
            GroovyFeature::RestrictedTopLevelVisibility => "restricted top-level visibility",
            GroovyFeature::TraitDeclarations => "trait declarations",
            GroovyFeature::MacroMethods => "macro methods",
            GroovyFeature::DoWhileLoops => "`do`/`while` loops",
            GroovyFeature::LambdaSyntax => "Java-style lambdas",
            GroovyFeature::MethodReferences => "method references (`::`)",
            GroovyFeature::VarKeyword => "local variable declarations with `var`",
            GroovyFeature::SafeIndexing => "safe indexing (`?[`)",
            GroovyFeature::Records => "record classes",
            GroovyFeature::SealedClasses => "sealed classes",
            GroovyFeature::SwitchExpressions => "switch expressions",
        }
    }
}

/// Whether the language supports a feature at a given level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureAvailability {
    Unavailable,
    Stable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering_gates_features() {
        let old = GroovyLanguageLevel::GROOVY_1_8;
        assert!(!old.supports_traits());
        assert!(!old.restricts_top_level_visibility());

        let modern = GroovyLanguageLevel::default();
        assert!(modern.supports_traits());
        assert!(modern.restricts_top_level_visibility());
        assert!(modern.supports_records());

        assert!(GroovyLanguageLevel::GROOVY_2_0.restricts_top_level_visibility());
        assert!(!GroovyLanguageLevel::GROOVY_2_0.supports_traits());
        assert!(GroovyLanguageLevel::GROOVY_2_3.supports_traits());
    }

    #[test]
    fn minor_versions_compare() {
        assert!(GroovyLanguageLevel::GROOVY_2_3 > GroovyLanguageLevel::GROOVY_2_0);
        assert!(GroovyLanguageLevel::GROOVY_3_0 > GroovyLanguageLevel::GROOVY_2_5);
    }
}
