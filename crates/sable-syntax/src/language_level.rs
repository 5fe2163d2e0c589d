//! Sable language versions and feature availability.
//!
//! The parser always accepts the newest grammar. Which version introduced which
//! construct is decided here and enforced by the post-parse feature gate.

use std::fmt;
use std::str::FromStr;

/// The language mode a file is compiled under.
///
/// - `major`: the language release (7, 8, 9, …)
/// - `preview`: whether preview features of the *next* release are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageVersion {
    pub major: u16,
    pub preview: bool,
}

impl LanguageVersion {
    pub const V7: Self = Self::stable(7);
    pub const V8: Self = Self::stable(8);
    pub const V9: Self = Self::stable(9);
    pub const V10: Self = Self::stable(10);
    pub const V11: Self = Self::stable(11);
    pub const LATEST: Self = Self::V11;

    const fn stable(major: u16) -> Self {
        Self {
            major,
            preview: false,
        }
    }

    #[inline]
    pub const fn with_preview(self, preview: bool) -> Self {
        Self { preview, ..self }
    }

    pub fn availability(self, feature: Feature) -> FeatureAvailability {
        if self.major >= feature.stable_since() {
            FeatureAvailability::Stable
        } else if feature
            .preview_since()
            .is_some_and(|since| self.major >= since)
        {
            FeatureAvailability::Preview
        } else {
            FeatureAvailability::Unavailable
        }
    }

    /// Is the feature usable in this configuration? (applies `preview`)
    pub fn is_enabled(self, feature: Feature) -> bool {
        match self.availability(feature) {
            FeatureAvailability::Stable => true,
            FeatureAvailability::Preview => self.preview,
            FeatureAvailability::Unavailable => false,
        }
    }
}

impl Default for LanguageVersion {
    fn default() -> Self {
        LanguageVersion::LATEST
    }
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.preview {
            write!(f, "{}-preview", self.major)
        } else {
            write!(f, "{}", self.major)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language version `{0}` (expected 7-11, `latest`, or a `-preview` suffix)")]
pub struct ParseLanguageVersionError(String);

impl FromStr for LanguageVersion {
    type Err = ParseLanguageVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (base, preview) = match trimmed.strip_suffix("-preview") {
            Some(base) => (base, true),
            None => (trimmed, false),
        };
        let version = match base {
            "latest" => LanguageVersion::LATEST,
            _ => match base.parse::<u16>() {
                Ok(major) if (7..=LanguageVersion::LATEST.major).contains(&major) => {
                    LanguageVersion::stable(major)
                }
                _ => return Err(ParseLanguageVersionError(s.to_string())),
            },
        };
        Ok(version.with_preview(preview))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Tuples,                   // 7
    SwitchExpressions,        // 8
    RangesAndIndices,         // 8
    NullCoalescingAssignment, // 8
    AsyncStreams,             // 8
    UsingDeclarations,        // 8
    Records,                  // 9
    TargetTypedNew,           // 9
    TopLevelStatements,       // 9
    PatternCombinators,       // 9
    RelationalPatterns,       // 9
    FileScopedNamespaces,     // 10
    GlobalUsings,             // 10
    RecordStructs,            // 10
    RawStringLiterals,        // 11 (preview in 10)
    RequiredMembers,          // 11 (preview in 10)
    FileLocalTypes,           // 11
}

impl Feature {
    pub const fn display_name(self) -> &'static str {
        match self {
            Feature::Tuples => "tuples",
            Feature::SwitchExpressions => "switch expressions",
            Feature::RangesAndIndices => "ranges and indices",
            Feature::NullCoalescingAssignment => "null-coalescing assignment (`??=`)",
            Feature::AsyncStreams => "`await foreach` and `await using`",
            Feature::UsingDeclarations => "`using` declarations",
            Feature::Records => "records",
            Feature::TargetTypedNew => "target-typed `new()`",
            Feature::TopLevelStatements => "top-level statements",
            Feature::PatternCombinators => "`and`, `or` and `not` patterns",
            Feature::RelationalPatterns => "relational patterns",
            Feature::FileScopedNamespaces => "file-scoped namespaces",
            Feature::GlobalUsings => "`global using` directives",
            Feature::RecordStructs => "record structs",
            Feature::RawStringLiterals => "raw string literals",
            Feature::RequiredMembers => "`required` members",
            Feature::FileLocalTypes => "`file` types",
        }
    }

    pub const fn stable_since(self) -> u16 {
        match self {
            Feature::Tuples => 7,
            Feature::SwitchExpressions
            | Feature::RangesAndIndices
            | Feature::NullCoalescingAssignment
            | Feature::AsyncStreams
            | Feature::UsingDeclarations => 8,
            Feature::Records
            | Feature::TargetTypedNew
            | Feature::TopLevelStatements
            | Feature::PatternCombinators
            | Feature::RelationalPatterns => 9,
            Feature::FileScopedNamespaces | Feature::GlobalUsings | Feature::RecordStructs => 10,
            Feature::RawStringLiterals | Feature::RequiredMembers | Feature::FileLocalTypes => 11,
        }
    }

    pub const fn preview_since(self) -> Option<u16> {
        match self {
            Feature::RawStringLiterals | Feature::RequiredMembers => Some(10),
            _ => None,
        }
    }
}

/// Whether the *language* has a feature in this major version, independent of
/// whether preview is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureAvailability {
    Unavailable,
    Preview,
    Stable,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_version_strings() {
        assert_eq!("10".parse::<LanguageVersion>(), Ok(LanguageVersion::V10));
        assert_eq!(
            "11-preview".parse::<LanguageVersion>(),
            Ok(LanguageVersion::V11.with_preview(true))
        );
        assert_eq!("latest".parse::<LanguageVersion>(), Ok(LanguageVersion::LATEST));
        assert!("6".parse::<LanguageVersion>().is_err());
        assert!("eleven".parse::<LanguageVersion>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for version in [LanguageVersion::V7, LanguageVersion::V10.with_preview(true)] {
            assert_eq!(version.to_string().parse::<LanguageVersion>(), Ok(version));
        }
    }

    #[test]
    fn preview_features_need_the_flag() {
        let v10 = LanguageVersion::V10;
        assert_eq!(
            v10.availability(Feature::RawStringLiterals),
            FeatureAvailability::Preview
        );
        assert!(!v10.is_enabled(Feature::RawStringLiterals));
        assert!(v10.with_preview(true).is_enabled(Feature::RawStringLiterals));
        assert_eq!(
            v10.availability(Feature::FileLocalTypes),
            FeatureAvailability::Unavailable
        );
    }

    #[test]
    fn latest_enables_everything() {
        for feature in [
            Feature::Tuples,
            Feature::Records,
            Feature::GlobalUsings,
            Feature::FileLocalTypes,
        ] {
            assert!(LanguageVersion::LATEST.is_enabled(feature));
        }
        assert!(!LanguageVersion::V7.is_enabled(Feature::SwitchExpressions));
    }
}
