//! Dependency edges as emitted by source parsers.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ModuleId;

/// How one module refers to another.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Module import (`import`, `use`).
    Import,
    /// Runtime require (`require()`).
    Require,
    /// Textual include (`#include`).
    Include,
    /// Type inheritance.
    Inherit,
    /// Composition / embedding.
    Compose,
    /// Direct call into another module.
    Call,
}

impl DependencyKind {
    /// Multiplier applied to the strength base weight.
    #[must_use]
    pub fn weight_factor(self) -> f64 {
        match self {
            Self::Require => 1.2,
            Self::Include => 0.8,
            Self::Inherit => 1.5,
            Self::Import | Self::Compose | Self::Call => 1.0,
        }
    }

    /// Lowercase label used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Require => "require",
            Self::Include => "include",
            Self::Inherit => "inherit",
            Self::Compose => "compose",
            Self::Call => "call",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How tightly two modules are coupled.
///
/// Ordered from loosest to tightest so `max()` picks the strongest coupling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStrength {
    /// Feature-gated or lazily loaded.
    Optional,
    /// Used but replaceable.
    Weak,
    /// Required at build or load time.
    Strong,
}

impl DependencyStrength {
    /// Base edge weight before kind and external adjustments.
    #[must_use]
    pub fn base_weight(self) -> f64 {
        match self {
            Self::Strong => 3.0,
            Self::Weak => 1.0,
            Self::Optional => 0.3,
        }
    }

    /// Scales a module's impact score by how much of a change leaks through.
    #[must_use]
    pub fn impact_multiplier(self) -> f64 {
        match self {
            Self::Strong => 1.0,
            Self::Weak => 0.7,
            Self::Optional => 0.4,
        }
    }

    /// Lowercase label used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Weak => "weak",
            Self::Optional => "optional",
        }
    }
}

impl fmt::Display for DependencyStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the source the dependency was declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SourceLocation {
    /// File containing the declaration.
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    #[serde(default)]
    pub column: u32,
}

/// A directed dependency `from → to`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DependencyEdge {
    /// The depending module.
    pub from: ModuleId,
    /// The module depended upon.
    pub to: ModuleId,
    /// Kind of reference.
    #[serde(alias = "type")]
    pub kind: DependencyKind,
    /// Coupling strength.
    pub strength: DependencyStrength,
    /// Language of the declaring source.
    pub language: String,
    /// Whether `to` lives outside the repository.
    #[serde(default)]
    pub external: bool,
    /// Declaration site, when the parser reports one.
    #[serde(default, alias = "location", skip_serializing_if = "Option::is_none")]
    pub source_location: Option<SourceLocation>,
    /// Version constraint for external dependencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl DependencyEdge {
    /// Creates an internal edge with no location or version.
    pub fn new(
        from: impl Into<ModuleId>,
        to: impl Into<ModuleId>,
        kind: DependencyKind,
        strength: DependencyStrength,
        language: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
            strength,
            language: language.into(),
            external: false,
            source_location: None,
            version: None,
        }
    }

    /// Marks the edge as pointing outside the repository.
    #[must_use]
    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Deterministic coupling weight.
    ///
    /// Strength base (3.0 / 1.0 / 0.3) times the kind factor, halved for
    /// external edges.
    #[must_use]
    pub fn weight(&self) -> f64 {
        let weight = self.strength.base_weight() * self.kind.weight_factor();
        if self.external { weight * 0.5 } else { weight }
    }

    /// Returns a reason the edge cannot be analyzed, if any.
    ///
    /// Self-dependencies and blank endpoints are rejected.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<String> {
        if self.from.as_str().trim().is_empty() || self.to.as_str().trim().is_empty() {
            return Some("edge has an empty endpoint".to_string());
        }
        if self.from == self.to {
            return Some(format!("self dependency on {}", self.from));
        }
        None
    }
}
