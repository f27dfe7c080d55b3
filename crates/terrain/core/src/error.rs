//! Common error infrastructure for terrain-core.
//!
//! Domain-specific errors (`EngineError`, `CatalogError`) live next to the
//! code that raises them; this module provides the shared severity taxonomy
//! and the trait every error type implements.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Validation**: invalid input (bad position, unknown terrain), reject without retry
/// - **Data**: terrain definitions that cannot produce a consistent map
/// - **Internal**: unexpected state inconsistencies that require investigation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: position outside the layer, unknown terrain id
    Validation,

    /// Authoring error in the terrain catalog.
    ///
    /// Examples: correction loop that cannot converge, dangling terrain reference.
    /// The current map operation should be aborted and reported; the process keeps running.
    Data,

    /// Internal error - unexpected state inconsistency.
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Data => "data",
            Self::Internal => "internal",
        }
    }

    /// Returns true if the error points at catalog content rather than the caller.
    pub const fn is_data(&self) -> bool {
        matches!(self, Self::Data)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all terrain-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity by who has to fix it, not by impact
pub trait TerrainError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for diagnostics and tests. Defaults to the type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
