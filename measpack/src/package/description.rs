//! Resolved package identity.

/// Description used when the project metadata has none.
pub const DEFAULT_DESCRIPTION: &str = "Python Measurement Plug-In";

/// Version used when the project metadata has none.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Maintainer used when the project metadata lists no authors.
pub const DEFAULT_AUTHOR: &str = "National Instruments";

/// Everything needed to describe one package build.
///
/// Produced once per plug-in by [`resolve`](super::resolve) and not
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescription {
    /// Plug-in directory name, shown to users as the display name.
    pub plugin_name: String,

    /// Normalized package identifier (lowercase, hyphen separated).
    pub package_name: String,

    /// Package version string.
    pub version: String,

    /// One-line package description.
    pub description: String,

    /// Comma-separated maintainer list.
    pub author: String,
}
