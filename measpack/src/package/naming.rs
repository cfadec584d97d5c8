//! Package naming and target architecture conventions.
//!
//! This module is the single source of truth for how package identifiers and
//! architecture strings are derived:
//! - Package identifiers (e.g., `sample-meas`)
//! - Architecture strings (e.g., `windows_x64`)

use std::sync::OnceLock;

use regex::Regex;

fn separator_run() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[_ ]+").expect("separator pattern is valid"))
}

/// Normalize a project name into a package identifier.
///
/// Runs of spaces and underscores collapse into a single hyphen and the
/// result is lowercased.
///
/// # Examples
///
/// ```
/// use measpack::package::normalize_package_name;
///
/// assert_eq!(normalize_package_name("Sample_Meas"), "sample-meas");
/// assert_eq!(normalize_package_name("My  Cool__Plugin"), "my-cool-plugin");
/// assert_eq!(normalize_package_name("already-fine"), "already-fine");
/// ```
pub fn normalize_package_name(name: &str) -> String {
    separator_run().replace_all(name, "-").to_lowercase()
}

/// Map a processor name to its package architecture token.
///
/// Unknown names pass through lowercased.
///
/// # Examples
///
/// ```
/// use measpack::package::normalize_cpu;
///
/// assert_eq!(normalize_cpu("AMD64"), "x64");
/// assert_eq!(normalize_cpu("x86_64"), "x64");
/// assert_eq!(normalize_cpu("i686"), "x86");
/// assert_eq!(normalize_cpu("aarch64"), "arm64");
/// assert_eq!(normalize_cpu("riscv64"), "riscv64");
/// ```
pub fn normalize_cpu(machine: &str) -> String {
    let machine = machine.to_lowercase();
    match machine.as_str() {
        "amd64" | "x86_64" => "x64".to_string(),
        "x86" | "i386" | "i686" => "x86".to_string(),
        "arm64" | "aarch64" => "arm64".to_string(),
        "arm" | "armv7l" => "arm".to_string(),
        _ => machine,
    }
}

/// Build an architecture string from an OS name and processor name.
///
/// # Format
///
/// `{os}_{cpu}` with both parts lowercased.
///
/// # Examples
///
/// ```
/// use measpack::package::target_architecture;
///
/// assert_eq!(target_architecture("Windows", "AMD64"), "windows_x64");
/// assert_eq!(target_architecture("Linux", "aarch64"), "linux_arm64");
/// ```
pub fn target_architecture(os: &str, machine: &str) -> String {
    format!("{}_{}", os.to_lowercase(), normalize_cpu(machine))
}

/// Architecture string for the machine running the packager.
pub fn host_architecture() -> String {
    let os = match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    };
    target_architecture(os, std::env::consts::ARCH)
}
