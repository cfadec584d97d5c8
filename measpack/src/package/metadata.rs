//! Project metadata resolution from `pyproject.toml`.
//!
//! Metadata is read from the `[tool.poetry]` table. Projects that use the
//! standard `[project]` table instead are accepted as well. Any field that
//! is absent or blank falls back to a default, so a minimal project file is
//! enough to build a package.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::description::{
    PackageDescription, DEFAULT_AUTHOR, DEFAULT_DESCRIPTION, DEFAULT_VERSION,
};
use super::error::{MetadataError, MetadataResult};
use super::naming::normalize_package_name;
use crate::plugin::{self, METADATA_FILE};

#[derive(Debug, Default, Deserialize)]
struct PyProject {
    #[serde(default)]
    tool: Option<ToolTable>,
    #[serde(default)]
    project: Option<ProjectTable>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolTable {
    #[serde(default)]
    poetry: Option<ProjectTable>,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectTable {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    authors: Option<Authors>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Authors {
    One(String),
    Many(Vec<AuthorEntry>),
}

/// Poetry lists authors as strings, PEP 621 as `{ name, email }` tables.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AuthorEntry {
    Text(String),
    Table {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl AuthorEntry {
    fn display(&self) -> Option<String> {
        match self {
            Self::Text(text) => non_blank(Some(text)),
            Self::Table { name, email } => {
                non_blank(name.as_ref()).or_else(|| non_blank(email.as_ref()))
            }
        }
    }
}

impl Authors {
    fn joined(&self) -> Option<String> {
        match self {
            Self::One(text) => non_blank(Some(text)),
            Self::Many(entries) => {
                let names: Vec<String> = entries.iter().filter_map(AuthorEntry::display).collect();
                if names.is_empty() {
                    None
                } else {
                    Some(names.join(","))
                }
            }
        }
    }
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Resolve the package description for a plug-in directory.
///
/// # Errors
///
/// - [`MetadataError::MissingMetadataFile`] if `pyproject.toml` is absent
/// - [`MetadataError::ReadFailed`] if it cannot be read
/// - [`MetadataError::MalformedMetadata`] if it is not valid TOML or has
///   neither a `[tool.poetry]` nor a `[project]` table
pub fn resolve(plugin_dir: &Path) -> MetadataResult<PackageDescription> {
    let path = plugin_dir.join(METADATA_FILE);
    let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MetadataError::MissingMetadataFile(plugin_dir.to_path_buf()),
        _ => MetadataError::ReadFailed {
            path: path.clone(),
            source: e,
        },
    })?;

    let description = parse_metadata(&plugin::plugin_name(plugin_dir), &content, &path)?;
    debug!(
        plugin = %description.plugin_name,
        package = %description.package_name,
        version = %description.version,
        "Resolved package metadata"
    );
    Ok(description)
}

/// Build a package description from metadata file contents.
///
/// `source` is only used to label errors.
pub fn parse_metadata(
    plugin_name: &str,
    content: &str,
    source: &Path,
) -> MetadataResult<PackageDescription> {
    let pyproject: PyProject =
        toml::from_str(content).map_err(|e| MetadataError::MalformedMetadata {
            path: source.to_path_buf(),
            reason: e.message().to_string(),
        })?;

    let table = pyproject
        .tool
        .and_then(|tool| tool.poetry)
        .or(pyproject.project)
        .ok_or_else(|| MetadataError::MalformedMetadata {
            path: source.to_path_buf(),
            reason: "no [tool.poetry] or [project] table".to_string(),
        })?;

    let name = or_default(non_blank(table.name.as_ref()), "name", plugin_name);
    let version = or_default(non_blank(table.version.as_ref()), "version", DEFAULT_VERSION);
    let description = or_default(
        non_blank(table.description.as_ref()),
        "description",
        DEFAULT_DESCRIPTION,
    );
    let author = or_default(
        table.authors.as_ref().and_then(Authors::joined),
        "author",
        DEFAULT_AUTHOR,
    );

    Ok(PackageDescription {
        plugin_name: plugin_name.to_string(),
        package_name: normalize_package_name(&name),
        version,
        description,
        author,
    })
}

fn or_default(value: Option<String>, field: &str, default: &str) -> String {
    value.unwrap_or_else(|| {
        info!(
            "No package {} provided in 'pyproject.toml', using default {} '{}'.",
            field, field, default
        );
        default.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn parse(content: &str) -> MetadataResult<PackageDescription> {
        parse_metadata("Plugin_Dir", content, &PathBuf::from("pyproject.toml"))
    }

    #[test]
    fn test_resolve_full_poetry_table() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("sample_meas");
        fs::create_dir(&dir).unwrap();
        fs::write(
            dir.join("pyproject.toml"),
            r#"
[tool.poetry]
name = "Sample_Meas"
version = "2.0.0"
description = "Sample"
authors = ["A", "B"]
"#,
        )
        .unwrap();

        let desc = resolve(&dir).unwrap();
        assert_eq!(desc.plugin_name, "sample_meas");
        assert_eq!(desc.package_name, "sample-meas");
        assert_eq!(desc.version, "2.0.0");
        assert_eq!(desc.description, "Sample");
        assert_eq!(desc.author, "A,B");
    }

    #[test]
    fn test_defaults_for_empty_poetry_table() {
        let desc = parse("[tool.poetry]\n").unwrap();
        assert_eq!(desc.package_name, "plugin-dir");
        assert_eq!(desc.version, DEFAULT_VERSION);
        assert_eq!(desc.description, DEFAULT_DESCRIPTION);
        assert_eq!(desc.author, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let desc = parse(
            "[tool.poetry]\nname = \"  \"\nversion = \"\"\ndescription = \"\"\nauthors = []\n",
        )
        .unwrap();
        assert_eq!(desc.package_name, "plugin-dir");
        assert_eq!(desc.version, DEFAULT_VERSION);
        assert_eq!(desc.author, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_project_table_with_author_tables() {
        let desc = parse(
            r#"
[project]
name = "dc measurement"
version = "0.3.1"
authors = [{ name = "Jane" }, { email = "ops@example.com" }]
"#,
        )
        .unwrap();
        assert_eq!(desc.package_name, "dc-measurement");
        assert_eq!(desc.version, "0.3.1");
        assert_eq!(desc.author, "Jane,ops@example.com");
    }

    #[test]
    fn test_poetry_table_takes_precedence() {
        let desc = parse(
            "[project]\nname = \"from-project\"\n\n[tool.poetry]\nname = \"from-poetry\"\n",
        )
        .unwrap();
        assert_eq!(desc.package_name, "from-poetry");
    }

    #[test]
    fn test_single_author_string() {
        let desc = parse("[tool.poetry]\nauthors = \"Solo Dev <solo@example.com>\"\n").unwrap();
        assert_eq!(desc.author, "Solo Dev <solo@example.com>");
    }

    #[test]
    fn test_invalid_toml_is_malformed() {
        let result = parse("[tool.poetry\nname = ");
        assert!(matches!(
            result,
            Err(MetadataError::MalformedMetadata { .. })
        ));
    }

    #[test]
    fn test_wrongly_typed_field_is_malformed() {
        let result = parse("[tool.poetry]\nversion = 2\n");
        assert!(matches!(
            result,
            Err(MetadataError::MalformedMetadata { .. })
        ));
    }

    #[test]
    fn test_missing_project_table_is_malformed() {
        let result = parse("[build-system]\nrequires = [\"poetry-core\"]\n");
        match result {
            Err(MetadataError::MalformedMetadata { reason, .. }) => {
                assert!(reason.contains("tool.poetry"));
            }
            other => panic!("expected MalformedMetadata, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_metadata_file() {
        let temp = TempDir::new().unwrap();
        let result = resolve(temp.path());
        assert!(matches!(result, Err(MetadataError::MissingMetadataFile(_))));
    }
}
