//! Package description and template generation.
//!
//! This module turns a validated plug-in directory into the on-disk layout
//! the packaging tool expects.
//!
//! # Overview
//!
//! - **PackageDescription**: identity of one package (name, version, author)
//! - **resolve**: reads `pyproject.toml` into a `PackageDescription`
//! - **TemplateGenerator**: writes the template directory for a description
//! - **naming**: package identifier and architecture conventions
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use measpack::package::{resolve, TemplateGenerator};
//!
//! let plugin = Path::new("plugins/sample_meas");
//! let description = resolve(plugin)?;
//! let template = TemplateGenerator::default()
//!     .generate(Path::new("build"), plugin, &description)?;
//! println!("template ready at {}", template.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod description;
mod error;
mod metadata;
mod naming;
mod template;

pub use description::{PackageDescription, DEFAULT_AUTHOR, DEFAULT_DESCRIPTION, DEFAULT_VERSION};
pub use error::{MetadataError, MetadataResult, TemplateError, TemplateResult};
pub use metadata::{parse_metadata, resolve};
pub use naming::{host_architecture, normalize_cpu, normalize_package_name, target_architecture};
pub use template::{is_excluded, TemplateGenerator, DEFAULT_INSTALL_ROOT, EXCLUDED_ENTRIES};
