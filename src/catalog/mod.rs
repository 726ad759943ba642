//! Package catalog and target expansion.
//!
//! The catalog maps each category to its packages and each package to a
//! URL template. Expanding a [`Version`] against it yields the concrete
//! [`Target`]s to probe.
//!
//! # Example
//!
//! ```
//! use pkgprobe::catalog::{TargetCatalog, TargetFilter};
//! use pkgprobe::version::Version;
//! use std::path::Path;
//!
//! let catalog = TargetCatalog::parse(
//!     "core:\n  pkgA: \"{host}/{version}/{build}/pkgA.zip\"\n",
//!     Path::new("templates.yml"),
//!     "https://h",
//! )
//! .unwrap();
//!
//! let targets = catalog.expand(&Version::new(7, 5, 0, 12), &TargetFilter::default());
//! assert_eq!(targets[0].url, "https://h/7.5.0/12/pkgA.zip");
//! ```
//!
//! Both YAML and JSON documents are accepted; JSON is read through the YAML
//! parser, which keeps declaration order for either format.

pub mod template;

pub use template::{parse_template, render, Segment, TemplateContext, TemplateError};

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{ProbeError, Result};
use crate::probe::Target;
use crate::version::Version;

/// Restricts expansion to some categories and/or package names.
///
/// Empty lists mean "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetFilter {
    pub categories: Vec<String>,
    pub names: Vec<String>,
}

impl TargetFilter {
    /// Filter on the given categories and names.
    pub fn new(categories: Vec<String>, names: Vec<String>) -> Self {
        Self { categories, names }
    }

    /// Only the given category.
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            categories: vec![category.into()],
            names: Vec::new(),
        }
    }

    /// Whether a category passes the filter.
    pub fn allows_category(&self, category: &str) -> bool {
        self.categories.is_empty() || self.categories.iter().any(|c| c == category)
    }

    /// Whether a package name passes the filter.
    pub fn allows_name(&self, name: &str) -> bool {
        self.names.is_empty() || self.names.iter().any(|n| n == name)
    }
}

/// One package entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub template: String,
}

/// All packages of one category, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogCategory {
    pub name: String,
    pub entries: Vec<CatalogEntry>,
}

/// Category → package → URL template mapping.
#[derive(Debug, Clone)]
pub struct TargetCatalog {
    source: PathBuf,
    host: String,
    categories: Vec<CatalogCategory>,
}

impl TargetCatalog {
    /// Load a catalog document from disk.
    ///
    /// # Errors
    ///
    /// Returns `CatalogLoad` if the file is missing or not a
    /// category → name → template mapping.
    pub fn load(path: &Path, host: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ProbeError::CatalogLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path, host)
    }

    /// Parse a catalog document. `source` is used for error reporting.
    pub fn parse(content: &str, source: &Path, host: &str) -> Result<Self> {
        let fail = |message: String| ProbeError::CatalogLoad {
            path: source.to_path_buf(),
            message,
        };

        let document: Value = serde_yaml::from_str(content).map_err(|e| fail(e.to_string()))?;
        let root = match document {
            Value::Mapping(map) => map,
            Value::Null => Default::default(),
            _ => return Err(fail("expected a mapping of categories".to_string())),
        };

        let mut categories = Vec::with_capacity(root.len());
        for (key, packages) in root {
            let category = key_string(&key)
                .ok_or_else(|| fail(format!("category key {:?} is not a string", key)))?;
            let Value::Mapping(packages) = packages else {
                return Err(fail(format!(
                    "category '{}' must map package names to templates",
                    category
                )));
            };

            let mut entries = Vec::with_capacity(packages.len());
            for (name, template) in packages {
                let name = key_string(&name).ok_or_else(|| {
                    fail(format!("package key {:?} in '{}' is not a string", name, category))
                })?;
                let Value::String(template) = template else {
                    return Err(fail(format!(
                        "template for '{}.{}' must be a string",
                        category, name
                    )));
                };
                entries.push(CatalogEntry { name, template });
            }

            categories.push(CatalogCategory {
                name: category,
                entries,
            });
        }

        Ok(Self {
            source: source.to_path_buf(),
            host: host.trim_end_matches('/').to_string(),
            categories,
        })
    }

    /// Where the catalog was loaded from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Host substituted for `{host}`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// All categories in declaration order.
    pub fn categories(&self) -> &[CatalogCategory] {
        &self.categories
    }

    /// Package names of a category, or `None` for an unknown category.
    pub fn names(&self, category: &str) -> Option<Vec<&str>> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map(|c| c.entries.iter().map(|e| e.name.as_str()).collect())
    }

    /// Expand a version into probe targets.
    ///
    /// Entries are produced in declaration order. An entry whose template
    /// fails to render is skipped with a warning; the rest still expand.
    pub fn expand(&self, version: &Version, filter: &TargetFilter) -> Vec<Target> {
        let context = TemplateContext::for_version(&self.host, version);
        let mut targets = Vec::new();

        for category in &self.categories {
            if !filter.allows_category(&category.name) {
                continue;
            }
            for entry in &category.entries {
                if !filter.allows_name(&entry.name) {
                    continue;
                }
                match render(&entry.template, &context) {
                    Ok(url) => targets.push(Target {
                        version: *version,
                        category: category.name.clone(),
                        name: entry.name.clone(),
                        url,
                    }),
                    Err(e) => {
                        tracing::warn!(
                            "Template formatting error for {}.{}: {}",
                            category.name,
                            entry.name,
                            e
                        );
                    }
                }
            }
        }

        targets
    }
}

fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
desktop:
  windows: "{host}/desktop/win/{version}/{build}/setup.exe"
  linux: "{host}/desktop/linux/{version}/{build}/desktop.deb"
docs:
  docker: "{host}/docs/{branch}/{version}-{build}.tar.gz"
  broken: "{host}/docs/{arch}/{build}"
"#;

    fn catalog() -> TargetCatalog {
        TargetCatalog::parse(CATALOG, Path::new("templates.yml"), "https://repo.example/").unwrap()
    }

    fn v() -> Version {
        Version::new(8, 1, 0, 42)
    }

    #[test]
    fn parse_keeps_declaration_order() {
        let catalog = catalog();
        let names: Vec<&str> = catalog.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["desktop", "docs"]);
        assert_eq!(catalog.names("desktop").unwrap(), vec!["windows", "linux"]);
        assert!(catalog.names("missing").is_none());
    }

    #[test]
    fn host_trailing_slash_is_removed() {
        assert_eq!(catalog().host(), "https://repo.example");
    }

    #[test]
    fn expand_renders_and_skips_broken_templates() {
        let targets = catalog().expand(&v(), &TargetFilter::default());
        let urls: Vec<&str> = targets.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://repo.example/desktop/win/8.1.0/42/setup.exe",
                "https://repo.example/desktop/linux/8.1.0/42/desktop.deb",
                "https://repo.example/docs/release/8.1.0-42.tar.gz",
            ]
        );
        assert!(targets.iter().all(|t| t.version == v()));
    }

    #[test]
    fn expand_applies_filters() {
        let catalog = catalog();
        let only_docs = catalog.expand(&v(), &TargetFilter::category("docs"));
        assert_eq!(only_docs.len(), 1);
        assert_eq!(only_docs[0].name, "docker");

        let by_name = catalog.expand(
            &v(),
            &TargetFilter::new(Vec::new(), vec!["linux".into(), "docker".into()]),
        );
        let names: Vec<&str> = by_name.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["linux", "docker"]);
    }

    #[test]
    fn expand_is_reproducible() {
        let catalog = catalog();
        let first = catalog.expand(&v(), &TargetFilter::default());
        let second = catalog.expand(&v(), &TargetFilter::default());
        assert_eq!(first, second);
    }

    #[test]
    fn parse_accepts_json() {
        let json = r#"{"core": {"pkgA": "https://h/{version}/{build}/pkgA.zip"}}"#;
        let catalog = TargetCatalog::parse(json, Path::new("templates.json"), "").unwrap();
        let targets = catalog.expand(&Version::new(7, 5, 0, 12), &TargetFilter::default());
        assert_eq!(targets[0].url, "https://h/7.5.0/12/pkgA.zip");
    }

    #[test]
    fn parse_rejects_non_string_template() {
        let err = TargetCatalog::parse("core:\n  pkgA: 12\n", Path::new("t.yml"), "").unwrap_err();
        assert!(matches!(err, ProbeError::CatalogLoad { .. }));
        assert!(err.to_string().contains("core.pkgA"));
    }

    #[test]
    fn parse_rejects_flat_document() {
        let err = TargetCatalog::parse("- a\n- b\n", Path::new("t.yml"), "").unwrap_err();
        assert!(matches!(err, ProbeError::CatalogLoad { .. }));
    }

    #[test]
    fn load_missing_file_is_catalog_error() {
        let temp = TempDir::new().unwrap();
        let err = TargetCatalog::load(&temp.path().join("nope.yml"), "").unwrap_err();
        assert!(matches!(err, ProbeError::CatalogLoad { .. }));
    }

    #[test]
    fn load_reads_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("templates.yml");
        fs::write(&path, CATALOG).unwrap();
        let catalog = TargetCatalog::load(&path, "https://repo.example").unwrap();
        assert_eq!(catalog.source(), path.as_path());
        assert_eq!(catalog.categories().len(), 2);
    }
}
