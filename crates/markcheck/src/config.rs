//! Suite configuration (`markcheck.yaml`).
//!
//! ```yaml
//! environments:
//!   staging: https://staging.shop.example/
//!   prod: https://shop.example/
//! promotions_path: c/we-made-too-much/n18mhd
//! workbook:
//!   path: testdata/markdown.xlsx
//! timing:
//!   lazy_load_settle_ms: 1500
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;
use url::Url;

use crate::catalog::CatalogSelectors;
use crate::result::{MarkcheckError, MarkcheckResult};
use crate::wait::Timing;
use crate::workbook::WorkbookLayout;

/// Default config file name looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "markcheck.yaml";

/// Named base URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environments(BTreeMap<String, String>);

impl Environments {
    /// Add an environment
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, base_url: impl Into<String>) -> Self {
        self.0.insert(name.into(), base_url.into());
        self
    }

    /// Environment names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Base URL of environment `name`, always ending in `/`
    pub fn resolve(&self, name: &str) -> MarkcheckResult<Url> {
        let raw = self.0.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.names().collect();
            MarkcheckError::config(format!(
                "unknown environment {name:?} (known: {})",
                known.join(", ")
            ))
        })?;
        let mut url = Url::parse(raw).map_err(|e| {
            MarkcheckError::config(format!("environment {name:?} has invalid URL {raw:?}: {e}"))
        })?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Environment name to base URL
    pub environments: Environments,
    /// Promotions listing path relative to the base URL
    pub promotions_path: Option<String>,
    /// Test-data workbook layout
    pub workbook: WorkbookLayout,
    /// Catalog selectors
    pub selectors: CatalogSelectors,
    /// Wait budgets
    pub timing: Timing,
}

impl SuiteConfig {
    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> MarkcheckResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.workbook.validate()?;
        Ok(config)
    }

    /// Load from a file
    pub fn load(path: &Path) -> MarkcheckResult<Self> {
        debug!(path = %path.display(), "loading config");
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Promotions listing URL for `base`, when a path is configured
    pub fn promotions_url(&self, base: &Url) -> MarkcheckResult<Option<Url>> {
        self.promotions_path
            .as_deref()
            .map(|path| {
                base.join(path.trim_start_matches('/')).map_err(|e| {
                    MarkcheckError::config(format!("invalid promotions path {path:?}: {e}"))
                })
            })
            .transpose()
    }
}
