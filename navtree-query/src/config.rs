//! Configuration file parsing for `navtree.toml`.
//!
//! ```toml
//! [tree]
//! separator = "."
//! root_name = "Person"
//! # segments per declaration; continuations are checked one by one
//! max_depth = 32
//!
//! [capabilities]
//! skip = false
//!
//! [debug]
//! log_declarations = true
//!
//! [environments.test.tree]
//! max_depth = 8
//! ```

use std::collections::HashMap;
use std::path::Path;

use regex_lite::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::engine::IncludeCapabilities;
use crate::error::{ErrorCode, QueryError, QueryResult};
use crate::tree::parser::DEFAULT_SEPARATOR;

/// Main configuration structure for `navtree.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NavtreeConfig {
    /// Tree-building settings.
    #[serde(default)]
    pub tree: TreeConfig,

    /// Include wrappers allowed regardless of engine.
    #[serde(default)]
    pub capabilities: IncludeCapabilities,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl NavtreeConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::query_error!(
                ErrorCode::ConfigIo,
                format!("Cannot read {}", path.display()),
                with_path = path.display().to_string(),
                with_help = "Create navtree.toml or pass its location explicitly",
            )
            .with_source(e)
        })?;

        Self::from_str(&content).map_err(|e| e.with_path(path.display().to_string()))
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> QueryResult<Self> {
        let expanded = expand_env_vars(content)?;

        let config: Self = toml::from_str(&expanded).map_err(|e| {
            QueryError::configuration(format!("Invalid navtree.toml: {}", e.message())).with_source(e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> QueryResult<()> {
        if self.tree.separator.is_empty() {
            return Err(QueryError::configuration("tree.separator must not be empty"));
        }
        if self.tree.max_depth == Some(0) {
            return Err(QueryError::configuration("tree.max_depth must be at least 1")
                .with_help("Remove max_depth to allow any depth"));
        }
        Ok(())
    }

    /// Apply environment-specific overrides and validate the result.
    pub fn with_environment(mut self, env: &str) -> QueryResult<Self> {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(tree) = overrides.tree {
                if let Some(separator) = tree.separator {
                    self.tree.separator = separator;
                }
                if let Some(root_name) = tree.root_name {
                    self.tree.root_name = Some(root_name);
                }
                if let Some(max_depth) = tree.max_depth {
                    self.tree.max_depth = Some(max_depth);
                }
            }
            if let Some(caps) = overrides.capabilities {
                self.capabilities.filter = caps.filter.unwrap_or(self.capabilities.filter);
                self.capabilities.order = caps.order.unwrap_or(self.capabilities.order);
                self.capabilities.skip = caps.skip.unwrap_or(self.capabilities.skip);
                self.capabilities.take = caps.take.unwrap_or(self.capabilities.take);
            }
            if let Some(debug) = overrides.debug {
                if let Some(log_declarations) = debug.log_declarations {
                    self.debug.log_declarations = log_declarations;
                }
            }
        }
        self.validate()
            .map_err(|e| e.with_context(format!("Applying environment `{}`", env)))?;
        Ok(self)
    }
}

/// Tree-building configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TreeConfig {
    /// Separator for dotted string paths.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Name given to the root node.
    pub root_name: Option<String>,

    /// Most segments a single declaration may name.
    ///
    /// Checked per declaration: an `include` followed by `then_include`s
    /// may build a deeper branch than this.
    pub max_depth: Option<usize>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            root_name: None,
            max_depth: None,
        }
    }
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

/// Debug/logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log every include declaration at debug level instead of trace.
    #[serde(default)]
    pub log_declarations: bool,
}

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Tree overrides.
    pub tree: Option<TreeOverride>,

    /// Capability overrides.
    pub capabilities: Option<CapabilitiesOverride>,

    /// Debug overrides.
    pub debug: Option<DebugOverride>,
}

/// Tree configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TreeOverride {
    /// Override separator.
    pub separator: Option<String>,

    /// Override root_name.
    pub root_name: Option<String>,

    /// Override max_depth.
    pub max_depth: Option<usize>,
}

/// Capability overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CapabilitiesOverride {
    /// Override filter.
    pub filter: Option<bool>,
    /// Override order.
    pub order: Option<bool>,
    /// Override skip.
    pub skip: Option<bool>,
    /// Override take.
    pub take: Option<bool>,
}

/// Debug configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Override log_declarations.
    pub log_declarations: Option<bool>,
}

/// Expand environment variables in the format `${VAR_NAME}`.
///
/// Unset variables are left as written.
fn expand_env_vars(content: &str) -> QueryResult<String> {
    let re = Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| QueryError::internal("invalid interpolation pattern").with_source(e))?;

    let expanded = re.replace_all(content, |caps: &Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    Ok(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = NavtreeConfig::default();
        assert_eq!(config.tree.separator, ".");
        assert_eq!(config.tree.max_depth, None);
        assert_eq!(config.capabilities, IncludeCapabilities::all());
        assert!(!config.debug.log_declarations);
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [tree]
            separator = "/"
            root_name = "Person"

            [capabilities]
            skip = false
        "#;

        let config = NavtreeConfig::from_str(toml).unwrap();
        assert_eq!(config.tree.separator, "/");
        assert_eq!(config.tree.root_name.as_deref(), Some("Person"));
        assert!(!config.capabilities.skip);
        assert!(config.capabilities.take);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = NavtreeConfig::from_str("[tree]\nseperator = \"/\"").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_validation() {
        let err = NavtreeConfig::from_str("[tree]\nseparator = \"\"").unwrap_err();
        assert!(err.message.contains("separator"));

        let err = NavtreeConfig::from_str("[tree]\nmax_depth = 0").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_environment_overrides() {
        let toml = r#"
            [tree]
            max_depth = 32

            [environments.test.tree]
            max_depth = 8

            [environments.test.capabilities]
            order = false

            [environments.test.debug]
            log_declarations = true
        "#;

        let config = NavtreeConfig::from_str(toml).unwrap().with_environment("test").unwrap();
        assert_eq!(config.tree.max_depth, Some(8));
        assert!(!config.capabilities.order);
        assert!(config.capabilities.filter);
        assert!(config.debug.log_declarations);

        let config = NavtreeConfig::from_str(toml).unwrap().with_environment("production").unwrap();
        assert_eq!(config.tree.max_depth, Some(32));
    }

    #[test]
    fn test_environment_overrides_are_validated() {
        let toml = r#"
            [environments.test.tree]
            max_depth = 0

            [environments.staging.tree]
            separator = ""
        "#;

        let config = NavtreeConfig::from_str(toml).unwrap();
        let err = config.clone().with_environment("test").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidConfiguration);
        assert!(err.message.contains("max_depth"));
        assert!(err.context.operation.as_deref().is_some_and(|op| op.contains("test")));

        let err = config.clone().with_environment("staging").unwrap_err();
        assert!(err.message.contains("separator"));

        assert!(config.with_environment("production").is_ok());
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("NAVTREE_TEST_ROOT_NAME", "Company");
        }
        let expanded = expand_env_vars("root_name = \"${NAVTREE_TEST_ROOT_NAME}\"").unwrap();
        assert_eq!(expanded, "root_name = \"Company\"");
        unsafe {
            std::env::remove_var("NAVTREE_TEST_ROOT_NAME");
        }

        let untouched = expand_env_vars("root_name = \"${NAVTREE_TEST_UNSET}\"").unwrap();
        assert_eq!(untouched, "root_name = \"${NAVTREE_TEST_UNSET}\"");
    }
}
