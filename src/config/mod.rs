//! Typed decoration-rule settings with layered precedence (file → env).

use std::path::Path;

use config::{Config, Environment, File};
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::application::decoration::DecorationStrategy;

const ENV_PREFIX: &str = "TELAIO";

/// The three ignore-rule sets driving [`DecorationStrategy`].
///
/// Loaded once at startup; the compiled strategy is what request handling
/// shares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecorationRules {
    /// Route names never decorated, matched exactly.
    pub ignore_routes: Vec<String>,
    /// Unanchored patterns matched against the route name.
    pub ignore_route_patterns: Vec<String>,
    /// Unanchored patterns matched against the request path.
    pub ignore_uri_patterns: Vec<String>,
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to load decoration rules: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid ignore pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl DecorationRules {
    /// Loads rules from an optional file, then `TELAIO_*` environment
    /// overrides (comma-separated lists).
    pub fn load(path: Option<&Path>) -> Result<Self, RulesError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("ignore_routes")
                .with_list_parse_key("ignore_route_patterns")
                .with_list_parse_key("ignore_uri_patterns"),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Compiles the pattern sets into a ready strategy.
    pub fn compile(&self) -> Result<DecorationStrategy, RulesError> {
        let route_patterns = compile_patterns(&self.ignore_route_patterns)?;
        let uri_patterns = compile_patterns(&self.ignore_uri_patterns)?;

        Ok(DecorationStrategy::new(
            self.ignore_routes.iter().cloned(),
            route_patterns,
            uri_patterns,
        ))
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, RulesError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| RulesError::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}
