//! Rule-set configuration for the quire partitioner.
//!
//! A rule set is an ordered list of transitions between named content types,
//! stored as TOML. Names are resolved to [`ContentType`] values when the rules
//! are built; `"default"` always means [`DEFAULT_CONTENT`].

use quire_kernel::{
    ContentType, DEFAULT_CONTENT, KernelError, PARENT_CONTENT, TokenBias, TransitionRule,
    UNDETERMINED_CONTENT,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Rule {index} ({from} -> {to}) is invalid: {source}")]
    InvalidRule {
        index: usize,
        from: String,
        to: String,
        source: KernelError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Literal,
    Regex,
}

/// One transition as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub kind: RuleKind,
    pub from: String,
    pub to: String,
    /// Empty for a literal rule that matches at the end of a line.
    #[serde(default)]
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape: Option<char>,
    #[serde(default = "case_sensitive_default")]
    pub case_sensitive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bias: Option<TokenBias>,
}

fn case_sensitive_default() -> bool {
    true
}

impl RuleConfig {
    pub fn literal(from: &str, to: &str, pattern: &str, escape: Option<char>) -> Self {
        Self {
            kind: RuleKind::Literal,
            from: from.to_string(),
            to: to.to_string(),
            pattern: pattern.to_string(),
            escape,
            case_sensitive: true,
            bias: None,
        }
    }

    pub fn regex(from: &str, to: &str, pattern: &str) -> Self {
        Self {
            kind: RuleKind::Regex,
            ..Self::literal(from, to, pattern, None)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

/// Built rules together with the content types their names resolved to.
#[derive(Debug)]
pub struct RuleSet {
    names: Vec<(String, ContentType)>,
    pub rules: Vec<TransitionRule>,
}

impl RuleSet {
    pub fn content_type(&self, name: &str) -> Option<ContentType> {
        self.names
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, content_type)| *content_type)
    }

    pub fn name_of(&self, content_type: ContentType) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, t)| *t == content_type)
            .map(|(name, _)| name.as_str())
    }

    /// Names in the order they were first seen.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|(name, _)| name.as_str())
    }

    fn resolve(&mut self, name: &str) -> ContentType {
        if let Some(content_type) = self.content_type(name) {
            return content_type;
        }
        let content_type = ContentType::new_value();
        self.names.push((name.to_string(), content_type));
        content_type
    }
}

impl Config {
    /// Block and line comments, string and character literals, with `\`
    /// escapes.
    pub fn c_like() -> Self {
        Self {
            rules: vec![
                RuleConfig::literal("default", "block_comment", "/*", None),
                RuleConfig::literal("block_comment", "default", "*/", None),
                RuleConfig::literal("default", "line_comment", "//", None),
                RuleConfig::literal("line_comment", "default", "", Some('\\')),
                RuleConfig::literal("default", "string", "\"", None),
                RuleConfig::literal("string", "default", "\"", Some('\\')),
                RuleConfig::literal("string", "default", "", Some('\\')),
                RuleConfig::literal("default", "char", "'", None),
                RuleConfig::literal("char", "default", "'", Some('\\')),
            ],
        }
    }

    /// Resolves content type names and builds the rules in file order.
    pub fn build_rules(&self) -> Result<RuleSet, ConfigError> {
        let mut set = RuleSet {
            names: vec![
                ("default".to_string(), DEFAULT_CONTENT),
                ("parent".to_string(), PARENT_CONTENT),
                ("undetermined".to_string(), UNDETERMINED_CONTENT),
            ],
            rules: Vec::with_capacity(self.rules.len()),
        };

        for (index, rule) in self.rules.iter().enumerate() {
            let from = set.resolve(&rule.from);
            let to = set.resolve(&rule.to);
            let invalid = |source: KernelError| ConfigError::InvalidRule {
                index,
                from: rule.from.clone(),
                to: rule.to.clone(),
                source,
            };

            if from == to {
                return Err(invalid(KernelError::InvalidRule { from, to }));
            }
            let mut built = match rule.kind {
                RuleKind::Literal => TransitionRule::literal(
                    from,
                    to,
                    rule.pattern.as_str(),
                    rule.escape,
                    rule.case_sensitive,
                ),
                RuleKind::Regex => {
                    TransitionRule::regex(from, to, &rule.pattern, rule.case_sensitive)
                        .map_err(invalid)?
                }
            };
            if let Some(bias) = rule.bias {
                built = built.with_bias(bias);
            }
            set.rules.push(built);
        }

        Ok(set)
    }

    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/quire");
        PathBuf::from(config_dir.as_ref()).join("rules.toml")
    }

    /// Expands `~` and environment variables in a user supplied path.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
