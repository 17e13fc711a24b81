//! Model profiles: the context window each known model accepts.
//!
//! Profiles are looked up by name when a summarization starts. An unknown
//! name is a configuration error, not something to guess around.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::ConfigError;

/// A language model and the size of its context window in tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProfile {
    pub name: String,
    pub max_context: usize,
}

impl ModelProfile {
    /// Create a profile. `max_context` must be at least 1.
    pub fn new(name: impl Into<String>, max_context: usize) -> Result<Self, ConfigError> {
        let name = name.into();
        if max_context == 0 || name.is_empty() {
            return Err(ConfigError::InvalidModelSpec(format!("{name}={max_context}")));
        }
        Ok(Self { name, max_context })
    }
}

/// Parses `NAME=TOKENS`, splitting on the last `=` so tags like `gemma2:2b` work.
impl FromStr for ModelProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidModelSpec(s.to_string());
        let (name, tokens) = s.rsplit_once('=').ok_or_else(invalid)?;
        let tokens: usize = tokens.trim().parse().map_err(|_| invalid())?;
        ModelProfile::new(name.trim(), tokens).map_err(|_| invalid())
    }
}

/// Name-indexed table of [`ModelProfile`]s.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    profiles: BTreeMap<String, ModelProfile>,
}

impl ModelRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    /// Add or replace a profile (builder pattern).
    pub fn with_profile(mut self, profile: ModelProfile) -> Self {
        self.register(profile);
        self
    }

    /// Add or replace a profile.
    pub fn register(&mut self, profile: ModelProfile) {
        self.profiles.insert(profile.name.clone(), profile);
    }

    /// Look up a profile by model name.
    pub fn lookup(&self, name: &str) -> Result<&ModelProfile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownModel(name.to_string()))
    }

    /// Iterate profiles in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// Locally served Ollama models with their context windows.
impl Default for ModelRegistry {
    fn default() -> Self {
        let builtin = [
            ("llama3", 8_000),
            ("gemma2", 8_000),
            ("gemma2:2b", 8_000),
            ("mistral-nemo", 128_000),
        ];
        let mut registry = Self::empty();
        for (name, max_context) in builtin {
            registry.register(ModelProfile {
                name: name.to_string(),
                max_context,
            });
        }
        registry
    }
}
