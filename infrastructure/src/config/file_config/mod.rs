//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agents;
mod collections;
mod embedding;
mod generation;
mod repl;
mod retrieval;
mod storage;
mod tools;

pub use agents::{FileAgentOverride, FileAgentsConfig};
pub use collections::FileCollectionConfig;
pub use embedding::{EmbeddingBackendKind, FileEmbeddingConfig};
pub use generation::FileGenerationConfig;
pub use repl::FileReplConfig;
pub use retrieval::FileRetrievalConfig;
pub use storage::{FileIndexConfig, FileLoggingConfig};
pub use tools::{DEFAULT_TOOL_TIMEOUT_MS, FileToolConfig, FileToolParameter, default_tools};

use rag_domain::{AgentDomain, AgentProfile, CollectionPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    #[error("{field} cannot be 0")]
    ZeroValue { field: String },

    #[error("{field} must be within [-1, 1], got {value}")]
    ThresholdOutOfRange { field: String, value: f32 },

    #[error("{field} cannot be empty")]
    EmptyValue { field: String },

    #[error("agents.domains.{0}: unknown domain")]
    UnknownDomain(String),

    #[error(
        "collections.{collection}.embedding_dimension is {declared}, but the embedder produces {embedder}"
    )]
    DimensionConflict {
        collection: String,
        declared: usize,
        embedder: usize,
    },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub retrieval: FileRetrievalConfig,
    /// Thresholds keyed by collection name
    pub collections: BTreeMap<String, FileCollectionConfig>,
    /// Tool settings keyed by tool name
    pub tools: BTreeMap<String, FileToolConfig>,
    pub embedding: FileEmbeddingConfig,
    pub generation: FileGenerationConfig,
    pub index: FileIndexConfig,
    pub agents: FileAgentsConfig,
    pub logging: FileLoggingConfig,
    pub repl: FileReplConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            retrieval: FileRetrievalConfig::default(),
            collections: BTreeMap::new(),
            tools: default_tools(),
            embedding: FileEmbeddingConfig::default(),
            generation: FileGenerationConfig::default(),
            index: FileIndexConfig::default(),
            agents: FileAgentsConfig::default(),
            logging: FileLoggingConfig::default(),
            repl: FileReplConfig::default(),
        }
    }
}

impl FileConfig {
    /// Thresholds of `collection`, or the defaults when it is not configured.
    pub fn collection_policy(&self, collection: &str) -> CollectionPolicy {
        self.collections
            .get(collection)
            .map(FileCollectionConfig::to_policy)
            .unwrap_or_default()
    }

    /// Fixed embedding dimensions declared per collection
    pub fn collection_dimensions(&self) -> BTreeMap<String, usize> {
        self.collections
            .iter()
            .filter_map(|(name, c)| c.embedding_dimension.map(|d| (name.clone(), d)))
            .collect()
    }

    /// Effective profile for a domain agent: built-in defaults, then the
    /// collection's thresholds, then `[agents.domains.<domain>]` overrides.
    pub fn agent_profile(&self, domain: AgentDomain) -> AgentProfile {
        let overrides = self.agents.override_for(domain);
        let collection = overrides
            .and_then(|o| o.collection.clone())
            .unwrap_or_else(|| domain.default_collection().to_string());

        let profile = AgentProfile::for_domain(domain)
            .with_policy(self.collection_policy(&collection))
            .with_collection(collection);

        match overrides {
            Some(o) => o.apply(profile),
            None => profile,
        }
    }

    /// Settings of a tool; `web_search` always has an entry.
    pub fn tool_config(&self, name: &str) -> Option<FileToolConfig> {
        self.tools.get(name).cloned().or_else(|| {
            (name == rag_domain::tool::WEB_SEARCH).then(FileToolConfig::default)
        })
    }

    /// Validate the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let zero = |field: String| Err(ConfigValidationError::ZeroValue { field });

        if self.retrieval.max_results == 0 {
            return zero("retrieval.max_results".to_string());
        }

        for (name, collection) in &self.collections {
            if collection.top_k == 0 {
                return zero(format!("collections.{name}.top_k"));
            }
            if collection.embedding_dimension == Some(0) {
                return zero(format!("collections.{name}.embedding_dimension"));
            }
            check_threshold(&format!("collections.{name}.min_score"), collection.min_score)?;
        }

        for (name, tool) in &self.tools {
            if tool.timeout_ms == 0 {
                return zero(format!("tools.{name}.timeout_ms"));
            }
            if let Some(endpoint) = &tool.endpoint
                && endpoint.trim().is_empty()
            {
                return Err(ConfigValidationError::EmptyValue {
                    field: format!("tools.{name}.endpoint"),
                });
            }
        }

        if self.embedding.dimension == 0 {
            return zero("embedding.dimension".to_string());
        }
        // Every query vector comes from the one embedder
        for (name, declared) in self.collection_dimensions() {
            if declared != self.embedding.dimension {
                return Err(ConfigValidationError::DimensionConflict {
                    collection: name,
                    declared,
                    embedder: self.embedding.dimension,
                });
            }
        }
        if self.embedding.batch_size == 0 {
            return zero("embedding.batch_size".to_string());
        }
        if self.embedding.timeout_seconds == 0 {
            return zero("embedding.timeout_seconds".to_string());
        }
        if self.generation.timeout_seconds == 0 {
            return zero("generation.timeout_seconds".to_string());
        }
        if self.generation.model.trim().is_empty() {
            return Err(ConfigValidationError::EmptyValue {
                field: "generation.model".to_string(),
            });
        }

        for (key, overrides) in &self.agents.domains {
            if key.parse::<AgentDomain>().is_err() {
                return Err(ConfigValidationError::UnknownDomain(key.clone()));
            }
            if overrides.top_k == Some(0) {
                return zero(format!("agents.domains.{key}.top_k"));
            }
            if let Some(score) = overrides.min_score {
                check_threshold(&format!("agents.domains.{key}.min_score"), score)?;
            }
        }

        Ok(())
    }
}

fn check_threshold(field: &str, value: f32) -> Result<(), ConfigValidationError> {
    if value.is_nan() || !(-1.0..=1.0).contains(&value) {
        return Err(ConfigValidationError::ThresholdOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_domain::tool::WEB_SEARCH;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[retrieval]
max_results = 8

[collections.marketing]
min_hits = 2
min_score = 0.55
top_k = 4
embedding_dimension = 256

[tools.web_search]
timeout_ms = 3000

[embedding]
backend = "http"
dimension = 256

[generation]
model = "local-llm"

[index]
data_dir = "/var/lib/hybrid-rag"

[agents]
max_history_turns = 6

[agents.domains.marketing]
allowed_tools = []

[logging]
conversation_log = "/tmp/conversation.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.retrieval.max_results, 8);
        assert_eq!(config.collections["marketing"].top_k, 4);
        assert_eq!(config.tools[WEB_SEARCH].timeout_ms, 3000);
        assert_eq!(config.embedding.backend, EmbeddingBackendKind::Http);
        assert_eq!(config.generation.model, "local-llm");
        assert_eq!(config.index.data_dir.as_deref(), Some("/var/lib/hybrid-rag"));
        assert_eq!(config.agents.max_history_turns, 6);
        assert!(config.logging.conversation_log.is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert!(config.tools.contains_key(WEB_SEARCH));
        assert_eq!(config.embedding.backend, EmbeddingBackendKind::Hashing);
        assert!(config.index.data_dir.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_agent_profile_layers() {
        let toml_str = r#"
[collections.patents_2024]
min_hits = 4
min_score = 0.5

[agents.domains.patent]
collection = "patents_2024"
allowed_tools = ["patent_lookup"]
min_score = 0.7
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();

        let patent = config.agent_profile(AgentDomain::Patent);
        assert_eq!(patent.collection, "patents_2024");
        assert_eq!(patent.min_hits(), 4);
        assert_eq!(patent.min_score(), 0.7);
        assert!(!patent.can_escalate());

        let team = config.agent_profile(AgentDomain::Team);
        assert_eq!(team.collection, "team");
        assert_eq!(team.policy, CollectionPolicy::default());
        assert!(team.can_escalate());
    }

    #[test]
    fn test_override_keys_accept_aliases() {
        let toml_str = r#"
[agents.domains.pitch]
collection = "decks"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.agent_profile(AgentDomain::PitchDeck).collection, "decks");
    }

    #[test]
    fn test_web_search_always_configured() {
        let toml_str = r#"
[tools.patent_lookup]
endpoint = "https://patents.example/lookup"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.tool_config(WEB_SEARCH).is_some());
        assert!(config.tool_config("unknown").is_none());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = FileConfig::default();
        config.generation.timeout_seconds = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroValue {
                field: "generation.timeout_seconds".to_string()
            })
        );

        let config: FileConfig = toml::from_str("[collections.team]\ntop_k = 0\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ZeroValue { .. })
        ));

        let config: FileConfig = toml::from_str("[embedding]\ndimension = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let config: FileConfig = toml::from_str("[collections.team]\nmin_score = 1.5\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::ThresholdOutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_collection_dimension_conflict() {
        let toml_str = r#"
[embedding]
dimension = 256

[collections.patent]
embedding_dimension = 384
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::DimensionConflict {
                collection: "patent".to_string(),
                declared: 384,
                embedder: 256,
            })
        );
    }

    #[test]
    fn test_validate_rejects_unknown_domain_override() {
        let config: FileConfig =
            toml::from_str("[agents.domains.astrology]\ncollection = \"stars\"\n").unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::UnknownDomain("astrology".to_string()))
        );
    }
}
