use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kinds of agent that can be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    /// A knowledge agent giving concise, well-reasoned answers.
    Sage,
    /// A research agent giving structured, sourced answers.
    Scholar,
}

impl AgentType {
    /// All agent types, in the order they are listed to clients.
    pub const ALL: [AgentType; 2] = [AgentType::Sage, AgentType::Scholar];

    /// Returns the identifier clients use for this agent type.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            AgentType::Sage => "sage",
            AgentType::Scholar => "scholar",
        }
    }
}

impl Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized agent identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownAgentType(pub String);

impl Display for UnknownAgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown agent type `{}`", self.0)
    }
}

impl StdError for UnknownAgentType {}

impl FromStr for AgentType {
    type Err = UnknownAgentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentType::ALL
            .into_iter()
            .find(|agent| agent.as_str() == s)
            .ok_or_else(|| UnknownAgentType(s.to_owned()))
    }
}

/// The backends that serve the catalog models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    /// The official OpenAI API.
    OpenAI,
    /// Groq's OpenAI-compatible API.
    Groq,
}

impl ModelProvider {
    /// Returns the lowercase name of the provider.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            ModelProvider::OpenAI => "openai",
            ModelProvider::Groq => "groq",
        }
    }
}

impl Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A model offered to clients, paired with the backend serving it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    /// The model identifier.
    pub id: &'static str,
    /// The backend serving the model.
    pub provider: ModelProvider,
}

/// The models offered to clients, in declaration order.
pub static MODEL_CATALOG: [ModelInfo; 5] = [
    ModelInfo {
        id: "gpt-4o",
        provider: ModelProvider::OpenAI,
    },
    ModelInfo {
        id: "o3-mini",
        provider: ModelProvider::OpenAI,
    },
    ModelInfo {
        id: "llama-3.3-70b-versatile",
        provider: ModelProvider::Groq,
    },
    ModelInfo {
        id: "llama-3.3-8b-versatile",
        provider: ModelProvider::Groq,
    },
    ModelInfo {
        id: "mixtral-8x7b-32768",
        provider: ModelProvider::Groq,
    },
];

/// Resolves the backend serving a model.
///
/// Identifiers starting with `llama` or `mixtral` are served by Groq, every
/// other identifier by OpenAI. The match is case-sensitive and accepts
/// identifiers outside the catalog.
pub fn get_model_provider(model_id: &str) -> ModelProvider {
    if model_id.starts_with("llama") || model_id.starts_with("mixtral") {
        ModelProvider::Groq
    } else {
        ModelProvider::OpenAI
    }
}

/// Returns the identifiers of all agent types.
pub fn get_available_agents() -> Vec<&'static str> {
    AgentType::ALL.iter().map(|agent| agent.as_str()).collect()
}

/// Returns the model catalog.
#[inline]
pub fn get_available_models() -> &'static [ModelInfo] {
    &MODEL_CATALOG
}

/// A model clients may request a run with.
///
/// Mirrors [`MODEL_CATALOG`], which [`verify_model_catalog`] checks.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Model {
    /// `gpt-4o`
    #[default]
    #[serde(rename = "gpt-4o")]
    Gpt4o,
    /// `o3-mini`
    #[serde(rename = "o3-mini")]
    O3Mini,
    /// `llama-3.3-70b-versatile`
    #[serde(rename = "llama-3.3-70b-versatile")]
    Llama33_70bVersatile,
    /// `llama-3.3-8b-versatile`
    #[serde(rename = "llama-3.3-8b-versatile")]
    Llama33_8bVersatile,
    /// `mixtral-8x7b-32768`
    #[serde(rename = "mixtral-8x7b-32768")]
    Mixtral8x7b32768,
}

impl Model {
    /// All models, in catalog order.
    pub const ALL: [Model; 5] = [
        Model::Gpt4o,
        Model::O3Mini,
        Model::Llama33_70bVersatile,
        Model::Llama33_8bVersatile,
        Model::Mixtral8x7b32768,
    ];

    /// Returns the model identifier.
    pub const fn id(self) -> &'static str {
        match self {
            Model::Gpt4o => "gpt-4o",
            Model::O3Mini => "o3-mini",
            Model::Llama33_70bVersatile => "llama-3.3-70b-versatile",
            Model::Llama33_8bVersatile => "llama-3.3-8b-versatile",
            Model::Mixtral8x7b32768 => "mixtral-8x7b-32768",
        }
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when [`Model`] and [`MODEL_CATALOG`] disagree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogMismatch(String);

impl Display for CatalogMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model catalog mismatch: {}", self.0)
    }
}

impl StdError for CatalogMismatch {}

/// Checks that [`Model`] lists the catalog models in catalog order, and
/// that each catalog entry names the provider its identifier resolves to.
pub fn verify_model_catalog() -> Result<(), CatalogMismatch> {
    if Model::ALL.len() != MODEL_CATALOG.len() {
        return Err(CatalogMismatch(format!(
            "{} models declared, {} in the catalog",
            Model::ALL.len(),
            MODEL_CATALOG.len()
        )));
    }
    for (model, info) in Model::ALL.iter().zip(MODEL_CATALOG.iter()) {
        if model.id() != info.id {
            return Err(CatalogMismatch(format!(
                "expected `{}`, found `{}`",
                info.id,
                model.id()
            )));
        }
        let resolved = get_model_provider(info.id);
        if resolved != info.provider {
            return Err(CatalogMismatch(format!(
                "`{}` is listed under {}, but resolves to {resolved}",
                info.id, info.provider
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_provider_rule() {
        assert_eq!(
            get_model_provider("llama-3.3-70b-versatile"),
            ModelProvider::Groq
        );
        assert_eq!(
            get_model_provider("mixtral-8x7b-32768"),
            ModelProvider::Groq
        );
        assert_eq!(get_model_provider("gpt-4o"), ModelProvider::OpenAI);
        assert_eq!(get_model_provider("o3-mini"), ModelProvider::OpenAI);
        assert_eq!(get_model_provider("llama"), ModelProvider::Groq);
        // Case-sensitive, and not a substring match.
        assert_eq!(get_model_provider("Llama-3"), ModelProvider::OpenAI);
        assert_eq!(get_model_provider("my-llama"), ModelProvider::OpenAI);
        assert_eq!(get_model_provider(""), ModelProvider::OpenAI);
    }

    #[test]
    fn test_available_agents() {
        assert_eq!(get_available_agents(), ["sage", "scholar"]);
    }

    #[test]
    fn test_available_models() {
        let models = get_available_models();
        let ids: Vec<_> = models.iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            [
                "gpt-4o",
                "o3-mini",
                "llama-3.3-70b-versatile",
                "llama-3.3-8b-versatile",
                "mixtral-8x7b-32768",
            ]
        );
        for model in models {
            assert_eq!(model.provider, get_model_provider(model.id));
        }

        let json = serde_json::to_value(models[2]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "llama-3.3-70b-versatile",
                "provider": "groq",
            })
        );
    }

    #[test]
    fn test_model_enum_matches_catalog() {
        verify_model_catalog().unwrap();
        assert_eq!(Model::default(), Model::Gpt4o);
        for model in Model::ALL {
            let json = serde_json::to_value(model).unwrap();
            assert_eq!(json, model.id());
            let parsed: Model = serde_json::from_value(json).unwrap();
            assert_eq!(parsed, model);
        }
        assert!(serde_json::from_str::<Model>("\"gpt-5\"").is_err());
    }

    #[test]
    fn test_agent_type_parsing() {
        assert_eq!("sage".parse::<AgentType>(), Ok(AgentType::Sage));
        assert_eq!("scholar".parse::<AgentType>(), Ok(AgentType::Scholar));
        assert_eq!(
            "Sage".parse::<AgentType>(),
            Err(UnknownAgentType("Sage".to_owned()))
        );
        let parsed: AgentType = serde_json::from_str("\"scholar\"").unwrap();
        assert_eq!(parsed, AgentType::Scholar);
    }
}
