//! Server settings, read once from the environment at startup.

use std::env;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};
use std::net::SocketAddr;

use agent_api_openai_model::{GROQ_BASE_URL, OPENAI_BASE_URL};

use crate::agents::ModelProvider;

const DEFAULT_PORT: u16 = 8000;

/// Error returned when an environment variable holds an invalid value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsError {
    var: &'static str,
    value: String,
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value for {}: {:?}", self.var, self.value)
    }
}

impl StdError for SettingsError {}

/// Credentials and endpoint of one model provider.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    api_key: Option<String>,
    base_url: String,
}

impl ProviderSettings {
    /// Creates provider settings.
    #[inline]
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
        }
    }

    /// Returns the API key, if one is configured.
    #[inline]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Returns the base URL of the API.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Immutable settings of the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// The address the server listens on.
    pub addr: SocketAddr,
    /// Whether agents log their requests and responses.
    pub debug_mode: bool,
    /// Settings of the OpenAI backend.
    pub openai: ProviderSettings,
    /// Settings of the Groq backend.
    pub groq: ProviderSettings,
}

impl Settings {
    /// Reads the settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Reads the settings through `lookup`, which returns the value of an
    /// environment variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let lookup = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let addr: SocketAddr = match lookup("AGENT_API_ADDR") {
            Some(value) => match value.trim().parse() {
                Ok(addr) => addr,
                Err(_) => {
                    return Err(SettingsError {
                        var: "AGENT_API_ADDR",
                        value,
                    });
                }
            },
            None => SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        };
        let debug_mode = match lookup("AGENT_DEBUG") {
            Some(value) => parse_flag(&value).ok_or(SettingsError {
                var: "AGENT_DEBUG",
                value,
            })?,
            None => true,
        };

        Ok(Self {
            addr,
            debug_mode,
            openai: ProviderSettings::new(
                lookup("OPENAI_API_KEY"),
                lookup("OPENAI_BASE_URL")
                    .unwrap_or_else(|| OPENAI_BASE_URL.to_owned()),
            ),
            groq: ProviderSettings::new(
                lookup("GROQ_API_KEY"),
                lookup("GROQ_BASE_URL")
                    .unwrap_or_else(|| GROQ_BASE_URL.to_owned()),
            ),
        })
    }

    /// Returns the settings of the given provider.
    #[inline]
    pub fn provider(&self, provider: ModelProvider) -> &ProviderSettings {
        match provider {
            ModelProvider::OpenAI => &self.openai,
            ModelProvider::Groq => &self.groq,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
