use anyhow::{Result, bail};
use std::fmt;

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Main application configuration
#[derive(Clone)]
pub struct Config {
    /// Bearer credential sent with every request
    pub api_key: String,

    /// Full URL of the chat completions endpoint
    pub endpoint: String,

    /// Fixed generation parameters attached to every request
    pub generation: GenerationParams,
}

/// Generation parameters sent with each completion request.
///
/// These are not user-configurable at runtime; they live here so the request
/// builder and its tests can vary them independently.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Model identifier
    pub model: String,

    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Nucleus sampling threshold, 0.0 to 1.0
    pub top_p: f64,

    /// Sampling temperature, 0.0 to 2.0; lower is more deterministic
    pub temperature: f64,

    /// Penalty for tokens in proportion to how often they already appeared
    pub frequency_penalty: f64,

    /// Penalty for tokens that appeared at all, discourages repeated phrases
    pub presence_penalty: f64,

    /// Sequences that end generation
    pub stop: Vec<String>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 1024,
            top_p: 1.0,
            temperature: 1.0,
            frequency_penalty: 0.5,
            presence_penalty: 0.5,
            stop: vec!["문장 생성 중단 단어".to_string()],
        }
    }
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            generation: GenerationParams::default(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        match api_key {
            Some(key) => Ok(Self::new(key)),
            None => bail!("{} is not set. Export your API key before starting the chat.", API_KEY_ENV),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_generation(mut self, generation: GenerationParams) -> Self {
        self.generation = generation;
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("generation", &self.generation)
            .finish()
    }
}
