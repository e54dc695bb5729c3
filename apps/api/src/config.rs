use anyhow::{bail, Context, Result};

/// Which LLM backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Ollama,
    Gemini,
}

impl ProviderKind {
    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "gemini" => Ok(Self::Gemini),
            other => bail!("Unknown LLM_PROVIDER '{other}' (expected 'ollama' or 'gemini')"),
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            Self::Ollama => "llama3.1:8b",
            Self::Gemini => "gemini-2.5-flash",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ollama => write!(f, "ollama"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// All provider selection happens here, once, at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    pub ollama_host: String,
    pub google_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let provider = ProviderKind::parse(
            &std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "ollama".to_string()),
        )?;

        Ok(Config {
            provider,
            model: std::env::var("LLM_MODEL")
                .unwrap_or_else(|_| provider.default_model().to_string()),
            ollama_host: std::env::var("OLLAMA_HOST")
                .unwrap_or_else(|_| "http://ollama:11434".to_string()),
            google_api_key: std::env::var("GOOGLE_API_KEY").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}
