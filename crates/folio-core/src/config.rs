use crate::visitor::ClientIdPolicy;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.1-8b-instant";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Optional JSON file replacing the built-in site content.
    pub site_config_path: Option<String>,
    pub llm: LlmConfig,
    pub client_id_policy: ClientIdPolicy,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Read from `GROQ_API_KEY`. Requests go out unauthenticated when absent
    /// and the provider's rejection surfaces in the chat stream.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("FOLIO_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            cors_origins: std::env::var("FOLIO_CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            site_config_path: std::env::var("FOLIO_SITE_CONFIG")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            llm: LlmConfig {
                api_key: std::env::var("GROQ_API_KEY")
                    .ok()
                    .filter(|k| !k.is_empty()),
                base_url: std::env::var("FOLIO_LLM_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string()),
                model: std::env::var("FOLIO_LLM_MODEL")
                    .unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            },
            client_id_policy: {
                let raw = std::env::var("FOLIO_CLIENT_ID").unwrap_or_else(|_| "hashed".to_string());
                match raw.as_str() {
                    "raw" => ClientIdPolicy::Raw,
                    "hashed" => ClientIdPolicy::Hashed,
                    other => return Err(format!("invalid FOLIO_CLIENT_ID: {other}")),
                }
            },
        })
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
        }
    }
}
