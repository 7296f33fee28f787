//! Process configuration read from the environment

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use tracing::{debug, info};

use crate::conversation::EvictionPolicy;
use crate::error::ConfigError;
use crate::llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::llm::GenerationConfig;

/// Port used when `PORT` is not set
pub const DEFAULT_PORT: u16 = 5000;

/// A value that must never appear in logs
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({} chars)", self.0.len())
    }
}

/// Settings for the Gemini gateway
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret,
    pub model: String,
    pub base_url: String,
    pub generation: GenerationConfig,
    pub system_prompt: Option<String>,
}

/// Twilio account credentials
///
/// Read for completeness; no request path sends messages through the Twilio
/// REST API, replies travel back in the webhook response.
#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: Secret,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub host: IpAddr,
    pub port: u16,
    pub eviction: EvictionPolicy,
    pub twilio: Option<TwilioCredentials>,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        debug!("Loading configuration from environment");
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let max_tokens = get("GEMINI_MAX_OUTPUT_TOKENS");
        let temperature = get("GEMINI_TEMPERATURE");
        let mut generation = GenerationConfig::default();
        if let Some(max) = parse_optional::<u32>("GEMINI_MAX_OUTPUT_TOKENS", max_tokens)? {
            generation = generation.with_max_tokens(max);
        }
        if let Some(temperature) = parse_optional::<f32>("GEMINI_TEMPERATURE", temperature)? {
            generation = generation.with_temperature(temperature);
        }

        let gemini = GeminiConfig {
            api_key: Secret(api_key),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: get("GEMINI_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            generation,
            system_prompt: get("GEMINI_SYSTEM_PROMPT"),
        };

        let host = parse_optional::<IpAddr>("HOST", get("HOST"))?
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = parse_optional::<u16>("PORT", get("PORT"))?.unwrap_or(DEFAULT_PORT);

        let max_entries = get("CONVERSATION_MAX_ENTRIES");
        let idle_secs = get("CONVERSATION_IDLE_SECS");
        let max_entries = parse_positive::<usize>("CONVERSATION_MAX_ENTRIES", max_entries)?;
        let idle_secs = parse_positive::<u32>("CONVERSATION_IDLE_SECS", idle_secs)?;
        let eviction = match (max_entries, idle_secs) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingEviction),
            (Some(max), None) => EvictionPolicy::MaxEntries(max),
            (None, Some(secs)) => EvictionPolicy::Idle(chrono::Duration::seconds(i64::from(secs))),
            (None, None) => EvictionPolicy::Unbounded,
        };

        let twilio = match (get("TWILIO_ACCOUNT_SID"), get("TWILIO_AUTH_TOKEN")) {
            (Some(account_sid), Some(auth_token)) => Some(TwilioCredentials {
                account_sid,
                auth_token: Secret(auth_token),
            }),
            _ => None,
        };

        Ok(Self {
            gemini,
            host,
            port,
            eviction,
            twilio,
        })
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Log a summary of the configuration without secrets
    pub fn log_summary(&self) {
        info!(
            model = %self.gemini.model,
            base_url = %self.gemini.base_url,
            bind = %self.bind_addr(),
            eviction = %self.eviction,
            "Configuration loaded successfully"
        );
        debug!(
            "Gemini API key length: {} characters",
            self.gemini.api_key.expose().len()
        );
        match &self.twilio {
            Some(twilio) => info!(
                account_sid = %twilio.account_sid,
                "Twilio credentials present (unused: replies are returned as TwiML)"
            ),
            None => debug!("Twilio credentials not set"),
        }
    }
}

fn parse_optional<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value: raw,
            })
        })
        .transpose()
}

/// Like [`parse_optional`], but zero is rejected
fn parse_positive<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr + Default + PartialEq,
    T::Err: fmt::Display,
{
    match parse_optional::<T>(var, value)? {
        Some(parsed) if parsed == T::default() => Err(ConfigError::Invalid {
            var,
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        }),
        parsed => Ok(parsed),
    }
}
