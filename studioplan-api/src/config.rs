/// Configuration management for the API server
///
/// Loaded from environment variables, with a `.env` file honoured in
/// development.
///
/// # Environment Variables
///
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `API_CORS_ORIGINS`: comma-separated allowed origins (default: `*`)
/// - `API_PRODUCTION`: enables HSTS (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `AUTH_JWT_SECRET`: identity provider signing secret, 32+ chars (required)
/// - `AUTH_JWT_AUDIENCE`: expected `aud` claim (default: authenticated)
/// - `AUTH_SESSION_COOKIE`: session cookie name (default: sb-access-token)
/// - `GEMINI_API_KEY`: shared deployment key (optional)
/// - `ALLOW_SHARED_GEMINI_KEY`: let users without a key use the shared one
/// - `GEMINI_MODEL`: model name (default: gemini-2.5-flash)
/// - `GEMINI_BASE_URL`: API base URL
/// - `RUST_LOG` / `LOG_FORMAT`: log filter and `json` output
///
/// # Example
///
/// ```no_run
/// use studioplan_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::fmt;
use studioplan_shared::auth::session::DEFAULT_AUDIENCE;
use studioplan_shared::genai::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use studioplan_shared::genai::{GeminiConfig, SharedKeyPolicy};

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub gemini: GeminiSettings,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// `*` allows any origin
    pub cors_origins: Vec<String>,
    /// Production mode adds HSTS
    pub production: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Session token validation settings
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub audience: String,
    pub session_cookie: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("audience", &self.audience)
            .field("session_cookie", &self.session_cookie)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub shared_key: SharedKeyPolicy,
    pub model: String,
    pub base_url: String,
}

impl GeminiSettings {
    pub fn client_config(&self) -> GeminiConfig {
        GeminiConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            ..Default::default()
        }
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = get("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;
        let cors_origins = get("API_CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        let production = parse_bool(get("API_PRODUCTION"), "API_PRODUCTION")?;

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = get("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let jwt_secret = get("AUTH_JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("AUTH_JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("AUTH_JWT_SECRET must be at least 32 characters long");
        }

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            auth: AuthConfig {
                jwt_secret,
                audience: get("AUTH_JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
                session_cookie: get("AUTH_SESSION_COOKIE")
                    .unwrap_or_else(|| "sb-access-token".to_string()),
            },
            gemini: GeminiSettings {
                shared_key: SharedKeyPolicy {
                    key: get("GEMINI_API_KEY"),
                    allow_fallback: parse_bool(
                        get("ALLOW_SHARED_GEMINI_KEY"),
                        "ALLOW_SHARED_GEMINI_KEY",
                    )?,
                },
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_bool(value: Option<String>, name: &str) -> anyhow::Result<bool> {
    match value.as_deref().map(str::trim) {
        None => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => anyhow::bail!("{} must be true or false, got '{}'", name, v),
    }
}
