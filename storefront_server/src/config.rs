use std::env;

use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sfs_common::Secret;

use crate::errors::ServerError;

const DEFAULT_SFS_HOST: &str = "127.0.0.1";
const DEFAULT_SFS_PORT: u16 = 8080;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:5174";
const DEFAULT_GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Where successful OAuth2 logins are redirected to. The bearer token is appended as a query parameter on
    /// `<frontend_url>/login-success`.
    pub frontend_url: String,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
    /// Directory where uploaded images are stored, served back under `/uploads/`.
    pub upload_dir: String,
    pub google: GoogleOauthConfig,
    pub gemini: GeminiConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SFS_HOST.to_string(),
            port: DEFAULT_SFS_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            cors_origins: DEFAULT_CORS_ORIGINS.split(',').map(String::from).collect(),
            upload_dir: DEFAULT_UPLOAD_DIR.to_string(),
            google: GoogleOauthConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SFS_HOST").ok().unwrap_or_else(|| DEFAULT_SFS_HOST.into());
        let port = env::var("SFS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SFS_PORT. {e} Using the default, {DEFAULT_SFS_PORT}, instead."
                    );
                    DEFAULT_SFS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SFS_PORT);
        let database_url = env::var("SFS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SFS_DATABASE_URL is not set. Please set it to the URL for the storefront database.");
            String::default()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to \
                 the default configuration."
            );
            AuthConfig::default()
        });
        let frontend_url = env::var("SFS_FRONTEND_URL").ok().unwrap_or_else(|| {
            info!("🪛️ SFS_FRONTEND_URL is not set. Using the default, {DEFAULT_FRONTEND_URL}.");
            DEFAULT_FRONTEND_URL.to_string()
        });
        let cors_origins = env::var("SFS_CORS_ORIGINS")
            .ok()
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>();
        let upload_dir = env::var("SFS_UPLOAD_DIR").ok().unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string());
        let google = GoogleOauthConfig::from_env_or_default();
        let gemini = GeminiConfig::from_env_or_default();
        Self { host, port, database_url, auth, frontend_url, cors_origins, upload_dir, google, gemini }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared secret used to sign and verify bearer tokens.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT signing secret has not been set. I'm using a random value for this session. Every token \
             issued will stop validating when the server restarts. Set SFS_JWT_SECRET in production. 🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("SFS_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [SFS_JWT_SECRET]")))?;
        if secret.len() < 32 {
            return Err(ServerError::ConfigurationError(
                "SFS_JWT_SECRET must be at least 32 characters long.".to_string(),
            ));
        }
        Ok(Self { jwt_secret: Secret::new(secret) })
    }
}

//-------------------------------------------------  GoogleOauthConfig  ------------------------------------------------
#[derive(Clone, Debug)]
pub struct GoogleOauthConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    /// The redirect URI registered with Google. Must point back at `/oauth2/callback/google` on this server.
    pub redirect_uri: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleOauthConfig {
    fn default() -> Self {
        Self {
            client_id: String::default(),
            client_secret: Secret::new(String::default()),
            redirect_uri: String::default(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

impl GoogleOauthConfig {
    pub fn from_env_or_default() -> Self {
        let client_id = env::var("SFS_GOOGLE_CLIENT_ID").ok().unwrap_or_else(|| {
            warn!("🪛️ SFS_GOOGLE_CLIENT_ID is not set. Google sign-in will not work.");
            String::default()
        });
        let client_secret = Secret::new(env::var("SFS_GOOGLE_CLIENT_SECRET").ok().unwrap_or_else(|| {
            warn!("🪛️ SFS_GOOGLE_CLIENT_SECRET is not set. Google sign-in will not work.");
            String::default()
        }));
        let redirect_uri = env::var("SFS_GOOGLE_REDIRECT_URI").ok().unwrap_or_else(|| {
            info!("🪛️ SFS_GOOGLE_REDIRECT_URI is not set. Using the local development callback.");
            format!("http://localhost:{DEFAULT_SFS_PORT}/oauth2/callback/google")
        });
        Self { client_id, client_secret, redirect_uri, ..Default::default() }
    }
}

//-------------------------------------------------  GeminiConfig  -----------------------------------------------------
#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub api_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self { api_key: Secret::new(String::default()), api_url: DEFAULT_GEMINI_API_URL.to_string() }
    }
}

impl GeminiConfig {
    pub fn from_env_or_default() -> Self {
        let api_key = Secret::new(env::var("SFS_GEMINI_API_KEY").ok().unwrap_or_else(|| {
            warn!("🪛️ SFS_GEMINI_API_KEY is not set. The shopping assistant will reply with a fallback message.");
            String::default()
        }));
        let api_url = env::var("SFS_GEMINI_API_URL").ok().unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string());
        Self { api_key, api_url }
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// The subset of the configuration that request handlers need at runtime. Secrets are deliberately excluded.
#[derive(Clone, Debug)]
pub struct ServerOptions {
    pub frontend_url: String,
    pub upload_dir: String,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { frontend_url: config.frontend_url.clone(), upload_dir: config.upload_dir.clone() }
    }
}
