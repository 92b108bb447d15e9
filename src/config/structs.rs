use serde::{Deserialize, Serialize};

/// Cookie SameSite policy for the admin session cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub enum SameSitePolicy {
    Strict,
    #[default]
    Lax,
    None,
}

impl std::str::FromStr for SameSitePolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "none" => Ok(Self::None),
            _ => Err(format!(
                "Invalid SameSite policy: '{}'. Valid: Strict, Lax, None",
                s
            )),
        }
    }
}

/// Application configuration
///
/// Loaded once at startup from `finitura.toml` (optional) with environment
/// overrides. ENV prefix `FN`, separator `__`; e.g. `FN__SERVER__PORT=9000`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub contact: ContactConfig,
}

impl AppConfig {
    /// Priority: ENV > finitura.toml > defaults
    pub fn load() -> Self {
        use config::{Config, Environment, File};

        let path = "finitura.toml";

        let builder = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("FN")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<AppConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    pub fn generate_sample_config() -> String {
        let sample = Self::default();
        toml::to_string_pretty(&sample)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// Salt for the visitor IP hash. A dedicated salt allows rotating
    /// visitor identities without invalidating admin sessions.
    pub fn ip_salt(&self) -> &str {
        if self.analytics.ip_salt.is_empty() {
            &self.auth.secret
        } else {
            &self.analytics.ip_salt
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// Admin authentication settings
///
/// `secret` signs the session JWTs and salts the visitor IP hash. An empty
/// secret gets replaced by a random value at startup, which invalidates
/// sessions and rotates visitor identities across restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: u64,
    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_days: u64,
    /// Registration code for the one-time admin bootstrap endpoint.
    /// Empty disables the endpoint.
    #[serde(default)]
    pub registration_code: String,
    #[serde(default)]
    pub cookie_secure: bool,
    #[serde(default)]
    pub cookie_same_site: SameSitePolicy,
    #[serde(default)]
    pub cookie_domain: Option<String>,
}

/// Engagement tracking settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalyticsConfig {
    /// Salt mixed into the visitor IP hash; falls back to the auth
    /// secret when empty. Raw addresses are never persisted either way.
    #[serde(default)]
    pub ip_salt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    #[serde(default)]
    pub allow_credentials: bool,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

/// S3-compatible object storage for product/gallery/review images
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Endpoint URL, e.g. https://<account>.r2.cloudflarestorage.com
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_media_bucket")]
    pub bucket: String,
    #[serde(default = "default_media_region")]
    pub region: String,
    /// Public base URL the bucket is served from
    #[serde(default)]
    pub public_url: String,
    #[serde(default = "default_presign_expiry_secs")]
    pub presign_expiry_secs: u64,
}

/// Contact flow: WhatsApp deep links and the transactional mail provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactConfig {
    #[serde(default = "default_whatsapp_number")]
    pub whatsapp_number: String,
    /// Transactional mail HTTP API endpoint. Empty disables email sending.
    #[serde(default)]
    pub mail_api_url: String,
    #[serde(default)]
    pub mail_api_key: String,
    #[serde(default = "default_mail_from")]
    pub mail_from: String,
    /// Where contact/review notifications land
    #[serde(default)]
    pub mail_to: String,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "finitura.db".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_access_token_minutes() -> u64 {
    15
}

fn default_refresh_token_days() -> u64 {
    7
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_media_bucket() -> String {
    "finitura-media".to_string()
}

fn default_media_region() -> String {
    "auto".to_string()
}

fn default_presign_expiry_secs() -> u64 {
    3600
}

fn default_whatsapp_number() -> String {
    "+2349036826272".to_string()
}

fn default_mail_from() -> String {
    "noreply@finitura.example".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_minutes: default_access_token_minutes(),
            refresh_token_days: default_refresh_token_days(),
            registration_code: String::new(),
            cookie_secure: false,
            cookie_same_site: SameSitePolicy::default(),
            cookie_domain: None,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_origins: Vec::new(),
            allow_credentials: false,
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            bucket: default_media_bucket(),
            region: default_media_region(),
            public_url: String::new(),
            presign_expiry_secs: default_presign_expiry_secs(),
        }
    }
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            whatsapp_number: default_whatsapp_number(),
            mail_api_url: String::new(),
            mail_api_key: String::new(),
            mail_from: default_mail_from(),
            mail_to: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.database_url, "finitura.db");
        assert_eq!(config.auth.access_token_minutes, 15);
        assert_eq!(config.auth.refresh_token_days, 7);
        assert!(!config.cors.enabled);
        assert_eq!(config.media.region, "auto");
    }

    #[test]
    fn test_same_site_from_str() {
        use std::str::FromStr;
        assert_eq!(
            SameSitePolicy::from_str("strict").unwrap(),
            SameSitePolicy::Strict
        );
        assert_eq!(SameSitePolicy::from_str("LAX").unwrap(), SameSitePolicy::Lax);
        assert!(SameSitePolicy::from_str("whatever").is_err());
    }

    #[test]
    fn test_ip_salt_falls_back_to_auth_secret() {
        let mut config = AppConfig::default();
        config.auth.secret = "session-secret".to_string();
        assert_eq!(config.ip_salt(), "session-secret");

        config.analytics.ip_salt = "visitor-salt".to_string();
        assert_eq!(config.ip_salt(), "visitor-salt");
    }

    #[test]
    fn test_sample_config_round_trips() {
        let sample = AppConfig::generate_sample_config();
        let parsed: AppConfig = toml::from_str(&sample).expect("sample config should parse");
        assert_eq!(parsed.server.port, AppConfig::default().server.port);
    }
}
