use contracts::domain::a001_link::category::{
    CategoryRoots, DEFAULT_CATEGORY, DEFAULT_CATEGORY_ROOTS,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub portal: PortalConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "target/db/portal.db".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Signing secret; generated and kept in `sys_settings` when absent
    pub jwt_secret: Option<String>,
    pub token_lifetime_hours: i64,
    /// Account created on first start when no administrator exists
    pub admin_username: String,
    pub admin_password: String,
    /// Adds `Secure` to the session cookie (enable behind HTTPS)
    pub secure_cookie: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_lifetime_hours: 24,
            admin_username: "admin".into(),
            admin_password: "admin".into(),
            secure_cookie: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PortalConfig {
    pub category_roots: Vec<String>,
    pub default_category: String,
    pub site_url: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            category_roots: DEFAULT_CATEGORY_ROOTS.iter().map(|s| s.to_string()).collect(),
            default_category: DEFAULT_CATEGORY.into(),
            site_url: "http://localhost:3000".into(),
        }
    }
}

impl PortalConfig {
    pub fn category_roots(&self) -> CategoryRoots {
        CategoryRoots::new(self.category_roots.clone(), self.default_category.clone())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MailConfig {
    /// Resend API key; without it outgoing mail is only logged
    pub api_key: Option<String>,
    pub from: String,
    /// When set, every notification goes to this address only
    pub test_recipient: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from: "Portal <onboarding@resend.dev>".into(),
            test_recipient: None,
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[database]
path = "target/db/portal.db"

[auth]
token_lifetime_hours = 24
admin_username = "admin"
admin_password = "admin"

[portal]
category_roots = ["common", "grade-1", "grade-2", "grade-3"]
default_category = "common"
site_url = "http://localhost:3000"

[mail]
from = "Portal <onboarding@resend.dev>"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return parse_config(&contents);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.auth.token_lifetime_hours <= 0 {
        anyhow::bail!("auth.token_lifetime_hours must be positive");
    }
    Ok(config)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}
