use common::DeletePolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Comment behavior.
#[derive(Debug, Deserialize, Clone)]
pub struct CommentConfig {
    /// Delete all descendants together with a comment. Default: false, which
    /// leaves descendants in storage with a dangling parent reference.
    #[serde(default)]
    pub cascade_delete: bool,
    /// Maximum comment length in characters. Default: 2000.
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

fn default_max_length() -> usize {
    2000
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            cascade_delete: false,
            max_length: default_max_length(),
        }
    }
}

impl CommentConfig {
    pub fn delete_policy(&self) -> DeletePolicy {
        if self.cascade_delete {
            DeletePolicy::Cascade
        } else {
            DeletePolicy::Orphan
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub comments: CommentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., QUIRE__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("QUIRE").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
