use anyhow::Context;

/// Selects the in-memory store instead of PostgreSQL.
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, so tests need not touch the process env.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => postgres_dsn(&lookup)?,
        };
        let port = lookup("APP_PORT")
            .map(|v| v.parse::<u16>().context("APP_PORT must be a port number"))
            .transpose()?
            .unwrap_or(8080);

        Ok(Self {
            database_url,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
        })
    }

    pub fn is_memory(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}

fn postgres_dsn<F>(lookup: &F) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).with_context(|| format!("{key} must be set when DATABASE_URL is not"));
    Ok(format!(
        "postgres://{}:{}@{}:{}/{}",
        get("POSTGRES_USER")?,
        get("POSTGRES_PASSWORD")?,
        get("POSTGRES_HOST")?,
        get("POSTGRES_PORT")?,
        get("POSTGRES_DB")?,
    ))
}
