use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config {
        elasticsearch_url: get_env_or_default("ELASTICSEARCH_URL", "http://localhost:9200"),
        index_name: get_env_or_default("INDEX_NAME", "products"),
        port: parse_env_or_default("PORT", 3001),
        max_page_size: parse_env_or_default("MAX_PAGE_SIZE", 100),
        elasticsearch_timeout_secs: parse_env_or_default("ELASTICSEARCH_TIMEOUT_SECS", 10),
    }
});

#[derive(Debug, Clone)]
pub struct Config {
    pub elasticsearch_url: String,
    pub index_name: String,
    pub port: u16,
    /// Upper bound applied to the `limit` query parameter.
    pub max_page_size: u32,
    pub elasticsearch_timeout_secs: u64,
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or_default<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("Invalid value for environment variable {key}: {raw:?}")),
        Err(_) => default,
    }
}
