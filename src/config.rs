use serde::Deserialize;

use crate::api::state::DEFAULT_SESSION_IDLE_SECS;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Endpoint of the recommendation backend (POST, JSON body `{"query": ...}`)
    #[serde(default = "default_recommender_url")]
    pub recommender_url: String,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Seconds without a request after which a session is evicted
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: i64,
}

fn default_recommender_url() -> String {
    "http://127.0.0.1:5000/recommend".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_session_idle_secs() -> i64 {
    DEFAULT_SESSION_IDLE_SECS
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_idle_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_unset() {
        let vars: Vec<(String, String)> = vec![];
        let config = envy::from_iter::<_, Config>(vars).unwrap();

        assert_eq!(config.recommender_url, "http://127.0.0.1:5000/recommend");
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.session_idle_timeout(), chrono::Duration::minutes(30));
    }

    #[test]
    fn test_overrides_from_environment() {
        let vars = vec![
            (
                "RECOMMENDER_URL".to_string(),
                "http://backend:8000/recommend".to_string(),
            ),
            ("PORT".to_string(), "8080".to_string()),
            ("SESSION_IDLE_SECS".to_string(), "60".to_string()),
        ];
        let config = envy::from_iter::<_, Config>(vars).unwrap();

        assert_eq!(config.recommender_url, "http://backend:8000/recommend");
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.session_idle_timeout(), chrono::Duration::seconds(60));
    }
}
