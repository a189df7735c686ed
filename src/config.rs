use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub database_url: String,

    pub fcm_project_id: String,
    pub fcm_client_email: String,
    pub fcm_private_key: String,

    #[serde(default = "default_fcm_endpoint")]
    pub fcm_endpoint: String,

    #[serde(default = "default_oauth_token_url")]
    pub oauth_token_url: String,

    #[serde(default = "default_http_timeout_seconds")]
    pub http_timeout_seconds: u64,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_fcm_endpoint() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_oauth_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_http_timeout_seconds() -> u64 {
    10
}

fn default_server_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|_| anyhow!("Invalid or missing environmental variable"))?;
        Ok(config)
    }

    /// Service-account keys arrive through the environment with literal `\n`
    /// sequences in place of real newlines.
    pub fn private_key_pem(&self) -> String {
        self.fcm_private_key.replace("\\n", "\n")
    }
}
