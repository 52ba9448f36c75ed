use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

pub const PROJECT_ENV: &str = "GEE_PROJECT_ID";
pub const TOKEN_ENV: &str = "GEE_ACCESS_TOKEN";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ImageryConfig {
    /// Cloud project; absence is reported by the session initializer
    #[serde(default)]
    pub project_id: Option<String>,
    /// Pre-issued OAuth token, bypasses `token_command`
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_token_command")]
    pub token_command: String,
    #[serde(default = "default_login_command")]
    pub login_command: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_open_in_browser")]
    pub open_in_browser: bool,
}

fn default_api_base() -> String {
    "https://earthengine.googleapis.com".to_string()
}

fn default_token_command() -> String {
    "gcloud auth print-access-token".to_string()
}

fn default_login_command() -> String {
    "gcloud auth login".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_open_in_browser() -> bool {
    true
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            access_token: None,
            api_base: default_api_base(),
            token_command: default_token_command(),
            login_command: default_login_command(),
            output_dir: default_output_dir(),
            open_in_browser: default_open_in_browser(),
        }
    }
}

/// Load `.env`, then `config/imagery.toml` (optional), then `IMAGERY_*` variables.
/// `GEE_PROJECT_ID` and `GEE_ACCESS_TOKEN` take precedence over both.
pub fn load_imagery_config() -> anyhow::Result<ImageryConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let env: HashMap<String, String> = std::env::vars().collect();
    build_imagery_config("config/imagery", env)
}

fn build_imagery_config(
    file: &str,
    env: HashMap<String, String>,
) -> anyhow::Result<ImageryConfig> {
    let prefixed: HashMap<String, String> = env
        .iter()
        .filter(|(k, _)| k.starts_with("IMAGERY_"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let settings = config::Config::builder()
        .add_source(config::File::with_name(file).required(false))
        .add_source(config::Environment::with_prefix("IMAGERY").source(Some(prefixed)))
        .build()?;

    let mut config: ImageryConfig = settings.try_deserialize()?;

    if let Some(project) = env.get(PROJECT_ENV).filter(|v| !v.trim().is_empty()) {
        config.project_id = Some(project.trim().to_string());
    }
    if let Some(token) = env.get(TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
        config.access_token = Some(token.trim().to_string());
    }

    Ok(config)
}
