use caserelay_core::UploadTarget;
use caserelay_service::RelayConfig;
use clap::Parser;

use crate::routes::HttpSettings;

/// Notion's ceiling for a single-part file upload.
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, Parser)]
#[command(name = "caserelay-server", about = "Relay email submissions into a Notion database")]
pub struct ServerConfig {
    /// Notion integration token
    #[arg(long, env = "NOTION_API_KEY", hide_env_values = true)]
    pub notion_api_key: String,

    /// Database that new records are created in
    #[arg(long, env = "NOTION_DASHBOARD_ID")]
    pub dashboard_id: String,

    /// Database searched by /search-cases
    #[arg(long, env = "NOTION_CASE_DB_ID")]
    pub case_db_id: String,

    #[arg(long, env = "HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Notion API base URL
    #[arg(long, env = "NOTION_BASE_URL", default_value = caserelay_service::DEFAULT_BASE_URL)]
    pub notion_base_url: String,

    /// Value sent in the Notion-Version header
    #[arg(long, env = "NOTION_VERSION", default_value = caserelay_service::DEFAULT_NOTION_VERSION)]
    pub notion_version: String,

    /// Where file bytes are sent: "upload-url" or "send-endpoint"
    #[arg(
        long,
        env = "NOTION_UPLOAD_TARGET",
        default_value = "upload-url",
        value_parser = parse_upload_target
    )]
    pub upload_target: UploadTarget,

    /// Upload a submission's attachments concurrently
    #[arg(long, env = "RELAY_PARALLEL_UPLOADS")]
    pub parallel_uploads: bool,

    /// Origins allowed to call the relay with credentials (comma separated)
    #[arg(
        long,
        env = "RELAY_CORS_ORIGINS",
        value_delimiter = ',',
        default_values = [
            "https://localhost:3000",
            "http://localhost:3000",
            "http://192.168.1.5:3000",
        ]
    )]
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes
    #[arg(long, env = "RELAY_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

fn parse_upload_target(s: &str) -> Result<UploadTarget, String> {
    UploadTarget::parse_str(s)
        .ok_or_else(|| format!("invalid upload target: {s} (expected upload-url or send-endpoint)"))
}

impl ServerConfig {
    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            dashboard_id: self.dashboard_id.clone(),
            case_db_id: self.case_db_id.clone(),
            upload_target: self.upload_target,
            parallel_uploads: self.parallel_uploads,
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            cors_origins: self.cors_origins.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}
