use std::time::Duration;

use clap::Parser;

use varbi_client::ClientConfig;
use varbi_client::client::DEFAULT_BASE_URL;

/// Command-line and environment settings for the server binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "varbi-mcp",
    version,
    about = "MCP server exposing Varbi job offers over stdio"
)]
pub struct ServerArgs {
    /// Base URL of the Varbi API
    #[arg(long, env = "VARBI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Upstream request timeout in seconds
    #[arg(
        long,
        env = "VARBI_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
}

impl ServerArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}
