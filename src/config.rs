use clap::Args;
use url::Url;

use crate::cli::chat::service::{DEFAULT_SERVICE, ServiceSelector, UnknownService};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Where to reach the backend and which service to start with.
///
/// Flags win over environment variables, which are also read from `.env`.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Base URL of the backend serving `/ask`
    #[arg(short = 'u', long = "url", env = "POLYGPT_BACKEND_URL", default_value = DEFAULT_BACKEND_URL, global = true)]
    pub backend_url: Url,

    /// Service identifier to select at startup
    #[arg(short, long, env = "POLYGPT_SERVICE", default_value = DEFAULT_SERVICE, global = true)]
    pub service: String,

    /// Additional service identifiers the backend understands
    #[arg(long = "extra-service", value_delimiter = ',', global = true)]
    pub extra_services: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub backend_url: Url,
    pub service: String,
    pub extra_services: Vec<String>,
}

impl ChatConfig {
    pub fn services(&self) -> Result<ServiceSelector, UnknownService> {
        ServiceSelector::new(&self.service, &self.extra_services)
    }
}

impl From<ConnectionArgs> for ChatConfig {
    fn from(args: ConnectionArgs) -> Self {
        Self {
            backend_url: args.backend_url,
            service: args.service,
            extra_services: args.extra_services,
        }
    }
}
