/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// The single origin the embedded editor's messages must carry.
    pub editor_origin: String,
    /// Base URL of the code-generation service.
    pub generator_url: String,
    /// Directory holding the example `.drawio` documents.
    pub templates_dir: String,
    /// How long to wait for the editor to answer an export request.
    pub export_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                       |
    /// |-----------------------|-------------------------------|
    /// | `HOST`                | `0.0.0.0`                     |
    /// | `PORT`                | `3000`                        |
    /// | `CORS_ORIGINS`        | `http://localhost:3000`       |
    /// | `REQUEST_TIMEOUT_SECS`| `30`                          |
    /// | `EDITOR_ORIGIN`       | `https://embed.diagrams.net`  |
    /// | `GENERATOR_URL`       | `http://localhost:8000`       |
    /// | `TEMPLATES_DIR`       | `templates`                   |
    /// | `EXPORT_TIMEOUT_SECS` | `30`                          |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let editor_origin =
            std::env::var("EDITOR_ORIGIN").unwrap_or_else(|_| "https://embed.diagrams.net".into());

        let generator_url =
            std::env::var("GENERATOR_URL").unwrap_or_else(|_| "http://localhost:8000".into());

        let templates_dir = std::env::var("TEMPLATES_DIR").unwrap_or_else(|_| "templates".into());

        let export_timeout_secs: u64 = std::env::var("EXPORT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("EXPORT_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            editor_origin,
            generator_url,
            templates_dir,
            export_timeout_secs,
        }
    }
}
