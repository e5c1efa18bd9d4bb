/// Configuration constants for the Cloud Controller V3 API
pub mod api {
    /// Header carrying URL-encoded, comma separated warnings
    pub const WARNINGS_HEADER: &str = "X-Cf-Warnings";

    /// Default content type for request and response bodies
    pub const JSON_CONTENT_TYPE: &str = "application/json";

    /// Content type of application manifests
    pub const YAML_CONTENT_TYPE: &str = "application/x-yaml";
}

/// HTTP transport settings
pub mod http {
    /// TCP connect timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Whole-request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Idle connections kept per host
    pub const POOL_MAX_IDLE_PER_HOST: usize = 20;

    /// Idle connection lifetime in seconds
    pub const POOL_IDLE_TIMEOUT_SECS: u64 = 90;
}

/// Configuration constants for the UAA token service
pub mod uaa {
    /// Token endpoint path, relative to the UAA URL
    pub const TOKEN_PATH: &str = "/oauth/token";

    /// OAuth client used by the CLI when none is configured
    pub const DEFAULT_CLIENT_ID: &str = "cf";

    /// Secret of the default OAuth client
    pub const DEFAULT_CLIENT_SECRET: &str = "";

    /// Form content type for token requests
    pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
}

/// Configuration constants for the settings file
pub mod settings {
    /// Directory holding the settings file, relative to the home directory
    pub const DIR_NAME: &str = ".cf";

    /// Settings file name
    pub const FILE_NAME: &str = "config.json";

    /// Overrides the home directory used to locate the settings file
    pub const HOME_ENV_VAR: &str = "CF_HOME";

    /// Forces TLS validation off when set to a true value
    pub const SKIP_SSL_ENV_VAR: &str = "CF_SKIP_SSL_VALIDATION";
}

/// Default values for CLI
pub mod defaults {
    /// Default log level
    pub const LOG_LEVEL: &str = "warn";
}
