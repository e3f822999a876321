use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid repository reference: {0}")]
    InvalidReference(String),

    #[error("Missing credential: a non-empty access token is required")]
    MissingCredential,

    #[error("Command `{command}` failed with exit code {}: {}", display_exit_code(.exit_code), trimmed(.stderr))]
    Process {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("HTTP {status} from {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("validation failed\nSTDOUT:\n{stdout}\nSTDERR:\n{stderr}")]
    Validation { stdout: String, stderr: String },

    #[error("Webhook verification failed: {0}")]
    WebhookVerification(String),

    #[error("Workspace error: {0}")]
    Workspace(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

fn trimmed(text: &str) -> &str {
    text.trim()
}

pub type Result<T> = std::result::Result<T, AppError>;
