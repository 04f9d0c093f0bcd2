// Error taxonomy shared by the stores, the API client and the command
// dispatcher. Every variant ends the invocation with exit code 1; `main`
// is the only place that turns one into output.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    /// Bad local input. Raised before anything is sent over the wire.
    #[error("{0}")]
    Validation(String),

    #[error("You are not authenticated. Use the \"chaindb db connect\" command to connect.")]
    NotAuthenticated,

    #[error("Could not connect to server at {url}. Please check if the server is running and the host is correct.")]
    ConnectionRefused { url: String },

    #[error("Connection timed out. Please check your network connection and the server status.")]
    Timeout,

    #[error("Server error: {0}")]
    Server(String),

    /// The server answered with `success: false`.
    #[error("{action}: {message}")]
    Rejected { action: &'static str, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Unknown(String),
}

impl CliError {
    pub fn validation(message: impl Into<String>) -> Self {
        CliError::Validation(message.into())
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return CliError::Timeout;
        }
        if refused_in_chain(&err) {
            let url = err.url().map(|u| u.to_string()).unwrap_or_default();
            return CliError::ConnectionRefused { url };
        }
        let message = err.to_string();
        if message.is_empty() {
            CliError::Unknown("Unknown error occurred".into())
        } else {
            CliError::Unknown(message)
        }
    }
}

fn refused_in_chain(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        source = e.source();
    }
    false
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_renders_action_and_message() {
        let err = CliError::Rejected {
            action: "Search failed",
            message: "bad credentials".into(),
        };
        assert_eq!(err.to_string(), "Search failed: bad credentials");
    }

    #[test]
    fn connection_refused_names_the_url() {
        let err = CliError::ConnectionRefused {
            url: "http://localhost:2818/api/v1/tables".into(),
        };
        assert!(err.to_string().contains("http://localhost:2818/api/v1/tables"));
    }

    #[test]
    fn io_errors_convert() {
        let err: CliError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, CliError::Io(_)));
    }
}
