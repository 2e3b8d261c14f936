use thiserror::Error;

/// Failures raised by [`crate::OpenAIClient`].
///
/// Returned inside `anyhow::Error`; callers can `downcast_ref::<ClientError>()`.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Chat completion API error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Chat completion response contained no choices")]
    EmptyResponse,

    #[error("Missing client setting: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid API key format")]
    InvalidApiKey,
}
