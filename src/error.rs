use thiserror::Error;

/// Errors produced by the highlight pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum HighlightError {
    /// A chat-log line that does not match the archive's line format.
    /// Loading of the whole calendar day is aborted; nothing is cached.
    #[error("chat line does not match the expected log format: {line:?}")]
    MalformedChatLine { line: String },

    /// The streamer login could not be resolved to a channel id.
    #[error("streamer {name:?} was not found on Twitch")]
    UnknownStreamer { name: String },

    /// A VOD id was looked up in a session that does not contain it.
    #[error("no VOD with id {id} in this session")]
    VodNotFound { id: u64 },

    /// A collaborator returned a payload the client could not interpret.
    #[error("unexpected payload from {context}")]
    UnexpectedPayload { context: String },

    /// Transport-level failure, surfaced as-is without retry.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, HighlightError>;
