/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    /// Request body could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialization(serde_json::Error),
    /// Method, URL, or a header could not be turned into a transport request.
    #[error("request construction error: {0}")]
    RequestConstruction(String),
    /// Connection failure, timeout, or other transport fault from `reqwest`.
    #[error("network error: {0}")]
    Network(reqwest::Error),
    /// Response body could not be fully read.
    #[error("io error: {0}")]
    Io(reqwest::Error),
    /// Response body is not the JSON shape the caller asked for.
    #[error("decode error: {0}")]
    Decode(serde_json::Error),
}
