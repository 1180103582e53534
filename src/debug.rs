use std::fmt;

/// Receives plain-text diagnostic lines when debug mode is enabled.
///
/// Sinks cannot fail the request; anything they do with a line is their own
/// business.
pub trait DebugSink: Send + Sync {
    fn line(&self, line: &str);
}

/// Default sink: one `tracing` INFO event per line, target `apiclient`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DebugSink for TracingSink {
    fn line(&self, line: &str) {
        tracing::info!(target: "apiclient", "{line}");
    }
}

pub(crate) fn request_lines(
    method: &reqwest::Method,
    url: &reqwest::Url,
    headers: &reqwest::header::HeaderMap,
    body: &[u8],
) -> [String; 4] {
    [
        format!("Request Method: {method}"),
        format!("Request URL: {url}"),
        format!("Request Headers: {}", HeaderDump(headers)),
        format!("Request Body: {}", String::from_utf8_lossy(body)),
    ]
}

pub(crate) fn response_lines(
    status: reqwest::StatusCode,
    headers: &reqwest::header::HeaderMap,
    body: &[u8],
) -> [String; 3] {
    [
        format!("Response Status: {status}"),
        format!("Response Headers: {}", HeaderDump(headers)),
        format!("Response Body: {}", String::from_utf8_lossy(body)),
    ]
}

/// Renders headers as `{name: [v1, v2], ...}`.
struct HeaderDump<'a>(&'a reqwest::header::HeaderMap);

impl fmt::Display for HeaderDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, name) in self.0.keys().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: [")?;
            for (value_index, value) in self.0.get_all(name).iter().enumerate() {
                if value_index > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(&String::from_utf8_lossy(value.as_bytes()))?;
            }
            f.write_str("]")?;
        }
        f.write_str("}")
    }
}
