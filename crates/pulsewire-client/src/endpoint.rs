//! Hub endpoint derivation.

use thiserror::Error;
use url::Url;

/// Path the hub listens on unless told otherwise.
pub const DEFAULT_PATH: &str = "/ws";

/// Errors deriving a WebSocket URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// Origin could not be parsed as a URL
    #[error("invalid origin {origin:?}: {reason}")]
    InvalidOrigin {
        /// Origin as given
        origin: String,
        /// Parser message
        reason: String,
    },

    /// Origin scheme has no WebSocket counterpart
    #[error("unsupported scheme {0:?}")]
    UnsupportedScheme(String),
}

/// Derive the hub URL from the hosting page's origin.
///
/// `http` becomes `ws` and `https` becomes `wss`; `ws` and `wss` pass
/// through. Any path, query or fragment on `origin` is replaced by `path`
/// (`/ws` if `None`). Host and port are kept.
///
/// # Errors
///
/// - `EndpointError::InvalidOrigin` if `origin` does not parse
/// - `EndpointError::UnsupportedScheme` for any other scheme
pub fn websocket_url(origin: &str, path: Option<&str>) -> Result<Url, EndpointError> {
    let mut url = Url::parse(origin).map_err(|e| EndpointError::InvalidOrigin {
        origin: origin.to_string(),
        reason: e.to_string(),
    })?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
    };

    // http <-> ws are both "special" schemes, so the switch cannot fail
    url.set_scheme(scheme).map_err(|()| EndpointError::UnsupportedScheme(scheme.to_string()))?;

    url.set_path(path.unwrap_or(DEFAULT_PATH));
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
