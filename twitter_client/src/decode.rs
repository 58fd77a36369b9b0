use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::response::RemoteFailure;

#[derive(Deserialize)]
struct Envelope {
    object: serde_json::Value,
}

/// Decode a raw response body.
///
/// The body is wrapped as `{"object": <body>}` first, so bare arrays and scalars go
/// through the same path as objects. A failure object in place of the expected shape
/// becomes [`Error::Remote`]. Anything else that does not fit keeps the error of the
/// expected shape.
pub fn decode<T: DeserializeOwned>(name: &str, raw: &str) -> Result<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::EmptyResponse(name.to_string()));
    }

    let wrapped = format!(r#"{{"object":{}}}"#, raw);
    let envelope: Envelope = serde_json::from_str(&wrapped)?;
    match T::deserialize(&envelope.object) {
        Ok(record) => Ok(record),
        Err(e) => match RemoteFailure::deserialize(&envelope.object) {
            Ok(failure) => Err(Error::Remote(match failure.request {
                Some(request) => format!("{} ({})", failure.error, request),
                None => failure.error,
            })),
            Err(_) => Err(e.into()),
        },
    }
}
