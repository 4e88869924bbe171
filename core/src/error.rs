use thiserror::Error;

/// Errors raised by the K2 core.
#[derive(Debug, Error)]
pub enum K2Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON that failed to deserialize; `path` names the failing field.
    #[error("invalid json at `{path}`: {message}")]
    Json { path: String, message: String },

    #[error("invalid track: {0}")]
    InvalidTrack(String),

    #[error("gpx parse error: {0}")]
    Gpx(String),

    #[error("bad Kettler status line: [{0}]")]
    BadStatusLine(String),

    #[error("publish to {topic} failed: {reason}")]
    Publish { topic: String, reason: String },

    #[error("http request failed: {0}")]
    Http(String),
}

impl From<serde_path_to_error::Error<serde_json::Error>> for K2Error {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        K2Error::Json {
            path: err.path().to_string(),
            message: err.inner().to_string(),
        }
    }
}

impl From<serde_json::Error> for K2Error {
    fn from(err: serde_json::Error) -> Self {
        K2Error::Json {
            path: ".".to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, K2Error>;

/// Deserialize JSON text, reporting the path of the first failing field.
pub fn from_json_str<'de, T>(text: &'de str) -> Result<T>
where
    T: serde::Deserialize<'de>,
{
    let de = &mut serde_json::Deserializer::from_str(text);
    let value = serde_path_to_error::deserialize(de)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Inner {
        #[allow(dead_code)]
        duration: f64,
    }

    #[derive(Debug, serde::Deserialize)]
    struct Outer {
        #[allow(dead_code)]
        levels: Vec<Inner>,
    }

    #[test]
    fn json_error_names_failing_path() {
        let err = from_json_str::<Outer>(r#"{"levels":[{"duration":1},{"duration":"x"}]}"#)
            .unwrap_err();
        match err {
            K2Error::Json { path, .. } => assert_eq!(path, "levels[1].duration"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
