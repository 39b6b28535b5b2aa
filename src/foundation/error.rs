/// Convenience result type used across the studio core.
pub type StudioResult<T> = Result<T, StudioError>;

/// Top-level error taxonomy.
///
/// Editing operations never produce these: stale ids, empty selections and missed raycasts are
/// expected conditions and are handled as no-ops. Only conditions that leave the caller without
/// usable output are surfaced.
#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    /// Invalid user-provided dimensions, colors or documents.
    #[error("validation error: {0}")]
    Validation(String),

    /// Image encoding failed; no usable export was produced.
    #[error("encode error: {0}")]
    Encode(String),

    /// Image or SVG decoding failed.
    #[error("decode error: {0}")]
    Decode(String),

    /// The scene renderer could not produce a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StudioError {
    /// Build a [`StudioError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StudioError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`StudioError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`StudioError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StudioError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for StudioError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            StudioError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(StudioError::encode("x").to_string().contains("encode error:"));
        assert!(StudioError::decode("x").to_string().contains("decode error:"));
        assert!(StudioError::render("x").to_string().contains("render error:"));
        assert!(
            StudioError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = StudioError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn serde_json_errors_convert() {
        let err: StudioError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, StudioError::Serde(_)));
    }
}
