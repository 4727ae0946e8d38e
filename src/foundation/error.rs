pub type SafezoneResult<T> = Result<T, SafezoneError>;

/// Crate error type.
///
/// Every variant renders with a stable prefix so host adapters can surface the reason string to
/// users without matching on the variant.
#[derive(thiserror::Error, Debug)]
pub enum SafezoneError {
    /// Rejected input: bad upload, invalid format geometry, out-of-range style.
    #[error("validation error: {0}")]
    Validation(String),

    /// An upload passed validation but could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Surface allocation or rasterization failed.
    #[error("render error: {0}")]
    Render(String),

    /// The format catalog could not be read.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// The caller is not entitled to the requested operation (tier or quota).
    #[error("entitlement error: {0}")]
    Entitlement(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SafezoneError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    pub fn entitlement(msg: impl Into<String>) -> Self {
        Self::Entitlement(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// The user-facing reason without the variant prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::Validation(s)
            | Self::Decode(s)
            | Self::Render(s)
            | Self::Catalog(s)
            | Self::Entitlement(s)
            | Self::Serde(s) => s.clone(),
            Self::Other(e) => format!("{e:#}"),
        }
    }
}

impl From<serde_json::Error> for SafezoneError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
