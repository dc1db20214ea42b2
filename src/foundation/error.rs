/// Convenience result type used across imgchain.
pub type ChainResult<T> = Result<T, ChainError>;

/// Parse-time failures of a single operation parameter string.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum ParamError {
    /// A scalar parameter was not a decimal number.
    #[error("invalid parameter value '{0}'")]
    InvalidParameter(String),

    /// A `<width>x<height>` pair was malformed.
    #[error("invalid dimensions '{0}', expected <width>x<height>")]
    InvalidDimensions(String),

    /// The anchor token is not one of the nine supported positions.
    #[error("invalid anchor point '{0}'")]
    InvalidAnchor(String),

    /// A `<dims>@<anchor>` composite was missing its separator.
    #[error("invalid crop spec '{0}', expected <width>x<height>@<anchor>")]
    InvalidCropSpec(String),
}

/// Top-level error taxonomy for chain parsing, execution and caching.
#[derive(thiserror::Error, Debug)]
pub enum ChainError {
    /// A known operation received a parameter it could not parse.
    #[error("invalid {op} parameters: {source}")]
    Param {
        /// Name of the failing operation.
        op: String,
        /// Underlying grammar error.
        #[source]
        source: ParamError,
    },

    /// The chain contained an empty token (`a,,b`, trailing comma, empty chain).
    #[error("empty operation at position {index}")]
    EmptyOperation {
        /// Zero-based token index within the chain.
        index: usize,
    },

    /// The operation name is not in the registry.
    #[error("unknown operation '{op}'")]
    UnknownOperation {
        /// Name as written in the chain.
        op: String,
    },

    /// A transform rejected its (already parsed) input.
    #[error("error applying {op}: {msg}")]
    Transform {
        /// Name of the failing operation.
        op: String,
        /// Human readable cause.
        msg: String,
    },

    /// The requested filename escapes the image root or is otherwise unusable.
    #[error("invalid source path: {0}")]
    InvalidSourcePath(String),

    /// The source image does not exist under the image root.
    #[error("image not found: {0}")]
    SourceNotFound(String),

    /// The source file exists but could not be decoded as an image.
    #[error("source decode error: {0}")]
    SourceDecode(String),

    /// Encoding or persisting a cache entry failed.
    #[error("cache write error: {0}")]
    CacheWrite(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Flat classification of [`ChainError`] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ParamError::InvalidParameter`].
    InvalidParameter,
    /// See [`ParamError::InvalidDimensions`].
    InvalidDimensions,
    /// See [`ParamError::InvalidAnchor`].
    InvalidAnchor,
    /// See [`ParamError::InvalidCropSpec`].
    InvalidCropSpec,
    /// See [`ChainError::EmptyOperation`].
    EmptyOperation,
    /// See [`ChainError::UnknownOperation`].
    UnknownOperation,
    /// See [`ChainError::Transform`].
    TransformError,
    /// See [`ChainError::InvalidSourcePath`].
    InvalidSourcePath,
    /// See [`ChainError::SourceNotFound`].
    SourceNotFound,
    /// See [`ChainError::SourceDecode`].
    SourceDecode,
    /// See [`ChainError::CacheWrite`].
    CacheWriteError,
    /// See [`ChainError::Other`].
    Internal,
}

impl ChainError {
    /// Build a [`ChainError::Param`] value.
    pub fn param(op: impl Into<String>, source: ParamError) -> Self {
        Self::Param {
            op: op.into(),
            source,
        }
    }

    /// Build a [`ChainError::Transform`] value.
    pub fn transform(op: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Transform {
            op: op.into(),
            msg: msg.into(),
        }
    }

    /// Build a [`ChainError::UnknownOperation`] value.
    pub fn unknown_operation(op: impl Into<String>) -> Self {
        Self::UnknownOperation { op: op.into() }
    }

    /// Build a [`ChainError::InvalidSourcePath`] value.
    pub fn invalid_source_path(msg: impl Into<String>) -> Self {
        Self::InvalidSourcePath(msg.into())
    }

    /// Build a [`ChainError::SourceNotFound`] value.
    pub fn source_not_found(name: impl Into<String>) -> Self {
        Self::SourceNotFound(name.into())
    }

    /// Build a [`ChainError::SourceDecode`] value.
    pub fn source_decode(msg: impl Into<String>) -> Self {
        Self::SourceDecode(msg.into())
    }

    /// Build a [`ChainError::CacheWrite`] value.
    pub fn cache_write(msg: impl Into<String>) -> Self {
        Self::CacheWrite(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Param { source, .. } => match source {
                ParamError::InvalidParameter(_) => ErrorKind::InvalidParameter,
                ParamError::InvalidDimensions(_) => ErrorKind::InvalidDimensions,
                ParamError::InvalidAnchor(_) => ErrorKind::InvalidAnchor,
                ParamError::InvalidCropSpec(_) => ErrorKind::InvalidCropSpec,
            },
            Self::EmptyOperation { .. } => ErrorKind::EmptyOperation,
            Self::UnknownOperation { .. } => ErrorKind::UnknownOperation,
            Self::Transform { .. } => ErrorKind::TransformError,
            Self::InvalidSourcePath(_) => ErrorKind::InvalidSourcePath,
            Self::SourceNotFound(_) => ErrorKind::SourceNotFound,
            Self::SourceDecode(_) => ErrorKind::SourceDecode,
            Self::CacheWrite(_) => ErrorKind::CacheWriteError,
            Self::Other(_) => ErrorKind::Internal,
        }
    }

    /// Name of the operation this error is attributed to, if any.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Param { op, .. } | Self::UnknownOperation { op } | Self::Transform { op, .. } => {
                Some(op.as_str())
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
