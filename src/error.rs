//! Error types crossing the crate's public boundary
//!
//! Only malformed-input errors surface as `Result`s; resolution misses and
//! precondition violations are handled by fallback policies or documented
//! caller contracts (see the module docs of `style` and `path`).

use thiserror::Error;

/// Errors raised while decoding SVG path data into key geometry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedPathError {
    /// A token that is neither a command letter, a number, nor a separator
    #[error("unexpected token '{token}' in svg path data")]
    UnexpectedToken { token: String },

    /// A command with fewer coordinate values than its arity requires
    #[error("too few coordinate values for '{command}' in svg path data")]
    TooFewCoordinates { command: char },
}

impl MalformedPathError {
    pub fn unexpected(token: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            token: token.into(),
        }
    }

    pub fn too_few(command: char) -> Self {
        Self::TooFewCoordinates { command }
    }
}

/// Errors raised while assembling a color-rule tree or key geometry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemeError {
    /// The same key id appears in more than one key group of a scheme
    #[error("duplicate key_id '{key_id}' found in color scheme; key_ids must occur only once")]
    DuplicateKeyId { key_id: String },

    /// A color rule without an element name can never match anything
    #[error("color rule in color scheme is missing the required element name")]
    MissingElement,

    /// Two key paths whose segment structures cannot be interpolated
    #[error("paths to interpolate differ in structure at segment {segment}")]
    MismatchedGeometry { segment: usize },

    /// The scheme declares a format older than the tree format
    #[error("color scheme format {found} is not supported, expected at least {minimum}")]
    UnsupportedFormat { found: String, minimum: String },
}

impl SchemeError {
    pub fn duplicate_key_id(key_id: impl Into<String>) -> Self {
        Self::DuplicateKeyId {
            key_id: key_id.into(),
        }
    }

    pub fn unsupported_format(found: impl Into<String>, minimum: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            found: found.into(),
            minimum: minimum.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_error_display() {
        let err = MalformedPathError::unexpected("@");
        assert!(err.to_string().contains('@'));

        let err = MalformedPathError::too_few('l');
        assert!(err.to_string().contains("'l'"));
    }

    #[test]
    fn test_scheme_error_display() {
        let err = SchemeError::duplicate_key_id("RTRN");
        assert!(err.to_string().contains("RTRN"));

        let err = SchemeError::unsupported_format("1.0", "2.0");
        assert!(err.to_string().contains("1.0"));
        assert!(err.to_string().contains("2.0"));
    }
}
