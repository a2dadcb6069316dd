//! Error types for the metamorph crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MorphError>;

/// Errors raised while building or driving a transformation graph.
///
/// Build-time variants (`Pattern`, `Build`, `Variable`, `Definition`,
/// `InvalidRegex`) abort graph construction; no partial graph is usable.
/// `Data` and `UnknownMap` are the runtime classes: they propagate
/// synchronously out of the event call that triggered them (lookup tables may
/// be registered after construction, so a missing map is only detectable at
/// apply time).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MorphError {
    #[error("malformed pattern `{0}`: {1}")]
    Pattern(String, String),

    #[error("graph construction error: {0}")]
    Build(String),

    #[error("unresolved variable reference `{0}`")]
    Variable(String),

    #[error("definition error: {0}")]
    Definition(String),

    #[error("unknown map `{0}`")]
    UnknownMap(String),

    #[error("invalid regex `{0}`")]
    InvalidRegex(String),

    #[error("data error: {0}")]
    Data(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = MorphError::Pattern("a[b".to_string(), "unterminated".to_string());
        assert_eq!(err.to_string(), "malformed pattern `a[b`: unterminated");

        let err = MorphError::Build("no sources".to_string());
        assert_eq!(err.to_string(), "graph construction error: no sources");

        let err = MorphError::Variable("isbn".to_string());
        assert_eq!(err.to_string(), "unresolved variable reference `isbn`");

        let err = MorphError::Data("not a number".to_string());
        assert_eq!(err.to_string(), "data error: not a number");
    }

    #[test]
    fn test_error_equality_and_clone() {
        let err = MorphError::UnknownMap("codes".to_string());
        assert_eq!(err, err.clone());
        assert_ne!(err, MorphError::UnknownMap("other".to_string()));
        assert_ne!(err, MorphError::Build("codes".to_string()));
    }

    #[test]
    fn test_result_alias() {
        fn build() -> Result<u32> {
            Err(MorphError::Build("broken".to_string()))
        }
        assert!(build().is_err());
    }
}
