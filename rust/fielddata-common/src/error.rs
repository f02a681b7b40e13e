use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    /// A numeric term whose byte encoding cannot be decoded.
    ///
    /// `term` is the raw encoding, kept for diagnostics.
    pub fn codec(term: &[u8], message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Codec {
                term: term.to_vec(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// An error raised by the term or postings source while it is being scanned.
    pub fn source<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Source {
                context: context.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    pub fn budget_exceeded(requested: u64, remaining: u64) -> Error {
        Error(
            ErrorKind::BudgetExceeded {
                requested,
                remaining,
            }
            .into(),
        )
    }

    /// Returns `true` for errors caused by corrupt or incompatible segment data
    /// (as opposed to resource exhaustion or source failures).
    pub fn is_data_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Codec { .. } | ErrorKind::InvalidFormat { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("invalid data format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },

    #[error("invalid numeric term {term:02x?}: {message}")]
    Codec { term: Vec<u8>, message: String },

    #[error("term source failure: {context}")]
    Source {
        context: String,
        #[source]
        source: StdErrorBoxed,
    },

    #[error("memory budget exceeded: requested {requested} bytes, {remaining} remaining")]
    BudgetExceeded { requested: u64, remaining: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_one_word() {
        assert_eq!(
            std::mem::size_of::<Error>(),
            std::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_codec_error_display() {
        let err = Error::codec(&[0x20, 0x80], "invalid payload byte");
        assert!(err.is_data_error());
        assert_eq!(
            err.to_string(),
            "invalid numeric term [20, 80]: invalid payload byte"
        );
    }

    #[test]
    fn test_source_error_keeps_cause() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated postings");
        let err = Error::source("postings for term 3", io);
        assert!(!err.is_data_error());
        let cause = std::error::Error::source(&err).expect("source");
        assert_eq!(cause.to_string(), "truncated postings");
    }
}
