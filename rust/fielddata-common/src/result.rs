//! Result alias and the guard macros used while validating arguments and segment
//! data.
//!
//! Both guards return early from the enclosing function. The name token and the
//! stringified condition end up in the error, so a failed check reads as
//! `invalid data format for 'doc': doc < max_doc`.

use crate::error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns an `InvalidArgument` error from the enclosing function unless `$cond`
/// holds. Use it for conditions the caller is responsible for.
#[macro_export]
macro_rules! verify_arg {
    ($name:ident, $cond:expr) => {
        if !$cond {
            return Err($crate::result::rejected_arg(stringify!($name), stringify!($cond)));
        }
    };
}

/// Returns an `InvalidFormat` error from the enclosing function unless `$cond`
/// holds. Use it for conditions the segment data is responsible for.
#[macro_export]
macro_rules! verify_data {
    ($name:ident, $cond:expr) => {
        if !$cond {
            return Err($crate::result::rejected_data(stringify!($name), stringify!($cond)));
        }
    };
}

#[doc(hidden)]
#[cold]
pub fn rejected_arg(name: &str, condition: &str) -> Error {
    Error::invalid_arg(name, condition)
}

#[doc(hidden)]
#[cold]
pub fn rejected_data(name: &str, condition: &str) -> Error {
    Error::invalid_format(name, condition)
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn check_doc(doc: u32, max_doc: u32) -> crate::Result<u32> {
        verify_data!(doc, doc < max_doc);
        Ok(doc)
    }

    fn check_step(precision_step: u32) -> crate::Result<()> {
        verify_arg!(precision_step, (1..=64).contains(&precision_step));
        Ok(())
    }

    #[test]
    fn test_verify_data() {
        assert_eq!(check_doc(3, 10).unwrap(), 3);
        let err = check_doc(10, 10).unwrap_err();
        assert!(err.is_data_error());
        match err.kind() {
            ErrorKind::InvalidFormat { element, message } => {
                assert_eq!(element, "doc");
                assert_eq!(message, "doc < max_doc");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(
            err.to_string(),
            "invalid data format for 'doc': doc < max_doc"
        );
    }

    #[test]
    fn test_verify_arg() {
        assert!(check_step(4).is_ok());
        let err = check_step(0).unwrap_err();
        assert!(!err.is_data_error());
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { .. }));
        assert!(err.to_string().starts_with("invalid argument precision_step"));
    }
}
