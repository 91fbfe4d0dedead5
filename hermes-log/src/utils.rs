use std::error::Error;
use std::fmt;

/// A wrapper around an error that prints its causes.
///
/// # Example
///
/// ```
/// use hermes_log::LogError;
///
/// if let Err(error) = std::env::var("FOO") {
///     hermes_log::error!("env failed: {}", LogError(&error));
/// }
/// ```
pub struct LogError<'a, E: Error + ?Sized>(pub &'a E);

impl<E: Error + ?Sized> fmt::Display for LogError<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;

        let mut source = self.0.source();
        while let Some(s) = source {
            write!(f, "\n  caused by: {s}")?;
            source = s.source();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("inner failure")
        }
    }

    impl Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("outer failure")
        }
    }

    impl Error for Outer {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_prints_cause_chain() {
        let error = Outer(Inner);
        assert_eq!(
            LogError(&error).to_string(),
            "outer failure\n  caused by: inner failure"
        );
    }

    #[test]
    fn test_without_source() {
        assert_eq!(LogError(&Inner).to_string(), "inner failure");
    }
}
