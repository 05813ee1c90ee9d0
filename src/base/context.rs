//! Ergonomic error context helpers.
//!
//! Provides extension traits for adding context to `Result` types,
//! converting IO errors into context-rich `CookieError` variants.

use crate::base::cookieerror::CookieError;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Attach the file path an IO operation was working on.
    ///
    /// # Example
    /// ```ignore
    /// use cookiemonster::base::context::IoResultExt;
    ///
    /// let json = std::fs::read_to_string(path).path_context(path)?;
    /// // Error: "I/O error on /tmp/cookies.json: No such file or directory"
    /// ```
    fn path_context(self, path: &Path) -> Result<T, CookieError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn path_context(self, path: &Path) -> Result<T, CookieError> {
        self.map_err(|e| CookieError::Io {
            path: path.to_path_buf(),
            source: Arc::new(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_path_context() {
        let result: Result<(), io::Error> = Err(Error::new(ErrorKind::NotFound, "missing"));
        let err = result
            .path_context(Path::new("/tmp/cookies.json"))
            .unwrap_err();

        match err {
            CookieError::Io { path, source } => {
                assert_eq!(path, Path::new("/tmp/cookies.json"));
                assert_eq!(source.kind(), ErrorKind::NotFound);
            }
            _ => panic!("Expected Io"),
        }
    }

    #[test]
    fn test_path_context_message() {
        let result: Result<(), io::Error> = Err(Error::new(ErrorKind::NotFound, "missing"));
        let err = result.path_context(Path::new("jar.json")).unwrap_err();
        assert_eq!(err.to_string(), "I/O error on jar.json: missing");
    }
}
