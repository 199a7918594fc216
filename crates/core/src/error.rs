use std::error::Error;
use std::fmt::{self, Debug, Display};

use agent_api_model::{ErrorKind, ModelProviderError};

/// The error returned when an agent run fails.
///
/// It wraps the error from the underlying model provider, whichever
/// provider the agent is backed by.
pub struct RunError {
    inner: Box<dyn ModelProviderError>,
}

impl RunError {
    #[inline]
    pub(crate) fn new<E: ModelProviderError>(err: E) -> Self {
        Self {
            inner: Box::new(err),
        }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind()
    }
}

impl Debug for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunError")
            .field("kind", &self.kind())
            .field("inner", &self.inner)
            .finish()
    }
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.inner)
    }
}
