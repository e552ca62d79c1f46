//! Error boundary for rendering fallible content.
//!
//! A render step produces `Result<T, E>`. The boundary passes `Ok` content
//! through untouched. On `Err` it fires the on-error hook exactly once and
//! then hands the error to a recovery callback that renders the fallback.

/// Wraps an on-error hook (logging, metrics, reporting).
pub struct ErrorBoundary<H> {
    on_error: H,
}

impl<H> ErrorBoundary<H> {
    pub fn new(on_error: H) -> Self {
        Self { on_error }
    }

    /// Render `result`, recovering from failure with `recover`.
    pub fn render<T, E, R>(&self, result: Result<T, E>, recover: R) -> T
    where
        H: Fn(&E),
        R: FnOnce(E) -> T,
    {
        match result {
            Ok(content) => content,
            Err(err) => {
                (self.on_error)(&err);
                recover(err)
            }
        }
    }
}
