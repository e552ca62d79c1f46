//! Downstream side effect for accepted submissions.
//!
//! Only the logging sink ships; email dispatch, persistence and CRM
//! hand-off would be further implementations of [`SubmissionSink`].

use thiserror::Error;

use crate::forms::types::Submission;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("submission sink unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode submission: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Receives every accepted submission exactly once.
pub trait SubmissionSink: Send + Sync {
    fn deliver(&self, submission: &Submission) -> Result<(), SinkError>;
}

/// Writes the structured submission to the log.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    fn deliver(&self, submission: &Submission) -> Result<(), SinkError> {
        let payload = serde_json::to_string(submission)?;
        tracing::info!(
            submission_id = %submission.id(),
            form = submission.form(),
            payload = %payload,
            "Form submission received"
        );
        Ok(())
    }
}
