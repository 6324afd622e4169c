/// Per-frame detection failures.
///
/// Both variants abort the current frame only; the caller decides whether to
/// skip it or stop the stream. Neither is retried.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: String },

    #[error("inference failed: {0}")]
    InferenceFailure(String),
}

impl DetectError {
    pub fn invalid_frame(reason: impl Into<String>) -> Self {
        DetectError::InvalidFrame {
            reason: reason.into(),
        }
    }

    pub(crate) fn inference(err: anyhow::Error) -> Self {
        DetectError::InferenceFailure(format!("{:#}", err))
    }
}
