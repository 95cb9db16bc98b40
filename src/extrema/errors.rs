use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtremaError {
    #[error("Invalid parameter: {message}")]
    Parameter { message: String },

    #[error("Noise budget exhausted: operation needs {needed} levels, {remaining} remaining")]
    NoiseBudgetExhausted { needed: u32, remaining: u32 },

    #[error(
        "Depth budget exceeded for {inputs} inputs: {required} levels required, {available} available"
    )]
    DepthBudgetExceeded {
        inputs: usize,
        required: u32,
        available: u32,
    },

    #[error("Cannot reduce an empty candidate sequence")]
    EmptyInput,

    #[error("Candidate fields out of lockstep: value at level {value}, index at level {index}")]
    CandidateOutOfLockstep { value: u32, index: u32 },

    #[error("Backend operation failed: {source}")]
    Backend {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl ExtremaError {
    pub(crate) fn parameter(message: impl Into<String>) -> Self {
        Self::Parameter {
            message: message.into(),
        }
    }

    pub(crate) fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }
}

pub type ExtremaResult<T> = Result<T, ExtremaError>;
