#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerifyErrorCategory {
    MalformedIdentifier,
    UnresolvedIdentifier,
    UnsupportedIdentifier,
    AnalysisFailed,
    NoDataInWindow,
    NoFailureDetected,
    AmbiguousFailure,
    ZeroCrossingNotFound,
    NonMonotonicDomain,
    UnrecognizedTestType,
    InputValidation,
    IoSystem,
    Internal,
}

impl VerifyErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedIdentifier => "malformed-identifier",
            Self::UnresolvedIdentifier => "unresolved-identifier",
            Self::UnsupportedIdentifier => "unsupported-identifier",
            Self::AnalysisFailed => "analysis-failed",
            Self::NoDataInWindow => "no-data-in-window",
            Self::NoFailureDetected => "no-failure-detected",
            Self::AmbiguousFailure => "ambiguous-failure",
            Self::ZeroCrossingNotFound => "zero-crossing-not-found",
            Self::NonMonotonicDomain => "non-monotonic-domain",
            Self::UnrecognizedTestType => "unrecognized-test-type",
            Self::InputValidation => "input-validation",
            Self::IoSystem => "io-system",
            Self::Internal => "internal",
        }
    }

    pub const fn exit_code(self) -> i32 {
        match self {
            Self::MalformedIdentifier
            | Self::UnresolvedIdentifier
            | Self::UnsupportedIdentifier
            | Self::UnrecognizedTestType
            | Self::InputValidation => 2,
            Self::IoSystem => 3,
            Self::AnalysisFailed => 4,
            Self::NoDataInWindow
            | Self::NoFailureDetected
            | Self::AmbiguousFailure
            | Self::ZeroCrossingNotFound
            | Self::NonMonotonicDomain => 5,
            Self::Internal => 6,
        }
    }
}

/// Fatal evaluation error. Every category aborts the whole job; nothing is
/// retried and no partial results artifact survives a failed run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct VerifyError {
    category: VerifyErrorCategory,
    placeholder: &'static str,
    message: String,
}

pub type EvalResult<T> = Result<T, VerifyError>;

impl VerifyError {
    fn new(
        category: VerifyErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn malformed_identifier(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::MalformedIdentifier, placeholder, message)
    }

    pub fn unresolved_identifier(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::UnresolvedIdentifier, placeholder, message)
    }

    pub fn unsupported_identifier(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::UnsupportedIdentifier, placeholder, message)
    }

    pub fn analysis_failed(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::AnalysisFailed, placeholder, message)
    }

    pub fn no_data_in_window(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::NoDataInWindow, placeholder, message)
    }

    pub fn no_failure_detected(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::NoFailureDetected, placeholder, message)
    }

    pub fn ambiguous_failure(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::AmbiguousFailure, placeholder, message)
    }

    pub fn zero_crossing_not_found(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::ZeroCrossingNotFound, placeholder, message)
    }

    pub fn non_monotonic_domain(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::NonMonotonicDomain, placeholder, message)
    }

    pub fn unrecognized_test_type(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::UnrecognizedTestType, placeholder, message)
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::InputValidation, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::IoSystem, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(VerifyErrorCategory::Internal, placeholder, message)
    }

    pub fn category(&self) -> VerifyErrorCategory {
        self.category
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!(
            "error [{}] {}: {}",
            self.placeholder,
            self.category.as_str(),
            self.message
        )
    }
}
