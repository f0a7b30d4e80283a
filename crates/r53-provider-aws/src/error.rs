// Mapping of Route 53 service errors onto r53_core::Error.
//
// The engine only retries `Throttled`, and reads only treat `NotFound` as
// drift, so the classification here decides both.

use aws_sdk_route53::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use r53_core::Error;

/// Convert an SDK failure for `operation` into a core error
pub(crate) fn sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    classify_error_code(operation, code.as_deref(), &message)
}

/// A request shape the SDK refused to build
pub(crate) fn build_error(what: &str, err: BuildError) -> Error {
    Error::invalid_input(format!("cannot build {what}: {err}"))
}

/// A response missing a member the call always returns
pub(crate) fn missing(operation: &str, member: &str) -> Error {
    Error::api(operation, None, format!("response has no {member}"))
}

/// Classify a Route 53 error code
pub fn classify_error_code(operation: &str, code: Option<&str>, message: &str) -> Error {
    let Some(code) = code else {
        return Error::api(operation, None, message);
    };

    match code {
        "Throttling" | "ThrottlingException" | "PriorRequestNotComplete" | "ConcurrentModification" => {
            Error::throttled(format!("{operation}: {message}"))
        }
        "InvalidChangeBatch" if message.contains("already exists") => {
            Error::already_exists(message.to_string())
        }
        "InvalidChangeBatch" if message.contains("not found") => Error::not_found(message.to_string()),
        c if c.starts_with("NoSuch") || c.ends_with("NotFound") => {
            Error::not_found(format!("{c}: {message}"))
        }
        c if c.contains("AlreadyExists") || c == "ConflictingDomainExists" => {
            Error::already_exists(format!("{c}: {message}"))
        }
        c if c.starts_with("Invalid") && c != "InvalidChangeBatch" => {
            Error::invalid_input(format!("{c}: {message}"))
        }
        c => Error::api(operation, Some(c.to_string()), message),
    }
}
