//! Result type alias for the clinic service

use super::errors::ClinicError;

/// Result type alias for clinic operations
///
/// # Examples
///
/// ```
/// use clinic::domain::result::Result;
/// use clinic::domain::errors::ClinicError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ClinicError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ClinicError>;
