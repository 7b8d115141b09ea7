use thiserror::Error;

/// Fallback shown when the server gives no usable rejection text.
pub const GENERIC_SUBMIT_ERROR: &str = "An error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Team rosters must cover both the IT and the Medical role.
    #[error("Your team must have at least one member with an IT or Medical role.")]
    TeamRoleCoverage,
    #[error("Please fill in all required fields for individual registration: name, email, role, and competence.")]
    IndividualRequiredFields,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The server answered and rejected the registration; the text is the
    /// server's own.
    #[error("{0}")]
    Rejected(String),
    #[error("An error occurred. Please try again.")]
    Transport(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("{0}")]
    Server(String),
    #[error("Unable to send message.")]
    Transport(#[source] anyhow::Error),
}
