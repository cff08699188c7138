use common::ValidationError;
use thiserror::Error;

/// Everything a booking attempt can fail with. Validation failures happen
/// before any network call; network and backend failures are surfaced
/// verbatim so the user can retry by hand.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("booking backend error: {0}")]
    Backend(String),
    #[error("{0} is already booked for that court")]
    SlotUnavailable(String),
}
