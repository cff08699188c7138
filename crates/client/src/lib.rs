pub mod backend;
pub mod error;

pub use backend::{BookingBackend, CallbackTransport, FormTransport, QueryTransport};
pub use error::ClientError;
