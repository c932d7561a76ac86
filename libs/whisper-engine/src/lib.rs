pub mod error;
pub mod publish;
pub mod token;
pub mod validate;

pub use error::HandshakeError;
pub use publish::{DEFAULT_ACK_TIMEOUT, Published, Publisher};
pub use token::{DEFAULT_TOKEN_LEN, TokenGenerator, TokenSource};
pub use validate::{DEFAULT_QUERY_TIMEOUT, LocalValidator, Subscriber, spawn_delivery_task};
