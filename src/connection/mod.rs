//! Connection establishment

mod connect;
mod errors;

pub use connect::{connect, connect_with, establish, load_credentials, resolve_credentials};
pub use errors::{ConnectError, ConnectResult};
