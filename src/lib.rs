// h2push: HTTP/2 server push orchestration library

pub mod compression;
pub mod config;
pub mod error;
pub mod logging;
pub mod mime;
pub mod push;
pub mod transport;

pub use config::PushConfig;
pub use error::{PushError, ValidationError};
pub use push::{Body, Outcome, PushHandle, PushOptions, PushRequest, PushState, Pusher};
pub use transport::{ChannelEvent, ChannelSink, PushChannel, PushTransport, TransportError};
