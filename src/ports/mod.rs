//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the core and the outside world. Adapters implement these ports.
//!
//! - `KeyValueStore` - durable byte store (get/put)
//! - `SessionStore` - transcript persistence layered on top of it
//! - `GenerationService` - upstream generative text service
//! - `ConnectionSink` - duplex connection endpoint for frame delivery

mod connection;
mod generation;
mod key_value_store;
mod session_store;

pub use connection::{ConnectionSink, ConnectionTarget, DeliveryError};
pub use generation::{
    CompletionChunk, CompletionStream, DeltaEvent, DeltaEventStream, GenerationError,
    GenerationRequest, GenerationService, TextDelta, UpstreamResponse,
};
pub use key_value_store::{KeyValueStore, KvError};
pub use session_store::{SessionStore, StoreError};
