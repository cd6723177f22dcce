//! Adapters - Implementations of ports and protocol normalization.
//!
//! - `normalize` - flattens upstream response shapes into the uniform event stream
//! - `relay` - wire frames and best-effort delivery to duplex connections
//! - `store` - transcript persistence over key-value backends
//! - `generation` - scripted generation service for tests and development

pub mod generation;
pub mod normalize;
pub mod relay;
pub mod store;
