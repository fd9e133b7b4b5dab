pub mod memory;

pub use memory::{BackendCall, BackendOp, InMemoryBackend, InMemoryIdentity};
