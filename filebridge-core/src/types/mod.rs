//! Shared data model
//!
//! The solution tree snapshot plus the descriptors and payloads that cross
//! the HTTP boundary. Wire field names are fixed by the browser client.

mod descriptor;
mod node;
mod payload;

pub use descriptor::*;
pub use node::*;
pub use payload::*;
