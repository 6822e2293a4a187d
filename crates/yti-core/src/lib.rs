pub mod envelope;
pub mod error;
pub mod gateway;
pub mod http;
pub mod ingest;
pub mod normalize;
pub mod render;
pub mod types;

pub use error::*;
pub use types::*;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
