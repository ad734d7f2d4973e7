pub mod codegen;
pub mod error;
pub mod service;

pub use codegen::generate_short_code;
pub use error::{ShortenerError, ShortenerResult};
pub use service::{is_valid_url, Shortener, ShortenerConfig};
