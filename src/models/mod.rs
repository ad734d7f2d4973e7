mod url;

pub use url::{DecodeResponse, EncodeResponse, UrlRecord, UrlRequest};
