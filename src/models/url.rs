use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UrlRecord {
    pub id: i64,
    pub long_url: String,
    /// `None` between the insert and the code assignment
    pub short_code: Option<String>,
}

/// Request body shared by `/encode` and `/decode`
#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub short_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DecodeResponse {
    pub long_url: String,
}
