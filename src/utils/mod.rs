pub mod base62;
pub mod url_validator;

pub use url_validator::{parse_long_url, parse_user_id};
