//! Utility functions

pub mod common;
pub mod validation;

pub use common::{decode_timestamp, encode_timestamp, format_timestamp, now};
pub use validation::{name_key, parse_value, validate_name, validate_value};
