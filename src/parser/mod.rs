//! Email parsing: import of `.eml` files into engine-ready emails.

pub mod eml;

pub use eml::{import_eml, parse_message};
