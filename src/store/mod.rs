//! On-disk state owned by the host: the rules file and the JSON email store.

pub mod emails;
pub mod rules;

pub use emails::{load_emails, save_emails};
pub use rules::{load_rules, save_rules};
