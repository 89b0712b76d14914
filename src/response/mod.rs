//! Response view module
//!
//! Decodes the stored body of the last request into JSON forms and persists
//! it to disk on demand. Nothing here fails: undecodable bodies fall back to
//! empty or wrapped values, and write failures come back as a message.

mod view;

pub use view::{ResponseView, SaveOutcome};
