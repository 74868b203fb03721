pub mod documents;
pub mod store;

pub use documents::Document;
pub use store::{DocumentStore, SaveOutcome, Session};
