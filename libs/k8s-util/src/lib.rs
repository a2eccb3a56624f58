pub mod error;
pub mod quantity;
pub mod semantic;
pub mod tolerations;
