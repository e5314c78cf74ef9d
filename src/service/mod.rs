//! AdminService and the field, codec and validation layers it composes.

pub mod admin;
pub mod codec;
pub mod fields;
mod validation;

pub use admin::{AdminService, PAGE_SIZE};
pub use fields::FieldMeta;
pub use validation::RequestValidator;
