pub mod etl;
pub mod extractor;
pub mod loader;
pub mod plan;
pub mod transform;

pub use crate::domain::model::{Record, TableDescriptor, WriteMode};
pub use crate::domain::ports::{Sink, Source};
pub use crate::utils::error::Result;
