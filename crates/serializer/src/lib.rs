//! Shepherd serializer: converts between typed resources and the loosely
//! typed JSON documents exchanged with the cluster API.

#![forbid(unsafe_code)]

mod doc;
pub mod error;
pub mod normalizers;
mod serializer;

pub use error::{DecodeError, SerializerError, SerializerResult};
pub use normalizers::Normalizer;
pub use serializer::{Serializer, SerializerFactory};
