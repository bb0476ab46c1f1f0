//! Upload processing stages that run before the remote model is called.
//!
//! - **decode**: Detect the format and decode the uploaded bytes

pub mod decode;

pub use decode::{DecodedImage, ImageDecoder};
