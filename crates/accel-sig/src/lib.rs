#![deny(clippy::unwrap_used)]

//! Type signatures for accelerator functions and the textual signature mini-language.

mod parse;
mod signature;
mod types;

pub use parse::{MAX_NDIM, SignatureParseError, parse_return_type, parse_signature, parse_type};
pub use signature::{ResolveError, SignatureInput, TypeSignature, resolve_signature};
pub use types::{ArrayType, DeviceType, Layout, ReturnType, ScalarType};
