//! Core components for signing S3 compatible API requests.
//!
//! This crate provides the service agnostic building blocks used by `s3sign`:
//!
//! - [`SigningRequest`]: a working copy of [`http::request::Parts`] that signers mutate
//!   and then apply back to the request.
//! - [`Error`] and [`ErrorKind`]: the error type shared by every signer.
//! - [`Env`]: access to environment variables, used while loading configuration.
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time formatting utilities
//! - [`encode`]: Percent encoding and whitespace normalization used by canonicalization
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod encode;
pub mod hash;
pub mod time;
pub mod utils;

mod env;
pub use env::Env;
pub use env::OsEnv;
pub use env::StaticEnv;
mod error;
pub use error::{Error, ErrorKind, Result};
mod request;
pub use request::{SigningMethod, SigningRequest};
