//! Signing for S3 compatible services.
//!
//! Requests are taken by value and handed back signed, with either an
//! `Authorization` header or a presigned query string.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! # fn main() -> s3sign::Result<()> {
//! let req = http::Request::get("https://bucket.s3.amazonaws.com/key").body(())?;
//! let req = s3sign::sign_v4(req, "access_key", "secret_key", "", "us-east-1")?;
//!
//! let url = http::Request::get("https://bucket.s3.amazonaws.com/key").body(())?;
//! let url = s3sign::presign_v4(url, "access_key", "secret_key", "", "us-east-1", Duration::from_secs(3600))?;
//! # Ok(())
//! # }
//! ```
//!
//! Empty access key and secret key mean anonymous access, such requests are
//! returned unchanged.

use std::time::Duration;

use http::Request;

mod config;
pub use config::Config;

mod constants;

mod credential;
pub use credential::Credential;

pub mod v2;
pub mod v4;

pub use s3sign_core::{Error, ErrorKind, Result};
pub use v2::post_presign_signature as post_presign_signature_v2;
pub use v4::post_presign_signature as post_presign_signature_v4;

/// Sign the request with AWS Signature Version 4 for the `s3` service.
///
/// An empty `session_token` means no token.
pub fn sign_v4<T>(
    req: Request<T>,
    access_key: &str,
    secret_key: &str,
    session_token: &str,
    region: &str,
) -> Result<Request<T>> {
    let cred = Credential::new(access_key, secret_key).with_session_token(session_token);
    v4::RequestSigner::new(constants::S3_SERVICE, region).sign(req, &cred)
}

/// Presign the request with AWS Signature Version 4, valid for `expires`.
pub fn presign_v4<T>(
    req: Request<T>,
    access_key: &str,
    secret_key: &str,
    session_token: &str,
    region: &str,
    expires: Duration,
) -> Result<Request<T>> {
    let cred = Credential::new(access_key, secret_key).with_session_token(session_token);
    v4::RequestSigner::new(constants::S3_SERVICE, region).presign(req, &cred, expires)
}

/// Sign the request with AWS Signature Version 2.
pub fn sign_v2<T>(
    req: Request<T>,
    access_key: &str,
    secret_key: &str,
    virtual_host: bool,
) -> Result<Request<T>> {
    let cred = Credential::new(access_key, secret_key);
    v2::RequestSigner::new(virtual_host).sign(req, &cred)
}

/// Presign the request with AWS Signature Version 2, valid for `expires`.
pub fn presign_v2<T>(
    req: Request<T>,
    access_key: &str,
    secret_key: &str,
    expires: Duration,
    virtual_host: bool,
) -> Result<Request<T>> {
    let cred = Credential::new(access_key, secret_key);
    v2::RequestSigner::new(virtual_host).presign(req, &cred, expires)
}
