//! AWS Signature Version 2.
//!
//! Still accepted by many S3 compatible services and by Google Cloud Storage
//! in interoperability mode.
//!
//! - [Signing and authenticating REST requests](https://docs.aws.amazon.com/AmazonS3/latest/userguide/RESTAuthentication.html)

use std::collections::HashSet;
use std::fmt::Write;
use std::time::Duration;

use http::header::{HeaderName, AUTHORIZATION, CONTENT_TYPE, DATE};
use http::HeaderValue;
use http::Request;
use log::debug;
use once_cell::sync::Lazy;
use s3sign_core::hash::base64_hmac_sha1;
use s3sign_core::time::{format_http_date, now, DateTime};
use s3sign_core::{Error, Result, SigningMethod, SigningRequest};

use crate::constants::*;
use crate::Credential;

/// Query parameters that take part in the canonicalized resource.
static SUBRESOURCES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "acl",
        "cors",
        "delete",
        "encryption",
        "legal-hold",
        "lifecycle",
        "location",
        "logging",
        "notification",
        "partNumber",
        "policy",
        "replication",
        "requestPayment",
        "response-cache-control",
        "response-content-disposition",
        "response-content-encoding",
        "response-content-language",
        "response-content-type",
        "response-expires",
        "retention",
        "select",
        "select-type",
        "tagging",
        "torrent",
        "uploadId",
        "uploads",
        "versionId",
        "versioning",
        "versions",
        "website",
    ])
});

/// RequestSigner that implement AWS SigV2.
#[derive(Debug, Clone, Default)]
pub struct RequestSigner {
    virtual_host: bool,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer, `virtual_host` tells whether the bucket is carried
    /// by the host instead of the path.
    pub fn new(virtual_host: bool) -> Self {
        Self {
            virtual_host,
            time: None,
        }
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign the request with `Authorization: AWS <access_key>:<signature>`.
    pub fn sign<T>(&self, req: Request<T>, cred: &Credential) -> Result<Request<T>> {
        self.sign_with_method(req, cred, SigningMethod::Header)
    }

    /// Presign the request, the signature is valid until `now + expires_in`.
    pub fn presign<T>(
        &self,
        req: Request<T>,
        cred: &Credential,
        expires_in: Duration,
    ) -> Result<Request<T>> {
        self.sign_with_method(req, cred, SigningMethod::Query(expires_in))
    }

    fn sign_with_method<T>(
        &self,
        req: Request<T>,
        cred: &Credential,
        method: SigningMethod,
    ) -> Result<Request<T>> {
        if cred.is_anonymous() {
            debug!("credential is anonymous, skip signing");
            return Ok(req);
        }

        let now = self.time.unwrap_or_else(now);
        let (mut parts, body) = req.into_parts();
        let mut ctx = SigningRequest::build(&mut parts)?;

        let date = match method {
            SigningMethod::Header => {
                if ctx.headers.get(DATE).is_none() {
                    ctx.headers
                        .insert(DATE, HeaderValue::from_str(&format_http_date(now))?);
                }
                ctx.header_get_or_default(&DATE)?.to_string()
            }
            SigningMethod::Query(expire) => expires_at(now, expire)?.to_string(),
        };

        let string_to_sign = string_to_sign(&ctx, &date, self.virtual_host)?;
        debug!("calculated string to sign: {string_to_sign}");
        let signature = base64_hmac_sha1(
            cred.secret_access_key.as_bytes(),
            string_to_sign.as_bytes(),
        );

        match method {
            SigningMethod::Header => {
                let mut value = HeaderValue::from_str(&format!(
                    "{SIGN_V2_ALGORITHM} {}:{signature}",
                    cred.access_key_id
                ))?;
                value.set_sensitive(true);

                ctx.headers.insert(AUTHORIZATION, value);
            }
            SigningMethod::Query(_) => {
                // A presigned request carries its authentication in the query only.
                ctx.headers.remove(AUTHORIZATION);

                let key_param = if ctx.host().contains(GOOGLE_STORAGE_HOST_MARKER) {
                    GOOGLE_ACCESS_ID_QUERY
                } else {
                    AWS_ACCESS_KEY_ID_QUERY
                };
                ctx.query_set(key_param, cred.access_key_id.as_str());
                ctx.query_set(EXPIRES_QUERY, date);
                ctx.query_set(SIGNATURE_QUERY, signature);
            }
        }

        ctx.apply(&mut parts)?;
        Ok(Request::from_parts(parts, body))
    }
}

/// Calculate the signature of a base64 encoded browser upload policy.
pub fn post_presign_signature(policy_base64: &str, secret_access_key: &str) -> String {
    base64_hmac_sha1(secret_access_key.as_bytes(), policy_base64.as_bytes())
}

fn expires_at(now: DateTime, expire: Duration) -> Result<i64> {
    let delta = chrono::TimeDelta::from_std(expire).map_err(|e| {
        Error::request_invalid(format!("expires {expire:?} is out of range")).with_source(e)
    })?;
    now.checked_add_signed(delta)
        .map(|t| t.timestamp())
        .ok_or_else(|| Error::request_invalid(format!("expires {expire:?} is out of range")))
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// CanonicalizedAmzHeaders +
/// CanonicalizedResource;
/// ```
///
/// `Date` is replaced by the expiry timestamp for presigned requests.
fn string_to_sign(ctx: &SigningRequest, date: &str, virtual_host: bool) -> Result<String> {
    let mut s = String::new();
    writeln!(s, "{}", ctx.method.as_str())?;
    writeln!(
        s,
        "{}",
        ctx.header_get_or_default(&HeaderName::from_static(CONTENT_MD5))?
    )?;
    writeln!(s, "{}", ctx.header_get_or_default(&CONTENT_TYPE)?)?;
    writeln!(s, "{date}")?;

    for (k, v) in canonicalize_amz_headers(ctx)? {
        writeln!(s, "{k}:{v}")?;
    }

    write!(s, "{}", canonicalize_resource(ctx, virtual_host))?;
    Ok(s)
}

fn canonicalize_amz_headers(ctx: &SigningRequest) -> Result<Vec<(String, String)>> {
    let mut headers = ctx.header_to_vec_with_prefix(X_AMZ_PREFIX)?;
    headers.sort();
    Ok(headers)
}

fn canonicalize_resource(ctx: &SigningRequest, virtual_host: bool) -> String {
    let path = ctx.canonical_path(virtual_host);

    let mut params = ctx.query_to_vec_with_filter(|k| SUBRESOURCES.contains(k));
    if params.is_empty() {
        return path;
    }

    // Only the first value of a repeated sub-resource is signed.
    params.sort_by(|a, b| a.0.cmp(&b.0));
    params.dedup_by(|later, earlier| later.0 == earlier.0);

    format!(
        "{path}?{}",
        SigningRequest::query_to_string(params, "=", "&")
    )
}
