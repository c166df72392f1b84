// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! AWS Signature Version 4.
//!
//! - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)

use std::fmt::{Debug, Display, Formatter, Write};
use std::time::Duration;

use http::header;
use http::HeaderValue;
use http::Request;
use log::debug;
use s3sign_core::encode::{trim_all, uri_encode_query};
use s3sign_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use s3sign_core::time::{format_date, format_iso8601, now, DateTime};
use s3sign_core::{Error, Result, SigningMethod, SigningRequest};

use crate::constants::*;
use crate::Credential;

/// Headers that never take part in the signature.
const IGNORED_HEADERS: [&str; 3] = ["authorization", "user-agent", "accept-encoding"];

/// RequestSigner that implement AWS SigV4.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

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

    /// Region this signer signs for.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service this signer signs for.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Sign the request by adding an `Authorization` header.
    ///
    /// Anonymous credential returns the request unchanged.
    pub fn sign<T>(&self, req: Request<T>, cred: &Credential) -> Result<Request<T>> {
        self.sign_with_method(req, cred, SigningMethod::Header)
    }

    /// Presign the request by moving all signing material into the query.
    ///
    /// The payload is never signed for presigned requests. Anonymous credential
    /// returns the request unchanged.
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
        let scope = SigningScope::new(now, &self.region, &self.service);
        debug!("calculated scope: {scope}");

        let (mut parts, body) = req.into_parts();
        let mut signed_req = SigningRequest::build(&mut parts)?;

        // canonicalize context
        canonicalize_header(&mut signed_req, cred, method, now)?;
        let signed_headers = signed_header_names(&signed_req).join(";");
        canonicalize_query(&mut signed_req, cred, method, now, &scope, &signed_headers);

        let creq = CanonicalRequest::build(&signed_req, method)?;
        debug!("calculated canonical request: {creq}");

        let string_to_sign = string_to_sign(now, &scope, &creq)?;
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = SigningKey::derive(&cred.secret_access_key, &scope);
        let signature = signing_key.sign(&string_to_sign);

        match method {
            SigningMethod::Query(_) => {
                signed_req.query_push(X_AMZ_SIGNATURE_QUERY, signature);
            }
            SigningMethod::Header => {
                let mut authorization = HeaderValue::from_str(&format!(
                    "{SIGN_V4_ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                    cred.access_key_id,
                ))?;
                authorization.set_sensitive(true);

                signed_req
                    .headers
                    .insert(header::AUTHORIZATION, authorization);
            }
        }

        signed_req.apply(&mut parts)?;
        Ok(Request::from_parts(parts, body))
    }
}

/// Credential scope: `20130524/us-east-1/s3/aws4_request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningScope {
    date: String,
    region: String,
    service: String,
}

impl SigningScope {
    /// Build the scope for given time, region and service.
    pub fn new(time: DateTime, region: &str, service: &str) -> Self {
        Self {
            date: format_date(time),
            region: region.to_string(),
            service: service.to_string(),
        }
    }
}

impl Display for SigningScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{SCOPE_TERMINATOR}",
            self.date, self.region, self.service
        )
    }
}

/// Key derived from the secret key for one scope.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Derive the signing key.
    pub fn derive(secret_access_key: &str, scope: &SigningScope) -> Self {
        let secret = format!("AWS4{secret_access_key}");
        let date_key = hmac_sha256(secret.as_bytes(), scope.date.as_bytes());
        let region_key = hmac_sha256(&date_key, scope.region.as_bytes());
        let service_key = hmac_sha256(&region_key, scope.service.as_bytes());

        SigningKey(hmac_sha256(&service_key, SCOPE_TERMINATOR.as_bytes()))
    }

    /// Hex encoded signature of given content.
    pub fn sign(&self, content: &str) -> String {
        hex_hmac_sha256(&self.0, content.as_bytes())
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(***)")
    }
}

/// Hex encoded SHA256 of a payload, the value expected in `x-amz-content-sha256`.
pub fn payload_hash(payload: &[u8]) -> String {
    hex_sha256(payload)
}

/// Calculate the signature of a base64 encoded browser upload policy.
pub fn post_presign_signature(
    policy_base64: &str,
    time: DateTime,
    secret_access_key: &str,
    region: &str,
) -> String {
    let scope = SigningScope::new(time, region, S3_SERVICE);
    SigningKey::derive(secret_access_key, &scope).sign(policy_base64)
}

struct CanonicalRequest<'a> {
    method: &'a http::Method,
    path: &'a str,
    query: String,
    headers: Vec<(&'a str, String)>,
    signed_headers: String,
    payload_hash: &'a str,
}

impl<'a> CanonicalRequest<'a> {
    fn build(req: &'a SigningRequest, method: SigningMethod) -> Result<Self> {
        let query = req
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", uri_encode_query(k), uri_encode_query(v)))
            .collect::<Vec<_>>()
            .join("&");

        let names = signed_header_names(req);
        let mut headers = Vec::with_capacity(names.len());
        for name in names.iter() {
            let mut value = String::new();
            for (idx, v) in req.headers.get_all(*name).iter().enumerate() {
                if idx != 0 {
                    value.push(',');
                }
                value.push_str(&trim_all(std::str::from_utf8(v.as_bytes())?));
            }
            headers.push((*name, value));
        }

        let payload_hash = match method {
            SigningMethod::Query(_) => UNSIGNED_PAYLOAD,
            SigningMethod::Header => {
                let v = req.header_get_or_default(&header::HeaderName::from_static(
                    X_AMZ_CONTENT_SHA_256,
                ))?;
                if v.is_empty() {
                    UNSIGNED_PAYLOAD
                } else {
                    v
                }
            }
        };

        Ok(Self {
            method: &req.method,
            path: &req.path,
            query,
            headers,
            signed_headers: names.join(";"),
            payload_hash,
        })
    }

    fn hash(&self) -> Result<String> {
        let mut s = String::with_capacity(256);
        write!(s, "{self}")?;
        Ok(hex_sha256(s.as_bytes()))
    }
}

impl Display for CanonicalRequest<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.path)?;
        writeln!(f, "{}", self.query)?;
        for (k, v) in self.headers.iter() {
            writeln!(f, "{k}:{v}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers)?;
        write!(f, "{}", self.payload_hash)
    }
}

fn string_to_sign(now: DateTime, scope: &SigningScope, creq: &CanonicalRequest) -> Result<String> {
    let mut s = String::with_capacity(128);
    writeln!(s, "{SIGN_V4_ALGORITHM}")?;
    writeln!(s, "{}", format_iso8601(now))?;
    writeln!(s, "{scope}")?;
    write!(s, "{}", creq.hash()?)?;
    Ok(s)
}

fn signed_header_names(req: &SigningRequest) -> Vec<&str> {
    req.header_name_to_vec_sorted()
        .into_iter()
        .filter(|k| !IGNORED_HEADERS.contains(k))
        .collect()
}

fn canonicalize_header(
    req: &mut SigningRequest,
    cred: &Credential,
    method: SigningMethod,
    now: DateTime,
) -> Result<()> {
    // The signature covers the canonical form of the path, send exactly that.
    req.path = req.canonical_path(false);

    if req.headers.get(header::HOST).is_none() {
        let host = HeaderValue::from_str(req.authority.as_str())?;
        req.headers.insert(header::HOST, host);
    }

    if method == SigningMethod::Header {
        req.headers
            .insert(X_AMZ_DATE, HeaderValue::from_str(&format_iso8601(now))?);

        if req.headers.get(X_AMZ_CONTENT_SHA_256).is_none() {
            req.headers.insert(
                X_AMZ_CONTENT_SHA_256,
                HeaderValue::from_static(UNSIGNED_PAYLOAD),
            );
        }

        if let Some(token) = &cred.session_token {
            let mut value = HeaderValue::from_str(token).map_err(|e| {
                Error::credential_invalid("session token is not a valid header value")
                    .with_source(e)
            })?;
            // Set token value sensitive to avoid leaking.
            value.set_sensitive(true);

            req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }
    } else {
        // Leftovers from an earlier header signing must not be signed or sent.
        req.headers.remove(header::AUTHORIZATION);
        req.headers.remove(X_AMZ_DATE);
        req.headers.remove(X_AMZ_CONTENT_SHA_256);
        req.headers.remove(X_AMZ_SECURITY_TOKEN);
    }

    Ok(())
}

fn canonicalize_query(
    req: &mut SigningRequest,
    cred: &Credential,
    method: SigningMethod,
    now: DateTime,
    scope: &SigningScope,
    signed_headers: &str,
) {
    if let SigningMethod::Query(expire) = method {
        // Drop leftovers of an earlier presign.
        req.query_remove(X_AMZ_SIGNATURE_QUERY);
        req.query_remove(X_AMZ_SECURITY_TOKEN_QUERY);

        req.query_set(X_AMZ_ALGORITHM_QUERY, SIGN_V4_ALGORITHM);
        req.query_set(
            X_AMZ_CREDENTIAL_QUERY,
            format!("{}/{scope}", cred.access_key_id),
        );
        req.query_set(X_AMZ_DATE_QUERY, format_iso8601(now));
        req.query_set(X_AMZ_EXPIRES_QUERY, expire.as_secs().to_string());
        if let Some(token) = &cred.session_token {
            req.query_set(X_AMZ_SECURITY_TOKEN_QUERY, token.as_str());
        }
        req.query_set(X_AMZ_SIGNED_HEADERS_QUERY, signed_headers);
    }

    // Sort by encoded key and value.
    req.query
        .sort_by_cached_key(|(k, v)| (uri_encode_query(k), uri_encode_query(v)));
}
