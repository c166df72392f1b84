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

//! Hash related utils.

use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use hmac::Hmac;
use hmac::Mac;
use sha1::Sha1;
use sha2::Digest;
use sha2::Sha256;

/// Standard base64 with padding.
pub fn base64_encode(content: &[u8]) -> String {
    BASE64_STANDARD.encode(content)
}

/// Lowercase hex SHA256 digest, used for the hashed canonical request and
/// for `x-amz-content-sha256`.
pub fn hex_sha256(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content).as_slice())
}

/// Raw HMAC-SHA256, each step of the V4 signing key chain feeds its output
/// into the next one as key.
pub fn hmac_sha256(key: &[u8], content: &[u8]) -> Vec<u8> {
    let mut h = Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    h.update(content);

    h.finalize().into_bytes().to_vec()
}

/// Lowercase hex HMAC-SHA256, the V4 signature.
pub fn hex_hmac_sha256(key: &[u8], content: &[u8]) -> String {
    let mut h = Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    h.update(content);

    hex::encode(h.finalize().into_bytes())
}

/// Base64 HMAC-SHA1, the V2 signature.
pub fn base64_hmac_sha1(key: &[u8], content: &[u8]) -> String {
    let mut h = Hmac::<Sha1>::new_from_slice(key).expect("HMAC can take key of any size");
    h.update(content);

    base64_encode(&h.finalize().into_bytes())
}
