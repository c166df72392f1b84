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

// Service identifiers.
pub const S3_SERVICE: &str = "s3";

// Algorithms.
pub const SIGN_V4_ALGORITHM: &str = "AWS4-HMAC-SHA256";
pub const SIGN_V2_ALGORITHM: &str = "AWS";
pub const SCOPE_TERMINATOR: &str = "aws4_request";
pub const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

// Headers used in aws services.
pub const CONTENT_MD5: &str = "content-md5";
pub const X_AMZ_CONTENT_SHA_256: &str = "x-amz-content-sha256";
pub const X_AMZ_DATE: &str = "x-amz-date";
pub const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";
pub const X_AMZ_PREFIX: &str = "x-amz";

// Query parameters used by presigned V4 requests.
pub const X_AMZ_ALGORITHM_QUERY: &str = "X-Amz-Algorithm";
pub const X_AMZ_CREDENTIAL_QUERY: &str = "X-Amz-Credential";
pub const X_AMZ_DATE_QUERY: &str = "X-Amz-Date";
pub const X_AMZ_EXPIRES_QUERY: &str = "X-Amz-Expires";
pub const X_AMZ_SECURITY_TOKEN_QUERY: &str = "X-Amz-Security-Token";
pub const X_AMZ_SIGNED_HEADERS_QUERY: &str = "X-Amz-SignedHeaders";
pub const X_AMZ_SIGNATURE_QUERY: &str = "X-Amz-Signature";

// Query parameters used by presigned V2 requests.
pub const AWS_ACCESS_KEY_ID_QUERY: &str = "AWSAccessKeyId";
pub const GOOGLE_ACCESS_ID_QUERY: &str = "GoogleAccessId";
pub const EXPIRES_QUERY: &str = "Expires";
pub const SIGNATURE_QUERY: &str = "Signature";

// Hosts that expect `GoogleAccessId` in V2 presigned requests.
pub const GOOGLE_STORAGE_HOST_MARKER: &str = ".storage.googleapis.com";

// Env values used in aws services.
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
