use s3sign_core::{Env, Error, Result};

use crate::constants::*;
use crate::{v2, v4};

/// Config for signing S3 requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Region used in the V4 credential scope, `us-east-1` for example.
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_REGION`
    /// - env value: `AWS_DEFAULT_REGION`
    pub region: Option<String>,
    /// Service used in the V4 credential scope, defaults to `s3`.
    pub service: String,
    /// Whether the bucket is addressed through the host (`bucket.s3.amazonaws.com`)
    /// instead of the path. Only V2 signing depends on it.
    pub virtual_host: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: None,
            service: S3_SERVICE.to_string(),
            virtual_host: false,
        }
    }
}

impl Config {
    /// Fill the missing region from env.
    pub fn from_env(mut self, env: &impl Env) -> Self {
        if self.region.is_none() {
            self.region = env
                .var(AWS_REGION)
                .or_else(|| env.var(AWS_DEFAULT_REGION))
                .filter(|v| !v.is_empty());
        }

        self
    }

    /// Set the region.
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    /// Build a V4 signer, region is required.
    pub fn v4_signer(&self) -> Result<v4::RequestSigner> {
        let region = self
            .region
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("region is required for signature v4"))?;

        Ok(v4::RequestSigner::new(&self.service, region))
    }

    /// Build a V2 signer.
    pub fn v2_signer(&self) -> v2::RequestSigner {
        v2::RequestSigner::new(self.virtual_host)
    }
}
