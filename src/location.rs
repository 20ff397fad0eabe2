//! Output location parsing.
//!
//! Athena writes each result to `<output-location>/<execution-id>.csv`. This
//! module splits the configured location into the bucket and key prefix used
//! to read that object back.

use crate::error::{AthenaError, Result};
use std::fmt;
use std::str::FromStr;

/// A parsed `scheme://bucket/prefix` location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    scheme: String,
    bucket: String,
    prefix: String,
}

impl OutputLocation {
    /// Parses a location of the form `scheme://bucket/prefix`.
    ///
    /// Everything after the first `/` following the bucket is the prefix, so
    /// `s3://bucket/a/b/c` has the prefix `a/b/c`. One trailing `/` is dropped.
    /// The separator after the bucket is required; `s3://bucket/` is accepted
    /// and means the bucket root.
    pub fn parse(location: &str) -> Result<Self> {
        let (scheme, rest) = location.split_once("://").ok_or_else(|| {
            AthenaError::config(format!(
                "Invalid output location '{location}'. Expected scheme://bucket/prefix"
            ))
        })?;

        if scheme.is_empty() {
            return Err(AthenaError::config(format!(
                "Output location '{location}' has an empty scheme"
            )));
        }

        let (bucket, prefix) = rest.split_once('/').ok_or_else(|| {
            AthenaError::config(format!(
                "Output location '{location}' has no key prefix after the bucket"
            ))
        })?;

        if bucket.is_empty() {
            return Err(AthenaError::config(format!(
                "Output location '{location}' has an empty bucket name"
            )));
        }

        let prefix = prefix.strip_suffix('/').unwrap_or(prefix);

        Ok(Self {
            scheme: scheme.to_string(),
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        })
    }

    /// Returns the scheme token (usually `s3`).
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the bucket (container) name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the key prefix, without a trailing `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the object key Athena uses for the CSV result of an execution.
    pub fn result_key(&self, execution_id: &str) -> String {
        if self.prefix.is_empty() {
            format!("{execution_id}.csv")
        } else {
            format!("{}/{execution_id}.csv", self.prefix)
        }
    }
}

impl FromStr for OutputLocation {
    type Err = AthenaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for OutputLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.bucket, self.prefix)
    }
}
