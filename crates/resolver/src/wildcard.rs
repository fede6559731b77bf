//! Wildcard detection by probing nonexistent sibling names.
//!
//! A zone with `*.example.com` answers every name under `example.com`, which
//! makes ordinary presence checks useless for enumeration. The detector
//! replaces the leftmost label with random labels that are overwhelmingly
//! unlikely to be provisioned; if such names still resolve, the zone is
//! wildcarded.

use crate::pool::ServerPool;
use scout_dns_domain::{has_subdomain, RecordType, ResolveError};
use std::time::Instant;
use tracing::debug;

/// Number of random probe names tried before concluding "wildcard".
const PROBE_TRIALS: usize = 5;

/// Longest label a probe may use, per the DNS label limit.
const MAX_PROBE_LABEL: usize = 63;

/// Probe labels draw from lowercase letters and digits.
pub(crate) const PROBE_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

impl ServerPool {
    /// Whether records of `record_type` under `name`'s parent are served by
    /// a wildcard.
    ///
    /// A name without a subdomain label cannot sit under a wildcard, so the
    /// answer is `false` without any network traffic. Otherwise the leftmost
    /// label is replaced by random labels as long as the 253-octet name
    /// limit allows; `true` only if every probe resolves.
    ///
    /// When the replacement budget is a single character, five random
    /// probes could exhaust a meaningful share of the 36 possible names by
    /// chance, so the check walks all 36 instead and the answer is exact.
    ///
    /// Probe failures other than NXDOMAIN surface as errors; a verdict
    /// based on a half-finished probe run would be wrong in both
    /// directions.
    pub async fn is_wildcard(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<bool, ResolveError> {
        if !has_subdomain(name) {
            return Ok(false);
        }

        let labels: Vec<&str> = name.split('.').collect();

        // Room left for the probe label: the name minus its leftmost label
        // must leave at least one octet under the 253 limit.
        let fixed_len = name.len() - labels[0].len();
        if fixed_len >= 253 {
            return Err(ResolveError::InvalidDomainName(format!(
                "'{}' leaves no room for a probe label",
                name
            )));
        }
        let part_size = (253 - fixed_len).min(MAX_PROBE_LABEL);

        // One deadline spans every probe; a retry inside a probe never
        // resets the clock.
        let deadline = self.deadline();

        if part_size == 1 {
            return self.is_wildcard_one_char(&labels, record_type, deadline).await;
        }

        for trial in 0..PROBE_TRIALS {
            let probe = self.probe_name(&labels, &self.random_label(part_size));
            if !self.is_set_until(&probe, record_type, deadline).await? {
                debug!(name, probe, trial, "probe missing, not a wildcard");
                return Ok(false);
            }
        }

        debug!(name, record_type = %record_type, "all probes resolved, wildcard detected");
        Ok(true)
    }

    /// Exhaustive single-character case: with only 36 candidate names,
    /// check them all. The first absent one settles it.
    async fn is_wildcard_one_char(
        &self,
        labels: &[&str],
        record_type: RecordType,
        deadline: Option<Instant>,
    ) -> Result<bool, ResolveError> {
        for c in PROBE_ALPHABET.chars() {
            let probe = self.probe_name(labels, &c.to_string());
            if !self.is_set_until(&probe, record_type, deadline).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn probe_name(&self, labels: &[&str], probe_label: &str) -> String {
        let mut parts = Vec::with_capacity(labels.len());
        parts.push(probe_label);
        parts.extend_from_slice(&labels[1..]);
        parts.join(".")
    }
}
