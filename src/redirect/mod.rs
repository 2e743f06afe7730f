//! Redirect target validation
//!
//! The resolver's output is built from caller-influenced engine names and
//! country codes, so it is re-checked here before any redirect is issued.
//! This is the sole control preventing an open redirect: nothing leaves the
//! service as a `Location` header without passing [`validate`].

use crate::engines::{EngineName, GOOGLE_DOMAINS};
use std::collections::HashSet;
use url::Url;

/// The hostnames a redirect may ever target.
///
/// Computed once at start-up from the Google domain allow-list plus the
/// base domains of the other engines, then shared read-only for the process
/// lifetime.
#[derive(Debug, Clone)]
pub struct SafeDomainSet {
    domains: HashSet<&'static str>,
}

impl SafeDomainSet {
    /// Build the standard set covering every resolvable destination.
    pub fn standard() -> Self {
        let mut domains: HashSet<&'static str> = GOOGLE_DOMAINS.values().copied().collect();
        for engine in EngineName::all() {
            domains.insert(engine.base_domain());
        }
        Self { domains }
    }

    /// Whether `host` equals, or is a dot-suffix subdomain of, a member.
    pub fn permits(&self, host: &str) -> bool {
        self.domains
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{}", d)))
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Why a candidate redirect URL was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The candidate did not parse as a URL.
    Unparseable,
    /// Scheme was not exactly `https`.
    InsecureScheme,
    /// Hostname is outside the safe domain set.
    HostNotAllowed,
    /// The query string carries no `q` parameter.
    MissingQueryParam,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unparseable => "unparseable url",
            Self::InsecureScheme => "insecure scheme",
            Self::HostNotAllowed => "host not allow-listed",
            Self::MissingQueryParam => "missing q parameter",
        }
    }
}

/// Prove a resolved URL is safe to redirect to.
///
/// All checks are required: the URL parses, the scheme is exactly `https`,
/// the hostname is permitted by the safe domain set, and the query string
/// contains a `q` parameter. Any failure must map to a 400-class outcome
/// and never to a redirect.
pub fn validate(candidate: &str, safe: &SafeDomainSet) -> Result<Url, RejectReason> {
    let url = Url::parse(candidate).map_err(|_| RejectReason::Unparseable)?;

    if url.scheme() != "https" {
        return Err(RejectReason::InsecureScheme);
    }

    let host = url.host_str().ok_or(RejectReason::HostNotAllowed)?;
    if !safe.permits(host) {
        return Err(RejectReason::HostNotAllowed);
    }

    if !url.query_pairs().any(|(k, _)| k == "q") {
        return Err(RejectReason::MissingQueryParam);
    }

    Ok(url)
}
