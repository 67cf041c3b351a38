//! Resolution engine - contextual search over the registry store
//!
//! A query context is matched against registration contexts by walking the
//! Cartesian product of the context elements' ancestor chains. The first
//! element varies slowest, so specificity is decided left to right: an
//! exact match on the first element beats any relaxation of it, whatever
//! happens to the elements after it.
//!
//! ```text
//! query context (A, B), A = [A, A0], B = [B, B0]
//!
//!   candidates:  "AB"  →  "AB0"  →  "A0B"  →  "A0B0"
//!                first bucket that exists wins
//! ```

use itertools::{Either, Itertools};

use crate::error::{ComponentError, Result};
use crate::identity::{context_chain, Identity};

use super::store::{context_signature, is_wildcard, ContextBuckets, RegistrationEntry, RegistryStore};

/// Find the entries registered under `key` that best match `context`
///
/// Returns an empty list when nothing matches.
pub fn search(store: &RegistryStore, key: &str, context: &[Identity]) -> Result<Vec<RegistrationEntry>> {
    let chains = context
        .iter()
        .map(context_chain)
        .collect::<Result<Vec<_>>>()?;
    search_chains(store, key, &chains)
}

/// [`search`] over context elements already expanded to their chains
pub fn search_chains(
    store: &RegistryStore,
    key: &str,
    chains: &[Vec<String>],
) -> Result<Vec<RegistrationEntry>> {
    let Some(buckets) = store.buckets(key) else {
        tracing::trace!(key, "no registrations under key");
        return Ok(Vec::new());
    };

    if chains.is_empty() && is_wildcard(key) {
        return untyped_bucket(key, buckets).map(<[RegistrationEntry]>::to_vec);
    }

    for signature in candidate_signatures(chains) {
        if let Some(entries) = buckets.get(&signature) {
            tracing::debug!(key, signature = signature.as_str(), "matched context bucket");
            return Ok(entries.clone());
        }
    }

    tracing::trace!(key, "no context bucket matched");
    Ok(Vec::new())
}

/// Context signatures to try, most specific first
pub fn candidate_signatures(chains: &[Vec<String>]) -> impl Iterator<Item = String> + '_ {
    if chains.is_empty() {
        Either::Left(std::iter::once(String::new()))
    } else {
        Either::Right(
            chains
                .iter()
                .map(|chain| chain.iter())
                .multi_cartesian_product()
                .map(|combination| context_signature(&combination)),
        )
    }
}

/// The bucket answering a context-free wildcard query
fn untyped_bucket<'a>(key: &str, buckets: &'a ContextBuckets) -> Result<&'a [RegistrationEntry]> {
    let mut values = buckets.values();
    if let (Some(only), None) = (values.next(), values.next()) {
        return Ok(only);
    }

    if let Some(entries) = buckets.get("") {
        return Ok(entries);
    }
    if buckets.is_empty() {
        return Ok(&[]);
    }

    let mut signatures: Vec<String> = buckets.keys().cloned().collect();
    signatures.sort();
    Err(ComponentError::InconsistentRegistry {
        key: key.to_string(),
        signatures,
    })
}
