//! Trace context for the simulated hops.
//!
//! A batch shares one 16-byte trace prefix; every hop draws its own 8-byte
//! span id. Correlation ids follow the W3C `traceparent` layout
//! `00-<prefix>-<span>-01`.

use rand::Rng;

pub const PREFIX_BYTES: usize = 16;
pub const SPAN_ID_BYTES: usize = 8;

/// Lowercase hex, two characters per byte.
pub fn encode_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

/// `len` random bytes, hex encoded
pub fn random_hex(rng: &mut impl Rng, len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    encode_hex(&bytes)
}

pub fn new_prefix(rng: &mut impl Rng) -> String {
    random_hex(rng, PREFIX_BYTES)
}

pub fn new_span_id(rng: &mut impl Rng) -> String {
    random_hex(rng, SPAN_ID_BYTES)
}

/// Returns the correlation id and the span id it embeds.
///
/// A fresh span id is drawn when `span_id` is `None`.
pub fn build_correlation_id(
    rng: &mut impl Rng,
    prefix: &str,
    span_id: Option<&str>,
) -> (String, String) {
    let span_id = match span_id {
        Some(s) => s.to_string(),
        None => new_span_id(rng),
    };
    (format!("00-{}-{}-01", prefix, span_id), span_id)
}

/// One hop in a correlation chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub correlation_id: String,
    pub span_id: String,
    /// Span id of the preceding hop; `None` for the chain root
    pub parent_span_id: Option<String>,
}

/// Linear chain of hops under one batch prefix
#[derive(Debug, Clone)]
pub struct CorrelationChain {
    prefix: String,
    last_span_id: Option<String>,
}

impl CorrelationChain {
    /// Start a chain with a freshly drawn prefix
    pub fn new(rng: &mut impl Rng) -> Self {
        Self::with_prefix(new_prefix(rng))
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last_span_id: None,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Another chain under the same prefix, starting from a root hop
    pub fn fork(&self) -> Self {
        Self::with_prefix(self.prefix.clone())
    }

    /// Append a hop whose parent is the previous hop of this chain
    pub fn next_hop(&mut self, rng: &mut impl Rng) -> Hop {
        let (correlation_id, span_id) = build_correlation_id(rng, &self.prefix, None);
        let parent_span_id = self.last_span_id.replace(span_id.clone());
        Hop {
            correlation_id,
            span_id,
            parent_span_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    #[test]
    fn test_encode_hex() {
        assert_eq!(encode_hex(&[]), "");
        assert_eq!(encode_hex(&[0x00, 0x0f, 0xa5, 0xff]), "000fa5ff");

        let mut rng = StdRng::seed_from_u64(7);
        for len in [1usize, 8, 16, 33] {
            let mut bytes = vec![0u8; len];
            rng.fill_bytes(&mut bytes);
            let encoded = encode_hex(&bytes);
            assert_eq!(encoded.len(), len * 2);
            assert!(encoded.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
            assert_eq!(hex::decode(&encoded).unwrap(), bytes);
        }
    }

    #[test]
    fn test_build_correlation_id_with_given_span() {
        let mut rng = StdRng::seed_from_u64(1);
        let (cid, span) = build_correlation_id(&mut rng, "abcd", Some("0144d2590aacd909"));
        assert_eq!(cid, "00-abcd-0144d2590aacd909-01");
        assert_eq!(span, "0144d2590aacd909");
    }

    #[test]
    fn test_build_correlation_id_draws_span() {
        let mut rng = StdRng::seed_from_u64(2);
        let prefix = new_prefix(&mut rng);
        let (cid, span) = build_correlation_id(&mut rng, &prefix, None);
        assert_eq!(span.len(), SPAN_ID_BYTES * 2);
        assert_eq!(cid, format!("00-{}-{}-01", prefix, span));
    }

    #[test]
    fn test_chain_links_parents() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut chain = CorrelationChain::new(&mut rng);

        let first = chain.next_hop(&mut rng);
        let second = chain.next_hop(&mut rng);
        let third = chain.next_hop(&mut rng);

        assert_eq!(first.parent_span_id, None);
        assert_eq!(second.parent_span_id.as_deref(), Some(first.span_id.as_str()));
        assert_eq!(third.parent_span_id.as_deref(), Some(second.span_id.as_str()));
        assert_ne!(first.span_id, second.span_id);

        let mut forked = chain.fork();
        let root = forked.next_hop(&mut rng);
        assert_eq!(root.parent_span_id, None);
        assert_eq!(forked.prefix(), chain.prefix());
    }
}
