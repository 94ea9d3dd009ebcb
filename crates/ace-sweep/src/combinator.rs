use ace_core::errors::{AceError, ErrorInfo};
use ace_core::Configuration;

/// Number of non-empty subsets of a base set of `m` components.
///
/// Rejects an empty base set and any set too large to enumerate.
pub fn combination_count(m: usize) -> Result<u64, AceError> {
    if m < 1 {
        return Err(AceError::Config(ErrorInfo::new(
            "no-components",
            "the base component set must contain at least one component",
        )));
    }
    if m >= 64 {
        return Err(AceError::Config(
            ErrorInfo::new(
                "component-set-too-large",
                "the base component set cannot be enumerated",
            )
            .with_context("m", m.to_string()),
        ));
    }
    Ok((1u64 << m) - 1)
}

/// Lazy sequence of every non-empty subset of the base component set.
///
/// Subsets are produced in increasing size order and, within a size, in
/// lexicographic index order. The sequence is stable across runs for a given
/// base set; ordinals start at 1.
#[derive(Debug, Clone)]
pub struct Configurations {
    components: Vec<String>,
    indices: Vec<usize>,
    total: u64,
    next_ordinal: u64,
    exhausted: bool,
}

/// Builds the configuration sequence for the given base set.
pub fn configurations(base: &[String]) -> Result<Configurations, AceError> {
    let total = combination_count(base.len())?;
    Ok(Configurations {
        components: base.to_vec(),
        indices: vec![0],
        total,
        next_ordinal: 1,
        exhausted: false,
    })
}

impl Configurations {
    /// Total number of configurations the sequence will yield.
    pub fn total(&self) -> u64 {
        self.total
    }

    fn advance(&mut self) {
        let m = self.components.len();
        let k = self.indices.len();
        // Find the rightmost index with headroom and reset everything after it.
        for i in (0..k).rev() {
            if self.indices[i] < m - (k - i) {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                return;
            }
        }
        // Current size exhausted; move to the next subset size.
        if k == m {
            self.exhausted = true;
            return;
        }
        self.indices = (0..k + 1).collect();
    }
}

impl Iterator for Configurations {
    type Item = Configuration;

    fn next(&mut self) -> Option<Configuration> {
        if self.exhausted {
            return None;
        }
        let item = Configuration {
            ordinal: self.next_ordinal,
            components: self
                .indices
                .iter()
                .map(|&i| self.components[i].clone())
                .collect(),
        };
        self.next_ordinal += 1;
        self.advance();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        let remaining = (self.total - (self.next_ordinal - 1)) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Configurations {}
