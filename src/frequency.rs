use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::{
    error::{HuffmanError, Result},
    symbol::Symbol,
};

/// Symbol occurrence counts, sorted ascending by count and then by symbol.
///
/// Every count is at least one and every symbol appears once. The order is
/// what the tree builder uses to break ties, so two tables with the same
/// entries always produce the same tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<S: Symbol> {
    entries: Vec<(S, u64)>,
}

impl<S: Symbol> FrequencyTable<S> {
    /// Builds a table from decoded (symbol, count) pairs, rejecting
    /// duplicated symbols and zero counts.
    pub fn from_entries(entries: Vec<(S, u64)>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut total = 0u64;
        for (symbol, count) in entries.iter() {
            if *count == 0 {
                return Err(HuffmanError::malformed(format!(
                    "symbol {:?} has a zero count",
                    symbol
                )));
            }
            if !seen.insert(*symbol) {
                return Err(HuffmanError::malformed(format!(
                    "symbol {:?} appears twice",
                    symbol
                )));
            }
            total = total
                .checked_add(*count)
                .ok_or_else(|| HuffmanError::malformed("symbol counts overflow"))?;
        }
        Ok(Self::sorted(entries))
    }

    fn sorted(entries: Vec<(S, u64)>) -> Self {
        FrequencyTable {
            entries: entries
                .into_iter()
                .sorted_by_key(|(symbol, count)| (*count, *symbol))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(S, u64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of symbols counted.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn max_count(&self) -> u64 {
        self.entries.last().map(|(_, count)| *count).unwrap_or(0)
    }
}

pub fn count_frequencies<S: Symbol>(symbols: &[S]) -> FrequencyTable<S> {
    let mut counts: HashMap<S, u64> = HashMap::new();
    for s in symbols {
        *counts.entry(*s).or_insert(0) += 1;
    }
    FrequencyTable::sorted(counts.into_iter().collect())
}
