use std::collections::BTreeMap;

use crate::{
    error::{HuffmanError, Result},
    symbol::Symbol,
    tree::HuffmanTree,
};

pub const LEFT: bool = false;
pub const RIGHT: bool = true;

/// Symbol to code mapping derived from a [`HuffmanTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable<S: Symbol> {
    codes: BTreeMap<S, Vec<bool>>,
}

impl<S: Symbol> CodeTable<S> {
    /// Walks the tree once, threading the path taken so far. A tree made of a
    /// single leaf gets the one-bit code `0`.
    pub fn assign(root: &HuffmanTree<S>) -> CodeTable<S> {
        let mut codes = BTreeMap::new();
        if let HuffmanTree::Leaf { symbol, .. } = root {
            codes.insert(*symbol, vec![LEFT]);
            return CodeTable { codes };
        }

        let mut stack = vec![(root, Vec::new())];
        while let Some((node, path)) = stack.pop() {
            match node {
                HuffmanTree::Leaf { symbol, .. } => {
                    codes.insert(*symbol, path);
                }
                HuffmanTree::Node { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(RIGHT);
                    stack.push((right.as_ref(), right_path));

                    let mut left_path = path;
                    left_path.push(LEFT);
                    stack.push((left.as_ref(), left_path));
                }
            }
        }
        CodeTable { codes }
    }

    pub fn get(&self, symbol: S) -> Result<&[bool]> {
        self.codes
            .get(&symbol)
            .map(Vec::as_slice)
            .ok_or_else(|| HuffmanError::UnknownSymbol(format!("{:?}", symbol)))
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &Vec<bool>)> {
        self.codes.iter()
    }

    /// Number of payload bits needed to encode symbols with these counts.
    pub fn encoded_bits(&self, counts: &[(S, u64)]) -> Result<u64> {
        let mut bits = 0u64;
        for (symbol, count) in counts {
            bits += self.get(*symbol)?.len() as u64 * count;
        }
        Ok(bits)
    }
}
