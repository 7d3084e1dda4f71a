use std::{cmp::Ordering, collections::BinaryHeap, io::Read, io::Write};

use crate::{
    bitmanipulation::{BitReader, BitWriter},
    error::{HuffmanError, Result},
    frequency::FrequencyTable,
    symbol::Symbol,
};

const SHAPE_NODE: bool = false;
const SHAPE_LEAF: bool = true;

// Fibonacci weights summing past u64::MAX are needed to get deeper than ~92 levels.
const MAX_SHAPE_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanTree<S: Symbol> {
    Node {
        weight: u64,
        left: Box<HuffmanTree<S>>,
        right: Box<HuffmanTree<S>>,
    },
    Leaf {
        weight: u64,
        symbol: S,
    },
}

/// Heap entry: lowest weight first, then lowest insertion order. Leaves are
/// inserted in frequency-table order and every merged node goes after all
/// of them, so equal weights always resolve the same way.
struct Candidate<S: Symbol> {
    order: usize,
    tree: HuffmanTree<S>,
}

impl<S: Symbol> Ord for Candidate<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, compare reversed
        (other.tree.weight(), other.order).cmp(&(self.tree.weight(), self.order))
    }
}

impl<S: Symbol> PartialOrd for Candidate<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: Symbol> PartialEq for Candidate<S> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<S: Symbol> Eq for Candidate<S> {}

impl<S: Symbol> HuffmanTree<S> {
    /// Builds the tree for a frequency table, or `None` when the table is
    /// empty. A single entry yields a lone leaf.
    pub fn create(table: &FrequencyTable<S>) -> Option<HuffmanTree<S>> {
        let mut heap: BinaryHeap<Candidate<S>> = table
            .entries()
            .iter()
            .enumerate()
            .map(|(order, (symbol, weight))| Candidate {
                order,
                tree: HuffmanTree::Leaf {
                    weight: *weight,
                    symbol: *symbol,
                },
            })
            .collect();

        let mut order = heap.len();
        while heap.len() > 1 {
            let (Some(left), Some(right)) = (heap.pop(), heap.pop()) else {
                break;
            };
            heap.push(Candidate {
                order,
                tree: HuffmanTree::Node {
                    weight: left.tree.weight() + right.tree.weight(),
                    left: Box::new(left.tree),
                    right: Box::new(right.tree),
                },
            });
            order += 1;
        }
        heap.pop().map(|candidate| candidate.tree)
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffmanTree::Leaf { weight, .. } => *weight,
            HuffmanTree::Node { weight, .. } => *weight,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            HuffmanTree::Leaf { .. } => 0,
            HuffmanTree::Node { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaves(&self) -> Vec<(S, u64)> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                HuffmanTree::Leaf { weight, symbol } => leaves.push((*symbol, *weight)),
                HuffmanTree::Node { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        leaves
    }

    /// True when both trees have the same topology and the same symbol at
    /// every leaf, ignoring weights.
    pub fn same_shape(&self, other: &HuffmanTree<S>) -> bool {
        match (self, other) {
            (HuffmanTree::Leaf { symbol: a, .. }, HuffmanTree::Leaf { symbol: b, .. }) => a == b,
            (
                HuffmanTree::Node {
                    left: la,
                    right: ra,
                    ..
                },
                HuffmanTree::Node {
                    left: lb,
                    right: rb,
                    ..
                },
            ) => la.same_shape(lb) && ra.same_shape(rb),
            _ => false,
        }
    }

    /// Writes the tree in pre-order: `0` then left and right subtrees for a
    /// node, `1` then the symbol bits for a leaf.
    pub fn write_shape<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        match self {
            HuffmanTree::Leaf { symbol, .. } => {
                writer.write_bit(SHAPE_LEAF)?;
                writer.write_value(symbol.to_bits(), S::BITS)?;
            }
            HuffmanTree::Node { left, right, .. } => {
                writer.write_bit(SHAPE_NODE)?;
                left.write_shape(writer)?;
                right.write_shape(writer)?;
            }
        }
        Ok(())
    }

    /// Reads back a tree written by [`HuffmanTree::write_shape`]. The shape
    /// carries no weights, so every node of the result weighs zero.
    pub fn read_shape<R: Read>(reader: &mut BitReader<R>) -> Result<HuffmanTree<S>> {
        let tree = Self::read_subtree(reader, 0)?;
        let mut symbols: Vec<S> = tree.leaves().into_iter().map(|(s, _)| s).collect();
        let leaf_count = symbols.len();
        symbols.sort();
        symbols.dedup();
        if symbols.len() != leaf_count {
            return Err(HuffmanError::malformed("tree shape repeats a symbol"));
        }
        Ok(tree)
    }

    fn read_subtree<R: Read>(reader: &mut BitReader<R>, depth: usize) -> Result<HuffmanTree<S>> {
        if depth >= MAX_SHAPE_DEPTH.min(S::alphabet_size()) {
            return Err(HuffmanError::malformed("tree shape is too deep"));
        }
        if reader.read_bit().map_err(shape_truncated)? == SHAPE_LEAF {
            let bits = reader.read_value(S::BITS).map_err(shape_truncated)?;
            let symbol = S::from_bits(bits)
                .ok_or_else(|| HuffmanError::malformed("symbol out of range in tree shape"))?;
            return Ok(HuffmanTree::Leaf { weight: 0, symbol });
        }
        let left = Self::read_subtree(reader, depth + 1)?;
        let right = Self::read_subtree(reader, depth + 1)?;
        Ok(HuffmanTree::Node {
            weight: 0,
            left: Box::new(left),
            right: Box::new(right),
        })
    }
}

fn shape_truncated(e: HuffmanError) -> HuffmanError {
    match e {
        HuffmanError::TruncatedStream { .. } => HuffmanError::malformed("tree shape ends early"),
        e => e,
    }
}
