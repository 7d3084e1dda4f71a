use std::io::Read;

use tracing::debug;

use crate::{
    bitmanipulation::BitReader,
    codes::LEFT,
    error::{HuffmanError, Result},
    symbol::Symbol,
    tree::HuffmanTree,
};

// Upper bound on the up-front allocation, the count comes from untrusted input.
const MAX_PREALLOCATED: u64 = 1 << 20;

pub(crate) struct HuffmanDecoder<'a, S: Symbol> {
    tree: Option<&'a HuffmanTree<S>>,
    count: u64,
}

impl<'a, S: Symbol> HuffmanDecoder<'a, S> {
    pub fn new(tree: Option<&'a HuffmanTree<S>>, count: u64) -> Self {
        HuffmanDecoder { tree, count }
    }

    /// Walks the tree bit by bit until exactly `count` symbols are out. Pad
    /// bits after the last code are never read.
    pub fn decode<R: Read>(&self, reader: &mut BitReader<R>) -> Result<Vec<S>> {
        let mut output = Vec::with_capacity(self.count.min(MAX_PREALLOCATED) as usize);
        if self.count == 0 {
            return Ok(output);
        }
        let root = self
            .tree
            .ok_or_else(|| HuffmanError::malformed("symbols expected but no tree present"))?;

        if let HuffmanTree::Leaf { symbol, .. } = root {
            // the lone code is a single bit
            for _ in 0..self.count {
                reader.read_bit()?;
                output.push(*symbol);
            }
            return Ok(output);
        }

        let mut current = root;
        while (output.len() as u64) < self.count {
            let bit = reader.read_bit()?;

            // Move on the tree based on bit value
            if let HuffmanTree::Node { left, right, .. } = current {
                current = if bit == LEFT { left.as_ref() } else { right.as_ref() };
            }

            // Emit once a leaf is reached and restart from the root
            if let HuffmanTree::Leaf { symbol, .. } = current {
                output.push(*symbol);
                current = root;
            }
        }

        debug!(symbols = output.len(), "decoded payload");
        Ok(output)
    }
}
