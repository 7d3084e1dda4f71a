use std::io::Write;

use tracing::debug;

use crate::{
    bitmanipulation::BitWriter,
    codes::CodeTable,
    error::{HuffmanError, Result},
    symbol::Symbol,
    tree::HuffmanTree,
};

pub(crate) struct HuffmanEncoder<S: Symbol> {
    codes: Option<CodeTable<S>>,
}

impl<S: Symbol> HuffmanEncoder<S> {
    pub fn new(tree: Option<&HuffmanTree<S>>) -> Self {
        HuffmanEncoder {
            codes: tree.map(CodeTable::assign),
        }
    }

    /// Writes the code of every symbol in order, then pads the last byte.
    pub fn encode<W: Write>(&self, symbols: &[S], writer: &mut BitWriter<W>) -> Result<()> {
        let start = writer.bytes_written();
        if let Some(codes) = &self.codes {
            for symbol in symbols {
                writer.write_bits(codes.get(*symbol)?)?;
            }
        } else if let Some(symbol) = symbols.first() {
            return Err(HuffmanError::UnknownSymbol(format!("{:?}", symbol)));
        }
        writer.flush()?;

        debug!(
            symbols = symbols.len(),
            bytes = writer.bytes_written() - start,
            "encoded payload"
        );
        Ok(())
    }
}
