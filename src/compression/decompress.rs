use std::fs::File;
use std::io::{self, Read, Write};

use log::{debug, error, info, trace};

use super::replace_on_success;
use crate::bitstream::bitreader::BitReader;
use crate::huffman_coding::huffman::CodeTree;
use crate::tools::cli::HuffOpts;
use crate::tools::report::{report_sizes, report_tree};

/// Decoded bytes are handed to the writer in chunks of this size.
const CHUNK_SIZE: usize = 64 * 1024;

/// Decompress the input file named in opts into the output file named in opts.
pub fn decompress(opts: &HuffOpts) -> io::Result<()> {
    let f_in = File::open(&opts.input).map_err(|e| {
        error!("Can't open {}: {}", opts.input, e);
        e
    })?;
    let compressed = f_in.metadata()?.len();

    // A failed decode leaves the output as it was, never half written.
    let restored = replace_on_success(&opts.output, |f_out| {
        decompress_from(f_in, f_out).map_err(|e| {
            error!("Fatal error: {} is not a valid compressed file. {}", opts.input, e);
            e
        })
    })?;

    report_sizes(compressed, restored);
    Ok(())
}

/// Decompress everything the reader holds into the writer. Returns the number of bytes
/// restored.
pub fn decompress_from<R: Read, W: Write>(reader: R, mut writer: W) -> io::Result<u64> {
    let mut br = BitReader::new(reader);

    let count = br.bint(32)?;
    info!("Compressed stream holds {} bytes.", count);
    if count == 0 {
        writer.flush()?;
        return Ok(0);
    }

    let tree = CodeTree::deserialize(&mut br)?;
    report_tree(&tree);
    trace!("Reading payload at {}.", br.loc());

    let mut chunk = Vec::with_capacity(CHUNK_SIZE.min(count as usize));
    for done in 0..count {
        match tree.decode(&mut br) {
            Ok(symbol) => chunk.push(symbol),
            Err(e) => {
                error!(
                    "Compressed stream ended after {} of {} bytes at {}.",
                    done,
                    count,
                    br.loc()
                );
                return Err(e);
            }
        }
        if chunk.len() == CHUNK_SIZE {
            writer.write_all(&chunk)?;
            chunk.clear();
        }
    }
    writer.write_all(&chunk)?;
    writer.flush()?;

    debug!("Payload ended at {}.", br.loc());
    Ok(count as u64)
}

/// Decompress a whole artifact held in memory.
pub fn decompress_bytes(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    decompress_from(data, &mut out)?;
    Ok(out)
}
