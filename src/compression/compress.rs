use std::fs;
use std::io::{self, Error, ErrorKind, Write};

use log::{debug, error, info, trace};

use super::replace_on_success;
use crate::bitstream::bitwriter::BitWriter;
use crate::huffman_coding::huffman::CodeTree;
use crate::tools::cli::HuffOpts;
use crate::tools::freq_count::freqs;
use crate::tools::report::{mean_code_len, report_sizes, report_tree};

/// Compress the input file named in opts into the output file named in opts.
pub fn compress(opts: &HuffOpts) -> io::Result<()> {
    let data = fs::read(&opts.input).map_err(|e| {
        error!("Can't read {}: {}", opts.input, e);
        e
    })?;
    info!("Read {} bytes from {}.", data.len(), opts.input);

    // The output only appears (or changes) once the whole artifact is written.
    let written = replace_on_success(&opts.output, |f_out| compress_to(&data, f_out))?;

    report_sizes(data.len() as u64, written);
    Ok(())
}

/// Compress data into the writer. Returns the number of bytes written.
pub fn compress_to<W: Write>(data: &[u8], writer: W) -> io::Result<u64> {
    // The count field is 32 bits wide.
    let count = u32::try_from(data.len()).map_err(|_| {
        Error::new(
            ErrorKind::InvalidInput,
            format!(
                "input of {} bytes is larger than the {} byte limit",
                data.len(),
                u32::MAX
            ),
        )
    })?;

    let mut bw = BitWriter::new(writer);
    bw.out32(count)?;

    let freqs = freqs(data);
    match CodeTree::build(&freqs)? {
        None => debug!("Empty input, writing the symbol count only."),
        Some(tree) => {
            report_tree(&tree);
            debug!(
                "Mean code length is {:.3} bits per byte.",
                mean_code_len(&tree, &freqs)
            );

            trace!("Writing tree header at {}.", bw.loc());
            tree.serialize(&mut bw)?;

            trace!("Writing payload at {}.", bw.loc());
            for &byte in data {
                tree.encode(byte, &mut bw)?;
            }
        }
    }

    bw.flush()?;
    trace!("Padded the last byte with {} bits.", bw.padding());
    Ok(bw.bytes_written())
}

/// Compress data into a fresh buffer.
pub fn compress_bytes(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    compress_to(data, &mut out)?;
    Ok(out)
}
