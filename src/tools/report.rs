//! Log summaries for a compression or decompression run.

use log::{debug, info, trace};
use rustc_hash::FxHashMap;

use crate::huffman_coding::huffman::CodeTree;

/// Count how many symbols have each code length.
pub fn code_len_histogram(tree: &CodeTree) -> FxHashMap<usize, usize> {
    let mut histogram = FxHashMap::default();
    for symbol in tree.symbols() {
        if let Some(len) = tree.code_len(symbol) {
            *histogram.entry(len).or_insert(0) += 1;
        }
    }
    histogram
}

/// Average code length in bits per input byte, weighted by frequency.
pub fn mean_code_len(tree: &CodeTree, freqs: &[u64]) -> f64 {
    let (bits, count) = tree
        .symbols()
        .filter_map(|symbol| {
            let freq = *freqs.get(symbol as usize)?;
            Some((tree.code_len(symbol)? as u64 * freq, freq))
        })
        .fold((0_u64, 0_u64), |(bits, count), (b, c)| (bits + b, count + c));
    if count == 0 {
        0.0
    } else {
        bits as f64 / count as f64
    }
}

/// Describe the tree shape at debug level, and dump it at trace level.
pub fn report_tree(tree: &CodeTree) {
    debug!(
        "Code tree has {} leaves, {} internal nodes, depth {}.",
        tree.leaf_count(),
        tree.internal_count(),
        tree.max_depth()
    );
    let mut histogram: Vec<(usize, usize)> = code_len_histogram(tree).into_iter().collect();
    histogram.sort_unstable();
    for (len, count) in histogram {
        debug!("  {:>3} symbols with {:>3} bit codes", count, len);
    }
    if log::log_enabled!(log::Level::Trace) {
        for line in tree.inorder() {
            trace!("  {}", line);
        }
    }
}

/// Summarise the size change of a run.
pub fn report_sizes(bytes_in: u64, bytes_out: u64) {
    if bytes_in == 0 {
        info!("Empty input, {} bytes out.", bytes_out);
    } else {
        info!(
            "{} bytes in, {} bytes out ({:.1}% of input).",
            bytes_in,
            bytes_out,
            bytes_out as f64 * 100.0 / bytes_in as f64
        );
    }
}
