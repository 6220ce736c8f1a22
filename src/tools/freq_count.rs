use crate::huffman_coding::huffman::SYMBOLS;

/// Returns a frequency count of the input data, one entry for each of the 256 byte values.
pub fn freqs(data: &[u8]) -> Vec<u64> {
    let mut freqs = vec![0_u64; SYMBOLS];
    data.iter().for_each(|&el| freqs[el as usize] += 1);
    freqs
}
