//! The huffman module holds the code tree at the heart of hctree.
//!
//! A tree is built once from a snapshot of byte frequencies and never changes afterwards.
//! Frequent bytes sit close to the root and get short codes, rare bytes get long ones. The
//! tree writes its own shape ahead of the coded data, so the decompressor can rebuild an
//! equivalent tree without ever seeing the frequencies.
//!
//! Ties between equal frequencies are broken by symbol value, lowest first, so the same
//! frequency table always produces the same tree.
//!

pub mod huffman;
