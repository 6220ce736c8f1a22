//! The code tree: built from byte frequencies, used to encode and decode single symbols,
//! and able to write (and re-read) its own shape as a self-delimiting header.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::{Display, Formatter};
use std::io::{self, Error, ErrorKind, Read, Write};

use log::{debug, trace};

use crate::bitstream::bitreader::BitReader;
use crate::bitstream::bitwriter::BitWriter;

/// Size of the byte alphabet. Frequency tables must have exactly this many entries.
pub const SYMBOLS: usize = 256;

/// The bit written for every symbol of a tree that is a single leaf.
const SINGLE_LEAF_BIT: bool = true;

/// No tree over 256 symbols is deeper than this.
const MAX_DEPTH: usize = SYMBOLS - 1;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum NodeData {
    /// The 0 child, then the 1 child.
    Kids(Box<Node>, Box<Node>),
    Leaf,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Node {
    pub weight: u64,
    /// The leaf symbol, or for internal nodes the symbol inherited from the 0 child. The
    /// latter only breaks ties while building and is never used when decoding.
    pub symbol: u8,
    pub node_data: NodeData,
}

impl Node {
    /// Create a new node
    pub fn new(weight: u64, symbol: u8, node_data: NodeData) -> Node {
        Node {
            weight,
            symbol,
            node_data,
        }
    }

    /// Create a leaf
    pub fn leaf(symbol: u8, weight: u64) -> Node {
        Node::new(weight, symbol, NodeData::Leaf)
    }

    /// Join two subtrees under a new internal node. The first becomes the 0 child.
    pub fn join(zero: Node, one: Node) -> Node {
        Node::new(
            zero.weight.saturating_add(one.weight),
            zero.symbol,
            NodeData::Kids(Box::new(zero), Box::new(one)),
        )
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node_data, NodeData::Leaf)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol: {}; Freq: {}", self.symbol, self.weight)
    }
}

/// Heap entry. BinaryHeap is a max-heap, so the order is reversed: lowest weight first,
/// then lowest symbol.
struct Pending(Node);

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .weight
            .cmp(&self.0.weight)
            .then_with(|| other.0.symbol.cmp(&self.0.symbol))
    }
}

/// A Huffman code tree over the byte alphabet, with the root to leaf path of every symbol
/// it holds worked out up front.
#[derive(Debug, Clone)]
pub struct CodeTree {
    root: Node,
    /// Bits to emit for each symbol, indexed by symbol. None if the symbol is not in the tree.
    codes: Vec<Option<Vec<bool>>>,
}

impl CodeTree {
    /// Build the tree from a table of 256 frequencies. Returns None when every frequency
    /// is zero, since there is nothing to code.
    pub fn build(freqs: &[u64]) -> io::Result<Option<CodeTree>> {
        if freqs.len() != SYMBOLS {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "frequency table has {} entries, expected {}",
                    freqs.len(),
                    SYMBOLS
                ),
            ));
        }

        // One leaf for every symbol that actually occurs.
        let mut heap: BinaryHeap<Pending> = freqs
            .iter()
            .enumerate()
            .filter(|(_, &freq)| freq > 0)
            .map(|(symbol, &freq)| Pending(Node::leaf(symbol as u8, freq)))
            .collect();
        debug!("Building code tree over {} symbols.", heap.len());

        // Merge the two lightest until only the root is left. A lone leaf is the root.
        while heap.len() > 1 {
            if let (Some(Pending(zero)), Some(Pending(one))) = (heap.pop(), heap.pop()) {
                heap.push(Pending(Node::join(zero, one)));
            }
        }

        Ok(heap.pop().map(|Pending(root)| CodeTree::from_root(root)))
    }

    /// Wrap a finished tree and work out the code of every leaf.
    fn from_root(root: Node) -> CodeTree {
        let mut codes = vec![None; SYMBOLS];
        if root.is_leaf() {
            codes[root.symbol as usize] = Some(vec![SINGLE_LEAF_BIT]);
        } else {
            collect_codes(&root, &mut Vec::new(), &mut codes);
        }
        CodeTree { root, codes }
    }

    /// Write the code for the symbol.
    pub fn encode<W: Write>(&self, symbol: u8, bw: &mut BitWriter<W>) -> io::Result<()> {
        let code = self.codes[symbol as usize].as_ref().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("symbol {} has no code in this tree", symbol),
            )
        })?;
        code.iter().try_for_each(|&bit| bw.out_bit(bit))
    }

    /// Read one code and return its symbol. Fails if the source runs dry first.
    pub fn decode<R: Read>(&self, br: &mut BitReader<R>) -> io::Result<u8> {
        let mut node = &self.root;
        if node.is_leaf() {
            // A lone leaf still spends one bit per symbol.
            br.bit()?;
            return Ok(node.symbol);
        }
        while let NodeData::Kids(zero, one) = &node.node_data {
            node = if br.bool_bit()? { &**one } else { &**zero };
        }
        Ok(node.symbol)
    }

    /// Write the tree shape as a pre-order walk: a 1 bit and the 8 bit symbol for a
    /// leaf, a 0 bit for an internal node followed by its 0 and then 1 subtrees.
    pub fn serialize<W: Write>(&self, bw: &mut BitWriter<W>) -> io::Result<()> {
        write_node(&self.root, bw)
    }

    /// Rebuild a tree from a header written by serialize().
    pub fn deserialize<R: Read>(br: &mut BitReader<R>) -> io::Result<CodeTree> {
        let mut seen = [false; SYMBOLS];
        let root = read_node(br, 0, &mut seen)?;
        let tree = CodeTree::from_root(root);
        trace!(
            "Read tree header with {} leaves, ending at {}.",
            tree.leaf_count(),
            br.loc()
        );
        Ok(tree)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The bits written for the symbol, or None if the symbol is not in the tree.
    pub fn code(&self, symbol: u8) -> Option<&[bool]> {
        self.codes[symbol as usize].as_deref()
    }

    pub fn code_len(&self, symbol: u8) -> Option<usize> {
        self.code(symbol).map(|code| code.len())
    }

    /// Symbols present in the tree, in ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = u8> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter(|(_, code)| code.is_some())
            .map(|(symbol, _)| symbol as u8)
    }

    pub fn leaf_count(&self) -> usize {
        self.codes.iter().filter(|code| code.is_some()).count()
    }

    pub fn internal_count(&self) -> usize {
        count_internal(&self.root)
    }

    pub fn is_single_leaf(&self) -> bool {
        self.root.is_leaf()
    }

    /// Depth of the deepest leaf. A lone leaf is at depth 0.
    pub fn max_depth(&self) -> usize {
        if self.is_single_leaf() {
            return 0;
        }
        self.codes
            .iter()
            .flatten()
            .map(|code| code.len())
            .max()
            .unwrap_or(0)
    }

    /// In-order listing of every node, one line each.
    pub fn inorder(&self) -> Vec<String> {
        let mut lines = Vec::new();
        inorder_node(&self.root, &mut lines);
        lines
    }
}

/// Recursively walk the tree and record the path to every leaf.
fn collect_codes(node: &Node, path: &mut Vec<bool>, codes: &mut [Option<Vec<bool>>]) {
    match &node.node_data {
        NodeData::Kids(zero, one) => {
            path.push(false);
            collect_codes(zero, path, codes);
            path.pop();
            path.push(true);
            collect_codes(one, path, codes);
            path.pop();
        }
        NodeData::Leaf => codes[node.symbol as usize] = Some(path.clone()),
    }
}

fn write_node<W: Write>(node: &Node, bw: &mut BitWriter<W>) -> io::Result<()> {
    match &node.node_data {
        NodeData::Leaf => {
            bw.out_bit(true)?;
            bw.out8(node.symbol)
        }
        NodeData::Kids(zero, one) => {
            bw.out_bit(false)?;
            write_node(zero, bw)?;
            write_node(one, bw)
        }
    }
}

fn read_node<R: Read>(
    br: &mut BitReader<R>,
    depth: usize,
    seen: &mut [bool; SYMBOLS],
) -> io::Result<Node> {
    if br.bool_bit()? {
        let symbol = br.byte()?;
        if seen[symbol as usize] {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("symbol {} appears twice in the tree header", symbol),
            ));
        }
        seen[symbol as usize] = true;
        Ok(Node::leaf(symbol, 0))
    } else {
        if depth >= MAX_DEPTH {
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("tree header nests deeper than {} levels", MAX_DEPTH),
            ));
        }
        let zero = read_node(br, depth + 1, seen)?;
        let one = read_node(br, depth + 1, seen)?;
        Ok(Node::join(zero, one))
    }
}

fn count_internal(node: &Node) -> usize {
    match &node.node_data {
        NodeData::Kids(zero, one) => 1 + count_internal(zero) + count_internal(one),
        NodeData::Leaf => 0,
    }
}

fn inorder_node(node: &Node, lines: &mut Vec<String>) {
    match &node.node_data {
        NodeData::Kids(zero, one) => {
            inorder_node(zero, lines);
            lines.push(node.to_string());
            inorder_node(one, lines);
        }
        NodeData::Leaf => lines.push(node.to_string()),
    }
}

#[cfg(test)]
mod test {
    use std::io::ErrorKind;

    use super::{CodeTree, SYMBOLS};
    use crate::bitstream::bitreader::BitReader;
    use crate::bitstream::bitwriter::BitWriter;

    fn freqs_of(pairs: &[(u8, u64)]) -> Vec<u64> {
        let mut freqs = vec![0_u64; SYMBOLS];
        for &(symbol, freq) in pairs {
            freqs[symbol as usize] = freq;
        }
        freqs
    }

    /// A spread of frequencies with gaps, repeats and one dominant symbol.
    fn mixed_freqs() -> Vec<u64> {
        (0..SYMBOLS as u64)
            .map(|i| match i % 7 {
                0 => 0,
                3 => 5,
                _ => (i * i * 31 + 7) % 97 + 1,
            })
            .enumerate()
            .map(|(i, f)| if i == 200 { 100_000 } else { f })
            .collect()
    }

    fn textbook() -> CodeTree {
        let freqs = freqs_of(&[
            (b'A', 5),
            (b'B', 9),
            (b'C', 12),
            (b'D', 13),
            (b'E', 16),
            (b'F', 45),
        ]);
        CodeTree::build(&freqs).unwrap().unwrap()
    }

    fn to_bits(code: &str) -> Vec<bool> {
        code.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn wrong_table_length_test() {
        let err = CodeTree::build(&[1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = CodeTree::build(&vec![1; SYMBOLS + 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_table_test() {
        assert!(CodeTree::build(&vec![0; SYMBOLS]).unwrap().is_none());
    }

    #[test]
    fn single_symbol_test() {
        let tree = CodeTree::build(&freqs_of(&[(b'A', 4)])).unwrap().unwrap();
        assert!(tree.is_single_leaf());
        assert_eq!(tree.internal_count(), 0);
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.code_len(b'A'), Some(1));
        assert_eq!(tree.code_len(b'B'), None);
        assert_eq!(tree.max_depth(), 0);

        let mut out = Vec::new();
        {
            let mut bw = BitWriter::new(&mut out);
            for _ in 0..4 {
                tree.encode(b'A', &mut bw).unwrap();
            }
            assert_eq!(bw.bits_written(), 4);
            bw.flush().unwrap();
        }
        assert_eq!(out, vec![0b1111_0000]);

        let mut br = BitReader::new(out.as_slice());
        for _ in 0..4 {
            assert_eq!(tree.decode(&mut br).unwrap(), b'A');
        }
        assert_eq!(br.bits_read(), 4);
    }

    #[test]
    fn textbook_codes_test() {
        let tree = textbook();
        assert_eq!(tree.leaf_count(), 6);
        assert_eq!(tree.internal_count(), 5);
        assert_eq!(tree.root().weight, 100);
        assert_eq!(tree.code(b'F'), Some(to_bits("0").as_slice()));
        assert_eq!(tree.code(b'C'), Some(to_bits("100").as_slice()));
        assert_eq!(tree.code(b'D'), Some(to_bits("101").as_slice()));
        assert_eq!(tree.code(b'A'), Some(to_bits("1100").as_slice()));
        assert_eq!(tree.code(b'B'), Some(to_bits("1101").as_slice()));
        assert_eq!(tree.code(b'E'), Some(to_bits("111").as_slice()));
        assert_eq!(tree.max_depth(), 4);

        let f = tree.code_len(b'F').unwrap();
        let a = tree.code_len(b'A').unwrap();
        for symbol in tree.symbols() {
            assert!(f <= tree.code_len(symbol).unwrap());
            assert!(a >= tree.code_len(symbol).unwrap());
        }
    }

    #[test]
    fn tie_break_test() {
        // Equal weights merge in symbol order, lowest symbol on the 0 side.
        let tree = CodeTree::build(&freqs_of(&[(3, 1), (1, 1), (2, 1), (0, 1)]))
            .unwrap()
            .unwrap();
        assert_eq!(tree.code(0), Some(to_bits("00").as_slice()));
        assert_eq!(tree.code(1), Some(to_bits("01").as_slice()));
        assert_eq!(tree.code(2), Some(to_bits("10").as_slice()));
        assert_eq!(tree.code(3), Some(to_bits("11").as_slice()));
    }

    #[test]
    fn high_symbols_sort_unsigned_test() {
        let tree = CodeTree::build(&freqs_of(&[(0xff, 1), (0x01, 1)]))
            .unwrap()
            .unwrap();
        assert_eq!(tree.code(0x01), Some(to_bits("0").as_slice()));
        assert_eq!(tree.code(0xff), Some(to_bits("1").as_slice()));
    }

    #[test]
    fn prefix_free_test() {
        let tree = CodeTree::build(&mixed_freqs()).unwrap().unwrap();
        let codes: Vec<&[bool]> = tree.symbols().filter_map(|s| tree.code(s)).collect();
        assert_eq!(codes.len(), tree.leaf_count());
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "code {:?} is a prefix of {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn monotonic_lengths_test() {
        let freqs = mixed_freqs();
        let tree = CodeTree::build(&freqs).unwrap().unwrap();
        for a in tree.symbols() {
            for b in tree.symbols() {
                if freqs[a as usize] < freqs[b as usize] {
                    assert!(tree.code_len(a) >= tree.code_len(b));
                }
            }
        }
        assert_eq!(tree.code_len(200), Some(1));
    }

    #[test]
    fn deterministic_build_test() {
        let freqs = mixed_freqs();
        let first = CodeTree::build(&freqs).unwrap().unwrap();
        let second = CodeTree::build(&freqs).unwrap().unwrap();
        for symbol in 0..=255_u8 {
            assert_eq!(first.code(symbol), second.code(symbol));
        }
        assert_eq!(first.inorder(), second.inorder());
    }

    #[test]
    fn encode_decode_test() {
        let tree = textbook();
        let message = b"FACEDBEEFFACADE";
        let mut out = Vec::new();
        {
            let mut bw = BitWriter::new(&mut out);
            for &symbol in message {
                tree.encode(symbol, &mut bw).unwrap();
            }
            bw.flush().unwrap();
        }
        let mut br = BitReader::new(out.as_slice());
        let decoded: Vec<u8> = message.iter().map(|_| tree.decode(&mut br).unwrap()).collect();
        assert_eq!(decoded, message);
    }

    #[test]
    fn encode_unknown_symbol_test() {
        let tree = textbook();
        let mut out = Vec::new();
        let mut bw = BitWriter::new(&mut out);
        let err = tree.encode(b'Z', &mut bw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(bw.bits_written(), 0);
    }

    #[test]
    fn decode_truncated_test() {
        let tree = textbook();
        // Nothing at all to read.
        let empty: &[u8] = &[];
        let mut br = BitReader::new(empty);
        assert_eq!(tree.decode(&mut br).unwrap_err().kind(), ErrorKind::UnexpectedEof);

        let single = CodeTree::build(&freqs_of(&[(7, 1)])).unwrap().unwrap();
        let mut br = BitReader::new(empty);
        assert_eq!(single.decode(&mut br).unwrap_err().kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn serialize_single_leaf_test() {
        let tree = CodeTree::build(&freqs_of(&[(b'A', 4)])).unwrap().unwrap();
        let mut out = Vec::new();
        {
            let mut bw = BitWriter::new(&mut out);
            tree.serialize(&mut bw).unwrap();
            assert_eq!(bw.bits_written(), 9);
            bw.flush().unwrap();
        }
        assert_eq!(out, vec![0b1010_0000, 0b1000_0000]);

        let copy = CodeTree::deserialize(&mut BitReader::new(out.as_slice())).unwrap();
        assert!(copy.is_single_leaf());
        assert_eq!(copy.code(b'A'), tree.code(b'A'));
    }

    #[test]
    fn serialize_textbook_test() {
        let tree = textbook();
        let mut out = Vec::new();
        {
            let mut bw = BitWriter::new(&mut out);
            tree.serialize(&mut bw).unwrap();
            // 6 leaves at 9 bits each plus 5 internal markers.
            assert_eq!(bw.bits_written(), 6 * 9 + 5);
            bw.flush().unwrap();
        }
        // Root is internal, its 0 child is the leaf F.
        assert_eq!(out[0] >> 6, 0b01);
        assert_eq!((out[0] << 2) | (out[1] >> 6), b'F');
    }

    #[test]
    fn serialize_round_trip_test() {
        for freqs in [mixed_freqs(), freqs_of(&[(0, 1), (255, 1)]), vec![1; SYMBOLS]] {
            let tree = CodeTree::build(&freqs).unwrap().unwrap();
            let mut out = Vec::new();
            {
                let mut bw = BitWriter::new(&mut out);
                tree.serialize(&mut bw).unwrap();
                bw.flush().unwrap();
            }
            let copy = CodeTree::deserialize(&mut BitReader::new(out.as_slice())).unwrap();
            assert_eq!(copy.leaf_count(), tree.leaf_count());
            assert_eq!(copy.internal_count(), tree.internal_count());
            for symbol in 0..=255_u8 {
                assert_eq!(copy.code(symbol), tree.code(symbol));
            }
        }
    }

    #[test]
    fn deserialize_duplicate_symbol_test() {
        let mut out = Vec::new();
        {
            let mut bw = BitWriter::new(&mut out);
            bw.out_bit(false).unwrap();
            bw.out_bit(true).unwrap();
            bw.out8(b'A').unwrap();
            bw.out_bit(true).unwrap();
            bw.out8(b'A').unwrap();
            bw.flush().unwrap();
        }
        let err = CodeTree::deserialize(&mut BitReader::new(out.as_slice())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn deserialize_too_deep_test() {
        let zeros = vec![0_u8; 64];
        let err = CodeTree::deserialize(&mut BitReader::new(zeros.as_slice())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn deserialize_truncated_test() {
        // Internal marker, then a leaf marker with only half a symbol.
        let bytes = [0b0101_0000_u8];
        let err = CodeTree::deserialize(&mut BitReader::new(&bytes[..])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[test]
    fn inorder_test() {
        let tree = CodeTree::build(&freqs_of(&[(1, 2), (2, 3)])).unwrap().unwrap();
        assert_eq!(
            tree.inorder(),
            vec![
                "Symbol: 1; Freq: 2".to_string(),
                "Symbol: 1; Freq: 5".to_string(),
                "Symbol: 2; Freq: 3".to_string(),
            ]
        );
    }
}
