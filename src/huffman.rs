//! Canonical Huffman Coding
//!
//! This is the static, two-pass kind of Huffman coding: frequencies are counted over the
//! whole buffer, a tree is built from the frequencies, and only the code lengths are kept.
//! The codes themselves are assigned canonically (shorter codes first, ties in symbol order),
//! so the 256 code lengths are all the decoder needs.
//!
//! Header (261 bytes):
//! * prelude, see `container`
//! * 256 code lengths, one byte per symbol, 0 for absent symbols
//!
//! Body is the codes packed MSB first, final byte zero padded.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use crate::container::{Prelude,PRELUDE_LEN};
use crate::tools::bit_stream::{BitReader,BitWriter};
use crate::{Algorithm,Error};

pub const HEADER_LEN: usize = PRELUDE_LEN + 256;
/// Longest code that can be handled.  Frequencies of a buffer whose length fits in
/// u32 can never produce a tree this deep.
pub const MAX_CODE_LEN: u8 = 64;

/// Node in the merge tree, leaves have no children
struct Node {
    symbol: u8,
    children: Option<(usize,usize)>
}

/// count occurrences of each byte value
pub fn count_frequencies(ibuf: &[u8]) -> [u64;256] {
    let mut freq = [0;256];
    for c in ibuf {
        freq[*c as usize] += 1;
    }
    freq
}

/// Build the merge tree and measure the depth of each leaf.
/// The two lightest nodes are merged first, ties go to the node holding
/// the lower symbol value, so the result depends only on the frequencies.
fn code_lengths(freq: &[u64;256]) -> [u8;256] {
    let mut lengths = [0;256];
    let mut pool: Vec<Node> = Vec::new();
    // heap entries are (weight, lowest symbol in subtree, index into pool)
    let mut heap = BinaryHeap::new();
    for (symbol,weight) in freq.iter().enumerate() {
        if *weight > 0 {
            heap.push(Reverse((*weight,symbol as u8,pool.len())));
            pool.push(Node { symbol: symbol as u8, children: None });
        }
    }
    match pool.len() {
        0 => return lengths,
        1 => {
            // lone symbol still needs a code
            lengths[pool[0].symbol as usize] = 1;
            return lengths;
        },
        _ => {}
    }
    while let (Some(Reverse((w0,s0,n0))),Some(Reverse((w1,s1,n1)))) = (heap.pop(),heap.pop()) {
        heap.push(Reverse((w0 + w1,s0.min(s1),pool.len())));
        pool.push(Node { symbol: s0.min(s1), children: Some((n0,n1)) });
    }
    // root is the last node created
    let mut stack = vec![(pool.len() - 1,0)];
    while let Some((idx,depth)) = stack.pop() {
        match pool[idx].children {
            Some((left,right)) => {
                stack.push((left,depth + 1));
                stack.push((right,depth + 1));
            },
            None => lengths[pool[idx].symbol as usize] = depth
        }
    }
    lengths
}

/// Canonical code table, symbol to (length, code)
#[derive(Clone,Debug,PartialEq,Eq)]
pub struct CodeTable {
    lengths: [u8;256],
    codes: [u64;256]
}

impl CodeTable {
    pub fn from_frequencies(freq: &[u64;256]) -> Self {
        let lengths = code_lengths(freq);
        Self {
            lengths,
            codes: canonical_codes(&lengths)
        }
    }
    /// Rebuild the table from transmitted lengths, the lengths must describe a prefix code.
    pub fn from_lengths(lengths: &[u8]) -> Result<Self,Error> {
        let lengths: [u8;256] = match lengths.try_into() {
            Ok(l) => l,
            Err(_) => return Err(Error::CorruptHeader)
        };
        if lengths.iter().any(|l| *l > MAX_CODE_LEN) || kraft_sum(&lengths) > 1 << MAX_CODE_LEN {
            log::error!("code lengths do not form a prefix code");
            return Err(Error::CorruptHeader);
        }
        Ok(Self {
            lengths,
            codes: canonical_codes(&lengths)
        })
    }
    pub fn lengths(&self) -> &[u8;256] {
        &self.lengths
    }
    /// (length, code) for a symbol, length is 0 if the symbol has no code
    pub fn code(&self,symbol: u8) -> (u8,u64) {
        (self.lengths[symbol as usize],self.codes[symbol as usize])
    }
    pub fn is_empty(&self) -> bool {
        self.lengths.iter().all(|l| *l == 0)
    }
    /// Kraft inequality, sum of 2^-len over coded symbols must not exceed 1
    pub fn is_prefix_free(&self) -> bool {
        kraft_sum(&self.lengths) <= 1 << MAX_CODE_LEN
    }
}

/// Kraft sum scaled by 2^MAX_CODE_LEN, lengths must not exceed MAX_CODE_LEN
fn kraft_sum(lengths: &[u8;256]) -> u128 {
    lengths.iter().filter(|l| **l > 0).map(|l| 1u128 << (MAX_CODE_LEN - *l)).sum()
}

/// Assign codes in order of (length, symbol), each code being one more than the last,
/// shifted left whenever the length increases.
fn canonical_codes(lengths: &[u8;256]) -> [u64;256] {
    let mut codes = [0;256];
    let mut order: Vec<usize> = (0..256).filter(|s| lengths[*s] > 0).collect();
    order.sort_by_key(|s| (lengths[*s],*s));
    let mut code: u128 = 0;
    let mut prev_len = 0;
    for s in order {
        code <<= lengths[s] - prev_len;
        codes[s] = code as u64;
        code += 1;
        prev_len = lengths[s];
    }
    codes
}

/// Walks the bitstream one bit at a time using the counts of codes of each length.
struct Decoder {
    /// number of codes with each length
    counts: Vec<u128>,
    /// symbols in canonical order
    symbols: Vec<u8>
}

impl Decoder {
    fn create(table: &CodeTable) -> Self {
        let max_len = *table.lengths.iter().max().unwrap_or(&0) as usize;
        let mut counts = vec![0;max_len + 1];
        for l in table.lengths.iter() {
            counts[*l as usize] += 1;
        }
        counts[0] = 0;
        let mut symbols: Vec<u8> = (0..=255).filter(|s| table.lengths[*s as usize] > 0).collect();
        symbols.sort_by_key(|s| (table.lengths[*s as usize],*s));
        Self {
            counts,
            symbols
        }
    }
    fn decode_symbol(&self,reader: &mut BitReader) -> Result<u8,Error> {
        // `code` is at least `first` at every length, otherwise a shorter code would have matched
        let mut code: u128 = 0;
        let mut first: u128 = 0;
        let mut index: u128 = 0;
        for len in 1..self.counts.len() {
            code |= reader.get_bit()? as u128;
            let count = self.counts[len];
            if code - first < count {
                return Ok(self.symbols[(index + code - first) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }
        log::error!("bit pattern is not a code");
        Err(Error::CorruptStream)
    }
}

/// Huffman encode with the given id in the prelude
pub(crate) fn compress_as(ibuf: &[u8],alg: Algorithm) -> Result<Vec<u8>,Error> {
    let mut ans = Vec::new();
    Prelude::create(alg,ibuf.len())?.write(&mut ans);
    let table = CodeTable::from_frequencies(&count_frequencies(ibuf));
    ans.extend_from_slice(table.lengths());
    let mut writer = BitWriter::new();
    for c in ibuf {
        let (len,code) = table.code(*c);
        writer.put_code(len as u32,code);
    }
    log::debug!("{} bytes coded in {} bits",ibuf.len(),writer.len());
    ans.append(&mut writer.to_bytes());
    Ok(ans)
}

/// Huffman decode, requiring the given id in the prelude
pub(crate) fn expand_as(ibuf: &[u8],alg: Algorithm) -> Result<Vec<u8>,Error> {
    let prelude = Prelude::read(ibuf)?;
    if prelude.algorithm() != Some(alg) {
        log::error!("id {:#04x} does not match {}",prelude.id,alg);
        return Err(Error::CorruptHeader);
    }
    let textsize = prelude.expanded_len;
    if ibuf.len() < HEADER_LEN {
        return Err(Error::UnexpectedEndOfInput);
    }
    let table = CodeTable::from_lengths(&ibuf[PRELUDE_LEN..HEADER_LEN])?;
    if textsize > 0 && table.is_empty() {
        log::error!("no codes for {} bytes",textsize);
        return Err(Error::CorruptHeader);
    }
    log::debug!("expanding {} bytes",textsize);
    let decoder = Decoder::create(&table);
    let mut reader = BitReader::create(&ibuf[HEADER_LEN..]);
    let mut ans = Vec::new();
    while ans.len() < textsize {
        ans.push(decoder.decode_symbol(&mut reader)?);
    }
    reader.expect_padding()?;
    Ok(ans)
}

/// Main compression function
pub fn compress(ibuf: &[u8]) -> Result<Vec<u8>,Error> {
    compress_as(ibuf,Algorithm::Huffman)
}

/// Main decompression function
pub fn expand(ibuf: &[u8]) -> Result<Vec<u8>,Error> {
    expand_as(ibuf,Algorithm::Huffman)
}

#[test]
fn compression_works() {
    let test_data = "abracadabra".as_bytes();
    let compressed = compress(test_data).expect("compression failed");
    assert_eq!(compressed.len(),HEADER_LEN + 3);
    assert_eq!(compressed[0..PRELUDE_LEN].to_vec(),hex::decode("480b000000").unwrap());
    for (c,len) in [(b'a',1),(b'r',2),(b'b',3),(b'c',4),(b'd',4)] {
        assert_eq!(compressed[PRELUDE_LEN + c as usize],len);
    }
    assert_eq!(compressed[HEADER_LEN..].to_vec(),hex::decode("69CF68").unwrap());
}

#[test]
fn canonical_table() {
    let table = CodeTable::from_frequencies(&count_frequencies("abracadabra".as_bytes()));
    assert_eq!(table.code(b'a'),(1,0b0));
    assert_eq!(table.code(b'r'),(2,0b10));
    assert_eq!(table.code(b'b'),(3,0b110));
    assert_eq!(table.code(b'c'),(4,0b1110));
    assert_eq!(table.code(b'd'),(4,0b1111));
    assert_eq!(table.code(b'z'),(0,0));
    assert!(table.is_prefix_free());
    let rebuilt = CodeTable::from_lengths(table.lengths()).expect("bad lengths");
    assert_eq!(rebuilt,table);
}

#[test]
fn tie_breaking() {
    // all weights equal, lower symbols merge first and end up deeper
    let table = CodeTable::from_frequencies(&count_frequencies("abc".as_bytes()));
    assert_eq!(table.code(b'a'),(2,0b10));
    assert_eq!(table.code(b'b'),(2,0b11));
    assert_eq!(table.code(b'c'),(1,0b0));
}

#[test]
fn prefix_free() {
    let test_data = crate::tools::noise(10000,1);
    let table = CodeTable::from_frequencies(&count_frequencies(&test_data));
    assert!(table.is_prefix_free());
    // fibonacci weights make the deepest possible tree
    let mut freq = [0;256];
    let (mut a,mut b) = (1u64,1u64);
    for s in 0..40 {
        freq[s] = a;
        (a,b) = (b,a+b);
    }
    let table = CodeTable::from_frequencies(&freq);
    assert!(table.is_prefix_free());
    assert_eq!(*table.lengths().iter().max().unwrap(),39);
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress(test_data).expect("compression failed");
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    let test_data: Vec<u8> = (0..=255).collect();
    let compressed = compress(&test_data).expect("compression failed");
    assert_eq!(compressed.len(),HEADER_LEN + 256);
    assert_eq!(expand(&compressed).expect("expansion failed"),test_data);
}

#[test]
fn random_data() {
    let test_data = crate::tools::noise(10000,42);
    let compressed = compress(&test_data).expect("compression failed");
    assert!(compressed.len() > test_data.len());
    assert!(compressed.len() >= HEADER_LEN + 9800);
    assert!(compressed.len() <= HEADER_LEN + 10200);
    assert_eq!(expand(&compressed).expect("expansion failed"),test_data);
}

#[test]
fn degenerate_inputs() {
    let compressed = compress(&[]).expect("compression failed");
    assert_eq!(compressed.len(),HEADER_LEN);
    assert_eq!(expand(&compressed).expect("expansion failed"),Vec::<u8>::new());

    let compressed = compress(&[7]).expect("compression failed");
    assert_eq!(compressed.len(),HEADER_LEN + 1);
    assert_eq!(expand(&compressed).expect("expansion failed"),vec![7]);

    let test_data = [0xff;1000];
    let compressed = compress(&test_data).expect("compression failed");
    assert_eq!(compressed.len(),HEADER_LEN + 125);
    assert_eq!(expand(&compressed).expect("expansion failed"),test_data.to_vec());
}

#[test]
fn determinism() {
    let test_data = crate::tools::noise(4000,9);
    assert_eq!(compress(&test_data),compress(&test_data));
}

#[test]
fn corrupt_streams() {
    assert_eq!(expand(&[0x48]),Err(Error::UnexpectedEndOfInput));
    let good = compress("abracadabra".as_bytes()).expect("compression failed");
    // header cut short
    assert_eq!(expand(&good[0..100]),Err(Error::UnexpectedEndOfInput));
    // body cut short
    assert_eq!(expand(&good[0..HEADER_LEN+1]),Err(Error::UnexpectedEndOfInput));
    // lengths violate Kraft
    let mut bad = good.clone();
    bad[PRELUDE_LEN + b'z' as usize] = 1;
    assert_eq!(expand(&bad),Err(Error::CorruptHeader));
    // absurd length
    let mut bad = good.clone();
    bad[PRELUDE_LEN + b'd' as usize] = 65;
    assert_eq!(expand(&bad),Err(Error::CorruptHeader));
    // no codes at all for nonempty data
    let mut bad = good[0..PRELUDE_LEN].to_vec();
    bad.extend_from_slice(&[0;256]);
    assert_eq!(expand(&bad),Err(Error::CorruptHeader));
    // incomplete code, all ones is not assigned
    let mut bad = good[0..HEADER_LEN].to_vec();
    bad[PRELUDE_LEN + b'd' as usize] = 0;
    bad.extend_from_slice(&[0xff,0xff,0xff]);
    assert_eq!(expand(&bad),Err(Error::CorruptStream));
    // trailing data
    let mut bad = good.clone();
    bad.push(0);
    assert_eq!(expand(&bad),Err(Error::CorruptStream));
}
