//! Sliding Window Matcher
//!
//! Finds back-references for the LZSS stage.  Positions already passed are indexed
//! by a hash of their first `MIN_MATCH` bytes.  The hash table holds the most recent
//! position for each hash, and a chain of links (kept in a ring buffer with a slot
//! for every position in the window) leads to successively older positions.
//! The chain walk is bounded by `MAX_CHAIN`, so the search is not exhaustive on
//! highly repetitive data, but the cost per position is bounded.

use crate::tools::ring_buffer::RingBuffer;
use crate::Options;

/// shortest run that will be coded as a match
pub const MIN_MATCH: usize = 3;
/// most candidates examined per search
pub const MAX_CHAIN: usize = 256;
const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const NIL: usize = usize::MAX;

/// A back-reference: copy `length` bytes starting `distance` bytes behind the cursor.
/// The length can exceed the distance, in which case the copy overlaps itself.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Match {
    pub distance: usize,
    pub length: usize
}

/// Hash chain index over a single input buffer.
pub struct Matcher<'a> {
    input: &'a [u8],
    dictionary_size: usize,
    lookahead_size: usize,
    /// most recent position for each hash value
    head: Vec<usize>,
    /// previous position with the same hash, for each position in the window
    chain: RingBuffer<usize>,
    /// positions below this have been indexed
    indexed: usize
}

impl <'a> Matcher<'a> {
    /// Options should already be validated.
    pub fn create(input: &'a [u8],opt: &Options) -> Self {
        let chain = RingBuffer::create(NIL,opt.dictionary_size.min(input.len()));
        log::trace!("hash chain with {} links",chain.len());
        Self {
            input,
            dictionary_size: opt.dictionary_size,
            lookahead_size: opt.lookahead_size,
            head: vec![NIL;HASH_SIZE],
            chain,
            indexed: 0
        }
    }
    fn hash(&self,pos: usize) -> usize {
        let key = (self.input[pos] as u32) << 16 | (self.input[pos+1] as u32) << 8 | self.input[pos+2] as u32;
        (key.wrapping_mul(2654435761) >> (32 - HASH_BITS)) as usize
    }
    /// Index every position below `pos` that has not been indexed yet.
    /// Positions too close to the end to start a match are skipped.
    fn index_up_to(&mut self,pos: usize) {
        let end = pos.min((self.input.len() + 1).saturating_sub(MIN_MATCH));
        while self.indexed < end {
            let p = self.indexed;
            let h = self.hash(p);
            self.chain.set_abs(p,self.head[h]);
            self.head[h] = p;
            self.indexed += 1;
        }
        self.indexed = self.indexed.max(pos);
    }
    /// Length of the common run at `candidate` and `pos`, up to `max_len`.
    /// Bytes are compared in the input itself, so the run may extend past `pos`.
    fn run_length(&self,candidate: usize,pos: usize,max_len: usize) -> usize {
        let mut len = 0;
        while len < max_len && self.input[candidate + len] == self.input[pos + len] {
            len += 1;
        }
        len
    }
    /// Find the longest match for the bytes starting at `pos`, preferring the
    /// smallest distance among matches of equal length.  All positions before `pos`
    /// are indexed as a side effect, so calls should come in increasing order of `pos`.
    pub fn find_match(&mut self,pos: usize) -> Option<Match> {
        self.index_up_to(pos);
        let max_len = self.lookahead_size.min(self.input.len().saturating_sub(pos));
        if max_len < MIN_MATCH {
            return None;
        }
        let mut best = Match { distance: 0, length: 0 };
        let mut candidate = self.head[self.hash(pos)];
        let mut steps = 0;
        while candidate != NIL && steps < MAX_CHAIN {
            let distance = pos - candidate;
            if distance > self.dictionary_size {
                // links only get older from here
                break;
            }
            let length = self.run_length(candidate,pos,max_len);
            if length > best.length {
                best = Match { distance, length };
                if length == max_len {
                    break;
                }
            }
            candidate = self.chain.get_abs(candidate);
            steps += 1;
        }
        match best.length >= MIN_MATCH {
            true => Some(best),
            false => None
        }
    }
}

/// Search the window behind `position` for the best match to the bytes at `position`.
/// This indexes the whole window for a single query, an encoder should hold one
/// `Matcher` for the whole input instead.
pub fn find_match(input: &[u8],position: usize,opt: &Options) -> Option<Match> {
    let mut matcher = Matcher::create(input,opt);
    matcher.indexed = position.saturating_sub(opt.dictionary_size);
    matcher.find_match(position)
}

#[test]
fn longest_wins() {
    let opt = Options::create(64,64);
    let test_data = "abcdXabcdeYabcdef".as_bytes();
    assert_eq!(find_match(test_data,11,&opt),Some(Match { distance: 6, length: 5 }));
    assert_eq!(find_match(test_data,5,&opt),Some(Match { distance: 5, length: 4 }));
    assert_eq!(find_match(test_data,0,&opt),None);
    assert_eq!(find_match(test_data,4,&opt),None);
}

#[test]
fn nearest_wins_ties() {
    let opt = Options::create(64,64);
    let test_data = "abcXabcYabc".as_bytes();
    assert_eq!(find_match(test_data,8,&opt),Some(Match { distance: 4, length: 3 }));
}

#[test]
fn window_limits() {
    let test_data = "abcdefXXXXabcdef".as_bytes();
    assert_eq!(find_match(test_data,10,&Options::create(10,64)),Some(Match { distance: 10, length: 6 }));
    assert_eq!(find_match(test_data,10,&Options::create(9,64)),None);
    assert_eq!(find_match(test_data,10,&Options::create(10,4)),Some(Match { distance: 10, length: 4 }));
    assert_eq!(find_match(test_data,10,&Options::create(10,2)),None);
}

#[test]
fn short_runs_rejected() {
    let opt = Options::create(64,64);
    assert_eq!(find_match("abXab".as_bytes(),3,&opt),None);
    assert_eq!(find_match("abcab".as_bytes(),3,&opt),None);
}

#[test]
fn overlapping() {
    let opt = Options::create(1024,1024);
    let test_data = [0x41;1000];
    assert_eq!(find_match(&test_data,1,&opt),Some(Match { distance: 1, length: 999 }));
    let test_data = "xyzxyzxyzxyz".as_bytes();
    assert_eq!(find_match(test_data,3,&opt),Some(Match { distance: 3, length: 9 }));
}

#[test]
fn incremental_search() {
    let opt = Options::create(8,16);
    let test_data = "0123456789012345678901234567".as_bytes();
    let mut matcher = Matcher::create(test_data,&opt);
    for pos in 0..test_data.len() {
        // period of the data is 10, which is outside the window
        assert_eq!(matcher.find_match(pos),None);
    }
    let opt = Options::create(10,16);
    let mut matcher = Matcher::create(test_data,&opt);
    assert_eq!(matcher.find_match(5),None);
    assert_eq!(matcher.find_match(10),Some(Match { distance: 10, length: 16 }));
    assert_eq!(matcher.find_match(20),Some(Match { distance: 10, length: 8 }));
}
