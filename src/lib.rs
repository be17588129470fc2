//! # hscompress
//!
//! Byte-exact, reversible compression of in-memory buffers with three codecs:
//! * `lzss` - sliding window back-references with flag bits
//! * `huffman` - two-pass canonical Huffman coding
//! * `hs` - LZSS followed by Huffman coding of the serialized LZSS stream
//!
//! Every compressed buffer starts with a self-describing header, so the
//! expand functions need nothing but the bytes.  All functions are pure,
//! they keep no state between calls.
//!
//! ```rust
//! let data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
//! let compressed = hscompress::hs_compress(data,1024,8192).expect("compression failed");
//! let expanded = hscompress::hs_decompress(&compressed).expect("expansion failed");
//! assert_eq!(data,&expanded[..]);
//! ```

mod tools;
pub mod container;
pub mod matcher;
pub mod lzss;
pub mod huffman;
pub mod hs;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

/// Codec Errors
#[derive(thiserror::Error,Debug,Clone,PartialEq,Eq)]
pub enum Error {
    #[error("invalid dictionary or lookahead size")]
    InvalidConfiguration,
    #[error("compressed stream is corrupt")]
    CorruptStream,
    #[error("header does not describe a valid prefix code")]
    CorruptHeader,
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error("file too large")]
    FileTooLarge,
    #[error("unknown algorithm `{0}`, expected lzss, huffman, or hs")]
    UnknownAlgorithm(String)
}

/// Largest dictionary or lookahead size, both are stored as u32 in the header
pub const MAX_WINDOW: usize = u32::MAX as usize;

/// Options controlling the LZSS stage, used by both `lzss` and `hs`.
/// Huffman coding has no options.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Options {
    /// bytes behind the cursor that can be the source of a back-reference
    pub dictionary_size: usize,
    /// longest allowed back-reference
    pub lookahead_size: usize
}

pub const STD_OPTIONS: Options = Options {
    dictionary_size: 1024,
    lookahead_size: 8192
};

impl Options {
    pub fn create(dictionary_size: usize, lookahead_size: usize) -> Self {
        Self {
            dictionary_size,
            lookahead_size
        }
    }
    /// Sizes must be positive and fit the header.
    /// A lookahead shorter than `matcher::MIN_MATCH` is allowed, it just means
    /// every byte is coded as a literal.
    pub fn validate(&self) -> Result<(),Error> {
        if self.dictionary_size == 0 || self.lookahead_size == 0 {
            log::error!("window sizes must be positive");
            return Err(Error::InvalidConfiguration);
        }
        if self.dictionary_size > MAX_WINDOW || self.lookahead_size > MAX_WINDOW {
            log::error!("window sizes cannot exceed {}",MAX_WINDOW);
            return Err(Error::InvalidConfiguration);
        }
        Ok(())
    }
}

/// The available codecs.  The discriminant is the id byte that
/// starts every compressed buffer.
#[derive(FromPrimitive,Clone,Copy,Debug,PartialEq,Eq)]
pub enum Algorithm {
    Lzss = 0x4c,
    Huffman = 0x48,
    Hs = 0x53
}

impl Algorithm {
    pub fn from_id(id: u8) -> Option<Self> {
        Self::from_u8(id)
    }
    pub fn id(&self) -> u8 {
        *self as u8
    }
    /// Identify the codec that produced `ibuf` from its first byte.
    /// This does not validate the rest of the buffer.
    pub fn detect(ibuf: &[u8]) -> Option<Self> {
        ibuf.first().and_then(|id| Self::from_id(*id))
    }
    /// Compress with this codec, `opt` is ignored for Huffman
    pub fn compress(&self,ibuf: &[u8],opt: &Options) -> Result<Vec<u8>,Error> {
        match self {
            Self::Lzss => lzss::compress(ibuf,opt),
            Self::Huffman => huffman::compress(ibuf),
            Self::Hs => hs::compress(ibuf,opt)
        }
    }
    pub fn expand(&self,ibuf: &[u8]) -> Result<Vec<u8>,Error> {
        match self {
            Self::Lzss => lzss::expand(ibuf),
            Self::Huffman => huffman::expand(ibuf),
            Self::Hs => hs::expand(ibuf)
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lzss => write!(f,"lzss"),
            Self::Huffman => write!(f,"huffman"),
            Self::Hs => write!(f,"hs")
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self,Self::Err> {
        match s.to_lowercase().as_str() {
            "lzss" => Ok(Self::Lzss),
            "huffman" => Ok(Self::Huffman),
            "hs" => Ok(Self::Hs),
            _ => Err(Error::UnknownAlgorithm(s.to_string()))
        }
    }
}

/// LZSS compression with the given window sizes in bytes
pub fn lzss_compress(ibuf: &[u8],dictionary_size: usize,lookahead_size: usize) -> Result<Vec<u8>,Error> {
    lzss::compress(ibuf,&Options::create(dictionary_size,lookahead_size))
}

pub fn lzss_decompress(ibuf: &[u8]) -> Result<Vec<u8>,Error> {
    lzss::expand(ibuf)
}

pub fn huffman_compress(ibuf: &[u8]) -> Result<Vec<u8>,Error> {
    huffman::compress(ibuf)
}

pub fn huffman_decompress(ibuf: &[u8]) -> Result<Vec<u8>,Error> {
    huffman::expand(ibuf)
}

/// LZSS followed by Huffman, window sizes are in bytes and apply to the LZSS stage
pub fn hs_compress(ibuf: &[u8],dictionary_size: usize,lookahead_size: usize) -> Result<Vec<u8>,Error> {
    hs::compress(ibuf,&Options::create(dictionary_size,lookahead_size))
}

pub fn hs_decompress(ibuf: &[u8]) -> Result<Vec<u8>,Error> {
    hs::expand(ibuf)
}

#[test]
fn algorithm_names() {
    use std::str::FromStr;
    for alg in [Algorithm::Lzss,Algorithm::Huffman,Algorithm::Hs] {
        assert_eq!(Algorithm::from_str(&alg.to_string()),Ok(alg));
        assert_eq!(Algorithm::from_id(alg.id()),Some(alg));
    }
    assert_eq!(Algorithm::from_str("HS"),Ok(Algorithm::Hs));
    let err = Algorithm::from_str("lzw").unwrap_err();
    assert_eq!(err,Error::UnknownAlgorithm("lzw".to_string()));
    assert_eq!(err.to_string(),"unknown algorithm `lzw`, expected lzss, huffman, or hs");
}

#[test]
fn detection() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    for alg in [Algorithm::Lzss,Algorithm::Huffman,Algorithm::Hs] {
        let compressed = alg.compress(test_data,&STD_OPTIONS).expect("compression failed");
        assert_eq!(Algorithm::detect(&compressed),Some(alg));
        assert_eq!(alg.expand(&compressed).expect("expansion failed"),test_data);
    }
    assert_eq!(Algorithm::detect(&[]),None);
    assert_eq!(Algorithm::detect(&[0]),None);
}

#[test]
fn bad_options() {
    assert_eq!(lzss_compress(b"abc",0,8),Err(Error::InvalidConfiguration));
    assert_eq!(lzss_compress(b"abc",8,0),Err(Error::InvalidConfiguration));
    assert_eq!(hs_compress(b"abc",0,0),Err(Error::InvalidConfiguration));
    assert!(STD_OPTIONS.validate().is_ok());
    assert!(Options::create(1,1).validate().is_ok());
}

#[test]
fn mismatched_stages_fail() {
    let test_data = "12345123456789123456789\n".as_bytes();
    let lz = lzss_compress(test_data,1024,1024).expect("compression failed");
    let hf = huffman_compress(test_data).expect("compression failed");
    let hs = hs_compress(test_data,1024,1024).expect("compression failed");
    assert_eq!(lzss_decompress(&hf),Err(Error::CorruptStream));
    assert_eq!(lzss_decompress(&hs),Err(Error::CorruptStream));
    assert_eq!(huffman_decompress(&lz),Err(Error::CorruptHeader));
    assert_eq!(huffman_decompress(&hs),Err(Error::CorruptHeader));
    assert_eq!(hs_decompress(&lz),Err(Error::CorruptHeader));
    assert_eq!(hs_decompress(&hf),Err(Error::CorruptHeader));
}
