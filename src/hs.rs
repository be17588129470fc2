//! LZSS + Huffman
//!
//! The complete LZSS container, header included, is Huffman coded as if it were
//! ordinary data.  The outer container is the Huffman format with its own id, so
//! the window sizes travel inside the inner LZSS header where the Huffman stage
//! never sees them.  Expansion runs the stages in the opposite order.
//!
//! An empty input produces the outer header alone, declaring an empty inner stream.

use crate::{huffman,lzss};
use crate::{Algorithm,Error,Options};

/// Main compression function
pub fn compress(ibuf: &[u8],opt: &Options) -> Result<Vec<u8>,Error> {
    opt.validate()?;
    if ibuf.is_empty() {
        return huffman::compress_as(&[],Algorithm::Hs);
    }
    let inner = lzss::compress(ibuf,opt)?;
    log::debug!("LZSS stage: {} into {}",ibuf.len(),inner.len());
    huffman::compress_as(&inner,Algorithm::Hs)
}

/// Main decompression function
pub fn expand(ibuf: &[u8]) -> Result<Vec<u8>,Error> {
    let inner = huffman::expand_as(ibuf,Algorithm::Hs)?;
    if inner.is_empty() {
        return Ok(inner);
    }
    log::debug!("Huffman stage: {} into {}",ibuf.len(),inner.len());
    lzss::expand(&inner)
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress(test_data,&crate::STD_OPTIONS).expect("compression failed");
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    let test_data = crate::tools::noise(3000,13);
    for (dict,look) in [(1,1),(3,3),(256,16),(4096,4096)] {
        let compressed = compress(&test_data,&Options::create(dict,look)).expect("compression failed");
        assert_eq!(expand(&compressed).expect("expansion failed"),test_data);
    }
}

#[test]
fn stages_nest() {
    let test_data = "12345123456789123456789\n".as_bytes();
    let opt = Options::create(1024,1024);
    let compressed = compress(test_data,&opt).expect("compression failed");
    assert_eq!(compressed[0],Algorithm::Hs.id());
    let inner = huffman::expand_as(&compressed,Algorithm::Hs).expect("expansion failed");
    assert_eq!(inner,lzss::compress(test_data,&opt).expect("compression failed"));
}

#[test]
fn repetitive_data() {
    let test_data = [0x41;1000];
    let compressed = compress(&test_data,&Options::create(1024,1024)).expect("compression failed");
    assert!(compressed.len() < huffman::HEADER_LEN + 16);
    assert_eq!(expand(&compressed).expect("expansion failed"),test_data.to_vec());

    let text = "Sam I am. I do not like green eggs and ham.\n".repeat(200);
    let compressed = compress(text.as_bytes(),&crate::STD_OPTIONS).expect("compression failed");
    assert!(compressed.len() < text.len() / 4);
    assert_eq!(expand(&compressed).expect("expansion failed"),text.as_bytes());
}

#[test]
fn single_byte() {
    for opt in [Options::create(1,1),crate::STD_OPTIONS,Options::create(crate::MAX_WINDOW,crate::MAX_WINDOW)] {
        let compressed = compress(&[0x5a],&opt).expect("compression failed");
        assert_eq!(compressed[0],Algorithm::Hs.id());
        assert_eq!(expand(&compressed).expect("expansion failed"),vec![0x5a]);
    }
}

#[test]
fn dictionary_sized_input() {
    let mut test_data = crate::tools::noise(1024,11);
    test_data.copy_within(0..512,512);
    for opt in [Options::create(1024,1024),Options::create(1,1),crate::STD_OPTIONS] {
        let compressed = compress(&test_data,&opt).expect("compression failed");
        assert_eq!(expand(&compressed).expect("expansion failed"),test_data);
    }
}

#[test]
fn empty_input() {
    let compressed = compress(&[],&crate::STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed.len(),huffman::HEADER_LEN);
    assert_eq!(expand(&compressed).expect("expansion failed"),Vec::<u8>::new());
    assert_eq!(compress(&[],&Options::create(0,8)),Err(Error::InvalidConfiguration));
}

#[test]
fn determinism() {
    let test_data = crate::tools::noise(2000,21).repeat(2);
    let opt = Options::create(4096,64);
    assert_eq!(compress(&test_data,&opt),compress(&test_data,&opt));
}

#[test]
fn inner_errors_propagate() {
    assert_eq!(expand(&[0x53,0,0]),Err(Error::UnexpectedEndOfInput));
    // valid Huffman stage wrapping something that is not LZSS
    let bad = huffman::compress_as("not an LZSS stream".as_bytes(),Algorithm::Hs).expect("compression failed");
    assert_eq!(expand(&bad),Err(Error::CorruptStream));
    // inner LZSS stream with its last byte missing
    let test_data = "12345123456789123456789\n".as_bytes();
    let inner = lzss::compress(test_data,&Options::create(1024,1024)).expect("compression failed");
    let bad = huffman::compress_as(&inner[0..inner.len()-1],Algorithm::Hs).expect("compression failed");
    assert_eq!(expand(&bad),Err(Error::UnexpectedEndOfInput));
}
