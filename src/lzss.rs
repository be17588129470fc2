//! LZSS Compression
//!
//! Each token is a flag bit followed by either a literal byte or a back-reference.
//! The widths of the back-reference fields are derived from the window sizes,
//! which are carried in the header so that expansion needs no options.
//!
//! Header (13 bytes, little endian):
//! * prelude, see `container`
//! * 4 byte dictionary size
//! * 4 byte lookahead size
//!
//! Body, packed MSB first, final byte zero padded:
//! * `0` + 8 bit literal
//! * `1` + (distance-1) in ceil(log2(dictionary)) bits + (length-1) in ceil(log2(lookahead)) bits

use crate::container::{Prelude,PRELUDE_LEN,read_u32_le};
use crate::matcher::{Match,Matcher,MIN_MATCH};
use crate::tools::bit_stream::{BitReader,BitWriter,field_width};
use crate::{Algorithm,Error,Options};

pub const HEADER_LEN: usize = PRELUDE_LEN + 8;

/// Output of the matching stage, consumed immediately by the serializer.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum Token {
    Literal(u8),
    Match(Match)
}

/// Iterator over the tokens for an input buffer, greedy parsing.
pub struct Tokens<'a> {
    input: &'a [u8],
    matcher: Matcher<'a>,
    pos: usize
}

impl <'a> Iterator for Tokens<'a> {
    type Item = Token;
    fn next(&mut self) -> Option<Token> {
        if self.pos >= self.input.len() {
            return None;
        }
        match self.matcher.find_match(self.pos) {
            Some(m) => {
                self.pos += m.length;
                Some(Token::Match(m))
            },
            None => {
                let c = self.input[self.pos];
                self.pos += 1;
                Some(Token::Literal(c))
            }
        }
    }
}

/// Break the input into literals and matches.
pub fn tokenize<'a>(ibuf: &'a [u8],opt: &Options) -> Result<Tokens<'a>,Error> {
    opt.validate()?;
    Ok(Tokens {
        input: ibuf,
        matcher: Matcher::create(ibuf,opt),
        pos: 0
    })
}

/// bit widths of the distance and length fields
fn widths(opt: &Options) -> (u32,u32) {
    (field_width(opt.dictionary_size),field_width(opt.lookahead_size))
}

/// Main compression function
pub fn compress(ibuf: &[u8],opt: &Options) -> Result<Vec<u8>,Error> {
    opt.validate()?;
    let mut ans = Vec::new();
    Prelude::create(Algorithm::Lzss,ibuf.len())?.write(&mut ans);
    ans.extend_from_slice(&u32::to_le_bytes(opt.dictionary_size as u32));
    ans.extend_from_slice(&u32::to_le_bytes(opt.lookahead_size as u32));
    let (dist_bits,len_bits) = widths(opt);
    log::debug!("distance field {} bits, length field {} bits",dist_bits,len_bits);
    let mut writer = BitWriter::new();
    let mut match_count = 0;
    for token in tokenize(ibuf,opt)? {
        match token {
            Token::Literal(c) => {
                writer.put_bit(false);
                writer.put_code(8,c as u64);
            },
            Token::Match(m) => {
                log::trace!("match: distance {}, length {}",m.distance,m.length);
                writer.put_bit(true);
                writer.put_code(dist_bits,(m.distance - 1) as u64);
                writer.put_code(len_bits,(m.length - 1) as u64);
                match_count += 1;
            }
        }
    }
    log::debug!("{} matches in {} bits",match_count,writer.len());
    ans.append(&mut writer.to_bytes());
    Ok(ans)
}

/// Main decompression function
pub fn expand(ibuf: &[u8]) -> Result<Vec<u8>,Error> {
    let prelude = Prelude::read(ibuf)?;
    if prelude.algorithm() != Some(Algorithm::Lzss) {
        log::error!("id {:#04x} is not LZSS",prelude.id);
        return Err(Error::CorruptStream);
    }
    let opt = Options::create(
        read_u32_le(ibuf,PRELUDE_LEN)? as usize,
        read_u32_le(ibuf,PRELUDE_LEN+4)? as usize
    );
    if opt.validate().is_err() {
        return Err(Error::CorruptStream);
    }
    let (dist_bits,len_bits) = widths(&opt);
    let textsize = prelude.expanded_len;
    log::debug!("expanding {} bytes, window {}, lookahead {}",textsize,opt.dictionary_size,opt.lookahead_size);
    let mut reader = BitReader::create(&ibuf[HEADER_LEN..]);
    let mut ans: Vec<u8> = Vec::new();
    while ans.len() < textsize {
        if !reader.get_bit()? {
            ans.push(reader.get_code(8)? as u8);
            continue;
        }
        let distance = reader.get_code(dist_bits)? as usize + 1;
        let length = reader.get_code(len_bits)? as usize + 1;
        if distance > opt.dictionary_size || distance > ans.len() {
            log::error!("distance {} reaches behind the window at {}",distance,ans.len());
            return Err(Error::CorruptStream);
        }
        if length < MIN_MATCH || length > opt.lookahead_size || ans.len() + length > textsize {
            log::error!("bad match length {} at {}",length,ans.len());
            return Err(Error::CorruptStream);
        }
        // byte by byte, source and destination can overlap
        let start = ans.len() - distance;
        for k in 0..length {
            let c = ans[start + k];
            ans.push(c);
        }
    }
    reader.expect_padding()?;
    Ok(ans)
}

#[test]
fn compression_works() {
    let test_data = "12345123456789123456789\n".as_bytes();
    let lzss_str = "4C 18 00 00 00 00 04 00 00 00 04 00 00 18 8C 86 63 41 AC 04 01 06 C3 71 C0 E6 04 01 00 A0";
    let compressed = compress(test_data,&Options::create(1024,1024)).expect("compression failed");
    assert_eq!(compressed,hex::decode(lzss_str.replace(" ","")).unwrap());
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress(test_data,&crate::STD_OPTIONS).expect("compression failed");
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(test_data.to_vec(),expanded);

    let test_data = crate::tools::noise(5000,7);
    for (dict,look) in [(1,1),(1,3),(3,3),(16,4),(1000,37),(4096,60),(65536,65536)] {
        let compressed = compress(&test_data,&Options::create(dict,look)).expect("compression failed");
        let expanded = expand(&compressed).expect("expansion failed");
        assert_eq!(test_data,expanded);
    }
}

#[test]
fn repetitive_data() {
    let test_data = [0x41;1000];
    let compressed = compress(&test_data,&Options::create(1024,1024)).expect("compression failed");
    // one literal and one match
    assert_eq!(compressed.len(),HEADER_LEN + 4);
    let expanded = expand(&compressed).expect("expansion failed");
    assert_eq!(expanded,test_data.to_vec());

    let mut test_data = Vec::new();
    for i in 0..3000 {
        test_data.push((i % 7) as u8 + (i / 500) as u8);
    }
    for (dict,look) in [(1,1),(2,3),(7,7),(8,200),(500,3),(3000,3000)] {
        let compressed = compress(&test_data,&Options::create(dict,look)).expect("compression failed");
        let expanded = expand(&compressed).expect("expansion failed");
        assert_eq!(test_data,expanded);
    }
}

#[test]
fn window_bounds() {
    let mut test_data = crate::tools::noise(2000,3);
    test_data.extend_from_within(100..1500);
    test_data.extend_from_slice(&[0;300]);
    test_data.extend_from_within(0..2000);
    for (dict,look) in [(1,1),(3,3),(100,10),(1500,1500),(2048,8192)] {
        let opt = Options::create(dict,look);
        let mut replay: Vec<u8> = Vec::new();
        let mut match_count = 0;
        for token in tokenize(&test_data,&opt).expect("bad options") {
            match token {
                Token::Literal(c) => replay.push(c),
                Token::Match(m) => {
                    assert!(m.distance >= 1 && m.distance <= dict);
                    assert!(m.length >= MIN_MATCH && m.length <= look);
                    assert!(m.distance <= replay.len());
                    let start = replay.len() - m.distance;
                    for k in 0..m.length {
                        replay.push(replay[start + k]);
                    }
                    match_count += 1;
                }
            }
        }
        assert_eq!(replay,test_data);
        if look >= MIN_MATCH {
            assert!(match_count > 0);
        } else {
            assert_eq!(match_count,0);
        }
    }
}

#[test]
fn dictionary_sized_input() {
    let mut test_data = crate::tools::noise(1024,11);
    test_data.copy_within(0..512,512);
    let compressed = compress(&test_data,&Options::create(1024,1024)).expect("compression failed");
    assert!(compressed.len() < test_data.len());
    assert_eq!(expand(&compressed).expect("expansion failed"),test_data);
}

#[test]
fn single_byte() {
    for opt in [Options::create(1,1),crate::STD_OPTIONS,Options::create(crate::MAX_WINDOW,crate::MAX_WINDOW)] {
        let compressed = compress(&[0x5a],&opt).expect("compression failed");
        assert_eq!(compressed.len(),HEADER_LEN + 2);
        assert_eq!(expand(&compressed).expect("expansion failed"),vec![0x5a]);
    }
}

#[test]
fn empty_input() {
    let compressed = compress(&[],&crate::STD_OPTIONS).expect("compression failed");
    assert_eq!(compressed.len(),HEADER_LEN);
    assert_eq!(expand(&compressed).expect("expansion failed"),Vec::<u8>::new());
}

#[test]
fn determinism() {
    let test_data = crate::tools::noise(3000,5).repeat(3);
    let opt = Options::create(4096,100);
    assert_eq!(compress(&test_data,&opt),compress(&test_data,&opt));
}

#[test]
fn corrupt_streams() {
    // header only
    assert_eq!(expand(&[0x4c]),Err(Error::UnexpectedEndOfInput));
    assert_eq!(expand(&[]),Err(Error::UnexpectedEndOfInput));
    assert_eq!(expand(&[0x4c,1,0,0,0,0,4,0]),Err(Error::UnexpectedEndOfInput));
    let test_data = "12345123456789123456789\n".as_bytes();
    let good = compress(test_data,&Options::create(1024,1024)).expect("compression failed");
    // truncated body
    assert_eq!(expand(&good[0..good.len()-2]),Err(Error::UnexpectedEndOfInput));
    // trailing garbage
    let mut bad = good.clone();
    bad.push(0);
    assert_eq!(expand(&bad),Err(Error::CorruptStream));
    // zero window
    let mut bad = good.clone();
    bad[6] = 0;
    assert_eq!(expand(&bad),Err(Error::CorruptStream));
    // match with nothing behind it
    let mut bad = good[0..HEADER_LEN].to_vec();
    bad.extend_from_slice(&[0x80,0x00,0x40,0x00]);
    assert_eq!(expand(&bad),Err(Error::CorruptStream));
    // match shorter than the minimum: three literals, then distance 1, length 2
    let mut writer = BitWriter::new();
    for _i in 0..3 {
        writer.put_bit(false);
        writer.put_code(8,b'a' as u64);
    }
    writer.put_bit(true);
    writer.put_code(10,0);
    writer.put_code(10,1);
    let mut bad = good[0..HEADER_LEN].to_vec();
    bad.append(&mut writer.to_bytes());
    assert_eq!(expand(&bad),Err(Error::CorruptStream));
    // match longer than the lookahead: lookahead 1000 leaves room for 1024 in the field
    let mut writer = BitWriter::new();
    writer.put_bit(false);
    writer.put_code(8,b'a' as u64);
    writer.put_bit(true);
    writer.put_code(10,0);
    writer.put_code(10,1010);
    let mut bad = good[0..HEADER_LEN].to_vec();
    bad[9..13].copy_from_slice(&u32::to_le_bytes(1000));
    bad.append(&mut writer.to_bytes());
    assert_eq!(expand(&bad),Err(Error::CorruptStream));
    // declared length longer than the data
    let mut bad = good.clone();
    bad[1] += 1;
    assert!(expand(&bad).is_err());
    // wrong id
    let mut bad = good.clone();
    bad[0] = 0x48;
    assert_eq!(expand(&bad),Err(Error::CorruptStream));
}
