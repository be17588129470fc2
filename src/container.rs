//! Container Prelude
//!
//! Every compressed buffer starts with the same 5 byte prelude:
//! * 1 byte algorithm id, see `Algorithm`
//! * 4 byte little endian length of the expanded data
//!
//! The codec specific header follows, see the `lzss` and `huffman` modules.

use crate::{Algorithm,Error};

pub const PRELUDE_LEN: usize = 5;

#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct Prelude {
    /// raw id byte, may not correspond to any algorithm
    pub id: u8,
    pub expanded_len: usize
}

impl Prelude {
    /// Fails with `FileTooLarge` if the length cannot be stored.
    pub fn create(alg: Algorithm,expanded_len: usize) -> Result<Self,Error> {
        if expanded_len > u32::MAX as usize {
            log::error!("cannot store length {}",expanded_len);
            return Err(Error::FileTooLarge);
        }
        Ok(Self {
            id: alg.id(),
            expanded_len
        })
    }
    pub fn algorithm(&self) -> Option<Algorithm> {
        Algorithm::from_id(self.id)
    }
    pub fn write(&self,obuf: &mut Vec<u8>) {
        obuf.push(self.id);
        obuf.extend_from_slice(&u32::to_le_bytes(self.expanded_len as u32));
    }
    pub fn read(ibuf: &[u8]) -> Result<Self,Error> {
        if ibuf.len() < PRELUDE_LEN {
            log::debug!("buffer of {} bytes is too short for a header",ibuf.len());
            return Err(Error::UnexpectedEndOfInput);
        }
        Ok(Self {
            id: ibuf[0],
            expanded_len: read_u32_le(ibuf,1)? as usize
        })
    }
}

/// read a little endian u32 at `offset`
pub fn read_u32_le(ibuf: &[u8],offset: usize) -> Result<u32,Error> {
    match ibuf.get(offset..offset+4) {
        Some(slice) => Ok(u32::from_le_bytes([slice[0],slice[1],slice[2],slice[3]])),
        None => Err(Error::UnexpectedEndOfInput)
    }
}

#[test]
fn prelude() {
    let mut obuf = Vec::new();
    Prelude::create(Algorithm::Lzss,0x1234).expect("bad length").write(&mut obuf);
    assert_eq!(obuf,vec![0x4c,0x34,0x12,0x00,0x00]);
    let prelude = Prelude::read(&obuf).expect("bad prelude");
    assert_eq!(prelude.algorithm(),Some(Algorithm::Lzss));
    assert_eq!(prelude.expanded_len,0x1234);
    assert_eq!(Prelude::read(&obuf[0..4]),Err(Error::UnexpectedEndOfInput));
    assert_eq!(Prelude::read(&[0,0,0,0,0]).expect("bad prelude").algorithm(),None);
}

#[test]
fn fields() {
    let buf = [1,2,3,4,5];
    assert_eq!(read_u32_le(&buf,1),Ok(0x05040302));
    assert_eq!(read_u32_le(&buf,2),Err(Error::UnexpectedEndOfInput));
}

#[cfg(target_pointer_width = "64")]
#[test]
fn length_limit() {
    assert!(Prelude::create(Algorithm::Huffman,u32::MAX as usize).is_ok());
    assert_eq!(Prelude::create(Algorithm::Huffman,u32::MAX as usize + 1),Err(Error::FileTooLarge));
}
