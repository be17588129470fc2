//! Bit level reading and writing over byte buffers.
//! Codes are always packed starting from the most significant bit of each byte,
//! which is the ordering the `bit_vec` crate uses.

use bit_vec::BitVec;
use crate::Error;

/// Accumulates bits, the final byte is padded with zeros.
pub struct BitWriter {
    bits: BitVec
}

/// Reads bits from a byte buffer.  Running out of bits is an error,
/// there is no implicit zero fill.
pub struct BitReader {
    bits: BitVec,
    ptr: usize
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bits: BitVec::new()
        }
    }
    pub fn put_bit(&mut self,bit: bool) {
        self.bits.push(bit);
    }
    /// output the low `num_bits` of `code` starting from the most significant of them
    pub fn put_code(&mut self,num_bits: u32,code: u64) {
        for i in (0..num_bits).rev() {
            self.bits.push((code >> i) & 1 > 0);
        }
    }
    /// number of bits written so far
    pub fn len(&self) -> usize {
        self.bits.len()
    }
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bits.to_bytes()
    }
}

impl BitReader {
    pub fn create(dat: &[u8]) -> Self {
        Self {
            bits: BitVec::from_bytes(dat),
            ptr: 0
        }
    }
    pub fn get_bit(&mut self) -> Result<bool,Error> {
        match self.bits.get(self.ptr) {
            Some(bit) => {
                self.ptr += 1;
                Ok(bit)
            },
            None => Err(Error::UnexpectedEndOfInput)
        }
    }
    /// get `num_bits` into the low bits of the result, first bit read is most significant
    pub fn get_code(&mut self,num_bits: u32) -> Result<u64,Error> {
        if self.remaining() < num_bits as usize {
            return Err(Error::UnexpectedEndOfInput);
        }
        let mut ans: u64 = 0;
        for _i in 0..num_bits {
            ans <<= 1;
            ans |= self.get_bit()? as u64;
        }
        Ok(ans)
    }
    /// bits not yet read, including any padding
    pub fn remaining(&self) -> usize {
        self.bits.len() - self.ptr
    }
    /// After the last symbol only the zero padding of the final byte may remain.
    pub fn expect_padding(&self) -> Result<(),Error> {
        if self.remaining() >= 8 {
            log::error!("{} bits of trailing data",self.remaining());
            return Err(Error::CorruptStream);
        }
        for i in self.ptr..self.bits.len() {
            if self.bits.get(i) == Some(true) {
                log::error!("nonzero padding bits");
                return Err(Error::CorruptStream);
            }
        }
        Ok(())
    }
}

/// Bits needed to store any of the values `0..n`, i.e., ceil(log2(n)).
/// This is 0 when `n` is 0 or 1.
pub fn field_width(n: usize) -> u32 {
    match n {
        0 | 1 => 0,
        _ => usize::BITS - (n - 1).leading_zeros()
    }
}

#[test]
fn codes() {
    let mut writer = BitWriter::new();
    writer.put_bit(true);
    writer.put_code(3,0b010);
    writer.put_code(12,0xabc);
    assert_eq!(writer.len(),16);
    let bytes = writer.to_bytes();
    assert_eq!(bytes,vec![0xaa,0xbc]);
    let mut reader = BitReader::create(&bytes);
    assert_eq!(reader.get_bit(),Ok(true));
    assert_eq!(reader.get_code(3),Ok(0b010));
    assert_eq!(reader.get_code(12),Ok(0xabc));
    assert_eq!(reader.get_bit(),Err(Error::UnexpectedEndOfInput));
}

#[test]
fn padding() {
    let mut writer = BitWriter::new();
    writer.put_code(5,0b10111);
    let bytes = writer.to_bytes();
    assert_eq!(bytes,vec![0xb8]);
    let mut reader = BitReader::create(&bytes);
    assert_eq!(reader.get_code(9),Err(Error::UnexpectedEndOfInput));
    assert_eq!(reader.expect_padding(),Err(Error::CorruptStream));
    assert_eq!(reader.get_code(5),Ok(0b10111));
    assert_eq!(reader.remaining(),3);
    assert!(reader.expect_padding().is_ok());
    let reader = BitReader::create(&[0xb8,0x01]);
    assert_eq!(reader.expect_padding(),Err(Error::CorruptStream));
}

#[test]
fn widths() {
    assert_eq!(field_width(1),0);
    assert_eq!(field_width(2),1);
    assert_eq!(field_width(3),2);
    assert_eq!(field_width(1024),10);
    assert_eq!(field_width(1025),11);
    assert_eq!(field_width(8192),13);
}
