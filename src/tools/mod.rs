//! Tools shared by the codecs

pub mod bit_stream;
pub mod ring_buffer;

/// Deterministic noise for tests (xorshift64)
#[cfg(test)]
pub fn noise(len: usize,seed: u64) -> Vec<u8> {
    let mut state = seed.max(1);
    let mut ans = Vec::with_capacity(len);
    for _i in 0..len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        ans.push((state >> 24) as u8);
    }
    ans
}
