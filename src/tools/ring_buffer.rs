//! Ring buffer indexed by absolute stream position.
//! The matcher uses this to hold hash chain links for the positions inside the window.
use num_traits::PrimInt;

pub struct RingBuffer<T: PrimInt> {
    buf: Vec<T>,
    n: usize
}

impl <T: PrimInt> RingBuffer<T> {
    /// Create a buffer of `n` slots filled with `fill`, `n` is raised to 1 if it is 0.
    pub fn create(fill: T,n: usize) -> Self {
        let n = n.max(1);
        Self {
            buf: vec![fill;n],
            n
        }
    }
    pub fn len(&self) -> usize {
        self.n
    }
    /// get value at absolute position, the slot is shared with every position `n` apart
    pub fn get_abs(&self,abs: usize) -> T {
        self.buf[abs % self.n]
    }
    /// set value at absolute position, overwrites whatever was stored `n` positions ago
    pub fn set_abs(&mut self,abs: usize,val: T) {
        self.buf[abs % self.n] = val;
    }
}

#[test]
fn wrapping() {
    let mut ring: RingBuffer<u32> = RingBuffer::create(u32::MAX,4);
    assert_eq!(ring.len(),4);
    assert_eq!(ring.get_abs(9),u32::MAX);
    ring.set_abs(5,7);
    assert_eq!(ring.get_abs(1),7);
    assert_eq!(ring.get_abs(5),7);
    ring.set_abs(9,8);
    assert_eq!(ring.get_abs(5),8);
    assert_eq!(ring.get_abs(6),u32::MAX);
}

#[test]
fn empty_is_one_slot() {
    let mut ring: RingBuffer<u8> = RingBuffer::create(0,0);
    assert_eq!(ring.len(),1);
    ring.set_abs(3,1);
    assert_eq!(ring.get_abs(100),1);
}
