/*!
signature.rs - The two signature generators and the shared signature
history queue.

`RdipSigGen` shadows a slice of the return-address stack and folds it into
a 32-bit signature on every call/return. `DjoltSigGen` instead tracks a
short FIFO of call IPs plus a return counter. Both ignore branches that are
neither calls nor returns; callers only ever invoke `on_call`/`on_return`.
*/

use std::collections::VecDeque;

/// RDIP's "RAS-whole" generator: a shadow return-address stack of
/// `hist_len` 32-bit slots, folded by rotate-left-24/XOR into a 32-bit
/// signature.
#[derive(Debug, Clone)]
pub struct RdipSigGen {
    hist: Vec<u32>,
    head: usize,
}

impl RdipSigGen {
    pub fn new(hist_len: usize) -> Self {
        assert!(hist_len > 0, "RdipSigGen requires a non-empty history");
        Self {
            hist: vec![0; hist_len],
            head: 0,
        }
    }

    fn make_sig(&self) -> u32 {
        let n = self.hist.len();
        let mut sig: u32 = 0;
        for i in 0..n {
            let idx = (self.head + i) % n;
            sig = sig.rotate_left(24) ^ self.hist[idx];
        }
        sig
    }

    /// Store `ip` at the head slot, advance the head, and fold.
    pub fn on_call(&mut self, ip: u64, _target: u64) -> u32 {
        let n = self.hist.len();
        self.hist[self.head] = ip as u32;
        self.head = (self.head + 1) % n;
        self.make_sig()
    }

    /// Fold first (the `^1` distinguishes this from a call's signature),
    /// then unwind the head and clear the slot it now points at.
    pub fn on_return(&mut self, _ip: u64, _target: u64) -> u32 {
        let sig0 = self.make_sig() ^ 1;
        let n = self.hist.len();
        self.head = (self.head + n - 1) % n;
        self.hist[self.head] = 0;
        sig0
    }
}

/// D-JOLT's "FIFO + return counter" generator. `hist_len` is 1 in every
/// configuration this crate uses, but the fold loop is written generally.
#[derive(Debug, Clone)]
pub struct DjoltSigGen {
    hist: Vec<u64>,
    head: usize,
    return_count: u32,
}

impl DjoltSigGen {
    /// `SIG_BITS - K = 16 - 5`.
    const ROTATE: u32 = 11;

    pub fn new(hist_len: usize) -> Self {
        assert!(hist_len > 0, "DjoltSigGen requires a non-empty history");
        Self {
            hist: vec![0; hist_len],
            head: 0,
            return_count: 0,
        }
    }

    fn make_sig(&self) -> u16 {
        let n = self.hist.len();
        let mut sig: u16 = 0;
        for i in 0..n {
            let idx = (self.head + i) % n;
            let pc = self.hist[idx];
            let fold = (pc ^ (pc >> 2)) as u16;
            sig = sig.rotate_left(Self::ROTATE) ^ fold;
        }
        sig ^ (self.return_count.wrapping_mul(0xabcd) as u16)
    }

    pub fn on_call(&mut self, ip: u64, _target: u64) -> u16 {
        self.return_count = 0;
        let n = self.hist.len();
        self.hist[self.head] = ip;
        self.head = (self.head + 1) % n;
        self.make_sig()
    }

    pub fn on_return(&mut self, _ip: u64, _target: u64) -> u16 {
        self.return_count = self.return_count.wrapping_add(1);
        self.make_sig()
    }
}

/// Fixed-capacity FIFO of recent signatures.
#[derive(Debug, Clone)]
pub struct SigHistory<T> {
    cap: usize,
    buf: VecDeque<T>,
}

impl<T: Copy> SigHistory<T> {
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "SigHistory requires a positive distance");
        Self {
            cap,
            buf: VecDeque::with_capacity(cap),
        }
    }

    /// Enqueue `sig`, dropping the oldest entry if already at capacity.
    pub fn push(&mut self, sig: T) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(sig);
    }

    /// The oldest signature still in the queue, if any.
    pub fn front(&self) -> Option<T> {
        self.buf.front().copied()
    }

    /// The most recently enqueued signature, if any.
    pub fn back(&self) -> Option<T> {
        self.buf.back().copied()
    }
}
