/*!
upper_bits.rs - UpperBitTable (D-JOLT only).

A small fully-associative dictionary mapping up to 31 distinct
upper-address regions to a stable 1-based id. Id 0 is reserved for
"invalid" so `CompressedAddr::default()` (all zero) reads as empty.
Entries are never evicted in the core design; once the 31 ids are
assigned, further distinct regions fail to compress.
*/

use crate::miss_info::CompressedAddr;

/// 31 usable ids (`UpperBitPtrBits = 5`, so `2^5 - 1`).
pub const MAX_ENTRIES: usize = 31;

#[derive(Debug, Clone)]
pub struct UpperBitTable {
    /// `upper_mask` selects the bits above `log2_block_size` that
    /// identify a region (e.g. `0xFFFF_FFFF_FFE0_0000`, bits above 21).
    /// Kept as a field (not a const) since the crate takes
    /// `log2_block_size` as a runtime host parameter.
    upper_mask: u64,
    log2_block_size: u32,
    entries: Vec<Option<u64>>,
}

impl UpperBitTable {
    pub fn new(upper_mask: u64, log2_block_size: u32) -> Self {
        Self {
            upper_mask,
            log2_block_size,
            entries: vec![None; MAX_ENTRIES],
        }
    }

    /// Split a full byte address into `(upper, lower)`.
    fn split(&self, full_address: u64) -> (u64, u64) {
        let upper = full_address & self.upper_mask;
        let lower = (full_address & !self.upper_mask) >> self.log2_block_size;
        (upper, lower)
    }

    /// Compress `full_address`. Returns `None` on exhaustion (all 31 ids
    /// taken by other regions) — the caller treats the line as
    /// unlearnable for this event.
    pub fn compress(&mut self, full_address: u64) -> Option<CompressedAddr> {
        let (upper, lower) = self.split(full_address);
        if let Some(idx) = self.entries.iter().position(|e| *e == Some(upper)) {
            return Some(CompressedAddr {
                upper_id: (idx + 1) as u8,
                lower,
            });
        }
        if let Some(idx) = self.entries.iter().position(|e| e.is_none()) {
            self.entries[idx] = Some(upper);
            return Some(CompressedAddr {
                upper_id: (idx + 1) as u8,
                lower,
            });
        }
        log::trace!("UpperBitTable: exhausted, cannot compress region {upper:#x}");
        None
    }

    /// Reconstruct the full address from a previously compressed id.
    pub fn decompress(&self, addr: CompressedAddr) -> u64 {
        let upper = self.entries[addr.upper_id as usize - 1]
            .expect("decompress() precondition: upper_id must refer to a claimed entry");
        upper + (addr.lower << self.log2_block_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASK: u64 = 0xFFFF_FFFF_FFE0_0000;
    const LOG2_BLOCK: u32 = 6;

    #[test]
    fn compress_then_decompress_roundtrips() {
        let mut t = UpperBitTable::new(MASK, LOG2_BLOCK);
        let addr = 0x1234_5680u64; // line-aligned-ish address
        let c = t.compress(addr).unwrap();
        assert_eq!(t.decompress(c), addr);
    }

    #[test]
    fn same_region_reuses_the_same_id() {
        let mut t = UpperBitTable::new(MASK, LOG2_BLOCK);
        let c1 = t.compress(0x1000_0000).unwrap();
        let c2 = t.compress(0x1000_0040).unwrap();
        assert_eq!(c1.upper_id, c2.upper_id);
        assert_ne!(c1.lower, c2.lower);
    }

    #[test]
    fn exhaustion_after_31_distinct_regions() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut t = UpperBitTable::new(MASK, LOG2_BLOCK);
        for i in 0..31u64 {
            let region = i << 21;
            assert!(t.compress(region).is_some(), "region {i} should compress");
        }
        let region_32 = 31u64 << 21;
        assert!(t.compress(region_32).is_none());
    }

    #[test]
    fn compress_is_idempotent_for_id_assignment() {
        let mut t = UpperBitTable::new(MASK, LOG2_BLOCK);
        let a = t.compress(0xAAAA_0000).unwrap();
        let b = t.compress(0xAAAA_0000).unwrap();
        assert_eq!(a, b);
    }
}
