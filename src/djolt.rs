/*!
djolt.rs - mini D-JOLT front-end: a two-range directed prefetcher with
an overflow table and a next-k-line fallback engine.

Two independent `DjoltSigGen`/`SigHistory` pairs run the same event stream
at different look-ahead distances (`Distance=4` short-range, `Distance=15`
long-range). Both directed tables, plus a shared overflow ("extra") table,
are consulted on every branch in a fixed order; every miss both issues a
fallback next-k-line prefetch (degree chosen from whether the *last*
branch event replayed anything) and trains both directed tables.
*/

use crate::host::{classify, BranchType, CodePrefetcher, PrefetchSink, Transfer};
use crate::miss_entry::DjoltEntry;
use crate::miss_info::CompressedAddr;
use crate::set_assoc::SetAssocTable;
use crate::signature::{DjoltSigGen, SigHistory};
use crate::upper_bits::UpperBitTable;

const SHORT_DISTANCE: usize = 4;
const SHORT_SETS: usize = 128;
const SHORT_WAYS: usize = 4;

const LONG_DISTANCE: usize = 15;
const LONG_SETS: usize = 512;
const LONG_WAYS: usize = 4;

// Vectors per entry: 2 for every D-JOLT table (short, long, extra alike).
const DIRECTED_VECTORS: usize = 2;
const EXTRA_SETS: usize = 128;
const EXTRA_WAYS: usize = 4;
const EXTRA_VECTORS: usize = DIRECTED_VECTORS;

const UPPER_MASK: u64 = 0xFFFF_FFFF_FFE0_0000;

const CONSERVATIVE_DEGREE: u64 = 2;
const AGGRESSIVE_DEGREE: u64 = 5;

type DjoltTable = SetAssocTable<DjoltEntry<CompressedAddr>>;

pub struct DJolt {
    cpu: u32,
    log2_block_size: u32,
    siggen_1: DjoltSigGen,
    siggen_2: DjoltSigGen,
    sig_history_1: SigHistory<u16>,
    sig_history_2: SigHistory<u16>,
    miss_table_1: DjoltTable,
    miss_table_2: DjoltTable,
    extra_miss_table: DjoltTable,
    upper_bits: UpperBitTable,
    prefetch_issued: bool,
}

impl DJolt {
    pub fn new(cpu: u32, log2_block_size: u32) -> Self {
        Self {
            cpu,
            log2_block_size,
            siggen_1: DjoltSigGen::new(1),
            siggen_2: DjoltSigGen::new(1),
            sig_history_1: SigHistory::new(SHORT_DISTANCE),
            sig_history_2: SigHistory::new(LONG_DISTANCE),
            miss_table_1: SetAssocTable::new(SHORT_SETS, SHORT_WAYS),
            miss_table_2: SetAssocTable::new(LONG_SETS, LONG_WAYS),
            extra_miss_table: SetAssocTable::new(EXTRA_SETS, EXTRA_WAYS),
            upper_bits: UpperBitTable::new(UPPER_MASK, log2_block_size),
            prefetch_issued: false,
        }
    }

    /// Replay every address a table's entry for `sig` records, decompressing
    /// through `upper_bits`. Returns whether anything was issued.
    fn replay_table(table: &DjoltTable, key: u64, upper_bits: &UpperBitTable, sink: &mut dyn PrefetchSink) -> bool {
        if !table.contains(key) {
            return false;
        }
        let mut any = false;
        table.get(key).for_each_valid(|c_addr| {
            sink.prefetch_code_line(upper_bits.decompress(c_addr));
            any = true;
        });
        any
    }

    /// Train `table` (and, on overflow, the shared extra table) with
    /// `c_addr` under `sig`.
    fn learn_with_sig(table: &mut DjoltTable, extra: &mut DjoltTable, sig: u16, c_addr: CompressedAddr) {
        let key = sig as u64;
        if !table.contains(key) {
            table.insert(key, DjoltEntry::new(DIRECTED_VECTORS));
        } else {
            table.touch(key);
        }
        if table.get_mut(key).insert_but_do_not_evict(c_addr) {
            if extra.contains(key) {
                extra.touch(key);
            }
            return;
        }
        if !extra.contains(key) {
            extra.insert(key, DjoltEntry::new(EXTRA_VECTORS));
        } else {
            extra.touch(key);
        }
        extra.get_mut(key).insert_but_do_not_evict(c_addr);
    }
}

impl CodePrefetcher for DJolt {
    fn branch_operate(
        &mut self,
        ip: u64,
        branch_type: BranchType,
        branch_target: u64,
        sink: &mut dyn PrefetchSink,
    ) {
        let (sig_1, sig_2) = match classify(branch_type) {
            Some(Transfer::Call) => (
                self.siggen_1.on_call(ip, branch_target),
                self.siggen_2.on_call(ip, branch_target),
            ),
            Some(Transfer::Return) => (
                self.siggen_1.on_return(ip, branch_target),
                self.siggen_2.on_return(ip, branch_target),
            ),
            None => return,
        };
        self.sig_history_1.push(sig_1);
        self.sig_history_2.push(sig_2);

        let key_1 = sig_1 as u64;
        let key_2 = sig_2 as u64;
        // Fixed replay order: short-range, its overflow, long-range, its
        // overflow. No de-duplication when sig_1 == sig_2 (D-JOLT's two
        // generators receive identical input and can legitimately agree).
        let mut issued = false;
        issued |= Self::replay_table(&self.miss_table_1, key_1, &self.upper_bits, sink);
        issued |= Self::replay_table(&self.extra_miss_table, key_1, &self.upper_bits, sink);
        issued |= Self::replay_table(&self.miss_table_2, key_2, &self.upper_bits, sink);
        issued |= Self::replay_table(&self.extra_miss_table, key_2, &self.upper_bits, sink);
        self.prefetch_issued = issued;

        log::trace!(
            "djolt[{}]: branch sig_1={sig_1:#x} sig_2={sig_2:#x} prefetch_issued={}",
            self.cpu,
            self.prefetch_issued
        );
    }

    fn cache_operate(&mut self, v_addr: u64, cache_hit: bool, _prefetch_hit: bool, sink: &mut dyn PrefetchSink) {
        if cache_hit {
            return;
        }

        let degree = if self.prefetch_issued {
            CONSERVATIVE_DEGREE
        } else {
            AGGRESSIVE_DEGREE
        };
        let block_size = 1u64 << self.log2_block_size;
        for i in 1..=degree {
            sink.prefetch_code_line(v_addr + i * block_size);
        }

        let Some(c_addr) = self.upper_bits.compress(v_addr) else {
            debug_assert!(false, "upper-bit dictionary exhausted (31 regions already claimed)");
            return;
        };

        if let Some(sig_1) = self.sig_history_1.back() {
            Self::learn_with_sig(&mut self.miss_table_1, &mut self.extra_miss_table, sig_1, c_addr);
        }
        if let Some(sig_2) = self.sig_history_2.back() {
            Self::learn_with_sig(&mut self.miss_table_2, &mut self.extra_miss_table, sig_2, c_addr);
        }
    }
}
