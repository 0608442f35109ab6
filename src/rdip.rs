/*!
rdip.rs - RDIP front-end: Return-address-stack Directed Instruction
Prefetching.

Wires `RdipSigGen` + `SigHistory` + a signature-indexed `SetAssocTable` of
`RdipEntry`s to the host's branch and cache-access hooks. Parameters:
32-bit signature, `HistLen=4`, `Distance=2`, 2048 sets x 4 ways, 3
vectors per entry (vector size fixed at 8, see `miss_info::VECTOR_SIZE`).
*/

use crate::host::{classify, BranchType, CodePrefetcher, PrefetchSink, Transfer};
use crate::miss_entry::RdipEntry;
use crate::miss_info::LineAddress;
use crate::set_assoc::SetAssocTable;
use crate::signature::{RdipSigGen, SigHistory};

const HIST_LEN: usize = 4;
const DISTANCE: usize = 2;
const N_SETS: usize = 2048;
const N_WAYS: usize = 4;
const N_VECTORS: usize = 3;

pub struct Rdip {
    cpu: u32,
    log2_block_size: u32,
    siggen: RdipSigGen,
    sig_history: SigHistory<u32>,
    miss_table: SetAssocTable<RdipEntry<LineAddress>>,
}

impl Rdip {
    pub fn new(cpu: u32, log2_block_size: u32) -> Self {
        Self {
            cpu,
            log2_block_size,
            siggen: RdipSigGen::new(HIST_LEN),
            sig_history: SigHistory::new(DISTANCE),
            miss_table: SetAssocTable::new(N_SETS, N_WAYS),
        }
    }
}

impl CodePrefetcher for Rdip {
    fn branch_operate(
        &mut self,
        ip: u64,
        branch_type: BranchType,
        branch_target: u64,
        sink: &mut dyn PrefetchSink,
    ) {
        let sig = match classify(branch_type) {
            Some(Transfer::Call) => self.siggen.on_call(ip, branch_target),
            Some(Transfer::Return) => self.siggen.on_return(ip, branch_target),
            None => return,
        };

        // Suppression: a signature that matches the *oldest* queued
        // entry recurred before the RAS changed meaningfully; replaying it
        // again would just repeat the last replay.
        if Some(sig) == self.sig_history.front() {
            log::trace!("rdip[{}]: suppressing replay for recurring sig {sig:#x}", self.cpu);
            return;
        }
        self.sig_history.push(sig);

        let key = sig as u64;
        if self.miss_table.contains(key) {
            log::trace!("rdip[{}]: replaying trained sig {sig:#x}", self.cpu);
            let log2 = self.log2_block_size;
            self.miss_table.get(key).for_each_valid(|line| {
                sink.prefetch_code_line(line << log2);
            });
        }
    }

    fn cache_operate(&mut self, v_addr: u64, cache_hit: bool, _prefetch_hit: bool, _sink: &mut dyn PrefetchSink) {
        if cache_hit {
            return;
        }
        let line = v_addr >> self.log2_block_size;
        let Some(sig) = self.sig_history.back() else {
            return;
        };
        let key = sig as u64;
        if !self.miss_table.contains(key) {
            self.miss_table.insert(key, RdipEntry::new(N_VECTORS));
        } else {
            self.miss_table.touch(key);
        }
        self.miss_table.get_mut(key).insert_or_touch(line);
    }
}
