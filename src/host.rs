/*!
host.rs - The boundary this crate shares with its simulator host.

Everything here is plumbing: the host classifies branches and owns the
actual L1I/cache model, this crate only needs to be told which branch just
retired and to be given somewhere to send its prefetch requests.
*/

/// Branch classification the host hands to `branch_operate`. Only calls and
/// returns drive either prefetcher; every other kind is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchType {
    DirectCall,
    IndirectCall,
    Return,
    Other,
}

/// Where a prefetcher sends its prefetch requests. The host's
/// `prefetch_code_line` primitive returns nothing the core inspects.
pub trait PrefetchSink {
    fn prefetch_code_line(&mut self, byte_address: u64);
}

/// Common interface both `Rdip` and `DJolt` implement, mirroring
/// ChampSim-style per-CPU prefetcher event sinks. Hosts that want to hold
/// either prefetcher behind one type can do so through this trait.
pub trait CodePrefetcher {
    /// A branch retired. Only `DirectCall`/`IndirectCall`/`Return` affect
    /// state; prefetches, if any, go to `sink`.
    fn branch_operate(
        &mut self,
        ip: u64,
        branch_type: BranchType,
        branch_target: u64,
        sink: &mut dyn PrefetchSink,
    );

    /// An L1I access completed. `cache_hit == false` means miss.
    fn cache_operate(&mut self, v_addr: u64, cache_hit: bool, prefetch_hit: bool, sink: &mut dyn PrefetchSink);

    /// No-op in the core.
    fn cache_fill(&mut self, _v_addr: u64, _set: u32, _way: u32, _is_prefetch: bool, _evicted_v_addr: u64) {}

    /// No-op in the core.
    fn cycle_operate(&mut self) {}

    /// No-op in the core.
    fn final_stats(&self) {}
}

pub(crate) use BranchType::{DirectCall, IndirectCall, Return};

/// Used internally by both front-ends to dispatch on call-vs-return; kept
/// here so the `is_call`/match arms aren't duplicated per prefetcher.
pub(crate) enum Transfer {
    Call,
    Return,
}

pub(crate) fn classify(branch_type: BranchType) -> Option<Transfer> {
    match branch_type {
        DirectCall | IndirectCall => Some(Transfer::Call),
        Return => Some(Transfer::Return),
        BranchType::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_calls_and_returns_classify() {
        assert!(matches!(classify(BranchType::DirectCall), Some(Transfer::Call)));
        assert!(matches!(classify(BranchType::IndirectCall), Some(Transfer::Call)));
        assert!(matches!(classify(BranchType::Return), Some(Transfer::Return)));
        assert!(classify(BranchType::Other).is_none());
    }
}
