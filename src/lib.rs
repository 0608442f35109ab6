#![doc = r#"
L1 instruction-cache prefetcher core.

This crate exposes two independent front-ends that plug into a CPU
simulator's branch-retire and L1I access hooks and decide what to prefetch
next:

- rdip: Return-address-stack Directed Instruction Prefetching. Folds a
  shadow return-address stack into a signature and replays the cache lines
  previously seen to miss under that signature.
- djolt: a two-range directed prefetcher (mini D-JOLT) backed by a call/
  return-counter signature, with a shared overflow table and a next-k-line
  fallback for untrained signatures.

Modules:
- lru: rank-vector LRU ordering and a fully-associative LRU table
- set_assoc: set-associative wrapper over the LRU table
- signature: the two signature generators and the signature history queue
- miss_info: the base-plus-offset-vector miss descriptor
- miss_entry: bounded per-signature collections of miss descriptors
- upper_bits: D-JOLT's compressed upper-address dictionary
- host: the branch/cache-access/prefetch-sink boundary shared with a host
- rdip: the RDIP front-end
- djolt: the mini D-JOLT front-end
"#]

pub mod lru;
pub mod set_assoc;
pub mod signature;
pub mod miss_info;
pub mod miss_entry;
pub mod upper_bits;
pub mod host;
pub mod rdip;
pub mod djolt;

pub use djolt::DJolt;
pub use host::{BranchType, CodePrefetcher, PrefetchSink};
pub use rdip::Rdip;
