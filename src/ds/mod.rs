pub mod frequency_buckets;
pub mod pair_list;
pub mod slot_arena;

pub use frequency_buckets::FrequencyBuckets;
pub use pair_list::PairList;
pub use slot_arena::{SlotArena, SlotId};
