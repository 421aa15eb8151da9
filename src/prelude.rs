pub use crate::builder::{QueueBuilder, QueuePair};
pub use crate::ds::{FrequencyBuckets, PairList, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError, QueueError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::{HighQueueMetricsSnapshot, LowQueueMetricsSnapshot};
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::{MetricsExporter, MetricsSnapshotProvider};
pub use crate::pair::{Frequency, OccurrenceHandle, PairRecord, Symbol, SymbolPair, Triple};
pub use crate::queue::{HighFrequencyQueue, LowFrequencyQueue};
pub use crate::traits::{DecreaseOutcome, PairQueue};
