use std::sync::atomic::{AtomicU64, Ordering};

/// Provenance tag for values built through an output's builder factory.
///
/// Every output call context and every standalone builder gets a fresh id.
/// Output setters compare ids to reject values built elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OriginId(u64);

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

impl OriginId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed))
    }
}
