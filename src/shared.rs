//! Process-wide recommender instance.

use crate::error::Result;
use crate::recommend::Recommender;
use once_cell::sync::OnceCell;
use std::sync::Arc;

static RECOMMENDER: OnceCell<Arc<Recommender>> = OnceCell::new();

/// Get the process-wide recommender, building it with `init` on first use.
///
/// Concurrent first callers block until one `init` finishes; `init` runs at
/// most once per successful initialization. A failed `init` leaves the cell
/// empty so a later call can try again.
pub fn init_global<F>(init: F) -> Result<Arc<Recommender>>
where
    F: FnOnce() -> Result<Recommender>,
{
    RECOMMENDER
        .get_or_try_init(|| init().map(Arc::new))
        .map(Arc::clone)
}

/// The process-wide recommender, if it has been initialized.
pub fn global() -> Option<Arc<Recommender>> {
    RECOMMENDER.get().cloned()
}
