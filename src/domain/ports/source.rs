//! Source port trait.

use async_trait::async_trait;

use crate::domain::errors::SourceResult;
use crate::domain::models::ChangeEvent;

/// A trackable external entity.
///
/// Every variant holds a snapshot of the last observed remote state and
/// owns its own diffing rules. New kinds of source are added by
/// implementing this trait.
///
/// Lifecycle: [`initialize`](Source::initialize) seeds the snapshot and
/// must succeed once before [`check_for_updates`](Source::check_for_updates)
/// is called. A failed call never touches the stored snapshot.
#[async_trait]
pub trait Source: Send + Sync {
    /// Fetch the current remote state and store it as the baseline.
    ///
    /// No events are produced. On failure the source stays uninitialized
    /// and the call may be retried.
    async fn initialize(&mut self) -> SourceResult<()>;

    /// Fetch the current remote state and diff it against the snapshot.
    ///
    /// Returns one [`ChangeEvent`] per detected difference. The snapshot
    /// is replaced only when the fetch and decode succeeded, so calling
    /// this twice without a remote change yields no events the second time.
    async fn check_for_updates(&mut self) -> SourceResult<Vec<ChangeEvent>>;

    /// The caller-assigned unique name of this source.
    fn identity(&self) -> &str;

    /// Whether a baseline snapshot is held.
    fn is_initialized(&self) -> bool;

    /// Human-readable description of the tracked entity.
    fn describe(&self) -> String;
}
