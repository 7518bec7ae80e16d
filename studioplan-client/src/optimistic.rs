/// Optimistic mutation helper
///
/// ```text
/// snapshot state ─> apply local change ─> request
///                                           ├─ Ok  ─> keep change
///                                           └─ Err ─> restore snapshot
/// ```
///
/// Views call this instead of writing their own revert logic per entity.

use std::future::Future;

/// Applies `change` to `state` and runs `request`, restoring the snapshot on
/// failure. The request's result is returned either way.
///
/// # Example
///
/// ```
/// use studioplan_client::optimistic::apply_optimistic;
///
/// # async fn example() {
/// let mut items = vec![1, 2, 3];
/// let result: Result<(), &str> =
///     apply_optimistic(&mut items, |items| items.retain(|&i| i != 2), || async {
///         Err("offline")
///     })
///     .await;
///
/// assert!(result.is_err());
/// assert_eq!(items, vec![1, 2, 3]);
/// # }
/// ```
pub async fn apply_optimistic<S, T, E, C, F, Fut>(
    state: &mut S,
    change: C,
    request: F,
) -> Result<T, E>
where
    S: Clone,
    C: FnOnce(&mut S),
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let snapshot = state.clone();
    change(state);

    match request().await {
        Ok(value) => Ok(value),
        Err(e) => {
            *state = snapshot;
            Err(e)
        }
    }
}
