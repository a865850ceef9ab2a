//! Set semantics over ordered vectors.
//!
//! DCC records store many properties as JSON arrays that behave like sets
//! (aliases, documents, references). These helpers keep such arrays free of
//! duplicates while preserving the order in which values first appeared.

/// Return a copy of `entries` with `new` appended if no entry equals it.
///
/// The input slice is never modified.
///
/// # Examples
///
/// ```
/// use eu_utils::add_to_set;
///
/// assert_eq!(add_to_set(&[1, 2, 3], 4), vec![1, 2, 3, 4]);
/// assert_eq!(add_to_set(&[1, 2, 3], 3), vec![1, 2, 3]);
/// ```
pub fn add_to_set<T: PartialEq + Clone>(entries: &[T], new: T) -> Vec<T> {
    let mut merged = entries.to_vec();
    if !merged.contains(&new) {
        merged.push(new);
    }
    merged
}

/// Merge `additions` into `entries`, dropping every repeated value.
///
/// Unlike [`add_to_set`], duplicates already present in `entries` are
/// collapsed as well; the first occurrence wins.
pub fn extend_set<T, I>(entries: &[T], additions: I) -> Vec<T>
where
    T: PartialEq + Clone,
    I: IntoIterator<Item = T>,
{
    let mut merged: Vec<T> = Vec::with_capacity(entries.len());
    for value in entries.iter().cloned().chain(additions) {
        if !merged.contains(&value) {
            merged.push(value);
        }
    }
    merged
}
