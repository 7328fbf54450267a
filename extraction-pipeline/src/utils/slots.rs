/// Assigns fragments, in document order, to `N` named slots.
///
/// The portal labels its fields only by position. Each page layout
/// destructures the returned array once, so that destructuring is the single
/// place to touch when the layout changes. Missing fragments leave trailing
/// slots `None`; surplus fragments are ignored.
pub fn project<T, const N: usize>(fragments: impl IntoIterator<Item = T>) -> [Option<T>; N] {
    let mut slots: [Option<T>; N] = std::array::from_fn(|_| None);
    for (slot, fragment) in slots.iter_mut().zip(fragments) {
        *slot = Some(fragment);
    }
    slots
}
