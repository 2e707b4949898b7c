// component.rs - Component marker and type-erased store interface
//
// Components are identified by Rust `TypeId`. Each type gets exactly one
// `SparseSet<T>`, created lazily the first time the type is attached.

use std::any::Any;

/// Marker for data that can be attached to a handle.
///
/// Implemented for every `'static` type; components carry no identity of
/// their own and are owned by the (handle, type) pair.
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Type-erased view of one component store.
///
/// The World keeps stores behind this trait so it can purge a destroyed
/// handle from every store and drive multi-type queries without knowing
/// the concrete component types.
pub(crate) trait ComponentStore {
    fn contains(&self, index: u32) -> bool;

    /// Remove `index` if present. Returns whether anything was removed.
    fn remove_index(&mut self, index: u32) -> bool;

    fn len(&self) -> usize;

    /// Dense handle-index array, in dense slot order.
    fn indices(&self) -> &[u32];

    fn component_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Strip module paths from a `std::any::type_name` string, keeping generics.
///
/// `alloc::vec::Vec<game::Health>` becomes `Vec<Health>`.
pub(crate) fn short_type_name(full: &str) -> String {
    fn is_delim(c: char) -> bool {
        matches!(c, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&')
    }

    let mut out = String::with_capacity(full.len());
    for token in full.split_inclusive(is_delim) {
        let (path, delim) = match token.char_indices().last() {
            Some((at, c)) if is_delim(c) => token.split_at(at),
            _ => (token, ""),
        };
        out.push_str(path.rsplit("::").next().unwrap_or(path));
        out.push_str(delim);
    }
    out
}
