// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! An ordered collection simpler than [`crate::avl::Tree`]: a plain
//! append list for things like a localized entry's value chain or the
//! cache's watched-file set.
//!
//! The original design behind this module links list nodes together with
//! raw back-pointers to their owning head, so one node can be removed
//! without being told which list it lives in, and several per-folder
//! lists can be spliced into a single traversal order without copying
//! any of them. Safe Rust has no good way to keep a back-pointer like
//! that valid across mutation, so this rebuilds it as a plain growable
//! vector instead (removal is by predicate, not by holding a node
//! handle); the per-folder concatenation this was meant to support
//! happens once, eagerly, when a [`crate::Library`] merges each
//! resolved folder's index together, rather than lazily on every query.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::avl::wire::{Decode, DecodeError, Encode, EncodeError};

/// A simple append-only (at either end) ordered collection.
#[derive(Debug, Clone, Default)]
pub struct List<T> {
    items: Vec<T>,
}

impl<T> List<T> {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends `item` to the end.
    pub fn push_back(&mut self, item: T) {
        self.items.push(item);
    }

    /// Prepends `item` to the front.
    pub fn push_front(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Removes every item matching `predicate`, preserving order.
    pub fn remove_if(&mut self, mut predicate: impl FnMut(&T) -> bool) {
        self.items.retain(|item| !predicate(item));
    }

    /// Whether the list has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Borrows the items as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterates the items in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a List<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for List<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<T: Encode> Encode for List<T> {
    fn encode_into<W: std::io::Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        writer.write_u32::<LittleEndian>(self.items.len() as u32)?;
        for item in &self.items {
            let bytes = item.encode_into_vec();
            writer.write_u32::<LittleEndian>(bytes.len() as u32)?;
            writer.write_all(&bytes)?;
        }
        Ok(())
    }
}

impl<T> List<T> {
    /// Reads a list off a stream rather than a fixed-size buffer, leaving
    /// the stream positioned right after the last item. Cache sections
    /// that place several encoded values back-to-back use this instead of
    /// [`Decode::decode_from`] so that reading one doesn't require first
    /// knowing its exact byte length.
    pub(crate) fn decode_from_reader<R: std::io::Read>(reader: &mut R) -> Result<Self, DecodeError>
    where
        T: Decode,
    {
        let count = reader.read_u32::<LittleEndian>()?;
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let len = reader.read_u32::<LittleEndian>()? as usize;
            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf)?;
            items.push(T::decode_from(&buf)?);
        }
        Ok(Self { items })
    }
}

impl<T: Decode> Decode for List<T> {
    fn decode_from(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_from_reader(&mut &bytes[..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_front_and_back_preserve_order() {
        let mut list = List::new();
        list.push_back(2);
        list.push_back(3);
        list.push_front(1);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn remove_if_drops_matching_items_only() {
        let mut list: List<i32> = (0..10).collect();
        list.remove_if(|n| n % 2 == 0);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn list_round_trips_through_wire_format() {
        let list: List<u32> = [10u32, 20, 30].into_iter().collect();
        let bytes = list.encode_into_vec();
        let decoded: List<u32> = List::decode_from(&bytes).unwrap();
        assert_eq!(decoded.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
    }
}
