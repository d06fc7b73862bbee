// Copyright (c) 2026-present, xdg-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The on-disk representation of a [`super::Tree`]: a pre-order walk with
//! an explicit presence marker standing in for each absent child, so the
//! reader can rebuild the exact shape of the tree (and every balance
//! factor) without recomputing anything.
//!
//! This mirrors the teacher-library's length-prefixed record style
//! (see its version-file writer) rather than the original C
//! implementation's technique of writing raw, soon-to-be-overwritten
//! pointer fields: a dumped node here carries no pointer bytes at all,
//! only a `present` flag, a balance factor, and the lengths needed to
//! slice the key and value out of the stream that follows. Reconstruction
//! turns that into a single bulk-allocated arena (see
//! [`super::tree::Builder`]) rather than patching addresses in place,
//! which keeps the loader entirely in safe Rust.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::node::NodeIndex;
use super::tree::Builder;
use super::{Balance, Tree};

/// Marks the start of a dumped tree; not a format version, just a sanity
/// check that we are not reading a truncated or unrelated byte stream.
const SENTINEL: u32 = 0xA1BB_CAFE;

/// Failure while turning a value into bytes.
#[derive(Debug)]
pub enum EncodeError {
    /// The underlying writer returned an I/O error.
    Io(io::Error),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "encode failed: {e}"),
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Failure while rebuilding a value (or a whole tree) from bytes.
#[derive(Debug)]
pub enum DecodeError {
    /// The underlying reader returned an I/O error, most often an
    /// unexpected end-of-stream.
    Io(io::Error),
    /// The stream did not start with the tree sentinel.
    BadMagic,
    /// A key's bytes were not valid UTF-8.
    InvalidUtf8,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "decode failed: {e}"),
            Self::BadMagic => write!(f, "stream does not start with a tree sentinel"),
            Self::InvalidUtf8 => write!(f, "key bytes were not valid UTF-8"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Values that can be written into a tree's wire format.
///
/// Implemented directly for small POD-ish types, and for composite types
/// (an `App`'s group table, say) by recursively dumping a nested
/// [`Tree`] — see [`dump`].
pub trait Encode {
    /// Writes `self`'s bytes to `writer`.
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError>;

    /// Buffers `self` into a freshly allocated `Vec<u8>`.
    ///
    /// Node records need to know a value's encoded length before they can
    /// write their own length-prefixed header, so values are always
    /// buffered this way rather than written straight to the file and
    /// patched in after the fact.
    fn encode_into_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf).expect("Vec<u8> writes cannot fail");
        buf
    }
}

/// Values that can be rebuilt from the bytes [`Encode`] produced.
pub trait Decode: Sized {
    /// Rebuilds a value from exactly `bytes`; implementations must consume
    /// the whole slice (it was already sized by the node's `value_len`).
    fn decode_from(bytes: &[u8]) -> Result<Self, DecodeError>;
}

/// Writes `tree` to `writer` as a sentinel, an entry count, and a
/// pre-order walk of present/absent node records.
pub fn dump<W: Write, V: Encode>(tree: &Tree<V>, writer: &mut W) -> Result<(), EncodeError> {
    writer.write_u32::<LittleEndian>(SENTINEL)?;
    writer.write_u32::<LittleEndian>(tree.len() as u32)?;
    write_subtree(tree, tree.root_index(), writer)
}

fn write_subtree<W: Write, V: Encode>(
    tree: &Tree<V>,
    idx: Option<NodeIndex>,
    writer: &mut W,
) -> Result<(), EncodeError> {
    let Some(idx) = idx else {
        writer.write_u8(0)?;
        writer.write_i8(0)?;
        writer.write_u32::<LittleEndian>(0)?;
        writer.write_u32::<LittleEndian>(0)?;
        return Ok(());
    };

    let (key, value, left, right, balance) = tree.node_at(idx);
    let value_bytes = value.encode_into_vec();

    writer.write_u8(1)?;
    writer.write_i8(balance.as_i8())?;
    writer.write_u32::<LittleEndian>(key.len() as u32)?;
    writer.write_u32::<LittleEndian>(value_bytes.len() as u32)?;
    writer.write_all(key.as_bytes())?;
    writer.write_all(&value_bytes)?;

    write_subtree(tree, left, writer)?;
    write_subtree(tree, right, writer)?;
    Ok(())
}

/// Rebuilds a [`Tree`] from a stream written by [`dump`].
///
/// The whole tree is read in one linear pass: the builder allocates its
/// arena up front (from the stored entry count) and every node is pushed
/// exactly once, in the same pre-order the writer used.
pub fn map<R: Read, V: Decode>(reader: &mut R) -> Result<Tree<V>, DecodeError> {
    let magic = reader.read_u32::<LittleEndian>()?;
    if magic != SENTINEL {
        return Err(DecodeError::BadMagic);
    }
    let count = reader.read_u32::<LittleEndian>()? as usize;

    let mut builder = Builder::with_capacity(count);
    let root = read_subtree(reader, &mut builder, None)?;
    Ok(builder.finish(root, count))
}

fn read_subtree<R: Read, V: Decode>(
    reader: &mut R,
    builder: &mut Builder<V>,
    parent: Option<NodeIndex>,
) -> Result<Option<NodeIndex>, DecodeError> {
    let present = reader.read_u8()?;
    let balance_byte = reader.read_i8()?;
    let key_len = reader.read_u32::<LittleEndian>()?;
    let value_len = reader.read_u32::<LittleEndian>()?;

    if present == 0 {
        return Ok(None);
    }

    let mut key_buf = vec![0u8; key_len as usize];
    reader.read_exact(&mut key_buf)?;
    let key = String::from_utf8(key_buf).map_err(|_| DecodeError::InvalidUtf8)?.into_boxed_str();

    let mut value_buf = vec![0u8; value_len as usize];
    reader.read_exact(&mut value_buf)?;
    let value = V::decode_from(&value_buf)?;

    let idx = builder.reserve(key, value, Balance::from_i8(balance_byte), parent);
    let left = read_subtree(reader, builder, Some(idx))?;
    let right = read_subtree(reader, builder, Some(idx))?;
    builder.set_children(idx, left, right);
    Ok(Some(idx))
}

macro_rules! impl_codec_via_byteorder {
    ($($ty:ty => $read:ident, $write:ident);* $(;)?) => {
        $(
            impl Encode for $ty {
                fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
                    writer.$write::<LittleEndian>(*self)?;
                    Ok(())
                }
            }

            impl Decode for $ty {
                fn decode_from(mut bytes: &[u8]) -> Result<Self, DecodeError> {
                    Ok(bytes.$read::<LittleEndian>()?)
                }
            }
        )*
    };
}

impl_codec_via_byteorder! {
    u32 => read_u32, write_u32;
    u64 => read_u64, write_u64;
    i32 => read_i32, write_i32;
}

impl Encode for () {
    fn encode_into<W: Write>(&self, _writer: &mut W) -> Result<(), EncodeError> {
        Ok(())
    }
}

impl Decode for () {
    fn decode_from(_bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(())
    }
}

impl Encode for String {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        writer.write_u32::<LittleEndian>(self.len() as u32)?;
        writer.write_all(self.as_bytes())?;
        Ok(())
    }
}

impl Decode for String {
    fn decode_from(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < 4 {
            return Err(DecodeError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "truncated string length",
            )));
        }
        let len = u32::from_le_bytes(bytes[..4].try_into().unwrap()) as usize;
        let body = bytes.get(4..4 + len).ok_or(DecodeError::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "truncated string body",
        )))?;
        String::from_utf8(body.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
    }
}

impl<V: Encode> Encode for Tree<V> {
    fn encode_into<W: Write>(&self, writer: &mut W) -> Result<(), EncodeError> {
        dump(self, writer)
    }
}

impl<V: Decode> Decode for Tree<V> {
    fn decode_from(bytes: &[u8]) -> Result<Self, DecodeError> {
        map(&mut &bytes[..])
    }
}
