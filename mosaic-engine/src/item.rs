//! Item descriptors consumed by the engine.
//!
//! ## Usage
//!
//! Implement [`GalleryItem`] for your own record type, or build plain
//! [`ItemDescriptor`] values from whatever your item source produces.
use std::hash::{DefaultHasher, Hash, Hasher};

/// Stable identity of an item within one item-source snapshot.
///
/// Identities are compared, hashed and stored as raw `u64` values. Use
/// [`ItemId::from_key`] to derive one from any hashable key (a spreadsheet
/// row id, a URI, a composite key), mirroring how keyed children are
/// identified elsewhere in the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub u64);

impl ItemId {
    /// Derives an identity by hashing an arbitrary key.
    pub fn from_key<K: Hash>(key: K) -> Self {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Returns the raw identity value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// The kind of media an item points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// A raster image; intrinsic dimensions come from decoding the image.
    Image,
    /// A video; intrinsic dimensions come from its metadata.
    Video,
    /// Anything the gallery cannot display. Skipped without placement.
    Unsupported,
}

/// Accessors the engine needs from an item.
///
/// The engine is generic over this trait so the same virtualization logic
/// serves every gallery surface instead of being re-implemented per screen.
/// An item's position in the sequence handed to the engine is its
/// `original_index`; it is not part of the trait because it is recomputed on
/// every filter change.
pub trait GalleryItem {
    /// Stable identity within the current snapshot.
    fn identity(&self) -> ItemId;
    /// What kind of media this item points at.
    fn media_kind(&self) -> MediaKind;
    /// Where the media lives. An empty URI is skipped without placement.
    fn media_uri(&self) -> &str;
}

/// A plain, owned item record for hosts without their own item type.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDescriptor {
    /// Stable identity within the current snapshot.
    pub identity: ItemId,
    /// What kind of media this item points at.
    pub media_kind: MediaKind,
    /// Where the media lives.
    pub media_uri: String,
}

impl ItemDescriptor {
    /// Creates a descriptor, deriving the identity from a hashable key.
    pub fn new<K: Hash>(key: K, media_kind: MediaKind, media_uri: impl Into<String>) -> Self {
        Self {
            identity: ItemId::from_key(key),
            media_kind,
            media_uri: media_uri.into(),
        }
    }
}

impl GalleryItem for ItemDescriptor {
    fn identity(&self) -> ItemId {
        self.identity
    }

    fn media_kind(&self) -> MediaKind {
        self.media_kind
    }

    fn media_uri(&self) -> &str {
        &self.media_uri
    }
}

/// How the gallery surface displays items.
///
/// Switching modes changes the column count and therefore forces a full
/// engine reset; packed layouts are cumulative and cannot be repaired
/// incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Masonry grid with the given number of columns.
    Grid {
        /// Number of columns. Zero is treated as one.
        columns: usize,
    },
    /// Single-column list with a fixed row height; measurement is bypassed.
    List,
}

impl Default for ViewMode {
    fn default() -> Self {
        Self::Grid { columns: 4 }
    }
}

impl ViewMode {
    /// Number of columns this mode lays out into.
    pub fn column_count(&self) -> usize {
        match self {
            Self::Grid { columns } => (*columns).max(1),
            Self::List => 1,
        }
    }

    /// Whether measurement is bypassed in favor of a constant row height.
    pub fn is_fixed_row(&self) -> bool {
        matches!(self, Self::List)
    }
}
