//! LRU cache of decoded tiles.
//!
//! Tiles are shared as `Arc<Tile>`: eviction drops only the cache's
//! reference, so a tile held by an in-flight draw stays alive.

use std::num::NonZeroUsize;
use std::sync::Arc;

use fireplot_core::types::TileAddress;
use lru::LruCache;

use crate::tiles::{Tile, TileStore};

/// Bounded LRU of decoded tiles keyed by address.
pub struct TileCache {
    inner: LruCache<TileAddress, Arc<Tile>>,
}

impl TileCache {
    /// Create a cache holding at most `capacity` tiles (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: LruCache::new(cap),
        }
    }

    pub fn get(&mut self, address: &TileAddress) -> Option<Arc<Tile>> {
        self.inner.get(address).cloned()
    }

    pub fn insert(&mut self, address: TileAddress, tile: Arc<Tile>) {
        self.inner.put(address, tile);
    }

    /// Return the cached tile or load it from `store`. Absent tiles are not cached.
    pub fn get_or_load(&mut self, store: &TileStore, address: TileAddress) -> Option<Arc<Tile>> {
        if let Some(tile) = self.inner.get(&address) {
            return Some(Arc::clone(tile));
        }
        let tile = Arc::new(store.get_tile(address)?);
        self.inner.put(address, Arc::clone(&tile));
        Some(tile)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.cap().get()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn tile(v: u8) -> Arc<Tile> {
        Arc::new(Tile::from_gray(GrayImage::from_pixel(1, 1, Luma([v]))))
    }

    #[test]
    fn test_cache_insert_get() {
        let mut cache = TileCache::new(2);
        let key = TileAddress::new(3, 1, 2);
        cache.insert(key, tile(7));
        assert_eq!(cache.get(&key).unwrap().channel_at(0, 0), Some(7));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_eviction_keeps_borrowed_tile_alive() {
        let mut cache = TileCache::new(2);
        let k1 = TileAddress::new(1, 0, 0);
        let k2 = TileAddress::new(1, 1, 0);
        let k3 = TileAddress::new(1, 0, 1);

        cache.insert(k1, tile(1));
        let in_flight = cache.get(&k1).unwrap();
        cache.insert(k2, tile(2));
        cache.get(&k2);
        cache.insert(k3, tile(3)); // evicts k1

        assert!(cache.get(&k1).is_none());
        assert_eq!(in_flight.channel_at(0, 0), Some(1), "draw still owns the tile");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let cache = TileCache::new(0);
        assert_eq!(cache.capacity(), 1);
        assert!(cache.is_empty());
    }
}
