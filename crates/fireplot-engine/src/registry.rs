//! Bounded set of active emplacements.

use tracing::debug;

use fireplot_core::constants::MAX_EMPLACEMENTS;
use fireplot_core::types::{EmplacementId, MarkerHandle};
use fireplot_terrain::{Elevation, TerrainService};

use crate::error::LimitReached;
use crate::frame::TargetFrame;

/// A placed weapon.
#[derive(Debug, Clone, PartialEq)]
pub struct Emplacement<P> {
    pub id: EmplacementId,
    pub position: P,
    /// Sampled once at placement time.
    pub elevation: Elevation,
    /// Renderer-owned marker, attached after placement.
    pub marker: Option<MarkerHandle>,
}

/// At most `N` emplacements, kept in insertion order.
///
/// Ids are never reused within one registry, including across `clear`.
#[derive(Debug, Clone)]
pub struct EmplacementRegistry<P, const N: usize = MAX_EMPLACEMENTS> {
    slots: Vec<Emplacement<P>>,
    next_id: u32,
}

impl<P: Copy, const N: usize> EmplacementRegistry<P, N> {
    pub const CAPACITY: usize = N;

    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(N),
            next_id: 0,
        }
    }

    /// Sample the terrain at `position` and store a new emplacement.
    /// A full registry rejects the add without touching the terrain.
    pub fn add<T>(&mut self, position: P, terrain: &T) -> Result<EmplacementId, LimitReached>
    where
        T: TerrainService<P> + ?Sized,
    {
        if self.is_full() {
            debug!(capacity = N, "emplacement rejected, registry full");
            return Err(LimitReached { capacity: N });
        }
        let elevation = terrain.elevation_at(&position);
        let id = EmplacementId(self.next_id);
        self.next_id += 1;
        self.slots.push(Emplacement {
            id,
            position,
            elevation,
            marker: None,
        });
        Ok(id)
    }

    /// Remove by id. Returns the removed emplacement, None if absent.
    pub fn remove(&mut self, id: EmplacementId) -> Option<Emplacement<P>> {
        let index = self.slots.iter().position(|e| e.id == id)?;
        Some(self.slots.remove(index))
    }

    pub fn get(&self, id: EmplacementId) -> Option<&Emplacement<P>> {
        self.slots.iter().find(|e| e.id == id)
    }

    /// Attach a renderer marker. False if the emplacement does not exist.
    pub fn attach_marker(&mut self, id: EmplacementId, marker: MarkerHandle) -> bool {
        match self.slots.iter_mut().find(|e| e.id == id) {
            Some(e) => {
                e.marker = Some(marker);
                true
            }
            None => false,
        }
    }

    /// Closest emplacement whose planar distance to `target` is at most
    /// `max_range`. Ties go to the earliest added.
    pub fn nearest_within_range<F>(&self, frame: &F, target: &P, max_range: f64) -> Option<&Emplacement<P>>
    where
        F: TargetFrame<Point = P>,
    {
        let mut best: Option<(&Emplacement<P>, f64)> = None;
        for e in &self.slots {
            let d = frame.planar_offset(&e.position, target).length();
            if d > max_range || d.is_nan() {
                continue;
            }
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((e, d));
            }
        }
        best.map(|(e, _)| e)
    }

    /// First emplacement, in insertion order, within `radius` of `point`.
    pub fn select_near<F>(&self, frame: &F, point: &P, radius: f64) -> Option<&Emplacement<P>>
    where
        F: TargetFrame<Point = P>,
    {
        self.slots
            .iter()
            .find(|e| frame.pick_distance(&e.position, point) <= radius)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Emplacement<P>> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= N
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<P: Copy, const N: usize> Default for EmplacementRegistry<P, N> {
    fn default() -> Self {
        Self::new()
    }
}
