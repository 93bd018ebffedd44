//! World marker seam.
//!
//! The engine never mutates world blocks itself. The host supplies a
//! [`MarkerBackend`] that validates marker placement and renders the
//! marker stack; the engine calls it from the authoritative thread only.

use conquest_shared::BlockPos;

use crate::error::{LegalityError, LegalityResult};

/// World-side collaborator for the physical attack marker.
pub trait MarkerBackend: Send {
    /// Validates that a marker can be raised at `anchor`: enough vertical
    /// room for the marker stack and unobstructed sky access.
    ///
    /// # Errors
    ///
    /// [`LegalityError::PlacementTooHigh`] or [`LegalityError::SkyBlocked`].
    fn check_placement(&self, anchor: BlockPos) -> LegalityResult<()>;

    /// Raises the marker visuals at the given progress stage.
    fn raise(&mut self, anchor: BlockPos, stage: u8);

    /// Repaints the marker visuals for a new progress stage. Purely
    /// cosmetic.
    fn paint(&mut self, anchor: BlockPos, stage: u8);

    /// Removes the marker visuals.
    fn clear(&mut self, anchor: BlockPos);
}

/// Headless backend: an empty world with a build-height limit and nothing
/// blocking the sky. Used by tests and server-side tooling.
#[derive(Clone, Copy, Debug)]
pub struct OpenSkyMarker {
    /// Highest block Y at which an anchor still leaves room for the marker
    /// stack.
    pub max_anchor_y: i32,
}

impl OpenSkyMarker {
    /// Creates a backend with the given anchor height limit.
    #[must_use]
    pub const fn new(max_anchor_y: i32) -> Self {
        Self { max_anchor_y }
    }
}

impl MarkerBackend for OpenSkyMarker {
    fn check_placement(&self, anchor: BlockPos) -> LegalityResult<()> {
        if anchor.y >= self.max_anchor_y {
            return Err(LegalityError::PlacementTooHigh);
        }
        Ok(())
    }

    fn raise(&mut self, _anchor: BlockPos, _stage: u8) {}

    fn paint(&mut self, _anchor: BlockPos, _stage: u8) {}

    fn clear(&mut self, _anchor: BlockPos) {}
}
