//! Attack instances.
//!
//! An [`Attack`] is one ongoing conquest attempt against one cell. The
//! lifecycle manager owns every attack exclusively; the timer thread only
//! shares the progress atomics through the attack's timer handle.

use conquest_shared::{AttackId, BlockPos, Coord, FactionId, PlayerId};

use crate::scheduler::TimerHandle;

/// Axis-aligned no-build volume around an attack marker. Building and
/// destruction are blocked inside it while the attack runs, so defenders
/// cannot bury the marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExclusionVolume {
    /// Minimum X (inclusive).
    pub x_min: i32,
    /// Maximum X (inclusive).
    pub x_max: i32,
    /// Minimum Z (inclusive).
    pub z_min: i32,
    /// Maximum Z (inclusive).
    pub z_max: i32,
    /// Minimum Y (inclusive). Blocks below the marker stay editable.
    pub y_min: i32,
}

impl ExclusionVolume {
    /// Builds the volume around a marker anchor with the given horizontal
    /// half-extent and vertical offset.
    #[must_use]
    pub const fn around(anchor: BlockPos, distance: i32, y_offset: i32) -> Self {
        Self {
            x_min: anchor.x - distance,
            x_max: anchor.x + distance,
            z_min: anchor.z - distance,
            z_max: anchor.z + distance,
            y_min: anchor.y + y_offset,
        }
    }

    /// Whether a block position falls inside the volume.
    #[must_use]
    pub const fn contains(&self, pos: BlockPos) -> bool {
        pos.x >= self.x_min
            && pos.x <= self.x_max
            && pos.z >= self.z_min
            && pos.z <= self.z_max
            && pos.y >= self.y_min
    }
}

/// One ongoing conquest attempt.
#[derive(Debug)]
pub struct Attack {
    /// Attack handle.
    pub id: AttackId,
    /// Initiating player.
    pub player: PlayerId,
    /// Initiating faction.
    pub faction: FactionId,
    /// Target cell.
    pub cell: Coord,
    /// Marker anchor block.
    pub marker: BlockPos,
    /// No-build volume around the marker.
    pub no_build: ExclusionVolume,
    /// Handle to the attack's timer; progress lives in its shared state.
    pub timer: TimerHandle,
}

impl Attack {
    /// Elapsed progress in ticks.
    #[must_use]
    pub fn progress_ticks(&self) -> u64 {
        self.timer.state().progress()
    }

    /// Required total duration in ticks.
    #[must_use]
    pub fn required_ticks(&self) -> u64 {
        self.timer.state().required()
    }

    /// Current discretized progress stage.
    #[must_use]
    pub fn stage(&self) -> u8 {
        self.timer.state().stage()
    }

    /// Whether a block position is protected by this attack's no-build
    /// volume.
    #[must_use]
    pub fn protects(&self, pos: BlockPos) -> bool {
        self.no_build.contains(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_volume_bounds() {
        let volume = ExclusionVolume::around(BlockPos::new(10, 64, -5), 1, -1);
        assert!(volume.contains(BlockPos::new(10, 64, -5)));
        assert!(volume.contains(BlockPos::new(11, 200, -4)));
        assert!(volume.contains(BlockPos::new(9, 63, -6)));
        // below the protected band
        assert!(!volume.contains(BlockPos::new(10, 62, -5)));
        // outside horizontally
        assert!(!volume.contains(BlockPos::new(12, 64, -5)));
        assert!(!volume.contains(BlockPos::new(10, 64, -7)));
    }
}
