//! Region graph.
//!
//! The world is a partition of grid cells into named regions. Regions and
//! cells cross-reference each other by id and coordinate only - there are
//! no live references between them, so the graph can be mutated from the
//! authoritative thread without aliasing hazards.

use std::collections::HashMap;

use conquest_shared::{Coord, FactionId, RegionId};

/// Mutable per-cell war state.
#[derive(Clone, Copy, Debug)]
pub struct CellState {
    /// The region this cell belongs to. Fixed at map build time.
    pub region: RegionId,
    /// Faction currently running an attack on this cell. At most one
    /// attack may reference a cell at any time.
    pub attacker: Option<FactionId>,
    /// Faction holding this cell by force without formal ownership.
    pub occupier: Option<FactionId>,
}

/// A named set of cells with one designated core cell.
#[derive(Clone, Debug)]
pub struct Region {
    /// Region id (arena index).
    pub id: RegionId,
    /// Display name.
    pub name: String,
    /// The core cell. Capturing it transfers the whole region.
    pub core: Coord,
    /// Every cell in the region, core included.
    pub cells: Vec<Coord>,
    /// Whether the region borders ungoverned space.
    pub borders_frontier: bool,
    /// Regions sharing at least one cell edge with this one.
    pub neighbors: Vec<RegionId>,
    /// Owning faction, if any.
    pub owner: Option<FactionId>,
    /// Faction occupying the region by force (set when the core cell has
    /// been captured, cleared when it is recaptured).
    pub occupier: Option<FactionId>,
}

/// Arena of regions plus the cell grid.
#[derive(Clone, Debug, Default)]
pub struct WorldMap {
    regions: Vec<Region>,
    cells: HashMap<Coord, CellState>,
}

impl WorldMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a region covering `cells` with the given core cell.
    ///
    /// Region adjacency is maintained incrementally: any existing region
    /// with a cell edge-adjacent to the new region becomes its neighbor.
    ///
    /// Returns `None` if the core is not one of the cells, or any cell
    /// already belongs to another region.
    pub fn add_region(
        &mut self,
        name: &str,
        core: Coord,
        cells: Vec<Coord>,
        borders_frontier: bool,
        owner: Option<FactionId>,
    ) -> Option<RegionId> {
        if !cells.contains(&core) {
            return None;
        }
        if cells.iter().any(|c| self.cells.contains_key(c)) {
            return None;
        }

        let id = RegionId::new(self.regions.len() as u32);

        // link adjacency both ways before inserting the new cells
        let mut neighbors: Vec<RegionId> = Vec::new();
        for cell in &cells {
            for adj in cell.neighbors() {
                if let Some(state) = self.cells.get(&adj) {
                    if state.region != id && !neighbors.contains(&state.region) {
                        neighbors.push(state.region);
                    }
                }
            }
        }
        for other in &neighbors {
            if let Some(region) = self.regions.get_mut(other.index()) {
                region.neighbors.push(id);
            }
        }

        for cell in &cells {
            self.cells.insert(
                *cell,
                CellState {
                    region: id,
                    attacker: None,
                    occupier: None,
                },
            );
        }

        self.regions.push(Region {
            id,
            name: name.to_owned(),
            core,
            cells,
            borders_frontier,
            neighbors,
            owner,
            occupier: None,
        });

        Some(id)
    }

    /// Looks up a region by id.
    #[must_use]
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.index())
    }

    /// Mutable region lookup.
    pub fn region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.get_mut(id.index())
    }

    /// Looks up a cell's war state. `None` means the coordinate is
    /// ungoverned space.
    #[must_use]
    pub fn cell(&self, coord: Coord) -> Option<&CellState> {
        self.cells.get(&coord)
    }

    /// Mutable cell lookup.
    pub fn cell_mut(&mut self, coord: Coord) -> Option<&mut CellState> {
        self.cells.get_mut(&coord)
    }

    /// The region containing a coordinate, if any.
    #[must_use]
    pub fn region_of(&self, coord: Coord) -> Option<&Region> {
        self.cell(coord).and_then(|c| self.region(c.region))
    }

    /// Sets a region's owning faction.
    pub fn set_owner(&mut self, id: RegionId, owner: Option<FactionId>) {
        if let Some(region) = self.regions.get_mut(id.index()) {
            region.owner = owner;
        }
    }

    /// Iterates all regions.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Number of regions.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Number of governed cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
