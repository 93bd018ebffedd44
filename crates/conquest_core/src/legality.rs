//! Legality engine.
//!
//! Pure, side-effect-free predicates over the current region graph and
//! faction relationships deciding whether a proposed attack may begin.
//! Checks run cheapest-and-most-decisive first; the edge/adjacency check
//! examines up to four neighbor cells with several sub-conditions each and
//! is deliberately last.
//!
//! Physical placement constraints (marker height, sky access) and the
//! per-player concurrent-attack limit are enforced by the lifecycle
//! manager around these checks, not here.

use conquest_shared::{Coord, FactionId};

use crate::config::WarConfig;
use crate::error::{LegalityError, LegalityResult};
use crate::faction::FactionDirectory;
use crate::territory::{CellState, Region, WorldMap};

/// Decides whether `attacker` may begin an attack on `target`.
///
/// # Errors
///
/// Returns the first failing check, in documented order.
pub fn check_attack(
    map: &WorldMap,
    factions: &FactionDirectory,
    config: &WarConfig,
    border_only: bool,
    attacker: FactionId,
    target: Coord,
) -> LegalityResult<()> {
    // 1. must be governed, owned territory
    let Some(cell) = map.cell(target) else {
        return Err(LegalityError::NotEnemyTerritory);
    };
    let Some(region) = map.region(cell.region) else {
        return Err(LegalityError::NotEnemyTerritory);
    };
    let Some(owner) = region.owner else {
        return Err(LegalityError::NotEnemyTerritory);
    };

    // 2. global target filters
    check_target_filters(factions, config, attacker, owner)?;

    // 3. one attack per cell
    if cell.attacker.is_some() {
        return Err(LegalityError::AlreadyUnderAttack);
    }

    // 4. nothing to gain from attacking what you already hold
    if cell_already_captured(factions, region, cell, attacker) {
        return Err(LegalityError::AlreadyCaptured);
    }

    // 5. must be a legitimate enemy target
    if !cell_is_enemy(factions, region, cell, attacker) {
        return Err(LegalityError::NotEnemy);
    }

    // 6. border skirmish mode
    if border_only && !region_is_border(map, factions, region) {
        return Err(LegalityError::NotBorderRegion);
    }

    // 7. must be reachable from ungoverned or favorable ground
    if !cell_is_at_edge(map, factions, attacker, target) {
        return Err(LegalityError::CellNotAtEdge);
    }

    Ok(())
}

/// Blacklist/whitelist filtering on the target's owner (and, in strict
/// whitelist mode, the attacker).
fn check_target_filters(
    factions: &FactionDirectory,
    config: &WarConfig,
    attacker: FactionId,
    owner: FactionId,
) -> LegalityResult<()> {
    if config.use_blacklist() {
        if let Some(name) = factions.name(owner) {
            if config.blacklist.iter().any(|n| n == name) {
                return Err(LegalityError::FactionBlocked);
            }
        }
    }
    if config.use_whitelist() {
        let listed = |id: FactionId| {
            factions
                .name(id)
                .is_some_and(|name| config.whitelist.iter().any(|n| n == name))
        };
        if !listed(owner) || (config.only_whitelist_attacks && !listed(attacker)) {
            return Err(LegalityError::FactionNotWhitelisted);
        }
    }
    Ok(())
}

/// Whether the cell is already held by the attacker's side: the region's
/// occupier is the attacker or an ally and no enemy holds the specific
/// cell, or the cell's occupier is the attacker or an ally.
#[must_use]
pub fn cell_already_captured(
    factions: &FactionDirectory,
    region: &Region,
    cell: &CellState,
    attacker: FactionId,
) -> bool {
    let friendly = |id: Option<FactionId>| {
        id.is_some_and(|f| f == attacker || factions.is_ally(attacker, f))
    };
    let enemy_holds_cell = cell
        .occupier
        .is_some_and(|f| factions.is_enemy(attacker, f));

    if friendly(region.occupier) && !enemy_holds_cell {
        return true;
    }
    friendly(cell.occupier)
}

/// Whether the cell is a legitimate enemy target:
///
/// 1. the region's owner is an enemy of the attacker; or
/// 2. the region belongs to the attacker's side (own faction, federation,
///    or ally) and the region or cell is occupied by an enemy (home
///    recapture); or
/// 3. the region is occupied by the attacker's side and the specific cell
///    is held by an enemy.
#[must_use]
pub fn cell_is_enemy(
    factions: &FactionDirectory,
    region: &Region,
    cell: &CellState,
    attacker: FactionId,
) -> bool {
    let enemy = |id: Option<FactionId>| id.is_some_and(|f| factions.is_enemy(attacker, f));
    let own_side = |id: Option<FactionId>| id.is_some_and(|f| factions.same_side(attacker, f));

    if enemy(region.owner) {
        return true;
    }

    if own_side(region.owner) && (enemy(region.occupier) || enemy(cell.occupier)) {
        return true;
    }

    own_side(region.occupier) && enemy(cell.occupier)
}

/// Whether a region is a border region: never the owner's home region;
/// otherwise it borders ungoverned space or has at least one neighbor with
/// a different owner.
#[must_use]
pub fn region_is_border(map: &WorldMap, factions: &FactionDirectory, region: &Region) -> bool {
    if let Some(owner) = region.owner {
        let is_home = factions
            .get(owner)
            .is_some_and(|f| f.home == Some(region.id));
        if is_home {
            return false;
        }
    }

    if region.borders_frontier {
        return true;
    }

    region
        .neighbors
        .iter()
        .filter_map(|id| map.region(*id))
        .any(|neighbor| neighbor.owner != region.owner)
}

/// Whether any 4-neighbor of `target` is ground the attack can be staged
/// from.
#[must_use]
pub fn cell_is_at_edge(
    map: &WorldMap,
    factions: &FactionDirectory,
    attacker: FactionId,
    target: Coord,
) -> bool {
    target
        .neighbors()
        .into_iter()
        .any(|coord| can_attack_from_neighbor(map, factions, attacker, coord))
}

/// Whether an attack can be staged from the given neighbor coordinate:
/// ungoverned or unowned ground, the attacker's own region with no hostile
/// occupier, or ground the attacker's side (ally or federation) occupies at
/// region or cell level.
fn can_attack_from_neighbor(
    map: &WorldMap,
    factions: &FactionDirectory,
    attacker: FactionId,
    coord: Coord,
) -> bool {
    // ungoverned space
    let Some(cell) = map.cell(coord) else {
        return true;
    };
    let Some(region) = map.region(cell.region) else {
        return true;
    };
    // unowned territory
    let Some(owner) = region.owner else {
        return true;
    };

    let ally = |f: FactionId| factions.is_ally(attacker, f);

    // own region, occupier absent or friendly
    if owner == attacker {
        match region.occupier {
            None => return true,
            Some(occ) if ally(occ) => return true,
            Some(_) => {}
        }
    }

    // attacker or an ally occupies the neighbor region
    if region
        .occupier
        .is_some_and(|occ| occ == attacker || ally(occ))
    {
        return true;
    }

    // attacker or an ally occupies the neighbor cell
    if cell
        .occupier
        .is_some_and(|occ| occ == attacker || ally(occ))
    {
        return true;
    }

    // federation-level staging ground
    if factions.federation_of(attacker).is_some() {
        if owner == attacker
            && region
                .occupier
                .is_some_and(|occ| factions.same_federation(owner, occ))
        {
            return true;
        }

        if factions.same_federation(attacker, owner) {
            match region.occupier {
                None => return true,
                Some(occ) if ally(occ) => return true,
                Some(_) => {}
            }
        }

        if region
            .occupier
            .is_some_and(|occ| factions.same_federation(attacker, occ))
        {
            return true;
        }

        if cell
            .occupier
            .is_some_and(|occ| factions.same_federation(attacker, occ))
        {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use conquest_shared::RegionId;

    struct Fixture {
        map: WorldMap,
        factions: FactionDirectory,
        config: WarConfig,
        a: FactionId,
        b: FactionId,
        region: RegionId,
    }

    /// One 2x2 region owned by `b`, core at (0, 0), bordering ungoverned
    /// space, with `a` and `b` enemies.
    fn fixture() -> Fixture {
        let mut map = WorldMap::new();
        let cells = vec![
            Coord::new(0, 0),
            Coord::new(1, 0),
            Coord::new(0, 1),
            Coord::new(1, 1),
        ];
        let mut factions = FactionDirectory::new();
        let a = factions.add_faction("veldt", None);
        let b = factions.add_faction("mire", None);
        factions.make_enemies(a, b);
        let region = map
            .add_region("marsh", Coord::new(0, 0), cells, true, Some(b))
            .unwrap();
        Fixture {
            map,
            factions,
            config: WarConfig::default(),
            a,
            b,
            region,
        }
    }

    fn check(f: &Fixture, target: Coord) -> LegalityResult<()> {
        check_attack(&f.map, &f.factions, &f.config, false, f.a, target)
    }

    #[test]
    fn test_enemy_border_cell_is_legal() {
        let f = fixture();
        assert_eq!(check(&f, Coord::new(1, 0)), Ok(()));
    }

    #[test]
    fn test_ungoverned_and_unowned_are_rejected() {
        let mut f = fixture();
        assert_eq!(
            check(&f, Coord::new(9, 9)),
            Err(LegalityError::NotEnemyTerritory)
        );
        f.map.set_owner(f.region, None);
        assert_eq!(
            check(&f, Coord::new(1, 0)),
            Err(LegalityError::NotEnemyTerritory)
        );
    }

    #[test]
    fn test_not_enemy_without_enmity() {
        let mut f = fixture();
        f.factions.make_allies(f.a, f.b);
        assert_eq!(check(&f, Coord::new(1, 0)), Err(LegalityError::NotEnemy));
    }

    #[test]
    fn test_cell_under_attack_is_rejected() {
        let mut f = fixture();
        f.map.cell_mut(Coord::new(1, 0)).unwrap().attacker = Some(f.a);
        assert_eq!(
            check(&f, Coord::new(1, 0)),
            Err(LegalityError::AlreadyUnderAttack)
        );
    }

    #[test]
    fn test_already_captured_cell_is_rejected() {
        let mut f = fixture();
        f.map.cell_mut(Coord::new(1, 0)).unwrap().occupier = Some(f.a);
        assert_eq!(
            check(&f, Coord::new(1, 0)),
            Err(LegalityError::AlreadyCaptured)
        );
    }

    #[test]
    fn test_region_occupied_by_ally_is_already_captured() {
        let mut f = fixture();
        let c = f.factions.add_faction("fen", None);
        f.factions.make_allies(f.a, c);
        f.map.region_mut(f.region).unwrap().occupier = Some(c);
        assert_eq!(
            check(&f, Coord::new(1, 0)),
            Err(LegalityError::AlreadyCaptured)
        );
    }

    #[test]
    fn test_blacklisted_target_is_blocked() {
        let mut f = fixture();
        f.config.blacklist = vec!["mire".to_owned()];
        assert_eq!(
            check(&f, Coord::new(1, 0)),
            Err(LegalityError::FactionBlocked)
        );
    }

    #[test]
    fn test_whitelist_modes() {
        let mut f = fixture();
        f.config.whitelist = vec!["fen".to_owned()];
        assert_eq!(
            check(&f, Coord::new(1, 0)),
            Err(LegalityError::FactionNotWhitelisted)
        );

        // target listed, attacker not, strict mode on
        f.config.whitelist = vec!["mire".to_owned()];
        f.config.only_whitelist_attacks = true;
        assert_eq!(
            check(&f, Coord::new(1, 0)),
            Err(LegalityError::FactionNotWhitelisted)
        );

        // relaxed mode only needs the target listed
        f.config.only_whitelist_attacks = false;
        assert_eq!(check(&f, Coord::new(1, 0)), Ok(()));
    }

    #[test]
    fn test_home_region_is_never_border() {
        let mut f = fixture();
        f.factions.set_home(f.b, f.region);
        let region = f.map.region(f.region).unwrap();
        assert!(!region_is_border(&f.map, &f.factions, region));
        assert_eq!(
            check_attack(&f.map, &f.factions, &f.config, true, f.a, Coord::new(1, 0)),
            Err(LegalityError::NotBorderRegion)
        );
    }

    #[test]
    fn test_border_only_mode_gates_interior_regions() {
        // 3-region strip: outer | middle | inner, all owned by b, only the
        // outer one touches ungoverned space.
        let mut map = WorldMap::new();
        let mut factions = FactionDirectory::new();
        let a = factions.add_faction("veldt", None);
        let b = factions.add_faction("mire", None);
        factions.make_enemies(a, b);

        let outer = vec![Coord::new(0, 0)];
        let middle = vec![Coord::new(1, 0)];
        let inner = vec![Coord::new(2, 0)];
        map.add_region("outer", Coord::new(0, 0), outer, true, Some(b))
            .unwrap();
        let middle_id = map
            .add_region("middle", Coord::new(1, 0), middle, false, Some(b))
            .unwrap();
        map.add_region("inner", Coord::new(2, 0), inner, false, Some(b))
            .unwrap();

        let config = WarConfig::default();
        // middle borders only same-owner regions: not a border region
        let middle_region = map.region(middle_id).unwrap();
        assert!(!region_is_border(&map, &factions, middle_region));
        assert_eq!(
            check_attack(&map, &factions, &config, true, a, Coord::new(1, 0)),
            Err(LegalityError::NotBorderRegion)
        );
        // with border-only off, the same cell is attackable (it touches
        // ungoverned space to the north)
        assert_eq!(
            check_attack(&map, &factions, &config, false, a, Coord::new(1, 0)),
            Ok(())
        );
    }

    #[test]
    fn test_surrounded_cell_is_not_at_edge() {
        // 3x3 region: the middle cell has no ungoverned or favorable
        // neighbor.
        let mut map = WorldMap::new();
        let mut factions = FactionDirectory::new();
        let a = factions.add_faction("veldt", None);
        let b = factions.add_faction("mire", None);
        factions.make_enemies(a, b);

        let mut cells = Vec::new();
        for x in 0..3 {
            for z in 0..3 {
                cells.push(Coord::new(x, z));
            }
        }
        map.add_region("blob", Coord::new(0, 0), cells, true, Some(b))
            .unwrap();

        let config = WarConfig::default();
        assert_eq!(
            check_attack(&map, &factions, &config, false, a, Coord::new(1, 1)),
            Err(LegalityError::CellNotAtEdge)
        );
        // corner cell touches ungoverned space
        assert_eq!(
            check_attack(&map, &factions, &config, false, a, Coord::new(0, 0)),
            Ok(())
        );
    }

    #[test]
    fn test_occupied_neighbor_cell_is_staging_ground() {
        let mut map = WorldMap::new();
        let mut factions = FactionDirectory::new();
        let a = factions.add_faction("veldt", None);
        let b = factions.add_faction("mire", None);
        factions.make_enemies(a, b);

        let mut cells = Vec::new();
        for x in 0..3 {
            for z in 0..3 {
                cells.push(Coord::new(x, z));
            }
        }
        map.add_region("blob", Coord::new(0, 0), cells, true, Some(b))
            .unwrap();
        // a holds a cell next to the middle
        map.cell_mut(Coord::new(1, 0)).unwrap().occupier = Some(a);

        let config = WarConfig::default();
        assert_eq!(
            check_attack(&map, &factions, &config, false, a, Coord::new(1, 1)),
            Ok(())
        );
    }

    #[test]
    fn test_home_recapture_is_enemy_target() {
        // a's own region is occupied by enemy b: cells are legal targets.
        let mut map = WorldMap::new();
        let mut factions = FactionDirectory::new();
        let a = factions.add_faction("veldt", None);
        let b = factions.add_faction("mire", None);
        factions.make_enemies(a, b);

        let cells = vec![Coord::new(0, 0), Coord::new(1, 0)];
        let region = map
            .add_region("home", Coord::new(0, 0), cells, true, Some(a))
            .unwrap();
        map.region_mut(region).unwrap().occupier = Some(b);

        let config = WarConfig::default();
        assert_eq!(
            check_attack(&map, &factions, &config, false, a, Coord::new(1, 0)),
            Ok(())
        );
    }
}
