//! Attack lifecycle manager.
//!
//! [`ConquestEngine`] is the single authoritative owner of all conquest
//! state: the region graph, the faction directory, every in-flight attack
//! and its three indexes (by player, by cell, by marker), the occupied-cell
//! set, the outbound event queue, and the persistence dirty flag. All
//! mutation happens on the thread that calls [`ConquestEngine::pump`];
//! timers and the save debounce loop only submit tasks.
//!
//! There is no global state anywhere: construct one engine at startup and
//! pass it to the collaborators that need it.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{info, warn};

use conquest_shared::{
    AttackId, AttackRecord, BlockPos, CancelReason, ConquestEvent, Coord, FactionId, PlayerId,
    RegionId, WarSnapshot,
};

use crate::attack::{Attack, ExclusionVolume};
use crate::config::WarConfig;
use crate::error::{LegalityError, LegalityResult, PersistenceResult};
use crate::faction::FactionDirectory;
use crate::legality;
use crate::marker::{MarkerBackend, OpenSkyMarker};
use crate::persist::{self, SaveScheduler, SnapshotStore};
use crate::scheduler::{spawn_attack_timer, EngineTask, TimerState};
use crate::territory::{Region, WorldMap};

/// External veto points around the attack lifecycle. Collaborators (treaty
/// rules, protection plugins) may cancel an otherwise-legal attack at
/// begin time or abort a capture at finalization time.
pub trait AttackHook: Send {
    /// Called before an attack starts. Return `false` to veto it.
    fn before_attack(&self, _player: PlayerId, _faction: FactionId, _cell: Coord) -> bool {
        true
    }

    /// Called before a finished attack captures its cell. Return `false`
    /// to abort the capture; the cell reverts to its pre-attack state.
    fn before_capture(&self, _player: PlayerId, _faction: FactionId, _cell: Coord) -> bool {
        true
    }
}

/// War mode flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WarState {
    /// Whether attacks may be started at all.
    pub enabled: bool,
    /// Whether captured regions may be annexed (consumed by the external
    /// annexation collaborator, carried and persisted here).
    pub annexation_allowed: bool,
    /// Whether only border regions may be attacked.
    pub border_only: bool,
    /// Whether block destruction is permitted during war.
    pub destruction_allowed: bool,
}

/// Point-in-time summary for the admin/command collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarStatus {
    /// Current mode flags.
    pub state: WarState,
    /// Number of in-flight attacks.
    pub active_attacks: usize,
    /// Number of cells held by force.
    pub occupied_cells: usize,
}

/// The conquest engine.
pub struct ConquestEngine {
    config: WarConfig,
    state: WarState,
    map: WorldMap,
    factions: FactionDirectory,
    marker: Box<dyn MarkerBackend>,
    hooks: Vec<Box<dyn AttackHook>>,

    attacks: HashMap<AttackId, Attack>,
    by_player: HashMap<PlayerId, Vec<AttackId>>,
    by_cell: HashMap<Coord, AttackId>,
    by_marker: HashMap<BlockPos, AttackId>,
    occupied: HashSet<Coord>,

    events: VecDeque<ConquestEvent>,
    dirty: Arc<AtomicBool>,
    tasks_tx: Sender<EngineTask>,
    tasks_rx: Receiver<EngineTask>,
    next_attack: u64,

    store: Option<SnapshotStore>,
    saver: Option<SaveScheduler>,
}

impl ConquestEngine {
    /// Creates an engine over the given world and faction data. War starts
    /// disabled; the marker backend defaults to an open sky.
    #[must_use]
    pub fn new(config: WarConfig, map: WorldMap, factions: FactionDirectory) -> Self {
        let marker = Box::new(OpenSkyMarker::new(config.max_marker_y));
        let (tasks_tx, tasks_rx) = unbounded();
        Self {
            config,
            state: WarState::default(),
            map,
            factions,
            marker,
            hooks: Vec::new(),
            attacks: HashMap::new(),
            by_player: HashMap::new(),
            by_cell: HashMap::new(),
            by_marker: HashMap::new(),
            occupied: HashSet::new(),
            events: VecDeque::new(),
            dirty: Arc::new(AtomicBool::new(false)),
            tasks_tx,
            tasks_rx,
            next_attack: 0,
            store: None,
            saver: None,
        }
    }

    /// Replaces the marker backend.
    #[must_use]
    pub fn with_marker(mut self, marker: Box<dyn MarkerBackend>) -> Self {
        self.marker = marker;
        self
    }

    /// Registers an external veto hook.
    pub fn add_hook(&mut self, hook: Box<dyn AttackHook>) {
        self.hooks.push(hook);
    }

    /// The region graph.
    #[must_use]
    pub fn map(&self) -> &WorldMap {
        &self.map
    }

    /// Mutable region graph access for the territory-data collaborator.
    pub fn map_mut(&mut self) -> &mut WorldMap {
        &mut self.map
    }

    /// The faction directory.
    #[must_use]
    pub fn factions(&self) -> &FactionDirectory {
        &self.factions
    }

    /// Mutable directory access for the diplomacy collaborator.
    pub fn factions_mut(&mut self) -> &mut FactionDirectory {
        &mut self.factions
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &WarConfig {
        &self.config
    }

    /// Current war mode flags.
    #[must_use]
    pub fn state(&self) -> WarState {
        self.state
    }

    /// Point-in-time status summary.
    #[must_use]
    pub fn status(&self) -> WarStatus {
        WarStatus {
            state: self.state,
            active_attacks: self.attacks.len(),
            occupied_cells: self.occupied.len(),
        }
    }

    // ------------------------------------------------------------------
    // war mode lifecycle
    // ------------------------------------------------------------------

    /// Enables war with the given mode flags and starts the persistence
    /// threads.
    pub fn enable(&mut self, annexation_allowed: bool, border_only: bool, destruction_allowed: bool) {
        self.state = WarState {
            enabled: true,
            annexation_allowed,
            border_only,
            destruction_allowed,
        };

        if self.store.is_none() {
            self.store = Some(SnapshotStore::spawn(
                self.config.snapshot_path.clone(),
                Arc::clone(&self.dirty),
            ));
        }
        if self.saver.is_none() {
            self.saver = Some(SaveScheduler::spawn(
                Duration::from_millis(self.config.save_period_ms),
                Arc::clone(&self.dirty),
                self.tasks_tx.clone(),
            ));
        }

        info!(
            annexation_allowed,
            border_only, destruction_allowed, "war enabled"
        );
    }

    /// Disables war: cancels every attack, releases every occupied cell,
    /// writes a final snapshot, and stops the persistence threads.
    /// Region-level occupation is left to the annexation collaborator.
    pub fn disable(&mut self) {
        self.state.enabled = false;
        self.state.annexation_allowed = false;

        let ids: Vec<AttackId> = self.attacks.keys().copied().collect();
        for id in ids {
            self.cancel_with(id, CancelReason::WarDisabled);
        }

        let cells: Vec<Coord> = self.occupied.drain().collect();
        for coord in cells {
            if let Some(cell) = self.map.cell_mut(coord) {
                cell.occupier = None;
            }
        }

        if let Some(saver) = self.saver.take() {
            saver.shutdown();
        }
        let snapshot = self.snapshot();
        if let Some(store) = self.store.take() {
            if let Err(e) = store.write_now(&snapshot) {
                warn!(error = %e, "final war snapshot failed");
            }
            store.shutdown();
        } else if let Err(e) = persist::write_snapshot(&self.config.snapshot_path, &snapshot) {
            warn!(error = %e, "final war snapshot failed");
        }

        info!("war disabled");
    }

    /// Shuts the engine down: persists if war is enabled, stops background
    /// threads and every attack timer. No events are emitted; a later
    /// [`Self::load_snapshot`] restores the attacks as they were.
    pub fn shutdown(mut self) {
        if self.state.enabled {
            if let Err(e) = self.save_now() {
                warn!(error = %e, "war snapshot on shutdown failed");
            }
        }
        if let Some(saver) = self.saver.take() {
            saver.shutdown();
        }
        if let Some(store) = self.store.take() {
            store.shutdown();
        }
        for attack in self.attacks.values_mut() {
            attack.timer.stop_and_join();
        }
    }

    // ------------------------------------------------------------------
    // attack lifecycle
    // ------------------------------------------------------------------

    /// Begins an attack: runs the legality checks and, on success,
    /// registers the attack, marks the cell, raises the marker, and starts
    /// the timer.
    ///
    /// # Errors
    ///
    /// The first failing [`LegalityError`] check.
    pub fn begin_attack(
        &mut self,
        player: PlayerId,
        faction: FactionId,
        cell: Coord,
        marker: BlockPos,
    ) -> LegalityResult<AttackId> {
        if !self.state.enabled {
            return Err(LegalityError::WarDisabled);
        }

        legality::check_attack(
            &self.map,
            &self.factions,
            &self.config,
            self.state.border_only,
            faction,
            cell,
        )?;

        self.marker.check_placement(marker)?;

        let active = self.by_player.get(&player).map_or(0, Vec::len);
        if active >= self.config.max_attacks_per_player {
            return Err(LegalityError::TooManyAttacks);
        }

        if self
            .hooks
            .iter()
            .any(|hook| !hook.before_attack(player, faction, cell))
        {
            return Err(LegalityError::CustomVeto);
        }

        let required = self
            .map
            .region_of(cell)
            .map_or(self.config.cell_attack_ticks, |region| {
                self.required_ticks_for(region)
            });
        let id = self.create_attack(player, faction, cell, marker, required, 0);

        self.events.push_back(ConquestEvent::AttackStarted {
            attack: id,
            player,
            faction,
            cell,
        });
        info!(
            attack = %id,
            faction = self.factions.name(faction).unwrap_or("?"),
            %cell,
            "attack started"
        );
        Ok(id)
    }

    /// Cancels an attack (the cell was defended, e.g. the marker was
    /// destroyed). Cancelling an attack that has already resolved is a
    /// no-op.
    pub fn cancel_attack(&mut self, id: AttackId) {
        self.cancel_with(id, CancelReason::Defended);
    }

    /// The attack currently targeting a cell, if any.
    #[must_use]
    pub fn attack_at(&self, cell: Coord) -> Option<&Attack> {
        self.by_cell.get(&cell).and_then(|id| self.attacks.get(id))
    }

    /// The attack whose marker anchors at the given block, if any.
    #[must_use]
    pub fn attack_at_marker(&self, anchor: BlockPos) -> Option<&Attack> {
        self.by_marker
            .get(&anchor)
            .and_then(|id| self.attacks.get(id))
    }

    /// All attacks run by one player.
    #[must_use]
    pub fn attacks_by_player(&self, player: PlayerId) -> Vec<&Attack> {
        self.by_player
            .get(&player)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.attacks.get(id))
            .collect()
    }

    /// Whether a region is currently a border region.
    #[must_use]
    pub fn is_region_border(&self, region: RegionId) -> bool {
        self.map
            .region(region)
            .is_some_and(|r| legality::region_is_border(&self.map, &self.factions, r))
    }

    /// Whether a block position is inside any attack's no-build volume.
    #[must_use]
    pub fn is_protected(&self, pos: BlockPos) -> bool {
        self.attacks.values().any(|attack| attack.protects(pos))
    }

    /// Iterates the cells currently held by force.
    pub fn occupied_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.occupied.iter().copied()
    }

    /// Drains the outbound event queue.
    pub fn drain_events(&mut self) -> Vec<ConquestEvent> {
        self.events.drain(..).collect()
    }

    /// Processes every pending task from the timers and the save debounce
    /// loop. Must be called regularly from the authoritative thread.
    /// Returns the number of tasks processed.
    pub fn pump(&mut self) -> usize {
        let tasks: Vec<EngineTask> = self.tasks_rx.try_iter().collect();
        let count = tasks.len();
        for task in tasks {
            match task {
                EngineTask::FinishAttack(id) => self.finish_attack(id),
                EngineTask::RepaintMarker { attack, stage } => {
                    // a repaint racing a cancel finds no attack: drop it
                    let anchor = self.attacks.get(&attack).map(|a| a.marker);
                    if let Some(anchor) = anchor {
                        self.marker.paint(anchor, stage);
                    }
                }
                EngineTask::Flush => {
                    let snapshot = self.snapshot();
                    if let Some(store) = &self.store {
                        store.submit(snapshot);
                    }
                }
            }
        }
        count
    }

    /// Finalizes an attack whose progress reached the required duration.
    /// Invoked by [`Self::pump`]; calling it twice for the same handle is a
    /// no-op.
    pub fn finish_attack(&mut self, id: AttackId) {
        let Some(attack) = self.detach(id) else {
            return;
        };

        // the backing cell can vanish if the world was reloaded mid-attack
        let Some(region_id) = self.map.cell(attack.cell).map(|c| c.region) else {
            warn!(
                attack = %id,
                cell = %attack.cell,
                "cell no longer resolves at finalization, treating attack as cancelled"
            );
            self.events.push_back(ConquestEvent::AttackCancelled {
                attack: id,
                player: attack.player,
                faction: attack.faction,
                cell: attack.cell,
                reason: CancelReason::InconsistentState,
            });
            return;
        };

        if self
            .hooks
            .iter()
            .any(|hook| !hook.before_capture(attack.player, attack.faction, attack.cell))
        {
            self.events.push_back(ConquestEvent::AttackCancelled {
                attack: id,
                player: attack.player,
                faction: attack.faction,
                cell: attack.cell,
                reason: CancelReason::Vetoed,
            });
            return;
        }

        let (core, owner) = {
            let Some(region) = self.map.region(region_id) else {
                return;
            };
            (region.core, region.owner)
        };

        if attack.cell == core {
            self.capture_region(region_id, &attack, owner);
        } else {
            self.capture_cell(region_id, &attack, owner);
        }
        self.mark_dirty();
    }

    // ------------------------------------------------------------------
    // persistence
    // ------------------------------------------------------------------

    /// Copies the current war state into a snapshot document.
    #[must_use]
    pub fn snapshot(&self) -> WarSnapshot {
        let mut snapshot = WarSnapshot {
            war_enabled: self.state.enabled,
            annexation_allowed: self.state.annexation_allowed,
            border_only: self.state.border_only,
            destruction_allowed: self.state.destruction_allowed,
            ..WarSnapshot::default()
        };

        let mut per_faction: HashMap<FactionId, Vec<Coord>> = HashMap::new();
        for coord in &self.occupied {
            if let Some(occupier) = self.map.cell(*coord).and_then(|c| c.occupier) {
                per_faction.entry(occupier).or_default().push(*coord);
            }
        }
        for (faction, mut cells) in per_faction {
            let Some(name) = self.factions.name(faction) else {
                continue;
            };
            cells.sort_unstable();
            let name = name.to_owned();
            for cell in cells {
                snapshot.push_occupied(&name, cell);
            }
        }

        let mut attacks: Vec<&Attack> = self.attacks.values().collect();
        attacks.sort_unstable_by_key(|attack| attack.id);
        for attack in attacks {
            snapshot.attacks.push(AttackRecord {
                attacker_id: attack.player.get(),
                cell_coord: [attack.cell.x, attack.cell.z],
                marker_coord: [attack.marker.x, attack.marker.y, attack.marker.z],
                progress_ticks: attack.progress_ticks(),
            });
        }

        snapshot
    }

    /// Writes the current state synchronously (admin force-save).
    ///
    /// # Errors
    ///
    /// Propagates snapshot write failures.
    pub fn save_now(&self) -> PersistenceResult<()> {
        let snapshot = self.snapshot();
        match &self.store {
            Some(store) => store.write_now(&snapshot),
            None => persist::write_snapshot(&self.config.snapshot_path, &snapshot),
        }
    }

    /// Restores war state from the snapshot file, if one exists. Must run
    /// before any attacks are accepted.
    ///
    /// A missing or malformed file is a cold start, not an error. Occupied
    /// cells and attacks whose faction, cell, or region no longer resolve
    /// are dropped with a warning.
    pub fn load_snapshot(&mut self) {
        let snapshot = match persist::read_snapshot(&self.config.snapshot_path) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, "war snapshot unreadable, starting cold");
                return;
            }
        };

        if !snapshot.war_enabled {
            return;
        }
        self.enable(
            snapshot.annexation_allowed,
            snapshot.border_only,
            snapshot.destruction_allowed,
        );

        for name in snapshot.occupied.keys() {
            let Some(faction) = self.factions.by_name(name) else {
                warn!(faction = %name, "dropping occupied cells of unknown faction");
                continue;
            };
            for coord in snapshot.occupied_cells(name) {
                if let Some(cell) = self.map.cell_mut(coord) {
                    cell.occupier = Some(faction);
                    self.occupied.insert(coord);
                } else {
                    warn!(%coord, "dropping occupied cell outside any region");
                }
            }
        }

        for record in &snapshot.attacks {
            let player = PlayerId::new(record.attacker_id);
            let Some(faction) = self.factions.faction_of(player) else {
                warn!(player = record.attacker_id, "dropping attack of factionless player");
                continue;
            };
            let cell = Coord::new(record.cell_coord[0], record.cell_coord[1]);
            let Some(required) = self.map.region_of(cell).map(|r| self.required_ticks_for(r))
            else {
                warn!(%cell, "dropping attack on cell outside any region");
                continue;
            };
            if self.by_cell.contains_key(&cell) {
                warn!(%cell, "dropping duplicate attack record");
                continue;
            }
            let marker = BlockPos::new(
                record.marker_coord[0],
                record.marker_coord[1],
                record.marker_coord[2],
            );
            self.create_attack(player, faction, cell, marker, required, record.progress_ticks);
        }

        info!(
            attacks = self.attacks.len(),
            occupied = self.occupied.len(),
            "war state restored"
        );
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    /// Attack duration for a region: base ticks, doubled-style multipliers
    /// for frontier regions and for the owner's home region.
    fn required_ticks_for(&self, region: &Region) -> u64 {
        let mut ticks = self.config.cell_attack_ticks as f64;
        if region.borders_frontier {
            ticks *= self.config.frontier_multiplier;
        }
        let is_home = region
            .owner
            .and_then(|owner| self.factions.get(owner))
            .is_some_and(|f| f.home == Some(region.id));
        if is_home {
            ticks *= self.config.home_multiplier;
        }
        (ticks as u64).max(1)
    }

    /// Registers an attack and starts its timer. Shared by
    /// [`Self::begin_attack`] and [`Self::load_snapshot`].
    fn create_attack(
        &mut self,
        player: PlayerId,
        faction: FactionId,
        cell: Coord,
        marker: BlockPos,
        required: u64,
        progress: u64,
    ) -> AttackId {
        let id = AttackId::new(self.next_attack);
        self.next_attack += 1;

        let stage = TimerState::stage_for(progress, required);
        let timer = spawn_attack_timer(
            id,
            Arc::new(TimerState::new(required, progress)),
            Duration::from_millis(self.config.tick_period_ms),
            self.tasks_tx.clone(),
        );

        let attack = Attack {
            id,
            player,
            faction,
            cell,
            marker,
            no_build: ExclusionVolume::around(
                marker,
                self.config.no_build_distance,
                self.config.no_build_y_offset,
            ),
            timer,
        };

        if let Some(state) = self.map.cell_mut(cell) {
            state.attacker = Some(faction);
        }
        self.marker.raise(marker, stage);

        self.by_player.entry(player).or_default().push(id);
        self.by_cell.insert(cell, id);
        self.by_marker.insert(marker, id);
        self.attacks.insert(id, attack);
        self.mark_dirty();

        id
    }

    /// Removes an attack from every index, stops its timer, clears the
    /// cell's attacker flag and the marker visuals. Returns `None` if the
    /// attack has already resolved, making every exit path idempotent.
    fn detach(&mut self, id: AttackId) -> Option<Attack> {
        let attack = self.attacks.remove(&id)?;
        attack.timer.stop();

        if let Some(list) = self.by_player.get_mut(&attack.player) {
            list.retain(|other| *other != id);
            if list.is_empty() {
                self.by_player.remove(&attack.player);
            }
        }
        self.by_cell.remove(&attack.cell);
        self.by_marker.remove(&attack.marker);

        if let Some(cell) = self.map.cell_mut(attack.cell) {
            cell.attacker = None;
        }
        self.marker.clear(attack.marker);
        self.mark_dirty();

        Some(attack)
    }

    /// Cancels an attack with the given reason. Idempotent.
    fn cancel_with(&mut self, id: AttackId, reason: CancelReason) {
        let Some(attack) = self.detach(id) else {
            return;
        };
        self.events.push_back(ConquestEvent::AttackCancelled {
            attack: id,
            player: attack.player,
            faction: attack.faction,
            cell: attack.cell,
            reason,
        });
        info!(attack = %id, cell = %attack.cell, ?reason, "attack cancelled");
    }

    /// Core-cell capture: the region falls as a whole. Every attack in the
    /// region is cancelled and every cell's occupier cleared; then the
    /// region is either liberated (attacker is on the owner's side) or
    /// marked occupied by the attacker, pending annexation.
    fn capture_region(&mut self, region_id: RegionId, attack: &Attack, owner: Option<FactionId>) {
        let (cells, previous_occupier) = {
            let Some(region) = self.map.region(region_id) else {
                return;
            };
            (region.cells.clone(), region.occupier)
        };

        for coord in &cells {
            if let Some(other) = self.by_cell.get(coord).copied() {
                self.cancel_with(other, CancelReason::Superseded);
            }
            if let Some(cell) = self.map.cell_mut(*coord) {
                cell.occupier = None;
            }
            self.occupied.remove(coord);
        }

        let liberation = owner.is_some_and(|o| self.factions.same_side(attack.faction, o));
        let Some(region) = self.map.region_mut(region_id) else {
            return;
        };
        if liberation {
            region.occupier = None;
            self.events.push_back(ConquestEvent::RegionLiberated {
                region: region_id,
                by: attack.faction,
                from: previous_occupier,
            });
            info!(region = %region_id, "region liberated");
        } else {
            region.occupier = Some(attack.faction);
            self.events.push_back(ConquestEvent::RegionCaptured {
                region: region_id,
                by: attack.faction,
                from: owner,
            });
            info!(region = %region_id, "region captured");
        }
    }

    /// Ordinary (non-core) cell capture, branching on whose region the
    /// cell is in:
    ///
    /// - own region under an occupier: the cell is retaken and held by its
    ///   owner so it does not fall back under the occupier's control;
    /// - own region, no occupier: the cell was held by an enemy and is
    ///   simply released;
    /// - a region the attacker occupies, cell held by someone else:
    ///   released;
    /// - anything else: the cell is now held by force by the attacker.
    fn capture_cell(&mut self, region_id: RegionId, attack: &Attack, owner: Option<FactionId>) {
        let region_occupier = self.map.region(region_id).and_then(|r| r.occupier);
        let cell_occupier = self.map.cell(attack.cell).and_then(|c| c.occupier);
        let coord = attack.cell;

        if owner == Some(attack.faction) {
            if region_occupier.is_some() {
                self.set_cell_occupier(coord, Some(attack.faction));
                self.events.push_back(ConquestEvent::CellLiberated {
                    cell: coord,
                    by: attack.faction,
                    from: region_occupier,
                });
            } else {
                self.set_cell_occupier(coord, None);
                self.events.push_back(ConquestEvent::CellLiberated {
                    cell: coord,
                    by: attack.faction,
                    from: cell_occupier,
                });
            }
        } else if region_occupier == Some(attack.faction) && cell_occupier.is_some() {
            self.set_cell_occupier(coord, None);
            self.events.push_back(ConquestEvent::CellLiberated {
                cell: coord,
                by: attack.faction,
                from: cell_occupier,
            });
        } else {
            self.set_cell_occupier(coord, Some(attack.faction));
            self.events.push_back(ConquestEvent::CellCaptured {
                cell: coord,
                by: attack.faction,
                from: owner,
            });
            info!(cell = %coord, "cell captured");
        }
    }

    /// Updates a cell's occupier and the occupied-cell index in lock-step.
    fn set_cell_occupier(&mut self, coord: Coord, occupier: Option<FactionId>) {
        if let Some(cell) = self.map.cell_mut(coord) {
            cell.occupier = occupier;
        }
        if occupier.is_some() {
            self.occupied.insert(coord);
        } else {
            self.occupied.remove(&coord);
        }
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}
