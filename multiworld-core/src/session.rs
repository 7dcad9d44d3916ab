use tracing::{debug, info, warn};

use crate::bindings::BindingRegistry;
use crate::config::SeedConfig;
use crate::events::{CheckOutcome, EventStore};
use crate::locations::{find_boss, find_region, Location};
use crate::tracker::CompletedChecks;
use crate::unlocks::{Unlock, UnlockPoller};
use crate::{BridgeError, BridgeSettings, CheckId, Result, SaveFileId, SeedId};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SessionState {
    Disconnected,
    /// Seed resolved, config not loaded yet.
    Bound,
    /// Seed and config in hand, player not in the world.
    Configured,
    Active,
}

/// Mission progress as reported by the game's mission tracker.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MissionStatus {
    NotStarted,
    Active,
    RequiredObjectivesComplete,
    ReadyToTurnIn,
    Complete,
    Failed,
}

/// Game-side happenings the session reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Save picked from the character menu, before the world loads.
    SaveSelected {
        save_file: SaveFileId,
    },
    /// Loading screen finished. `area` is the friendly name of the map.
    PlayerLoaded {
        save_file: Option<SaveFileId>,
        area: Option<String>,
    },
    LevelEntered {
        area: String,
    },
    EnemyDefeated {
        name: String,
        boss_or_champion: bool,
    },
    MissionStatusChanged {
        mission: String,
        status: MissionStatus,
    },
    ExperienceLevelChanged {
        level: u32,
    },
    /// Quit to menu or mod disabled.
    Disconnected,
}

/// The game layer. Everything engine-specific sits behind this.
pub trait GameHost {
    fn is_in_game(&self) -> bool;

    /// Materialise an unlock in game. Called once per poll the file is
    /// seen in, so it must tolerate repeats until the file is archived.
    fn grant(&mut self, unlock: &Unlock);

    fn announce(&mut self, _title: &str, _message: &str) {}
}

pub const ANNOUNCE_TITLE: &str = "Archipelago";

/// Per-process link between the running game and one seed.
#[derive(Debug)]
pub struct Session {
    settings: BridgeSettings,
    events: EventStore,
    poller: UnlockPoller,
    save_file: Option<SaveFileId>,
    seed: Option<SeedId>,
    config: Option<SeedConfig>,
    player_loaded: bool,
    completed: CompletedChecks,
    last_known_level: u32,
    ticks: u32,
}

impl Session {
    pub fn new(settings: BridgeSettings) -> Self {
        let events = EventStore::new(settings.comm_dir.clone());
        let poller = UnlockPoller::new(settings.unlock_prefix.clone());
        Self {
            settings,
            events,
            poller,
            save_file: None,
            seed: None,
            config: None,
            player_loaded: false,
            completed: CompletedChecks::new(),
            last_known_level: 0,
            ticks: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        match (&self.seed, &self.config) {
            (None, _) => SessionState::Disconnected,
            (Some(_), None) => SessionState::Bound,
            (Some(_), Some(_)) if !self.player_loaded => SessionState::Configured,
            (Some(_), Some(_)) => SessionState::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    pub fn seed(&self) -> Option<&SeedId> {
        self.seed.as_ref()
    }

    pub fn save_file(&self) -> Option<&SaveFileId> {
        self.save_file.as_ref()
    }

    pub fn config(&self) -> Option<&SeedConfig> {
        self.config.as_ref()
    }

    pub fn completed_checks(&self) -> &CompletedChecks {
        &self.completed
    }

    pub fn last_known_level(&self) -> u32 {
        self.last_known_level
    }

    pub fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::SaveSelected { save_file } => {
                info!(save_file = %save_file, "save file selected");
                self.select_save(Some(save_file));
            }
            GameEvent::PlayerLoaded { save_file, area } => {
                info!(save_file = ?save_file, "player loaded");
                self.select_save(save_file);
                self.player_loaded = true;

                if let Some(area) = area {
                    self.enter_area(&area);
                }
            }
            GameEvent::LevelEntered { area } => {
                self.ensure_config();
                self.enter_area(&area);
            }
            GameEvent::EnemyDefeated {
                name,
                boss_or_champion,
            } => {
                if !boss_or_champion {
                    return;
                }
                if let Some(boss) = find_boss(&name) {
                    self.report_location(boss);
                }
            }
            GameEvent::MissionStatusChanged { mission, status } => {
                if status == MissionStatus::Complete {
                    let id = CheckId::new(format!("mission_{mission}"));
                    self.report(&id, &format!("Completed {mission}"));
                }
            }
            GameEvent::ExperienceLevelChanged { level } => {
                if level > self.last_known_level {
                    info!(from = self.last_known_level, to = level, "player level up");
                    self.last_known_level = level;
                }
            }
            GameEvent::Disconnected => {
                self.reset();
                info!("player disconnected");
            }
        }
    }

    /// Host frame callback. Once the counter exceeds `poll_interval_ticks`
    /// while active and in game, inbound unlocks are handed to the host. Returns the
    /// number of grants issued this tick.
    pub fn tick<H: GameHost>(&mut self, host: &mut H) -> usize {
        if !self.is_active() || !host.is_in_game() {
            return 0;
        }

        self.ticks += 1;
        if self.ticks <= self.settings.poll_interval_ticks {
            return 0;
        }
        self.ticks = 0;

        let unlocks = self.poll_unlocks();
        let mut message = String::new();
        for unlock in &unlocks {
            info!(player = %unlock.player, item = unlock.item.name, "unlock received");
            message.push_str(&format!("Player {} sent {}\n", unlock.player, unlock.item.name));
            host.grant(unlock);
        }
        if !message.is_empty() {
            host.announce(ANNOUNCE_TITLE, message.trim_end());
        }
        unlocks.len()
    }

    /// Pending unlocks for the bound seed; empty while disconnected.
    pub fn poll_unlocks(&self) -> Vec<Unlock> {
        match &self.seed {
            Some(seed) => self.poller.poll(&self.settings.seed_dir(seed)),
            None => Vec::new(),
        }
    }

    pub fn archive_unlock(&self, unlock: &Unlock) -> Result<()> {
        self.poller.archive(unlock).map(|_| ())
    }

    /// Reports a check for the bound seed. Outside `Active` the check is
    /// dropped and `Ok(None)` is returned.
    pub fn send_check(&mut self, id: &CheckId, name: &str) -> Result<Option<CheckOutcome>> {
        if !self.is_active() {
            debug!(check = %id, state = ?self.state(), "discarding check outside active session");
            return Ok(None);
        }
        let Some(seed) = &self.seed else {
            return Ok(None);
        };
        self.events
            .send_check(seed, &mut self.completed, id, name)
            .map(Some)
    }

    /// Binds and configures for `save_file`, rebinding when it differs from
    /// the bound one.
    fn select_save(&mut self, save_file: Option<SaveFileId>) {
        let switched = matches!(
            (&self.save_file, &save_file),
            (Some(bound), Some(loaded)) if bound != loaded
        );
        if switched {
            info!("different save file loaded, rebinding");
            self.reset();
        }

        if self.seed.is_none() {
            match save_file {
                Some(save_file) => self.connect(save_file),
                None => info!("no save file id available, staying disconnected"),
            }
        }
        self.ensure_config();
    }

    fn connect(&mut self, save_file: SaveFileId) {
        let mut registry = match BindingRegistry::load(self.settings.bindings_path()) {
            Ok(registry) => registry,
            Err(err) => {
                info!(%err, "binding registry unavailable, start the coordinator client first");
                return;
            }
        };

        match registry.bind(&save_file) {
            Ok(seed) => {
                info!(seed = %seed, save_file = %save_file, "save file connected");
                self.seed = Some(seed);
                self.save_file = Some(save_file);
            }
            Err(BridgeError::NoSeedAvailable) => {
                info!(save_file = %save_file, "could not find an unbound seed");
            }
            Err(err) => warn!(%err, "failed to bind save file"),
        }
    }

    fn ensure_config(&mut self) {
        if self.config.is_some() {
            return;
        }
        let Some(seed) = &self.seed else {
            return;
        };

        match SeedConfig::load(&self.settings.seed_dir(seed)) {
            Ok(config) => {
                info!(seed = %seed, "seed config loaded");
                self.config = Some(config);
            }
            Err(err) => info!(%err, "seed config not available yet"),
        }
    }

    fn enter_area(&mut self, area: &str) {
        match find_region(area) {
            Some(region) => self.report_location(region),
            None => debug!(area, "area is not a check"),
        }
    }

    fn report_location(&mut self, location: &Location) {
        self.report(&location.check_id(), &location.check_name());
    }

    fn report(&mut self, id: &CheckId, name: &str) {
        if let Err(err) = self.send_check(id, name) {
            warn!(check = %id, %err, "failed to send check");
        }
    }

    fn reset(&mut self) {
        self.save_file = None;
        self.seed = None;
        self.config = None;
        self.player_loaded = false;
        self.completed.clear();
        self.last_known_level = 0;
        self.ticks = 0;
    }
}
