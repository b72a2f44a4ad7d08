//! In-process fakes for the host contracts.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use soul_core::{
    CurrencyLedger, HealthAttribute, InventorySnapshot, ItemStack, PlayerId, SimpleHealth,
    SoulConfig, Timestamp, Withdrawal,
};
use soul_runtime::{
    CommandDispatcher, GameHost, InMemoryRecordRepository, Location, ManualClock, RuntimeConfig,
    SoulRuntime, Task, TaskScheduler,
};

#[derive(Default)]
struct FakePlayer {
    name: String,
    online: bool,
    permissions: HashSet<String>,
    inventory: InventorySnapshot,
    health: SimpleHealth,
}

#[derive(Default)]
struct HostState {
    players: HashMap<PlayerId, FakePlayer>,
    spawned: Vec<(Location, Vec<ItemStack>)>,
    grave_collector: bool,
}

#[derive(Default)]
pub struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an online player whose id is the lowercased name.
    pub fn join(&self, name: &str) -> PlayerId {
        let id = PlayerId::new(name.to_lowercase());
        let mut state = self.state.lock().unwrap();
        state.players.insert(
            id.clone(),
            FakePlayer {
                name: name.to_owned(),
                online: true,
                ..Default::default()
            },
        );
        id
    }

    pub fn set_online(&self, player: &PlayerId, online: bool) {
        let mut state = self.state.lock().unwrap();
        state.players.get_mut(player).unwrap().online = online;
    }

    pub fn grant(&self, player: &PlayerId, permission: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .players
            .get_mut(player)
            .unwrap()
            .permissions
            .insert(permission.to_owned());
    }

    pub fn set_inventory(&self, player: &PlayerId, inventory: InventorySnapshot) {
        let mut state = self.state.lock().unwrap();
        state.players.get_mut(player).unwrap().inventory = inventory;
    }

    pub fn inventory_of(&self, player: &PlayerId) -> InventorySnapshot {
        self.state.lock().unwrap().players[player].inventory.clone()
    }

    pub fn health_of(&self, player: &PlayerId) -> SimpleHealth {
        self.state.lock().unwrap().players[player].health.clone()
    }

    pub fn set_grave_collector(&self, present: bool) {
        self.state.lock().unwrap().grave_collector = present;
    }

    pub fn spawned(&self) -> Vec<(Location, Vec<ItemStack>)> {
        self.state.lock().unwrap().spawned.clone()
    }

    pub fn spawned_units(&self) -> usize {
        self.spawned()
            .iter()
            .flat_map(|(_, items)| items)
            .map(|stack| usize::from(stack.amount))
            .sum()
    }
}

impl GameHost for FakeHost {
    fn is_online(&self, player: &PlayerId) -> bool {
        let state = self.state.lock().unwrap();
        state.players.get(player).is_some_and(|p| p.online)
    }

    fn online_players(&self) -> Vec<PlayerId> {
        let state = self.state.lock().unwrap();
        state
            .players
            .iter()
            .filter(|(_, p)| p.online)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn player_name(&self, player: &PlayerId) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.players.get(player).map(|p| p.name.clone())
    }

    fn resolve_player(&self, name: &str) -> Option<PlayerId> {
        let state = self.state.lock().unwrap();
        state
            .players
            .iter()
            .find(|(_, p)| p.name.eq_ignore_ascii_case(name))
            .map(|(id, _)| id.clone())
    }

    fn has_permission(&self, player: &PlayerId, permission: &str) -> bool {
        let state = self.state.lock().unwrap();
        state
            .players
            .get(player)
            .is_some_and(|p| p.permissions.contains(permission))
    }

    fn inventory(&self, player: &PlayerId) -> InventorySnapshot {
        let state = self.state.lock().unwrap();
        state
            .players
            .get(player)
            .map(|p| p.inventory.clone())
            .unwrap_or_default()
    }

    fn clear_inventory(&self, player: &PlayerId) {
        let mut state = self.state.lock().unwrap();
        if let Some(p) = state.players.get_mut(player) {
            p.inventory = InventorySnapshot::empty();
        }
    }

    fn restore_inventory(&self, player: &PlayerId, inventory: &InventorySnapshot) {
        let mut state = self.state.lock().unwrap();
        let Some(p) = state.players.get_mut(player) else {
            return;
        };
        for (slot, stack) in inventory.storage.iter().enumerate() {
            if stack.is_some() {
                p.inventory.storage[slot] = stack.clone();
            }
        }
        for (slot, stack) in inventory.armor.iter().enumerate() {
            if stack.is_some() {
                p.inventory.armor[slot] = stack.clone();
            }
        }
        if inventory.offhand.is_some() {
            p.inventory.offhand = inventory.offhand.clone();
        }
    }

    fn spawn_items(&self, location: &Location, items: &[ItemStack]) {
        let mut state = self.state.lock().unwrap();
        state.spawned.push((location.clone(), items.to_vec()));
    }

    fn with_max_health(
        &self,
        player: &PlayerId,
        f: &mut dyn FnMut(&mut dyn HealthAttribute),
    ) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.players.get_mut(player) {
            Some(p) => {
                f(&mut p.health);
                true
            }
            None => false,
        }
    }

    fn grave_collector_present(&self) -> bool {
        self.state.lock().unwrap().grave_collector
    }
}

#[derive(Default)]
pub struct FakeLedger {
    balances: Mutex<HashMap<PlayerId, f64>>,
    refuse: Mutex<bool>,
}

impl FakeLedger {
    pub fn deposit(&self, player: &PlayerId, amount: f64) {
        *self
            .balances
            .lock()
            .unwrap()
            .entry(player.clone())
            .or_insert(0.0) += amount;
    }

    pub fn refuse_withdrawals(&self) {
        *self.refuse.lock().unwrap() = true;
    }
}

impl CurrencyLedger for FakeLedger {
    fn balance(&self, player: &PlayerId) -> f64 {
        self.balances
            .lock()
            .unwrap()
            .get(player)
            .copied()
            .unwrap_or(0.0)
    }

    fn withdraw(&self, player: &PlayerId, amount: f64) -> Withdrawal {
        let mut balances = self.balances.lock().unwrap();
        let balance = balances.entry(player.clone()).or_insert(0.0);
        if *self.refuse.lock().unwrap() {
            return Withdrawal::failed(*balance, "account frozen");
        }
        *balance -= amount;
        Withdrawal::ok(amount, *balance)
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    commands: Mutex<Vec<String>>,
}

impl RecordingDispatcher {
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl CommandDispatcher for RecordingDispatcher {
    fn dispatch(&self, command: &str) {
        self.commands.lock().unwrap().push(command.to_owned());
    }
}

/// Scheduler that queues tasks until the test runs them.
#[derive(Default)]
pub struct ManualScheduler {
    tasks: Mutex<Vec<(Duration, Task)>>,
}

impl ManualScheduler {
    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// Runs queued tasks (and tasks they schedule) in delay order.
    pub fn run_all(&self) {
        loop {
            let mut batch = std::mem::take(&mut *self.tasks.lock().unwrap());
            if batch.is_empty() {
                return;
            }
            batch.sort_by_key(|(delay, _)| *delay);
            for (_, task) in batch {
                task();
            }
        }
    }

    /// Runs only tasks scheduled with at most `delay`.
    pub fn run_up_to(&self, delay: Duration) {
        let due: Vec<(Duration, Task)> = {
            let mut tasks = self.tasks.lock().unwrap();
            let (due, later) = std::mem::take(&mut *tasks)
                .into_iter()
                .partition(|(d, _)| *d <= delay);
            *tasks = later;
            due
        };
        for (_, task) in due {
            task();
        }
    }
}

impl TaskScheduler for ManualScheduler {
    fn run_later(&self, delay: Duration, task: Task) {
        self.tasks.lock().unwrap().push((delay, task));
    }
}

pub struct Harness {
    pub runtime: SoulRuntime,
    pub host: Arc<FakeHost>,
    pub ledger: Arc<FakeLedger>,
    pub dispatcher: Arc<RecordingDispatcher>,
    pub scheduler: Arc<ManualScheduler>,
    pub clock: Arc<ManualClock>,
    pub repository: Arc<InMemoryRecordRepository>,
}

pub const START: Timestamp = Timestamp(1_000_000);

impl Harness {
    /// Must run inside a tokio runtime (the recovery worker is spawned).
    pub fn new(config: SoulConfig) -> Self {
        Self::with_settings(config, RuntimeConfig {
            fixed_seed: Some(7),
            ..RuntimeConfig::default()
        })
    }

    pub fn with_settings(config: SoulConfig, settings: RuntimeConfig) -> Self {
        let host = Arc::new(FakeHost::new());
        let ledger = Arc::new(FakeLedger::default());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let scheduler = Arc::new(ManualScheduler::default());
        let clock = Arc::new(ManualClock::new(START));
        let repository = Arc::new(InMemoryRecordRepository::new());

        let runtime = SoulRuntime::builder()
            .config(settings)
            .soul_config(config)
            .repository(repository.clone())
            .host(host.clone())
            .ledger(ledger.clone())
            .dispatcher(dispatcher.clone())
            .scheduler(scheduler.clone())
            .clock(clock.clone())
            .build()
            .expect("runtime builds");

        Self {
            runtime,
            host,
            ledger,
            dispatcher,
            scheduler,
            clock,
            repository,
        }
    }
}

pub fn spawn_point() -> Location {
    Location::new("world", 10.0, 64.0, -3.0)
}
