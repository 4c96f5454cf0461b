//! The gateway state machine: discovery, periodic polling,
//! per-operation throttling, post-write read suppression, holding-shadow
//! coherence, and the prepare/commit write protocol.
//!
//! `Gateway` is a single owner of mutable state, generic over the I/O
//! boundary (`RegisterIo`), with one entry point per operator verb.
//! It is meant to be shared across threads, so the state lives behind
//! a `parking_lot::Mutex` acquired for the duration of each logical
//! operation rather than an `&mut self` borrow.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::clock::Clock;
use crate::config::{GatewayConfig, RtuConfig};
use crate::error::{GatewayError, Result};
use crate::io::{RegisterIo, RegisterKind};
use crate::log_event::{LogEvent, LogSink, NullSink};
use crate::registers::{
    holding_sync_from_status, SystemStatusView, UnitCapabilityView, UnitErrorView, UnitHoldingView, UnitStatusView,
    FAN_CONTROL_ENABLE,
};
use crate::units::{FanDirection, FanSpeed, OperatingMode, Unit, UnitId};

const UNIT_COUNT: usize = 64;

const SYSTEM_STATUS_ADDR: u16 = 0;
const SYSTEM_STATUS_LEN: u16 = 9;
const CAPABILITY_BASE: u16 = 1000;
const CAPABILITY_LEN: u16 = 3;
const STATUS_BASE: u16 = 2000;
const STATUS_LEN: u16 = 6;
const HOLDING_BASE: u16 = 2000;
const HOLDING_LEN: u16 = 3;
const ERROR_BASE: u16 = 3600;
const ERROR_LEN: u16 = 2;

/// Bounded wait for read-only operations.
pub const READ_LOCK_TIMEOUT: Duration = Duration::from_secs(2);
/// Bounded wait for write-capable operations.
pub const WRITE_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

fn holding_addr(index: u8) -> u16 {
    HOLDING_BASE + HOLDING_LEN * index as u16
}
fn status_addr(index: u8) -> u16 {
    STATUS_BASE + STATUS_LEN * index as u16
}
fn capability_addr(index: u8) -> u16 {
    CAPABILITY_BASE + CAPABILITY_LEN * index as u16
}
fn error_addr(index: u8) -> u16 {
    ERROR_BASE + ERROR_LEN * index as u16
}

fn words_to_array<const N: usize>(words: Vec<u16>) -> [u16; N] {
    let mut out = [0u16; N];
    let n = N.min(words.len());
    out[..n].copy_from_slice(&words[..n]);
    out
}

/// Result of a discovery cycle.
#[derive(Debug, Clone)]
pub struct DiscoverReport {
    pub present_count: usize,
    pub units: Vec<DiscoveredUnit>,
}

#[derive(Debug, Clone, Copy)]
pub struct DiscoveredUnit {
    pub index: u8,
    pub id: UnitId,
    pub present: bool,
}

/// A present unit's live status, the shape returned to the host
/// surface when listing units.
#[derive(Debug, Clone, Copy)]
pub struct UnitSnapshot {
    pub index: u8,
    pub id: UnitId,
    pub power: bool,
    pub mode: OperatingMode,
    pub current_mode: OperatingMode,
    pub setpoint_celsius: f32,
    pub current_temperature_celsius: f32,
    pub fan_speed: FanSpeed,
    pub fan_direction: FanDirection,
    pub filter_warning: bool,
}

struct GatewayState<IO> {
    io: IO,
    system_status: SystemStatusView,
    units: [Unit; UNIT_COUNT],
    last_op_ms: Option<u64>,
    /// The RTU line settings a host collaborator has pushed through
    /// [`Gateway::configure`]. Stored, not applied — per spec, changes
    /// take effect only when the host reconstructs the transport on
    /// restart, so the gateway's only job is to hold the latest value
    /// for [`Gateway::rtu_config`] to read back.
    rtu_config: RtuConfig,
}

impl<IO> GatewayState<IO> {
    fn new(io: IO) -> Self {
        Self {
            io,
            system_status: SystemStatusView::default(),
            units: std::array::from_fn(|i| Unit::new(i as u8)),
            last_op_ms: None,
            rtu_config: RtuConfig::default(),
        }
    }
}

/// The gateway: discovery, polling, and the prepare/commit write
/// protocol, generic over a concrete [`RegisterIo`] transport and a
/// [`LogSink`] for structured events.
///
/// One `Gateway` owns one adapter link. `index` arguments throughout
/// are unit indices in `[0, 64)`; an out-of-range index is
/// `GatewayError::InvalidArgument`, and an in-range but not-yet-present
/// unit is `GatewayError::NotFound`.
pub struct Gateway<IO: RegisterIo + Send, L: LogSink = NullSink> {
    state: Mutex<GatewayState<IO>>,
    clock: Arc<dyn Clock>,
    log: L,
    config: GatewayConfig,
}

impl<IO: RegisterIo + Send> Gateway<IO, NullSink> {
    /// Construct a gateway that drops structured log events. See
    /// [`Gateway::with_log`] to plumb them somewhere.
    pub fn new(io: IO, config: GatewayConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(GatewayState::new(io)),
            clock,
            log: NullSink,
            config,
        }
    }
}

impl<IO: RegisterIo + Send, L: LogSink> Gateway<IO, L> {
    pub fn with_log(io: IO, config: GatewayConfig, clock: Arc<dyn Clock>, log: L) -> Self {
        Self {
            state: Mutex::new(GatewayState::new(io)),
            clock,
            log,
            config,
        }
    }

    fn check_index(index: u8) -> Result<()> {
        if index as usize >= UNIT_COUNT {
            return Err(GatewayError::InvalidArgument(format!(
                "unit index {index} out of range [0, {UNIT_COUNT})"
            )));
        }
        Ok(())
    }

    fn lock(&self, timeout: Duration) -> Result<parking_lot::MutexGuard<'_, GatewayState<IO>>> {
        self.state.try_lock_for(timeout).ok_or_else(|| {
            GatewayError::InvalidState("gateway exclusive lock busy".into())
        })
    }

    /// Throttled read: sleeps out the remainder of
    /// `throttle_ms` since the last transport operation, performs the
    /// read, then stamps `last_op_ms`.
    fn throttled_read(
        &self,
        state: &mut GatewayState<IO>,
        kind: RegisterKind,
        addr: u16,
        count: u16,
    ) -> Result<Vec<u16>> {
        self.throttle(state);
        let result = state.io.read_registers(kind, addr, count);
        state.last_op_ms = Some(self.clock.now_ms());
        if let Err(GatewayError::Timeout { .. }) = &result {
            self.log.emit(LogEvent::TransportTimeout { addr });
        }
        result
    }

    /// Throttled write-multiple (function 10, always targets holding).
    fn throttled_write(&self, state: &mut GatewayState<IO>, addr: u16, words: &[u16]) -> Result<()> {
        self.throttle(state);
        let result = state.io.write_registers(addr, words);
        state.last_op_ms = Some(self.clock.now_ms());
        if let Err(GatewayError::Timeout { .. }) = &result {
            self.log.emit(LogEvent::TransportTimeout { addr });
        }
        result
    }

    fn throttle(&self, state: &mut GatewayState<IO>) {
        let Some(last) = state.last_op_ms else {
            return;
        };
        let now = self.clock.now_ms();
        let elapsed = now.saturating_sub(last);
        let throttle_ms = self.config.throttle_ms;
        if elapsed < throttle_ms {
            std::thread::sleep(Duration::from_millis(throttle_ms - elapsed));
        }
    }

    // ---- 4.D.2 Discovery ------------------------------------------------

    /// Reset every unit record and re-run discovery.
    /// Returns success iff the initial system-status read succeeded;
    /// per-unit capability/status read failures leave that unit absent
    /// without aborting the cycle.
    pub fn discover(&self) -> Result<DiscoverReport> {
        let mut state = self.lock(WRITE_LOCK_TIMEOUT)?;
        state.units = std::array::from_fn(|i| Unit::new(i as u8));

        let words = self.throttled_read(&mut state, RegisterKind::Input, SYSTEM_STATUS_ADDR, SYSTEM_STATUS_LEN)?;
        state.system_status = SystemStatusView(words_to_array(words));

        let mut units = Vec::with_capacity(UNIT_COUNT);
        for i in 0u8..UNIT_COUNT as u8 {
            let connected = state.system_status.unit_connected(i);
            let errored = state.system_status.unit_error(i);
            let present = if connected && !errored {
                self.try_enroll_unit(&mut state, i)
            } else {
                false
            };
            state.units[i as usize].present = present;
            units.push(DiscoveredUnit {
                index: i,
                id: state.units[i as usize].id,
                present,
            });
        }

        let present_count = units.iter().filter(|u| u.present).count();
        self.log.emit(LogEvent::DiscoverComplete { present: present_count });
        Ok(DiscoverReport { present_count, units })
    }

    /// Attempt to read capability + status for unit `i`; both must
    /// succeed for the unit to be enrolled.
    fn try_enroll_unit(&self, state: &mut GatewayState<IO>, i: u8) -> bool {
        let capability = self.throttled_read(state, RegisterKind::Input, capability_addr(i), CAPABILITY_LEN);
        let status = self.throttled_read(state, RegisterKind::Input, status_addr(i), STATUS_LEN);
        match (capability, status) {
            (Ok(cap), Ok(st)) => {
                state.units[i as usize].capability = UnitCapabilityView(words_to_array(cap));
                state.units[i as usize].status = UnitStatusView(words_to_array(st));
                true
            }
            _ => false,
        }
    }

    /// Number of present units after the last discovery cycle.
    pub fn discovered_count(&self) -> Result<usize> {
        let state = self.lock(READ_LOCK_TIMEOUT)?;
        Ok(state.units.iter().filter(|u| u.present).count())
    }

    // ---- 4.D.3 Poll -------------------------------------------------

    /// One poll sweep: refresh live status for every
    /// present unit, skipping any unit that committed a write within
    /// `cache_write_s` (post-write suppression). Per-unit failures are
    /// logged and do not abort the sweep.
    pub fn poll_once(&self) -> Result<()> {
        let mut state = self.lock(READ_LOCK_TIMEOUT)?;
        let now = self.clock.now_ms();
        let cache_write_s = self.config.cache_write_s;

        let present: Vec<u8> = state
            .units
            .iter()
            .filter(|u| u.present)
            .map(|u| u.index())
            .collect();

        for i in present {
            if state.units[i as usize].holding.write_within(now, cache_write_s) {
                continue;
            }
            match self.throttled_read(&mut state, RegisterKind::Input, status_addr(i), STATUS_LEN) {
                Ok(words) => {
                    state.units[i as usize].status = UnitStatusView(words_to_array(words));
                }
                Err(err) => {
                    self.log.emit(LogEvent::poll_error(i, &err));
                }
            }
        }
        Ok(())
    }

    // ---- 4.D.4 Error read (lazy) -------------------------------------

    /// Lazily-cached error read: a no-op if the cached
    /// value is still within `cache_error_s`.
    pub fn read_error(&self, index: u8) -> Result<UnitErrorView> {
        Self::check_index(index)?;
        let mut state = self.lock(READ_LOCK_TIMEOUT)?;
        if !state.units[index as usize].present {
            return Err(GatewayError::NotFound(index));
        }
        let now = self.clock.now_ms();
        let cache_error_s = self.config.cache_error_s;
        let cached = state.units[index as usize]
            .last_error_read_ms
            .is_some_and(|t| now.saturating_sub(t) < cache_error_s * 1000);
        if !cached {
            let words = self.throttled_read(&mut state, RegisterKind::Input, error_addr(index), ERROR_LEN)?;
            state.units[index as usize].error = UnitErrorView(words_to_array(words));
            state.units[index as usize].last_error_read_ms = Some(now);
        }
        Ok(state.units[index as usize].error)
    }

    // ---- 4.D.5 Prepare / commit --------------------------------------

    /// Refresh the holding shadow if it is stale, then reconcile it
    /// against the most recently observed live status.
    /// May perform up to two I/O operations: the reload read, and an
    /// immediate flush if reconciliation produced a dirty shadow.
    fn prepare_write(&self, state: &mut GatewayState<IO>, index: u8) -> Result<()> {
        let now = self.clock.now_ms();
        let cache_write_s = self.config.cache_write_s;
        let shadow = &state.units[index as usize].holding;
        let needs_reload = shadow.last_read_ms.is_none()
            || (!shadow.dirty
                && !shadow.read_within(now, cache_write_s)
                && !shadow.write_within(now, cache_write_s));

        if needs_reload {
            let words = self.throttled_read(state, RegisterKind::Holding, holding_addr(index), HOLDING_LEN)?;
            let shadow = &mut state.units[index as usize].holding;
            shadow.view.0 = words_to_array(words);
            shadow.last_read_ms = Some(now);
        }

        self.reconcile_holding(state, index);

        let shadow = &state.units[index as usize].holding;
        if shadow.dirty {
            self.flush_holding(state, index)?;
        }
        Ok(())
    }

    /// Fold the status-derived power/fan/mode/setpoint values into the
    /// holding shadow, OR-setting
    /// `dirty` only on an actual change. Never touches filter-reset or
    /// fan-control-enable — those are the caller's concern,
    /// see `post_sync` on [`Self::commit_write`].
    fn reconcile_holding(&self, state: &mut GatewayState<IO>, index: u8) {
        let unit = &mut state.units[index as usize];
        let mut dirty = unit.holding.dirty;
        holding_sync_from_status(&mut unit.holding.view, &unit.status, &mut dirty);
        unit.holding.dirty = dirty;
    }

    fn flush_holding(&self, state: &mut GatewayState<IO>, index: u8) -> Result<()> {
        let now = self.clock.now_ms();
        let words = state.units[index as usize].holding.view.0;
        self.throttled_write(state, holding_addr(index), &words)?;
        let shadow = &mut state.units[index as usize].holding;
        shadow.last_write_ms = Some(now);
        shadow.dirty = false;
        Ok(())
    }

    /// Commit a staged change to the adapter: reconcile
    /// once more against status, run `post_sync` (the only place a
    /// caller may assert fan-control-enable — see [`Self::set_fan_speed`]),
    /// flush if dirty, then pulse down a
    /// pending filter-reset with a second write.
    fn commit_write(
        &self,
        state: &mut GatewayState<IO>,
        index: u8,
        post_sync: impl FnOnce(&mut UnitHoldingView, &mut bool),
    ) -> Result<()> {
        self.reconcile_holding(state, index);
        let unit = &mut state.units[index as usize];
        let mut dirty = unit.holding.dirty;
        post_sync(&mut unit.holding.view, &mut dirty);
        unit.holding.dirty = dirty;

        if state.units[index as usize].holding.dirty {
            self.flush_holding(state, index)?;
        }
        if state.units[index as usize].holding.view.filter_reset() {
            let mut dirty = false;
            state.units[index as usize].holding.view.set_filter_reset(false, &mut dirty);
            if dirty {
                state.units[index as usize].holding.dirty = true;
                self.flush_holding(state, index)?;
            }
        }
        self.log.emit(LogEvent::WriteComplete { unit: index });
        Ok(())
    }

    /// Run one operator verb under the exclusive lock: validate the
    /// index is present, prepare, mutate the status view via `mutate`,
    /// commit. `post_sync` runs after the status->holding
    /// reconciliation inside commit, for verbs that need to touch a
    /// holding-only field `holding_sync_from_status` itself must not
    /// (fan-control-enable).
    fn operate(
        &self,
        index: u8,
        mutate: impl FnOnce(&mut UnitStatusView),
        post_sync: impl FnOnce(&mut UnitHoldingView, &mut bool),
    ) -> Result<()> {
        Self::check_index(index)?;
        let mut state = self.lock(WRITE_LOCK_TIMEOUT)?;
        if !state.units[index as usize].present {
            return Err(GatewayError::NotFound(index));
        }
        self.prepare_write(&mut state, index)?;
        mutate(&mut state.units[index as usize].status);
        self.commit_write(&mut state, index, post_sync)
    }

    // ---- 4.D.6 Operator API -------------------------------------------

    pub fn set_power(&self, index: u8, on: bool) -> Result<()> {
        self.operate(index, |status| status.set_power(on), |_, _| {})
    }

    /// Setting mode additionally forces power on.
    pub fn set_mode(&self, index: u8, mode: OperatingMode) -> Result<()> {
        self.operate(
            index,
            |status| {
                status.set_mode(mode);
                status.set_power(true);
            },
            |_, _| {},
        )
    }

    pub fn set_setpoint(&self, index: u8, celsius: f32) -> Result<()> {
        self.operate(index, |status| status.set_setpoint_celsius(celsius), |_, _| {})
    }

    /// Hardware requires fan-control-enable (value 6) asserted for a
    /// fan-speed write to take effect. `holding_sync_from_status`
    /// deliberately never sets it, so this operator verb
    /// asserts it itself as the commit's `post_sync` step.
    pub fn set_fan_speed(&self, index: u8, speed: FanSpeed) -> Result<()> {
        self.operate(
            index,
            |status| status.set_fan_speed(speed),
            |holding, dirty| holding.set_fan_control_enable_raw(FAN_CONTROL_ENABLE, dirty),
        )
    }

    /// See [`Self::set_fan_speed`] for why `post_sync` asserts
    /// fan-control-enable here too.
    pub fn set_fan_dir(&self, index: u8, dir: FanDirection) -> Result<()> {
        self.operate(
            index,
            |status| status.set_fan_direction(dir),
            |holding, dirty| holding.set_fan_control_enable_raw(FAN_CONTROL_ENABLE, dirty),
        )
    }

    /// Stage and flush a filter-reset pulse: the
    /// field lives only on the holding shadow, so this bypasses the
    /// status-mutation step the other verbs use.
    pub fn filter_reset(&self, index: u8) -> Result<()> {
        Self::check_index(index)?;
        let mut state = self.lock(WRITE_LOCK_TIMEOUT)?;
        if !state.units[index as usize].present {
            return Err(GatewayError::NotFound(index));
        }
        self.prepare_write(&mut state, index)?;
        let mut dirty = false;
        state.units[index as usize].holding.view.set_filter_reset(true, &mut dirty);
        state.units[index as usize].holding.dirty |= dirty;
        self.commit_write(&mut state, index, |_, _| {})
    }

    // ---- 4.6 Host-facing read surface ----------------------------------

    /// Live status of every present unit.
    pub fn list_units(&self) -> Result<Vec<UnitSnapshot>> {
        let state = self.lock(READ_LOCK_TIMEOUT)?;
        Ok(state
            .units
            .iter()
            .filter(|u| u.present)
            .map(|u| UnitSnapshot {
                index: u.index(),
                id: u.id,
                power: u.status.power(),
                mode: u.status.commanded_mode(),
                current_mode: u.status.current_mode(),
                setpoint_celsius: u.status.setpoint_celsius(),
                current_temperature_celsius: u.status.current_temperature_celsius(),
                fan_speed: u.status.fan_speed(),
                fan_direction: u.status.fan_direction(),
                filter_warning: u.status.filter_warning(),
            })
            .collect())
    }

    /// Capability flags and setpoint bounds for a present unit.
    pub fn capability(&self, index: u8) -> Result<UnitCapabilityView> {
        Self::check_index(index)?;
        let state = self.lock(READ_LOCK_TIMEOUT)?;
        if !state.units[index as usize].present {
            return Err(GatewayError::NotFound(index));
        }
        Ok(state.units[index as usize].capability)
    }

    /// Store RTU line settings pushed by a host collaborator. Per spec
    /// these take effect only on restart — this does not touch the live
    /// transport, it only updates the value [`Self::rtu_config`] reads
    /// back so the host can persist it and reconstruct the transport
    /// with it next time.
    pub fn configure(&self, rtu: RtuConfig) -> Result<()> {
        let mut state = self.lock(WRITE_LOCK_TIMEOUT)?;
        state.rtu_config = rtu;
        Ok(())
    }

    /// The RTU line settings last pushed via [`Self::configure`] (or the
    /// default, if `configure` was never called).
    pub fn rtu_config(&self) -> Result<RtuConfig> {
        let state = self.lock(READ_LOCK_TIMEOUT)?;
        Ok(state.rtu_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;
    use crate::log_event::NullSink;
    use std::sync::{Arc, Mutex as StdMutex};

    /// An in-memory adapter double: holding/input word tables keyed by
    /// address, with per-call failure injection. Lives here (not
    /// `tests/common`) because `RegisterIo` is a public trait and this
    /// keeps the gateway's own unit tests self-contained; `tests/common`
    /// has a richer version for cross-module integration tests.
    #[derive(Default)]
    struct MemoryIo {
        input: std::collections::HashMap<u16, u16>,
        holding: std::collections::HashMap<u16, u16>,
        fail_next_reads: usize,
    }

    impl MemoryIo {
        fn set_input(&mut self, addr: u16, words: &[u16]) {
            for (i, w) in words.iter().enumerate() {
                self.input.insert(addr + i as u16, *w);
            }
        }
        fn set_holding(&mut self, addr: u16, words: &[u16]) {
            for (i, w) in words.iter().enumerate() {
                self.holding.insert(addr + i as u16, *w);
            }
        }
        fn holding_words(&self, addr: u16, count: u16) -> Vec<u16> {
            (0..count).map(|i| *self.holding.get(&(addr + i)).unwrap_or(&0)).collect()
        }
    }

    impl RegisterIo for MemoryIo {
        fn read_registers(&mut self, kind: RegisterKind, addr: u16, count: u16) -> Result<Vec<u16>> {
            if self.fail_next_reads > 0 {
                self.fail_next_reads -= 1;
                return Err(GatewayError::Timeout { expected: count as usize });
            }
            let table = match kind {
                RegisterKind::Input => &self.input,
                RegisterKind::Holding => &self.holding,
            };
            Ok((0..count).map(|i| *table.get(&(addr + i)).unwrap_or(&0)).collect())
        }

        fn write_registers(&mut self, addr: u16, words: &[u16]) -> Result<()> {
            for (i, w) in words.iter().enumerate() {
                self.holding.insert(addr + i as u16, *w);
            }
            Ok(())
        }
    }

    fn no_throttle_config() -> GatewayConfig {
        GatewayConfig {
            poll_interval_s: 10,
            throttle_ms: 0,
            cache_write_s: 35,
            cache_error_s: 10,
        }
    }

    fn gw(io: MemoryIo, clock: Arc<dyn Clock>) -> Gateway<MemoryIo, NullSink> {
        Gateway::new(io, no_throttle_config(), clock)
    }

    #[test]
    fn scenario_s1_error_flag_blocks_enrollment() {
        let mut io = MemoryIo::default();
        io.set_input(0, &[0x0003, 0x0001, 0, 0, 0, 0x0001, 0, 0, 0]);
        let clock = crate::clock::FakeClock::new(0);
        let gateway = gw(io, clock);

        let report = gateway.discover().unwrap();
        assert_eq!(report.present_count, 0);
    }

    #[test]
    fn discovery_gating_requires_both_reads_to_succeed() {
        let mut io = MemoryIo::default();
        // unit 0 connected (bit 16, word index 1), not errored
        io.set_input(0, &[0x0001, 1, 0, 0, 0, 0, 0, 0, 0]);
        io.set_input(1000, &[0, 0, 0]); // capability
        io.set_input(2000, &[1, 0, 0, 0, 0, 0]); // status
        let clock = crate::clock::FakeClock::new(0);
        let gateway = gw(io, clock);

        let report = gateway.discover().unwrap();
        assert_eq!(report.present_count, 1);
        assert!(report.units[0].present);
        assert_eq!(report.units[0].id.to_string(), "1-00");
    }

    #[test]
    fn throttle_enforces_minimum_gap() {
        let mut io = MemoryIo::default();
        io.set_input(0, &[1, 1, 0, 0, 0, 0, 0, 0, 0]);
        let clock = crate::clock::FakeClock::new(0);
        let config = GatewayConfig {
            throttle_ms: 25,
            ..no_throttle_config()
        };
        let gateway = Gateway::new(io, config, clock.clone());

        let before = std::time::Instant::now();
        gateway.discover().unwrap();
        // second discover should sleep out the throttle window on its
        // first transport op since last_op_ms was just stamped.
        gateway.discover().unwrap();
        assert!(before.elapsed() >= Duration::from_millis(25));
    }

    #[test]
    fn post_write_suppression_skips_poll_read() {
        let mut io = MemoryIo::default();
        io.set_input(0, &[1, 1, 0, 0, 0, 0, 0, 0, 0]);
        io.set_input(1000, &[0, 0, 0]);
        io.set_input(2000, &[0, 0, 0, 0, 0, 0]);
        io.set_holding(2000, &[0, 0, 0]);
        let clock = crate::clock::FakeClock::new(0);
        let config = GatewayConfig {
            cache_write_s: 35,
            ..no_throttle_config()
        };
        let gateway = Gateway::new(io, config, clock.clone());
        gateway.discover().unwrap();

        gateway.set_power(0, true).unwrap();

        // flip the backing input table so a real poll would observe a
        // change, then poll immediately: suppression should skip it.
        let mut changed = UnitStatusView::default();
        changed.set_fan_speed(FanSpeed::Low);
        {
            let mut state = gateway.state.lock();
            state.io.set_input(2000, &changed.0);
        }
        gateway.poll_once().unwrap();
        let snapshot = gateway.list_units().unwrap();
        // power was forced true by set_power itself; fan speed should
        // still be the pre-poll value since the read was suppressed.
        assert!(snapshot[0].power);
        assert_eq!(snapshot[0].fan_speed, FanSpeed::Auto);

        clock.advance(36_000);
        gateway.poll_once().unwrap();
        let snapshot = gateway.list_units().unwrap();
        assert_eq!(snapshot[0].fan_speed, FanSpeed::Low);
    }

    #[test]
    fn set_setpoint_reloads_then_writes_once() {
        let mut io = MemoryIo::default();
        io.set_input(0, &[1, 1, 0, 0, 0, 0, 0, 0, 0]);
        io.set_input(1000, &[0, 0, 0]);
        io.set_input(2000, &[0, 0, 0, 0, 0, 0]);
        io.set_holding(2000, &[0, 0, 0]);
        let clock = crate::clock::FakeClock::new(0);
        let gateway = gw(io, clock);
        gateway.discover().unwrap();

        gateway.set_setpoint(0, 23.5).unwrap();

        let state = gateway.state.lock();
        let words = state.io.holding_words(2000, 3);
        drop(state);
        let view = crate::registers::UnitHoldingView(words_to_array(words));
        assert_eq!(view.setpoint_celsius(), 23.5);
    }

    #[test]
    fn filter_reset_issues_two_writes() {
        let mut io = MemoryIo::default();
        io.set_input(0, &[1, 1, 0, 0, 0, 0, 0, 0, 0]);
        io.set_input(1000, &[0, 0, 0]);
        io.set_input(2000, &[0, 0, 0, 0, 0, 0]);
        io.set_holding(2000, &[0, 0, 0]);
        let writes = Arc::new(StdMutex::new(Vec::<[u16; 3]>::new()));

        struct Recording {
            inner: MemoryIo,
            writes: Arc<StdMutex<Vec<[u16; 3]>>>,
        }
        impl RegisterIo for Recording {
            fn read_registers(&mut self, kind: RegisterKind, addr: u16, count: u16) -> Result<Vec<u16>> {
                self.inner.read_registers(kind, addr, count)
            }
            fn write_registers(&mut self, addr: u16, words: &[u16]) -> Result<()> {
                self.writes.lock().unwrap().push([words[0], words[1], words[2]]);
                self.inner.write_registers(addr, words)
            }
        }

        let io = Recording { inner: io, writes: writes.clone() };
        let clock = crate::clock::FakeClock::new(0);
        let gateway = Gateway::new(io, no_throttle_config(), clock);
        gateway.discover().unwrap();
        gateway.filter_reset(0).unwrap();

        let recorded = writes.lock().unwrap();
        assert_eq!(recorded.len(), 2);
        let first = crate::registers::UnitHoldingView(recorded[0]);
        let second = crate::registers::UnitHoldingView(recorded[1]);
        assert!(first.filter_reset());
        assert!(!second.filter_reset());
    }

    #[test]
    fn not_found_for_absent_unit() {
        let io = MemoryIo::default();
        let clock = crate::clock::FakeClock::new(0);
        let gateway = gw(io, clock);
        let err = gateway.set_power(5, true).unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(5)));
    }

    #[test]
    fn invalid_argument_for_out_of_range_index() {
        let io = MemoryIo::default();
        let clock = crate::clock::FakeClock::new(0);
        let gateway = gw(io, clock);
        let err = gateway.set_power(64, true).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidArgument(_)));
    }

    #[test]
    fn error_read_is_cached() {
        let mut io = MemoryIo::default();
        io.set_input(0, &[1, 1, 0, 0, 0, 0, 0, 0, 0]);
        io.set_input(1000, &[0, 0, 0]);
        io.set_input(2000, &[0, 0, 0, 0, 0, 0]);
        io.set_input(3600, &[0x4131, 0x0500]);
        let clock = crate::clock::FakeClock::new(0);
        let config = GatewayConfig {
            cache_error_s: 10,
            ..no_throttle_config()
        };
        let gateway = Gateway::new(io, config, clock.clone());
        gateway.discover().unwrap();

        let first = gateway.read_error(0).unwrap();
        assert_eq!(first.code(), [b'A', b'1']);

        {
            let mut state = gateway.state.lock();
            state.io.set_input(3600, &[0x4232, 0x0000]);
        }
        let cached = gateway.read_error(0).unwrap();
        assert_eq!(cached.code(), [b'A', b'1'], "cached read must not re-hit the transport");

        clock.advance(11_000);
        let refreshed = gateway.read_error(0).unwrap();
        assert_eq!(refreshed.code(), [b'B', b'2']);
    }

    #[test]
    fn configure_stores_rtu_settings_read_back_unchanged() {
        let io = MemoryIo::default();
        let clock = crate::clock::FakeClock::new(0);
        let gateway = gw(io, clock);

        assert_eq!(gateway.rtu_config().unwrap(), crate::config::RtuConfig::default());

        let pushed = crate::config::RtuConfig {
            baud: 19200,
            parity: crate::config::Parity::Even,
            slave_id: 3,
            ..Default::default()
        };
        gateway.configure(pushed).unwrap();
        assert_eq!(gateway.rtu_config().unwrap(), pushed);
    }
}
