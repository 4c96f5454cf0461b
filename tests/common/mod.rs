//! Shared test harness: an in-memory `RegisterIo` double, used by
//! the integration tests alongside a `FakeClock` for deterministic
//! throttle/cache-window assertions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use d3net_gateway::io::{RegisterIo, RegisterKind};
use d3net_gateway::{GatewayError, Result};

/// An in-memory stand-in for the indoor-bus adapter: separate input and
/// holding word tables keyed by address, with optional failure
/// injection for exercising transport-error propagation.
#[derive(Default)]
pub struct SimulatedBus {
    input: HashMap<u16, u16>,
    holding: HashMap<u16, u16>,
    skip_ok_reads: usize,
    fail_reads_remaining: usize,
    fail_writes_remaining: usize,
    pub read_log: Vec<(RegisterKind, u16, u16)>,
    pub write_log: Vec<(u16, Vec<u16>)>,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_input(&mut self, addr: u16, words: &[u16]) {
        for (i, w) in words.iter().enumerate() {
            self.input.insert(addr + i as u16, *w);
        }
    }

    pub fn set_holding(&mut self, addr: u16, words: &[u16]) {
        for (i, w) in words.iter().enumerate() {
            self.holding.insert(addr + i as u16, *w);
        }
    }

    pub fn holding_words(&self, addr: u16, count: u16) -> Vec<u16> {
        (0..count)
            .map(|i| *self.holding.get(&(addr + i)).unwrap_or(&0))
            .collect()
    }

    /// The next `n` read calls fail with `Timeout` instead of touching
    /// the backing tables.
    pub fn fail_next_reads(&mut self, n: usize) {
        self.fail_reads_remaining = n;
    }

    /// Let the next `skip` read calls succeed normally, then fail the
    /// `count` calls after that. Useful for letting an initial
    /// system-status read through before failing the per-unit
    /// capability/status reads that follow it.
    pub fn fail_reads_after(&mut self, skip: usize, count: usize) {
        self.skip_ok_reads = skip;
        self.fail_reads_remaining = count;
    }

    pub fn fail_next_writes(&mut self, n: usize) {
        self.fail_writes_remaining = n;
    }
}

impl RegisterIo for SimulatedBus {
    fn read_registers(&mut self, kind: RegisterKind, addr: u16, count: u16) -> Result<Vec<u16>> {
        self.read_log.push((kind, addr, count));
        if self.skip_ok_reads > 0 {
            self.skip_ok_reads -= 1;
        } else if self.fail_reads_remaining > 0 {
            self.fail_reads_remaining -= 1;
            return Err(GatewayError::Timeout {
                expected: count as usize,
            });
        }
        let table = match kind {
            RegisterKind::Input => &self.input,
            RegisterKind::Holding => &self.holding,
        };
        Ok((0..count).map(|i| *table.get(&(addr + i)).unwrap_or(&0)).collect())
    }

    fn write_registers(&mut self, addr: u16, words: &[u16]) -> Result<()> {
        self.write_log.push((addr, words.to_vec()));
        if self.fail_writes_remaining > 0 {
            self.fail_writes_remaining -= 1;
            return Err(GatewayError::Timeout { expected: words.len() });
        }
        for (i, w) in words.iter().enumerate() {
            self.holding.insert(addr + i as u16, *w);
        }
        Ok(())
    }
}

/// Populate a fully-healthy single-unit bus: unit 0 connected, not
/// errored, default capability/status/holding.
pub fn single_unit_bus() -> SimulatedBus {
    let mut bus = SimulatedBus::new();
    bus.set_input(0, &[0x0001, 1, 0, 0, 0, 0, 0, 0, 0]);
    bus.set_input(1000, &[0, 0, 0]);
    bus.set_input(2000, &[0, 0, 0, 0, 0, 0]);
    bus.set_holding(2000, &[0, 0, 0]);
    bus
}

/// A `SimulatedBus` behind a shared handle, so a test can keep asserting
/// on `read_log`/`write_log` after handing ownership of the bus to a
/// `Gateway` (which otherwise takes its `RegisterIo` by value) — the same
/// pattern `gateway::tests::filter_reset_issues_two_writes` uses with its
/// own `Recording` wrapper, generalised here since more than one
/// integration test needs it.
#[derive(Clone)]
pub struct SharedBus(pub Arc<StdMutex<SimulatedBus>>);

impl SharedBus {
    pub fn new(bus: SimulatedBus) -> Self {
        Self(Arc::new(StdMutex::new(bus)))
    }

    pub fn read_log_len(&self) -> usize {
        self.0.lock().unwrap().read_log.len()
    }

    pub fn write_log_len(&self) -> usize {
        self.0.lock().unwrap().write_log.len()
    }
}

impl RegisterIo for SharedBus {
    fn read_registers(&mut self, kind: RegisterKind, addr: u16, count: u16) -> Result<Vec<u16>> {
        self.0.lock().unwrap().read_registers(kind, addr, count)
    }

    fn write_registers(&mut self, addr: u16, words: &[u16]) -> Result<()> {
        self.0.lock().unwrap().write_registers(addr, words)
    }
}
