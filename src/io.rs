//! Register I/O interface — the polymorphic boundary
//! between the gateway and a concrete transport: a small set of
//! methods implemented once for the real transport and once for an
//! in-memory test double, with the gateway generic over the trait
//! rather than tied to either.

use crate::error::Result;

/// Which Modbus register table a read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterKind {
    /// Function 04 — read-only register table.
    Input,
    /// Function 03 — read/write register table (read half).
    Holding,
}

/// Register-level I/O, independent of whether the concrete
/// implementation speaks RTU, TCP, or nothing at all (an in-memory
/// simulator).
pub trait RegisterIo {
    /// Read `count` consecutive 16-bit registers of `kind` starting at
    /// `addr`.
    fn read_registers(&mut self, kind: RegisterKind, addr: u16, count: u16) -> Result<Vec<u16>>;

    /// Write `words` (whose length is the count) starting at `addr` to
    /// the holding table (function 10).
    fn write_registers(&mut self, addr: u16, words: &[u16]) -> Result<()>;
}
