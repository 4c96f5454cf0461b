//! Modbus-RTU transport: framing, CRC-16/MODBUS, and the
//! DE/RE-controlled transceive procedure, implementing [`crate::io::RegisterIo`].

pub mod crc;
pub mod frame;
pub mod rtu;

pub use rtu::{RtuTransport, SerialPort};
