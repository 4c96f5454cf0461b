//! Modbus-RTU frame construction and parsing.

use super::crc::{append_crc, check_crc};
use crate::error::GatewayError;

pub const FN_READ_HOLDING: u8 = 0x03;
pub const FN_READ_INPUT: u8 = 0x04;
pub const FN_WRITE_MULTIPLE: u8 = 0x10;

/// Build a function 03/04 read request.
pub fn build_read_request(slave: u8, function: u8, addr: u16, count: u16) -> Vec<u8> {
    let mut frame = Vec::with_capacity(8);
    frame.push(slave);
    frame.push(function);
    frame.extend_from_slice(&addr.to_be_bytes());
    frame.extend_from_slice(&count.to_be_bytes());
    append_crc(&mut frame);
    frame
}

/// Build a function 10 write-multiple request.
pub fn build_write_request(slave: u8, addr: u16, words: &[u16]) -> Vec<u8> {
    let count = words.len() as u16;
    let byte_count = (words.len() * 2) as u8;
    let mut frame = Vec::with_capacity(9 + words.len() * 2);
    frame.push(slave);
    frame.push(FN_WRITE_MULTIPLE);
    frame.extend_from_slice(&addr.to_be_bytes());
    frame.extend_from_slice(&count.to_be_bytes());
    frame.push(byte_count);
    for w in words {
        frame.extend_from_slice(&w.to_be_bytes());
    }
    append_crc(&mut frame);
    frame
}

/// Expected reply length for a read of `count` registers: slave + fn +
/// bytecount + 2*count data bytes + 2 crc bytes.
pub fn expected_read_reply_len(count: u16) -> usize {
    3 + 2 * count as usize + 2
}

/// Expected reply length for a write-multiple of `count` registers:
/// slave + fn + addr(2) + count(2) + 2 crc bytes.
pub fn expected_write_reply_len(_count: u16) -> usize {
    8
}

/// Parse and validate a function 03/04 reply, returning the register
/// words.
pub fn parse_read_reply(
    reply: &[u8],
    slave: u8,
    function: u8,
    count: u16,
) -> Result<Vec<u16>, GatewayError> {
    if reply.len() < 5 {
        return Err(GatewayError::BadFrame(format!(
            "reply too short: {} bytes",
            reply.len()
        )));
    }
    let payload = check_crc(reply).map_err(|(expected, actual)| GatewayError::BadCrc {
        expected,
        actual,
    })?;

    if payload[0] != slave {
        return Err(GatewayError::BadFrame(format!(
            "slave id mismatch: expected {slave}, got {}",
            payload[0]
        )));
    }
    if payload[1] & 0x80 != 0 {
        return Err(GatewayError::BadFrame(format!(
            "exception response for function {:#04x}",
            payload[1] & 0x7F
        )));
    }
    if payload[1] != function {
        return Err(GatewayError::BadFrame(format!(
            "function code mismatch: expected {function:#04x}, got {:#04x}",
            payload[1]
        )));
    }
    let byte_count = payload[2] as usize;
    if byte_count != 2 * count as usize {
        return Err(GatewayError::BadFrame(format!(
            "byte count mismatch: expected {}, got {byte_count}",
            2 * count
        )));
    }
    if payload.len() != 3 + byte_count {
        return Err(GatewayError::BadFrame(format!(
            "payload length mismatch: expected {} bytes of data, got {}",
            byte_count,
            payload.len() - 3
        )));
    }

    let words = payload[3..]
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    Ok(words)
}

/// Parse and validate a function 10 reply, checking the echoed address
/// and count.
pub fn parse_write_reply(
    reply: &[u8],
    slave: u8,
    addr: u16,
    count: u16,
) -> Result<(), GatewayError> {
    if reply.len() < 5 {
        return Err(GatewayError::BadFrame(format!(
            "reply too short: {} bytes",
            reply.len()
        )));
    }
    let payload = check_crc(reply).map_err(|(expected, actual)| GatewayError::BadCrc {
        expected,
        actual,
    })?;

    if payload[0] != slave {
        return Err(GatewayError::BadFrame(format!(
            "slave id mismatch: expected {slave}, got {}",
            payload[0]
        )));
    }
    if payload[1] & 0x80 != 0 {
        return Err(GatewayError::BadFrame(format!(
            "exception response for function {:#04x}",
            payload[1] & 0x7F
        )));
    }
    if payload[1] != FN_WRITE_MULTIPLE {
        return Err(GatewayError::BadFrame(format!(
            "function code mismatch: expected {FN_WRITE_MULTIPLE:#04x}, got {:#04x}",
            payload[1]
        )));
    }
    if payload.len() != 6 {
        return Err(GatewayError::BadFrame(format!(
            "write reply length mismatch: got {} payload bytes",
            payload.len()
        )));
    }
    let echoed_addr = u16::from_be_bytes([payload[2], payload[3]]);
    let echoed_count = u16::from_be_bytes([payload[4], payload[5]]);
    if echoed_addr != addr || echoed_count != count {
        return Err(GatewayError::BadFrame(format!(
            "echo mismatch: expected addr={addr:#06x} count={count}, got addr={echoed_addr:#06x} count={echoed_count}"
        )));
    }
    Ok(())
}
