//! Minimal demo binary confirming the library builds and links.
//!
//! The CLI/host surfaces this gateway is meant to sit behind — HTTP/
//! JSON control, telnet diagnostics, Wi-Fi provisioning, OTA, mDNS —
//! are external collaborators and live outside this
//! crate; this binary only prints what's here.

fn main() {
    println!("d3net-gateway {}", env!("CARGO_PKG_VERSION"));
    println!("core: bitfield codec, register views, Modbus-RTU transport, gateway state machine");
    println!("host surfaces (HTTP, telnet, Wi-Fi, OTA, mDNS) are external collaborators");
}
