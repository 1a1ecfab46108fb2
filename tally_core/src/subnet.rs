//! # IPv4 Subnet Arithmetic
//!
//! Converts dotted-quad addresses to and from `u32` and derives the mask,
//! network, broadcast and host range for a CIDR prefix length.
//!
//! All arithmetic is done on `u32` so shifts and complements never
//! sign-extend. Host counts are `u64` because a `/0` block holds 2^32 addresses.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::subnet::{compute_subnet, parse_address};
//!
//! let address = parse_address("192.168.1.1").unwrap();
//! let subnet = compute_subnet(address, 24).unwrap();
//!
//! assert_eq!(subnet.subnet_mask, "255.255.255.0");
//! assert_eq!(subnet.network_address, "192.168.1.0");
//! assert_eq!(subnet.broadcast_address, "192.168.1.255");
//! assert_eq!(subnet.usable_hosts, 254);
//! ```

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};

/// Longest valid prefix length
pub const MAX_PREFIX: u8 = 32;

// =============================================================================
// Parsing and formatting
// =============================================================================

/// Parse a dotted-quad IPv4 address into its 32-bit value.
///
/// Accepts exactly four dot-separated decimal integers in `0..=255`.
/// Leading zeros are read as decimal (`"010"` is 10). Surrounding whitespace
/// is trimmed; signs, empty octets and embedded whitespace are rejected.
///
/// # Errors
///
/// `Format` carrying the raw input text.
pub fn parse_address(text: &str) -> CalcResult<u32> {
    let trimmed = text.trim();
    let octets: Vec<&str> = trimmed.split('.').collect();
    if octets.len() != 4 {
        return Err(CalcError::format(
            text,
            format!("expected 4 dot-separated octets, found {}", octets.len()),
        ));
    }

    let mut value: u32 = 0;
    for (position, octet) in octets.iter().enumerate() {
        if octet.is_empty() || !octet.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CalcError::format(
                text,
                format!("octet {} ('{}') is not a decimal integer", position + 1, octet),
            ));
        }
        if octet.len() > 3 {
            return Err(CalcError::format(
                text,
                format!("octet {} ('{}') has more than three digits", position + 1, octet),
            ));
        }
        let parsed = octet
            .parse::<u32>()
            .ok()
            .filter(|v| *v <= 255)
            .ok_or_else(|| {
                CalcError::format(text, format!("octet {} ('{}') exceeds 255", position + 1, octet))
            })?;
        value = (value << 8) | parsed;
    }

    Ok(value)
}

/// Format a 32-bit value as a canonical dotted quad (no zero padding).
pub fn format_address(address: u32) -> String {
    Ipv4Addr::from(address).to_string()
}

/// Parse `"a.b.c.d/p"` into an address and prefix length.
///
/// # Errors
///
/// `Format` when the slash, the address or the prefix is malformed.
pub fn parse_cidr(text: &str) -> CalcResult<(u32, u8)> {
    let Some((address_text, prefix_text)) = text.trim().split_once('/') else {
        return Err(CalcError::format(text, "expected CIDR notation 'a.b.c.d/prefix'"));
    };

    let address = parse_address(address_text).map_err(|_| {
        CalcError::format(text, format!("'{}' is not a valid IPv4 address", address_text))
    })?;

    let prefix_text = prefix_text.trim();
    let prefix: u8 = if !prefix_text.is_empty() && prefix_text.bytes().all(|b| b.is_ascii_digit()) {
        prefix_text.parse().unwrap_or(u8::MAX)
    } else {
        u8::MAX
    };
    if prefix > MAX_PREFIX {
        return Err(CalcError::format(
            text,
            format!("prefix '{}' must be an integer from 0 to 32", prefix_text),
        ));
    }

    Ok((address, prefix))
}

// =============================================================================
// Bit arithmetic
// =============================================================================

fn check_prefix(prefix_length: u8) -> CalcResult<()> {
    if prefix_length > MAX_PREFIX {
        return Err(CalcError::invalid_input(
            "prefix_length",
            prefix_length.to_string(),
            "Prefix length must be between 0 and 32",
        ));
    }
    Ok(())
}

/// Mask with the top `prefix_length` bits set.
///
/// `/0` yields `0x0000_0000`, `/32` yields `0xFFFF_FFFF`.
pub fn subnet_mask(prefix_length: u8) -> CalcResult<u32> {
    check_prefix(prefix_length)?;
    // a 32-bit shift of a u32 overflows, so /0 is handled explicitly
    Ok(match prefix_length {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p)),
    })
}

/// Complement of the subnet mask (Cisco-style ACL wildcard).
pub fn wildcard_mask(prefix_length: u8) -> CalcResult<u32> {
    Ok(!subnet_mask(prefix_length)?)
}

/// Network address: `address AND mask`.
#[inline]
pub fn network_address(address: u32, mask: u32) -> u32 {
    address & mask
}

/// Broadcast address: `network OR NOT mask`.
#[inline]
pub fn broadcast_address(network: u32, mask: u32) -> u32 {
    network | !mask
}

/// Address counts for a prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCount {
    /// 2^(32 - prefix)
    pub total: u64,
    /// Assignable hosts excluding network and broadcast
    pub usable: u64,
}

/// Count total and usable addresses.
///
/// `/31` and `/32` report zero usable hosts: there are no separate network
/// and broadcast addresses to subtract from a 1- or 2-address block.
pub fn count_hosts(prefix_length: u8) -> CalcResult<HostCount> {
    check_prefix(prefix_length)?;
    let total = 1u64 << (32 - u32::from(prefix_length));
    let usable = match prefix_length {
        31 | 32 => 0,
        _ => total - 2,
    };
    Ok(HostCount { total, usable })
}

/// First and last assignable host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRange {
    pub first: u32,
    pub last: u32,
}

/// `network + 1 ..= broadcast - 1`, or `None` when the block has fewer than
/// three addresses.
pub fn host_range(network: u32, broadcast: u32) -> Option<HostRange> {
    if broadcast.checked_sub(network)? < 2 {
        return None;
    }
    Some(HostRange {
        first: network + 1,
        last: broadcast - 1,
    })
}

/// Historical classful designation of an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressClass {
    A,
    B,
    C,
    /// Multicast
    D,
    /// Reserved
    E,
}

impl AddressClass {
    pub fn of(address: u32) -> Self {
        match address >> 24 {
            0..=127 => AddressClass::A,
            128..=191 => AddressClass::B,
            192..=223 => AddressClass::C,
            224..=239 => AddressClass::D,
            _ => AddressClass::E,
        }
    }
}

/// Whether `address` lies in an RFC 1918 private block.
pub fn is_private(address: u32) -> bool {
    Ipv4Addr::from(address).is_private()
}

// =============================================================================
// Full subnet report
// =============================================================================

/// Everything derived from an address and prefix length.
///
/// Addresses are rendered as dotted quads; the host range is `None`
/// (shown as "N/A") when no usable hosts exist.
///
/// ## JSON Example
///
/// ```json
/// {
///   "address": "192.168.1.1",
///   "prefix_length": 24,
///   "cidr": "192.168.1.0/24",
///   "subnet_mask": "255.255.255.0",
///   "wildcard_mask": "0.0.0.255",
///   "network_address": "192.168.1.0",
///   "broadcast_address": "192.168.1.255",
///   "host_range_start": "192.168.1.1",
///   "host_range_end": "192.168.1.254",
///   "total_hosts": 256,
///   "usable_hosts": 254,
///   "address_class": "C",
///   "is_private": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetResult {
    pub address: String,
    pub prefix_length: u8,
    pub cidr: String,
    pub subnet_mask: String,
    pub wildcard_mask: String,
    pub network_address: String,
    pub broadcast_address: String,
    pub host_range_start: Option<String>,
    pub host_range_end: Option<String>,
    pub total_hosts: u64,
    pub usable_hosts: u64,
    pub address_class: AddressClass,
    pub is_private: bool,
}

/// Derive the full subnet report for `address/prefix_length`.
pub fn compute_subnet(address: u32, prefix_length: u8) -> CalcResult<SubnetResult> {
    let mask = subnet_mask(prefix_length)?;
    let network = network_address(address, mask);
    let broadcast = broadcast_address(network, mask);
    let hosts = count_hosts(prefix_length)?;
    let range = if hosts.usable == 0 {
        None
    } else {
        host_range(network, broadcast)
    };

    debug!(
        address = %format_address(address),
        prefix_length,
        network = %format_address(network),
        usable = hosts.usable,
        "subnet computed"
    );

    Ok(SubnetResult {
        address: format_address(address),
        prefix_length,
        cidr: format!("{}/{}", format_address(network), prefix_length),
        subnet_mask: format_address(mask),
        wildcard_mask: format_address(!mask),
        network_address: format_address(network),
        broadcast_address: format_address(broadcast),
        host_range_start: range.map(|r| format_address(r.first)),
        host_range_end: range.map(|r| format_address(r.last)),
        total_hosts: hosts.total,
        usable_hosts: hosts.usable,
        address_class: AddressClass::of(address),
        is_private: is_private(address),
    })
}

/// Input record for JSON callers.
///
/// ## JSON Example
///
/// ```json
/// { "address": "10.0.0.7", "prefix_length": 8 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetInput {
    pub address: String,
    pub prefix_length: u8,
}

/// Parse and evaluate a [`SubnetInput`].
pub fn calculate(input: &SubnetInput) -> CalcResult<SubnetResult> {
    compute_subnet(parse_address(&input.address)?, input.prefix_length)
}
