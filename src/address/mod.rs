//! Mapping between IP addresses and tree points.
//!
//! An IPv4 address becomes a 4-coordinate point and an IPv6 address a
//! 16-coordinate point, one coordinate per byte in network order. A CIDR
//! prefix becomes the `(low, high)` corners of the box holding every
//! address it covers (see [`Cidr`]).

mod cidr;

pub use cidr::{v4_bounds, v6_bounds, Cidr};
pub(crate) use cidr::{v4_span, v6_span};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::Error;
use crate::kdtree::Point;

/// Point for an IPv4 address.
pub type V4Point = Point<4>;

/// Point for an IPv6 address.
pub type V6Point = Point<16>;

/// IP address family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AddressFamily {
    /// 32-bit addresses, 4 dimensions
    #[default]
    V4,
    /// 128-bit addresses, 16 dimensions
    V6,
}

impl AddressFamily {
    /// Get the IP version number (4 or 6).
    pub fn version(self) -> u8 {
        match self {
            AddressFamily::V4 => 4,
            AddressFamily::V6 => 6,
        }
    }

    /// Convert from an IP version number.
    ///
    /// Returns `None` for anything other than 4 or 6.
    pub fn from_version(version: u32) -> Option<Self> {
        match version {
            4 => Some(AddressFamily::V4),
            6 => Some(AddressFamily::V6),
            _ => None,
        }
    }

    /// Number of tree dimensions (address bytes) for this family.
    pub fn dimensions(self) -> usize {
        match self {
            AddressFamily::V4 => 4,
            AddressFamily::V6 => 16,
        }
    }

    /// Number of address bits, the largest valid prefix length.
    pub fn max_prefix(self) -> u8 {
        match self {
            AddressFamily::V4 => 32,
            AddressFamily::V6 => 128,
        }
    }

    /// Family of an address.
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::V4 => "IPv4",
            AddressFamily::V6 => "IPv6",
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<u8> for AddressFamily {
    type Error = Error;

    fn try_from(version: u8) -> Result<Self, Self::Error> {
        Self::from_version(version.into()).ok_or(Error::UnsupportedVersion(version.into()))
    }
}

impl From<AddressFamily> for u8 {
    fn from(family: AddressFamily) -> Self {
        family.version()
    }
}

impl std::str::FromStr for AddressFamily {
    type Err = Error;

    /// Accepts `4`/`6`, `v4`/`v6` and `ipv4`/`ipv6` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let digits = lower
            .strip_prefix("ipv")
            .or_else(|| lower.strip_prefix('v'))
            .unwrap_or(&lower);
        let version: u32 = digits
            .parse()
            .map_err(|_| Error::Config(format!("unknown address family: {}", s)))?;
        Self::from_version(version).ok_or(Error::UnsupportedVersion(version))
    }
}

/// Point for an IPv4 address.
pub fn v4_point(addr: Ipv4Addr) -> V4Point {
    addr.octets()
}

/// Point for an IPv6 address.
pub fn v6_point(addr: Ipv6Addr) -> V6Point {
    addr.octets()
}

/// IPv4 address stored in a point.
pub fn v4_addr(point: &V4Point) -> Ipv4Addr {
    Ipv4Addr::from(*point)
}

/// IPv6 address stored in a point.
pub fn v6_addr(point: &V6Point) -> Ipv6Addr {
    Ipv6Addr::from(*point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_round_trip() {
        let v4: Ipv4Addr = "10.1.2.3".parse().unwrap();
        assert_eq!(v4_point(v4), [10, 1, 2, 3]);
        assert_eq!(v4_addr(&[10, 1, 2, 3]), v4);

        let v6: Ipv6Addr = "::1".parse().unwrap();
        let mut expected = [0u8; 16];
        expected[15] = 1;
        assert_eq!(v6_point(v6), expected);
        assert_eq!(v6_addr(&expected).to_string(), "::1");
    }

    #[test]
    fn test_family_versions() {
        assert_eq!(AddressFamily::V4.version(), 4);
        assert_eq!(AddressFamily::V6.version(), 6);
        assert_eq!(AddressFamily::from_version(6), Some(AddressFamily::V6));
        assert_eq!(AddressFamily::from_version(5), None);
        assert_eq!(AddressFamily::V6.dimensions(), 16);
        assert_eq!(AddressFamily::V4.max_prefix(), 32);
    }

    #[test]
    fn test_family_from_str() {
        assert_eq!("4".parse::<AddressFamily>().unwrap(), AddressFamily::V4);
        assert_eq!("v6".parse::<AddressFamily>().unwrap(), AddressFamily::V6);
        assert_eq!("IPv6".parse::<AddressFamily>().unwrap(), AddressFamily::V6);
        assert!(matches!(
            "5".parse::<AddressFamily>(),
            Err(Error::UnsupportedVersion(5))
        ));
        assert!("ipx".parse::<AddressFamily>().is_err());
    }

    #[test]
    fn test_family_of() {
        let v4: IpAddr = "8.8.8.8".parse().unwrap();
        let v6: IpAddr = "2001:4860:4860::8888".parse().unwrap();
        assert_eq!(AddressFamily::of(&v4), AddressFamily::V4);
        assert_eq!(AddressFamily::of(&v6), AddressFamily::V6);
        assert_eq!(AddressFamily::V6.to_string(), "IPv6");
    }
}
