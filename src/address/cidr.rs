//! CIDR prefixes and the address boxes they cover.

use ipnet::IpNet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::{AddressFamily, V4Point, V6Point};
use crate::error::{Error, Result};

/// Corners of the IPv4 box covered by `base/prefix`.
///
/// The address is treated as a 32-bit integer: `low = base & mask` and
/// `high = low | !mask`, split back into bytes.
pub fn v4_bounds(base: Ipv4Addr, prefix: u8) -> Result<(V4Point, V4Point)> {
    if prefix > 32 {
        return Err(Error::InvalidPrefixLength {
            family: AddressFamily::V4,
            prefix,
        });
    }
    Ok(v4_span(base, prefix))
}

/// [`v4_bounds`] for a prefix already known to fit; longer prefixes are
/// treated as /32.
pub(crate) fn v4_span(base: Ipv4Addr, prefix: u8) -> (V4Point, V4Point) {
    let prefix = u32::from(prefix.min(32));
    let mask: u32 = if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - prefix)
    };
    let low = u32::from(base) & mask;
    let high = low | !mask;
    (low.to_be_bytes(), high.to_be_bytes())
}

/// Corners of the IPv6 box covered by `base/prefix`.
///
/// Masks are applied per byte: bytes inside the prefix are fixed, bytes
/// past it span 0..=255, and the byte the prefix ends in gets a partial
/// mask.
pub fn v6_bounds(base: Ipv6Addr, prefix: u8) -> Result<(V6Point, V6Point)> {
    if prefix > 128 {
        return Err(Error::InvalidPrefixLength {
            family: AddressFamily::V6,
            prefix,
        });
    }
    Ok(v6_span(base, prefix))
}

/// [`v6_bounds`] for a prefix already known to fit.
pub(crate) fn v6_span(base: Ipv6Addr, prefix: u8) -> (V6Point, V6Point) {
    let bytes = base.octets();
    let mut low = [0u8; 16];
    let mut high = [0u8; 16];
    for (i, byte) in bytes.iter().enumerate() {
        let mask = byte_mask(prefix, i);
        low[i] = byte & mask;
        high[i] = low[i] | !mask;
    }
    (low, high)
}

/// Mask for byte `index` of an address under a `prefix`-bit prefix.
fn byte_mask(prefix: u8, index: usize) -> u8 {
    let start = index * 8;
    let prefix = usize::from(prefix);
    if prefix >= start + 8 {
        0xFF
    } else if prefix <= start {
        0
    } else {
        0xFF << (8 - (prefix - start))
    }
}

/// A parsed CIDR block such as `10.0.0.0/24` or `2001:db8::/32`.
///
/// Host bits in the base address are allowed; they are masked off when
/// the bounds are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cidr {
    base: IpAddr,
    prefix: u8,
}

impl Cidr {
    /// Create a CIDR block, checking the prefix length against the family.
    pub fn new(base: IpAddr, prefix: u8) -> Result<Self> {
        let family = AddressFamily::of(&base);
        if prefix > family.max_prefix() {
            return Err(Error::InvalidPrefixLength { family, prefix });
        }
        Ok(Self { base, prefix })
    }

    /// Base address as written.
    pub fn base(&self) -> IpAddr {
        self.base
    }

    /// Prefix length in bits.
    pub fn prefix_len(&self) -> u8 {
        self.prefix
    }

    /// Address family of the block.
    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.base)
    }

    /// Lowest and highest address in the block.
    pub fn range(&self) -> (IpAddr, IpAddr) {
        match self.base {
            IpAddr::V4(base) => {
                let (low, high) = v4_span(base, self.prefix);
                (Ipv4Addr::from(low).into(), Ipv4Addr::from(high).into())
            }
            IpAddr::V6(base) => {
                let (low, high) = v6_span(base, self.prefix);
                (Ipv6Addr::from(low).into(), Ipv6Addr::from(high).into())
            }
        }
    }
}

impl From<IpNet> for Cidr {
    fn from(net: IpNet) -> Self {
        Self {
            base: net.addr(),
            prefix: net.prefix_len(),
        }
    }
}

impl std::str::FromStr for Cidr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let pattern = s.trim();
        pattern
            .parse::<IpNet>()
            .map(Cidr::from)
            .map_err(|_| Error::InvalidCidrPattern(pattern.to_string()))
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ipnet::{Ipv4Net, Ipv6Net};

    #[test]
    fn test_v4_bounds() {
        let base: Ipv4Addr = "10.0.0.0".parse().unwrap();
        assert_eq!(
            v4_bounds(base, 24).unwrap(),
            ([10, 0, 0, 0], [10, 0, 0, 255])
        );

        let base: Ipv4Addr = "192.168.77.200".parse().unwrap();
        assert_eq!(
            v4_bounds(base, 20).unwrap(),
            ([192, 168, 64, 0], [192, 168, 79, 255])
        );
    }

    #[test]
    fn test_v4_bounds_edges() {
        let base: Ipv4Addr = "203.0.113.9".parse().unwrap();
        assert_eq!(v4_bounds(base, 0).unwrap(), ([0; 4], [255; 4]));
        assert_eq!(
            v4_bounds(base, 32).unwrap(),
            ([203, 0, 113, 9], [203, 0, 113, 9])
        );
        assert!(matches!(
            v4_bounds(base, 33),
            Err(Error::InvalidPrefixLength { prefix: 33, .. })
        ));
    }

    #[test]
    fn test_v4_bounds_agree_with_ipnet() {
        let base: Ipv4Addr = "172.20.143.7".parse().unwrap();
        for prefix in 0..=32 {
            let net = Ipv4Net::new(base, prefix).unwrap();
            let (low, high) = v4_bounds(base, prefix).unwrap();
            assert_eq!(Ipv4Addr::from(low), net.network(), "/{}", prefix);
            assert_eq!(Ipv4Addr::from(high), net.broadcast(), "/{}", prefix);
        }
    }

    #[test]
    fn test_v6_bounds() {
        let base: Ipv6Addr = "2001:db8:abcd:12ff::1".parse().unwrap();
        let (low, high) = v6_bounds(base, 52).unwrap();
        assert_eq!(
            Ipv6Addr::from(low),
            "2001:db8:abcd:1000::".parse::<Ipv6Addr>().unwrap()
        );
        assert_eq!(
            Ipv6Addr::from(high),
            "2001:db8:abcd:1fff:ffff:ffff:ffff:ffff"
                .parse::<Ipv6Addr>()
                .unwrap()
        );
    }

    #[test]
    fn test_v6_bounds_agree_with_ipnet() {
        let base: Ipv6Addr = "fd12:3456:789a:1::dead:beef".parse().unwrap();
        for prefix in 0..=128 {
            let net = Ipv6Net::new(base, prefix).unwrap();
            let (low, high) = v6_bounds(base, prefix).unwrap();
            assert_eq!(Ipv6Addr::from(low), net.network(), "/{}", prefix);
            assert_eq!(Ipv6Addr::from(high), net.broadcast(), "/{}", prefix);
        }
        assert!(v6_bounds(base, 129).is_err());
    }

    #[test]
    fn test_byte_mask() {
        assert_eq!(byte_mask(0, 0), 0x00);
        assert_eq!(byte_mask(8, 0), 0xFF);
        assert_eq!(byte_mask(8, 1), 0x00);
        assert_eq!(byte_mask(12, 1), 0xF0);
        assert_eq!(byte_mask(127, 15), 0xFE);
    }

    #[test]
    fn test_parse_cidr() {
        let cidr: Cidr = "10.0.0.0/24".parse().unwrap();
        assert_eq!(cidr.family(), AddressFamily::V4);
        assert_eq!(cidr.prefix_len(), 24);
        assert_eq!(cidr.to_string(), "10.0.0.0/24");

        let cidr: Cidr = " 2001:db8::1/32 ".parse().unwrap();
        assert_eq!(cidr.family(), AddressFamily::V6);
        assert_eq!(cidr.base(), "2001:db8::1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_parse_invalid_cidr() {
        assert!("invalid".parse::<Cidr>().is_err());
        assert!("192.168.1.1".parse::<Cidr>().is_err()); // No prefix
        assert!("192.168.1.1/33".parse::<Cidr>().is_err());
        assert!("::/129".parse::<Cidr>().is_err());
        assert!(matches!(
            "10.0.0/8".parse::<Cidr>(),
            Err(Error::InvalidCidrPattern(_))
        ));
    }

    #[test]
    fn test_new_checks_prefix() {
        let v4: IpAddr = "10.0.0.0".parse().unwrap();
        assert!(Cidr::new(v4, 32).is_ok());
        assert!(Cidr::new(v4, 33).is_err());

        let v6: IpAddr = "::".parse().unwrap();
        assert!(Cidr::new(v6, 128).is_ok());
    }

    #[test]
    fn test_range() {
        let cidr: Cidr = "10.9.8.7/16".parse().unwrap();
        let (low, high) = cidr.range();
        assert_eq!(low.to_string(), "10.9.0.0");
        assert_eq!(high.to_string(), "10.9.255.255");

        let cidr: Cidr = "2001:db8::1/126".parse().unwrap();
        let (low, high) = cidr.range();
        assert_eq!(low.to_string(), "2001:db8::");
        assert_eq!(high.to_string(), "2001:db8::3");
    }

    #[test]
    fn test_range_at_prefix_limits() {
        for (text, first, last) in [
            ("0.0.0.0/0", "0.0.0.0", "255.255.255.255"),
            ("192.0.2.1/32", "192.0.2.1", "192.0.2.1"),
            ("::/0", "::", "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"),
            ("::5/128", "::5", "::5"),
        ] {
            let cidr: Cidr = text.parse().unwrap();
            let (low, high) = cidr.range();
            assert_eq!(low.to_string(), first, "{}", text);
            assert_eq!(high.to_string(), last, "{}", text);
        }
    }
}
