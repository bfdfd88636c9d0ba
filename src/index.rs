//! Address index: a kd-tree per address family.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::address::{
    v4_addr, v4_point, v4_span, v6_addr, v6_point, v6_span, AddressFamily, Cidr,
};
use crate::error::{Error, Result};
use crate::kdtree::KdTree;

/// How an index is populated from a known set of addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStrategy {
    /// Median-partitioned bulk build (balanced)
    #[default]
    Build,
    /// One insert per address, in input order
    Insert,
}

impl LoadStrategy {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStrategy::Build => "build",
            LoadStrategy::Insert => "insert",
        }
    }
}

impl std::str::FromStr for LoadStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "build" => Ok(LoadStrategy::Build),
            "insert" => Ok(LoadStrategy::Insert),
            other => Err(Error::Config(format!("unknown load strategy: {}", other))),
        }
    }
}

/// A set of addresses of one family, answering CIDR queries.
///
/// # Examples
/// ```
/// use kdip::{AddressFamily, IpIndex, LoadStrategy};
/// use std::net::IpAddr;
///
/// let addrs: Vec<IpAddr> = ["10.0.0.1", "10.0.0.5", "10.1.0.1"]
///     .iter()
///     .map(|s| s.parse().unwrap())
///     .collect();
/// let index = IpIndex::load(AddressFamily::V4, addrs, LoadStrategy::Build).unwrap();
///
/// let hits = index.query(&"10.0.0.0/24".parse().unwrap()).unwrap();
/// assert_eq!(hits.len(), 2);
/// ```
#[derive(Debug)]
pub enum IpIndex {
    /// IPv4 addresses in a 4-d tree
    V4(KdTree<4>),
    /// IPv6 addresses in a 16-d tree
    V6(KdTree<16>),
}

impl IpIndex {
    /// Create an empty index for a family.
    pub fn new(family: AddressFamily) -> Self {
        match family {
            AddressFamily::V4 => IpIndex::V4(KdTree::new()),
            AddressFamily::V6 => IpIndex::V6(KdTree::new()),
        }
    }

    /// Create an index holding `addrs`.
    ///
    /// Fails on the first address of the other family.
    pub fn load<I>(family: AddressFamily, addrs: I, strategy: LoadStrategy) -> Result<Self>
    where
        I: IntoIterator<Item = IpAddr>,
    {
        let mut index = Self::new(family);
        match strategy {
            LoadStrategy::Insert => {
                for addr in addrs {
                    index.insert(addr)?;
                }
            }
            LoadStrategy::Build => match &mut index {
                IpIndex::V4(tree) => {
                    let points = addrs
                        .into_iter()
                        .map(|addr| match addr {
                            IpAddr::V4(v4) => Ok(v4_point(v4)),
                            IpAddr::V6(_) => Err(mismatch(family, &addr)),
                        })
                        .collect::<Result<Vec<_>>>()?;
                    tree.build(points);
                }
                IpIndex::V6(tree) => {
                    let points = addrs
                        .into_iter()
                        .map(|addr| match addr {
                            IpAddr::V6(v6) => Ok(v6_point(v6)),
                            IpAddr::V4(_) => Err(mismatch(family, &addr)),
                        })
                        .collect::<Result<Vec<_>>>()?;
                    tree.build(points);
                }
            },
        }

        log::debug!(
            "loaded {} {} addresses ({})",
            index.len(),
            family,
            strategy.as_str()
        );
        Ok(index)
    }

    /// Address family of this index.
    pub fn family(&self) -> AddressFamily {
        match self {
            IpIndex::V4(_) => AddressFamily::V4,
            IpIndex::V6(_) => AddressFamily::V6,
        }
    }

    /// Number of stored addresses, duplicates included.
    pub fn len(&self) -> usize {
        match self {
            IpIndex::V4(tree) => tree.len(),
            IpIndex::V6(tree) => tree.len(),
        }
    }

    /// Check if no addresses are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of levels in the underlying tree.
    pub fn depth(&self) -> usize {
        match self {
            IpIndex::V4(tree) => tree.depth(),
            IpIndex::V6(tree) => tree.depth(),
        }
    }

    /// Add an address.
    pub fn insert(&mut self, addr: IpAddr) -> Result<()> {
        match (self, addr) {
            (IpIndex::V4(tree), IpAddr::V4(v4)) => tree.insert(v4_point(v4)),
            (IpIndex::V6(tree), IpAddr::V6(v6)) => tree.insert(v6_point(v6)),
            (index, addr) => return Err(mismatch(index.family(), &addr)),
        }
        Ok(())
    }

    /// Check if an address is stored. Always `false` for the other family.
    pub fn contains(&self, addr: &IpAddr) -> bool {
        match (self, addr) {
            (IpIndex::V4(tree), IpAddr::V4(v4)) => tree.contains(&v4_point(*v4)),
            (IpIndex::V6(tree), IpAddr::V6(v6)) => tree.contains(&v6_point(*v6)),
            _ => false,
        }
    }

    /// Remove one occurrence of an address.
    ///
    /// Returns `false` when it was not stored.
    pub fn remove(&mut self, addr: &IpAddr) -> bool {
        match (self, addr) {
            (IpIndex::V4(tree), IpAddr::V4(v4)) => tree.remove(&v4_point(*v4)),
            (IpIndex::V6(tree), IpAddr::V6(v6)) => tree.remove(&v6_point(*v6)),
            _ => false,
        }
    }

    /// All stored addresses inside a CIDR block.
    ///
    /// The order is the tree's visitation order, not address order.
    pub fn query(&self, cidr: &Cidr) -> Result<Vec<IpAddr>> {
        match (self, cidr.base()) {
            (IpIndex::V4(tree), IpAddr::V4(base)) => {
                let (low, high) = v4_span(base, cidr.prefix_len());
                Ok(tree
                    .range_search(&low, &high)
                    .iter()
                    .map(|p| IpAddr::V4(v4_addr(p)))
                    .collect())
            }
            (IpIndex::V6(tree), IpAddr::V6(base)) => {
                let (low, high) = v6_span(base, cidr.prefix_len());
                Ok(tree
                    .range_search(&low, &high)
                    .iter()
                    .map(|p| IpAddr::V6(v6_addr(p)))
                    .collect())
            }
            (index, base) => Err(mismatch(index.family(), &base)),
        }
    }

    /// Rebalance the underlying tree.
    pub fn rebuild(&mut self) {
        match self {
            IpIndex::V4(tree) => tree.rebuild(),
            IpIndex::V6(tree) => tree.rebuild(),
        }
    }

    /// Copy all stored addresses out, in tree order.
    pub fn addresses(&self) -> Vec<IpAddr> {
        match self {
            IpIndex::V4(tree) => tree.iter().map(|p| IpAddr::V4(v4_addr(p))).collect(),
            IpIndex::V6(tree) => tree.iter().map(|p| IpAddr::V6(v6_addr(p))).collect(),
        }
    }
}

fn mismatch(expected: AddressFamily, addr: &IpAddr) -> Error {
    Error::AddressFamilyMismatch {
        expected,
        actual: AddressFamily::of(addr),
    }
}
