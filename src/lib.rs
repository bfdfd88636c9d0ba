//! kdip - K-dimensional tree index for IP addresses.
//!
//! This crate stores large sets of IPv4/IPv6 addresses in a kd-tree and
//! answers "which stored addresses fall inside this CIDR block" queries.
//!
//! # Features
//!
//! - **Generic kd-tree**: insert, exact search, delete, balanced bulk build
//!   and inclusive box (range) search over `[T; K]` points
//! - **Address mapping**: one tree dimension per address byte (4 for IPv4,
//!   16 for IPv6); a CIDR prefix maps to the box of addresses it covers
//! - **Address files**: plain-text address lists, optionally gzipped
//! - **Random generation**: reproducible test data sets
//!
//! # Quick Start
//!
//! ```
//! use kdip::{AddressFamily, Cidr, IpIndex, LoadStrategy};
//! use std::net::IpAddr;
//!
//! let addrs: Vec<IpAddr> = ["10.0.0.1", "10.0.0.5", "10.1.0.1"]
//!     .iter()
//!     .map(|s| s.parse().unwrap())
//!     .collect();
//!
//! // Bulk build is preferred when all addresses are known up front.
//! let index = IpIndex::load(AddressFamily::V4, addrs, LoadStrategy::Build)?;
//!
//! let subnet: Cidr = "10.0.0.0/24".parse()?;
//! let mut hits = index.query(&subnet)?;
//! hits.sort();
//! assert_eq!(hits, vec![
//!     "10.0.0.1".parse::<IpAddr>().unwrap(),
//!     "10.0.0.5".parse::<IpAddr>().unwrap(),
//! ]);
//! # Ok::<(), kdip::Error>(())
//! ```
//!
//! # Using the tree directly
//!
//! ```
//! use kdip::KdTree;
//!
//! let mut tree: KdTree<4> = KdTree::new();
//! tree.insert([192, 168, 1, 10]);
//! tree.insert([192, 168, 2, 10]);
//!
//! let hits = tree.range_search(&[192, 168, 1, 0], &[192, 168, 1, 255]);
//! assert_eq!(hits, vec![[192, 168, 1, 10]]);
//!
//! tree.remove(&[192, 168, 1, 10]);
//! assert!(!tree.contains(&[192, 168, 1, 10]));
//! ```

mod error;

pub mod address;
pub mod config;
pub mod generator;
pub mod index;
pub mod ipfile;
pub mod kdtree;
pub mod shell;

// Re-export core types
pub use error::{Error, Result};
pub use kdtree::{KdTree, Point};

// Re-export address types
pub use address::{AddressFamily, Cidr};

// Re-export index and collaborators
pub use config::Config;
pub use generator::{generate_file, AddressGenerator};
pub use index::{IpIndex, LoadStrategy};
pub use ipfile::IpFile;
