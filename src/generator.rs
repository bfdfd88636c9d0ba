//! Random address generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;

use crate::address::AddressFamily;
use crate::error::Result;
use crate::ipfile::{write_addresses, FileWriter};

/// Report progress every this many addresses.
const PROGRESS_INTERVAL: u64 = 100_000;

/// Endless stream of uniformly random addresses of one family.
///
/// # Examples
/// ```
/// use kdip::{AddressFamily, AddressGenerator};
///
/// let addrs: Vec<_> = AddressGenerator::seeded(AddressFamily::V4, Some(1))
///     .take(3)
///     .collect();
/// assert_eq!(addrs.len(), 3);
/// assert!(addrs.iter().all(|a| a.is_ipv4()));
/// ```
#[derive(Debug, Clone)]
pub struct AddressGenerator<R = StdRng> {
    rng: R,
    family: AddressFamily,
}

impl AddressGenerator<StdRng> {
    /// Create a generator, reproducible when a seed is given.
    pub fn seeded(family: AddressFamily, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(family, rng)
    }
}

impl<R: Rng> AddressGenerator<R> {
    /// Create a generator drawing from `rng`.
    pub fn with_rng(family: AddressFamily, rng: R) -> Self {
        Self { rng, family }
    }

    /// Family of the generated addresses.
    pub fn family(&self) -> AddressFamily {
        self.family
    }
}

impl<R: Rng> Iterator for AddressGenerator<R> {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        Some(match self.family {
            AddressFamily::V4 => IpAddr::V4(Ipv4Addr::from(self.rng.gen::<u32>())),
            AddressFamily::V6 => IpAddr::V6(Ipv6Addr::from(self.rng.gen::<u128>())),
        })
    }
}

/// Write `count` random addresses to an address file at `path`.
///
/// Returns the number of addresses written.
pub fn generate_file(
    path: impl AsRef<Path>,
    family: AddressFamily,
    count: u64,
    seed: Option<u64>,
) -> Result<u64> {
    let path = path.as_ref();
    log::info!("Generating {} {} addresses to {:?}", count, family, path);

    let mut writer = FileWriter::create(path)?;
    let addrs = AddressGenerator::seeded(family, seed)
        .zip(1..=count)
        .map(|(addr, done)| {
            if done % PROGRESS_INTERVAL == 0 || done == count {
                log::info!("Progress: {}/{}", done, count);
            }
            addr
        });
    let written = write_addresses(&mut writer, family, addrs)?;
    writer.finish()?;

    log::info!("Finished writing {:?}", path);
    Ok(written)
}
