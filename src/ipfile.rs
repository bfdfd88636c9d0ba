//! Plain-text address files.
//!
//! ```text
//! 4
//! 10.0.0.1
//! 192.168.7.30
//! ```
//!
//! The first line holds the IP version (`4` or `6`), followed by one
//! address per line. Blank lines and `#` comments are skipped. Without a
//! version line the family is taken from the first address. IPv6 addresses
//! are written in full, uncompressed form. Gzip-compressed files are
//! detected on read; writing compresses when the path ends in `.gz`.

use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::net::{IpAddr, Ipv6Addr};
use std::path::Path;

use crate::address::AddressFamily;
use crate::error::{Error, Result};

/// Addresses of one family, as read from or written to a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpFile {
    family: AddressFamily,
    addrs: Vec<IpAddr>,
}

impl IpFile {
    /// Create an address file from addresses that are known to share a
    /// family.
    pub fn new(family: AddressFamily, addrs: Vec<IpAddr>) -> Self {
        Self { family, addrs }
    }

    /// Address family declared by (or inferred for) the file.
    pub fn family(&self) -> AddressFamily {
        self.family
    }

    /// Addresses in file order.
    pub fn addrs(&self) -> &[IpAddr] {
        &self.addrs
    }

    /// Take the addresses out.
    pub fn into_addrs(self) -> Vec<IpAddr> {
        self.addrs
    }

    /// Number of addresses.
    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    /// Check if the file holds no addresses.
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }

    /// Parse an address file from a reader.
    ///
    /// An empty input parses as an empty IPv4 file.
    pub fn parse<R: Read>(reader: R) -> Result<Self> {
        let buf_reader = BufReader::new(reader);
        let mut family: Option<AddressFamily> = None;
        let mut addrs = Vec::new();

        for (idx, line) in buf_reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;

            // Remove comments
            let line = match line.find('#') {
                Some(pos) => &line[..pos],
                None => &line,
            };
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            // Version line, only before the first address
            if family.is_none() {
                if let Ok(version) = line.parse::<u32>() {
                    let declared = AddressFamily::from_version(version)
                        .ok_or_else(|| Error::UnsupportedVersion(version).at_line(line_no))?;
                    family = Some(declared);
                    continue;
                }
            }

            let addr = parse_addr(line).map_err(|e| e.at_line(line_no))?;
            let actual = AddressFamily::of(&addr);
            let expected = *family.get_or_insert(actual);
            if actual != expected {
                return Err(Error::AddressFamilyMismatch { expected, actual }.at_line(line_no));
            }
            addrs.push(addr);
        }

        Ok(Self {
            family: family.unwrap_or_default(),
            addrs,
        })
    }

    /// Read an address file, decompressing it if it is gzipped.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        if is_gzip(reader.fill_buf()?) {
            Self::parse(GzDecoder::new(reader))
        } else {
            Self::parse(reader)
        }
    }

    /// Write the file to a path, gzipped when the path ends in `.gz`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = FileWriter::create(path)?;
        write_addresses(&mut writer, self.family, self.addrs.iter().copied())?;
        writer.finish()
    }
}

/// Write a version line followed by one address per line.
///
/// Returns the number of addresses written. Fails on the first address of
/// the other family.
pub fn write_addresses<W, I>(mut writer: W, family: AddressFamily, addrs: I) -> Result<u64>
where
    W: Write,
    I: IntoIterator<Item = IpAddr>,
{
    writeln!(writer, "{}", family.version())?;

    let mut written = 0u64;
    for addr in addrs {
        match addr {
            IpAddr::V4(v4) if family == AddressFamily::V4 => writeln!(writer, "{}", v4)?,
            IpAddr::V6(v6) if family == AddressFamily::V6 => {
                writeln!(writer, "{}", full_v6(&v6))?
            }
            other => {
                return Err(Error::AddressFamilyMismatch {
                    expected: family,
                    actual: AddressFamily::of(&other),
                })
            }
        }
        written += 1;
    }

    writer.flush()?;
    Ok(written)
}

/// Buffered file writer that gzips when the path ends in `.gz`.
pub enum FileWriter {
    /// Uncompressed output
    Plain(BufWriter<File>),
    /// Gzip-compressed output
    Gzip(GzEncoder<BufWriter<File>>),
}

impl FileWriter {
    /// Create (or truncate) the file at `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = BufWriter::with_capacity(64 * 1024, File::create(path)?);
        let gzipped = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        Ok(if gzipped {
            FileWriter::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            FileWriter::Plain(file)
        })
    }

    /// Flush everything, writing the gzip trailer if compressing.
    pub fn finish(self) -> Result<()> {
        let mut file = match self {
            FileWriter::Plain(file) => file,
            FileWriter::Gzip(encoder) => encoder.finish()?,
        };
        file.flush()?;
        Ok(())
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileWriter::Plain(w) => w.write(buf),
            FileWriter::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileWriter::Plain(w) => w.flush(),
            FileWriter::Gzip(w) => w.flush(),
        }
    }
}

fn parse_addr(text: &str) -> Result<IpAddr> {
    text.parse::<IpAddr>()
        .map_err(|_| Error::InvalidIpAddress(text.to_string()))
}

/// Eight 4-digit hex groups, no `::` compression.
fn full_v6(addr: &Ipv6Addr) -> String {
    let s = addr.segments();
    format!(
        "{:04x}:{:04x}:{:04x}:{:04x}:{:04x}:{:04x}:{:04x}:{:04x}",
        s[0], s[1], s[2], s[3], s[4], s[5], s[6], s[7]
    )
}

/// Check if data starts with the gzip magic bytes.
fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs(list: &[&str]) -> Vec<IpAddr> {
        list.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn test_parse_v4_file() {
        let text = "4\n10.0.0.1\n\n# gateway\n192.168.1.1 # home\n";
        let file = IpFile::parse(text.as_bytes()).unwrap();

        assert_eq!(file.family(), AddressFamily::V4);
        assert_eq!(file.addrs(), addrs(&["10.0.0.1", "192.168.1.1"]).as_slice());
    }

    #[test]
    fn test_parse_infers_family_without_header() {
        let text = "2001:0db8:0000:0000:0000:0000:0000:0001\nfe80::1\n";
        let file = IpFile::parse(text.as_bytes()).unwrap();

        assert_eq!(file.family(), AddressFamily::V6);
        assert_eq!(file.len(), 2);
    }

    #[test]
    fn test_parse_empty_input() {
        let file = IpFile::parse("".as_bytes()).unwrap();
        assert!(file.is_empty());
        assert_eq!(file.family(), AddressFamily::V4);

        let file = IpFile::parse("6\n".as_bytes()).unwrap();
        assert!(file.is_empty());
        assert_eq!(file.family(), AddressFamily::V6);
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = IpFile::parse("4\n10.0.0.1\n10.0.0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidLine { line: 3, .. }));

        let err = IpFile::parse("4\n::1\n".as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 2: address family mismatch: expected IPv4, got IPv6"
        );

        let err = IpFile::parse("5\n".as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "line 1: unsupported IP version: 5");
    }

    #[test]
    fn test_write_addresses() {
        let mut out = Vec::new();
        let written = write_addresses(
            &mut out,
            AddressFamily::V6,
            addrs(&["::1", "2001:db8::8:800:200c:417a"]),
        )
        .unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "6\n\
             0000:0000:0000:0000:0000:0000:0000:0001\n\
             2001:0db8:0000:0000:0008:0800:200c:417a\n"
        );
    }

    #[test]
    fn test_write_rejects_other_family() {
        let mut out = Vec::new();
        let result = write_addresses(&mut out, AddressFamily::V4, addrs(&["::1"]));
        assert!(matches!(result, Err(Error::AddressFamilyMismatch { .. })));
    }

    #[test]
    fn test_written_file_parses_back() {
        let original = addrs(&["1.2.3.4", "255.255.255.255", "0.0.0.0"]);
        let mut out = Vec::new();
        write_addresses(&mut out, AddressFamily::V4, original.clone()).unwrap();

        let file = IpFile::parse(out.as_slice()).unwrap();
        assert_eq!(file.into_addrs(), original);
    }

    #[test]
    fn test_is_gzip() {
        assert!(is_gzip(&[0x1f, 0x8b, 0x08]));
        assert!(!is_gzip(b"4\n"));
        assert!(!is_gzip(&[]));
    }
}
