//! Allow-list entries and CIDR matching.
//!
//! An entry is either a literal address (`10.0.0.5`, `::1`) or a
//! network/prefix pair (`10.0.0.0/8`, `fd00::/8`). Entries are parsed once at
//! startup; a bad entry is a [`ConfigurationError`] and never a silent
//! non-match.
//!
//! Matching works on the raw byte representation: the first `p / 8` bytes
//! are compared whole, then the next byte under a left-justified mask
//! `0xFF << (8 - p % 8)`. Addresses of different lengths (IPv4 vs IPv6)
//! never match. IPv4-mapped IPv6 addresses are folded to IPv4 first.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

/// Unparsable allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Address part is not an IP address
    #[error("invalid allow-list address '{0}'")]
    InvalidAddress(String),

    /// Prefix length missing, not a number, or too long for the family
    #[error("invalid prefix length in allow-list entry '{0}'")]
    InvalidPrefix(String),
}

/// One allow-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowListEntry {
    /// Exactly one address
    Literal(IpAddr),
    /// Every address sharing the first `prefix_len` bits with `network`
    Network {
        /// Network address
        network: IpAddr,
        /// Number of leading bits that must match
        prefix_len: u8,
    },
}

impl AllowListEntry {
    /// Whether `client` falls under this entry.
    pub fn contains(&self, client: IpAddr) -> bool {
        let client = normalize(client);
        match *self {
            Self::Literal(addr) => addr == client,
            Self::Network {
                network,
                prefix_len,
            } => match (network, client) {
                (IpAddr::V4(net), IpAddr::V4(ip)) => {
                    prefix_matches(&ip.octets(), &net.octets(), prefix_len)
                }
                (IpAddr::V6(net), IpAddr::V6(ip)) => {
                    prefix_matches(&ip.octets(), &net.octets(), prefix_len)
                }
                _ => false,
            },
        }
    }
}

impl FromStr for AllowListEntry {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entry = s.trim();

        let Some((addr, prefix)) = entry.split_once('/') else {
            let addr = parse_addr(entry)
                .ok_or_else(|| ConfigurationError::InvalidAddress(entry.to_string()))?;
            return Ok(Self::Literal(addr));
        };

        let network = parse_addr(addr)
            .ok_or_else(|| ConfigurationError::InvalidAddress(entry.to_string()))?;
        let prefix_len: u8 = prefix
            .trim()
            .parse()
            .map_err(|_| ConfigurationError::InvalidPrefix(entry.to_string()))?;

        let max = match network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix_len > max {
            return Err(ConfigurationError::InvalidPrefix(entry.to_string()));
        }

        Ok(Self::Network {
            network,
            prefix_len,
        })
    }
}

impl fmt::Display for AllowListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(addr) => write!(f, "{}", addr),
            Self::Network {
                network,
                prefix_len,
            } => write!(f, "{}/{}", network, prefix_len),
        }
    }
}

/// Ordered, immutable set of allow-list entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    entries: Vec<AllowListEntry>,
}

impl AllowList {
    /// Parse every configured entry, failing on the first bad one.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, ConfigurationError> {
        let entries = entries
            .iter()
            .map(|e| e.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Whether `client` matches at least one entry.
    ///
    /// A client string that is not an address matches nothing; an empty list
    /// permits nobody.
    pub fn permits(&self, client: &str) -> bool {
        self.admitted_address(client).is_some()
    }

    /// Canonical address of `client` when it matches at least one entry.
    ///
    /// Every spelling of one address (`ip:port`, IPv4-mapped) resolves to the
    /// same value.
    pub fn admitted_address(&self, client: &str) -> Option<IpAddr> {
        client_address(client)
            .filter(|ip| self.entries.iter().any(|entry| entry.contains(*ip)))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is allowed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Match a client address string against a single entry string.
///
/// `Err` means the entry itself is malformed, which is distinct from a
/// non-match.
pub fn matches(client: &str, entry: &str) -> Result<bool, ConfigurationError> {
    let entry: AllowListEntry = entry.parse()?;
    Ok(client_address(client).is_some_and(|ip| entry.contains(ip)))
}

/// Compare the first `prefix_len` bits of two equal-length addresses.
fn prefix_matches(client: &[u8], network: &[u8], prefix_len: u8) -> bool {
    if client.len() != network.len() {
        return false;
    }

    let full_bytes = usize::from(prefix_len / 8);
    let remaining_bits = prefix_len % 8;

    if full_bytes > client.len() {
        return false;
    }
    if client[..full_bytes] != network[..full_bytes] {
        return false;
    }
    if remaining_bits == 0 {
        return true;
    }

    let Some((c, n)) = client.get(full_bytes).zip(network.get(full_bytes)) else {
        return false;
    };
    let mask = 0xFFu8 << (8 - remaining_bits);
    (c & mask) == (n & mask)
}

fn normalize(ip: IpAddr) -> IpAddr {
    ip.to_canonical()
}

fn parse_addr(s: &str) -> Option<IpAddr> {
    s.trim().parse::<IpAddr>().ok().map(normalize)
}

/// Canonical address of a client identity given as `ip` or `ip:port` (`[v6]:port`).
pub fn client_address(s: &str) -> Option<IpAddr> {
    let s = s.trim();
    parse_addr(s).or_else(|| s.parse::<SocketAddr>().ok().map(|sa| normalize(sa.ip())))
}
