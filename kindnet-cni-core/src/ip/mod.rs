use std::net::IpAddr;

use thiserror::Error;

pub mod block;

pub const IPV4_DEFAULT_ROUTE: &str = "0.0.0.0/0";
pub const IPV6_DEFAULT_ROUTE: &str = "::/0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressBlockError {
    #[error("Couldn't parse '{}' as an address block!", .0)]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// The unspecified route of this family, used as the pod default route.
    pub fn default_route(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => IPV4_DEFAULT_ROUTE,
            AddressFamily::Ipv6 => IPV6_DEFAULT_ROUTE,
        }
    }
}

impl From<&IpAddr> for AddressFamily {
    fn from(value: &IpAddr) -> Self {
        match value {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }
}
