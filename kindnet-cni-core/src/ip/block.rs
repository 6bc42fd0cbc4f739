use std::{
    fmt::{Display, Formatter},
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use ipnet::IpNet;

use super::{AddressBlockError, AddressFamily};

/// A pod CIDR with its host bits cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressBlock {
    net: IpNet,
}

impl AddressBlock {
    pub fn new(net: IpNet) -> Self {
        Self { net: net.trunc() }
    }

    pub fn network(&self) -> IpAddr {
        self.net.network()
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::from(&self.network())
    }

    /// Number of addresses in the block, saturating at `u128::MAX` for an IPv6 `/0`.
    pub fn address_count(&self) -> u128 {
        let host_bits = u32::from(self.net.max_prefix_len() - self.net.prefix_len());

        1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
    }

    /// Returns the address `index` positions after the network address,
    /// or `None` when it falls outside of the block.
    pub fn nth_address(&self, index: u128) -> Option<IpAddr> {
        if index >= self.address_count() {
            return None;
        }

        match self.net {
            IpNet::V4(net) => {
                let index = u32::try_from(index).ok()?;

                u32::from(net.network())
                    .checked_add(index)
                    .map(|address| IpAddr::V4(Ipv4Addr::from(address)))
            }
            IpNet::V6(net) => u128::from(net.network())
                .checked_add(index)
                .map(|address| IpAddr::V6(Ipv6Addr::from(address))),
        }
    }
}

impl Display for AddressBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}", self.net))
    }
}

impl FromStr for AddressBlock {
    type Err = AddressBlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IpNet>()
            .map(AddressBlock::new)
            .map_err(|_| AddressBlockError::Invalid(s.to_owned()))
    }
}
