use std::net::IpAddr;

use crate::ip::block::AddressBlock;

/// Pod capacity assumed when the node doesn't report one, mirrors the kubelet's `--max-pods` default.
pub const DEFAULT_POD_CAPACITY: u64 = 110;

/// Number of low addresses withheld from dynamic allocation when a block has room to spare.
pub const RESERVED_ADDRESSES: u128 = 10;

/// Everything the CNI config needs to know about a single pod CIDR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRange {
    block: AddressBlock,
    default_route: &'static str,
    range_start: Option<IpAddr>,
}

impl PodRange {
    pub fn new(block: AddressBlock, pod_capacity: u64) -> Self {
        Self {
            block,
            default_route: block.family().default_route(),
            range_start: reserved_range_start(&block, pod_capacity),
        }
    }

    pub fn block(&self) -> &AddressBlock {
        &self.block
    }

    pub fn default_route(&self) -> &'static str {
        self.default_route
    }

    /// First address the IPAM plugin may hand out, `None` means the block's own default.
    ///
    /// A `None` doesn't tell apart a block too small to reserve anything
    /// from a block whose reserved start couldn't be computed.
    pub fn range_start(&self) -> Option<IpAddr> {
        self.range_start
    }
}

/// Inputs of the CNI config template, one [PodRange] per usable pod CIDR, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigInputs {
    ranges: Vec<PodRange>,
    mtu: u32,
}

impl ConfigInputs {
    /// Computes the template inputs for a node.
    ///
    /// `pod_cidrs` are expected to be validated beforehand, anything that
    /// still fails to parse is left out of the result instead of failing
    /// the whole computation. A missing or zero `pod_capacity` falls back
    /// to [DEFAULT_POD_CAPACITY]. `mtu` is passed through as is.
    pub fn compute<S: AsRef<str>>(pod_cidrs: &[S], pod_capacity: Option<u64>, mtu: u32) -> Self {
        let pod_capacity = effective_pod_capacity(pod_capacity);
        let ranges = pod_cidrs
            .iter()
            .filter_map(|cidr| cidr.as_ref().parse::<AddressBlock>().ok())
            .map(|block| PodRange::new(block, pod_capacity))
            .collect();

        Self { ranges, mtu }
    }

    pub fn ranges(&self) -> &[PodRange] {
        &self.ranges
    }

    pub fn mtu(&self) -> u32 {
        self.mtu
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn pod_cidrs(&self) -> Vec<String> {
        self.ranges
            .iter()
            .map(|range| range.block.to_string())
            .collect()
    }

    pub fn default_routes(&self) -> Vec<&'static str> {
        self.ranges.iter().map(|range| range.default_route).collect()
    }

    /// Range starts as template strings, empty where there's no reservation.
    pub fn range_starts(&self) -> Vec<String> {
        self.ranges
            .iter()
            .map(|range| {
                range
                    .range_start
                    .map(|start| start.to_string())
                    .unwrap_or_default()
            })
            .collect()
    }
}

fn effective_pod_capacity(pod_capacity: Option<u64>) -> u64 {
    match pod_capacity {
        Some(0) | None => DEFAULT_POD_CAPACITY,
        Some(capacity) => capacity,
    }
}

fn reserved_range_start(block: &AddressBlock, pod_capacity: u64) -> Option<IpAddr> {
    block
        .address_count()
        .checked_sub(u128::from(pod_capacity))
        .filter(|spare| *spare > RESERVED_ADDRESSES)
        .and_then(|_| block.nth_address(RESERVED_ADDRESSES))
}
