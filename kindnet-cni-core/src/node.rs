use k8s_openapi::api::core::v1::Node;
use log::debug;

use crate::{inputs::ConfigInputs, ip::block::AddressBlock, quantity::parse_quantity_value};

pub const POD_CAPACITY_RESOURCE: &str = "pods";

/// The parts of a node object the CNI config is computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRanges {
    pub pod_cidrs: Vec<String>,
    pub pod_capacity: Option<u64>,
}

impl NodeRanges {
    pub fn from_node(node: &Node) -> Self {
        Self {
            pod_cidrs: get_pod_cidrs(node),
            pod_capacity: get_pod_capacity(node),
        }
    }

    /// Splits off the CIDRs that don't parse, returning them alongside the cleaned up ranges.
    pub fn validated(self) -> (Self, Vec<String>) {
        let (valid, rejected) = self
            .pod_cidrs
            .into_iter()
            .partition(|cidr| cidr.parse::<AddressBlock>().is_ok());

        (
            Self {
                pod_cidrs: valid,
                pod_capacity: self.pod_capacity,
            },
            rejected,
        )
    }

    pub fn compute_inputs(&self, mtu: u32) -> ConfigInputs {
        ConfigInputs::compute(&self.pod_cidrs, self.pod_capacity, mtu)
    }
}

fn get_pod_cidrs(node: &Node) -> Vec<String> {
    let spec = match node.spec.as_ref() {
        Some(spec) => spec,
        None => {
            debug!("Node is missing the spec section!");
            return Vec::new();
        }
    };

    match spec.pod_cidrs.as_ref() {
        Some(pod_cidrs) if !pod_cidrs.is_empty() => pod_cidrs.to_owned(),
        _ => spec.pod_cidr.iter().cloned().collect(),
    }
}

fn get_pod_capacity(node: &Node) -> Option<u64> {
    node.status
        .as_ref()
        .and_then(|status| status.capacity.as_ref())
        .and_then(|capacity| capacity.get(POD_CAPACITY_RESOURCE))
        .or_else(|| {
            debug!("Node doesn't report its '{POD_CAPACITY_RESOURCE}' capacity!");
            None
        })
        .and_then(|quantity| {
            parse_quantity_value(&quantity.0).or_else(|| {
                debug!("'{}' is not a valid pod capacity!", quantity.0);
                None
            })
        })
}
