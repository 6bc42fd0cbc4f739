pub mod cni;
pub mod inputs;
pub mod ip;
pub mod node;
pub mod quantity;
