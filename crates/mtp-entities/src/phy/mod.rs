pub mod components;
pub mod phy_link;

pub use phy_link::Phy;
