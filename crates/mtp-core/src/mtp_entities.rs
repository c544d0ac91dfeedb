// Entities of the link stack, lowest layer first
#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy)]
pub enum MtpEntity {
    /// Bit pump towards the modem or bit stream device
    Phy,
    /// Signalling link functions (MTP level 2)
    Mtp2,
    /// Routing label shim (MTP level 3, single link)
    Mtp3,
    /// Any entity using the MTP transfer service
    User,
}
