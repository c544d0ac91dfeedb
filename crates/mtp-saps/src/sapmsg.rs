use core::fmt::Display;

use mtp_core::BitTime;
use mtp_core::Sap;
use mtp_core::mtp_entities::MtpEntity;

use crate::l2::*;
use crate::l3::*;
use crate::ph::*;


/// Exhaustive list of primitives for use in the SapMsg struct
#[derive(Debug)]
pub enum SapMsgInner {
    // PH-SAP
    PhBlockInd(PhBlockInd),
    PhBlockReq(PhBlockReq),

    // L2-SAP
    L2ControlReq(L2ControlReq),
    L2DataReq(L2DataReq),
    L2Ind(L2Ind),

    // L3-SAP
    L3ControlReq(L3ControlReq),
    L3TransferReq(L3TransferReq),
    L3Ind(L3Ind),
}

impl Display for SapMsgInner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SapMsgInner::PhBlockInd(_) => write!(f, "PhBlockInd"),
            SapMsgInner::PhBlockReq(_) => write!(f, "PhBlockReq"),
            SapMsgInner::L2ControlReq(_) => write!(f, "L2ControlReq"),
            SapMsgInner::L2DataReq(_) => write!(f, "L2DataReq"),
            SapMsgInner::L2Ind(_) => write!(f, "L2Ind"),
            SapMsgInner::L3ControlReq(_) => write!(f, "L3ControlReq"),
            SapMsgInner::L3TransferReq(_) => write!(f, "L3TransferReq"),
            SapMsgInner::L3Ind(_) => write!(f, "L3Ind"),
        }
    }
}

#[derive(Debug)]
pub struct SapMsg {
    pub sap: Sap,
    pub src: MtpEntity,
    pub dest: MtpEntity,

    /// Link time at which the primitive was generated
    pub time: BitTime,

    pub msg: SapMsgInner,
}

impl SapMsg {
    pub fn get_sap(&self) -> &Sap {
        &self.sap
    }
    pub fn get_source(&self) -> &MtpEntity {
        &self.src
    }
    pub fn get_dest(&self) -> &MtpEntity {
        &self.dest
    }
}
