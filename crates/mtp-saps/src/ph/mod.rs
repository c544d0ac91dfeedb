/// Octets received from the bit device, LSB of each octet received first
#[derive(Debug)]
pub struct PhBlockInd {
    pub data: Vec<u8>,
}

/// Octets to be transmitted, LSB of each octet sent first
#[derive(Debug)]
pub struct PhBlockReq {
    pub data: Vec<u8>,
}
