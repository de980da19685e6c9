use bytes::{Buf, BufMut};

use crate::error::TypeError;

/// Ethernet flow record, carried in sets with id 256.
///
/// Wire layout (45 bytes, no padding, scalars big-endian):
///
/// ```text
/// ┌────────┬──────┬───────────────────┐
/// │ Offset │ Size │ Field             │
/// ├────────┼──────┼───────────────────┤
/// │ 0      │ 4    │ obs_point_id      │
/// │ 4      │ 1    │ direction         │
/// │ 5      │ 6    │ src_mac           │
/// │ 11     │ 6    │ dst_mac           │
/// │ 17     │ 2    │ eth_type          │
/// │ 19     │ 1    │ eth_hdlen         │
/// │ 20     │ 4    │ start_time        │
/// │ 24     │ 4    │ end_time          │
/// │ 28     │ 8    │ packets           │
/// │ 36     │ 8    │ octet_delta_count │
/// │ 44     │ 1    │ flow_end_reason   │
/// └────────┴──────┴───────────────────┘
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EthernetRecord {
    pub obs_point_id: u32,
    pub direction: u8,
    pub src_mac: [u8; 6],
    pub dst_mac: [u8; 6],
    pub eth_type: u16,
    pub eth_hdlen: u8,
    pub start_time: u32,
    pub end_time: u32,
    pub packets: u64,
    pub octet_delta_count: u64,
    pub flow_end_reason: u8,
}

impl EthernetRecord {
    /// Fixed wire length of the record body.
    pub const LEN: usize = 45;

    /// Serialize the record into its 45-byte wire form.
    pub fn encode_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        buf.put_u32(self.obs_point_id);
        buf.put_u8(self.direction);
        buf.put_slice(&self.src_mac);
        buf.put_slice(&self.dst_mac);
        buf.put_u16(self.eth_type);
        buf.put_u8(self.eth_hdlen);
        buf.put_u32(self.start_time);
        buf.put_u32(self.end_time);
        buf.put_u64(self.packets);
        buf.put_u64(self.octet_delta_count);
        buf.put_u8(self.flow_end_reason);
        buf
    }

    /// Deserialize a record from the first [`LEN`](Self::LEN) bytes of `body`.
    ///
    /// # Errors
    ///
    /// [`TypeError::ShortBody`] if `body` is shorter than 45 bytes.
    pub fn decode_body(body: &[u8]) -> Result<Self, TypeError> {
        if body.len() < Self::LEN {
            return Err(TypeError::ShortBody {
                record: "ethernet",
                needed: Self::LEN,
                available: body.len(),
            });
        }

        let mut buf = &body[..Self::LEN];
        let obs_point_id = buf.get_u32();
        let direction = buf.get_u8();
        let mut src_mac = [0u8; 6];
        buf.copy_to_slice(&mut src_mac);
        let mut dst_mac = [0u8; 6];
        buf.copy_to_slice(&mut dst_mac);

        Ok(Self {
            obs_point_id,
            direction,
            src_mac,
            dst_mac,
            eth_type: buf.get_u16(),
            eth_hdlen: buf.get_u8(),
            start_time: buf.get_u32(),
            end_time: buf.get_u32(),
            packets: buf.get_u64(),
            octet_delta_count: buf.get_u64(),
            flow_end_reason: buf.get_u8(),
        })
    }
}
