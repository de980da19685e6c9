use bytes::{Buf, BufMut};

use crate::error::TypeError;

/// ICMP flow record, carried in sets with id 266.
///
/// Wire layout (93 bytes, no padding, scalars big-endian, addresses in
/// network order):
///
/// ```text
/// ┌────────┬──────┬──────────────────────┐
/// │ Offset │ Size │ Field                │
/// ├────────┼──────┼──────────────────────┤
/// │ 0      │ 4    │ obs_point_id         │
/// │ 4      │ 1    │ direction            │
/// │ 5      │ 6    │ src_mac              │
/// │ 11     │ 6    │ dst_mac              │
/// │ 17     │ 2    │ eth_type             │
/// │ 19     │ 1    │ eth_hdlen            │
/// │ 20     │ 1    │ ip_version           │
/// │ 21     │ 1    │ ip_ttl               │
/// │ 22     │ 1    │ ip_proto             │
/// │ 23     │ 1    │ dscp                 │
/// │ 24     │ 1    │ ip_precedence        │
/// │ 25     │ 1    │ ip_tos               │
/// │ 26     │ 4    │ src_ip               │
/// │ 30     │ 4    │ dst_ip               │
/// │ 34     │ 1    │ icmp_type            │
/// │ 35     │ 1    │ icmp_code            │
/// │ 36     │ 4    │ start_time           │
/// │ 40     │ 4    │ end_time             │
/// │ 44     │ 8    │ packets              │
/// │ 52     │ 8    │ octet_delta_count    │
/// │ 60     │ 1    │ flow_end_reason      │
/// │ 61     │ 8    │ octets               │
/// │ 69     │ 8    │ delta_octets_squared │
/// │ 77     │ 8    │ min_len              │
/// │ 85     │ 8    │ max_len              │
/// └────────┴──────┴──────────────────────┘
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IcmpRecord {
    pub obs_point_id: u32,
    pub direction: u8,
    pub src_mac: [u8; 6],
    pub dst_mac: [u8; 6],
    pub eth_type: u16,
    pub eth_hdlen: u8,
    pub ip_version: u8,
    pub ip_ttl: u8,
    pub ip_proto: u8,
    pub dscp: u8,
    pub ip_precedence: u8,
    pub ip_tos: u8,
    pub src_ip: [u8; 4],
    pub dst_ip: [u8; 4],
    pub icmp_type: u8,
    pub icmp_code: u8,
    pub start_time: u32,
    pub end_time: u32,
    pub packets: u64,
    pub octet_delta_count: u64,
    pub flow_end_reason: u8,
    pub octets: u64,
    pub delta_octets_squared: u64,
    pub min_len: u64,
    pub max_len: u64,
}

impl IcmpRecord {
    /// Fixed wire length of the record body.
    pub const LEN: usize = 93;

    /// Serialize the record into its 93-byte wire form.
    pub fn encode_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        buf.put_u32(self.obs_point_id);
        buf.put_u8(self.direction);
        buf.put_slice(&self.src_mac);
        buf.put_slice(&self.dst_mac);
        buf.put_u16(self.eth_type);
        buf.put_u8(self.eth_hdlen);
        buf.put_u8(self.ip_version);
        buf.put_u8(self.ip_ttl);
        buf.put_u8(self.ip_proto);
        buf.put_u8(self.dscp);
        buf.put_u8(self.ip_precedence);
        buf.put_u8(self.ip_tos);
        buf.put_slice(&self.src_ip);
        buf.put_slice(&self.dst_ip);
        buf.put_u8(self.icmp_type);
        buf.put_u8(self.icmp_code);
        buf.put_u32(self.start_time);
        buf.put_u32(self.end_time);
        buf.put_u64(self.packets);
        buf.put_u64(self.octet_delta_count);
        buf.put_u8(self.flow_end_reason);
        buf.put_u64(self.octets);
        buf.put_u64(self.delta_octets_squared);
        buf.put_u64(self.min_len);
        buf.put_u64(self.max_len);
        buf
    }

    /// Deserialize a record from the first [`LEN`](Self::LEN) bytes of `body`.
    ///
    /// # Errors
    ///
    /// [`TypeError::ShortBody`] if `body` is shorter than 93 bytes.
    pub fn decode_body(body: &[u8]) -> Result<Self, TypeError> {
        if body.len() < Self::LEN {
            return Err(TypeError::ShortBody {
                record: "icmp",
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
        let eth_type = buf.get_u16();
        let eth_hdlen = buf.get_u8();
        let ip_version = buf.get_u8();
        let ip_ttl = buf.get_u8();
        let ip_proto = buf.get_u8();
        let dscp = buf.get_u8();
        let ip_precedence = buf.get_u8();
        let ip_tos = buf.get_u8();
        let mut src_ip = [0u8; 4];
        buf.copy_to_slice(&mut src_ip);
        let mut dst_ip = [0u8; 4];
        buf.copy_to_slice(&mut dst_ip);

        Ok(Self {
            obs_point_id,
            direction,
            src_mac,
            dst_mac,
            eth_type,
            eth_hdlen,
            ip_version,
            ip_ttl,
            ip_proto,
            dscp,
            ip_precedence,
            ip_tos,
            src_ip,
            dst_ip,
            icmp_type: buf.get_u8(),
            icmp_code: buf.get_u8(),
            start_time: buf.get_u32(),
            end_time: buf.get_u32(),
            packets: buf.get_u64(),
            octet_delta_count: buf.get_u64(),
            flow_end_reason: buf.get_u8(),
            octets: buf.get_u64(),
            delta_octets_squared: buf.get_u64(),
            min_len: buf.get_u64(),
            max_len: buf.get_u64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_fixed_offsets() {
        let mut body = vec![0u8; IcmpRecord::LEN];
        body[0..4].copy_from_slice(&7u32.to_be_bytes());
        body[20] = 4; // ip_version
        body[21] = 64; // ttl
        body[22] = 1; // proto
        body[26..30].copy_from_slice(&[10, 0, 0, 1]);
        body[30..34].copy_from_slice(&[10, 0, 0, 2]);
        body[34] = 8; // echo request
        body[35] = 0;
        body[44..52].copy_from_slice(&3u64.to_be_bytes());
        body[60] = 2;
        body[61..69].copy_from_slice(&252u64.to_be_bytes());
        body[77..85].copy_from_slice(&84u64.to_be_bytes());
        body[85..93].copy_from_slice(&84u64.to_be_bytes());

        let record = IcmpRecord::decode_body(&body).unwrap();
        assert_eq!(record.obs_point_id, 7);
        assert_eq!(record.ip_version, 4);
        assert_eq!(record.ip_ttl, 64);
        assert_eq!(record.ip_proto, 1);
        assert_eq!(record.src_ip, [10, 0, 0, 1]);
        assert_eq!(record.dst_ip, [10, 0, 0, 2]);
        assert_eq!(record.icmp_type, 8);
        assert_eq!(record.packets, 3);
        assert_eq!(record.flow_end_reason, 2);
        assert_eq!(record.octets, 252);
        assert_eq!(record.min_len, 84);
        assert_eq!(record.max_len, 84);
    }

    #[test]
    fn encode_is_wire_length() {
        let record = IcmpRecord {
            max_len: u64::MAX,
            ..IcmpRecord::default()
        };
        let body = record.encode_body();
        assert_eq!(body.len(), IcmpRecord::LEN);
        assert_eq!(&body[85..93], &[0xFF; 8]);
    }

    #[test]
    fn rejects_short_body() {
        let body = [0u8; 92];
        assert!(matches!(
            IcmpRecord::decode_body(&body),
            Err(TypeError::ShortBody { needed: 93, available: 92, .. })
        ));
    }
}
