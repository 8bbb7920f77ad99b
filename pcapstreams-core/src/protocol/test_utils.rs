//! Test utilities for protocol decoding and ingestion.
//!
//! Builders for raw frames (Ethernet, IPv4, IPv6, TCP, UDP, ICMP, DNS) and
//! a [`PcapFileBuilder`] that writes a legacy PCAP file around them.
//! Checksums are left zero; none of the decoders verify them.

use std::net::Ipv6Addr;

/// Builder for Ethernet II frames.
#[derive(Debug, Clone)]
pub struct EthernetBuilder {
    src_mac: [u8; 6],
    dst_mac: [u8; 6],
    ethertype: u16,
    payload: Vec<u8>,
}

impl Default for EthernetBuilder {
    fn default() -> Self {
        Self {
            src_mac: [0x00, 0x11, 0x22, 0x33, 0x44, 0x55],
            dst_mac: [0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb],
            ethertype: 0x0800,
            payload: Vec::new(),
        }
    }
}

impl EthernetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_mac(mut self, mac: [u8; 6]) -> Self {
        self.src_mac = mac;
        self
    }

    pub fn dst_mac(mut self, mac: [u8; 6]) -> Self {
        self.dst_mac = mac;
        self
    }

    pub fn ethertype(mut self, ethertype: u16) -> Self {
        self.ethertype = ethertype;
        self
    }

    pub fn ipv4(self) -> Self {
        self.ethertype(0x0800)
    }

    pub fn ipv6(self) -> Self {
        self.ethertype(0x86DD)
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(14 + self.payload.len());
        frame.extend_from_slice(&self.dst_mac);
        frame.extend_from_slice(&self.src_mac);
        frame.extend_from_slice(&self.ethertype.to_be_bytes());
        frame.extend_from_slice(&self.payload);
        frame
    }
}

/// Builder for IPv4 datagrams (20-byte header, no options).
#[derive(Debug, Clone)]
pub struct Ipv4Builder {
    ttl: u8,
    protocol: u8,
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    payload: Vec<u8>,
}

impl Default for Ipv4Builder {
    fn default() -> Self {
        Self {
            ttl: 64,
            protocol: 6,
            src_ip: [192, 168, 1, 1],
            dst_ip: [192, 168, 1, 2],
            payload: Vec::new(),
        }
    }
}

impl Ipv4Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(mut self, ttl: u8) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn protocol(mut self, protocol: u8) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn tcp(self) -> Self {
        self.protocol(6)
    }

    pub fn udp(self) -> Self {
        self.protocol(17)
    }

    pub fn icmp(self) -> Self {
        self.protocol(1)
    }

    pub fn src_ip(mut self, ip: [u8; 4]) -> Self {
        self.src_ip = ip;
        self
    }

    pub fn dst_ip(mut self, ip: [u8; 4]) -> Self {
        self.dst_ip = ip;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let total_length = 20 + self.payload.len() as u16;
        let mut packet = Vec::with_capacity(total_length as usize);

        packet.push(0x45); // Version 4, IHL 5
        packet.push(0x00); // DSCP/ECN
        packet.extend_from_slice(&total_length.to_be_bytes());
        packet.extend_from_slice(&[0x00, 0x01]); // Identification
        packet.extend_from_slice(&[0x00, 0x00]); // Flags + fragment offset
        packet.push(self.ttl);
        packet.push(self.protocol);
        packet.extend_from_slice(&[0x00, 0x00]); // Checksum
        packet.extend_from_slice(&self.src_ip);
        packet.extend_from_slice(&self.dst_ip);
        packet.extend_from_slice(&self.payload);

        packet
    }
}

/// Builder for IPv6 packets (fixed header only; extension headers go in the payload).
#[derive(Debug, Clone)]
pub struct Ipv6Builder {
    next_header: u8,
    hop_limit: u8,
    src_ip: Ipv6Addr,
    dst_ip: Ipv6Addr,
    payload: Vec<u8>,
}

impl Default for Ipv6Builder {
    fn default() -> Self {
        Self {
            next_header: 6,
            hop_limit: 64,
            src_ip: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1),
            dst_ip: Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 2),
            payload: Vec::new(),
        }
    }
}

impl Ipv6Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_header(mut self, next_header: u8) -> Self {
        self.next_header = next_header;
        self
    }

    pub fn hop_limit(mut self, hop_limit: u8) -> Self {
        self.hop_limit = hop_limit;
        self
    }

    pub fn src_ip(mut self, ip: Ipv6Addr) -> Self {
        self.src_ip = ip;
        self
    }

    pub fn dst_ip(mut self, ip: Ipv6Addr) -> Self {
        self.dst_ip = ip;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(40 + self.payload.len());

        packet.extend_from_slice(&[0x60, 0x00, 0x00, 0x00]); // Version 6, class 0, flow 0
        packet.extend_from_slice(&(self.payload.len() as u16).to_be_bytes());
        packet.push(self.next_header);
        packet.push(self.hop_limit);
        packet.extend_from_slice(&self.src_ip.octets());
        packet.extend_from_slice(&self.dst_ip.octets());
        packet.extend_from_slice(&self.payload);

        packet
    }
}

/// Builder for TCP segments (20-byte header, no options).
#[derive(Debug, Clone)]
pub struct TcpBuilder {
    src_port: u16,
    dst_port: u16,
    seq: u32,
    ack: u32,
    flags: u8,
    payload: Vec<u8>,
}

impl Default for TcpBuilder {
    fn default() -> Self {
        Self {
            src_port: 12345,
            dst_port: 80,
            seq: 1,
            ack: 0,
            flags: 0x02,
            payload: Vec::new(),
        }
    }
}

impl TcpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_port(mut self, port: u16) -> Self {
        self.src_port = port;
        self
    }

    pub fn dst_port(mut self, port: u16) -> Self {
        self.dst_port = port;
        self
    }

    pub fn seq(mut self, seq: u32) -> Self {
        self.seq = seq;
        self
    }

    pub fn ack_num(mut self, ack: u32) -> Self {
        self.ack = ack;
        self
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn syn(self) -> Self {
        self.flags(0x02)
    }

    pub fn syn_ack(self) -> Self {
        self.flags(0x12)
    }

    pub fn ack(self) -> Self {
        self.flags(0x10)
    }

    pub fn psh_ack(self) -> Self {
        self.flags(0x18)
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut segment = Vec::with_capacity(20 + self.payload.len());

        segment.extend_from_slice(&self.src_port.to_be_bytes());
        segment.extend_from_slice(&self.dst_port.to_be_bytes());
        segment.extend_from_slice(&self.seq.to_be_bytes());
        segment.extend_from_slice(&self.ack.to_be_bytes());
        segment.push(5 << 4); // Data offset 5 words
        segment.push(self.flags);
        segment.extend_from_slice(&65535u16.to_be_bytes()); // Window
        segment.extend_from_slice(&[0x00, 0x00]); // Checksum
        segment.extend_from_slice(&[0x00, 0x00]); // Urgent pointer
        segment.extend_from_slice(&self.payload);

        segment
    }
}

/// Builder for UDP datagrams.
#[derive(Debug, Clone)]
pub struct UdpBuilder {
    src_port: u16,
    dst_port: u16,
    payload: Vec<u8>,
}

impl Default for UdpBuilder {
    fn default() -> Self {
        Self {
            src_port: 12345,
            dst_port: 9999,
            payload: Vec::new(),
        }
    }
}

impl UdpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn src_port(mut self, port: u16) -> Self {
        self.src_port = port;
        self
    }

    pub fn dst_port(mut self, port: u16) -> Self {
        self.dst_port = port;
        self
    }

    pub fn dns(self) -> Self {
        self.dst_port(53)
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let length = 8 + self.payload.len() as u16;
        let mut datagram = Vec::with_capacity(length as usize);

        datagram.extend_from_slice(&self.src_port.to_be_bytes());
        datagram.extend_from_slice(&self.dst_port.to_be_bytes());
        datagram.extend_from_slice(&length.to_be_bytes());
        datagram.extend_from_slice(&[0x00, 0x00]); // Checksum
        datagram.extend_from_slice(&self.payload);

        datagram
    }
}

/// Builder for ICMP messages.
#[derive(Debug, Clone)]
pub struct IcmpBuilder {
    icmp_type: u8,
    code: u8,
    identifier: u16,
    sequence: u16,
    payload: Vec<u8>,
}

impl Default for IcmpBuilder {
    fn default() -> Self {
        Self {
            icmp_type: 8,
            code: 0,
            identifier: 1,
            sequence: 1,
            payload: Vec::new(),
        }
    }
}

impl IcmpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echo_request(mut self) -> Self {
        self.icmp_type = 8;
        self.code = 0;
        self
    }

    pub fn echo_reply(mut self) -> Self {
        self.icmp_type = 0;
        self.code = 0;
        self
    }

    pub fn destination_unreachable(mut self, code: u8) -> Self {
        self.icmp_type = 3;
        self.code = code;
        self
    }

    pub fn identifier(mut self, id: u16) -> Self {
        self.identifier = id;
        self
    }

    pub fn sequence(mut self, seq: u16) -> Self {
        self.sequence = seq;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut message = Vec::with_capacity(8 + self.payload.len());

        message.push(self.icmp_type);
        message.push(self.code);
        message.extend_from_slice(&[0x00, 0x00]); // Checksum
        message.extend_from_slice(&self.identifier.to_be_bytes());
        message.extend_from_slice(&self.sequence.to_be_bytes());
        message.extend_from_slice(&self.payload);

        message
    }
}

/// Builder for DNS messages with a single question.
#[derive(Debug, Clone)]
pub struct DnsBuilder {
    transaction_id: u16,
    flags: u16,
    name: String,
}

impl DnsBuilder {
    /// Standard recursive A query for `name`.
    pub fn query(transaction_id: u16, name: &str) -> Self {
        Self {
            transaction_id,
            flags: 0x0100, // RD
            name: name.to_string(),
        }
    }

    /// Turn the message into a response with the given RCODE.
    pub fn response(mut self, rcode: u8) -> Self {
        self.flags |= 0x8080 | (rcode as u16 & 0x000F);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut message = Vec::with_capacity(12 + self.name.len() + 6);

        message.extend_from_slice(&self.transaction_id.to_be_bytes());
        message.extend_from_slice(&self.flags.to_be_bytes());
        message.extend_from_slice(&1u16.to_be_bytes()); // QDCOUNT
        message.extend_from_slice(&[0x00; 6]); // ANCOUNT, NSCOUNT, ARCOUNT

        for label in self.name.split('.').filter(|l| !l.is_empty()) {
            message.push(label.len() as u8);
            message.extend_from_slice(label.as_bytes());
        }
        message.push(0x00);
        message.extend_from_slice(&1u16.to_be_bytes()); // QTYPE A
        message.extend_from_slice(&1u16.to_be_bytes()); // QCLASS IN

        message
    }
}

/// Build a complete Ethernet/IPv4/TCP frame.
pub fn build_tcp_packet(
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    src_port: u16,
    dst_port: u16,
    flags: u8,
    payload: &[u8],
) -> Vec<u8> {
    let tcp = TcpBuilder::new()
        .src_port(src_port)
        .dst_port(dst_port)
        .flags(flags)
        .payload(payload.to_vec())
        .build();

    let ipv4 = Ipv4Builder::new()
        .src_ip(src_ip)
        .dst_ip(dst_ip)
        .tcp()
        .payload(tcp)
        .build();

    EthernetBuilder::new().ipv4().payload(ipv4).build()
}

/// Build a complete Ethernet/IPv4/UDP frame.
pub fn build_udp_packet(
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    src_port: u16,
    dst_port: u16,
    payload: Vec<u8>,
) -> Vec<u8> {
    let udp = UdpBuilder::new()
        .src_port(src_port)
        .dst_port(dst_port)
        .payload(payload)
        .build();

    let ipv4 = Ipv4Builder::new()
        .src_ip(src_ip)
        .dst_ip(dst_ip)
        .udp()
        .payload(udp)
        .build();

    EthernetBuilder::new().ipv4().payload(ipv4).build()
}

/// Build a complete Ethernet/IPv4/ICMP echo request.
pub fn build_icmp_echo_request(src_ip: [u8; 4], dst_ip: [u8; 4], id: u16, seq: u16) -> Vec<u8> {
    let icmp = IcmpBuilder::new()
        .echo_request()
        .identifier(id)
        .sequence(seq)
        .build();

    let ipv4 = Ipv4Builder::new()
        .src_ip(src_ip)
        .dst_ip(dst_ip)
        .icmp()
        .payload(icmp)
        .build();

    EthernetBuilder::new().ipv4().payload(ipv4).build()
}

/// Writes a legacy (little-endian) PCAP file in memory.
#[derive(Debug, Clone)]
pub struct PcapFileBuilder {
    link_type: u32,
    nanosecond: bool,
    records: Vec<(u32, u32, u32, Vec<u8>)>,
}

impl Default for PcapFileBuilder {
    fn default() -> Self {
        Self {
            link_type: 1,
            nanosecond: false,
            records: Vec::new(),
        }
    }
}

impl PcapFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link_type(mut self, link_type: u32) -> Self {
        self.link_type = link_type;
        self
    }

    /// Use the nanosecond-resolution magic number.
    pub fn nanosecond(mut self) -> Self {
        self.nanosecond = true;
        self
    }

    /// Add a record; `ts_frac` is micro- or nanoseconds depending on resolution.
    pub fn packet(self, ts_sec: u32, ts_frac: u32, data: Vec<u8>) -> Self {
        let len = data.len() as u32;
        self.snapped_packet(ts_sec, ts_frac, len, data)
    }

    /// Add a record whose original length exceeds the captured bytes.
    pub fn snapped_packet(mut self, ts_sec: u32, ts_frac: u32, orig_len: u32, data: Vec<u8>) -> Self {
        self.records.push((ts_sec, ts_frac, orig_len, data));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let magic: u32 = if self.nanosecond { 0xa1b23c4d } else { 0xa1b2c3d4 };

        let mut file = Vec::new();
        file.extend_from_slice(&magic.to_le_bytes());
        file.extend_from_slice(&2u16.to_le_bytes()); // Version major
        file.extend_from_slice(&4u16.to_le_bytes()); // Version minor
        file.extend_from_slice(&0i32.to_le_bytes()); // Timezone
        file.extend_from_slice(&0u32.to_le_bytes()); // Sigfigs
        file.extend_from_slice(&65535u32.to_le_bytes()); // Snaplen
        file.extend_from_slice(&self.link_type.to_le_bytes());

        for (ts_sec, ts_frac, orig_len, data) in self.records {
            file.extend_from_slice(&ts_sec.to_le_bytes());
            file.extend_from_slice(&ts_frac.to_le_bytes());
            file.extend_from_slice(&(data.len() as u32).to_le_bytes());
            file.extend_from_slice(&orig_len.to_le_bytes());
            file.extend_from_slice(&data);
        }

        file
    }
}

/// Block queued by [`PcapNgFileBuilder`], written in insertion order.
#[derive(Debug, Clone)]
enum NgBlock {
    Interface {
        link_type: u16,
        tsresol: Option<u8>,
        tsoffset: Option<i64>,
    },
    Packet {
        if_id: u32,
        timestamp: u64,
        data: Vec<u8>,
    },
}

/// Writes a little-endian single-section PCAPNG file in memory.
#[derive(Debug, Clone, Default)]
pub struct PcapNgFileBuilder {
    blocks: Vec<NgBlock>,
}

impl PcapNgFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the next interface, in microseconds with no offset.
    pub fn interface(self, link_type: u16) -> Self {
        self.interface_with_clock(link_type, None, None)
    }

    /// Declare the next interface with explicit `if_tsresol` / `if_tsoffset` options.
    pub fn interface_with_clock(mut self, link_type: u16, tsresol: Option<u8>, tsoffset: Option<i64>) -> Self {
        self.blocks.push(NgBlock::Interface {
            link_type,
            tsresol,
            tsoffset,
        });
        self
    }

    /// Add an enhanced packet block; `timestamp` is in the interface's units.
    pub fn packet(mut self, if_id: u32, timestamp: u64, data: Vec<u8>) -> Self {
        self.blocks.push(NgBlock::Packet {
            if_id,
            timestamp,
            data,
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut file = Vec::new();

        // Section header: byte-order magic, version 1.0, unknown section length
        let mut shb = Vec::new();
        shb.extend_from_slice(&0x1a2b3c4du32.to_le_bytes());
        shb.extend_from_slice(&1u16.to_le_bytes());
        shb.extend_from_slice(&0u16.to_le_bytes());
        shb.extend_from_slice(&(-1i64).to_le_bytes());
        write_ng_block(&mut file, 0x0a0d0d0a, &shb);

        for block in self.blocks {
            match block {
                NgBlock::Interface {
                    link_type,
                    tsresol,
                    tsoffset,
                } => {
                    let mut body = Vec::new();
                    body.extend_from_slice(&link_type.to_le_bytes());
                    body.extend_from_slice(&0u16.to_le_bytes()); // Reserved
                    body.extend_from_slice(&65535u32.to_le_bytes()); // Snaplen
                    if let Some(resol) = tsresol {
                        write_ng_option(&mut body, 9, &[resol]);
                    }
                    if let Some(offset) = tsoffset {
                        write_ng_option(&mut body, 14, &offset.to_le_bytes());
                    }
                    if tsresol.is_some() || tsoffset.is_some() {
                        write_ng_option(&mut body, 0, &[]);
                    }
                    write_ng_block(&mut file, 1, &body);
                }
                NgBlock::Packet {
                    if_id,
                    timestamp,
                    data,
                } => {
                    let mut body = Vec::new();
                    body.extend_from_slice(&if_id.to_le_bytes());
                    body.extend_from_slice(&((timestamp >> 32) as u32).to_le_bytes());
                    body.extend_from_slice(&(timestamp as u32).to_le_bytes());
                    body.extend_from_slice(&(data.len() as u32).to_le_bytes()); // Captured
                    body.extend_from_slice(&(data.len() as u32).to_le_bytes()); // Original
                    body.extend_from_slice(&data);
                    pad_to_u32(&mut body);
                    write_ng_block(&mut file, 6, &body);
                }
            }
        }

        file
    }
}

fn write_ng_block(file: &mut Vec<u8>, block_type: u32, body: &[u8]) {
    let total_len = (body.len() + 12) as u32;
    file.extend_from_slice(&block_type.to_le_bytes());
    file.extend_from_slice(&total_len.to_le_bytes());
    file.extend_from_slice(body);
    file.extend_from_slice(&total_len.to_le_bytes());
}

fn write_ng_option(body: &mut Vec<u8>, code: u16, value: &[u8]) {
    body.extend_from_slice(&code.to_le_bytes());
    body.extend_from_slice(&(value.len() as u16).to_le_bytes());
    body.extend_from_slice(value);
    pad_to_u32(body);
}

fn pad_to_u32(buf: &mut Vec<u8>) {
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}
