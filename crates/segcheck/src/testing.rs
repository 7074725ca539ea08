//! Synthetic transport stream segments for tests.

use ts::{PID_NULL, PID_PAT, SYNC_BYTE, TS_PACKET_SIZE, psi::build_section};

/// PID carrying the PMT of program 1
pub const PMT_PID: u16 = 0x1000;
/// PID of the first elementary stream; later streams follow
pub const FIRST_ES_PID: u16 = 0x100;

fn packet(pid: u16, payload_unit_start: bool, continuity: u8, payload: &[u8]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(TS_PACKET_SIZE);
    packet.push(SYNC_BYTE);
    let pusi = if payload_unit_start { 0x40 } else { 0x00 };
    packet.push(pusi | ((pid >> 8) as u8 & 0x1F));
    packet.push(pid as u8);
    packet.push(0x10 | (continuity & 0x0F));
    packet.extend_from_slice(&payload[..payload.len().min(TS_PACKET_SIZE - 4)]);
    packet.resize(TS_PACKET_SIZE, 0xFF);
    packet
}

fn psi_packet(pid: u16, section: &[u8]) -> Vec<u8> {
    let mut payload = vec![0x00];
    payload.extend_from_slice(section);
    packet(pid, true, 0, &payload)
}

/// A segment whose single program declares one stream per entry of
/// `stream_types`, followed by a PES start for each stream and a null packet.
pub fn ts_segment(stream_types: &[u8]) -> Vec<u8> {
    let streams: Vec<(u8, &[u8])> = stream_types.iter().map(|&t| (t, &[][..])).collect();
    ts_segment_with_descriptors(&streams)
}

/// Like [`ts_segment`], with an ES info descriptor loop per stream
pub fn ts_segment_with_descriptors(streams: &[(u8, &[u8])]) -> Vec<u8> {
    let pat = build_section(0x00, 1, 0, &[0x00, 0x01, 0xE0 | (PMT_PID >> 8) as u8, PMT_PID as u8]);

    let mut body = vec![0xE0 | (FIRST_ES_PID >> 8) as u8, FIRST_ES_PID as u8, 0xF0, 0x00];
    for (i, (stream_type, es_info)) in streams.iter().enumerate() {
        let pid = FIRST_ES_PID + i as u16;
        body.push(*stream_type);
        body.push(0xE0 | (pid >> 8) as u8);
        body.push(pid as u8);
        body.push(0xF0 | (es_info.len() >> 8) as u8 & 0x0F);
        body.push(es_info.len() as u8);
        body.extend_from_slice(es_info);
    }
    let pmt = build_section(0x02, 1, 0, &body);

    let mut data = psi_packet(PID_PAT, &pat);
    data.extend(psi_packet(PMT_PID, &pmt));
    for i in 0..streams.len() {
        // PES start code, stream id, zero length
        let pes = [0x00, 0x00, 0x01, 0xE0 + i as u8, 0x00, 0x00, 0x80, 0x00, 0x00];
        data.extend(packet(FIRST_ES_PID + i as u16, true, 0, &pes));
    }
    data.extend(packet(PID_NULL, false, 0, &[]));
    data
}
