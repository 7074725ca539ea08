use crate::{Result, TsError};

/// Size of a transport stream packet in bytes
pub const TS_PACKET_SIZE: usize = 188;

/// Value of the first byte of every packet
pub const SYNC_BYTE: u8 = 0x47;

/// PAT PID (always 0x0000)
pub const PID_PAT: u16 = 0x0000;

/// NULL PID (always 0x1FFF)
pub const PID_NULL: u16 = 0x1FFF;

/// Borrowed view of a single transport stream packet
#[derive(Debug, Clone, Copy)]
pub struct TsPacket<'a> {
    /// Transport Error Indicator
    pub transport_error_indicator: bool,
    /// Payload Unit Start Indicator
    pub payload_unit_start_indicator: bool,
    /// Packet Identifier
    pub pid: u16,
    /// Transport Scrambling Control
    pub transport_scrambling_control: u8,
    /// Adaptation Field Control
    pub adaptation_field_control: u8,
    /// Continuity Counter
    pub continuity_counter: u8,
    /// Adaptation field bytes, without the length byte
    pub adaptation_field: Option<&'a [u8]>,
    /// Payload bytes
    pub payload: Option<&'a [u8]>,
}

impl<'a> TsPacket<'a> {
    /// Parse a TS packet from exactly 188 bytes
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() != TS_PACKET_SIZE {
            return Err(TsError::InvalidPacketSize(data.len()));
        }

        if data[0] != SYNC_BYTE {
            return Err(TsError::InvalidSyncByte(data[0]));
        }

        let transport_error_indicator = (data[1] & 0x80) != 0;
        let payload_unit_start_indicator = (data[1] & 0x40) != 0;
        let pid = ((data[1] as u16 & 0x1F) << 8) | data[2] as u16;
        let transport_scrambling_control = (data[3] >> 6) & 0x03;
        let adaptation_field_control = (data[3] >> 4) & 0x03;
        let continuity_counter = data[3] & 0x0F;

        let mut offset = 4;
        let mut adaptation_field = None;

        if adaptation_field_control & 0x02 != 0 {
            let length = data[offset] as usize;
            offset += 1;
            if offset + length > TS_PACKET_SIZE {
                return Err(TsError::InsufficientData {
                    expected: offset + length,
                    actual: TS_PACKET_SIZE,
                });
            }
            if length > 0 {
                adaptation_field = Some(&data[offset..offset + length]);
            }
            offset += length;
        }

        let payload = if adaptation_field_control & 0x01 != 0 && offset < TS_PACKET_SIZE {
            Some(&data[offset..])
        } else {
            None
        };

        Ok(TsPacket {
            transport_error_indicator,
            payload_unit_start_indicator,
            pid,
            transport_scrambling_control,
            adaptation_field_control,
            continuity_counter,
            adaptation_field,
            payload,
        })
    }

    /// Whether the payload is scrambled and cannot be read as PSI
    pub fn is_scrambled(&self) -> bool {
        self.transport_scrambling_control != 0
    }
}
