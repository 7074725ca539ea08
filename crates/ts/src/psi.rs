//! Long-form PSI sections and their reassembly from packet payloads.

use std::collections::HashMap;

use crate::{Result, TsError, crc::crc32_mpeg2};

/// Bytes preceding the section body: table_id through last_section_number
const HEADER_LEN: usize = 8;
const CRC_LEN: usize = 4;
/// Largest section_length allowed for PAT/PMT
const MAX_SECTION_LENGTH: u16 = 1021;

/// A verified long-form PSI section
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    pub table_id: u8,
    /// transport_stream_id for a PAT, program_number for a PMT
    pub table_id_extension: u16,
    pub version_number: u8,
    pub current_next_indicator: bool,
    pub section_number: u8,
    pub last_section_number: u8,
    /// Bytes between the header and the CRC
    pub body: &'a [u8],
}

impl<'a> Section<'a> {
    /// Parse and CRC-check a section starting at `data[0]`
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < 3 {
            return Err(TsError::InsufficientData {
                expected: 3,
                actual: data.len(),
            });
        }

        let table_id = data[0];
        if data[1] & 0x80 == 0 {
            return Err(TsError::MissingSectionSyntax(table_id));
        }

        let section_length = section_length(data);
        if (section_length as usize) < HEADER_LEN - 3 + CRC_LEN
            || section_length > MAX_SECTION_LENGTH
        {
            return Err(TsError::InvalidSectionLength(section_length));
        }

        let total = 3 + section_length as usize;
        if data.len() < total {
            return Err(TsError::InsufficientData {
                expected: total,
                actual: data.len(),
            });
        }

        let section = &data[..total];
        let crc_offset = total - CRC_LEN;
        let expected = u32::from_be_bytes([
            section[crc_offset],
            section[crc_offset + 1],
            section[crc_offset + 2],
            section[crc_offset + 3],
        ]);
        let calculated = crc32_mpeg2(&section[..crc_offset]);
        if expected != calculated {
            return Err(TsError::Crc32Mismatch {
                expected,
                calculated,
            });
        }

        Ok(Section {
            table_id,
            table_id_extension: ((section[3] as u16) << 8) | section[4] as u16,
            version_number: (section[5] >> 1) & 0x1F,
            current_next_indicator: (section[5] & 0x01) != 0,
            section_number: section[6],
            last_section_number: section[7],
            body: &section[HEADER_LEN..crc_offset],
        })
    }

    /// Check the table id before interpreting the body
    pub fn expect_table(&self, table_id: u8) -> Result<()> {
        if self.table_id != table_id {
            return Err(TsError::InvalidTableId {
                expected: table_id,
                actual: self.table_id,
            });
        }
        Ok(())
    }
}

#[inline]
fn section_length(data: &[u8]) -> u16 {
    ((data[1] as u16 & 0x0F) << 8) | data[2] as u16
}

/// Collects PSI sections that span several packets, per PID.
#[derive(Debug, Default)]
pub struct SectionAssembler {
    buffers: HashMap<u16, Vec<u8>>,
}

impl SectionAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the payload of one packet and return the sections it completed
    pub fn push(&mut self, pid: u16, payload_unit_start: bool, payload: &[u8]) -> Vec<Vec<u8>> {
        let mut complete = Vec::new();

        if payload_unit_start {
            let Some((&pointer, rest)) = payload.split_first() else {
                return complete;
            };
            let pointer = pointer as usize;
            if pointer > rest.len() {
                self.buffers.remove(&pid);
                return complete;
            }

            let (tail, head) = rest.split_at(pointer);
            if let Some(buffer) = self.buffers.get_mut(&pid) {
                if !buffer.is_empty() {
                    buffer.extend_from_slice(tail);
                    drain_sections(buffer, &mut complete);
                }
            }

            let buffer = self.buffers.entry(pid).or_default();
            buffer.clear();
            buffer.extend_from_slice(head);
            drain_sections(buffer, &mut complete);
        } else if let Some(buffer) = self.buffers.get_mut(&pid) {
            // A continuation is only meaningful while a section is open
            if !buffer.is_empty() {
                buffer.extend_from_slice(payload);
                drain_sections(buffer, &mut complete);
            }
        }

        complete
    }

    /// Drop the partially collected section of `pid`
    pub fn discard(&mut self, pid: u16) {
        self.buffers.remove(&pid);
    }
}

fn drain_sections(buffer: &mut Vec<u8>, out: &mut Vec<Vec<u8>>) {
    loop {
        match buffer.first() {
            None => return,
            // Stuffing: the rest of the payload carries no section
            Some(0xFF) => {
                buffer.clear();
                return;
            }
            Some(_) => {}
        }
        if buffer.len() < 3 {
            return;
        }
        let total = 3 + section_length(buffer) as usize;
        if buffer.len() < total {
            return;
        }
        out.push(buffer.drain(..total).collect());
    }
}

/// Build a complete section with a valid CRC, for tests and fixtures
#[doc(hidden)]
pub fn build_section(table_id: u8, table_id_extension: u16, version: u8, body: &[u8]) -> Vec<u8> {
    let section_length = (HEADER_LEN - 3 + body.len() + CRC_LEN) as u16;
    let mut section = Vec::with_capacity(3 + section_length as usize);
    section.push(table_id);
    section.push(0xB0 | ((section_length >> 8) as u8 & 0x0F));
    section.push(section_length as u8);
    section.extend_from_slice(&table_id_extension.to_be_bytes());
    section.push(0xC1 | ((version & 0x1F) << 1));
    section.push(0x00);
    section.push(0x00);
    section.extend_from_slice(body);
    let crc = crc32_mpeg2(&section);
    section.extend_from_slice(&crc.to_be_bytes());
    section
}
