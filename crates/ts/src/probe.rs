//! Stream discovery over a complete segment buffer.

use std::collections::{BTreeMap, BTreeSet};

use memchr::memchr;

use crate::{
    Result, TsError,
    packet::{PID_PAT, SYNC_BYTE, TS_PACKET_SIZE, TsPacket},
    pat::{Pat, TABLE_ID_PAT},
    pmt::{ElementaryStream, Pmt, StreamKind, TABLE_ID_PMT},
    psi::{Section, SectionAssembler},
};

/// Container formats recognised from the first bytes of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// MPEG-2 Transport Stream
    TransportStream,
    /// MP4 Fragment (fMP4/CMAF)
    FragmentedMp4,
    /// WebVTT subtitles
    WebVtt,
    /// Unknown format
    Unknown,
}

/// Detect the format of a media segment from its contents
pub fn detect_format(data: &[u8]) -> ContainerFormat {
    if data.first() == Some(&SYNC_BYTE)
        && (data.len() == TS_PACKET_SIZE || data.get(TS_PACKET_SIZE) == Some(&SYNC_BYTE))
    {
        return ContainerFormat::TransportStream;
    }

    if data.len() >= 8 {
        let box_type = &data[4..8];
        if box_type == b"ftyp" || box_type == b"styp" || box_type == b"moof" || box_type == b"moov"
        {
            return ContainerFormat::FragmentedMp4;
        }
    }

    if data.starts_with(b"WEBVTT") || data.starts_with(b"\xEF\xBB\xBFWEBVTT") {
        return ContainerFormat::WebVtt;
    }

    ContainerFormat::Unknown
}

/// One program and the elementary streams its PMT declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub program_number: u16,
    pub pmt_pid: u16,
    pub pcr_pid: u16,
    pub streams: Vec<ElementaryStream>,
}

/// Every elementary stream declared by the PSI tables of a buffer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamInventory {
    pub transport_stream_id: u16,
    pub programs: Vec<Program>,
    /// Number of 188-byte packets read before the tables were complete
    pub packets_scanned: usize,
}

impl StreamInventory {
    /// All elementary streams across programs, in PMT order
    pub fn streams(&self) -> impl Iterator<Item = &ElementaryStream> {
        self.programs.iter().flat_map(|p| p.streams.iter())
    }

    pub fn has_kind(&self, kind: StreamKind) -> bool {
        self.streams().any(|s| s.kind() == kind)
    }

    pub fn has_video(&self) -> bool {
        self.has_kind(StreamKind::Video)
    }

    pub fn has_audio(&self) -> bool {
        self.has_kind(StreamKind::Audio)
    }
}

/// Open `data` as a transport stream and list the streams it declares.
///
/// Scanning stops as soon as the PAT and the PMT of every announced program
/// have been read. Sections failing their CRC are skipped.
pub fn probe_streams(data: &[u8]) -> Result<StreamInventory> {
    if data.is_empty() {
        return Err(TsError::EmptyInput);
    }

    match detect_format(data) {
        ContainerFormat::FragmentedMp4 => {
            return Err(TsError::UnsupportedFormat("fragmented MP4"));
        }
        ContainerFormat::WebVtt => return Err(TsError::UnsupportedFormat("WebVTT")),
        ContainerFormat::TransportStream | ContainerFormat::Unknown => {}
    }

    let mut prober = StreamProber::default();
    let mut remaining = data;

    while !prober.is_complete() {
        let Some(sync_offset) = memchr(SYNC_BYTE, remaining) else {
            break;
        };
        remaining = &remaining[sync_offset..];
        if remaining.len() < TS_PACKET_SIZE {
            break;
        }

        // Require the next packet to be aligned too, unless this is the last one
        let aligned = remaining.len() == TS_PACKET_SIZE
            || remaining.get(TS_PACKET_SIZE) == Some(&SYNC_BYTE);
        if !aligned {
            remaining = &remaining[1..];
            continue;
        }

        match TsPacket::parse(&remaining[..TS_PACKET_SIZE]) {
            Ok(packet) => {
                prober.process_packet(&packet);
                remaining = &remaining[TS_PACKET_SIZE..];
            }
            Err(_) => remaining = &remaining[1..],
        }
    }

    prober.finish(data.len())
}

#[derive(Debug, Default)]
struct StreamProber {
    /// Programs merged from every PAT section of the current version
    pat: Option<Pat>,
    pat_sections: BTreeSet<u8>,
    /// PMTs keyed by program number
    pmts: BTreeMap<u16, Pmt>,
    assembler: SectionAssembler,
    packets: usize,
}

impl StreamProber {
    fn is_complete(&self) -> bool {
        match &self.pat {
            Some(pat) => {
                self.pat_sections.len() > pat.last_section_number as usize
                    && pat.programs().next().is_some()
                    && pat
                        .programs()
                        .all(|p| self.pmts.contains_key(&p.program_number))
            }
            None => false,
        }
    }

    fn process_packet(&mut self, packet: &TsPacket<'_>) {
        self.packets += 1;

        if packet.transport_error_indicator || packet.is_scrambled() {
            return;
        }
        if packet.pid != PID_PAT && !self.is_pmt_pid(packet.pid) {
            return;
        }
        let Some(payload) = packet.payload else {
            return;
        };

        for section in
            self.assembler
                .push(packet.pid, packet.payload_unit_start_indicator, payload)
        {
            self.process_section(packet.pid, &section);
        }
    }

    fn is_pmt_pid(&self, pid: u16) -> bool {
        self.pat
            .as_ref()
            .is_some_and(|pat| pat.program_for_pmt_pid(pid).is_some())
    }

    fn process_section(&mut self, pid: u16, data: &[u8]) {
        // Corrupt sections are skipped like a demuxer would; later repeats may be intact
        let Ok(section) = Section::parse(data) else {
            return;
        };
        if !section.current_next_indicator {
            return;
        }

        match (pid, section.table_id) {
            (PID_PAT, TABLE_ID_PAT) => {
                if let Ok(pat) = Pat::from_section(&section) {
                    self.accept_pat(pat);
                }
            }
            (_, TABLE_ID_PMT) => {
                let Some(program_number) = self
                    .pat
                    .as_ref()
                    .and_then(|pat| pat.program_for_pmt_pid(pid))
                else {
                    return;
                };
                if let Ok(pmt) = Pmt::from_section(&section) {
                    if pmt.program_number == program_number {
                        self.pmts.insert(program_number, pmt);
                    }
                }
            }
            _ => {}
        }
    }

    fn accept_pat(&mut self, pat: Pat) {
        let same_table = self.pat.as_ref().is_some_and(|current| {
            current.version_number == pat.version_number
                && current.transport_stream_id == pat.transport_stream_id
        });

        if same_table {
            if self.pat_sections.insert(pat.section_number) {
                if let Some(current) = self.pat.as_mut() {
                    current.programs.extend(pat.programs);
                }
            }
            return;
        }

        // A new table version makes earlier PMTs stale
        if let Some(previous) = self.pat.take() {
            for program in previous.programs() {
                self.assembler.discard(program.pmt_pid);
            }
        }
        self.pmts.clear();
        self.pat_sections = BTreeSet::from([pat.section_number]);
        self.pat = Some(pat);
    }

    fn finish(self, input_len: usize) -> Result<StreamInventory> {
        let Some(pat) = self.pat else {
            if self.packets == 0 {
                return Err(TsError::NoPackets(input_len));
            }
            return Err(TsError::MissingPat);
        };

        let mut pmts = self.pmts;
        let programs: Vec<Program> = pat
            .programs()
            .filter_map(|entry| {
                pmts.remove(&entry.program_number).map(|pmt| Program {
                    program_number: entry.program_number,
                    pmt_pid: entry.pmt_pid,
                    pcr_pid: pmt.pcr_pid,
                    streams: pmt.streams,
                })
            })
            .collect();

        if programs.is_empty() {
            return Err(TsError::MissingPmt(pat.programs().count()));
        }

        Ok(StreamInventory {
            transport_stream_id: pat.transport_stream_id,
            programs,
            packets_scanned: self.packets,
        })
    }
}
