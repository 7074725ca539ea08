use std::fmt;

use crate::{
    Result, TsError,
    descriptor::{self, Descriptors},
    psi::Section,
};

/// Table id of the Program Map Table
pub const TABLE_ID_PMT: u8 = 0x02;

/// Stream types seen in HLS transport streams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamType {
    /// MPEG-1 Video
    Mpeg1Video,
    /// MPEG-2 Video
    Mpeg2Video,
    /// MPEG-1 Audio
    Mpeg1Audio,
    /// MPEG-2 Audio
    Mpeg2Audio,
    /// MPEG-2 Private PES packets, classified through descriptors
    PrivatePes,
    /// ADTS AAC Audio
    AdtsAac,
    /// MPEG-4 Visual
    Mpeg4Visual,
    /// LATM AAC Audio
    LatmAac,
    /// Metadata carried in PES packets (timed ID3)
    MetadataPes,
    /// AVC video stream
    H264,
    /// HEVC video stream
    H265,
    /// VVC video stream
    H266,
    /// AC-3 audio stream (ATSC)
    Ac3,
    /// DTS audio stream
    Dts,
    /// Dolby TrueHD audio stream
    TrueHd,
    /// E-AC-3 audio stream
    EAc3,
    /// SCTE-35 splice information
    Scte35,
    /// E-AC-3 audio stream (ATSC A/53)
    EAc3Atsc,
    /// HDMV presentation graphics subtitles
    HdmvPgs,
    /// SAMPLE-AES encrypted AC-3
    SampleAesAc3,
    /// SAMPLE-AES encrypted E-AC-3
    SampleAesEAc3,
    /// SAMPLE-AES encrypted AAC
    SampleAesAac,
    /// SAMPLE-AES encrypted H.264
    SampleAesH264,
    /// Any other stream type
    Other(u8),
}

impl From<u8> for StreamType {
    fn from(value: u8) -> Self {
        match value {
            0x01 => StreamType::Mpeg1Video,
            0x02 => StreamType::Mpeg2Video,
            0x03 => StreamType::Mpeg1Audio,
            0x04 => StreamType::Mpeg2Audio,
            0x06 => StreamType::PrivatePes,
            0x0F => StreamType::AdtsAac,
            0x10 => StreamType::Mpeg4Visual,
            0x11 => StreamType::LatmAac,
            0x15 => StreamType::MetadataPes,
            0x1B => StreamType::H264,
            0x24 => StreamType::H265,
            0x33 => StreamType::H266,
            0x81 => StreamType::Ac3,
            0x82 => StreamType::Dts,
            0x83 => StreamType::TrueHd,
            0x84 => StreamType::EAc3,
            0x86 => StreamType::Scte35,
            0x87 => StreamType::EAc3Atsc,
            0x90 => StreamType::HdmvPgs,
            0xC1 => StreamType::SampleAesAc3,
            0xC2 => StreamType::SampleAesEAc3,
            0xCF => StreamType::SampleAesAac,
            0xDB => StreamType::SampleAesH264,
            other => StreamType::Other(other),
        }
    }
}

impl StreamType {
    /// Kind implied by the stream type alone
    pub fn kind(&self) -> StreamKind {
        match self {
            StreamType::Mpeg1Video
            | StreamType::Mpeg2Video
            | StreamType::Mpeg4Visual
            | StreamType::H264
            | StreamType::H265
            | StreamType::H266
            | StreamType::SampleAesH264 => StreamKind::Video,
            StreamType::Mpeg1Audio
            | StreamType::Mpeg2Audio
            | StreamType::AdtsAac
            | StreamType::LatmAac
            | StreamType::Ac3
            | StreamType::Dts
            | StreamType::TrueHd
            | StreamType::EAc3
            | StreamType::EAc3Atsc
            | StreamType::SampleAesAc3
            | StreamType::SampleAesEAc3
            | StreamType::SampleAesAac => StreamKind::Audio,
            StreamType::HdmvPgs => StreamKind::Subtitle,
            StreamType::MetadataPes | StreamType::Scte35 => StreamKind::Data,
            StreamType::PrivatePes | StreamType::Other(_) => StreamKind::Unknown,
        }
    }

    /// Short codec label
    pub fn codec_name(&self) -> &'static str {
        match self {
            StreamType::Mpeg1Video => "mpeg1video",
            StreamType::Mpeg2Video => "mpeg2video",
            StreamType::Mpeg1Audio => "mp1",
            StreamType::Mpeg2Audio => "mp2",
            StreamType::PrivatePes => "private",
            StreamType::AdtsAac | StreamType::SampleAesAac => "aac",
            StreamType::Mpeg4Visual => "mpeg4",
            StreamType::LatmAac => "aac_latm",
            StreamType::MetadataPes => "timed_id3",
            StreamType::H264 | StreamType::SampleAesH264 => "h264",
            StreamType::H265 => "hevc",
            StreamType::H266 => "vvc",
            StreamType::Ac3 | StreamType::SampleAesAc3 => "ac3",
            StreamType::Dts => "dts",
            StreamType::TrueHd => "truehd",
            StreamType::EAc3 | StreamType::EAc3Atsc | StreamType::SampleAesEAc3 => "eac3",
            StreamType::Scte35 => "scte_35",
            StreamType::HdmvPgs => "hdmv_pgs",
            StreamType::Other(_) => "unknown",
        }
    }

    /// Raw stream_type value
    pub fn value(&self) -> u8 {
        match self {
            StreamType::Mpeg1Video => 0x01,
            StreamType::Mpeg2Video => 0x02,
            StreamType::Mpeg1Audio => 0x03,
            StreamType::Mpeg2Audio => 0x04,
            StreamType::PrivatePes => 0x06,
            StreamType::AdtsAac => 0x0F,
            StreamType::Mpeg4Visual => 0x10,
            StreamType::LatmAac => 0x11,
            StreamType::MetadataPes => 0x15,
            StreamType::H264 => 0x1B,
            StreamType::H265 => 0x24,
            StreamType::H266 => 0x33,
            StreamType::Ac3 => 0x81,
            StreamType::Dts => 0x82,
            StreamType::TrueHd => 0x83,
            StreamType::EAc3 => 0x84,
            StreamType::Scte35 => 0x86,
            StreamType::EAc3Atsc => 0x87,
            StreamType::HdmvPgs => 0x90,
            StreamType::SampleAesAc3 => 0xC1,
            StreamType::SampleAesEAc3 => 0xC2,
            StreamType::SampleAesAac => 0xCF,
            StreamType::SampleAesH264 => 0xDB,
            StreamType::Other(value) => *value,
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02x})", self.codec_name(), self.value())
    }
}

/// Media type of an elementary stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
    Unknown,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Video => "video",
            StreamKind::Audio => "audio",
            StreamKind::Subtitle => "subtitle",
            StreamKind::Data => "data",
            StreamKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elementary stream in PMT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementaryStream {
    /// Stream type
    pub stream_type: StreamType,
    /// Elementary PID
    pub elementary_pid: u16,
    /// ES info descriptors
    pub es_info: Vec<u8>,
}

impl ElementaryStream {
    /// Classify the stream, consulting descriptors for private PES streams
    pub fn kind(&self) -> StreamKind {
        match self.stream_type.kind() {
            StreamKind::Unknown => self.kind_from_descriptors(),
            kind => kind,
        }
    }

    pub fn descriptors(&self) -> Descriptors<'_> {
        Descriptors::new(&self.es_info)
    }

    fn kind_from_descriptors(&self) -> StreamKind {
        for descriptor in self.descriptors() {
            match descriptor.tag {
                descriptor::TAG_AC3
                | descriptor::TAG_ENHANCED_AC3
                | descriptor::TAG_DTS
                | descriptor::TAG_AAC => return StreamKind::Audio,
                descriptor::TAG_TELETEXT | descriptor::TAG_SUBTITLING => {
                    return StreamKind::Subtitle;
                }
                descriptor::TAG_REGISTRATION => {
                    if let Some(kind) = descriptor.format_identifier().and_then(registered_kind) {
                        return kind;
                    }
                }
                _ => {}
            }
        }
        StreamKind::Unknown
    }
}

/// Map a registration format identifier to a stream kind
fn registered_kind(format_identifier: [u8; 4]) -> Option<StreamKind> {
    match &format_identifier {
        b"AC-3" | b"EAC3" | b"AC-4" | b"DTS1" | b"DTS2" | b"DTS3" | b"Opus" | b"BSSD" => {
            Some(StreamKind::Audio)
        }
        b"HEVC" | b"AV01" | b"VC-1" | b"drac" => Some(StreamKind::Video),
        b"ID3 " | b"KLVA" | b"CUEI" => Some(StreamKind::Data),
        _ => None,
    }
}

/// Program Map Table (PMT) - Table ID 0x02
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pmt {
    /// Program number
    pub program_number: u16,
    /// Version number
    pub version_number: u8,
    /// PCR PID
    pub pcr_pid: u16,
    /// Program info descriptors
    pub program_info: Vec<u8>,
    /// Elementary streams
    pub streams: Vec<ElementaryStream>,
}

impl Pmt {
    /// Parse a PMT from a verified section
    pub fn from_section(section: &Section<'_>) -> Result<Self> {
        section.expect_table(TABLE_ID_PMT)?;

        let body = section.body;
        if body.len() < 4 {
            return Err(TsError::InsufficientData {
                expected: 4,
                actual: body.len(),
            });
        }

        let pcr_pid = ((body[0] as u16 & 0x1F) << 8) | body[1] as u16;
        let program_info_length = (((body[2] as u16 & 0x0F) << 8) | body[3] as u16) as usize;
        let mut offset = 4;

        if offset + program_info_length > body.len() {
            return Err(TsError::InsufficientData {
                expected: offset + program_info_length,
                actual: body.len(),
            });
        }
        let program_info = body[offset..offset + program_info_length].to_vec();
        offset += program_info_length;

        let mut streams = Vec::new();
        while offset + 5 <= body.len() {
            let stream_type = StreamType::from(body[offset]);
            let elementary_pid = ((body[offset + 1] as u16 & 0x1F) << 8) | body[offset + 2] as u16;
            let es_info_length =
                (((body[offset + 3] as u16 & 0x0F) << 8) | body[offset + 4] as u16) as usize;
            offset += 5;

            if offset + es_info_length > body.len() {
                return Err(TsError::InsufficientData {
                    expected: offset + es_info_length,
                    actual: body.len(),
                });
            }

            streams.push(ElementaryStream {
                stream_type,
                elementary_pid,
                es_info: body[offset..offset + es_info_length].to_vec(),
            });
            offset += es_info_length;
        }

        Ok(Pmt {
            program_number: section.table_id_extension,
            version_number: section.version_number,
            pcr_pid,
            program_info,
            streams,
        })
    }

    /// Parse a PMT from raw section bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::from_section(&Section::parse(data)?)
    }

    /// Streams of the given kind
    pub fn streams_of(&self, kind: StreamKind) -> impl Iterator<Item = &ElementaryStream> {
        self.streams.iter().filter(move |s| s.kind() == kind)
    }

    /// Get stream by PID
    pub fn get_stream(&self, pid: u16) -> Option<&ElementaryStream> {
        self.streams.iter().find(|s| s.elementary_pid == pid)
    }
}
