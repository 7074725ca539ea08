//! Descriptor loops attached to PMT elementary stream entries.

/// Registration descriptor (ISO/IEC 13818-1)
pub const TAG_REGISTRATION: u8 = 0x05;
/// ISO 639 language descriptor
pub const TAG_ISO_639_LANGUAGE: u8 = 0x0A;
/// DVB teletext descriptor
pub const TAG_TELETEXT: u8 = 0x56;
/// DVB subtitling descriptor
pub const TAG_SUBTITLING: u8 = 0x59;
/// DVB AC-3 descriptor
pub const TAG_AC3: u8 = 0x6A;
/// DVB enhanced AC-3 descriptor
pub const TAG_ENHANCED_AC3: u8 = 0x7A;
/// DVB DTS descriptor
pub const TAG_DTS: u8 = 0x7B;
/// DVB AAC descriptor
pub const TAG_AAC: u8 = 0x7C;

/// A single descriptor borrowed from a descriptor loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor<'a> {
    pub tag: u8,
    pub data: &'a [u8],
}

impl Descriptor<'_> {
    /// The four-character format identifier of a registration descriptor
    pub fn format_identifier(&self) -> Option<[u8; 4]> {
        if self.tag != TAG_REGISTRATION || self.data.len() < 4 {
            return None;
        }
        Some([self.data[0], self.data[1], self.data[2], self.data[3]])
    }
}

/// Iterates a descriptor loop; stops at the first truncated entry
#[derive(Debug, Clone)]
pub struct Descriptors<'a> {
    data: &'a [u8],
}

impl<'a> Descriptors<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl<'a> Iterator for Descriptors<'a> {
    type Item = Descriptor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.len() < 2 {
            return None;
        }
        let tag = self.data[0];
        let length = self.data[1] as usize;
        if self.data.len() < 2 + length {
            self.data = &[];
            return None;
        }
        let descriptor = Descriptor {
            tag,
            data: &self.data[2..2 + length],
        };
        self.data = &self.data[2 + length..];
        Some(descriptor)
    }
}
