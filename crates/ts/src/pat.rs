use crate::{Result, TsError, psi::Section};

/// Table id of the Program Association Table
pub const TABLE_ID_PAT: u8 = 0x00;

/// Program Association Table (PAT) - Table ID 0x00
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pat {
    /// Transport Stream ID
    pub transport_stream_id: u16,
    /// Version number
    pub version_number: u8,
    /// Current/next indicator
    pub current_next_indicator: bool,
    /// Section carrying these programs
    pub section_number: u8,
    pub last_section_number: u8,
    /// List of programs
    pub programs: Vec<PatProgram>,
}

/// Program entry in PAT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatProgram {
    /// Program number (0 = Network PID, others = Program numbers)
    pub program_number: u16,
    /// PID of PMT (if program_number > 0) or Network PID (if program_number = 0)
    pub pmt_pid: u16,
}

impl Pat {
    /// Parse a PAT from a verified section
    pub fn from_section(section: &Section<'_>) -> Result<Self> {
        section.expect_table(TABLE_ID_PAT)?;

        if section.body.len() % 4 != 0 {
            return Err(TsError::InsufficientData {
                expected: section.body.len().next_multiple_of(4),
                actual: section.body.len(),
            });
        }

        let programs = section
            .body
            .chunks_exact(4)
            .map(|entry| PatProgram {
                program_number: ((entry[0] as u16) << 8) | entry[1] as u16,
                pmt_pid: ((entry[2] as u16 & 0x1F) << 8) | entry[3] as u16,
            })
            .collect();

        Ok(Pat {
            transport_stream_id: section.table_id_extension,
            version_number: section.version_number,
            current_next_indicator: section.current_next_indicator,
            section_number: section.section_number,
            last_section_number: section.last_section_number,
            programs,
        })
    }

    /// Parse a PAT from raw section bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::from_section(&Section::parse(data)?)
    }

    /// Get the Network PID (program number 0)
    pub fn network_pid(&self) -> Option<u16> {
        self.programs
            .iter()
            .find(|p| p.program_number == 0)
            .map(|p| p.pmt_pid)
    }

    /// Programs carrying a PMT, excluding the network entry
    pub fn programs(&self) -> impl Iterator<Item = &PatProgram> {
        self.programs.iter().filter(|p| p.program_number != 0)
    }

    /// Get the program number whose PMT travels on `pid`
    pub fn program_for_pmt_pid(&self, pid: u16) -> Option<u16> {
        self.programs()
            .find(|p| p.pmt_pid == pid)
            .map(|p| p.program_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::psi::build_section;

    #[test]
    fn test_pat_invalid_table_id() {
        let data = build_section(0x02, 1, 0, &[0x00, 0x01, 0xF0, 0x00]);
        assert!(matches!(
            Pat::parse(&data),
            Err(TsError::InvalidTableId { .. })
        ));
    }

    #[test]
    fn test_pat_insufficient_data() {
        let data = vec![0x00, 0x80];
        assert!(Pat::parse(&data).is_err());
    }

    #[test]
    fn test_pat_basic_parsing() {
        let body = [
            0x00, 0x00, 0xE0, 0x10, // network PID 0x0010
            0x00, 0x01, 0xF0, 0x00, // program 1 -> PMT PID 0x1000
        ];
        let data = build_section(TABLE_ID_PAT, 0x0001, 0, &body);

        let pat = Pat::parse(&data).unwrap();
        assert_eq!(pat.transport_stream_id, 0x0001);
        assert_eq!(pat.version_number, 0);
        assert!(pat.current_next_indicator);
        assert_eq!(pat.programs.len(), 2);
        assert_eq!(pat.network_pid(), Some(0x0010));
        assert_eq!(pat.programs().count(), 1);
        assert_eq!(pat.program_for_pmt_pid(0x1000), Some(1));
        assert_eq!(pat.program_for_pmt_pid(0x0010), None);
    }
}
