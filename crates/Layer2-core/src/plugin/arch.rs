//! Binary Architecture - 플러그인 바이너리 헤더 검사
//!
//! 동적 바인딩 전에 바이너리의 대상 아키텍처를 읽어
//! 현재 프로세스와 일치하는지 확인합니다.
//! ELF (`e_machine`), PE (`IMAGE_FILE_HEADER.Machine`), Mach-O (`cputype`, fat 포함)를 인식합니다.

use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// 바이너리 대상 아키텍처
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Machine {
    X86,
    X86_64,
    Arm,
    Aarch64,
    Unknown,
}

impl Machine {
    /// 현재 프로세스의 아키텍처
    pub fn current() -> Self {
        if cfg!(target_arch = "x86_64") {
            Machine::X86_64
        } else if cfg!(target_arch = "x86") {
            Machine::X86
        } else if cfg!(target_arch = "aarch64") {
            Machine::Aarch64
        } else if cfg!(target_arch = "arm") {
            Machine::Arm
        } else {
            Machine::Unknown
        }
    }

    /// 현재 프로세스에 로드 가능한지 (Unknown 은 항상 불일치)
    pub fn is_compatible(&self) -> bool {
        *self != Machine::Unknown && *self == Machine::current()
    }

    fn from_elf(e_machine: u16) -> Self {
        match e_machine {
            3 => Machine::X86,
            40 => Machine::Arm,
            62 => Machine::X86_64,
            183 => Machine::Aarch64,
            _ => Machine::Unknown,
        }
    }

    fn from_pe(machine: u16) -> Self {
        match machine {
            0x014c => Machine::X86,
            0x01c0 | 0x01c4 => Machine::Arm,
            0x8664 => Machine::X86_64,
            0xaa64 => Machine::Aarch64,
            _ => Machine::Unknown,
        }
    }

    fn from_macho(cputype: u32) -> Self {
        match cputype {
            7 => Machine::X86,
            12 => Machine::Arm,
            0x0100_0007 => Machine::X86_64,
            0x0100_000c => Machine::Aarch64,
            _ => Machine::Unknown,
        }
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Machine::X86 => write!(f, "32-bit x86"),
            Machine::X86_64 => write!(f, "64-bit x64"),
            Machine::Arm => write!(f, "32-bit ARM"),
            Machine::Aarch64 => write!(f, "ARM64"),
            Machine::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// 헤더 파싱
// ============================================================================

const HEADER_PROBE_LEN: u64 = 4096;

/// 파일 헤더에서 아키텍처 읽기 (읽기 실패나 미인식 포맷은 Unknown)
pub fn read_machine(path: &Path) -> Machine {
    match probe(path) {
        Ok(machine) => machine,
        Err(e) => {
            debug!("Cannot read binary header of {}: {}", path.display(), e);
            Machine::Unknown
        }
    }
}

fn probe(path: &Path) -> std::io::Result<Machine> {
    let mut file = File::open(path)?;
    let mut header = Vec::new();
    (&mut file).take(HEADER_PROBE_LEN).read_to_end(&mut header)?;

    if header.starts_with(b"\x7fELF") {
        return Ok(parse_elf(&header));
    }
    if header.starts_with(b"MZ") {
        return parse_pe(&mut file, &header);
    }
    Ok(parse_macho(&header))
}

fn parse_elf(header: &[u8]) -> Machine {
    // EI_DATA: 1 = little endian, 2 = big endian
    let (Some(&data), Some(raw)) = (header.get(5), header.get(18..20)) else {
        return Machine::Unknown;
    };
    let e_machine = match data {
        1 => u16::from_le_bytes([raw[0], raw[1]]),
        2 => u16::from_be_bytes([raw[0], raw[1]]),
        _ => return Machine::Unknown,
    };
    Machine::from_elf(e_machine)
}

fn parse_pe(file: &mut File, header: &[u8]) -> std::io::Result<Machine> {
    let Some(raw) = header.get(0x3c..0x40) else {
        return Ok(Machine::Unknown);
    };
    let e_lfanew = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as u64;

    let mut nt = [0u8; 6];
    file.seek(SeekFrom::Start(e_lfanew))?;
    if file.read_exact(&mut nt).is_err() || &nt[..4] != b"PE\0\0" {
        return Ok(Machine::Unknown);
    }
    Ok(Machine::from_pe(u16::from_le_bytes([nt[4], nt[5]])))
}

fn parse_macho(header: &[u8]) -> Machine {
    let Some(magic) = header.get(0..4) else {
        return Machine::Unknown;
    };
    let read_u32 = |offset: usize, big_endian: bool| -> Option<u32> {
        let raw: [u8; 4] = header.get(offset..offset + 4)?.try_into().ok()?;
        Some(if big_endian {
            u32::from_be_bytes(raw)
        } else {
            u32::from_le_bytes(raw)
        })
    };

    match magic {
        [0xce, 0xfa, 0xed, 0xfe] | [0xcf, 0xfa, 0xed, 0xfe] => read_u32(4, false)
            .map(Machine::from_macho)
            .unwrap_or(Machine::Unknown),
        [0xfe, 0xed, 0xfa, 0xce] | [0xfe, 0xed, 0xfa, 0xcf] => read_u32(4, true)
            .map(Machine::from_macho)
            .unwrap_or(Machine::Unknown),
        // fat (universal) 바이너리: 현재 아키텍처 슬라이스가 있으면 그것을, 없으면 첫 슬라이스
        [0xca, 0xfe, 0xba, 0xbe] => {
            let count = (read_u32(4, true).unwrap_or(0) as usize).min(header.len() / 20);
            let slices: Vec<Machine> = (0..count)
                .filter_map(|i| read_u32(8 + i * 20, true))
                .map(Machine::from_macho)
                .collect();
            let current = Machine::current();
            if slices.contains(&current) {
                current
            } else {
                slices.first().copied().unwrap_or(Machine::Unknown)
            }
        }
        _ => Machine::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn elf_header(e_machine: u16) -> Vec<u8> {
        let mut bytes = vec![0u8; 64];
        bytes[..4].copy_from_slice(b"\x7fELF");
        bytes[4] = 2; // ELFCLASS64
        bytes[5] = 1; // little endian
        bytes[18..20].copy_from_slice(&e_machine.to_le_bytes());
        bytes
    }

    fn pe_header(machine: u16) -> Vec<u8> {
        let mut bytes = vec![0u8; 0x100];
        bytes[..2].copy_from_slice(b"MZ");
        bytes[0x3c..0x40].copy_from_slice(&0x80u32.to_le_bytes());
        bytes[0x80..0x84].copy_from_slice(b"PE\0\0");
        bytes[0x84..0x86].copy_from_slice(&machine.to_le_bytes());
        bytes
    }

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_elf_machine() {
        let temp = TempDir::new().unwrap();
        assert_eq!(read_machine(&write(&temp, "a.so", &elf_header(62))), Machine::X86_64);
        assert_eq!(read_machine(&write(&temp, "b.so", &elf_header(183))), Machine::Aarch64);
    }

    #[test]
    fn test_pe_machine() {
        let temp = TempDir::new().unwrap();
        assert_eq!(read_machine(&write(&temp, "a.dll", &pe_header(0x8664))), Machine::X86_64);
        assert_eq!(read_machine(&write(&temp, "b.dll", &pe_header(0x014c))), Machine::X86);
    }

    #[test]
    fn test_macho_machine() {
        let temp = TempDir::new().unwrap();
        let mut bytes = vec![0xcf, 0xfa, 0xed, 0xfe];
        bytes.extend_from_slice(&0x0100_000cu32.to_le_bytes());
        bytes.resize(32, 0);
        assert_eq!(read_machine(&write(&temp, "a.dylib", &bytes)), Machine::Aarch64);
    }

    fn fat_header(cputypes: &[u32]) -> Vec<u8> {
        let mut bytes = vec![0xca, 0xfe, 0xba, 0xbe];
        bytes.extend_from_slice(&(cputypes.len() as u32).to_be_bytes());
        for &cputype in cputypes {
            let mut slice = [0u8; 20];
            slice[..4].copy_from_slice(&cputype.to_be_bytes());
            bytes.extend_from_slice(&slice);
        }
        bytes.resize(bytes.len() + 64, 0);
        bytes
    }

    #[test]
    fn test_fat_macho_prefers_current_slice() {
        let temp = TempDir::new().unwrap();
        let (other, current) = match Machine::current() {
            Machine::X86_64 => (0x0100_000c, 0x0100_0007),
            _ => (0x0100_0007, 0x0100_000c),
        };

        let path = write(&temp, "fat.dylib", &fat_header(&[other, current]));
        let expected = if Machine::current() == Machine::from_macho(current) {
            Machine::current()
        } else {
            Machine::from_macho(other)
        };
        assert_eq!(read_machine(&path), expected);
    }

    #[test]
    fn test_fat_macho_without_current_slice_uses_first() {
        let temp = TempDir::new().unwrap();
        // 32-bit ARM, 32-bit x86: 64-bit 호스트에서는 둘 다 현재 아키텍처가 아님
        let path = write(&temp, "old.dylib", &fat_header(&[12, 7]));
        let machine = read_machine(&path);
        if Machine::current() == Machine::X86 {
            assert_eq!(machine, Machine::X86);
        } else {
            assert_eq!(machine, Machine::Arm);
        }
    }

    #[test]
    fn test_unrecognised_or_missing_is_unknown() {
        let temp = TempDir::new().unwrap();
        assert_eq!(read_machine(&write(&temp, "x.so", b"not a binary")), Machine::Unknown);
        assert_eq!(read_machine(&temp.path().join("missing.so")), Machine::Unknown);
        assert!(!Machine::Unknown.is_compatible());
    }

    #[test]
    fn test_truncated_pe_is_unknown() {
        let temp = TempDir::new().unwrap();
        let mut bytes = pe_header(0x8664);
        bytes.truncate(0x82);
        assert_eq!(read_machine(&write(&temp, "t.dll", &bytes)), Machine::Unknown);
    }
}
