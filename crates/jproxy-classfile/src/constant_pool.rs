use crate::error::{Error, Result};
use crate::reader::Reader;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CpInfo {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class { name_index: u16 },
    String { string_index: u16 },
    MemberRef,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    Module { name_index: u16 },
    Package { name_index: u16 },
    /// Second slot of a `Long`/`Double` entry.
    Unusable,
}

impl CpInfo {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            CpInfo::Utf8(_) => "Utf8",
            CpInfo::Integer(_) => "Integer",
            CpInfo::Float(_) => "Float",
            CpInfo::Long(_) => "Long",
            CpInfo::Double(_) => "Double",
            CpInfo::Class { .. } => "Class",
            CpInfo::String { .. } => "String",
            CpInfo::MemberRef => "MemberRef",
            CpInfo::NameAndType => "NameAndType",
            CpInfo::MethodHandle => "MethodHandle",
            CpInfo::MethodType => "MethodType",
            CpInfo::Dynamic => "Dynamic",
            CpInfo::Module { .. } => "Module",
            CpInfo::Package { .. } => "Package",
            CpInfo::Unusable => "Unusable",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ConstantPool {
    // Index 0 is never valid; keep the slot so indices line up with the classfile.
    entries: Vec<CpInfo>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count.max(1));
        entries.push(CpInfo::Unusable);

        while entries.len() < count {
            let tag = reader.read_u1()?;
            let info = match tag {
                1 => {
                    let len = reader.read_u2()? as usize;
                    CpInfo::Utf8(decode_modified_utf8(reader.read_bytes(len)?)?)
                }
                3 => CpInfo::Integer(reader.read_u4()? as i32),
                4 => CpInfo::Float(f32::from_bits(reader.read_u4()?)),
                5 => CpInfo::Long(reader.read_u8()? as i64),
                6 => CpInfo::Double(f64::from_bits(reader.read_u8()?)),
                7 => CpInfo::Class {
                    name_index: reader.read_u2()?,
                },
                8 => CpInfo::String {
                    string_index: reader.read_u2()?,
                },
                9..=11 => {
                    reader.read_u4()?;
                    CpInfo::MemberRef
                }
                12 => {
                    reader.read_u4()?;
                    CpInfo::NameAndType
                }
                15 => {
                    reader.read_u1()?;
                    reader.read_u2()?;
                    CpInfo::MethodHandle
                }
                16 => {
                    reader.read_u2()?;
                    CpInfo::MethodType
                }
                17 | 18 => {
                    reader.read_u4()?;
                    CpInfo::Dynamic
                }
                19 => CpInfo::Module {
                    name_index: reader.read_u2()?,
                },
                20 => CpInfo::Package {
                    name_index: reader.read_u2()?,
                },
                other => return Err(Error::InvalidConstantPoolTag(other)),
            };

            let wide = matches!(info, CpInfo::Long(_) | CpInfo::Double(_));
            entries.push(info);
            if wide {
                entries.push(CpInfo::Unusable);
            }
        }

        Ok(Self { entries })
    }

    pub(crate) fn get(&self, index: u16) -> Result<&CpInfo> {
        match self.entries.get(index as usize) {
            None | Some(CpInfo::Unusable) => Err(Error::InvalidConstantPoolIndex(index)),
            Some(info) => Ok(info),
        }
    }

    pub(crate) fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.get(index)? {
            CpInfo::Utf8(s) => Ok(s),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Utf8",
                found: other.kind(),
            }),
        }
    }

    pub(crate) fn get_class_name(&self, index: u16) -> Result<String> {
        match self.get(index)? {
            CpInfo::Class { name_index } => Ok(self.get_utf8(*name_index)?.to_string()),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Class",
                found: other.kind(),
            }),
        }
    }

    /// Resolves an annotation `s` element, which points straight at a `Utf8` entry.
    pub(crate) fn get_string_constant(&self, index: u16) -> Result<String> {
        match self.get(index)? {
            CpInfo::Utf8(s) => Ok(s.clone()),
            CpInfo::String { string_index } => Ok(self.get_utf8(*string_index)?.to_string()),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Utf8",
                found: other.kind(),
            }),
        }
    }
}

/// Decodes the JVM's "modified UTF-8" (JVMS §4.4.7).
///
/// Differences from standard UTF-8: NUL is encoded as `C0 80`, and supplementary characters
/// are stored as two 3-byte surrogates.
fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i];
        if b0 & 0x80 == 0 {
            if b0 == 0 {
                return Err(Error::InvalidModifiedUtf8);
            }
            units.push(b0 as u16);
            i += 1;
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = *bytes.get(i + 1).ok_or(Error::InvalidModifiedUtf8)?;
            if b1 & 0xC0 != 0x80 {
                return Err(Error::InvalidModifiedUtf8);
            }
            units.push((((b0 & 0x1F) as u16) << 6) | (b1 & 0x3F) as u16);
            i += 2;
        } else if b0 & 0xF0 == 0xE0 {
            let b1 = *bytes.get(i + 1).ok_or(Error::InvalidModifiedUtf8)?;
            let b2 = *bytes.get(i + 2).ok_or(Error::InvalidModifiedUtf8)?;
            if b1 & 0xC0 != 0x80 || b2 & 0xC0 != 0x80 {
                return Err(Error::InvalidModifiedUtf8);
            }
            units.push(
                (((b0 & 0x0F) as u16) << 12) | (((b1 & 0x3F) as u16) << 6) | (b2 & 0x3F) as u16,
            );
            i += 3;
        } else {
            return Err(Error::InvalidModifiedUtf8);
        }
    }
    String::from_utf16(&units).map_err(|_| Error::InvalidModifiedUtf8)
}
