//! TZX container parser
//!
//! A TZX file is a 10-byte header (`"ZXTape!" 0x1A major minor`) followed by
//! blocks, each introduced by an ID byte. Blocks the player cannot render are
//! still consumed so that jump offsets and progress indices stay aligned with
//! the file.

use super::block::Block;
use super::TapeError;

pub const SIGNATURE: &[u8; 8] = b"ZXTape!\x1A";

/// A parsed TZX image
#[derive(Debug, Clone)]
pub struct TzxFile {
    pub major: u8,
    pub minor: u8,
    pub blocks: Vec<Block>,
}

pub fn parse(data: &[u8]) -> Result<TzxFile, TapeError> {
    if data.len() < 10 || &data[..8] != SIGNATURE {
        return Err(TapeError::BadSignature);
    }

    let mut reader = Reader { data, pos: 10 };
    let mut blocks = Vec::new();
    while !reader.is_empty() {
        blocks.push(reader.block()?);
    }

    Ok(TzxFile {
        major: data[8],
        minor: data[9],
        blocks,
    })
}

/// Little-endian cursor with truncation checks
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn bytes(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], TapeError> {
        let available = self.data.len() - self.pos;
        if len > available {
            return Err(TapeError::Truncated {
                context,
                offset: self.pos,
                needed: len,
                available,
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn u8(&mut self, context: &'static str) -> Result<u8, TapeError> {
        Ok(self.bytes(1, context)?[0])
    }

    fn u16(&mut self, context: &'static str) -> Result<u16, TapeError> {
        let b = self.bytes(2, context)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u24(&mut self, context: &'static str) -> Result<u32, TapeError> {
        let b = self.bytes(3, context)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], 0]))
    }

    fn u32(&mut self, context: &'static str) -> Result<u32, TapeError> {
        let b = self.bytes(4, context)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn text(&mut self, len: usize, context: &'static str) -> Result<String, TapeError> {
        Ok(String::from_utf8_lossy(self.bytes(len, context)?).into_owned())
    }

    fn skip(&mut self, len: usize, context: &'static str) -> Result<(), TapeError> {
        self.bytes(len, context).map(|_| ())
    }

    fn block(&mut self) -> Result<Block, TapeError> {
        let offset = self.pos;
        let id = self.u8("block id")?;

        let block = match id {
            0x10 => {
                let pause_ms = self.u16("standard speed header")?;
                let len = self.u16("standard speed header")? as usize;
                let data = self.bytes(len, "standard speed data")?.to_vec();
                Block::StandardSpeed { pause_ms, data }
            }
            0x11 => {
                let ctx = "turbo speed header";
                let pilot_pulse = self.u16(ctx)?;
                let sync1 = self.u16(ctx)?;
                let sync2 = self.u16(ctx)?;
                let zero_pulse = self.u16(ctx)?;
                let one_pulse = self.u16(ctx)?;
                let pilot_count = self.u16(ctx)?;
                let used_bits = self.u8(ctx)?;
                let pause_ms = self.u16(ctx)?;
                let len = self.u24(ctx)? as usize;
                let data = self.bytes(len, "turbo speed data")?.to_vec();
                Block::TurboSpeed {
                    pilot_pulse,
                    sync1,
                    sync2,
                    zero_pulse,
                    one_pulse,
                    pilot_count,
                    used_bits,
                    pause_ms,
                    data,
                }
            }
            0x12 => {
                let pulse_len = self.u16("pure tone")?;
                let count = self.u16("pure tone")?;
                Block::PureTone { pulse_len, count }
            }
            0x13 => {
                let count = self.u8("pulse sequence")? as usize;
                let pulses = (0..count)
                    .map(|_| self.u16("pulse sequence"))
                    .collect::<Result<_, _>>()?;
                Block::PulseSequence { pulses }
            }
            0x14 => {
                let ctx = "pure data header";
                let zero_pulse = self.u16(ctx)?;
                let one_pulse = self.u16(ctx)?;
                let used_bits = self.u8(ctx)?;
                let pause_ms = self.u16(ctx)?;
                let len = self.u24(ctx)? as usize;
                let data = self.bytes(len, "pure data")?.to_vec();
                Block::PureData {
                    zero_pulse,
                    one_pulse,
                    used_bits,
                    pause_ms,
                    data,
                }
            }
            0x15 => {
                // T-states per sample, pause, used bits, then a 24-bit length
                self.skip(5, "direct recording header")?;
                let len = self.u24("direct recording header")? as usize;
                self.skip(len, "direct recording data")?;
                Block::Unsupported { id }
            }
            0x16 | 0x17 | 0x18 | 0x19 | 0x2B => {
                let len = self.u32("block length")? as usize;
                self.skip(len, "block body")?;
                Block::Unsupported { id }
            }
            0x20 => Block::Pause {
                millis: self.u16("pause")?,
            },
            0x21 => {
                let len = self.u8("group name")? as usize;
                Block::GroupStart {
                    name: self.text(len, "group name")?,
                }
            }
            0x22 => Block::GroupEnd,
            0x23 => Block::JumpTo {
                relative: self.u16("jump")? as i16,
            },
            0x24 => Block::LoopStart {
                repeats: self.u16("loop start")?,
            },
            0x25 => Block::LoopEnd,
            0x26 => {
                let count = self.u16("call sequence")? as usize;
                self.skip(count * 2, "call sequence")?;
                Block::Unsupported { id }
            }
            0x27 => Block::Unsupported { id },
            0x28 => {
                let len = self.u16("select block")? as usize;
                self.skip(len, "select block")?;
                Block::Unsupported { id }
            }
            0x2A => {
                // Length field, always zero
                self.skip(4, "stop tape")?;
                Block::StopTape48k
            }
            0x30 => {
                let len = self.u8("text description")? as usize;
                Block::Text {
                    text: self.text(len, "text description")?,
                }
            }
            0x31 => {
                let seconds = self.u8("message")?;
                let len = self.u8("message")? as usize;
                Block::Message {
                    seconds,
                    text: self.text(len, "message")?,
                }
            }
            0x32 => self.archive_info()?,
            0x33 => {
                let count = self.u8("hardware type")? as usize;
                let raw = self.bytes(count * 3, "hardware type")?;
                Block::Hardware {
                    entries: raw.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
                }
            }
            0x35 => {
                self.skip(16, "custom info")?;
                let len = self.u32("custom info")? as usize;
                self.skip(len, "custom info")?;
                Block::Unsupported { id }
            }
            0x34 => {
                // Fixed size, no length field
                self.skip(8, "emulation info")?;
                Block::Unsupported { id }
            }
            0x40 => {
                self.skip(1, "snapshot type")?;
                let len = self.u24("snapshot length")? as usize;
                self.skip(len, "snapshot")?;
                Block::Unsupported { id }
            }
            0x5A => {
                self.skip(9, "glue")?;
                Block::Glue
            }
            _ => {
                // Blocks added after v1.10 all start with a 32-bit length
                let len = self
                    .u32("block length")
                    .map_err(|_| TapeError::UnknownBlock { id, offset })?;
                self.skip(len as usize, "block body")?;
                Block::Unsupported { id }
            }
        };

        Ok(block)
    }

    fn archive_info(&mut self) -> Result<Block, TapeError> {
        let len = self.u16("archive info")? as usize;
        let body = self.bytes(len, "archive info")?;
        let mut inner = Reader { data: body, pos: 0 };

        let count = inner.u8("archive info")?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let field = inner.u8("archive entry")?;
            let len = inner.u8("archive entry")? as usize;
            entries.push((field, inner.text(len, "archive entry")?));
        }

        Ok(Block::ArchiveInfo { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(body: &[u8]) -> Vec<u8> {
        let mut data = SIGNATURE.to_vec();
        data.extend_from_slice(&[1, 20]);
        data.extend_from_slice(body);
        data
    }

    #[test]
    fn test_empty_image() {
        let tzx = parse(&image(&[])).unwrap();
        assert_eq!((tzx.major, tzx.minor), (1, 20));
        assert!(tzx.blocks.is_empty());
    }

    #[test]
    fn test_bad_signature() {
        assert!(matches!(parse(b"ZXTape?\x1a\x01\x14"), Err(TapeError::BadSignature)));
        assert!(matches!(parse(&[]), Err(TapeError::BadSignature)));
    }

    #[test]
    fn test_standard_speed() {
        let tzx = parse(&image(&[0x10, 0xE8, 0x03, 0x02, 0x00, 0xFF, 0xAA])).unwrap();
        assert_eq!(
            tzx.blocks,
            vec![Block::StandardSpeed {
                pause_ms: 1000,
                data: vec![0xFF, 0xAA],
            }]
        );
    }

    #[test]
    fn test_turbo_speed() {
        let body = [
            0x11, // id
            0x78, 0x08, // pilot 2168
            0x9B, 0x02, // sync1 667
            0xDF, 0x02, // sync2 735
            0x57, 0x03, // zero 855
            0xAE, 0x06, // one 1710
            0x97, 0x0C, // pilot count 3223
            0x06, // used bits
            0x00, 0x00, // pause
            0x01, 0x00, 0x00, // length
            0x42,
        ];
        let tzx = parse(&image(&body)).unwrap();
        match &tzx.blocks[0] {
            Block::TurboSpeed {
                pilot_pulse,
                pilot_count,
                used_bits,
                data,
                ..
            } => {
                assert_eq!(*pilot_pulse, 2168);
                assert_eq!(*pilot_count, 3223);
                assert_eq!(*used_bits, 6);
                assert_eq!(data, &[0x42]);
            }
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_control_flow_blocks() {
        let body = [
            0x24, 0x03, 0x00, // loop 3
            0x12, 0x78, 0x08, 0x10, 0x00, // tone
            0x25, // loop end
            0x23, 0xFE, 0xFF, // jump -2
            0x20, 0x00, 0x00, // stop the tape
            0x2A, 0x00, 0x00, 0x00, 0x00, // stop if 48k
        ];
        let tzx = parse(&image(&body)).unwrap();
        assert_eq!(
            tzx.blocks,
            vec![
                Block::LoopStart { repeats: 3 },
                Block::PureTone {
                    pulse_len: 2168,
                    count: 16
                },
                Block::LoopEnd,
                Block::JumpTo { relative: -2 },
                Block::Pause { millis: 0 },
                Block::StopTape48k,
            ]
        );
    }

    #[test]
    fn test_info_blocks() {
        let mut body = vec![0x30, 5];
        body.extend_from_slice(b"hello");
        body.extend_from_slice(&[0x32, 0x08, 0x00, 0x01, 0x00, 0x05]);
        body.extend_from_slice(b"Manic");
        body.extend_from_slice(&[0x21, 0x01, b'g', 0x22]);

        let tzx = parse(&image(&body)).unwrap();
        assert_eq!(tzx.blocks.len(), 4);
        assert_eq!(tzx.blocks[0].to_string(), "hello");
        assert_eq!(tzx.blocks[1].to_string(), "Manic");
        assert_eq!(tzx.blocks[3], Block::GroupEnd);
    }

    #[test]
    fn test_skipped_blocks_keep_alignment() {
        let body = [
            0x15, 0x4F, 0x00, 0x00, 0x00, 0x08, 0x02, 0x00, 0x00, 0xAA, 0x55, // direct recording
            0x5A, b'X', b'T', b'a', b'p', b'e', b'!', 0x1A, 0x01, 0x14, // glue
            0x4B, 0x01, 0x00, 0x00, 0x00, 0x00, // unknown, length-prefixed
            0x22,
        ];
        let tzx = parse(&image(&body)).unwrap();
        assert_eq!(
            tzx.blocks,
            vec![
                Block::Unsupported { id: 0x15 },
                Block::Glue,
                Block::Unsupported { id: 0x4B },
                Block::GroupEnd,
            ]
        );
    }

    #[test]
    fn test_emulation_info_is_fixed_size() {
        // 8 bytes of flags and rates; the first four are not a length
        let body = [0x34, 0x01, 0x00, 0x05, 0x32, 0x00, 0x00, 0x00, 0x00, 0x22];
        let tzx = parse(&image(&body)).unwrap();
        assert_eq!(
            tzx.blocks,
            vec![Block::Unsupported { id: 0x34 }, Block::GroupEnd]
        );
    }

    #[test]
    fn test_snapshot_uses_24_bit_length() {
        let body = [
            0x40, 0x00, 0x03, 0x00, 0x00, 0xDE, 0xAD, 0xBE, // .z80, 3 bytes
            0x20, 0x64, 0x00, // pause 100ms
        ];
        let tzx = parse(&image(&body)).unwrap();
        assert_eq!(
            tzx.blocks,
            vec![
                Block::Unsupported { id: 0x40 },
                Block::Pause { millis: 100 },
            ]
        );
    }

    #[test]
    fn test_c64_blocks_are_skipped() {
        let body = [
            0x16, 0x02, 0x00, 0x00, 0x00, 0x11, 0x22, // C64 ROM data
            0x17, 0x00, 0x00, 0x00, 0x00, // C64 turbo data
            0x25,
        ];
        let tzx = parse(&image(&body)).unwrap();
        assert_eq!(
            tzx.blocks,
            vec![
                Block::Unsupported { id: 0x16 },
                Block::Unsupported { id: 0x17 },
                Block::LoopEnd,
            ]
        );
    }

    #[test]
    fn test_truncated_block() {
        let err = parse(&image(&[0x10, 0xE8, 0x03, 0x10, 0x00, 0xFF])).unwrap_err();
        assert!(matches!(
            err,
            TapeError::Truncated {
                needed: 16,
                available: 1,
                ..
            }
        ));
    }
}
