//! Plain TAP images: a list of `[u16 length][length bytes]` records, each one
//! a block as the ROM saved it. Every record plays as a standard speed block
//! followed by one second of silence.

use super::block::Block;
use super::TapeError;

const RECORD_PAUSE_MS: u16 = 1000;

pub fn parse(data: &[u8]) -> Result<Vec<Block>, TapeError> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let available = data.len() - pos;
        if available < 2 {
            return Err(TapeError::Truncated {
                context: "tap record length",
                offset: pos,
                needed: 2,
                available,
            });
        }
        let len = u16::from_le_bytes([data[pos], data[pos + 1]]) as usize;
        pos += 2;

        let available = data.len() - pos;
        if len > available {
            return Err(TapeError::Truncated {
                context: "tap record",
                offset: pos,
                needed: len,
                available,
            });
        }
        blocks.push(Block::StandardSpeed {
            pause_ms: RECORD_PAUSE_MS,
            data: data[pos..pos + len].to_vec(),
        });
        pos += len;
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_become_standard_blocks() {
        let blocks = parse(&[0x02, 0x00, 0x00, 0x03, 0x01, 0x00, 0xFF]).unwrap();
        assert_eq!(
            blocks,
            vec![
                Block::StandardSpeed {
                    pause_ms: 1000,
                    data: vec![0x00, 0x03],
                },
                Block::StandardSpeed {
                    pause_ms: 1000,
                    data: vec![0xFF],
                },
            ]
        );
    }

    #[test]
    fn test_truncated_record() {
        assert!(matches!(
            parse(&[0x05, 0x00, 0xFF]),
            Err(TapeError::Truncated { needed: 5, .. })
        ));
        assert!(matches!(parse(&[0x05]), Err(TapeError::Truncated { .. })));
    }
}
