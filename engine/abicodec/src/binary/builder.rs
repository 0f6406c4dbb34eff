use crate::error::{CodecError, CodecResult};

/// Growable output buffer for the wire encoding.
#[derive(Debug, Default)]
pub struct BinWriter {
    buffer: Vec<u8>,
}

impl BinWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn write_varuint32(&mut self, mut value: u32) {
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.buffer.push(byte);
                return;
            }
            self.buffer.push(byte | 0x80);
        }
    }

    pub fn write_varint32(&mut self, value: i32) {
        self.write_varuint32(((value << 1) ^ (value >> 31)) as u32);
    }

    /// Length prefix for a string, byte run, or array.
    pub fn write_len(&mut self, len: usize) -> CodecResult<()> {
        let len = u32::try_from(len)
            .map_err(|_| CodecError::invalid("varuint32", format!("length {len} exceeds u32")))?;
        self.write_varuint32(len);
        Ok(())
    }

    pub fn write_sized(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.write_len(bytes.len())?;
        self.write_bytes(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::BinReader;

    #[test]
    fn varuint32_layout() {
        let mut writer = BinWriter::new();
        writer.write_varuint32(0);
        writer.write_varuint32(300);
        writer.write_varuint32(u32::MAX);
        assert_eq!(
            writer.as_bytes(),
            &[0x00, 0xac, 0x02, 0xff, 0xff, 0xff, 0xff, 0x0f]
        );
    }

    #[test]
    fn varint32_reads_back() {
        for value in [0, 1, -1, 63, -64, 64, i32::MAX, i32::MIN] {
            let mut writer = BinWriter::new();
            writer.write_varint32(value);
            let bytes = writer.into_bytes();
            assert_eq!(BinReader::new(&bytes).read_varint32(), Ok(value), "{value}");
        }
    }
}
