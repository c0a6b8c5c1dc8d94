//! Newline-delimited record splitting over an arbitrarily fragmented byte stream.

/// Reassembles `\n`-terminated records from body frames.
///
/// Frame boundaries carry no meaning: a record may span several frames and a
/// frame may hold several records. A trailing `\r` is stripped from each record.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buffer: Vec<u8>,
    /// Leading bytes of `buffer` already known to hold no `\n`.
    scanned: usize,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame, returning every record it completed.
    pub fn push(&mut self, frame: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.extend_from_slice(frame);

        let mut records = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.buffer[from..].iter().position(|b| *b == b'\n') {
            let newline = from + offset;
            let mut record = self.buffer[start..newline].to_vec();
            strip_cr(&mut record);
            records.push(record);
            start = newline + 1;
            from = start;
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();
        records
    }

    /// Flush the unterminated tail left when the stream ends.
    pub fn finish(mut self) -> Option<Vec<u8>> {
        if self.buffer.is_empty() {
            return None;
        }
        strip_cr(&mut self.buffer);
        Some(self.buffer)
    }
}

fn strip_cr(record: &mut Vec<u8>) {
    if record.last() == Some(&b'\r') {
        record.pop();
    }
}
