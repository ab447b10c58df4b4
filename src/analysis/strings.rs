/// Shortest run reported by default.
pub const DEFAULT_MIN_STRING_LEN: usize = 4;

/// A run of printable ASCII found in a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringMatch {
    pub address: u32,
    pub text: String,
}

fn is_printable(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

/// Lazy scanner over printable-ASCII runs, ascending by address.
///
/// A clone continues from the same position, so cloning a fresh scanner gives
/// an independent pass over the same buffer.
#[derive(Debug, Clone)]
pub struct Strings<'a> {
    data: &'a [u8],
    base: u32,
    min_len: usize,
    pos: usize,
}

/// Scan `data` (loaded at `base`) for printable runs of at least `min_len`
/// bytes. A `min_len` of 0 is treated as 1.
pub fn scan_strings(data: &[u8], base: u32, min_len: usize) -> Strings<'_> {
    Strings {
        data,
        base,
        min_len: min_len.max(1),
        pos: 0,
    }
}

impl Iterator for Strings<'_> {
    type Item = StringMatch;

    fn next(&mut self) -> Option<StringMatch> {
        while self.pos < self.data.len() {
            let start = self.pos;
            let run = self.data[start..]
                .iter()
                .take_while(|&&b| is_printable(b))
                .count();
            if run == 0 {
                self.pos += 1;
                continue;
            }
            // The run ends at a non-printable byte or at the end of the
            // buffer; either way it is closed here.
            self.pos = start + run;
            if run >= self.min_len {
                let text = self.data[start..self.pos].iter().map(|&b| char::from(b)).collect();
                return Some(StringMatch {
                    address: self.base.wrapping_add(start as u32),
                    text,
                });
            }
        }
        None
    }
}
