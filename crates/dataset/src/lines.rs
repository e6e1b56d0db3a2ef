use std::collections::VecDeque;
use std::io::{self, BufRead};

/// Text lines of a reader. `\n`, `\r\n` and a bare `\r` all end a line;
/// terminators are not included.
pub struct Lines<R> {
    reader: R,
    buf: Vec<u8>,
    pending: VecDeque<io::Result<String>>,
    done: bool,
}

impl<R: BufRead> Lines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    fn fill(&mut self) {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                return;
            }
            Ok(_) => {}
            Err(e) => {
                self.done = true;
                self.pending.push_back(Err(e));
                return;
            }
        }

        let mut chunk: &[u8] = &self.buf;
        if let Some(rest) = chunk.strip_suffix(b"\n") {
            chunk = rest;
        }
        if let Some(rest) = chunk.strip_suffix(b"\r") {
            chunk = rest;
        }

        // 0x0D never occurs inside a multi-byte UTF-8 sequence
        for piece in chunk.split(|&b| b == b'\r') {
            match std::str::from_utf8(piece) {
                Ok(s) => self.pending.push_back(Ok(s.to_owned())),
                Err(e) => {
                    self.done = true;
                    self.pending
                        .push_back(Err(io::Error::new(io::ErrorKind::InvalidData, e)));
                    return;
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for Lines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(line);
            }
            if self.done {
                return None;
            }
            self.fill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &[u8]) -> Vec<String> {
        Lines::new(input).map(|l| l.unwrap()).collect()
    }

    #[test]
    fn test_all_terminators() {
        assert_eq!(collect(b"a\nb\r\nc\rd"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_trailing_terminator_adds_no_line() {
        assert_eq!(collect(b"a\r"), vec!["a"]);
        assert_eq!(collect(b"a\r\n"), vec!["a"]);
        assert!(collect(b"").is_empty());
    }

    #[test]
    fn test_empty_lines_are_kept() {
        assert_eq!(collect(b"\r\n\r\r\n\nx"), vec!["", "", "", "", "x"]);
    }

    #[test]
    fn test_invalid_utf8_after_good_lines() {
        let mut lines = Lines::new(&b"ok\r\xff\nlater\n"[..]);
        assert_eq!(lines.next().unwrap().unwrap(), "ok");
        let err = lines.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(lines.next().is_none());
    }
}
