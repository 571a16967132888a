/*!
 * Code-fence negotiation
 *
 * A fence must be longer than any backtick run inside the content it
 * delimits, otherwise the content could close the block early.
 */

use std::fmt;
use std::io::{self, Read};

/// Character used for every fence
pub const FENCE_CHAR: u8 = b'`';

/// Shortest fence ever emitted
pub const MIN_FENCE_LEN: usize = 3;

/// Size of the scan buffer used by [`longest_run`]
const READ_BUF_SIZE: usize = 32 * 1024;

/// Tracks the current and longest run of one byte across chunks
#[derive(Debug, Clone, Copy)]
struct RunTracker {
    byte: u8,
    current: usize,
    longest: usize,
}

impl RunTracker {
    fn new(byte: u8) -> Self {
        Self {
            byte,
            current: 0,
            longest: 0,
        }
    }

    fn feed(&mut self, chunk: &[u8]) {
        for &b in chunk {
            if b == self.byte {
                self.current += 1;
                self.longest = self.longest.max(self.current);
            } else {
                self.current = 0;
            }
        }
    }
}

/// Longest run of `byte` in a stream, read once through a fixed buffer
pub fn longest_run<R: Read>(mut reader: R, byte: u8) -> io::Result<usize> {
    let mut buf = vec![0u8; READ_BUF_SIZE];
    let mut tracker = RunTracker::new(byte);

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => tracker.feed(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(tracker.longest)
}

/// Longest run of `byte` in an in-memory slice
pub fn longest_run_in(bytes: &[u8], byte: u8) -> usize {
    let mut tracker = RunTracker::new(byte);
    tracker.feed(bytes);
    tracker.longest
}

/// Fence length for content whose longest backtick run is `max_run`
pub fn fence_len(max_run: usize) -> usize {
    (max_run + 1).max(MIN_FENCE_LEN)
}

/// A negotiated code fence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    len: usize,
}

impl Fence {
    /// Fence safe for everything `reader` yields
    pub fn for_reader<R: Read>(reader: R) -> io::Result<Self> {
        let run = longest_run(reader, FENCE_CHAR)?;
        Ok(Self { len: fence_len(run) })
    }

    /// Fence safe for `bytes`
    pub fn for_bytes(bytes: &[u8]) -> Self {
        Self {
            len: fence_len(longest_run_in(bytes, FENCE_CHAR)),
        }
    }

    /// Number of backticks
    pub fn width(&self) -> usize {
        self.len
    }
}

impl Default for Fence {
    fn default() -> Self {
        Self { len: MIN_FENCE_LEN }
    }
}

impl fmt::Display for Fence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.len {
            f.write_str("`")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that hands out one byte per call and is interrupted in between
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        interrupt: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "again"));
            }
            if self.pos >= self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn test_no_backticks_gives_minimum() {
        assert_eq!(Fence::for_bytes(b"fn main() {}\n").width(), 3);
        assert_eq!(Fence::for_bytes(b"").width(), 3);
        assert_eq!(Fence::default().to_string(), "```");
    }

    #[test]
    fn test_fence_is_one_longer_than_longest_run() {
        for k in 0..10 {
            let mut content = b"a`b``c".to_vec();
            content.extend(std::iter::repeat(b'`').take(k));
            content.extend(b"d");
            let expected = (k.max(2) + 1).max(3);
            assert_eq!(Fence::for_bytes(&content).width(), expected, "k = {}", k);
        }
    }

    #[test]
    fn test_run_at_end_of_content() {
        assert_eq!(longest_run_in(b"text ````", FENCE_CHAR), 4);
        assert_eq!(Fence::for_bytes(b"text ````").to_string(), "`````");
    }

    #[test]
    fn test_reader_matches_slice_across_buffer_boundary() {
        let mut content = vec![b'x'; READ_BUF_SIZE - 3];
        content.extend(std::iter::repeat(b'`').take(7));
        content.extend(b"tail");

        let from_reader = longest_run(Cursor::new(&content), FENCE_CHAR).unwrap();
        assert_eq!(from_reader, 7);
        assert_eq!(from_reader, longest_run_in(&content, FENCE_CHAR));
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let reader = Trickle {
            data: b"``a````b".to_vec(),
            pos: 0,
            interrupt: false,
        };
        assert_eq!(longest_run(reader, FENCE_CHAR).unwrap(), 4);
    }

    #[test]
    fn test_content_never_contains_the_fence() {
        let samples: [&[u8]; 4] = [
            b"```rust\nlet x = 1;\n```\n",
            b"````````",
            b"\x00\xff``\x01`",
            b"no fences here",
        ];
        for content in samples {
            let fence = Fence::for_bytes(content).to_string();
            let haystack = String::from_utf8_lossy(content);
            assert!(!haystack.contains(&fence), "{:?}", haystack);
        }
    }
}
