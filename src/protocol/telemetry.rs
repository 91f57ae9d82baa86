// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Line-oriented step-response telemetry.
//!
//! The firmware prints, over the ST-LINK virtual COM port:
//!
//! ```text
//! awaiting input
//! ...
//! start
//! (0 12)
//! (15 230)
//! ...
//! end
//! ```
//!
//! Lines end in CRLF. Anything else on the console (boot banner, diagnostics) is ignored by the
//! host. [`BlockParser`] is the consumer side of the same format.

use core::fmt::{self, Write};

/// Printed when a task is about to take its control parameters.
pub const READY: &str = "awaiting input";
/// Opens a block of samples.
pub const START: &str = "start";
/// Closes a block of samples.
pub const END: &str = "end";

/// Bytes the host writes before reading: Ctrl-C (interrupt), Ctrl-B (leave raw REPL),
/// Ctrl-D (soft reset and rerun the program).
pub const HOST_RESET_SEQUENCE: [u8; 3] = [0x03, 0x02, 0x04];

/// Console byte that stops the scheduler.
pub const INTERRUPT: u8 = 0x03;

/// Console byte that restarts the firmware once it has been interrupted.
pub const SOFT_RESET: u8 = 0x04;

/// One recorded point of a step response.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Milliseconds since the run started
    pub time_ms: u32,
    /// Encoder position in counts
    pub position: i64,
}

/// Write a sentinel line.
pub fn write_marker(out: &mut dyn Write, marker: &str) -> fmt::Result {
    out.write_str(marker)?;
    out.write_str("\r\n")
}

/// Write one `(time position)` line.
pub fn write_sample(out: &mut dyn Write, sample: &Sample) -> fmt::Result {
    write!(out, "({} {})\r\n", sample.time_ms, sample.position)
}

/// Parse a `(time position)` or bare `time position` line. Returns `None` for anything
/// malformed, including unbalanced parentheses.
pub fn parse_sample(line: &str) -> Option<Sample> {
    let line = line.trim();
    let inner = match line.strip_prefix('(') {
        Some(rest) => rest.strip_suffix(')')?,
        None if line.ends_with(')') => return None,
        None => line,
    };
    let mut fields = inner.split_whitespace();
    let time_ms = fields.next()?.parse().ok()?;
    let position = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(Sample { time_ms, position })
}

/// Something the parser recognised.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Ready,
    Start,
    Sample(Sample),
    End,
}

enum State {
    Outside,
    InBlock,
}

/// Consumer-side state machine for the telemetry stream.
pub struct BlockParser {
    state: State,
    discarded: u32,
}

impl BlockParser {
    pub fn new() -> Self {
        Self {
            state: State::Outside,
            discarded: 0,
        }
    }

    /// Process a single line. Returns `Some(Event)` for a recognised line.
    ///
    /// Malformed lines inside a block are counted and dropped; the block carries on.
    pub fn push_line(&mut self, line: &str) -> Option<Event> {
        let line = line.trim();
        match self.state {
            State::Outside => match line {
                READY => Some(Event::Ready),
                START => {
                    self.state = State::InBlock;
                    Some(Event::Start)
                }
                _ => None,
            },
            State::InBlock => {
                if line == END {
                    self.state = State::Outside;
                    return Some(Event::End);
                }
                match parse_sample(line) {
                    Some(s) => Some(Event::Sample(s)),
                    None => {
                        self.discarded += 1;
                        None
                    }
                }
            }
        }
    }

    /// True between `start` and `end`.
    #[inline]
    pub fn in_block(&self) -> bool {
        matches!(self.state, State::InBlock)
    }

    /// Number of malformed lines dropped so far.
    #[inline]
    pub fn discarded(&self) -> u32 {
        self.discarded
    }
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;
    use std::vec::Vec;

    #[test]
    fn writes_crlf_lines() {
        let mut out = String::new();
        write_marker(&mut out, START).unwrap();
        write_sample(
            &mut out,
            &Sample {
                time_ms: 35,
                position: -3300,
            },
        )
        .unwrap();
        write_marker(&mut out, END).unwrap();
        assert_eq!(out, "start\r\n(35 -3300)\r\nend\r\n");
    }

    #[test]
    fn parses_sample_lines() {
        assert_eq!(
            parse_sample("(70 3299)\r"),
            Some(Sample {
                time_ms: 70,
                position: 3299
            })
        );
        assert_eq!(parse_sample("(70)"), None);
        assert_eq!(parse_sample("(70 3299 1)"), None);
        assert_eq!(parse_sample("(x 3299)"), None);
    }

    #[test]
    fn parentheses_are_optional_but_must_balance() {
        let expected = Some(Sample {
            time_ms: 0,
            position: 3300,
        });
        assert_eq!(parse_sample("0 3300"), expected);
        assert_eq!(parse_sample(" ( 0 3300 ) "), expected);
        assert_eq!(parse_sample("(0 3300"), None);
        assert_eq!(parse_sample("0 3300)"), None);
        assert_eq!(parse_sample("0"), None);
        assert_eq!(parse_sample(""), None);
    }

    #[test]
    fn bare_samples_count_inside_a_block() {
        let mut parser = BlockParser::new();
        parser.push_line("start");
        assert_eq!(
            parser.push_line("10 -25\r"),
            Some(Event::Sample(Sample {
                time_ms: 10,
                position: -25
            }))
        );
        assert_eq!(parser.discarded(), 0);
    }

    #[test]
    fn parser_follows_a_full_stream() {
        let stream = "boot banner\r\n\
                      awaiting input\r\n\
                      start\r\n\
                      (0 0)\r\n\
                      garbage\r\n\
                      (15 2200)\r\n\
                      end\r\n\
                      (30 1)\r\n";

        let mut parser = BlockParser::new();
        let events: Vec<Event> = stream.lines().filter_map(|l| parser.push_line(l)).collect();

        assert_eq!(
            events,
            [
                Event::Ready,
                Event::Start,
                Event::Sample(Sample {
                    time_ms: 0,
                    position: 0
                }),
                Event::Sample(Sample {
                    time_ms: 15,
                    position: 2200
                }),
                Event::End,
            ]
        );
        assert_eq!(parser.discarded(), 1);
        assert!(!parser.in_block());
    }

    #[test]
    fn written_samples_parse_back() {
        let mut out = String::new();
        let s = Sample {
            time_ms: 1485,
            position: 3301,
        };
        write_sample(&mut out, &s).unwrap();
        assert_eq!(parse_sample(&out), Some(s));
    }
}
