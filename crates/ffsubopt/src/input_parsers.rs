use std::fs::File;
use std::io::{stdin, BufRead, BufReader, Cursor};
use std::path::Path;

use anyhow::{anyhow, Result};
use paste::paste;

/// One folding task: optional header, sequence (with '&' between two
/// strands) and an optional constraint line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuboptInput {
    pub header: Option<String>,
    pub sequence: String,
    pub constraint: Option<String>,
}

fn is_constraint_line(line: &str) -> bool {
    line.chars().all(|c| matches!(c, '.' | 'x' | '|' | '(' | ')' | '&'))
}

// ============================================================
//  FASTA-like parser
// ============================================================

/// Reads the first record: a `>` header, the sequence line and, if the next
/// line looks like one, a constraint line.
pub fn read_subopt<R: BufRead>(reader: R) -> Result<SuboptInput> {
    let mut header: Option<String> = None;
    let mut sequence: Option<String> = None;
    let mut constraint: Option<String> = None;

    for line in reader.lines() {
        let line = line?;
        let Some(token) = line.split_whitespace().next() else {
            if sequence.is_some() {
                break;
            }
            continue;
        };

        if token.starts_with('>') {
            if sequence.is_some() {
                break;
            }
            header = Some(line.trim().to_string());
        } else if sequence.is_none() {
            sequence = Some(token.to_string());
        } else {
            if is_constraint_line(token) {
                constraint = Some(token.to_string());
            }
            break;
        }
    }

    let sequence = sequence.ok_or_else(|| anyhow!("Missing sequence line"))?;
    Ok(SuboptInput { header, sequence, constraint })
}

// ============================================================
//  Macro generating file/string/stdin/input helpers
// ============================================================

/// Generate input adapters for a base parser function `fn base<R: BufRead>(R) -> Result<T>`.
///
/// This expands into:
/// - `base_string(&str)`
/// - `base_file<P: AsRef<Path>>(P)`
/// - `base_stdin()`
/// - `base_input(&str)`  (dispatches "-" → stdin, otherwise → file)
macro_rules! define_input_variants {
    ($base:ident, $ret:ty) => {
        paste! {
            /// Read from a string buffer.
            pub fn [<$base _string>](s: &str) -> $ret {
                $base(Cursor::new(s))
            }

            /// Read from a file path.
            pub fn [<$base _file>]<P: AsRef<Path>>(path: P) -> $ret {
                let reader = BufReader::new(File::open(path)?);
                $base(reader)
            }

            /// Read from stdin.
            pub fn [<$base _stdin>]() -> $ret {
                let reader = BufReader::new(stdin());
                $base(reader)
            }

            /// Read either from stdin ("-") or a file path.
            pub fn [<$base _input>](s: &str) -> $ret {
                if s == "-" {
                    [<$base _stdin>]()
                } else {
                    [<$base _file>](s)
                }
            }
        }
    };
}

define_input_variants!(read_subopt, Result<SuboptInput>);

pub fn ruler(len: usize) -> String {
    let mut s = String::new();
    let mut c = 0;
    for i in 0..=len {
        if i % 10 == 0 {
            let t = format!("{}", i / 10);
            c = t.len() - 1;
            s.push_str(&t);
            continue;
        } else if c > 0 {
            c -= 1;
            continue;
        }
        if i % 10 == 5 {
            s.push(',');
        } else {
            s.push('.');
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruler() {
        assert_eq!(ruler(0), "0");
        assert_eq!(ruler(5), "0....,");
        assert_eq!(ruler(10), "0....,....1");
    }

    #[test]
    fn test_read_sequence_only() {
        let input = ">test\nGGGGAAAACCCC\n";
        let rec = read_subopt_string(input).unwrap();
        assert_eq!(rec.header, Some(">test".into()));
        assert_eq!(rec.sequence, "GGGGAAAACCCC");
        assert_eq!(rec.constraint, None);
    }

    #[test]
    fn test_read_with_constraint() {
        let input = "GGGA&ACCC energies ignored\n(((.&.)))\n";
        let rec = read_subopt_string(input).unwrap();
        assert_eq!(rec.header, None);
        assert_eq!(rec.sequence, "GGGA&ACCC");
        assert_eq!(rec.constraint, Some("(((.&.)))".into()));
    }

    #[test]
    fn test_read_stops_at_next_record() {
        let input = ">a\nACGU\n>b\nUGCA\n";
        let rec = read_subopt_string(input).unwrap();
        assert_eq!(rec.header, Some(">a".into()));
        assert_eq!(rec.sequence, "ACGU");
        assert_eq!(rec.constraint, None);
        assert!(read_subopt_string(">only a header\n").is_err());
    }
}
