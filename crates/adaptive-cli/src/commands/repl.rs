//! Interactive loop: one input per line against the same device.

use std::io::{BufRead, Write};

use adaptive_automaton::DeviceDescription;
use anyhow::Result;

use super::run::{RunOptions, Session};

/// Read lines until an empty line or end of input, printing a verdict per
/// line. A failing run prints its diagnostics and the loop goes on.
pub fn execute<R: BufRead, W: Write>(
    description: &DeviceDescription,
    options: RunOptions,
    reader: R,
    mut writer: W,
) -> Result<()> {
    let mut session = Session::new(description, options)?;
    writeln!(writer, "Enter one input per line; an empty line quits.")?;

    for line in reader.lines() {
        let line = line?;
        let text = line.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            break;
        }
        match session.run(text) {
            Ok(output) => writeln!(writer, "{}: {}", text, output)?,
            Err(err) => writeln!(writer, "{}: error: {:#}", text, err)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use adaptive_automaton::samples;

    #[test]
    fn test_lines_share_one_device() {
        let description = samples::anbncn_description();
        let input = b"aabbcc\naabbcc\nabbbccc\n\nabc\n";
        let mut out = Vec::new();

        execute(&description, RunOptions::default(), &input[..], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let verdicts: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(
            verdicts,
            vec!["aabbcc: accept", "aabbcc: reject", "abbbccc: accept"]
        );
    }

    #[test]
    fn test_errors_do_not_stop_the_loop() {
        let description = samples::anbncn_description();
        let options = RunOptions {
            max_steps: Some(1),
            ..RunOptions::default()
        };
        let mut out = Vec::new();

        execute(&description, options, &b"aa\na\n"[..], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("aa: error: Run failed"));
        assert!(text.contains("a: accept") || text.contains("a: reject"));
    }
}
