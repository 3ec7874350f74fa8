//! Execute a parsed scenario against the simulator.

use std::io::Write;

use anyhow::{bail, Context, Result};

use crate::client::{Client, Transport};
use crate::script::{Line, Statement};
use crate::sim::Simulator;

/// Outcome of a complete run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub statements: usize,
    pub expectations: usize,
}

/// Run `script` on a freshly booted keypad, echoing every step to `out`.
/// Stops at the first failing `expect`.
pub fn run<W: Write>(script: &[Line], out: &mut W) -> Result<Summary> {
    let mut client = Client::new(Simulator::new()?);
    let mut last_read: Vec<u8> = Vec::new();
    let mut summary = Summary::default();

    for line in script {
        execute(&mut client, &line.statement, &mut last_read, out)
            .with_context(|| format!("line {}", line.number))?;
        summary.statements += 1;
        if matches!(line.statement, Statement::Expect(_)) {
            summary.expectations += 1;
        }
    }

    writeln!(out, "= {}", client.transport().status())?;
    Ok(summary)
}

fn execute<W: Write>(
    client: &mut Client<Simulator>,
    statement: &Statement,
    last_read: &mut Vec<u8>,
    out: &mut W,
) -> Result<()> {
    match statement {
        Statement::Press { code, ticks } => {
            client.transport_mut().press(*code, *ticks)?;
            writeln!(out, "press {} for {} ticks", code, ticks)?;
        }
        Statement::Release { ticks } => {
            client.transport_mut().release(*ticks)?;
            writeln!(out, "release for {} ticks", ticks)?;
        }
        Statement::Write(bytes) => {
            client.transport_mut().write(bytes)?;
            writeln!(out, "> {}", hex(bytes))?;
        }
        Statement::Read(len) => {
            *last_read = client.transport_mut().read(*len)?;
            writeln!(out, "< {}", hex(last_read))?;
        }
        Statement::Expect(expected) => {
            if last_read != expected {
                bail!(
                    "expected [{}], last read was [{}]",
                    hex(expected),
                    hex(last_read)
                );
            }
            writeln!(out, "ok [{}]", hex(expected))?;
        }
        Statement::Check => {
            let depth = client.check()?;
            *last_read = vec![depth];
            writeln!(out, "check: {} queued", depth)?;
        }
        Statement::Fetch => {
            let code = client.read()?;
            *last_read = vec![code];
            writeln!(out, "fetch: {}", code)?;
        }
        Statement::Poll => {
            let code = client.read_direct()?;
            *last_read = vec![code];
            writeln!(out, "poll: {}", code)?;
        }
        Statement::Led { led, on } => {
            client.set_led(*led, *on)?;
            writeln!(out, "led {} {}", led, if *on { "on" } else { "off" })?;
        }
        Statement::Sound(on) => {
            client.set_sound(*on)?;
            writeln!(out, "sound {}", if *on { "on" } else { "off" })?;
        }
        Statement::Repeat(on) => {
            client.set_repeat(*on)?;
            writeln!(out, "repeat {}", if *on { "on" } else { "off" })?;
        }
        Statement::Reboot => {
            client.transport_mut().reboot()?;
            writeln!(out, "reboot")?;
        }
        Statement::Status => {
            writeln!(out, "= {}", client.transport().status())?;
        }
    }
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;

    fn run_str(script: &str) -> Result<(Summary, String)> {
        let lines = parse_script(script)?;
        let mut out = Vec::new();
        let summary = run(&lines, &mut out)?;
        Ok((summary, String::from_utf8(out)?))
    }

    #[test]
    fn test_demo_scenario_passes() {
        let (summary, transcript) = run_str(include_str!("../demos/basic.txt")).unwrap();
        assert!(summary.expectations > 0);
        assert!(transcript.contains("reboot"));
    }

    #[test]
    fn test_raw_transactions() {
        let (summary, transcript) = run_str(
            "press 6 4\n\
             write 2\n\
             read 1\n\
             expect 1\n\
             write 0\n\
             read 1\n\
             expect 0x06\n",
        )
        .unwrap();
        assert_eq!(
            summary,
            Summary {
                statements: 7,
                expectations: 2
            }
        );
        assert!(transcript.contains("< 0x06"));
    }

    #[test]
    fn test_failed_expect_names_line() {
        let err = run_str("check\nexpect 3\n").unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("line 2"), "{}", message);
        assert!(message.contains("last read was [0x00]"), "{}", message);
    }

    #[test]
    fn test_expect_before_any_read_fails() {
        assert!(run_str("expect 0").is_err());
    }
}
