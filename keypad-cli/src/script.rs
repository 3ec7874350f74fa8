use anyhow::{bail, Context, Result};

/// Ticks a `press` holds the key when no count is given: long enough to
/// pass the debounce but well short of auto-repeat.
pub const DEFAULT_PRESS_TICKS: u32 = 5;
/// Ticks a `release` waits when no count is given.
pub const DEFAULT_RELEASE_TICKS: u32 = 1;

/// One scenario step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Hold a key down for a number of scan ticks.
    Press { code: u8, ticks: u32 },
    /// Let go of every key and run a number of scan ticks.
    Release { ticks: u32 },
    /// Raw master write.
    Write(Vec<u8>),
    /// Raw master read of n bytes.
    Read(usize),
    /// Compare the bytes of the last read.
    Expect(Vec<u8>),
    Check,
    Fetch,
    Poll,
    Led { led: u8, on: bool },
    Sound(bool),
    Repeat(bool),
    Reboot,
    Status,
}

/// A statement with the 1-based line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub number: usize,
    pub statement: Statement,
}

/// Parse a scenario script.
///
/// One statement per line; everything after `#` is a comment. Byte
/// arguments are decimal or `0x` hex.
pub fn parse_script(input: &str) -> Result<Vec<Line>> {
    let mut lines = Vec::new();

    for (line_num, line) in input.lines().enumerate() {
        let line = match line.split_once('#') {
            Some((code, _comment)) => code,
            None => line,
        };
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        let statement = parse_statement(keyword, &args)
            .with_context(|| format!("line {}: invalid `{}`", line_num + 1, line.trim()))?;

        lines.push(Line {
            number: line_num + 1,
            statement,
        });
    }

    Ok(lines)
}

fn parse_statement(keyword: &str, args: &[&str]) -> Result<Statement> {
    let statement = match keyword {
        "press" => {
            arity(args, 1, 2)?;
            let code = parse_byte(args[0])?;
            let ticks = match args.get(1) {
                Some(ticks) => parse_count(ticks)?,
                None => DEFAULT_PRESS_TICKS,
            };
            Statement::Press { code, ticks }
        }
        "release" => {
            arity(args, 0, 1)?;
            let ticks = match args.first() {
                Some(ticks) => parse_count(ticks)?,
                None => DEFAULT_RELEASE_TICKS,
            };
            Statement::Release { ticks }
        }
        "write" => {
            if args.is_empty() {
                bail!("write needs at least one byte");
            }
            Statement::Write(parse_bytes(args)?)
        }
        "read" => {
            arity(args, 1, 1)?;
            Statement::Read(parse_count(args[0])? as usize)
        }
        "expect" => {
            if args.is_empty() {
                bail!("expect needs at least one byte");
            }
            Statement::Expect(parse_bytes(args)?)
        }
        "check" => {
            arity(args, 0, 0)?;
            Statement::Check
        }
        "fetch" => {
            arity(args, 0, 0)?;
            Statement::Fetch
        }
        "poll" => {
            arity(args, 0, 0)?;
            Statement::Poll
        }
        "led" => {
            arity(args, 2, 2)?;
            Statement::Led {
                led: parse_byte(args[0])?,
                on: parse_switch(args[1])?,
            }
        }
        "sound" => {
            arity(args, 1, 1)?;
            Statement::Sound(parse_switch(args[0])?)
        }
        "repeat" => {
            arity(args, 1, 1)?;
            Statement::Repeat(parse_switch(args[0])?)
        }
        "reboot" => {
            arity(args, 0, 0)?;
            Statement::Reboot
        }
        "status" => {
            arity(args, 0, 0)?;
            Statement::Status
        }
        other => bail!("unknown statement `{}`", other),
    };

    Ok(statement)
}

fn arity(args: &[&str], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        if min == max {
            bail!("expected {} argument(s), got {}", min, args.len());
        }
        bail!(
            "expected {} to {} arguments, got {}",
            min,
            max,
            args.len()
        );
    }
    Ok(())
}

/// Parse a byte in decimal or `0x` hex.
pub fn parse_byte(word: &str) -> Result<u8> {
    let value = match word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => word.parse::<u8>(),
    };
    value.with_context(|| format!("`{}` is not a byte", word))
}

fn parse_bytes(words: &[&str]) -> Result<Vec<u8>> {
    words.iter().map(|word| parse_byte(word)).collect()
}

fn parse_count(word: &str) -> Result<u32> {
    word.parse::<u32>()
        .with_context(|| format!("`{}` is not a count", word))
}

fn parse_switch(word: &str) -> Result<bool> {
    match word {
        "on" | "1" => Ok(true),
        "off" | "0" => Ok(false),
        other => bail!("expected on or off, got `{}`", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_script() {
        let script = "# hold five\n\
                      press 5 4\n\
                      release\n\
                      \n\
                      write 0x02   # queue depth\n\
                      read 1\n\
                      expect 1\n\
                      led 0 on\n\
                      sound off\n";
        let lines = parse_script(script).unwrap();
        let statements: Vec<Statement> = lines.iter().map(|l| l.statement.clone()).collect();
        assert_eq!(
            statements,
            vec![
                Statement::Press { code: 5, ticks: 4 },
                Statement::Release {
                    ticks: DEFAULT_RELEASE_TICKS
                },
                Statement::Write(vec![2]),
                Statement::Read(1),
                Statement::Expect(vec![1]),
                Statement::Led { led: 0, on: true },
                Statement::Sound(false),
            ]
        );
        assert_eq!(lines[0].number, 2);
        assert_eq!(lines[2].number, 5);
    }

    #[test]
    fn test_press_default_ticks() {
        let lines = parse_script("press 16").unwrap();
        assert_eq!(
            lines[0].statement,
            Statement::Press {
                code: 16,
                ticks: DEFAULT_PRESS_TICKS
            }
        );
    }

    #[test]
    fn test_byte_formats() {
        assert_eq!(parse_byte("0").unwrap(), 0);
        assert_eq!(parse_byte("255").unwrap(), 255);
        assert_eq!(parse_byte("0x5A").unwrap(), 0x5A);
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("0xZZ").is_err());
        assert!(parse_byte("-1").is_err());
    }

    #[test]
    fn test_error_names_line() {
        let err = parse_script("check\nfetch\nbogus 1\n").unwrap_err();
        assert!(format!("{:#}", err).contains("line 3"));

        let err = parse_script("write 1 2 300").unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("line 1"));
        assert!(message.contains("`300` is not a byte"));
    }

    #[test]
    fn test_arity_checked() {
        assert!(parse_script("check 1").is_err());
        assert!(parse_script("led 1").is_err());
        assert!(parse_script("read").is_err());
        assert!(parse_script("expect").is_err());
        assert!(parse_script("repeat maybe").is_err());
    }
}
