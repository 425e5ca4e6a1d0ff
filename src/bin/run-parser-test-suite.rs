#![warn(clippy::pedantic)]

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;

use yaml_reader::{ParseEventType, Parser, ScalarStyle};

fn run(input: &[u8], stdout: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    let mut parser = Parser::new(input);
    while parser.read()? {
        match parser.current_event_type() {
            ParseEventType::Nothing => writeln!(stdout, "???")?,
            ParseEventType::StreamStart => writeln!(stdout, "+STR")?,
            ParseEventType::StreamEnd => writeln!(stdout, "-STR")?,
            ParseEventType::DocumentStart => writeln!(stdout, "+DOC")?,
            ParseEventType::DocumentEnd => writeln!(stdout, "-DOC")?,
            ParseEventType::Alias => {
                let name = parser.try_get_current_anchor().map_or("", |anchor| anchor.name());
                writeln!(stdout, "=ALI *{name}")?;
            }
            ParseEventType::Scalar => {
                write!(stdout, "=VAL")?;
                write_properties(&parser, stdout)?;
                stdout.write_all(match parser.current_scalar_style() {
                    Some(ScalarStyle::SingleQuoted) => b" '",
                    Some(ScalarStyle::DoubleQuoted) => b" \"",
                    Some(ScalarStyle::Literal) => b" |",
                    Some(ScalarStyle::Folded) => b" >",
                    _ => b" :",
                })?;
                print_escaped(stdout, parser.try_get_scalar_as_bytes().unwrap_or_default())?;
                writeln!(stdout)?;
            }
            ParseEventType::SequenceStart => {
                write!(stdout, "+SEQ")?;
                write_properties(&parser, stdout)?;
                writeln!(stdout)?;
            }
            ParseEventType::SequenceEnd => writeln!(stdout, "-SEQ")?,
            ParseEventType::MappingStart => {
                write!(stdout, "+MAP")?;
                write_properties(&parser, stdout)?;
                writeln!(stdout)?;
            }
            ParseEventType::MappingEnd => writeln!(stdout, "-MAP")?,
        }
    }
    Ok(())
}

fn write_properties(parser: &Parser<'_>, stdout: &mut dyn Write) -> io::Result<()> {
    if let Some(anchor) = parser.try_get_current_anchor() {
        write!(stdout, " {anchor}")?;
    }
    if let Some(tag) = parser.try_get_current_tag() {
        write!(stdout, " <{tag}>")?;
    }
    Ok(())
}

fn print_escaped(stdout: &mut dyn Write, bytes: &[u8]) -> io::Result<()> {
    for byte in bytes {
        let repr: &[u8] = match byte {
            b'\\' => b"\\\\",
            b'\0' => b"\\0",
            b'\x08' => b"\\b",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            c => std::slice::from_ref(c),
        };
        stdout.write_all(repr)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = env::args_os().skip(1);
    if args.len() == 0 {
        let _ = writeln!(io::stderr(), "Usage: run-parser-test-suite <in.yaml>...");
        return ExitCode::FAILURE;
    }
    let mut stdout = io::stdout().lock();
    for arg in args {
        let result = fs::read(&arg)
            .map_err(Box::<dyn Error>::from)
            .and_then(|input| run(&input, &mut stdout));
        if let Err(err) = result {
            let _ = writeln!(io::stderr(), "{}: {err}", arg.to_string_lossy());
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
