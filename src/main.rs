use std::io::{self, Read};

use chrono::NaiveDateTime;
use horae::{Config, parse_with};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let config = Config { now: cli.reference, return_matched_text: true, ..Config::default() };
    match parse_with(&cli.input, &config) {
        Ok(result) => {
            for m in &result.matches {
                println!("{:>3}..{:<3} {:<24} {}", m.start, m.end, format!("{:?}", m.text), m.value);
            }
            for u in &result.unparsed {
                println!("{:>3}..{:<3} {:<24} (unparsed)", u.start, u.end, format!("{:?}", u.text));
            }
            if result.matches.is_empty() && result.unparsed.is_empty() {
                println!("(no input)");
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

struct CliConfig {
    input: String,
    reference: Option<NaiveDateTime>,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut reference = None;
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("horae {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--reference" => {
                let value =
                    args.next().ok_or_else(|| "error: --reference expects a value".to_string())?;
                reference = Some(parse_reference(&value)?);
            }
            "--input" | "-i" => {
                let value =
                    args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                set_input(&mut input, value)?;
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    set_input(&mut input, rest)?;
                }
                break;
            }
            _ if arg.starts_with("--reference=") => {
                reference = Some(parse_reference(arg.trim_start_matches("--reference="))?);
            }
            _ if arg.starts_with("--input=") => {
                set_input(&mut input, arg.trim_start_matches("--input=").to_string())?;
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown flag `{arg}` (see --help)"));
            }
            _ => {
                let mut rest = vec![arg];
                rest.extend(args.by_ref());
                set_input(&mut input, rest.join(" "))?;
            }
        }
    }

    let input = match input {
        Some(input) => input,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("error: failed to read stdin: {e}"))?;
            buf.trim().to_string()
        }
    };

    Ok(CliConfig { input, reference })
}

fn set_input(slot: &mut Option<String>, value: String) -> Result<(), String> {
    if slot.is_some() {
        return Err("error: input provided multiple times".to_string());
    }
    *slot = Some(value);
    Ok(())
}

fn parse_reference(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| format!("error: --reference expects YYYY-MM-DDTHH:MM:SS, got `{value}`"))
}

fn print_help() {
    println!(
        "horae - turn natural-language date/time text into typed values

USAGE:
    horae [OPTIONS] [TEXT...]

OPTIONS:
    -i, --input <TEXT>        Text to parse (or pass it as trailing args / stdin)
        --reference <WHEN>    Reference instant, YYYY-MM-DDTHH:MM:SS (default: now)
    -h, --help                Show this help
    -V, --version             Show version

EXAMPLES:
    horae '7/17 4 or 5 PM'
    horae --reference 2018-08-04T14:00:00 -- 3-4 pm
    echo 'lunch tomorrow noon?' | horae"
    );
}
