use sreclib::{Srec, SrecError};
use std::env;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

struct Config {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    start: usize,
    end: usize,
    fill: u8,
    offset: u32,
    verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            start: 0x0000,
            end: 0x10000,
            fill: 0xFF,
            offset: 0,
            verbose: false,
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");

    println!(" --------------------------------------------");
    println!("|  S-Record to Binary Converter  |  v{version}  |");
    println!(" --------------------------------------------");
    println!("\nUsage:");
    println!("  srec2bin [options] [<srec_file>]");
    println!("\nReads S-record text from <srec_file>, or from stdin when omitted.");
    println!("\nOptions:");
    println!("  -v, --verbose        Display additional runtime information");
    println!("  -s, --start <val>    Start address for output, default is 0");
    println!("  -e, --end <val>      End address (last + 1) for output, default is 0x10000");
    println!("  -f, --fill <val>     Fill byte for unoccupied space, default is 0xFF");
    println!("      --offset <val>   Base offset subtracted from record addresses, default is 0");
    println!("  -o, --output <path>  Output file name, default is <srec_file>.bin or out.bin for stdin");
    println!("\nExamples:");
    println!("  srec2bin firmware.srec");
    println!("  srec2bin -s 0x8000 -e 0x10000 -f 0x00 firmware.srec -o firmware.bin");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let config = match parse_args(&args[1..]) {
        Ok(Some(config)) => config,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let env = env_logger::Env::default().filter_or(
        "SREC2BIN_LOG",
        if config.verbose { "info" } else { "warn" },
    );
    env_logger::init_from_env(env);

    if let Err(e) = run(&config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Process the command line. `Ok(None)` means help was requested.
fn parse_args(args: &[String]) -> Result<Option<Config>, Box<dyn std::error::Error>> {
    let mut config = Config::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "help" | "-h" | "--help" => return Ok(None),
            "-v" | "--verbose" => config.verbose = true,
            "-s" | "--start" => config.start = parse_num(flag_value(&mut iter, arg)?)?,
            "-e" | "--end" => config.end = parse_num(flag_value(&mut iter, arg)?)?,
            "-f" | "--fill" => {
                // Only the low byte matters for the fill value
                config.fill = (parse_num(flag_value(&mut iter, arg)?)? % 0x100) as u8;
            }
            "--offset" => config.offset = u32::try_from(parse_num(flag_value(&mut iter, arg)?)?)?,
            "-o" | "--output" => {
                config.output = Some(PathBuf::from(flag_value(&mut iter, arg)?));
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option: {arg}").into());
            }
            _ => {
                // Guard: only one positional input argument
                if config.input.is_some() {
                    return Err(format!("Unexpected argument: {arg}").into());
                }
                config.input = Some(PathBuf::from(arg));
            }
        }
    }

    Ok(Some(config))
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Read the whole input up front; error reporting needs the raw lines
    let (raw, input_name) = match &config.input {
        Some(path) => {
            // Guard: input file must exist
            if !path.is_file() {
                return Err(format!("File not found: {}", path.display()).into());
            }
            (std::fs::read(path)?, path.display().to_string())
        }
        None => {
            let mut raw = Vec::new();
            std::io::stdin().read_to_end(&mut raw)?;
            (raw, String::from("<stdin>"))
        }
    };

    log::info!("Start address: 0x{:04x}", config.start);
    log::info!("End address: 0x{:04x}", config.end);
    log::info!("Filling with: 0x{:02x}", config.fill);

    let mut srec = Srec::new();
    srec.size = raw.len();
    if let Err(e) = srec.parse(&raw) {
        report_parse_error(&e, &raw, &input_name);
        process::exit(1);
    }

    log::info!("S-Records processed: {}", srec.records().len());

    let image = srec.to_image(config.fill, config.offset)?;
    if image.duplicate_writes() > 0 {
        log::info!("Duplicate writes: {}", image.duplicate_writes());
    }
    log::info!("Total bytes processed: {}", image.bytes_written());

    let out_path = match &config.output {
        Some(path) => path.clone(),
        None => derive_output_name(config.input.as_deref()),
    };
    log::info!("Writing to output file {}", out_path.display());
    std::fs::write(&out_path, image.window(config.start, config.end))?;

    Ok(())
}

// =============================== HELPER FUNCTIONS ===============================

/// Report a fatal parse error with everything a user needs: the line
/// number, the offending raw line (rendered lossily in case the input is
/// binary rather than text) and the failing field.
fn report_parse_error(error: &SrecError, raw: &[u8], input_name: &str) {
    if let SrecError::ParseRecordError(kind, line_no) = error {
        let line = raw.split(|&b| b == b'\n').nth(line_no - 1).unwrap_or(b"");
        eprintln!("Error in {input_name}, line {line_no}:");
        eprintln!("{}", String::from_utf8_lossy(line).trim_end());
        eprintln!("{kind}");
    } else {
        eprintln!("Error: {error}");
    }
    eprintln!("Program terminated.");
}

/// If the output file name is not specified, derive it from the input name.
fn derive_output_name(input: Option<&Path>) -> PathBuf {
    match input {
        Some(path) => path.with_extension("bin"),
        None => PathBuf::from("out.bin"),
    }
}

/// Parse a numeric argument: `0x`-prefixed hex, or decimal.
fn parse_num(s: &str) -> Result<usize, std::num::ParseIntError> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return usize::from_str_radix(hex, 16);
    }

    s.parse()
}

/// Find the value after a flag (e.g. "--fill 0xFF").
fn flag_value<'a>(
    iter: &mut std::slice::Iter<'a, String>,
    flag: &str,
) -> Result<&'a String, String> {
    iter.next()
        .ok_or_else(|| format!("Missing value after '{flag}'"))
}
