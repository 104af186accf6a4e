use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::cli::OutputFormat;

/// Write the random bytes to stdout or a file in the requested format.
pub fn write_output(
    bytes: &[u8],
    format: OutputFormat,
    output_file: Option<&Path>,
) -> io::Result<()> {
    match output_file {
        Some(path) => {
            let f = File::create(path)?;
            let mut out = BufWriter::new(f);
            format_output(bytes, format, &mut out)?;
            out.flush()
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            format_output(bytes, format, &mut out)?;
            out.flush()
        }
    }
}

fn format_output(bytes: &[u8], format: OutputFormat, out: &mut dyn Write) -> io::Result<()> {
    match format {
        OutputFormat::Hex => {
            for b in bytes {
                write!(out, "{b:02x}")?;
            }
            writeln!(out)?;
        }
        OutputFormat::Raw => {
            out.write_all(bytes)?;
        }
        OutputFormat::Base64 => {
            writeln!(out, "{}", STANDARD.encode(bytes))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format_to_string(bytes: &[u8], fmt: OutputFormat) -> String {
        let mut buf = Vec::new();
        format_output(bytes, fmt, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn hex_format() {
        let out = format_to_string(&[0xde, 0xad, 0xbe, 0xef], OutputFormat::Hex);
        assert_eq!(out, "deadbeef\n");
    }

    #[test]
    fn raw_format() {
        let data = vec![0x01, 0x02, 0x03];
        let mut buf = Vec::new();
        format_output(&data, OutputFormat::Raw, &mut buf).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn base64_format() {
        let out = format_to_string(&[0x00, 0x01, 0x02], OutputFormat::Base64);
        assert_eq!(out, "AAEC\n");
    }
}
