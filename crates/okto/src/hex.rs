//! Minimal Intel HEX reader: data (00) and end-of-file (01) records.

use anyhow::{bail, ensure, Context, Result};

/// One data record: `data` belongs at `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub address: u16,
    pub data: Vec<u8>,
}

/// Parse a whole HEX image. Blank lines are skipped; parsing stops at the
/// end-of-file record.
pub fn parse(text: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_record(line).with_context(|| format!("bad record on line {}", index + 1))? {
            Some(record) => records.push(record),
            None => break,
        }
    }
    Ok(records)
}

fn parse_record(line: &str) -> Result<Option<Record>> {
    let body = line
        .strip_prefix(':')
        .context("record does not start with ':'")?;
    let raw = hex_bytes(body)?;
    ensure!(raw.len() >= 5, "record too short");

    let count = raw[0] as usize;
    ensure!(
        raw.len() == count + 5,
        "record length does not match its count field"
    );

    let sum = raw.iter().fold(0u8, |acc, byte| acc.wrapping_add(*byte));
    ensure!(sum == 0, "checksum mismatch");

    let address = u16::from_be_bytes([raw[1], raw[2]]);
    match raw[3] {
        0x00 => Ok(Some(Record {
            address,
            data: raw[4..4 + count].to_vec(),
        })),
        0x01 => Ok(None),
        kind => bail!("unsupported record type {kind:#04x}"),
    }
}

fn hex_bytes(text: &str) -> Result<Vec<u8>> {
    ensure!(text.is_ascii(), "record contains non-ASCII characters");
    ensure!(text.len() % 2 == 0, "odd number of hex digits");
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).context("invalid hex digit"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_records_until_eof() {
        let image = ":0501000048656C6C6F06\n:00000001FF\n:0100000000FF\n";
        let records = parse(image).unwrap();

        assert_eq!(
            records,
            vec![Record {
                address: 0x0100,
                data: b"Hello".to_vec(),
            }]
        );
    }

    #[test]
    fn skips_blank_lines() {
        let image = "\n:0200100041426B\n\n:00000001FF\n";
        let records = parse(image).unwrap();
        assert_eq!(records[0].address, 0x0010);
        assert_eq!(records[0].data, b"AB");
    }

    #[test]
    fn rejects_a_bad_checksum() {
        let err = parse(":0200100041420C\n").unwrap_err();
        assert!(format!("{err:#}").contains("checksum"));
    }

    #[test]
    fn rejects_a_missing_colon() {
        assert!(parse("0200100041420B\n").is_err());
    }

    #[test]
    fn rejects_a_truncated_record() {
        assert!(parse(":05010000486506\n").is_err());
    }

    #[test]
    fn rejects_unknown_record_types() {
        // Type 04 (extended linear address) is out of scope for 64 KiB.
        let err = parse(":020000040000FA\n").unwrap_err();
        assert!(format!("{err:#}").contains("record type"));
    }
}
