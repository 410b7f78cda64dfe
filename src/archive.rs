//! Minimal in-memory reader for the Zip32 archives the prize reports ship
//! in. Supports stored (method 0) and deflate (method 8) entries; encrypted
//! entries are skipped. Zip64 and multi-disk archives are out of range for
//! these downloads. All offsets are validated against the buffer length.

use anyhow::{bail, Context, Result};
use flate2::read::DeflateDecoder;
use std::io::Read;

const EOCD_SIG: u32 = 0x0605_4b50;
const CENTRAL_SIG: u32 = 0x0201_4b50;
const LOCAL_SIG: u32 = 0x0403_4b50;

// End-of-central-directory record without its trailing comment.
const EOCD_MIN_LEN: usize = 22;

#[derive(Debug)]
pub struct ZipEntry {
    pub name: String,
    pub data: Vec<u8>,
}

/// Extract every readable entry of a Zip32 archive held in memory.
pub fn extract(bytes: &[u8]) -> Result<Vec<ZipEntry>> {
    let eocd = find_eocd(bytes).context("no end-of-central-directory record")?;
    let entry_count = read_u16(bytes, eocd + 10)? as usize;
    let cd_offset = read_u32(bytes, eocd + 16)? as usize;

    let mut entries = Vec::with_capacity(entry_count);
    let mut pos = cd_offset;

    for _ in 0..entry_count {
        if read_u32(bytes, pos)? != CENTRAL_SIG {
            bail!("central directory entry has a bad signature at offset {pos}");
        }
        let flags = read_u16(bytes, pos + 8)?;
        let method = read_u16(bytes, pos + 10)?;
        let compressed_size = read_u32(bytes, pos + 20)? as usize;
        let name_len = read_u16(bytes, pos + 28)? as usize;
        let extra_len = read_u16(bytes, pos + 30)? as usize;
        let comment_len = read_u16(bytes, pos + 32)? as usize;
        let local_offset = read_u32(bytes, pos + 42)? as usize;
        let name: String = slice(bytes, pos + 46, name_len)?
            .iter()
            .map(|&b| b as char)
            .collect();
        pos += 46 + name_len + extra_len + comment_len;

        // flag bit 0: encrypted entry
        if flags & 0x1 != 0 {
            continue;
        }

        let data = read_entry_data(bytes, local_offset, method, compressed_size)
            .with_context(|| format!("entry {name:?}"))?;
        entries.push(ZipEntry { name, data });
    }

    Ok(entries)
}

fn read_entry_data(
    bytes: &[u8],
    local_offset: usize,
    method: u16,
    compressed_size: usize,
) -> Result<Vec<u8>> {
    if read_u32(bytes, local_offset)? != LOCAL_SIG {
        bail!("local header has a bad signature at offset {local_offset}");
    }
    let name_len = read_u16(bytes, local_offset + 26)? as usize;
    let extra_len = read_u16(bytes, local_offset + 28)? as usize;
    // Sizes come from the central directory: local headers written with a
    // trailing data descriptor (flag bit 3) carry zeros here.
    let compressed = slice(bytes, local_offset + 30 + name_len + extra_len, compressed_size)?;

    match method {
        0 => Ok(compressed.to_vec()),
        8 => {
            let mut data = Vec::new();
            DeflateDecoder::new(compressed)
                .read_to_end(&mut data)
                .context("deflate stream is corrupt")?;
            Ok(data)
        }
        other => bail!("unsupported compression method {other}"),
    }
}

fn find_eocd(bytes: &[u8]) -> Option<usize> {
    if bytes.len() < EOCD_MIN_LEN {
        return None;
    }
    // The record sits at the very end, before an optional comment of at
    // most u16::MAX bytes; scan backwards for the signature.
    let last = bytes.len() - EOCD_MIN_LEN;
    let floor = last.saturating_sub(u16::MAX as usize);
    (floor..=last)
        .rev()
        .find(|&i| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]) == EOCD_SIG)
}

fn read_u16(bytes: &[u8], offset: usize) -> Result<u16> {
    let b = slice(bytes, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    let b = slice(bytes, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn slice(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .context("truncated archive")
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::DeflateEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn push_u16(out: &mut Vec<u8>, value: u16) {
        out.extend_from_slice(&value.to_le_bytes());
    }

    fn push_u32(out: &mut Vec<u8>, value: u32) {
        out.extend_from_slice(&value.to_le_bytes());
    }

    /// Build a single-entry Zip32 archive by hand.
    fn build_zip(name: &str, payload: &[u8], method: u16, uncompressed_len: u32) -> Vec<u8> {
        let mut out = Vec::new();

        // local file header
        push_u32(&mut out, LOCAL_SIG);
        push_u16(&mut out, 20); // version needed
        push_u16(&mut out, 0); // flags
        push_u16(&mut out, method);
        push_u16(&mut out, 0); // mod time
        push_u16(&mut out, 0); // mod date
        push_u32(&mut out, 0); // crc-32 (unchecked by the reader)
        push_u32(&mut out, payload.len() as u32);
        push_u32(&mut out, uncompressed_len);
        push_u16(&mut out, name.len() as u16);
        push_u16(&mut out, 0); // extra len
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(payload);

        // central directory
        let cd_offset = out.len() as u32;
        push_u32(&mut out, CENTRAL_SIG);
        push_u16(&mut out, 20); // version made by
        push_u16(&mut out, 20); // version needed
        push_u16(&mut out, 0); // flags
        push_u16(&mut out, method);
        push_u16(&mut out, 0); // mod time
        push_u16(&mut out, 0); // mod date
        push_u32(&mut out, 0); // crc-32
        push_u32(&mut out, payload.len() as u32);
        push_u32(&mut out, uncompressed_len);
        push_u16(&mut out, name.len() as u16);
        push_u16(&mut out, 0); // extra len
        push_u16(&mut out, 0); // comment len
        push_u16(&mut out, 0); // disk number
        push_u16(&mut out, 0); // internal attrs
        push_u32(&mut out, 0); // external attrs
        push_u32(&mut out, 0); // local header offset
        out.extend_from_slice(name.as_bytes());
        let cd_size = out.len() as u32 - cd_offset;

        // end of central directory
        push_u32(&mut out, EOCD_SIG);
        push_u16(&mut out, 0); // disk number
        push_u16(&mut out, 0); // cd start disk
        push_u16(&mut out, 1); // entries on this disk
        push_u16(&mut out, 1); // total entries
        push_u32(&mut out, cd_size);
        push_u32(&mut out, cd_offset);
        push_u16(&mut out, 0); // comment len
        out
    }

    #[test]
    fn extracts_a_stored_entry() {
        let zip = build_zip("report.txt", b"hello", 0, 5);
        let entries = extract(&zip).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "report.txt");
        assert_eq!(entries[0].data, b"hello");
    }

    #[test]
    fn extracts_a_deflated_entry() {
        let text = b"winning bond numbers, repeated: AB001 AB001 AB001";
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(text).unwrap();
        let compressed = encoder.finish().unwrap();

        let zip = build_zip("report.txt", &compressed, 8, text.len() as u32);
        let entries = extract(&zip).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].data, text);
    }

    #[test]
    fn truncated_input_is_an_error() {
        assert!(extract(b"PK\x03\x04").is_err());

        let zip = build_zip("report.txt", b"hello", 0, 5);
        assert!(extract(&zip[..zip.len() - 4]).is_err());
    }

    #[test]
    fn unknown_method_is_an_error() {
        let zip = build_zip("report.txt", b"hello", 12, 5);
        assert!(extract(&zip).is_err());
    }
}
