// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal ZIP writer
//!
//! Builds the export archive in memory: deflate-compressed entries,
//! a central directory and the end-of-central-directory record. No
//! ZIP64, encryption or streaming; the export bundle is two small
//! files.

use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};

use crate::error::Result;

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
const EOCD_SIG: u32 = 0x0605_4b50;

const METHOD_DEFLATE: u16 = 8;
const VERSION_NEEDED: u16 = 20;

// 2024-01-01 00:00:00 in DOS format, so archives are byte-reproducible
const DOS_DATE: u16 = ((2024 - 1980) << 9) | (1 << 5) | 1;
const DOS_TIME: u16 = 0;

struct Entry {
    name: String,
    crc: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    header_offset: u32,
}

/// Writes a ZIP archive into an in-memory buffer
pub struct ZipWriter {
    buf: Vec<u8>,
    entries: Vec<Entry>,
}

impl ZipWriter {
    pub fn new() -> Self {
        ZipWriter {
            buf: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Compress and append one file entry
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<()> {
        let mut crc = Crc::new();
        crc.update(data);

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;

        let entry = Entry {
            name: name.to_string(),
            crc: crc.sum(),
            compressed_size: compressed.len() as u32,
            uncompressed_size: data.len() as u32,
            header_offset: self.buf.len() as u32,
        };

        self.put_u32(LOCAL_HEADER_SIG);
        self.put_u16(VERSION_NEEDED);
        self.put_u16(0); // general purpose flags
        self.put_u16(METHOD_DEFLATE);
        self.put_u16(DOS_TIME);
        self.put_u16(DOS_DATE);
        self.put_u32(entry.crc);
        self.put_u32(entry.compressed_size);
        self.put_u32(entry.uncompressed_size);
        self.put_u16(entry.name.len() as u16);
        self.put_u16(0); // extra field length
        self.buf.extend_from_slice(entry.name.as_bytes());
        self.buf.extend_from_slice(&compressed);

        self.entries.push(entry);
        Ok(())
    }

    /// Write the central directory and return the finished archive
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let central_offset = self.buf.len() as u32;

        let entries = std::mem::take(&mut self.entries);
        for entry in &entries {
            self.put_u32(CENTRAL_HEADER_SIG);
            self.put_u16(VERSION_NEEDED); // version made by
            self.put_u16(VERSION_NEEDED);
            self.put_u16(0); // general purpose flags
            self.put_u16(METHOD_DEFLATE);
            self.put_u16(DOS_TIME);
            self.put_u16(DOS_DATE);
            self.put_u32(entry.crc);
            self.put_u32(entry.compressed_size);
            self.put_u32(entry.uncompressed_size);
            self.put_u16(entry.name.len() as u16);
            self.put_u16(0); // extra field length
            self.put_u16(0); // comment length
            self.put_u16(0); // disk number
            self.put_u16(0); // internal attributes
            self.put_u32(0); // external attributes
            self.put_u32(entry.header_offset);
            self.buf.extend_from_slice(entry.name.as_bytes());
        }
        let central_size = self.buf.len() as u32 - central_offset;

        self.put_u32(EOCD_SIG);
        self.put_u16(0); // this disk
        self.put_u16(0); // central directory disk
        self.put_u16(entries.len() as u16);
        self.put_u16(entries.len() as u16);
        self.put_u32(central_size);
        self.put_u32(central_offset);
        self.put_u16(0); // comment length

        Ok(self.buf)
    }

    fn put_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    fn put_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }
}

impl Default for ZipWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u16(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn read_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    #[test]
    fn test_archive_structure() {
        let mut writer = ZipWriter::new();
        writer.add_file("model.glb", b"not really a model").unwrap();
        writer.add_file("schedule.html", b"<html></html>").unwrap();
        let archive = writer.finish().unwrap();

        // No comment, so the EOCD is the trailing 22 bytes
        let eocd = archive.len() - 22;
        assert_eq!(read_u32(&archive, eocd), EOCD_SIG);
        assert_eq!(read_u16(&archive, eocd + 8), 2);
        assert_eq!(read_u16(&archive, eocd + 10), 2);

        let central_size = read_u32(&archive, eocd + 12) as usize;
        let central_offset = read_u32(&archive, eocd + 16) as usize;
        assert_eq!(central_offset + central_size, eocd);
        assert_eq!(read_u32(&archive, central_offset), CENTRAL_HEADER_SIG);

        // First central entry points back at the first local header
        let first_offset = read_u32(&archive, central_offset + 42) as usize;
        assert_eq!(first_offset, 0);
        assert_eq!(read_u32(&archive, 0), LOCAL_HEADER_SIG);
        assert_eq!(read_u16(&archive, 8), METHOD_DEFLATE);
        let name_len = read_u16(&archive, 26) as usize;
        assert_eq!(&archive[30..30 + name_len], b"model.glb");
    }

    #[test]
    fn test_crc_and_sizes_recorded() {
        let data = b"abcabcabcabcabcabcabcabc";
        let mut writer = ZipWriter::new();
        writer.add_file("a.txt", data).unwrap();
        let archive = writer.finish().unwrap();

        let mut crc = Crc::new();
        crc.update(data);
        assert_eq!(read_u32(&archive, 14), crc.sum());
        assert_eq!(read_u32(&archive, 22), data.len() as u32);
        // Repetitive input must actually compress
        assert!((read_u32(&archive, 18) as usize) < data.len());
    }

    #[test]
    fn test_empty_archive() {
        let archive = ZipWriter::new().finish().unwrap();
        assert_eq!(archive.len(), 22);
        assert_eq!(read_u32(&archive, 0), EOCD_SIG);
    }

    #[test]
    fn test_deterministic_output() {
        let build = || {
            let mut writer = ZipWriter::new();
            writer.add_file("model.glb", b"payload").unwrap();
            writer.finish().unwrap()
        };
        assert_eq!(build(), build());
    }
}
