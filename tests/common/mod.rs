#![allow(dead_code)]

pub mod command;

pub const EMPTY_TREE_OID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Decompress a loose object from `<git_dir>/objects`
pub fn read_object(git_dir: &std::path::Path, oid: &str) -> Vec<u8> {
    use std::io::Read;

    let compressed = std::fs::read(git_dir.join("objects").join(&oid[..2]).join(&oid[2..]))
        .expect("object file should exist");
    let mut decoder = flate2::read::ZlibDecoder::new(compressed.as_slice());
    let mut content = Vec::new();
    decoder
        .read_to_end(&mut content)
        .expect("object file should be zlib data");
    content
}

// Helper function to create hexdump representation
pub fn to_hexdump(data: &[u8]) -> String {
    let mut result = String::new();
    for (i, chunk) in data.chunks(16).enumerate() {
        result.push_str(&format!("{:08x}: ", i * 16));

        for (j, byte) in chunk.iter().enumerate() {
            if j == 8 {
                result.push(' ');
            }
            result.push_str(&format!("{:02x} ", byte));
        }

        for j in chunk.len()..16 {
            if j == 8 {
                result.push(' ');
            }
            result.push_str("   ");
        }

        result.push_str(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() {
                result.push(*byte as char);
            } else {
                result.push('.');
            }
        }
        result.push_str("|\n");
    }
    result
}

// Macro to compare raw object or index bytes with hexdump output on failure
#[macro_export]
macro_rules! assert_bytes_eq {
    ($actual:expr, $expected:expr) => {
        if $actual != $expected {
            pretty_assertions::assert_eq!(
                common::to_hexdump($actual),
                common::to_hexdump($expected),
                "\n=== CONTENTS DIFFER ===\nactual ({} bytes) vs expected ({} bytes)",
                $actual.len(),
                $expected.len()
            );
        }
    };
}
