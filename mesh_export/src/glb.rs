//! The GLB binary container.

pub const MAGIC: u32 = 0x4654_6C67; // "glTF"
pub const VERSION: u32 = 2;
pub const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
pub const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

fn padded_len(len: usize) -> usize {
    len.div_ceil(4) * 4
}

fn push_chunk(out: &mut Vec<u8>, kind: u32, data: &[u8], pad: u8) {
    let len = padded_len(data.len());
    out.extend_from_slice(&(len as u32).to_le_bytes());
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(data);
    out.resize(out.len() + len - data.len(), pad);
}

/// Wraps a glTF JSON document and its binary buffer into a GLB file.
///
/// The JSON chunk is padded with spaces and the BIN chunk with zeros, both to a multiple
/// of four bytes. An empty `bin` omits the BIN chunk.
pub fn assemble(json: &[u8], bin: &[u8]) -> Vec<u8> {
    let mut total = HEADER_LEN + CHUNK_HEADER_LEN + padded_len(json.len());
    if !bin.is_empty() {
        total += CHUNK_HEADER_LEN + padded_len(bin.len());
    }

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());

    push_chunk(&mut out, CHUNK_JSON, json, b' ');
    if !bin.is_empty() {
        push_chunk(&mut out, CHUNK_BIN, bin, 0);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn pads_chunks_to_four_bytes() {
        let glb = assemble(b"{\"a\":1}", &[1, 2, 3, 4, 5]);

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32_at(&glb, 4), 2);
        assert_eq!(u32_at(&glb, 8) as usize, glb.len());

        // 7 bytes of json padded to 8 with a space
        assert_eq!(u32_at(&glb, 12), 8);
        assert_eq!(&glb[16..20], b"JSON");
        assert_eq!(glb[27], b' ');

        // 5 bytes of bin padded to 8 with zeros
        assert_eq!(u32_at(&glb, 28), 8);
        assert_eq!(&glb[32..36], b"BIN\0");
        assert_eq!(&glb[36..44], &[1, 2, 3, 4, 5, 0, 0, 0]);
        assert_eq!(glb.len(), 44);
    }
}
