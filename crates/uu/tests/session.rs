//! Integration tests for the blocking encode and decode sessions.

use std::io::{self, Read, Write};

use micro_uu::codec::MAX_HEADER_BYTES;
use micro_uu::session::{decode_slice, encode_to_vec};
use micro_uu::{DecodeError, Decoder, Encoder, ErrorKind, Header};

/// Deterministic pseudo random bytes.
fn sample_data(len: usize, seed: u32) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 16) as u8
        })
        .collect()
}

/// Reader handing out a single byte per call.
struct OneByteReader<'a> {
    data: &'a [u8],
    reads: usize,
}

impl<'a> OneByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, reads: 0 }
    }
}

impl Read for OneByteReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        if self.data.is_empty() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.data[0];
        self.data = &self.data[1..];
        Ok(1)
    }
}

fn encode_chunked(header: Header, data: &[u8], chunk_size: usize) -> Vec<u8> {
    let mut encoder = Encoder::new(Vec::new(), header);
    for chunk in data.chunks(chunk_size) {
        encoder.write_all(chunk).unwrap();
    }
    encoder.finish().unwrap()
}

fn decode_all<R: Read>(mut decoder: Decoder<R>) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    let mut buf = [0u8; 7];
    loop {
        let n = decoder.read_decoded(&mut buf)?;
        if n == 0 {
            return Ok(out);
        }
        out.extend_from_slice(&buf[..n]);
    }
}

#[test]
fn test_round_trip_boundary_lengths() {
    for len in [0, 1, 2, 3, 44, 45, 46, 89, 90, 91] {
        let data = sample_data(len, len as u32);
        let text = encode_to_vec(Header::new(0o640, "data.bin").unwrap(), &data).unwrap();

        let (header, decoded) = decode_slice(&text).unwrap();
        assert_eq!(header.mode(), 0o640, "len {len}");
        assert_eq!(header.name(), "data.bin", "len {len}");
        assert_eq!(decoded, data, "len {len}");
    }
}

#[test]
fn test_round_trip_random_lengths_and_chunks() {
    let mut seed = 7u32;
    for _ in 0..32 {
        seed = seed.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
        let len = (seed % 4096) as usize;
        let chunk_size = (seed >> 12) as usize % 97 + 1;
        let data = sample_data(len, seed);

        let text = encode_chunked(Header::new(0o755, "run.sh").unwrap(), &data, chunk_size);
        let mut decoder = Decoder::with_capacity(&text[..], chunk_size);
        assert_eq!(decoder.mode().unwrap(), 0o755);
        assert_eq!(decode_all(decoder).unwrap(), data, "len {len} chunk {chunk_size}");
    }
}

#[test]
fn test_one_byte_reader() {
    let data = sample_data(200, 1);
    let text = encode_to_vec(Header::new(0o600, "a b c").unwrap(), &data).unwrap();

    let mut decoder = Decoder::new(OneByteReader::new(&text));
    assert_eq!(decoder.name().unwrap(), "a b c");
    assert_eq!(decode_all(decoder).unwrap(), data);
}

#[test]
fn test_chunk_boundaries_do_not_change_output() {
    let data = sample_data(1000, 3);
    let whole = encode_to_vec(Header::new(0o644, "x").unwrap(), &data).unwrap();

    for chunk_size in [1, 2, 3, 44, 45, 46, 512] {
        assert_eq!(encode_chunked(Header::new(0o644, "x").unwrap(), &data, chunk_size), whole, "chunk {chunk_size}");
    }
}

#[test]
fn test_line_shape() {
    let data = sample_data(1000, 9);
    let text = encode_to_vec(Header::new(0o644, "shape").unwrap(), &data).unwrap();

    let lines: Vec<&[u8]> = text.split(|&b| b == b'\n').collect();
    // header, data lines, zero line, end, and the empty rest after the final newline
    assert_eq!(lines[0], b"begin 644 shape");
    assert_eq!(lines[lines.len() - 3], b"`");
    assert_eq!(lines[lines.len() - 2], b"end");
    assert_eq!(lines[lines.len() - 1], b"");

    let data_lines = &lines[1..lines.len() - 3];
    assert_eq!(data_lines.len(), 1000usize.div_ceil(45));

    let mut total = 0;
    for line in data_lines {
        let (len_char, symbols) = line.split_first().unwrap();
        assert!(*len_char <= b'M');
        assert_eq!(symbols.len() % 4, 0);
        assert!(symbols.len() <= 60);
        assert!(symbols.iter().all(|&b| (b'!'..=b'`').contains(&b)));
        total += usize::from(len_char - b' ');
    }
    assert_eq!(total, 1000);
}

#[test]
fn test_scenario_encode_cat() {
    let text = encode_to_vec(Header::new(0o644, "cat.txt").unwrap(), b"Cat").unwrap();
    assert_eq!(text, b"begin 644 cat.txt\n#0V%T\n`\nend\n");
}

#[test]
fn test_scenario_decode_cat() {
    let mut decoder = Decoder::new(&b"begin 644 cat.txt\n#0V%T\n`\nend\n"[..]);
    assert_eq!(decoder.mode().unwrap(), 0o644);
    assert_eq!(decoder.name().unwrap(), "cat.txt");

    let mut data = Vec::new();
    decoder.read_to_end(&mut data).unwrap();
    assert_eq!(data, b"Cat");
    assert!(decoder.is_done());
}

#[test]
fn test_scenario_truncated_after_header() {
    let mut decoder = Decoder::new(&b"begin 644 cat.txt\n"[..]);
    assert_eq!(decoder.name().unwrap(), "cat.txt");

    let err = decoder.read_decoded(&mut [0u8; 8]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PrematureEof);
}

#[test]
fn test_scenario_invalid_mode() {
    let mut decoder = Decoder::new(&b"begin abc cat.txt\n#0V%T\n`\nend\n"[..]);

    assert_eq!(decoder.header().unwrap_err().kind(), ErrorKind::InvalidMode);
    assert_eq!(decoder.read_decoded(&mut [0u8; 8]).unwrap_err().kind(), ErrorKind::InvalidMode);
}

#[test]
fn test_header_access_is_idempotent() {
    let text = encode_to_vec(Header::new(0o644, "cat.txt").unwrap(), b"Cat").unwrap();
    let mut decoder = Decoder::with_capacity(OneByteReader::new(&text), 1);

    let first = decoder.header().unwrap().clone();
    let reads = decoder.get_ref().reads;

    for _ in 0..3 {
        assert_eq!(decoder.header().unwrap(), &first);
        assert_eq!(decoder.mode().unwrap(), 0o644);
        assert_eq!(decoder.name().unwrap(), "cat.txt");
    }
    assert_eq!(decoder.get_ref().reads, reads);

    assert_eq!(decode_all(decoder).unwrap(), b"Cat");
}

#[test]
fn test_bad_framing_yields_no_partial_output() {
    // 9 symbols: not a whole number of groups
    let mut decoder = Decoder::new(&b"begin 644 a\n&0V%T0V%T0\n`\nend\n"[..]);
    let mut buf = [0xAAu8; 16];

    let err = decoder.read_decoded(&mut buf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadFraming);
    assert!(buf.iter().all(|&b| b == 0xAA));
}

#[test]
fn test_line_too_long_yields_no_partial_output() {
    let mut input = b"begin 644 a\nM".to_vec();
    input.extend_from_slice(&[b'!'; 68]);
    input.extend_from_slice(b"\n`\nend\n");

    let mut decoder = Decoder::new(&input[..]);
    let mut buf = [0xAAu8; 64];

    let err = decoder.read_decoded(&mut buf).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LineTooLong);
    assert!(buf.iter().all(|&b| b == 0xAA));
}

#[test]
fn test_oversized_header_fails_for_any_read_size() {
    let name = "n".repeat(3000);
    let mut input = format!("begin 644 {name}\n").into_bytes();
    input.extend_from_slice(b"#0V%T\n`\nend\n");

    let mut decoder = Decoder::new(&input[..]);
    assert_eq!(decoder.header().unwrap_err().kind(), ErrorKind::MalformedHeader);

    let mut decoder = Decoder::with_capacity(&input[..], 1);
    assert_eq!(decoder.header().unwrap_err().kind(), ErrorKind::MalformedHeader);

    // the same name is fine when it fits
    let name = "n".repeat(MAX_HEADER_BYTES - "begin 644 \n".len());
    let text = encode_to_vec(Header::new(0o644, name.clone()).unwrap(), b"Cat").unwrap();
    for capacity in [1, 7, 8 * 1024] {
        let mut decoder = Decoder::with_capacity(&text[..], capacity);
        assert_eq!(decoder.name().unwrap(), name, "capacity {capacity}");
    }
}

#[test]
fn test_crlf_input() {
    let (header, data) = decode_slice(b"begin 644 cat.txt\r\n#0V%T\r\n`\r\nend\r\n").unwrap();
    assert_eq!(header.name(), "cat.txt");
    assert_eq!(data, b"Cat");
}

#[test]
fn test_space_is_read_as_zero() {
    let (_, data) = decode_slice(b"begin 644 a\n!0P  \n \nend\n").unwrap();
    assert_eq!(data, b"C");
}

#[test]
fn test_already_finalized() {
    let mut encoder = Encoder::new(Vec::new(), Header::new(0o644, "a").unwrap());
    encoder.write_all(b"abc").unwrap();
    encoder.finalize().unwrap();
    let written = encoder.get_ref().clone();

    assert_eq!(encoder.write_bytes(b"d").unwrap_err().kind(), ErrorKind::AlreadyFinalized);
    assert_eq!(encoder.finalize().unwrap_err().kind(), ErrorKind::AlreadyFinalized);
    assert_eq!(encoder.into_inner(), written);
}

#[test]
fn test_unexpected_trailer() {
    let err = decode_slice(b"begin 644 a\n#0V%T\n`\nfin\n").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedTrailer);
}

#[test]
fn test_missing_line_terminator() {
    let err = decode_slice(b"begin 644 a\n#0V%T").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingLineTerminator);
}
