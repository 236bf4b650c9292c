use crate::pool::{Encoding, LiteralPool};
use crate::stream::{
    GzipStream, RawStream, StreamError, TokenSink, clip_match_run, count_match_runs,
};

#[test]
fn raw_integer_formatting() {
    let mut out = RawStream::with_capacity(64);
    out.open().unwrap();
    out.integer(0).unwrap();
    out.byte(b' ').unwrap();
    out.integer(64738).unwrap();
    out.close().unwrap();
    assert_eq!(out.buffered(), b"0 64738");
    assert_eq!(out.position(), 7);
}

#[test]
fn raw_stream_passes_literals_through() {
    let mut pool = LiteralPool::new(Encoding::Plain);
    let id = pool.intern("blue cats");
    let mut out = RawStream::with_capacity(64);
    out.open().unwrap();
    out.literal(pool.get(id)).unwrap();
    out.literal(pool.get(id)).unwrap();
    out.close().unwrap();
    assert_eq!(out.buffered(), b"blue catsblue cats");
    assert_eq!(out.position(), 18);
}

#[test]
fn full_buffer_reports_and_recovers() {
    let mut pool = LiteralPool::new(Encoding::Plain);
    let id = pool.intern("xxxxx");
    let mut out = RawStream::with_capacity(8);
    out.open().unwrap();
    out.literal(pool.get(id)).unwrap();

    let err = out.literal(pool.get(id)).unwrap_err();
    assert!(matches!(err, StreamError::BufferFull { needed: 5, .. }));
    // The failed emission left no partial bytes behind.
    assert_eq!(out.buffered(), b"xxxxx");
    assert_eq!(out.position(), 5);

    // Draining makes the retry succeed, with the logical position intact.
    out.clear_buffered();
    out.literal(pool.get(id)).unwrap();
    assert_eq!(out.buffered(), b"xxxxx");
    assert_eq!(out.position(), 10);
}

#[test]
fn match_run_clipping_leaves_no_short_tail() {
    assert_eq!(clip_match_run(3), 3);
    assert_eq!(clip_match_run(258), 258);
    assert_eq!(clip_match_run(259), 256); // leaves 3
    assert_eq!(clip_match_run(260), 257); // leaves 3
    assert_eq!(clip_match_run(261), 258); // leaves 3
    assert_eq!(clip_match_run(516), 258); // leaves 258

    assert_eq!(count_match_runs(258), 1);
    assert_eq!(count_match_runs(259), 2);
    assert_eq!(count_match_runs(260), 2);
    assert_eq!(count_match_runs(516), 2);
    assert_eq!(count_match_runs(2), 0);
}

#[test]
fn gzip_header_layout() {
    let mut out = GzipStream::with_capacity(4096).mtime(0x0403_0201);
    out.open().unwrap();
    let bytes = out.buffered();
    assert_eq!(&bytes[..4], &[0x1f, 0x8b, 8, 1]);
    assert_eq!(&bytes[4..8], &[1, 2, 3, 4]);
    assert_eq!(&bytes[8..10], &[0, 3]);
    // The block header blob follows immediately.
    assert!(bytes.len() > 10);
}

#[test]
fn gzip_position_and_checksum_survive_drains() {
    let mut pool = LiteralPool::new(Encoding::Packed);
    let id = pool.intern("a fact about cats");
    let mut out = GzipStream::with_capacity(4096);
    out.open().unwrap();
    out.literal(pool.get(id)).unwrap();
    let tell_before = out.tell();
    out.clear_buffered();
    assert_eq!(out.buffered(), b"");
    assert_eq!(out.tell(), tell_before);
    out.literal(pool.get(id)).unwrap();
    assert_eq!(out.position(), 34);
}
