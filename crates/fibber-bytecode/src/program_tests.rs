use fibber_deflate::{Encoding, LitId, LiteralPool};

use crate::builder::{ProgramBuilder, Term};
use crate::dump::dump;
use crate::op::{Addr, OpWord};
use crate::program::{MAGIC, Program, ProgramError};
use crate::{pick, seq};

fn pool_with(texts: &[&str]) -> LiteralPool {
    let mut pool = LiteralPool::new(Encoding::Plain);
    for t in texts {
        pool.intern(t);
    }
    pool
}

#[test]
fn empty_programs_are_rejected() {
    let err = Program::from_parts(vec![], pool_with(&[]), Addr::from_raw(0)).unwrap_err();
    assert!(matches!(err, ProgramError::Empty));
}

#[test]
fn entry_must_be_in_bounds() {
    let err = Program::from_parts(vec![OpWord::ret()], pool_with(&[]), Addr::from_raw(1))
        .unwrap_err();
    assert!(matches!(err, ProgramError::EntryOutOfBounds(1)));
}

#[test]
fn unknown_tags_are_a_decode_error() {
    let ops = vec![OpWord::data(0xfa00_0000), OpWord::ret()];
    let err = Program::from_parts(ops, pool_with(&[]), Addr::from_raw(0)).unwrap_err();
    assert!(matches!(err, ProgramError::BadOpcode { addr: 0, .. }));
}

#[test]
fn call_targets_are_bounds_checked() {
    let ops = vec![OpWord::call(Addr::from_raw(9)), OpWord::ret()];
    let err = Program::from_parts(ops, pool_with(&[]), Addr::from_raw(0)).unwrap_err();
    assert!(matches!(
        err,
        ProgramError::CallOutOfBounds { addr: 0, target: 9 }
    ));
}

#[test]
fn literal_indices_are_pool_checked() {
    let ops = vec![OpWord::literal(LitId::from_raw(2)), OpWord::ret()];
    let err = Program::from_parts(ops, pool_with(&["only one"]), Addr::from_raw(0)).unwrap_err();
    assert!(matches!(
        err,
        ProgramError::LiteralOutOfBounds { addr: 0, id: 2 }
    ));
}

#[test]
fn alternative_arrays_must_fit() {
    let ops = vec![
        OpWord::pick(2),
        OpWord::literal(LitId::from_raw(0)),
        // second alternative missing
    ];
    let err = Program::from_parts(ops, pool_with(&["x"]), Addr::from_raw(0)).unwrap_err();
    assert!(matches!(err, ProgramError::PickOverrun { addr: 0 }));
}

#[test]
fn alternatives_must_be_single_instructions() {
    let ops = vec![
        OpWord::pick(2),
        OpWord::literal(LitId::from_raw(0)),
        OpWord::ret(),
    ];
    let err = Program::from_parts(ops, pool_with(&["x"]), Addr::from_raw(0)).unwrap_err();
    assert!(matches!(err, ProgramError::BadAlternative { addr: 2 }));
}

#[test]
fn random_integers_need_their_range_word() {
    let ops = vec![OpWord::ret(), OpWord::rand_int(3)];
    let err = Program::from_parts(ops, pool_with(&[]), Addr::from_raw(0)).unwrap_err();
    assert!(matches!(err, ProgramError::TruncatedRange { addr: 1 }));
}

#[test]
fn gate_thresholds_are_range_checked() {
    // A threshold past the probability scale can only come from a corrupt
    // image, so it is forged from a raw word here.
    let ops = vec![OpWord::data(0xfb02_0000), OpWord::ret()];
    let err = Program::from_parts(ops, pool_with(&[]), Addr::from_raw(0)).unwrap_err();
    assert!(matches!(err, ProgramError::BadThreshold { addr: 0 }));
}

#[test]
fn range_words_are_skipped_not_decoded() {
    // The range width 0xfe000001 looks like a pick instruction; as the data
    // word of a random-integer it must be skipped by validation.
    let ops = vec![
        OpWord::rand_int(0),
        OpWord::data(0xfe00_0001),
        OpWord::ret(),
    ];
    Program::from_parts(ops, pool_with(&[]), Addr::from_raw(0)).unwrap();
}

#[test]
fn image_roundtrip_preserves_the_program() {
    let mut b = ProgramBuilder::new(Encoding::Packed);
    let breed = pick![b; "tigers", "brown cats", "blue cats"];
    let fact = seq![b; breed, " can count to ", Term::Int(0, 100), ".\n"];
    let program = b.finish(fact).unwrap();

    let bytes = program.to_bytes().unwrap();
    let loaded = Program::from_bytes(&bytes).unwrap();

    assert_eq!(loaded.len(), program.len());
    assert_eq!(loaded.entry(), program.entry());
    assert_eq!(loaded.pool().len(), program.pool().len());
    assert_eq!(dump(&loaded), dump(&program));
}

#[test]
fn image_header_is_checked() {
    let mut b = ProgramBuilder::new(Encoding::Plain);
    let rule = seq![b; "x"];
    let bytes = b.finish(rule).unwrap().to_bytes().unwrap();

    assert!(matches!(
        Program::from_bytes(&bytes[..6]),
        Err(ProgramError::Truncated)
    ));

    let mut wrong_magic = bytes.clone();
    wrong_magic[0] = b'X';
    assert!(matches!(
        Program::from_bytes(&wrong_magic),
        Err(ProgramError::InvalidMagic)
    ));

    let mut wrong_version = bytes.clone();
    wrong_version[4] = 0xee;
    assert!(matches!(
        Program::from_bytes(&wrong_version),
        Err(ProgramError::UnsupportedVersion(_))
    ));

    let mut truncated_payload = bytes.clone();
    truncated_payload.truncate(bytes.len() - 1);
    assert!(Program::from_bytes(&truncated_payload).is_err());
    assert_eq!(&bytes[..4], &MAGIC);
}
