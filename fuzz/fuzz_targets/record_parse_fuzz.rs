#![no_main]
use libfuzzer_sys::fuzz_target;
use suffix_miner_core::record::{
    InputRecord,
    RawRecord,
};

fn raw_from_cells<'a>(cells: &[&'a str]) -> RawRecord<'a> {
    let cell = |i: usize| cells.get(i).copied().unwrap_or_default();
    RawRecord {
        hash: cell(0),
        nonce: cell(1),
        to: cell(2),
        gas_fee_cap: cell(3),
        blob_gas_fee_cap: cell(4),
        gas_tip_cap: cell(5),
        r: cell(6),
        s: cell(7),
        v: cell(8),
        blob_versioned_hashes: cell(9),
    }
}

// Arbitrary cell text must either parse or yield a ParseError, and a parsed
// record must survive being written back out as cells.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let cells: Vec<&str> = text.split(',').collect();

    let Ok(record) = InputRecord::parse(1, &raw_from_cells(&cells)) else {
        return;
    };

    let written = record.to_cells();
    let written: Vec<&str> = written.iter().map(String::as_str).collect();
    let reparsed = InputRecord::parse(1, &raw_from_cells(&written))
        .expect("written record must parse");
    assert_eq!(record, reparsed, "record changed after writing back out");
});
