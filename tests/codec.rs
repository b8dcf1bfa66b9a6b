#![allow(unused)]

mod common;

use common::RamDisk;
use fitfs::*;

fn entry(name: &str, start_lba: u32, size_bytes: u32) -> DirEntry {
    DirEntry::new(name, start_lba, size_bytes).unwrap()
}

#[test]
fn test_layout_constants() {
    assert_eq!(DIR_ENTRY_SIZE, 40);
    assert_eq!(MAX_FILES, 12);
    assert_eq!(FIT_SIZE, 480);
    assert_eq!(PARTITION_OFFSET * BLOCK_SIZE as u64, 15 * 1024 * 1024);
}

#[test]
fn test_roundtrip_full_table() {
    let entries: Vec<DirEntry> = (0..MAX_FILES as u32)
        .map(|i| entry(&format!("file_{}.txt", i), 1 + i * 3, i * 700 + 1))
        .collect();
    let table = FileIndexTable::from_entries(&entries).unwrap();
    let decoded = decode(encode(&table).as_slice()).unwrap();
    assert_eq!(decoded, table);
}

#[test]
fn test_roundtrip_mixed_slots() {
    let mut table = FileIndexTable::new();
    table.set(0, entry("bin/", 7, 0));
    table.set(3, entry("ñandú-über-日本語.txt", 9, 4096));
    table.set(11, entry(&"z".repeat(MAX_FILE_NAME_LEN - 1), u32::MAX - 1, u32::MAX));
    let decoded = decode(encode(&table).as_slice()).unwrap();
    assert_eq!(decoded, table);
    assert!(decoded.get(1).unwrap().is_free());
    log!("decoded: {:?}", decoded.occupied().collect::<Vec<_>>());
}

#[test]
fn test_encode_layout() {
    let mut table = FileIndexTable::new();
    table.set(2, entry("hello.txt", 0x01020304, 5));
    let buf = encode(&table);
    assert_eq!(buf.len(), BLOCK_SIZE);

    let record = &buf[2 * DIR_ENTRY_SIZE..3 * DIR_ENTRY_SIZE];
    assert_eq!(&record[..9], b"hello.txt");
    assert!(record[9..32].iter().all(|&b| b == 0));
    assert_eq!(&record[32..36], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(&record[36..40], &5u32.to_le_bytes());

    // Other slots and the padding after the last record stay zeroed.
    assert!(buf[..2 * DIR_ENTRY_SIZE].iter().all(|&b| b == 0));
    assert!(buf[FIT_SIZE..].iter().all(|&b| b == 0));
}

#[test]
fn test_decode_short_block() {
    let result = decode(&[0u8; FIT_SIZE - 1]);
    assert!(matches!(result, Err(Error::Format(_))), "got {:?}", result);
    // Exactly the records, without the padding, is enough.
    assert!(decode(&[0u8; FIT_SIZE]).is_ok());
}

#[test]
fn test_decode_stops_at_nul() {
    let mut buf = [0u8; BLOCK_SIZE];
    buf[..7].copy_from_slice(b"abc\0xyz");
    buf[32..36].copy_from_slice(&9u32.to_le_bytes());
    let table = decode(&buf).unwrap();
    let first = table.get(0).unwrap();
    assert_eq!(first.name, "abc");
    assert_eq!(first.start_lba, 9);
}

#[test]
fn test_decode_lossy_name() {
    let mut buf = [0u8; BLOCK_SIZE];
    buf[..3].copy_from_slice(&[b'a', 0xff, b'b']);
    let table = decode(&buf).unwrap();
    assert_eq!(table.get(0).unwrap().name, "a\u{FFFD}b");
}

#[test]
fn test_decode_unterminated_name() {
    // A name filling all 32 bytes has no terminator; it is capped to what encode keeps,
    // so flushing the table back does not rename the entry.
    let mut buf = [0u8; BLOCK_SIZE];
    buf[..MAX_FILE_NAME_LEN].fill(b'q');
    let table = decode(&buf).unwrap();
    assert_eq!(table.get(0).unwrap().name, "q".repeat(MAX_FILE_NAME_LEN - 1));
    assert_eq!(decode(encode(&table).as_slice()).unwrap(), table);
}

#[test]
fn test_decode_caps_widened_name() {
    // 31 bytes on disk, but each invalid byte turns into a 3-byte replacement char.
    let mut buf = [0u8; BLOCK_SIZE];
    buf[..29].fill(b'w');
    buf[29] = 0xff;
    buf[30] = 0xfe;
    let table = decode(&buf).unwrap();
    let name = &table.get(0).unwrap().name;
    // The first replacement char would end at byte 32, so only the plain prefix is kept.
    assert_eq!(*name, "w".repeat(29));
    assert_eq!(decode(encode(&table).as_slice()).unwrap(), table);
}

#[test]
fn test_encode_truncates_on_char_boundary() {
    let mut table = FileIndexTable::new();
    let long = format!("{}é", "a".repeat(30)); // 32 bytes
    table.set(
        0,
        DirEntry {
            name: long,
            start_lba: 1,
            size_bytes: 0,
        },
    );
    let decoded = decode(encode(&table).as_slice()).unwrap();
    assert_eq!(decoded.get(0).unwrap().name, "a".repeat(30));
}

#[test]
fn test_table_too_many_entries() {
    let entries = vec![entry("x", 1, 0); MAX_FILES + 1];
    assert!(matches!(
        FileIndexTable::from_entries(&entries),
        Err(Error::InvalidArgument(_))
    ));
}

#[test]
fn test_read_write_fit() {
    let rd = RamDisk::new();
    let mut table = FileIndexTable::new();
    table.set(5, entry("boot.bin", 1, 1536));
    write_fit(&rd, &table).unwrap();
    assert_eq!(rd.raw().len(), BLOCK_SIZE);
    assert_eq!(read_fit(&rd).unwrap(), table);
}

#[test]
fn test_blocks_for() {
    assert_eq!(blocks_for(0), 0);
    assert_eq!(blocks_for(1), 1);
    assert_eq!(blocks_for(BLOCK_SIZE), 1);
    assert_eq!(blocks_for(BLOCK_SIZE + 1), 2);
    assert_eq!(blocks_for(MAX_FSIZE), 4096);
}

#[test]
fn test_next_free_lba() {
    let table = FileIndexTable::new();
    assert_eq!(next_free_lba(table.entries()), FIRST_DATA_BLOCK);

    let mut table = FileIndexTable::new();
    table.set(4, entry("a", 1, 1024)); // blocks 1..3
    table.set(1, entry("b", 10, 1)); // block 10
    table.set(7, entry("dir/", 3, 0));
    assert_eq!(next_free_lba(table.entries()), 11);

    // Free slots do not count, whatever their stale fields say.
    table.set(
        0,
        DirEntry {
            name: String::new(),
            start_lba: 500,
            size_bytes: 512,
        },
    );
    assert_eq!(next_free_lba(table.entries()), 11);
}

#[test]
fn test_next_free_lba_saturates() {
    let mut table = FileIndexTable::new();
    table.set(0, entry("huge", u32::MAX - 1, 4096));
    assert_eq!(next_free_lba(table.entries()), u32::MAX);
}
