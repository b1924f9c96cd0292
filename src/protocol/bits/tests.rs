use super::*;

#[test]
fn slice_reads_msb_first() {
    // 0b1100_0000 -> first two bits (MSB-first) are both 1.
    let view = BitView::new(&[0b1100_0000]);
    let slice = view.slice(0, 2).unwrap();
    assert!(slice.is_all_ones());
}

#[test]
fn slice_out_of_range_is_none() {
    let view = BitView::new(&[0x00]);
    assert!(view.slice(4, 8).is_none());
}

#[test]
fn all_ones_detection_ignores_length() {
    let view = BitView::new(&[0xFF, 0xFF]);
    assert!(view.slice(0, 16).unwrap().is_all_ones());
    let mixed = BitView::new(&[0xFF, 0xFE]);
    assert!(!mixed.slice(0, 16).unwrap().is_all_ones());
}

#[test]
fn byte_aligned_value_matches_little_endian_read() {
    // Engine Speed scenario: bytes[3]=0x20, bytes[4]=0x4E, 16-bit field.
    let payload = [0x00, 0x00, 0x00, 0x20, 0x4E, 0x00, 0x00, 0x00];
    let view = BitView::new(&payload);
    let slice = view.slice(24, 16).unwrap();
    assert_eq!(slice.to_value(), 0x4E20);
}

#[test]
fn split_field_concatenation() {
    // SPN length 12, start bits [4, 8]: bits 4..7 of byte 0 concatenated
    // with bits 8..15 of byte 1.
    let payload = [0x3A, 0xC5];
    let view = BitView::new(&payload);
    let left = view.slice(4, 4).unwrap();
    let right = view.slice(8, 8).unwrap();
    let combined = left.concat(right);
    assert_eq!(combined.len(), 12);
    assert_eq!(combined.to_value(), 0x0AC5);
}

#[test]
fn short_bit_encoded_field_reads_plain_binary() {
    // units "bit", length 2, start [0]; top two bits of 0x40 are 01.
    let view = BitView::new(&[0x40]);
    let slice = view.slice(0, 2).unwrap();
    assert_eq!(slice.to_value(), 1);
}

#[test]
fn bit_string_renders_extraction_order() {
    let view = BitView::new(&[0b1010_0000]);
    let slice = view.slice(0, 4).unwrap();
    assert_eq!(slice.bit_string(), "1010");
}

#[test]
fn to_bytes_packs_msb_first_and_pads_trailing_byte() {
    let view = BitView::new(&[b'h', b'i']);
    let slice = view.slice(0, 16).unwrap();
    assert_eq!(slice.to_bytes(), vec![b'h', b'i']);

    let partial = view.slice(0, 4).unwrap();
    assert_eq!(partial.to_bytes(), vec![0b0110_0000]);
}
