//! Fixed-width signal tests.
//!
//! Covers masking on construction and write, signed interpretation, extension, and
//! the three display formats.

use mipsflow_core::common::{Data, DataFormat};
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn values_are_masked_to_the_width() {
    let d = Data::with_value(4, 0x1F);
    assert_eq!(d.value(), 0xF);
    assert_eq!(d.size(), 4);

    let mut d = Data::new(8);
    d.set_value(0x1234);
    assert_eq!(d.value(), 0x34);
}

#[rstest]
#[case::too_wide(r#"{ "size": 4, "value": 31 }"#, 4, 0xF)]
#[case::zero_width(r#"{ "size": 0, "value": 3 }"#, 1, 1)]
#[case::oversized(r#"{ "size": 40, "value": 7 }"#, 32, 7)]
fn deserialized_values_keep_the_width_invariant(
    #[case] json: &str,
    #[case] size: u8,
    #[case] value: u32,
) {
    let d: Data = serde_json::from_str(json).unwrap();
    assert_eq!((d.size(), d.value()), (size, value));
    let back: Data = serde_json::from_str(&serde_json::to_string(&d).unwrap()).unwrap();
    assert_eq!(back, d);
}

#[test]
fn full_width_word_is_not_masked() {
    let d = Data::with_value(32, u32::MAX);
    assert_eq!(d.value(), u32::MAX);
    assert_eq!(d.signed_value(), -1);
}

#[rstest]
#[case(4, 0b1000, -8)]
#[case(4, 0b0111, 7)]
#[case(16, 0xFFFF, -1)]
#[case(16, 0x7FFF, 32_767)]
#[case(1, 1, -1)]
fn signed_value_uses_the_top_bit(#[case] size: u8, #[case] value: u32, #[case] expected: i32) {
    assert_eq!(Data::with_value(size, value).signed_value(), expected);
}

#[test]
fn sign_and_zero_extension() {
    let imm = Data::with_value(16, 0xFFFC);
    assert_eq!(imm.sign_extend(32).value(), 0xFFFF_FFFC);
    assert_eq!(imm.zero_extend(32).value(), 0x0000_FFFC);

    let positive = Data::with_value(16, 0x0004);
    assert_eq!(positive.sign_extend(32).value(), 4);
}

#[rstest]
#[case(Data::with_value(4, 5), DataFormat::Binary, "0101")]
#[case(Data::with_value(6, 0x23), DataFormat::Hexadecimal, "0x23")]
#[case(Data::with_value(32, 0xAC0A_0004), DataFormat::Hexadecimal, "0xAC0A0004")]
#[case(Data::with_value(32, 0xFFFF_FFFE), DataFormat::Decimal, "-2")]
#[case(Data::with_value(16, 0xFFFE), DataFormat::Decimal, "65534")]
#[case(Data::with_value(5, 31), DataFormat::Decimal, "31")]
fn formats(#[case] data: Data, #[case] format: DataFormat, #[case] expected: &str) {
    assert_eq!(data.format(format), expected);
}

#[test]
fn bits_for_counts() {
    assert_eq!(Data::bits_for(2), 1);
    assert_eq!(Data::bits_for(3), 2);
    assert_eq!(Data::bits_for(4), 2);
    assert_eq!(Data::bits_for(32), 5);
    assert_eq!(Data::bits_for(33), 6);
}

#[test]
fn width_validity() {
    assert!(!Data::is_valid_size(0));
    assert!(Data::is_valid_size(1));
    assert!(Data::is_valid_size(32));
    assert!(!Data::is_valid_size(33));
    assert!(Data::fits(6, 63));
    assert!(!Data::fits(6, 64));
}

proptest! {
    #[test]
    fn stored_value_always_fits(size in 1u8..=32, value in any::<u32>()) {
        let d = Data::with_value(size, value);
        prop_assert!(Data::fits(size, d.value()));
        prop_assert_eq!(d.value(), value & Data::mask(size));
    }

    #[test]
    fn binary_string_has_one_digit_per_bit(size in 1u8..=32, value in any::<u32>()) {
        let text = Data::with_value(size, value).to_binary();
        prop_assert_eq!(text.len(), size as usize);
        prop_assert_eq!(u32::from_str_radix(&text, 2).unwrap(), value & Data::mask(size));
    }

    #[test]
    fn sign_extension_preserves_the_signed_value(size in 1u8..=32, value in any::<u32>()) {
        let d = Data::with_value(size, value);
        prop_assert_eq!(d.sign_extend(32).signed_value(), d.signed_value());
    }
}
