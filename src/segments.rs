//! Segment patterns for 7-segment displays.
//!
//! Each byte is laid out as `(dp)(a)(b)(c)(d)(e)(f)(g)`:
//!
//! ```text
//!      a
//!    -----
//!  f|     |b
//!   |  g  |
//!    -----
//!  e|     |c
//!   |  d  |
//!    -----  .dp
//! ```

/// Segment bit lighting the decimal point.
pub const DECIMAL_POINT: u8 = 0b1000_0000;

/// Segment patterns indexed by ASCII code. Codes without a sensible glyph are blank.
///
/// Entries `0..=15` hold the hexadecimal digits `0`-`F`.
#[rustfmt::skip]
pub const CHAR_TABLE: [u8; 128] = [
    // 0x00 - 0x0F: hex digits
    0b01111110, 0b00110000, 0b01101101, 0b01111001, 0b00110011, 0b01011011, 0b01011111, 0b01110000,
    0b01111111, 0b01111011, 0b01110111, 0b00011111, 0b00001101, 0b00111101, 0b01001111, 0b01000111,
    0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000,
    0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000,
    // ' ' ! " # $ % & '
    0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000,
    // ( ) * + , - . /
    0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b10000000, 0b00000001, 0b10000000, 0b00000000,
    // 0 - 7
    0b01111110, 0b00110000, 0b01101101, 0b01111001, 0b00110011, 0b01011011, 0b01011111, 0b01110000,
    // 8 9 : ; < = > ?
    0b01111111, 0b01111011, 0b00000000, 0b00000000, 0b00000000, 0b00001001, 0b00000000, 0b00000000,
    // @ (degree) A B C D E F G
    0b01100011, 0b01110111, 0b00011111, 0b01001110, 0b00111101, 0b01001111, 0b01000111, 0b00000000,
    // H I J K L M N O
    0b00110111, 0b00000110, 0b00000000, 0b00000000, 0b00001110, 0b00000000, 0b00000000, 0b00011101,
    // P Q R S T U V W
    0b01100111, 0b00000000, 0b00000101, 0b00000000, 0b00001111, 0b00011100, 0b00000000, 0b00000000,
    // X Y Z [ \ ] ^ _
    0b00000000, 0b00000000, 0b00000000, 0b01001110, 0b00000000, 0b01111000, 0b00000000, 0b00001000,
    // ` a b c d e f g
    0b00000000, 0b01110111, 0b00011111, 0b00001101, 0b00111101, 0b01001111, 0b01000111, 0b00000000,
    // h i j k l m n o
    0b00110111, 0b00000100, 0b00000000, 0b00000000, 0b00001110, 0b00000000, 0b00010101, 0b00011101,
    // p q r s t u v w
    0b01100111, 0b00000000, 0b00000101, 0b00000000, 0b00001111, 0b00011100, 0b00000000, 0b00000000,
    // x y z { | } ~ DEL
    0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000, 0b00000000,
];

///
/// Segment pattern for a hexadecimal digit. Only the low nibble of `value` is used.
///
pub fn hex_byte(value: u8, dot: bool) -> u8 {
    with_dot(CHAR_TABLE[usize::from(value & 0x0F)], dot)
}

///
/// Segment pattern for a character. Characters outside of ASCII render blank.
///
pub fn char_byte(value: char, dot: bool) -> u8 {
    let pattern = CHAR_TABLE.get(value as usize).copied().unwrap_or(0);
    with_dot(pattern, dot)
}

fn with_dot(pattern: u8, dot: bool) -> u8 {
    if dot {
        pattern | DECIMAL_POINT
    } else {
        pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_digits_match_ascii_digits() {
        for value in 0..10u8 {
            assert_eq!(hex_byte(value, false), CHAR_TABLE[usize::from(b'0' + value)]);
        }
    }

    #[test]
    fn hex_letters() {
        assert_eq!(hex_byte(0x0A, false), char_byte('A', false));
        assert_eq!(hex_byte(0x0B, false), char_byte('b', false));
        assert_eq!(hex_byte(0x0C, false), char_byte('c', false));
        assert_eq!(hex_byte(0x0D, false), char_byte('d', false));
        assert_eq!(hex_byte(0x0E, false), char_byte('E', false));
        assert_eq!(hex_byte(0x0F, false), char_byte('F', false));
    }

    #[test]
    fn hex_value_is_masked_to_low_nibble() {
        assert_eq!(hex_byte(0x18, false), hex_byte(0x08, false));
        assert_eq!(hex_byte(0xFF, true), hex_byte(0x0F, true));
    }

    #[test]
    fn eight_with_dot() {
        assert_eq!(hex_byte(8, true), 0b1111_1111);
        assert_eq!(char_byte('8', true), CHAR_TABLE[b'8' as usize] | DECIMAL_POINT);
    }

    #[test]
    fn symbols() {
        assert_eq!(char_byte('-', false), 0b0000_0001);
        assert_eq!(char_byte('.', false), DECIMAL_POINT);
        assert_eq!(char_byte(',', false), DECIMAL_POINT);
        assert_eq!(char_byte('_', false), 0b0000_1000);
        assert_eq!(char_byte('=', false), 0b0000_1001);
        assert_eq!(char_byte('@', false), 0b0110_0011);
        assert_eq!(char_byte(' ', false), 0);
    }

    #[test]
    fn unmapped_characters_are_blank() {
        assert_eq!(char_byte('K', false), 0);
        assert_eq!(char_byte('~', false), 0);
        assert_eq!(char_byte('\u{7F}', false), 0);
        assert_eq!(char_byte('é', false), 0);
        assert_eq!(char_byte('€', true), DECIMAL_POINT);
    }
}
