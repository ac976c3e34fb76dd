use std::fmt;

/// `Debug`で16進数表記（`0x`付き）として表示するためのラッパー。
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct UpperHex<T>(pub T);

impl<T: fmt::UpperHex> fmt::Debug for UpperHex<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#X}", self.0)
    }
}

/// バイト列を`Debug`で16進数の並びとして表示するためのラッパー。
pub struct HexBytes<'a>(pub &'a [u8]);

impl<'a> fmt::Debug for HexBytes<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("\"")?;
        for (i, b) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02X}", b)?;
        }
        f.write_str("\"")
    }
}

/// 2桁のBCDを読み込む。
///
/// 各ニブルが10以上の場合でも値はそのまま計算される。
#[inline]
pub fn read_bcd_digit(b: u8) -> u8 {
    (b >> 4) * 10 + (b & 0x0F)
}

/// 0～99の値を2桁のBCDに変換する。
#[inline]
pub fn write_bcd_digit(n: u8) -> u8 {
    debug_assert!(n < 100);
    ((n / 10) << 4) | (n % 10)
}
