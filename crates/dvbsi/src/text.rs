//! 記述子に埋め込まれた文字列の表現。
//!
//! 文字符号の解釈（先頭の文字表選択バイトを含む）は行わず、放送されたバイト列をそのまま保持する。

use std::borrow::Borrow;
use std::fmt;
use std::ops;

/// 借用されたDVBの文字列を表す型。
///
/// `DvbStr`と[`DvbString`]は、<code>&[str]</code>と[`String`]の関係と相似しており、
/// 前者は借用された参照、後者は所有権を持つ文字列である。
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct DvbStr([u8]);

impl DvbStr {
    /// バイト列から`DvbStr`を生成する。
    #[must_use]
    #[inline]
    pub const fn from_bytes(bytes: &[u8]) -> &DvbStr {
        // Safety: `DvbStr`は`[u8]`のtransparentなラッパーである
        unsafe { &*(bytes as *const [u8] as *const DvbStr) }
    }

    /// この文字列の長さを返す。
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// この文字列が空であるかどうかを返す。
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 文字列スライスをバイトスライスに変換する。
    #[must_use]
    #[inline]
    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// ASCII以外のバイトをエスケープして表示するオブジェクトを返す。
    #[inline]
    pub fn escape_ascii(&self) -> impl fmt::Display + '_ {
        self.0.escape_ascii()
    }
}

impl Default for &DvbStr {
    fn default() -> Self {
        DvbStr::from_bytes(&[])
    }
}

impl fmt::Debug for DvbStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0.escape_ascii())
    }
}

impl AsRef<DvbStr> for DvbStr {
    #[inline]
    fn as_ref(&self) -> &DvbStr {
        self
    }
}

impl AsRef<[u8]> for DvbStr {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl PartialEq<[u8]> for DvbStr {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        &self.0 == other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for DvbStr {
    #[inline]
    fn eq(&self, other: &[u8; N]) -> bool {
        &self.0 == other
    }
}

/// 所有権を持つDVBの文字列。
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DvbString(Vec<u8>);

impl DvbString {
    /// 空の`DvbString`を生成する。
    #[must_use]
    #[inline]
    pub const fn new() -> DvbString {
        DvbString(Vec::new())
    }

    /// `DvbString`をバイト列に変換する。
    #[must_use]
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// `&DvbStr`として借用する。
    #[must_use]
    #[inline]
    pub fn as_dvb_str(&self) -> &DvbStr {
        DvbStr::from_bytes(&self.0)
    }

    /// 文字列を空にする。
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// 末尾に`string`を追加する。
    #[inline]
    pub fn push_str(&mut self, string: &DvbStr) {
        self.0.extend_from_slice(string.as_bytes());
    }

    /// `len`バイトより長ければ切り詰める。
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }
}

impl ops::Deref for DvbString {
    type Target = DvbStr;

    #[inline]
    fn deref(&self) -> &DvbStr {
        self.as_dvb_str()
    }
}

impl fmt::Debug for DvbString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self.as_dvb_str(), f)
    }
}

impl AsRef<DvbStr> for DvbString {
    #[inline]
    fn as_ref(&self) -> &DvbStr {
        self
    }
}

impl AsRef<[u8]> for DvbString {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl ops::AddAssign<&DvbStr> for DvbString {
    #[inline]
    fn add_assign(&mut self, rhs: &DvbStr) {
        self.push_str(rhs);
    }
}

impl From<&DvbStr> for DvbString {
    #[inline]
    fn from(s: &DvbStr) -> DvbString {
        DvbString(s.0.to_vec())
    }
}

impl From<Vec<u8>> for DvbString {
    #[inline]
    fn from(v: Vec<u8>) -> DvbString {
        DvbString(v)
    }
}

impl From<DvbString> for Vec<u8> {
    #[inline]
    fn from(s: DvbString) -> Vec<u8> {
        s.0
    }
}

impl Borrow<DvbStr> for DvbString {
    #[inline]
    fn borrow(&self) -> &DvbStr {
        self
    }
}

impl ToOwned for DvbStr {
    type Owned = DvbString;

    #[inline]
    fn to_owned(&self) -> DvbString {
        DvbString::from(self)
    }
}

impl PartialEq<[u8]> for DvbString {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        self.0 == other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for DvbString {
    #[inline]
    fn eq(&self, other: &[u8; N]) -> bool {
        self.0 == other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for DvbString {
    #[inline]
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.0 == *other
    }
}
