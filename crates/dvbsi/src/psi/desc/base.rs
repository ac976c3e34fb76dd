//! 記述子に関する基礎の型。

use std::fmt;

use crate::cursor::{ByteCursor, ReadError};
use crate::utils::{HexBytes, UpperHex};

/// 記述子を表すトレイト。
pub trait Descriptor<'a>: Sized {
    /// この記述子のタグ。
    const TAG: u8;

    /// `data`から記述子を読み取る。
    ///
    /// `data`には`descriptor_tag`と`descriptor_length`は含まない。
    /// 読み残したバイトは詰め物として無視される。
    fn read(data: &'a [u8]) -> Result<Self, ReadError>;
}

/// 記述子のタグと長さ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DescriptorHeader {
    /// 記述子タグ。
    pub tag: u8,
    /// 記述子長。
    pub length: u8,
}

impl DescriptorHeader {
    /// `cur`から`DescriptorHeader`を読み取る。
    #[inline]
    pub fn read(cur: &mut ByteCursor) -> Result<DescriptorHeader, ReadError> {
        let [tag, length] = cur.read_array::<2>()?;
        Ok(DescriptorHeader { tag, length })
    }
}

/// パース前の記述子。
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawDescriptor<'a> {
    /// 記述子のタグ。
    pub tag: u8,

    /// 記述子の内容。
    pub data: &'a [u8],
}

impl<'a> fmt::Debug for RawDescriptor<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RawDescriptor")
            .field("tag", &UpperHex(self.tag))
            .field("data", &HexBytes(self.data))
            .finish()
    }
}

/// 複数の記述子からなる記述子群。
#[derive(Clone, PartialEq, Eq)]
pub struct DescriptorBlock<'a>(&'a [u8]);

impl<'a> DescriptorBlock<'a> {
    /// `data`全体を記述子群とする。
    ///
    /// 記述子の内容はパースせず、`get`メソッドなどで初めてパースする。
    #[inline]
    pub fn new(data: &'a [u8]) -> DescriptorBlock<'a> {
        DescriptorBlock(data)
    }

    /// 記述子群のバイト列を返す。
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    /// 内包する記述子群のイテレーターを返す。
    #[inline]
    pub fn iter(&self) -> DescriptorIter<'a> {
        DescriptorIter(ByteCursor::new(self.0))
    }

    /// 内包する記述子群から`T`のタグと一致する記述子を読み取って返す。
    ///
    /// `T`のタグと一致する記述子がない場合や読み取りに失敗した場合は`None`を返す。
    pub fn get<T: Descriptor<'a>>(&self) -> Option<T> {
        self.iter()
            .find(|d| d.tag == T::TAG)
            .and_then(|d| T::read(d.data).ok())
    }

    /// 内包する記述子群から`T`のタグと一致する記述子をすべて読み取って返す。
    ///
    /// 読み取りに失敗した記述子は飛ばされる。
    pub fn get_all<T: Descriptor<'a>>(&self) -> impl Iterator<Item = T> + 'a {
        self.iter().filter_map(|d| {
            if d.tag == T::TAG {
                T::read(d.data).ok()
            } else {
                None
            }
        })
    }
}

impl<'a> fmt::Debug for DescriptorBlock<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("DescriptorBlock(")?;
        f.debug_list().entries(self).finish()?;
        f.write_str(")")
    }
}

impl<'a> IntoIterator for &DescriptorBlock<'a> {
    type Item = RawDescriptor<'a>;
    type IntoIter = DescriptorIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// [`DescriptorBlock`]のイテレーター。
///
/// 記述子長が残りのデータを超える記述子に到達した時点で終了する。
#[derive(Clone)]
pub struct DescriptorIter<'a>(ByteCursor<'a>);

impl<'a> DescriptorIter<'a> {
    /// 読み残したバイト列を返す。
    ///
    /// 全ての記述子を読み終えた後に空でなければ、記述子群が壊れている。
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        self.0.rest()
    }
}

impl<'a> Iterator for DescriptorIter<'a> {
    type Item = RawDescriptor<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0.is_empty() {
            return None;
        }

        let mut cur = self.0.clone();
        let Ok(header) = DescriptorHeader::read(&mut cur) else {
            log::debug!("invalid DescriptorHeader");
            return None;
        };
        let data = match cur.read_declared(header.length as usize) {
            Ok(data) => data,
            Err(e) => {
                log::debug!("invalid DescriptorHeader::length: {}", e);
                return None;
            }
        };

        self.0 = cur;
        Some(RawDescriptor {
            tag: header.tag,
            data,
        })
    }
}

impl<'a> std::iter::FusedIterator for DescriptorIter<'a> {}

impl<'a> fmt::Debug for DescriptorIter<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DescriptorIter(")?;
        f.debug_list().entries(self.clone()).finish()?;
        f.write_str(")")
    }
}
