//! 境界検査付きでバイト列を読み進めるカーソル。
//!
//! 範囲外アクセスを防ぐのはこのモジュールだけであり、各記述子やテーブルの
//! 読み込みはすべて[`ByteCursor`]を経由する。
//! 読み込みに失敗した場合、カーソルの位置は変化しない。

use thiserror::Error;

/// 読み込み時に発生するエラー。
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadError {
    /// フィールドや構造に必要なバイト数が残っていない。
    #[error("truncated data")]
    Truncated,

    /// 宣言された長さが残りのデータと矛盾している。
    #[error("malformed length")]
    MalformedLength,
}

/// ビッグエンディアンでバイト列を読み進めるカーソル。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// `data`全体を範囲とするカーソルを生成する。
    #[inline]
    pub fn new(data: &'a [u8]) -> ByteCursor<'a> {
        ByteCursor { data, pos: 0 }
    }

    /// 読み込み位置を返す。
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// 未読のバイト数を返す。
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// 未読のバイトが無いかどうかを返す。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// 未読のバイト列を、位置を進めずに返す。
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// 未読のバイト列をすべて読み込む。
    #[inline]
    pub fn take_rest(&mut self) -> &'a [u8] {
        let rest = self.rest();
        self.pos = self.data.len();
        rest
    }

    /// `n`バイトを読み込む。
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        if self.remaining() < n {
            return Err(ReadError::Truncated);
        }

        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// 長さフィールドで宣言された`n`バイトを読み込む。
    ///
    /// 残りが`n`バイトに満たない場合は、宣言された長さが囲む範囲を超えているものとして
    /// [`ReadError::MalformedLength`]を返す。
    #[inline]
    pub fn read_declared(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        self.read_bytes(n).map_err(|_| ReadError::MalformedLength)
    }

    /// `N`バイトを固定長配列として読み込む。
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let bytes = self.read_bytes(N)?;
        let mut array = [0; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }

    /// `n`バイトを読み飛ばす。
    #[inline]
    pub fn skip(&mut self, n: usize) -> Result<(), ReadError> {
        self.read_bytes(n).map(|_| ())
    }

    /// 8ビット符号無し整数を読み込む。
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    /// ビッグエンディアンで16ビット符号無し整数を読み込む。
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        self.read_array().map(u16::from_be_bytes)
    }

    /// ビッグエンディアンで32ビット符号無し整数を読み込む。
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// 先頭1バイトを長さとし、その長さ分のバイト列を読み込む。
    ///
    /// 長さ分のデータが無い場合は長さのバイトも読み込まなかったことになる。
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8], ReadError> {
        let mut cur = self.clone();
        let len = cur.read_u8()?;
        let bytes = cur.read_bytes(len as usize)?;
        self.pos = cur.pos;
        Ok(bytes)
    }

    /// `n`バイトを範囲とする子カーソルを返し、自身はその後ろに進める。
    pub fn sub_cursor(&mut self, n: usize) -> Result<ByteCursor<'a>, ReadError> {
        self.read_bytes(n).map(ByteCursor::new)
    }
}
