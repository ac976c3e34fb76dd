//! SIセクション用のモジュール。

pub mod desc;
pub mod table;

use crate::cursor::{ByteCursor, ReadError};

/// 全てのSIセクションに共通する先頭8バイトのヘッダ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionHeader {
    /// テーブル識別。
    pub table_id: u8,
    /// セクションシンタクス指示。
    pub section_syntax_indicator: bool,
    /// セクション長（12ビット）。
    pub section_length: u16,
    /// テーブル識別拡張。EITではサービス識別。
    pub subject_id: u16,
    /// バージョン番号（5ビット）。
    pub version_number: u8,
    /// カレントネクスト指示。
    pub current_next_indicator: bool,
    /// セクション番号。
    pub section_number: u8,
    /// 最終セクション番号。
    pub last_section_number: u8,
}

impl SectionHeader {
    /// ヘッダのバイト数。
    pub const LEN: usize = 8;

    /// `cur`から`SectionHeader`を読み取る。
    pub fn read(cur: &mut ByteCursor) -> Result<SectionHeader, ReadError> {
        let [table_id, b1, b2, id_hi, id_lo, version, section_number, last_section_number] =
            cur.read_array::<8>()?;

        Ok(SectionHeader {
            table_id,
            section_syntax_indicator: b1 & 0b1000_0000 != 0,
            section_length: u16::from_be_bytes([b1, b2]) & 0x0FFF,
            subject_id: u16::from_be_bytes([id_hi, id_lo]),
            version_number: (version & 0b0011_1110) >> 1,
            current_next_indicator: version & 0b0000_0001 != 0,
            section_number,
            last_section_number,
        })
    }
}

/// ヘッダ、本体、CRCに分けたSIセクション。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// 共通ヘッダ。
    pub header: SectionHeader,
    /// ヘッダとCRCを除いた本体。
    pub data: &'a [u8],
    /// 末尾のCRC32。検証はしない。
    pub crc32: u32,
}

impl<'a> Section<'a> {
    /// `buf`全体を1つのセクションとして読み取る。
    ///
    /// セクション長フィールドは参照せず、末尾4バイトをCRCとして扱う。
    pub fn read(buf: &'a [u8]) -> Result<Section<'a>, ReadError> {
        if buf.len() < SectionHeader::LEN + 4 {
            log::debug!("invalid Section");
            return Err(ReadError::Truncated);
        }

        let (body, crc) = buf.split_at(buf.len() - 4);
        let mut cur = ByteCursor::new(body);
        let header = SectionHeader::read(&mut cur)?;
        let crc32 = ByteCursor::new(crc).read_u32()?;

        Ok(Section {
            header,
            data: cur.rest(),
            crc32,
        })
    }
}

/// 連結されたセクション群をセクション長に従って1つずつ切り出すイテレーター。
///
/// テーブル識別が`0xFF`のスタッフィングに到達するか、
/// 長さが足りなくなった時点で終了する。
#[derive(Debug, Clone)]
pub struct SectionIter<'a>(&'a [u8]);

impl<'a> SectionIter<'a> {
    /// `buf`を切り出すイテレーターを生成する。
    #[inline]
    pub fn new(buf: &'a [u8]) -> SectionIter<'a> {
        SectionIter(buf)
    }
}

impl<'a> Iterator for SectionIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let [table_id, b1, b2, ..] = *self.0 else {
            return None;
        };
        if table_id == 0xFF {
            self.0 = &[];
            return None;
        }

        let len = 3 + (u16::from_be_bytes([b1, b2]) & 0x0FFF) as usize;
        let Some(section) = self.0.get(..len) else {
            log::debug!("invalid SectionIter::section_length");
            self.0 = &[];
            return None;
        };

        self.0 = &self.0[len..];
        Some(section)
    }
}

impl<'a> std::iter::FusedIterator for SectionIter<'a> {}
