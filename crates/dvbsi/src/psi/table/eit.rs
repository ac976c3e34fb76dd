//! EIT（Event Information Table）と関連する型の定義。

use std::fmt;
use std::ops::RangeInclusive;

use crate::cursor::{ByteCursor, ReadError};
use crate::psi::desc::DescriptorBlock;
use crate::psi::{Section, SectionHeader};
use crate::time::{self, DateTime};

/// 進行状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RunningStatus {
    /// 未定義。
    Undefined,
    /// 非実行中。
    NotRunning,
    /// 数秒以内に開始（例：映像記録用）。
    StartsSoon,
    /// 停止中。
    Pausing,
    /// 実行中。
    Running,
    /// サービス休止中。
    ServiceOffAir,
    /// 予約。
    Reserved,
}

impl RunningStatus {
    /// 進行状態を説明する文字列を返す。
    pub fn description(&self) -> &'static str {
        match self {
            RunningStatus::Undefined => "undefined",
            RunningStatus::NotRunning => "not running",
            RunningStatus::StartsSoon => "starts in a few seconds",
            RunningStatus::Pausing => "pausing",
            RunningStatus::Running => "running",
            RunningStatus::ServiceOffAir => "service off-air",
            RunningStatus::Reserved => "reserved",
        }
    }
}

impl From<u8> for RunningStatus {
    #[inline]
    fn from(value: u8) -> RunningStatus {
        match value {
            0 => RunningStatus::Undefined,
            1 => RunningStatus::NotRunning,
            2 => RunningStatus::StartsSoon,
            3 => RunningStatus::Pausing,
            4 => RunningStatus::Running,
            5 => RunningStatus::ServiceOffAir,
            _ => RunningStatus::Reserved,
        }
    }
}

impl fmt::Display for RunningStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// EITのテーブル識別による分類。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableClass {
    /// 自TSにおけるイベント［現在／次］。
    ActualPf,
    /// 他TSにおけるイベント［現在／次］。
    OtherPf,
    /// 自TSにおけるイベント［スケジュール］。
    ActualSchedule,
    /// 他TSにおけるイベント［スケジュール］。
    OtherSchedule,
}

impl TableClass {
    /// 自TSにおけるイベント［現在／次］を格納するEITのテーブルID。
    pub const TABLE_ID_PF_ACTUAL: u8 = 0x4E;
    /// 他TSにおけるイベント［現在／次］を格納するEITのテーブルID。
    pub const TABLE_ID_PF_OTHER: u8 = 0x4F;
    /// 自TSにおけるイベント［スケジュール］を格納するEITのテーブルID。
    pub const TABLE_ID_SCHEDULE_ACTUAL: RangeInclusive<u8> = 0x50..=0x5F;
    /// 他TSにおけるイベント［スケジュール］を格納するEITのテーブルID。
    pub const TABLE_ID_SCHEDULE_OTHER: RangeInclusive<u8> = 0x60..=0x6F;

    /// 全ての分類。
    pub const ALL: [TableClass; 4] = [
        TableClass::ActualPf,
        TableClass::OtherPf,
        TableClass::ActualSchedule,
        TableClass::OtherSchedule,
    ];

    /// テーブル識別を分類する。
    ///
    /// EITのテーブル識別でなければ`None`を返す。
    pub fn from_table_id(table_id: u8) -> Option<TableClass> {
        match table_id {
            Self::TABLE_ID_PF_ACTUAL => Some(TableClass::ActualPf),
            Self::TABLE_ID_PF_OTHER => Some(TableClass::OtherPf),
            0x50..=0x5F => Some(TableClass::ActualSchedule),
            0x60..=0x6F => Some(TableClass::OtherSchedule),
            _ => None,
        }
    }

    /// 分類における最初のテーブル識別を返す。
    pub fn first_table_id(&self) -> u8 {
        match self {
            TableClass::ActualPf => Self::TABLE_ID_PF_ACTUAL,
            TableClass::OtherPf => Self::TABLE_ID_PF_OTHER,
            TableClass::ActualSchedule => *Self::TABLE_ID_SCHEDULE_ACTUAL.start(),
            TableClass::OtherSchedule => *Self::TABLE_ID_SCHEDULE_OTHER.start(),
        }
    }

    /// スケジュールの分類かどうかを返す。
    #[inline]
    pub fn is_schedule(&self) -> bool {
        matches!(self, TableClass::ActualSchedule | TableClass::OtherSchedule)
    }

    /// [`TableClass::ALL`]における位置を返す。
    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// 共通ヘッダに続くEIT固有のヘッダ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EitHeader {
    /// トランスポートストリーム識別。
    pub transport_stream_id: u16,
    /// オリジナルネットワーク識別。
    pub original_network_id: u16,
    /// セグメント最終セクション番号。
    pub segment_last_section_number: u8,
    /// 最終テーブル識別。
    pub last_table_id: u8,
}

impl EitHeader {
    /// ヘッダのバイト数。
    pub const LEN: usize = 6;

    /// `cur`から`EitHeader`を読み取る。
    pub fn read(cur: &mut ByteCursor) -> Result<EitHeader, ReadError> {
        let [ts_hi, ts_lo, onid_hi, onid_lo, segment_last_section_number, last_table_id] =
            cur.read_array::<6>()?;

        Ok(EitHeader {
            transport_stream_id: u16::from_be_bytes([ts_hi, ts_lo]),
            original_network_id: u16::from_be_bytes([onid_hi, onid_lo]),
            segment_last_section_number,
            last_table_id,
        })
    }
}

/// 各サービスに含まれるイベント。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EitEvent<'a> {
    /// イベント識別。
    pub event_id: u16,
    /// 開始時間（MJDとBCD）。
    pub start_time: [u8; 5],
    /// 継続時間（BCD）。
    pub duration: [u8; 3],
    /// 進行状態。
    pub running_status: RunningStatus,
    /// スクランブル。
    pub free_ca_mode: bool,
    /// 記述子の塊。
    pub descriptors: DescriptorBlock<'a>,
}

impl<'a> EitEvent<'a> {
    /// 開始時間を返す。
    ///
    /// 未定義の場合は`None`を返す。
    pub fn start_date_time(&self) -> Option<DateTime> {
        if DateTime::is_undefined(&self.start_time) {
            None
        } else {
            Some(DateTime::read(&self.start_time))
        }
    }

    /// 継続時間を秒数で返す。
    #[inline]
    pub fn duration_secs(&self) -> u32 {
        time::read_bcd_duration(&self.duration)
    }
}

/// EITのセクション。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EitSection<'a> {
    /// 共通ヘッダ。サービス識別は`subject_id`に入る。
    pub header: SectionHeader,
    /// EIT固有のヘッダ。
    pub eit: EitHeader,
    /// イベントのループ部分。
    pub events: EventIter<'a>,
    /// CRC。
    pub crc32: u32,
}

impl<'a> EitSection<'a> {
    /// `buf`全体を1つのEITセクションとして読み取る。
    ///
    /// テーブル識別は検査しない。
    pub fn read(buf: &'a [u8]) -> Result<EitSection<'a>, ReadError> {
        let section = Section::read(buf)?;
        let mut cur = ByteCursor::new(section.data);
        let Ok(eit) = EitHeader::read(&mut cur) else {
            log::debug!("invalid EitHeader");
            return Err(ReadError::Truncated);
        };

        Ok(EitSection {
            header: section.header,
            eit,
            events: EventIter(cur),
            crc32: section.crc32,
        })
    }
}

/// EITのイベントを順に読み取るイテレーター。
///
/// イベントヘッダが途切れている場合はそこで終了する。
/// 記述子ループ長が残りを超える場合は、残りの範囲を記述子群とした上で終了する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIter<'a>(ByteCursor<'a>);

impl<'a> EventIter<'a> {
    /// 1つのイベントのヘッダ部分のバイト数。
    pub const EVENT_HEADER_LEN: usize = 12;
}

impl<'a> Iterator for EventIter<'a> {
    type Item = EitEvent<'a>;

    fn next(&mut self) -> Option<EitEvent<'a>> {
        if self.0.is_empty() {
            return None;
        }

        let Ok(header) = self.0.read_array::<12>() else {
            log::debug!("invalid EitEvent");
            self.0.take_rest();
            return None;
        };
        let [id_hi, id_lo, s0, s1, s2, s3, s4, d0, d1, d2, l_hi, l_lo] = header;

        let flags = u16::from_be_bytes([l_hi, l_lo]);
        let descriptors_loop_length = (flags & 0x0FFF) as usize;
        let descriptors = match self.0.read_declared(descriptors_loop_length) {
            Ok(descriptors) => descriptors,
            Err(e) => {
                log::debug!("invalid EitEvent::descriptors_loop_length: {}", e);
                self.0.take_rest()
            }
        };

        Some(EitEvent {
            event_id: u16::from_be_bytes([id_hi, id_lo]),
            start_time: [s0, s1, s2, s3, s4],
            duration: [d0, d1, d2],
            running_status: ((flags >> 13) as u8).into(),
            free_ca_mode: flags & 0x1000 != 0,
            descriptors: DescriptorBlock::new(descriptors),
        })
    }
}

impl<'a> std::iter::FusedIterator for EventIter<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_table_class() {
        assert_eq!(TableClass::from_table_id(0x4E), Some(TableClass::ActualPf));
        assert_eq!(TableClass::from_table_id(0x4F), Some(TableClass::OtherPf));
        assert_eq!(TableClass::from_table_id(0x50), Some(TableClass::ActualSchedule));
        assert_eq!(TableClass::from_table_id(0x5F), Some(TableClass::ActualSchedule));
        assert_eq!(TableClass::from_table_id(0x60), Some(TableClass::OtherSchedule));
        assert_eq!(TableClass::from_table_id(0x6F), Some(TableClass::OtherSchedule));
        assert_eq!(TableClass::from_table_id(0x42), None);
        assert_eq!(TableClass::from_table_id(0x70), None);

        for (i, class) in TableClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
            assert_eq!(TableClass::from_table_id(class.first_table_id()), Some(*class));
        }
    }

    #[test]
    fn test_running_status() {
        assert_eq!(RunningStatus::from(4), RunningStatus::Running);
        assert_eq!(RunningStatus::from(5).to_string(), "service off-air");
        assert_eq!(RunningStatus::from(7), RunningStatus::Reserved);
        assert_eq!(RunningStatus::from(2).description(), "starts in a few seconds");
    }

    #[test]
    fn test_eit_section() {
        let buf = hex_literal::hex!(
            "
            4E F0 2A 00 10 C3 00 01
            00 01 00 02 01 4E
            12 34 C0 79 01 45 30 00 30 00 80 06 50 04 15 05 00 65
            12 35 FF FF FF FF FF 01 00 00 10 03
            DE AD BE EF
            "
        );
        let eit = EitSection::read(&buf).unwrap();
        assert_eq!(eit.header.table_id, 0x4E);
        assert_eq!(eit.header.subject_id, 0x0010);
        assert_eq!(eit.header.version_number, 1);
        assert_eq!(
            eit.eit,
            EitHeader {
                transport_stream_id: 1,
                original_network_id: 2,
                segment_last_section_number: 1,
                last_table_id: 0x4E,
            }
        );
        assert_eq!(eit.crc32, 0xDEADBEEF);

        let events: Vec<_> = eit.events.collect();
        assert_eq!(events.len(), 2);

        assert_eq!(events[0].event_id, 0x1234);
        assert_eq!(
            events[0].start_date_time().map(|dt| dt.to_string()),
            Some("1993-10-13 01:45:30".to_string())
        );
        assert_eq!(events[0].duration_secs(), 30 * 60);
        assert_eq!(events[0].running_status, RunningStatus::Running);
        assert!(!events[0].free_ca_mode);
        assert_eq!(events[0].descriptors.as_bytes().len(), 6);

        // 記述子ループ長が残りを超えている
        assert_eq!(events[1].event_id, 0x1235);
        assert_eq!(events[1].start_date_time(), None);
        assert_eq!(events[1].duration_secs(), 3600);
        assert_eq!(events[1].running_status, RunningStatus::Undefined);
        assert!(events[1].free_ca_mode);
        assert_eq!(events[1].descriptors.as_bytes(), &[] as &[u8]);
    }

    #[test]
    fn test_truncated_eit_section() {
        let buf = hex_literal::hex!("4E F0 2A 00 10 C3 00 01 00 01 00 DE AD BE EF");
        assert_matches!(EitSection::read(&buf), Err(ReadError::Truncated));

        // イベントヘッダが途切れている
        let buf = hex_literal::hex!(
            "
            50 F0 2A 00 10 C3 00 01
            00 01 00 02 00 50
            12 34 C0 79 01
            DE AD BE EF
            "
        );
        let eit = EitSection::read(&buf).unwrap();
        assert_eq!(eit.events.count(), 0);
    }
}
