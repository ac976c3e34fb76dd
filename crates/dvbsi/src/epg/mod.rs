//! EITのセクションからEPGを組み立てるモジュール。
//!
//! [`Assembler`]にセクションを1つずつ与えると、連続性と版数を検査した上で
//! 各イベントの記述子を[`EpgEvent`]に畳み込み、[`EventKey`]で引けるように保持する。

mod event;

pub use event::*;

use thiserror::Error;

use crate::psi::desc::AnyDescriptor;
use crate::psi::table::{EitSection, TableClass};

/// セクションの処理時に発生するエラー。
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeError {
    /// セクションに必要なバイト数が残っていない。
    #[error("truncated section")]
    Truncated,

    /// EITではないテーブル識別。
    #[error("unknown table id: {0:#04X}")]
    UnknownTable(u8),

    /// セグメントや最終テーブル識別が連続していない。
    #[error("continuity rejected")]
    ContinuityRejected,

    /// 受信済みの版数。
    #[error("duplicate version")]
    DuplicateVersion,
}

/// [`Assembler`]の設定。
///
/// 既定ではどちらも制限しない。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Options {
    /// 拡張記述の最大バイト数。
    pub max_long_description: Option<usize>,
    /// 拡張形式イベントの項目の最大数。
    pub max_items: Option<usize>,
}

/// テーブルの分類ごとの受信状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableClassState {
    /// 最後に受け付けた版数。
    pub last_version: Option<u8>,
    /// これまでに受け付けた最終テーブル識別の最大値。
    pub running_max_table_id: u8,
}

impl TableClassState {
    /// `class`の初期状態を返す。
    pub fn new(class: TableClass) -> TableClassState {
        TableClassState {
            last_version: None,
            running_max_table_id: class.first_table_id(),
        }
    }

    /// `version`が受信済みの版数かその次の版数かを返す。
    pub fn is_duplicate(&self, version: u8) -> bool {
        match self.last_version {
            Some(last) => version == last || version == (last + 1) % 32,
            None => false,
        }
    }
}

/// イベントのキーからイベントを得るための、順序を保持する連想配列。
pub type EventMap = indexmap::IndexMap<EventKey, EpgEvent, fxhash::FxBuildHasher>;

/// EITのセクションからEPGを組み立てる。
#[derive(Debug, Clone)]
pub struct Assembler {
    options: Options,
    states: [TableClassState; 4],
    events: EventMap,
}

impl Default for Assembler {
    #[inline]
    fn default() -> Assembler {
        Assembler::new()
    }
}

impl Assembler {
    /// 既定の設定で`Assembler`を生成する。
    #[inline]
    pub fn new() -> Assembler {
        Assembler::with_options(Options::default())
    }

    /// `options`で`Assembler`を生成する。
    pub fn with_options(options: Options) -> Assembler {
        Assembler {
            options,
            states: TableClass::ALL.map(TableClassState::new),
            events: EventMap::default(),
        }
    }

    /// 設定を返す。
    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// `class`の受信状態を返す。
    #[inline]
    pub fn state(&self, class: TableClass) -> &TableClassState {
        &self.states[class.index()]
    }

    /// EITのセクション1つを処理する。
    ///
    /// 連続性の検査や版数の検査で弾かれた場合、イベントは一切更新されない。
    /// ただし番組表の最終テーブル識別の最大値は、連続性の検査を通った時点で更新される。
    pub fn decode_section(&mut self, buf: &[u8]) -> Result<(), DecodeError> {
        let Some(&table_id) = buf.first() else {
            log::debug!("invalid Section");
            return Err(DecodeError::Truncated);
        };
        let Some(class) = TableClass::from_table_id(table_id) else {
            log::debug!("unknown table id: {:#04X}", table_id);
            return Err(DecodeError::UnknownTable(table_id));
        };

        let Ok(eit) = EitSection::read(buf) else {
            return Err(DecodeError::Truncated);
        };
        let state = &mut self.states[class.index()];

        if class.is_schedule() {
            if eit.eit.segment_last_section_number != eit.header.section_number
                || eit.eit.last_table_id < state.running_max_table_id
            {
                log::debug!(
                    "discontinuous {:?}: section_number={}, segment_last_section_number={}, \
                     last_table_id={:#04X}, max={:#04X}",
                    class,
                    eit.header.section_number,
                    eit.eit.segment_last_section_number,
                    eit.eit.last_table_id,
                    state.running_max_table_id,
                );
                return Err(DecodeError::ContinuityRejected);
            }
            // 版数の検査より前に更新する
            state.running_max_table_id = eit.eit.last_table_id;
        } else {
            if eit.eit.last_table_id != class.first_table_id()
                || eit.header.last_section_number != eit.eit.segment_last_section_number
            {
                log::debug!(
                    "discontinuous {:?}: last_section_number={}, segment_last_section_number={}, \
                     last_table_id={:#04X}",
                    class,
                    eit.header.last_section_number,
                    eit.eit.segment_last_section_number,
                    eit.eit.last_table_id,
                );
                return Err(DecodeError::ContinuityRejected);
            }
        }

        if state.is_duplicate(eit.header.version_number) {
            log::debug!(
                "duplicate version of {:?}: {} (last: {:?})",
                class,
                eit.header.version_number,
                state.last_version,
            );
            return Err(DecodeError::DuplicateVersion);
        }

        state.last_version = Some(eit.header.version_number);
        log::trace!(
            "accept {:?}: table_id={:#04X}, service_id={:#06X}, version={}, section={}",
            class,
            table_id,
            eit.header.subject_id,
            eit.header.version_number,
            eit.header.section_number,
        );

        for event in eit.events {
            let key = EventKey {
                transport_stream_id: eit.eit.transport_stream_id,
                original_network_id: eit.eit.original_network_id,
                event_id: event.event_id,
            };
            let epg_event = self
                .events
                .entry(key)
                .or_insert_with(|| EpgEvent::new(key, eit.header.subject_id));
            epg_event.update_header(
                &event,
                TableVersion {
                    class,
                    version: eit.header.version_number,
                },
            );

            for raw in &event.descriptors {
                match AnyDescriptor::read(raw) {
                    Ok(desc) => epg_event.merge(desc, &self.options),
                    Err(e) => log::debug!("skip descriptor {:#04X}: {}", raw.tag, e),
                }
            }
        }

        Ok(())
    }

    /// キーに対応するイベントを返す。
    pub fn get_event(
        &self,
        transport_stream_id: u16,
        original_network_id: u16,
        event_id: u16,
    ) -> Option<&EpgEvent> {
        self.events.get(&EventKey {
            transport_stream_id,
            original_network_id,
            event_id,
        })
    }

    /// 受信した順にイベントを返すイテレーターを生成する。
    #[inline]
    pub fn iter_events(&self) -> impl Iterator<Item = &EpgEvent> + '_ {
        self.events.values()
    }

    /// 保持するイベント一覧。
    #[inline]
    pub fn events(&self) -> &EventMap {
        &self.events
    }

    /// 保持するイベントの数。
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// イベントを1つも保持していないかどうか。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// イベントと受信状態をすべて破棄する。
    pub fn reset(&mut self) {
        self.states = TableClass::ALL.map(TableClassState::new);
        self.events.clear();
    }
}
