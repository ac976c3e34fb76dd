//! 組み立て中のイベントと、記述子を畳み込む処理。

use smallvec::SmallVec;

use crate::classify::ClassificationLookup;
use crate::lang::LangCode;
use crate::psi::desc::{
    AnyDescriptor, ComponentDescriptor, ContentGenre, ExtendedEventDescriptor, ParentalRating,
    ProgrammeIdentificationLabel, ShortEventDescriptor,
};
use crate::psi::table::{EitEvent, RunningStatus, TableClass};
use crate::text::DvbString;
use crate::time::{self, DateTime};

use super::Options;

/// イベントを一意に識別するキー。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey {
    /// トランスポートストリーム識別。
    pub transport_stream_id: u16,
    /// オリジナルネットワーク識別。
    pub original_network_id: u16,
    /// イベント識別。
    pub event_id: u16,
}

/// 拡張形式イベントの項目。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventItem {
    /// 項目名。
    pub description: DvbString,
    /// 項目記述。
    pub item: DvbString,
}

/// イベントのコンポーネント情報。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventComponent {
    /// コンポーネント内容拡張（4ビット）。
    pub stream_content_ext: u8,
    /// コンポーネント内容（4ビット）。
    pub stream_content: u8,
    /// コンポーネント種別。
    pub component_type: u8,
    /// コンポーネントタグ。
    pub component_tag: u8,
    /// 言語コード。
    pub lang_code: LangCode,
    /// コンポーネント記述。
    pub text: DvbString,
}

impl From<&ComponentDescriptor<'_>> for EventComponent {
    fn from(cd: &ComponentDescriptor) -> EventComponent {
        EventComponent {
            stream_content_ext: cd.stream_content_ext,
            stream_content: cd.stream_content,
            component_type: cd.component_type,
            component_tag: cd.component_tag,
            lang_code: cd.lang_code,
            text: cd.text.to_owned(),
        }
    }
}

/// スムージングバッファの指定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SmoothingBuffer {
    /// バッファサイズ（2ビット）。
    pub sb_size: u8,
    /// リークレート（6ビット）。
    pub sb_leak_rate: u8,
}

impl SmoothingBuffer {
    /// バッファサイズをバイト数で返す。
    #[inline]
    pub fn size_bytes(&self) -> Option<u32> {
        crate::classify::smoothing_buffer_size(self.sb_size)
    }

    /// リークレートをMbit/sで返す。
    #[inline]
    pub fn leak_rate_mbps(&self) -> Option<f32> {
        crate::classify::smoothing_buffer_leak_rate(self.sb_leak_rate)
    }
}

/// タイムシフト元のイベント。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShiftFrom {
    /// 参照先のサービス識別。
    pub service_id: u16,
    /// 参照先のイベント。
    pub event: EventKey,
}

/// イベントを更新したセクションの、テーブルの分類と版数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableVersion {
    /// テーブルの分類。
    pub class: TableClass,
    /// 版数。
    pub version: u8,
}

/// EITから組み立てられたイベント。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpgEvent {
    /// イベントのキー。
    pub key: EventKey,
    /// サービス識別。
    pub service_id: u16,
    /// 開始時間（MJDとBCD）。
    pub start_time: [u8; 5],
    /// 継続時間（BCD）。
    pub duration: [u8; 3],
    /// 進行状態。
    pub running_status: RunningStatus,
    /// スクランブル。
    pub free_ca_mode: bool,
    /// 短形式イベント記述子の言語コード。
    pub language: Option<LangCode>,
    /// 番組名。
    pub event_name: DvbString,
    /// 番組記述。
    pub short_description: DvbString,
    /// 拡張記述。
    pub long_description: DvbString,
    /// 拡張形式イベントの項目。
    pub items: Vec<EventItem>,
    /// コンポーネント。
    pub component: Option<EventComponent>,
    /// ジャンル。
    pub content: Option<ContentGenre>,
    /// パレンタルレーティング。
    pub parental_rating: Option<ParentalRating>,
    /// スムージングバッファ。
    pub smoothing_buffer: Option<SmoothingBuffer>,
    /// 番組識別ラベル。
    pub pdc: Option<ProgrammeIdentificationLabel>,
    /// タイムシフト元のイベント。
    pub shift_from: Option<ShiftFrom>,
    /// 限定受信方式識別の一覧。
    pub ca_system_ids: SmallVec<[u16; 4]>,
    /// 最後に受け付けた拡張形式イベント記述子の番号。
    last_fragment: Option<u8>,
    /// 最後にこのイベントを更新したセクション。
    source: Option<TableVersion>,
    /// 拡張記述を組み立てたセクション。
    text_source: Option<TableVersion>,
}

impl EpgEvent {
    pub(super) fn new(key: EventKey, service_id: u16) -> EpgEvent {
        EpgEvent {
            key,
            service_id,
            start_time: [0xFF; 5],
            duration: [0; 3],
            running_status: RunningStatus::Undefined,
            free_ca_mode: false,
            language: None,
            event_name: DvbString::new(),
            short_description: DvbString::new(),
            long_description: DvbString::new(),
            items: Vec::new(),
            component: None,
            content: None,
            parental_rating: None,
            smoothing_buffer: None,
            pdc: None,
            shift_from: None,
            ca_system_ids: SmallVec::new(),
            last_fragment: None,
            source: None,
            text_source: None,
        }
    }

    /// イベント識別。
    #[inline]
    pub fn event_id(&self) -> u16 {
        self.key.event_id
    }

    /// 開始時間を返す。未定義の場合は`None`を返す。
    pub fn start(&self) -> Option<DateTime> {
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

    /// 最後に受け付けた拡張形式イベント記述子の番号。
    #[inline]
    pub fn last_fragment(&self) -> Option<u8> {
        self.last_fragment
    }

    /// コンポーネントの説明を`lookup`から引く。
    pub fn component_text<'l, L>(&self, lookup: &'l L) -> Option<&'l str>
    where
        L: ClassificationLookup + ?Sized,
    {
        let c = self.component.as_ref()?;
        lookup.component(c.stream_content, c.stream_content_ext, c.component_type)
    }

    /// ジャンルの説明を`lookup`から引く。
    pub fn content_text<'l, L>(&self, lookup: &'l L) -> Option<&'l str>
    where
        L: ClassificationLookup + ?Sized,
    {
        let c = self.content.as_ref()?;
        lookup.content(c.content_nibble_level_1, c.content_nibble_level_2)
    }

    /// 最後にこのイベントを更新したセクションを返す。
    #[inline]
    pub fn source(&self) -> Option<TableVersion> {
        self.source
    }

    /// イベントループの固定部分で上書きする。
    pub(super) fn update_header(&mut self, event: &EitEvent, source: TableVersion) {
        self.source = Some(source);
        self.start_time = event.start_time;
        self.duration = event.duration;
        self.running_status = event.running_status;
        self.free_ca_mode = event.free_ca_mode;
    }

    /// 記述子を畳み込む。
    pub(super) fn merge(&mut self, desc: AnyDescriptor, options: &Options) {
        match desc {
            AnyDescriptor::ShortEvent(sed) => self.merge_short_event(&sed),
            AnyDescriptor::ExtendedEvent(eed) => self.merge_extended_event(&eed, options),
            AnyDescriptor::ParentalRating(prd) => {
                if self.parental_rating.is_none() {
                    self.parental_rating = prd.ratings.first().copied();
                }
            }
            AnyDescriptor::Component(cd) => self.component = Some(EventComponent::from(&cd)),
            AnyDescriptor::Content(cd) => {
                if let Some(genre) = cd.genres.first() {
                    self.content = Some(*genre);
                }
            }
            AnyDescriptor::ShortSmoothingBuffer(ssbd) => {
                self.smoothing_buffer = Some(SmoothingBuffer {
                    sb_size: ssbd.sb_size,
                    sb_leak_rate: ssbd.sb_leak_rate,
                });
            }
            AnyDescriptor::Pdc(pd) => self.pdc = Some(pd.programme_identification_label),
            AnyDescriptor::CaIdentifier(cid) => self.ca_system_ids = cid.ca_system_ids,
            AnyDescriptor::TimeShiftedEvent(tsed) => {
                self.shift_from = Some(ShiftFrom {
                    service_id: tsed.reference_service_id,
                    event: EventKey {
                        event_id: tsed.reference_event_id,
                        ..self.key
                    },
                });
            }
            _ => {}
        }
    }

    fn merge_short_event(&mut self, sed: &ShortEventDescriptor) {
        self.language = Some(sed.lang_code);
        if !sed.event_name.is_empty() {
            self.event_name = sed.event_name.to_owned();
        }
        if !sed.text.is_empty() {
            self.short_description = sed.text.to_owned();
        }
    }

    fn merge_extended_event(&mut self, eed: &ExtendedEventDescriptor, options: &Options) {
        // 別の版で0番から送り直された拡張記述は組み立て直す
        if eed.descriptor_number == 0
            && self.last_fragment.is_some()
            && self.text_source != self.source
        {
            log::trace!(
                "restart ExtendedEventDescriptor: {:?} -> {:?}",
                self.text_source,
                self.source
            );
            self.long_description.clear();
            self.items.clear();
            self.last_fragment = None;
        }

        let accepted = match self.last_fragment {
            None => eed.descriptor_number == 0,
            Some(last) => eed.descriptor_number > last,
        };
        if !accepted {
            log::trace!(
                "drop ExtendedEventDescriptor {} after {:?}",
                eed.descriptor_number,
                self.last_fragment
            );
            return;
        }
        self.last_fragment = Some(eed.descriptor_number);
        self.text_source = self.source;

        self.long_description.push_str(eed.text);
        if let Some(max) = options.max_long_description {
            self.long_description.truncate(max);
        }

        let room = match options.max_items {
            Some(max) => max.saturating_sub(self.items.len()),
            None => usize::MAX,
        };
        self.items
            .extend(eed.items.iter().take(room).map(|item| EventItem {
                description: item.item_description.to_owned(),
                item: item.item.to_owned(),
            }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::StandardLookup;
    use crate::lang::CountryCode;
    use crate::psi::desc::{
        CaIdentifierDescriptor, ContentDescriptor, Descriptor, ExtendedEventItem,
        ParentalRatingDescriptor, TimeShiftedEventDescriptor,
    };
    use crate::text::DvbStr;
    use smallvec::smallvec;

    const KEY: EventKey = EventKey {
        transport_stream_id: 1,
        original_network_id: 2,
        event_id: 3,
    };

    fn extended(number: u8, text: &[u8]) -> AnyDescriptor {
        AnyDescriptor::ExtendedEvent(ExtendedEventDescriptor {
            descriptor_number: number,
            last_descriptor_number: 2,
            lang_code: LangCode::ENG,
            items: vec![ExtendedEventItem {
                item_description: DvbStr::from_bytes(b"Cast"),
                item: DvbStr::from_bytes(text),
            }],
            text: DvbStr::from_bytes(text),
        })
    }

    #[test]
    fn test_short_event() {
        let mut event = EpgEvent::new(KEY, 0x10);
        let data = b"eng\x04News\x05Today";
        let sed = ShortEventDescriptor::read(data).unwrap();
        event.merge(AnyDescriptor::ShortEvent(sed), &Options::default());
        assert_eq!(event.language, Some(LangCode::ENG));
        assert_eq!(event.event_name, b"News");
        assert_eq!(event.short_description, b"Today");

        // 空の文字列では上書きしない
        let sed = ShortEventDescriptor::read(b"deu\x00\x00").unwrap();
        event.merge(AnyDescriptor::ShortEvent(sed), &Options::default());
        assert_eq!(event.language, Some(LangCode::DEU));
        assert_eq!(event.event_name, b"News");
        assert_eq!(event.short_description, b"Today");
    }

    #[test]
    fn test_extended_event_in_order() {
        let mut event = EpgEvent::new(KEY, 0x10);
        for (n, text) in [(0, "A"), (1, "B"), (2, "C")] {
            event.merge(extended(n, text.as_bytes()), &Options::default());
        }
        assert_eq!(event.long_description, b"ABC");
        assert_eq!(event.items.len(), 3);
        assert_eq!(event.items[2].description, b"Cast");
        assert_eq!(event.items[2].item, b"C");
        assert_eq!(event.last_fragment(), Some(2));
    }

    #[test]
    fn test_extended_event_out_of_order() {
        let mut event = EpgEvent::new(KEY, 0x10);
        for (n, text) in [(1, "B"), (0, "A"), (2, "C")] {
            event.merge(extended(n, text.as_bytes()), &Options::default());
        }
        assert_eq!(event.long_description, b"AC");
        assert_eq!(event.items.len(), 2);

        // 重複は捨てる
        event.merge(extended(2, b"C"), &Options::default());
        assert_eq!(event.long_description, b"AC");
    }

    #[test]
    fn test_extended_event_restart() {
        let v0 = TableVersion {
            class: TableClass::ActualPf,
            version: 0,
        };
        let v2 = TableVersion {
            class: TableClass::ActualPf,
            version: 2,
        };

        let mut event = EpgEvent::new(KEY, 0x10);
        event.source = Some(v0);
        for (n, text) in [(0, "A"), (1, "B")] {
            event.merge(extended(n, text.as_bytes()), &Options::default());
        }
        assert_eq!(event.long_description, b"AB");

        // 同じ版からの0番は重複として捨てる
        event.merge(extended(0, b"A"), &Options::default());
        assert_eq!(event.long_description, b"AB");

        event.source = Some(v2);
        event.merge(extended(1, b"Y"), &Options::default());
        assert_eq!(event.long_description, b"AB");
        event.merge(extended(0, b"X"), &Options::default());
        assert_eq!(event.long_description, b"X");
        assert_eq!(event.items.len(), 1);
        assert_eq!(event.last_fragment(), Some(0));
        event.merge(extended(2, b"Z"), &Options::default());
        assert_eq!(event.long_description, b"XZ");
        assert_eq!(event.items.len(), 2);
    }

    #[test]
    fn test_extended_event_limits() {
        let options = Options {
            max_long_description: Some(2),
            max_items: Some(1),
        };
        let mut event = EpgEvent::new(KEY, 0x10);
        for (n, text) in [(0, "AA"), (1, "BB")] {
            event.merge(extended(n, text.as_bytes()), &options);
        }
        assert_eq!(event.long_description, b"AA");
        assert_eq!(event.items.len(), 1);
        assert_eq!(event.last_fragment(), Some(1));
    }

    #[test]
    fn test_parental_rating_keeps_first() {
        let mut event = EpgEvent::new(KEY, 0x10);
        let first = ParentalRatingDescriptor::read(b"GBR\x09").unwrap();
        let second = ParentalRatingDescriptor::read(b"FRA\x0C").unwrap();
        event.merge(AnyDescriptor::ParentalRating(first), &Options::default());
        event.merge(AnyDescriptor::ParentalRating(second), &Options::default());

        let rating = event.parental_rating.unwrap();
        assert_eq!(rating.country_code, CountryCode(*b"GBR"));
        assert_eq!(rating.minimum_age(), Some(12));
    }

    #[test]
    fn test_overwritten_fields() {
        let mut event = EpgEvent::new(KEY, 0x10);
        let options = Options::default();

        let data = hex_literal::hex!("15 05 00 65 6E 67 48 44");
        let cd = ComponentDescriptor::read(&data).unwrap();
        event.merge(AnyDescriptor::Component(cd), &options);
        let data = hex_literal::hex!("15 0B 01 65 6E 67");
        let cd = ComponentDescriptor::read(&data).unwrap();
        event.merge(AnyDescriptor::Component(cd), &options);
        let component = event.component.as_ref().unwrap();
        assert_eq!(component.component_type, 0x0B);
        assert_eq!(component.text, b"");

        event.merge(
            AnyDescriptor::Content(ContentDescriptor::read(&[0x14, 0x00, 0x20, 0x00]).unwrap()),
            &options,
        );
        event.merge(
            AnyDescriptor::Content(ContentDescriptor::read(&[]).unwrap()),
            &options,
        );
        assert_eq!(
            event.content,
            Some(ContentGenre {
                content_nibble_level_1: 1,
                content_nibble_level_2: 4,
                user_byte: 0,
            })
        );
        assert_eq!(event.content_text(&StandardLookup), Some("comedy"));

        event.merge(
            AnyDescriptor::CaIdentifier(CaIdentifierDescriptor {
                ca_system_ids: smallvec![0x0100],
            }),
            &options,
        );
        event.merge(
            AnyDescriptor::CaIdentifier(CaIdentifierDescriptor {
                ca_system_ids: smallvec![0x0B00, 0x0B01],
            }),
            &options,
        );
        assert_eq!(&*event.ca_system_ids, &[0x0B00, 0x0B01]);

        event.merge(
            AnyDescriptor::TimeShiftedEvent(TimeShiftedEventDescriptor {
                reference_service_id: 0x20,
                reference_event_id: 0x99,
            }),
            &options,
        );
        assert_eq!(
            event.shift_from,
            Some(ShiftFrom {
                service_id: 0x20,
                event: EventKey {
                    transport_stream_id: 1,
                    original_network_id: 2,
                    event_id: 0x99,
                },
            })
        );

        // 畳み込まない記述子
        event.merge(AnyDescriptor::Unsupported(0x40), &options);
        assert_eq!(event.event_name, b"");
    }

    #[test]
    fn test_component_text() {
        let mut event = EpgEvent::new(KEY, 0x10);
        assert_eq!(event.component_text(&StandardLookup), None);

        let data = hex_literal::hex!("F5 0B 00 65 6E 67");
        let cd = ComponentDescriptor::read(&data).unwrap();
        event.merge(AnyDescriptor::Component(cd), &Options::default());
        assert_eq!(
            event.component_text(&StandardLookup),
            Some("H.264/AVC high definition video, 16:9 aspect ratio, 25 Hz")
        );
    }
}
