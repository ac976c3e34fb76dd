//! EITのイベントに付随する記述子の定義。

use smallvec::SmallVec;

use crate::classify;
use crate::cursor::{ByteCursor, ReadError};
use crate::lang::{CountryCode, LangCode};
use crate::text::DvbStr;

use super::base::Descriptor;

/// 短形式イベント記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortEventDescriptor<'a> {
    /// 言語コード。
    pub lang_code: LangCode,
    /// 番組名。
    pub event_name: &'a DvbStr,
    /// 番組記述。
    pub text: &'a DvbStr,
}

impl<'a> Descriptor<'a> for ShortEventDescriptor<'a> {
    const TAG: u8 = 0x4D;

    fn read(data: &'a [u8]) -> Result<ShortEventDescriptor<'a>, ReadError> {
        let mut cur = ByteCursor::new(data);
        let Ok(lang_code) = cur.read_array().map(LangCode) else {
            log::debug!("invalid ShortEventDescriptor::lang_code");
            return Err(ReadError::Truncated);
        };
        let Ok(event_name) = cur.read_len_prefixed() else {
            log::debug!("invalid ShortEventDescriptor::event_name");
            return Err(ReadError::Truncated);
        };
        let Ok(text) = cur.read_len_prefixed() else {
            log::debug!("invalid ShortEventDescriptor::text");
            return Err(ReadError::Truncated);
        };

        Ok(ShortEventDescriptor {
            lang_code,
            event_name: DvbStr::from_bytes(event_name),
            text: DvbStr::from_bytes(text),
        })
    }
}

/// 拡張形式イベント記述子における項目。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedEventItem<'a> {
    /// 項目名。
    pub item_description: &'a DvbStr,
    /// 項目記述。
    pub item: &'a DvbStr,
}

/// 拡張形式イベント記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedEventDescriptor<'a> {
    /// 記述子番号（4ビット）。
    pub descriptor_number: u8,
    /// 最終記述子番号（4ビット）。
    pub last_descriptor_number: u8,
    /// 言語コード。
    pub lang_code: LangCode,
    /// 項目。
    pub items: Vec<ExtendedEventItem<'a>>,
    /// 拡張記述。
    pub text: &'a DvbStr,
}

impl<'a> ExtendedEventDescriptor<'a> {
    fn read_items(mut cur: ByteCursor<'a>) -> Vec<ExtendedEventItem<'a>> {
        let mut items = Vec::new();
        while !cur.is_empty() {
            let Ok(item_description) = cur.read_len_prefixed() else {
                log::debug!("invalid ExtendedEventItem::item_description");
                break;
            };
            let Ok(item) = cur.read_len_prefixed() else {
                log::debug!("invalid ExtendedEventItem::item");
                break;
            };

            items.push(ExtendedEventItem {
                item_description: DvbStr::from_bytes(item_description),
                item: DvbStr::from_bytes(item),
            });
        }
        items
    }
}

impl<'a> Descriptor<'a> for ExtendedEventDescriptor<'a> {
    const TAG: u8 = 0x4E;

    fn read(data: &'a [u8]) -> Result<ExtendedEventDescriptor<'a>, ReadError> {
        let mut cur = ByteCursor::new(data);
        let Ok([number, l0, l1, l2, length_of_items]) = cur.read_array::<5>() else {
            log::debug!("invalid ExtendedEventDescriptor");
            return Err(ReadError::Truncated);
        };

        // 項目長が記述子を超えていても、記述子内にある分だけは項目として読む
        let length_of_items = (length_of_items as usize).min(cur.remaining());
        let items = match cur.sub_cursor(length_of_items) {
            Ok(items) => Self::read_items(items),
            Err(_) => Vec::new(),
        };

        let Ok(text) = cur.read_len_prefixed() else {
            log::debug!("invalid ExtendedEventDescriptor::text");
            return Err(ReadError::Truncated);
        };

        Ok(ExtendedEventDescriptor {
            descriptor_number: number >> 4,
            last_descriptor_number: number & 0x0F,
            lang_code: LangCode([l0, l1, l2]),
            items,
            text: DvbStr::from_bytes(text),
        })
    }
}

/// コンポーネント記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor<'a> {
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
    pub text: &'a DvbStr,
}

impl<'a> Descriptor<'a> for ComponentDescriptor<'a> {
    const TAG: u8 = 0x50;

    fn read(data: &'a [u8]) -> Result<ComponentDescriptor<'a>, ReadError> {
        let mut cur = ByteCursor::new(data);
        let Ok([stream_content, component_type, component_tag, l0, l1, l2]) = cur.read_array::<6>()
        else {
            log::debug!("invalid ComponentDescriptor");
            return Err(ReadError::Truncated);
        };

        Ok(ComponentDescriptor {
            stream_content_ext: stream_content >> 4,
            stream_content: stream_content & 0x0F,
            component_type,
            component_tag,
            lang_code: LangCode([l0, l1, l2]),
            text: DvbStr::from_bytes(cur.take_rest()),
        })
    }
}

/// コンテント記述子におけるジャンル。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentGenre {
    /// 大分類（4ビット）。
    pub content_nibble_level_1: u8,
    /// 中分類（4ビット）。
    pub content_nibble_level_2: u8,
    /// 事業者定義。
    pub user_byte: u8,
}

/// コンテント記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDescriptor {
    /// ジャンルの一覧。
    pub genres: SmallVec<[ContentGenre; 4]>,
}

impl Descriptor<'_> for ContentDescriptor {
    const TAG: u8 = 0x54;

    fn read(data: &[u8]) -> Result<ContentDescriptor, ReadError> {
        if data.len() % 2 != 0 {
            log::debug!("invalid ContentDescriptor::length");
            return Err(ReadError::MalformedLength);
        }

        let genres = data
            .chunks_exact(2)
            .map(|chunk| ContentGenre {
                content_nibble_level_1: chunk[0] >> 4,
                content_nibble_level_2: chunk[0] & 0x0F,
                user_byte: chunk[1],
            })
            .collect();
        Ok(ContentDescriptor { genres })
    }
}

/// パレンタルレーティング。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParentalRating {
    /// 国コード。
    pub country_code: CountryCode,
    /// レーティング。
    pub rating: u8,
}

impl ParentalRating {
    /// 視聴可能な最低年齢を返す。
    ///
    /// レーティングが`0x01`～`0x0F`以外の場合は`None`を返す。
    #[inline]
    pub fn minimum_age(&self) -> Option<u8> {
        classify::minimum_age(self.rating)
    }
}

/// パレンタルレート記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentalRatingDescriptor {
    /// レーティングの一覧。
    pub ratings: SmallVec<[ParentalRating; 2]>,
}

impl Descriptor<'_> for ParentalRatingDescriptor {
    const TAG: u8 = 0x55;

    fn read(data: &[u8]) -> Result<ParentalRatingDescriptor, ReadError> {
        if data.len() % 4 != 0 {
            log::debug!("invalid ParentalRatingDescriptor::length");
            return Err(ReadError::MalformedLength);
        }

        let ratings = data
            .chunks_exact(4)
            .map(|chunk| ParentalRating {
                country_code: CountryCode([chunk[0], chunk[1], chunk[2]]),
                rating: chunk[3],
            })
            .collect();
        Ok(ParentalRatingDescriptor { ratings })
    }
}

/// タイムシフトイベント記述子。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeShiftedEventDescriptor {
    /// 参照先のサービス識別。
    pub reference_service_id: u16,
    /// 参照先のイベント識別。
    pub reference_event_id: u16,
}

impl Descriptor<'_> for TimeShiftedEventDescriptor {
    const TAG: u8 = 0x4F;

    fn read(data: &[u8]) -> Result<TimeShiftedEventDescriptor, ReadError> {
        let mut cur = ByteCursor::new(data);
        let (Ok(reference_service_id), Ok(reference_event_id)) = (cur.read_u16(), cur.read_u16())
        else {
            log::debug!("invalid TimeShiftedEventDescriptor");
            return Err(ReadError::Truncated);
        };

        Ok(TimeShiftedEventDescriptor {
            reference_service_id,
            reference_event_id,
        })
    }
}

/// 短形式スムージングバッファ記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortSmoothingBufferDescriptor<'a> {
    /// バッファサイズ（2ビット）。
    pub sb_size: u8,
    /// リークレート（6ビット）。
    pub sb_leak_rate: u8,
    /// 予約領域。
    pub reserved: &'a [u8],
}

impl<'a> ShortSmoothingBufferDescriptor<'a> {
    /// バッファサイズをバイト数で返す。
    #[inline]
    pub fn size_bytes(&self) -> Option<u32> {
        classify::smoothing_buffer_size(self.sb_size)
    }

    /// リークレートをMbit/sで返す。
    #[inline]
    pub fn leak_rate_mbps(&self) -> Option<f32> {
        classify::smoothing_buffer_leak_rate(self.sb_leak_rate)
    }
}

impl<'a> Descriptor<'a> for ShortSmoothingBufferDescriptor<'a> {
    const TAG: u8 = 0x61;

    fn read(data: &'a [u8]) -> Result<ShortSmoothingBufferDescriptor<'a>, ReadError> {
        let [b, ref reserved @ ..] = *data else {
            log::debug!("invalid ShortSmoothingBufferDescriptor");
            return Err(ReadError::Truncated);
        };

        Ok(ShortSmoothingBufferDescriptor {
            sb_size: b >> 6,
            sb_leak_rate: b & 0b0011_1111,
            reserved,
        })
    }
}

/// 番組識別ラベル（PIL、20ビット）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgrammeIdentificationLabel(pub u32);

impl ProgrammeIdentificationLabel {
    /// 日（5ビット）。
    #[inline]
    pub fn day(&self) -> u8 {
        ((self.0 >> 15) & 0x1F) as u8
    }

    /// 月（4ビット）。
    #[inline]
    pub fn month(&self) -> u8 {
        ((self.0 >> 11) & 0x0F) as u8
    }

    /// 時（5ビット）。
    #[inline]
    pub fn hour(&self) -> u8 {
        ((self.0 >> 6) & 0x1F) as u8
    }

    /// 分（6ビット）。
    #[inline]
    pub fn minute(&self) -> u8 {
        (self.0 & 0x3F) as u8
    }
}

/// PDC記述子。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PdcDescriptor {
    /// 番組識別ラベル。
    pub programme_identification_label: ProgrammeIdentificationLabel,
}

impl Descriptor<'_> for PdcDescriptor {
    const TAG: u8 = 0x69;

    fn read(data: &[u8]) -> Result<PdcDescriptor, ReadError> {
        let [b0, b1, b2, ..] = *data else {
            log::debug!("invalid PdcDescriptor");
            return Err(ReadError::Truncated);
        };

        let pil = u32::from_be_bytes([0, b0 & 0x0F, b1, b2]);
        Ok(PdcDescriptor {
            programme_identification_label: ProgrammeIdentificationLabel(pil),
        })
    }
}

/// 多言語コンポーネント記述子における言語ごとの記述。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultilingualComponent<'a> {
    /// 言語コード。
    pub lang_code: LangCode,
    /// コンポーネント記述。
    pub text: &'a DvbStr,
}

/// 多言語コンポーネント記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultilingualComponentDescriptor<'a> {
    /// コンポーネントタグ。
    pub component_tag: u8,
    /// 言語ごとの記述。
    pub components: Vec<MultilingualComponent<'a>>,
}

impl<'a> Descriptor<'a> for MultilingualComponentDescriptor<'a> {
    const TAG: u8 = 0x5E;

    fn read(data: &'a [u8]) -> Result<MultilingualComponentDescriptor<'a>, ReadError> {
        let mut cur = ByteCursor::new(data);
        let Ok(component_tag) = cur.read_u8() else {
            log::debug!("invalid MultilingualComponentDescriptor");
            return Err(ReadError::Truncated);
        };

        let mut components = Vec::new();
        while !cur.is_empty() {
            let (Ok(lang_code), Ok(text)) = (cur.read_array().map(LangCode), cur.read_len_prefixed())
            else {
                log::debug!("invalid MultilingualComponent");
                return Err(ReadError::Truncated);
            };

            components.push(MultilingualComponent {
                lang_code,
                text: DvbStr::from_bytes(text),
            });
        }

        Ok(MultilingualComponentDescriptor {
            component_tag,
            components,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_short_event() {
        let data = hex_literal::hex!("65 6E 67 04 4E 65 77 73 03 41 42 43 FF");
        let desc = ShortEventDescriptor::read(&data).unwrap();
        assert_eq!(desc.lang_code, LangCode::ENG);
        assert_eq!(desc.event_name, b"News");
        assert_eq!(desc.text, b"ABC");

        assert_matches!(
            ShortEventDescriptor::read(&data[..10]),
            Err(ReadError::Truncated)
        );
    }

    #[test]
    fn test_extended_event() {
        let data = hex_literal::hex!(
            "
            12 65 6E 67 0D
            04 43 61 73 74 01 41
            03 44 69 72 01 42
            03 54 78 74
            "
        );
        let desc = ExtendedEventDescriptor::read(&data).unwrap();
        assert_eq!(desc.descriptor_number, 1);
        assert_eq!(desc.last_descriptor_number, 2);
        assert_eq!(desc.lang_code, LangCode::ENG);
        assert_eq!(desc.items.len(), 2);
        assert_eq!(desc.items[0].item_description, b"Cast");
        assert_eq!(desc.items[0].item, b"A");
        assert_eq!(desc.items[1].item_description, b"Dir");
        assert_eq!(desc.items[1].item, b"B");
        assert_eq!(desc.text, b"Txt");
    }

    #[test]
    fn test_extended_event_truncated_item() {
        // 2つ目の項目が項目長の範囲内で途切れている
        let data = hex_literal::hex!(
            "
            00 65 6E 67 09
            04 43 61 73 74 01 41
            05 44
            02 48 69
            "
        );
        let desc = ExtendedEventDescriptor::read(&data).unwrap();
        assert_eq!(desc.items.len(), 1);
        assert_eq!(desc.items[0].item_description, b"Cast");
        assert_eq!(desc.text, b"Hi");

        // 本文がない
        assert_matches!(
            ExtendedEventDescriptor::read(&data[..14]),
            Err(ReadError::Truncated)
        );
        assert_matches!(
            ExtendedEventDescriptor::read(&data[..4]),
            Err(ReadError::Truncated)
        );
    }

    #[test]
    fn test_component() {
        let data = hex_literal::hex!("15 05 00 65 6E 67 48 44");
        let desc = ComponentDescriptor::read(&data).unwrap();
        assert_eq!(
            desc,
            ComponentDescriptor {
                stream_content_ext: 1,
                stream_content: 5,
                component_type: 5,
                component_tag: 0,
                lang_code: LangCode::ENG,
                text: DvbStr::from_bytes(b"HD"),
            }
        );

        assert_matches!(ComponentDescriptor::read(&data[..5]), Err(ReadError::Truncated));
    }

    #[test]
    fn test_content() {
        let data = hex_literal::hex!("10 00 42 FF");
        let desc = ContentDescriptor::read(&data).unwrap();
        assert_eq!(
            &*desc.genres,
            &[
                ContentGenre {
                    content_nibble_level_1: 1,
                    content_nibble_level_2: 0,
                    user_byte: 0,
                },
                ContentGenre {
                    content_nibble_level_1: 4,
                    content_nibble_level_2: 2,
                    user_byte: 0xFF,
                },
            ]
        );

        assert_matches!(
            ContentDescriptor::read(&data[..3]),
            Err(ReadError::MalformedLength)
        );
    }

    #[test]
    fn test_parental_rating() {
        let data = hex_literal::hex!("47 42 52 09 46 52 41 00");
        let desc = ParentalRatingDescriptor::read(&data).unwrap();
        assert_eq!(desc.ratings.len(), 2);
        assert_eq!(desc.ratings[0].country_code, CountryCode(*b"GBR"));
        assert_eq!(desc.ratings[0].minimum_age(), Some(12));
        assert_eq!(desc.ratings[1].minimum_age(), None);

        // 4の倍数でない長さは読まない
        assert_matches!(
            ParentalRatingDescriptor::read(&data[..5]),
            Err(ReadError::MalformedLength)
        );
    }

    #[test]
    fn test_time_shifted_event() {
        let desc = TimeShiftedEventDescriptor::read(&[0x12, 0x34, 0x56, 0x78]).unwrap();
        assert_eq!(desc.reference_service_id, 0x1234);
        assert_eq!(desc.reference_event_id, 0x5678);

        assert_matches!(
            TimeShiftedEventDescriptor::read(&[0x12, 0x34, 0x56]),
            Err(ReadError::Truncated)
        );
    }

    #[test]
    fn test_short_smoothing_buffer() {
        let desc = ShortSmoothingBufferDescriptor::read(&[0x4A, 0xFF]).unwrap();
        assert_eq!(desc.sb_size, 1);
        assert_eq!(desc.sb_leak_rate, 10);
        assert_eq!(desc.reserved, &[0xFF]);
        assert_eq!(desc.size_bytes(), Some(1536));
        assert_eq!(desc.leak_rate_mbps(), Some(0.5));

        assert_matches!(
            ShortSmoothingBufferDescriptor::read(&[]),
            Err(ReadError::Truncated)
        );
    }

    #[test]
    fn test_pdc() {
        // 15日 3月 20:30
        let pil = (15 << 15) | (3 << 11) | (20 << 6) | 30;
        let data = [0xF0 | (pil >> 16) as u8, (pil >> 8) as u8, pil as u8];
        let desc = PdcDescriptor::read(&data).unwrap();
        let pil = desc.programme_identification_label;
        assert_eq!(pil.day(), 15);
        assert_eq!(pil.month(), 3);
        assert_eq!(pil.hour(), 20);
        assert_eq!(pil.minute(), 30);

        assert_matches!(PdcDescriptor::read(&data[..2]), Err(ReadError::Truncated));
    }

    #[test]
    fn test_multilingual_component() {
        let data = hex_literal::hex!("03 65 6E 67 02 48 44 64 65 75 00");
        let desc = MultilingualComponentDescriptor::read(&data).unwrap();
        assert_eq!(desc.component_tag, 3);
        assert_eq!(desc.components.len(), 2);
        assert_eq!(desc.components[0].lang_code, LangCode::ENG);
        assert_eq!(desc.components[0].text, b"HD");
        assert_eq!(desc.components[1].lang_code, LangCode::DEU);
        assert!(desc.components[1].text.is_empty());

        assert_matches!(
            MultilingualComponentDescriptor::read(&data[..6]),
            Err(ReadError::Truncated)
        );
    }
}
