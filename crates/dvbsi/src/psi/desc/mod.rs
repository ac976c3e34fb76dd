//! 記述子の定義。
//!
//! 対応する記述子はタグごとに[`AnyDescriptor`]の列挙子として表現され、
//! [`parser_for`]でタグから読み取り関数を引く。

mod base;
mod event;
mod linkage;
mod service;

pub use base::*;
pub use event::*;
pub use linkage::*;
pub use service::*;

use crate::cursor::ReadError;

/// 対応する全ての記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnyDescriptor<'a> {
    /// スタッフ記述子。
    Stuffing(StuffingDescriptor<'a>),
    /// サービス記述子。
    Service(ServiceDescriptor<'a>),
    /// リンク記述子。
    Linkage(LinkageDescriptor<'a>),
    /// 短形式イベント記述子。
    ShortEvent(ShortEventDescriptor<'a>),
    /// 拡張形式イベント記述子。
    ExtendedEvent(ExtendedEventDescriptor<'a>),
    /// タイムシフトイベント記述子。
    TimeShiftedEvent(TimeShiftedEventDescriptor),
    /// コンポーネント記述子。
    Component(ComponentDescriptor<'a>),
    /// CA識別記述子。
    CaIdentifier(CaIdentifierDescriptor),
    /// コンテント記述子。
    Content(ContentDescriptor),
    /// パレンタルレート記述子。
    ParentalRating(ParentalRatingDescriptor),
    /// 電話記述子。
    Telephone(TelephoneDescriptor),
    /// 多言語コンポーネント記述子。
    MultilingualComponent(MultilingualComponentDescriptor<'a>),
    /// プライベートデータ指定子記述子。
    PrivateDataSpecifier(PrivateDataSpecifierDescriptor),
    /// 短形式スムージングバッファ記述子。
    ShortSmoothingBuffer(ShortSmoothingBufferDescriptor<'a>),
    /// データ放送記述子。
    DataBroadcast(DataBroadcastDescriptor<'a>),
    /// PDC記述子。
    Pdc(PdcDescriptor),
    /// 対応していない記述子。タグだけを保持する。
    Unsupported(u8),
}

/// 記述子の本体を読み取る関数。
pub type ParserFn = for<'a> fn(&'a [u8]) -> Result<AnyDescriptor<'a>, ReadError>;

macro_rules! registry {
    ($($tag:literal => $variant:ident($ty:ident),)*) => {
        /// `tag`に対応する読み取り関数を返す。
        ///
        /// 対応していないタグの場合は`None`を返す。
        pub fn parser_for(tag: u8) -> Option<ParserFn> {
            match tag {
                $(
                    $tag => {
                        fn read(data: &[u8]) -> Result<AnyDescriptor, ReadError> {
                            $ty::read(data).map(AnyDescriptor::$variant)
                        }
                        Some(read as ParserFn)
                    }
                )*
                _ => None,
            }
        }

        impl<'a> AnyDescriptor<'a> {
            /// 記述子のタグを返す。
            pub fn tag(&self) -> u8 {
                match self {
                    $(AnyDescriptor::$variant(_) => $tag,)*
                    AnyDescriptor::Unsupported(tag) => *tag,
                }
            }
        }
    };
}

registry! {
    0x42 => Stuffing(StuffingDescriptor),
    0x48 => Service(ServiceDescriptor),
    0x4A => Linkage(LinkageDescriptor),
    0x4D => ShortEvent(ShortEventDescriptor),
    0x4E => ExtendedEvent(ExtendedEventDescriptor),
    0x4F => TimeShiftedEvent(TimeShiftedEventDescriptor),
    0x50 => Component(ComponentDescriptor),
    0x53 => CaIdentifier(CaIdentifierDescriptor),
    0x54 => Content(ContentDescriptor),
    0x55 => ParentalRating(ParentalRatingDescriptor),
    0x57 => Telephone(TelephoneDescriptor),
    0x5E => MultilingualComponent(MultilingualComponentDescriptor),
    0x5F => PrivateDataSpecifier(PrivateDataSpecifierDescriptor),
    0x61 => ShortSmoothingBuffer(ShortSmoothingBufferDescriptor),
    0x64 => DataBroadcast(DataBroadcastDescriptor),
    0x69 => Pdc(PdcDescriptor),
}

impl<'a> AnyDescriptor<'a> {
    /// `raw`をタグに応じた記述子として読み取る。
    ///
    /// 対応していないタグの場合は[`AnyDescriptor::Unsupported`]を返す。
    pub fn read(raw: RawDescriptor<'a>) -> Result<AnyDescriptor<'a>, ReadError> {
        match parser_for(raw.tag) {
            Some(read) => read(raw.data),
            None => Ok(AnyDescriptor::Unsupported(raw.tag)),
        }
    }
}

impl<'a> DescriptorBlock<'a> {
    /// 内包する記述子群をすべて[`AnyDescriptor`]として読み取る。
    pub fn parse_all(&self) -> impl Iterator<Item = Result<AnyDescriptor<'a>, ReadError>> + 'a {
        self.iter().map(AnyDescriptor::read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn check_tag<'a, T: Descriptor<'a>>(data: &'a [u8]) {
        let desc = AnyDescriptor::read(RawDescriptor { tag: T::TAG, data });
        assert_eq!(desc.map(|d| d.tag()), Ok(T::TAG));
    }

    #[test]
    fn test_registry_tags() {
        check_tag::<StuffingDescriptor>(&[]);
        check_tag::<ServiceDescriptor>(&[0x01, 0x00, 0x00]);
        check_tag::<LinkageDescriptor>(&[0, 0, 0, 0, 0, 0, 0x01]);
        check_tag::<ShortEventDescriptor>(b"eng\x00\x00");
        check_tag::<ExtendedEventDescriptor>(b"\x00eng\x00\x00");
        check_tag::<TimeShiftedEventDescriptor>(&[0, 1, 0, 2]);
        check_tag::<ComponentDescriptor>(b"\x01\x01\x00eng");
        check_tag::<CaIdentifierDescriptor>(&[0x01, 0x00]);
        check_tag::<ContentDescriptor>(&[0x10, 0x00]);
        check_tag::<ParentalRatingDescriptor>(b"GBR\x01");
        check_tag::<TelephoneDescriptor>(&[0x00, 0x00, 0x00]);
        check_tag::<MultilingualComponentDescriptor>(&[0x01]);
        check_tag::<PrivateDataSpecifierDescriptor>(&[0, 0, 0, 0x28]);
        check_tag::<ShortSmoothingBufferDescriptor>(&[0x41]);
        check_tag::<DataBroadcastDescriptor>(b"\x00\x05\x00\x00eng\x00");
        check_tag::<PdcDescriptor>(&[0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_unsupported() {
        assert!(parser_for(0x40).is_none());
        assert_eq!(
            AnyDescriptor::read(RawDescriptor {
                tag: 0x40,
                data: b"network",
            }),
            Ok(AnyDescriptor::Unsupported(0x40))
        );
    }

    #[test]
    fn test_parse_all() {
        let data = hex_literal::hex!(
            "
            40 02 41 42
            55 05 47 42 52 09 00
            4F 03 00 01 00
            50 08 15 05 00 65 6E 67 48 44
            "
        );
        let block = DescriptorBlock::new(&data);
        let mut iter = block.parse_all();
        assert_matches!(iter.next(), Some(Ok(AnyDescriptor::Unsupported(0x40))));
        assert_matches!(iter.next(), Some(Err(ReadError::MalformedLength)));
        assert_matches!(iter.next(), Some(Err(ReadError::Truncated)));
        assert_matches!(
            iter.next(),
            Some(Ok(AnyDescriptor::Component(ComponentDescriptor {
                stream_content_ext: 1,
                stream_content: 5,
                component_type: 5,
                component_tag: 0,
                ..
            })))
        );
        assert_matches!(iter.next(), None);

        assert_eq!(
            block.get::<ComponentDescriptor>().map(|d| d.text.as_bytes()),
            Some(&b"HD"[..])
        );
        assert_eq!(block.get_all::<TimeShiftedEventDescriptor>().count(), 0);
    }
}
