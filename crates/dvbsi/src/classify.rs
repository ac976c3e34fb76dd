//! 記述子の値を分類するための表と、外部から与える分類表のトレイト。

/// コンポーネントやジャンルを文字列に変換する分類表。
pub trait ClassificationLookup {
    /// コンポーネント内容と種別に対応する説明を返す。
    fn component(&self, stream_content: u8, stream_content_ext: u8, component_type: u8)
        -> Option<&str>;

    /// ジャンルの大分類と中分類に対応する説明を返す。
    fn content(&self, nibble1: u8, nibble2: u8) -> Option<&str>;
}

/// EN 300 468の主要な項目だけを英語で返す分類表。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardLookup;

impl ClassificationLookup for StandardLookup {
    fn component(
        &self,
        stream_content: u8,
        stream_content_ext: u8,
        component_type: u8,
    ) -> Option<&str> {
        let text = match (stream_content, stream_content_ext, component_type) {
            (0x1, 0xF, 0x01) => "MPEG-2 video, 4:3 aspect ratio, 25 Hz",
            (0x1, 0xF, 0x03) => "MPEG-2 video, 16:9 aspect ratio without pan vectors, 25 Hz",
            (0x1, 0xF, 0x04) => "MPEG-2 video, > 16:9 aspect ratio, 25 Hz",
            (0x1, 0xF, 0x09) => "MPEG-2 high definition video, 4:3 aspect ratio, 25 Hz",
            (0x1, 0xF, 0x0B) => "MPEG-2 high definition video, 16:9 aspect ratio, 25 Hz",
            (0x2, 0xF, 0x01) => "MPEG-1 Layer 2 audio, single mono channel",
            (0x2, 0xF, 0x03) => "MPEG-1 Layer 2 audio, stereo (2 channel)",
            (0x3, 0xF, 0x01) => "EBU Teletext subtitles",
            (0x3, 0xF, 0x10) => "DVB subtitles (normal) with no monitor aspect ratio criticality",
            (0x3, 0xF, 0x20) => "DVB subtitles (for the hard of hearing) with no monitor aspect ratio criticality",
            (0x4, _, _) => "AC-3 audio",
            (0x5, 0xF, 0x01) => "H.264/AVC standard definition video, 4:3 aspect ratio, 25 Hz",
            (0x5, 0xF, 0x03) => "H.264/AVC standard definition video, 16:9 aspect ratio, 25 Hz",
            (0x5, 0xF, 0x0B) => "H.264/AVC high definition video, 16:9 aspect ratio, 25 Hz",
            (0x6, 0xF, 0x01) => "HE AAC audio, single mono channel",
            (0x6, 0xF, 0x03) => "HE AAC audio, stereo",
            (0x6, 0xF, 0x05) => "HE AAC audio, surround sound",
            (0x7, _, _) => "DTS audio",
            (0x9, 0x0, 0x00) => "HEVC Main Profile high definition video, 50 Hz",
            (0x9, 0x0, 0x02) => "HEVC Main 10 Profile HDR video, 50 Hz",
            _ => return None,
        };
        Some(text)
    }

    fn content(&self, nibble1: u8, nibble2: u8) -> Option<&str> {
        let text = match (nibble1, nibble2) {
            (0x1, 0x0) => "movie/drama (general)",
            (0x1, 0x1) => "detective/thriller",
            (0x1, 0x2) => "adventure/western/war",
            (0x1, 0x3) => "science fiction/fantasy/horror",
            (0x1, 0x4) => "comedy",
            (0x1, _) => "movie/drama",
            (0x2, 0x0) => "news/current affairs (general)",
            (0x2, 0x1) => "news/weather report",
            (0x2, _) => "news/current affairs",
            (0x3, _) => "show/game show",
            (0x4, 0x0) => "sports (general)",
            (0x4, 0x3) => "football/soccer",
            (0x4, _) => "sports",
            (0x5, _) => "children's/youth programmes",
            (0x6, _) => "music/ballet/dance",
            (0x7, _) => "arts/culture (without music)",
            (0x8, _) => "social/political issues/economics",
            (0x9, _) => "education/science/factual topics",
            (0xA, _) => "leisure hobbies",
            (0xB, _) => "special characteristics",
            (0xF, _) => "user defined",
            _ => return None,
        };
        Some(text)
    }
}

/// パレンタルレーティングから視聴可能な最低年齢を返す。
///
/// `0x01`～`0x0F`は「レーティング+3歳以上」を表す。それ以外は未定義か事業者定義。
#[inline]
pub fn minimum_age(rating: u8) -> Option<u8> {
    match rating {
        0x01..=0x0F => Some(rating + 3),
        _ => None,
    }
}

/// 短形式スムージングバッファ記述子のバッファサイズをバイト数で返す。
#[inline]
pub fn smoothing_buffer_size(sb_size: u8) -> Option<u32> {
    match sb_size {
        1 => Some(1536),
        _ => None,
    }
}

/// リークレートの表（Mbit/s）。0と61～63は予約。
const LEAK_RATES: [f32; 64] = [
    0.0, 0.0009, 0.0018, 0.0036, 0.0072, 0.0108, 0.0144, 0.0216, //
    0.0288, 0.075, 0.5, 0.5625, 0.8437, 1.0, 1.125, 1.5, //
    1.6875, 2.0, 2.25, 2.5, 3.0, 3.375, 3.5, 4.0, //
    4.5, 5.0, 5.5, 6.0, 6.5, 6.75, 7.0, 7.5, //
    8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 13.5, 14.0, //
    15.0, 16.0, 17.0, 18.0, 20.0, 22.0, 24.0, 26.0, //
    27.0, 28.0, 30.0, 32.0, 34.0, 36.0, 38.0, 40.0, //
    44.0, 48.0, 54.0, 72.0, 108.0, 0.0, 0.0, 0.0, //
];

/// 短形式スムージングバッファ記述子のリークレートをMbit/sで返す。
#[inline]
pub fn smoothing_buffer_leak_rate(sb_leak_rate: u8) -> Option<f32> {
    match sb_leak_rate {
        1..=60 => Some(LEAK_RATES[sb_leak_rate as usize]),
        _ => None,
    }
}
