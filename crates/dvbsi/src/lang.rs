//! 記述子で使用される言語コードと国コード。

use std::fmt;

/// ISO 639-2で規定される3文字の言語コード。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LangCode(pub [u8; 3]);

impl LangCode {
    /// 英語。
    pub const ENG: LangCode = LangCode(*b"eng");
    /// ドイツ語。
    pub const DEU: LangCode = LangCode(*b"deu");
    /// ドイツ語（書誌コード）。
    pub const GER: LangCode = LangCode(*b"ger");
    /// フランス語。
    pub const FRA: LangCode = LangCode(*b"fra");
    /// フランス語（書誌コード）。
    pub const FRE: LangCode = LangCode(*b"fre");
    /// イタリア語。
    pub const ITA: LangCode = LangCode(*b"ita");
    /// スペイン語。
    pub const SPA: LangCode = LangCode(*b"spa");
    /// 音声解説などで使われる原語。
    pub const QAA: LangCode = LangCode(*b"qaa");
    /// 複数言語。
    pub const MUL: LangCode = LangCode(*b"mul");
    /// 言語なし。
    pub const ZXX: LangCode = LangCode(*b"zxx");
}

impl fmt::Display for LangCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0.escape_ascii(), f)
    }
}

/// ISO 3166で規定される3文字の国コード。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CountryCode(pub [u8; 3]);

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0.escape_ascii(), f)
    }
}
