//! リンク記述子の定義。
//!
//! リンク種別ごとに本体の構造が異なるため、種別ごとの列挙子として表現する。

use smallvec::SmallVec;

use crate::cursor::{ByteCursor, ReadError};

use super::base::Descriptor;

/// リンク種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkageType(pub u8);

impl LinkageType {
    /// 情報サービス。
    pub const INFORMATION_SERVICE: LinkageType = LinkageType(0x01);
    /// EPGサービス。
    pub const EPG_SERVICE: LinkageType = LinkageType(0x02);
    /// CA代替サービス。
    pub const CA_REPLACEMENT_SERVICE: LinkageType = LinkageType(0x03);
    /// 完全なネットワーク／ブーケSIを含むTS。
    pub const TS_CONTAINING_COMPLETE_SI: LinkageType = LinkageType(0x04);
    /// サービス代替サービス。
    pub const SERVICE_REPLACEMENT_SERVICE: LinkageType = LinkageType(0x05);
    /// データ放送サービス。
    pub const DATA_BROADCAST_SERVICE: LinkageType = LinkageType(0x06);
    /// RCSマップ。
    pub const RCS_MAP: LinkageType = LinkageType(0x07);
    /// モバイルハンドオーバー。
    pub const MOBILE_HAND_OVER: LinkageType = LinkageType(0x08);
    /// システムソフトウェア更新サービス。
    pub const SYSTEM_SOFTWARE_UPDATE_SERVICE: LinkageType = LinkageType(0x09);
    /// SSU BATまたはNITを含むTS。
    pub const TS_CONTAINING_SSU: LinkageType = LinkageType(0x0A);
    /// IP/MACの通知サービス。
    pub const IP_MAC_NOTIFICATION_SERVICE: LinkageType = LinkageType(0x0B);
    /// INT BATまたはNITを含むTS。
    pub const TS_CONTAINING_INT: LinkageType = LinkageType(0x0C);
    /// イベントリンク。
    pub const EVENT_LINKAGE: LinkageType = LinkageType(0x0D);

    /// 拡張イベントリンクかどうかを返す。
    #[inline]
    pub fn is_extended_event(&self) -> bool {
        matches!(self.0, 0x0E..=0x1F)
    }
}

/// モバイルハンドオーバーの種別ごとの情報。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandOver {
    /// 同一サービスを放送する隣接国へのハンドオーバー。
    Identical {
        /// 移行先のネットワーク識別。
        network_id: u16,
    },
    /// 地域の差し替えサービスへのハンドオーバー。
    LocalVariation {
        /// 移行先のネットワーク識別。
        network_id: u16,
    },
    /// 関連サービスへのハンドオーバー。
    Associated {
        /// 移行先のネットワーク識別。
        network_id: u16,
    },
    /// 予約。
    Reserved(u8),
}

/// モバイルハンドオーバーのリンク情報。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MobileHandOverLinkage {
    /// ハンドオーバー種別。
    pub hand_over: HandOver,
    /// NITから発生したリンクであれば`None`、SDTからであれば初期サービス識別。
    pub initial_service_id: Option<u16>,
}

/// イベントリンクの情報。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventLinkage {
    /// 参照先のイベント識別。
    pub target_event_id: u16,
    /// 参照先がEITで伝送されているかどうか。
    pub target_listed: bool,
    /// サイマルキャストかどうか。
    pub event_simulcast: bool,
}

/// 拡張イベントリンクにおける参照先の識別方法。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtendedEventTarget {
    /// トランスポートストリーム識別などで識別する。
    Ids {
        /// `target_id_type`（0～2）。
        target_id_type: u8,
        /// `target_id_type`に応じたトランスポートストリーム識別など。
        id: u16,
        /// 参照先のオリジナルネットワーク識別。
        original_network_id: Option<u16>,
        /// 参照先のサービス識別。
        service_id: Option<u16>,
    },
    /// 事業者定義の識別。
    UserDefined(u16),
}

/// 拡張イベントリンクにおける個々の参照先。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtendedEventLinkageInfo {
    /// 参照先のイベント識別。
    pub target_event_id: u16,
    /// 参照先がEITで伝送されているかどうか。
    pub target_listed: bool,
    /// サイマルキャストかどうか。
    pub event_simulcast: bool,
    /// リンク種別（2ビット）。
    pub link_type: u8,
    /// 参照先の識別。
    pub target: ExtendedEventTarget,
}

impl ExtendedEventLinkageInfo {
    fn read(cur: &mut ByteCursor) -> Result<ExtendedEventLinkageInfo, ReadError> {
        let target_event_id = cur.read_u16()?;
        let flags = cur.read_u8()?;
        let id = cur.read_u16()?;

        let target_id_type = (flags & 0b0000_1100) >> 2;
        let target = if target_id_type == 3 {
            ExtendedEventTarget::UserDefined(id)
        } else {
            let original_network_id = if flags & 0b0000_0010 != 0 {
                Some(cur.read_u16()?)
            } else {
                None
            };
            let service_id = if flags & 0b0000_0001 != 0 {
                Some(cur.read_u16()?)
            } else {
                None
            };
            ExtendedEventTarget::Ids {
                target_id_type,
                id,
                original_network_id,
                service_id,
            }
        };

        Ok(ExtendedEventLinkageInfo {
            target_event_id,
            target_listed: flags & 0b1000_0000 != 0,
            event_simulcast: flags & 0b0100_0000 != 0,
            link_type: (flags & 0b0011_0000) >> 4,
            target,
        })
    }
}

/// リンク種別に応じた本体。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Linkage {
    /// モバイルハンドオーバー（`0x08`）。
    MobileHandOver(MobileHandOverLinkage),
    /// イベントリンク（`0x0D`）。
    Event(EventLinkage),
    /// 拡張イベントリンク（`0x0E`～`0x1F`）。
    ExtendedEvent(SmallVec<[ExtendedEventLinkageInfo; 2]>),
    /// 本体を持たないその他のリンク。
    Other,
}

/// リンク記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkageDescriptor<'a> {
    /// トランスポートストリーム識別。
    pub transport_stream_id: u16,
    /// オリジナルネットワーク識別。
    pub original_network_id: u16,
    /// サービス識別。
    pub service_id: u16,
    /// リンク種別。
    pub linkage_type: LinkageType,
    /// リンク種別に応じた本体。
    pub linkage: Linkage,
    /// プライベートデータ。
    pub private_data: &'a [u8],
}

impl<'a> LinkageDescriptor<'a> {
    fn read_mobile_hand_over(cur: &mut ByteCursor) -> Result<MobileHandOverLinkage, ReadError> {
        let b = cur.read_u8()?;
        let hand_over_type = b >> 4;
        let origin_type = b & 0b0000_0001;

        let hand_over = match hand_over_type {
            0x01 => HandOver::Identical {
                network_id: cur.read_u16()?,
            },
            0x02 => HandOver::LocalVariation {
                network_id: cur.read_u16()?,
            },
            0x03 => HandOver::Associated {
                network_id: cur.read_u16()?,
            },
            t => HandOver::Reserved(t),
        };
        let initial_service_id = if origin_type == 0 {
            Some(cur.read_u16()?)
        } else {
            None
        };

        Ok(MobileHandOverLinkage {
            hand_over,
            initial_service_id,
        })
    }

    fn read_event(cur: &mut ByteCursor) -> Result<EventLinkage, ReadError> {
        let target_event_id = cur.read_u16()?;
        let flags = cur.read_u8()?;

        Ok(EventLinkage {
            target_event_id,
            target_listed: flags & 0b1000_0000 != 0,
            event_simulcast: flags & 0b0100_0000 != 0,
        })
    }

    fn read_extended_event(
        cur: &mut ByteCursor,
    ) -> Result<SmallVec<[ExtendedEventLinkageInfo; 2]>, ReadError> {
        let loop_length = cur.read_u8()? as usize;
        let mut sub = cur.sub_cursor(loop_length.min(cur.remaining()))?;

        let mut infos = SmallVec::new();
        while !sub.is_empty() {
            let Ok(info) = ExtendedEventLinkageInfo::read(&mut sub) else {
                log::debug!("invalid ExtendedEventLinkageInfo");
                break;
            };
            infos.push(info);
        }
        Ok(infos)
    }
}

impl<'a> Descriptor<'a> for LinkageDescriptor<'a> {
    const TAG: u8 = 0x4A;

    fn read(data: &'a [u8]) -> Result<LinkageDescriptor<'a>, ReadError> {
        let mut cur = ByteCursor::new(data);
        let (Ok(transport_stream_id), Ok(original_network_id), Ok(service_id), Ok(linkage_type)) =
            (cur.read_u16(), cur.read_u16(), cur.read_u16(), cur.read_u8())
        else {
            log::debug!("invalid LinkageDescriptor");
            return Err(ReadError::Truncated);
        };
        let linkage_type = LinkageType(linkage_type);

        let linkage = match linkage_type {
            LinkageType::MOBILE_HAND_OVER => {
                let Ok(linkage) = Self::read_mobile_hand_over(&mut cur) else {
                    log::debug!("invalid LinkageDescriptor::mobile_hand_over");
                    return Err(ReadError::Truncated);
                };
                Linkage::MobileHandOver(linkage)
            }
            LinkageType::EVENT_LINKAGE => {
                let Ok(linkage) = Self::read_event(&mut cur) else {
                    log::debug!("invalid LinkageDescriptor::event_linkage");
                    return Err(ReadError::Truncated);
                };
                Linkage::Event(linkage)
            }
            t if t.is_extended_event() => {
                let Ok(infos) = Self::read_extended_event(&mut cur) else {
                    log::debug!("invalid LinkageDescriptor::extended_event_linkage");
                    return Err(ReadError::Truncated);
                };
                Linkage::ExtendedEvent(infos)
            }
            _ => Linkage::Other,
        };

        Ok(LinkageDescriptor {
            transport_stream_id,
            original_network_id,
            service_id,
            linkage_type,
            linkage,
            private_data: cur.take_rest(),
        })
    }
}
