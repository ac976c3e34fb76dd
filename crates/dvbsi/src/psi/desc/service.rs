//! サービスや事業者に関する記述子の定義。

use arrayvec::ArrayVec;
use smallvec::SmallVec;

use crate::cursor::{ByteCursor, ReadError};
use crate::lang::LangCode;
use crate::text::DvbStr;

use super::base::Descriptor;

/// サービス記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor<'a> {
    /// サービス形式種別。
    pub service_type: u8,
    /// 事業者名。
    pub service_provider_name: &'a DvbStr,
    /// サービス名。
    pub service_name: &'a DvbStr,
}

impl<'a> Descriptor<'a> for ServiceDescriptor<'a> {
    const TAG: u8 = 0x48;

    fn read(data: &'a [u8]) -> Result<ServiceDescriptor<'a>, ReadError> {
        let mut cur = ByteCursor::new(data);
        let Ok(service_type) = cur.read_u8() else {
            log::debug!("invalid ServiceDescriptor");
            return Err(ReadError::Truncated);
        };
        let Ok(service_provider_name) = cur.read_len_prefixed() else {
            log::debug!("invalid ServiceDescriptor::service_provider_name");
            return Err(ReadError::Truncated);
        };
        let Ok(service_name) = cur.read_len_prefixed() else {
            log::debug!("invalid ServiceDescriptor::service_name");
            return Err(ReadError::Truncated);
        };

        Ok(ServiceDescriptor {
            service_type,
            service_provider_name: DvbStr::from_bytes(service_provider_name),
            service_name: DvbStr::from_bytes(service_name),
        })
    }
}

/// スタッフ記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuffingDescriptor<'a> {
    /// スタッフィングバイト。
    pub stuffing: &'a [u8],
}

impl<'a> Descriptor<'a> for StuffingDescriptor<'a> {
    const TAG: u8 = 0x42;

    #[inline]
    fn read(data: &'a [u8]) -> Result<StuffingDescriptor<'a>, ReadError> {
        Ok(StuffingDescriptor { stuffing: data })
    }
}

/// プライベートデータ指定子記述子。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrivateDataSpecifierDescriptor {
    /// プライベートデータ指定子。
    pub private_data_specifier: u32,
}

impl Descriptor<'_> for PrivateDataSpecifierDescriptor {
    const TAG: u8 = 0x5F;

    fn read(data: &[u8]) -> Result<PrivateDataSpecifierDescriptor, ReadError> {
        let Ok(private_data_specifier) = ByteCursor::new(data).read_u32() else {
            log::debug!("invalid PrivateDataSpecifierDescriptor");
            return Err(ReadError::Truncated);
        };

        Ok(PrivateDataSpecifierDescriptor {
            private_data_specifier,
        })
    }
}

/// CA識別記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaIdentifierDescriptor {
    /// 限定受信方式識別の一覧。
    pub ca_system_ids: SmallVec<[u16; 4]>,
}

impl Descriptor<'_> for CaIdentifierDescriptor {
    const TAG: u8 = 0x53;

    fn read(data: &[u8]) -> Result<CaIdentifierDescriptor, ReadError> {
        if data.len() % 2 != 0 {
            log::debug!("invalid CaIdentifierDescriptor::length");
            return Err(ReadError::MalformedLength);
        }

        let ca_system_ids = data
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        Ok(CaIdentifierDescriptor { ca_system_ids })
    }
}

/// 電話記述子。
///
/// 各番号の長さはビットフィールドで制限されるため、固定容量の配列に格納する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelephoneDescriptor {
    /// 海外からの利用可否。
    pub foreign_availability: bool,
    /// 接続種別（5ビット）。
    pub connection_type: u8,
    /// 国番号。
    pub country_prefix: ArrayVec<u8, 3>,
    /// 国際市外局番。
    pub international_area_code: ArrayVec<u8, 7>,
    /// 事業者番号。
    pub operator_code: ArrayVec<u8, 3>,
    /// 国内市外局番。
    pub national_area_code: ArrayVec<u8, 7>,
    /// 市内局番と加入者番号。
    pub core_number: ArrayVec<u8, 15>,
}

impl TelephoneDescriptor {
    fn read_number<const N: usize>(
        cur: &mut ByteCursor,
        len: u8,
    ) -> Result<ArrayVec<u8, N>, ReadError> {
        let bytes = cur.read_bytes(len as usize)?;
        ArrayVec::try_from(bytes).map_err(|_| ReadError::MalformedLength)
    }

    fn read_inner(data: &[u8]) -> Result<TelephoneDescriptor, ReadError> {
        let mut cur = ByteCursor::new(data);
        let [b0, b1, b2] = cur.read_array::<3>()?;

        let country_prefix_length = (b1 & 0b0110_0000) >> 5;
        let international_area_code_length = (b1 & 0b0001_1100) >> 2;
        let operator_code_length = b1 & 0b0000_0011;
        let national_area_code_length = (b2 & 0b0111_0000) >> 4;
        let core_number_length = b2 & 0b0000_1111;

        Ok(TelephoneDescriptor {
            foreign_availability: b0 & 0b0010_0000 != 0,
            connection_type: b0 & 0b0001_1111,
            country_prefix: Self::read_number(&mut cur, country_prefix_length)?,
            international_area_code: Self::read_number(&mut cur, international_area_code_length)?,
            operator_code: Self::read_number(&mut cur, operator_code_length)?,
            national_area_code: Self::read_number(&mut cur, national_area_code_length)?,
            core_number: Self::read_number(&mut cur, core_number_length)?,
        })
    }
}

impl Descriptor<'_> for TelephoneDescriptor {
    const TAG: u8 = 0x57;

    fn read(data: &[u8]) -> Result<TelephoneDescriptor, ReadError> {
        let desc = Self::read_inner(data);
        if desc.is_err() {
            log::debug!("invalid TelephoneDescriptor");
        }
        desc
    }
}

/// データ放送記述子。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBroadcastDescriptor<'a> {
    /// データ放送識別。
    pub data_broadcast_id: u16,
    /// コンポーネントタグ。
    pub component_tag: u8,
    /// セレクタ。
    pub selector: &'a [u8],
    /// 言語コード。
    pub lang_code: LangCode,
    /// データ放送記述。
    pub text: &'a DvbStr,
}

impl<'a> Descriptor<'a> for DataBroadcastDescriptor<'a> {
    const TAG: u8 = 0x64;

    fn read(data: &'a [u8]) -> Result<DataBroadcastDescriptor<'a>, ReadError> {
        let mut cur = ByteCursor::new(data);
        let (Ok(data_broadcast_id), Ok(component_tag)) = (cur.read_u16(), cur.read_u8()) else {
            log::debug!("invalid DataBroadcastDescriptor");
            return Err(ReadError::Truncated);
        };
        let Ok(selector) = cur.read_len_prefixed() else {
            log::debug!("invalid DataBroadcastDescriptor::selector");
            return Err(ReadError::Truncated);
        };
        let Ok(lang_code) = cur.read_array().map(LangCode) else {
            log::debug!("invalid DataBroadcastDescriptor::lang_code");
            return Err(ReadError::Truncated);
        };
        let Ok(text) = cur.read_len_prefixed() else {
            log::debug!("invalid DataBroadcastDescriptor::text");
            return Err(ReadError::Truncated);
        };

        Ok(DataBroadcastDescriptor {
            data_broadcast_id,
            component_tag,
            selector,
            lang_code,
            text: DvbStr::from_bytes(text),
        })
    }
}
