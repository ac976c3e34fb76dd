//! SIにおける日付時刻と継続時間。
//!
//! 日付は修正ユリウス日（MJD）、時刻と継続時間はBCDで符号化される。

use std::fmt::{self, Write};

use crate::utils::{read_bcd_digit, write_bcd_digit};

fn write_hundreds<W: Write>(w: &mut W, n: u8) -> fmt::Result {
    let h = b'0' + n / 10 % 10;
    let l = b'0' + n % 10;
    w.write_char(h as char)?;
    w.write_char(l as char)
}

/// 修正ユリウス日から変換された日付。
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MjdDate {
    /// 西暦年。
    pub year: u16,
    /// 月（1月＝1、12月＝12）。
    pub month: u8,
    /// 日（1～31）。
    pub day: u8,
    /// 曜日（月曜日＝1、日曜日＝7）。
    pub day_of_week: u8,
}

impl MjdDate {
    /// 修正ユリウス日の値から`MjdDate`を生成する。
    ///
    /// 1900年3月1日から2100年2月28日の範囲で正しい値となる。
    pub fn from_mjd(mjd: u16) -> MjdDate {
        let mjd_f = mjd as f64;
        let yd = ((mjd_f - 15078.2) / 365.25) as i32;
        let yd_days = (yd as f64 * 365.25) as i32;
        let md = ((mjd_f - 14956.1 - yd_days as f64) / 30.6001) as i32;
        let md_days = (md as f64 * 30.6001) as i32;

        let day = mjd as i32 - 14956 - yd_days - md_days;
        let day_of_week = ((mjd as u32 + 2) % 7 + 1) as u8;
        let (year, month) = if md == 14 || md == 15 {
            (yd + 1, md - 1 - 12)
        } else {
            (yd, md - 1)
        };

        MjdDate {
            year: (1900 + year) as u16,
            month: month as u8,
            day: day as u8,
            day_of_week,
        }
    }

    /// `data`から`MjdDate`を読み取る。
    #[inline]
    pub fn read(data: &[u8; 2]) -> MjdDate {
        MjdDate::from_mjd(u16::from_be_bytes(*data))
    }
}

impl fmt::Debug for MjdDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;

        f.write_char('-')?;
        write_hundreds(f, self.month)?;

        f.write_char('-')?;
        write_hundreds(f, self.day)
    }
}

impl fmt::Display for MjdDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 修正ユリウス日とUTCの時刻からなる日付時刻。
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    /// 修正ユリウス日。
    pub date: MjdDate,
    /// 時（0～23）。
    pub hour: u8,
    /// 分（0～59）。
    pub minute: u8,
    /// 秒（0～60）。
    pub second: u8,
}

impl DateTime {
    /// `data`から`DateTime`を読み取る。
    pub fn read(data: &[u8; 5]) -> DateTime {
        let [mjd_hi, mjd_lo, hour, minute, second] = *data;

        DateTime {
            date: MjdDate::read(&[mjd_hi, mjd_lo]),
            hour: read_bcd_digit(hour),
            minute: read_bcd_digit(minute),
            second: read_bcd_digit(second),
        }
    }

    /// 全ビットが1の、未定義を表す開始時間かどうかを返す。
    #[inline]
    pub fn is_undefined(data: &[u8; 5]) -> bool {
        *data == [0xFF; 5]
    }
}

impl fmt::Debug for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&self.date, f)?;
        f.write_char(' ')?;

        write_hundreds(f, self.hour)?;
        f.write_char(':')?;
        write_hundreds(f, self.minute)?;
        f.write_char(':')?;
        write_hundreds(f, self.second)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// BCDで符号化された時分秒の継続時間を秒数に変換する。
#[inline]
pub fn read_bcd_duration(data: &[u8; 3]) -> u32 {
    let hour = read_bcd_digit(data[0]) as u32;
    let minute = read_bcd_digit(data[1]) as u32;
    let second = read_bcd_digit(data[2]) as u32;
    hour * 3600 + minute * 60 + second
}

/// 秒数をBCDで符号化された時分秒の継続時間に変換する。
///
/// 99時間59分59秒を超える場合は`None`を返す。
pub fn write_bcd_duration(seconds: u32) -> Option<[u8; 3]> {
    let hour = seconds / 3600;
    if hour > 99 {
        return None;
    }
    let minute = seconds / 60 % 60;
    let second = seconds % 60;

    Some([
        write_bcd_digit(hour as u8),
        write_bcd_digit(minute as u8),
        write_bcd_digit(second as u8),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_time() {
        // MJD = 49273
        let date = MjdDate::read(&[0xC0, 0x79]);
        assert_eq!(date.year, 1993);
        assert_eq!(date.month, 10);
        assert_eq!(date.day, 13);
        assert_eq!(date.day_of_week, 3);
        assert_eq!(date.to_string(), "1993-10-13");

        let dt = DateTime::read(&[0xC0, 0x79, 0x01, 0x45, 0x30]);
        assert_eq!(dt.date, date);
        assert_eq!(dt.hour, 1);
        assert_eq!(dt.minute, 45);
        assert_eq!(dt.second, 30);
        assert_eq!(dt.to_string(), "1993-10-13 01:45:30");
    }

    #[test]
    fn test_mjd_against_chrono() {
        let epoch = chrono::NaiveDate::from_ymd_opt(1858, 11, 17).unwrap();
        // 1950-01-01から2038-04-22まで
        for mjd in (33282..=u16::MAX).step_by(97) {
            let expected = epoch + chrono::Duration::days(mjd as i64);
            let date = MjdDate::from_mjd(mjd);
            assert_eq!(
                date.to_string(),
                expected.format("%Y-%m-%d").to_string(),
                "mjd = {}",
                mjd
            );
        }
    }

    #[test]
    fn test_undefined_start_time() {
        assert!(DateTime::is_undefined(&[0xFF; 5]));
        assert!(!DateTime::is_undefined(&[0xC0, 0x79, 0x01, 0x45, 0x30]));
    }

    #[test]
    fn test_bcd_duration() {
        assert_eq!(read_bcd_duration(&[0x01, 0x45, 0x30]), 6330);
        assert_eq!(write_bcd_duration(6330), Some([0x01, 0x45, 0x30]));
        assert_eq!(write_bcd_duration(100 * 3600), None);

        for data in [[0x00, 0x00, 0x00], [0x99, 0x59, 0x59], [0x12, 0x07, 0x41]] {
            assert_eq!(write_bcd_duration(read_bcd_duration(&data)), Some(data));
        }
    }
}
