use std::time::{SystemTime, SystemTimeError};

use chrono::prelude::{Local, NaiveDateTime, TimeZone, Utc};
use chrono::SecondsFormat;

/// 时间格式化类型
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// 年-月-日, YYYY-MM-DD
    YYYYMMDD,
    /// 年-月-日 时:分:秒, YYYY-MM-DD HH:MM:SS
    YYYYMMDD_HHMMSS,
    /// UTC 即时时间，如 2024-03-01T06:30:00.000Z
    ISO8601,
}

/// 时间格式化
#[derive(Debug, Default, Clone)]
pub struct TIME {
    naos: u128,
}

impl TIME {
    /// 获取当前的时间
    pub fn now() -> Result<Self, SystemTimeError> {
        let time = SystemTime::now();
        let naos = time.duration_since(SystemTime::UNIX_EPOCH)?.as_nanos();
        Ok(Self { naos })
    }
    pub fn format(&self, fmt: TimeFormat) -> String {
        let local = Local.timestamp_nanos(self.naos as i64);
        match fmt {
            TimeFormat::YYYYMMDD => local.format("%Y-%m-%d").to_string(),
            TimeFormat::YYYYMMDD_HHMMSS => local.format("%Y-%m-%d %H:%M:%S").to_string(),
            TimeFormat::ISO8601 => local
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
    pub fn naos(&self) -> u128 {
        self.naos
    }
    /// 本地挂钟时间，交给跟进分类和排序做比较
    pub fn naive(&self) -> NaiveDateTime {
        Local.timestamp_nanos(self.naos as i64).naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_epoch() {
        let time = TIME { naos: 0 };
        assert_eq!(time.format(TimeFormat::ISO8601), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_now_formats() {
        let time = TIME::now().unwrap();
        let date = time.format(TimeFormat::YYYYMMDD);
        let stamp = time.format(TimeFormat::YYYYMMDD_HHMMSS);
        assert_eq!(date.len(), 10);
        assert_eq!(stamp.len(), 19);
        assert!(stamp.starts_with(&date));
        assert!(time.format(TimeFormat::ISO8601).ends_with('Z'));
    }
}
