use regex::Regex;
use serde::{Deserialize, Deserializer, Serializer};

use crate::common::CustomerStatus;

use super::lazy::{HHMM_REGEX, YYYYMMDD_REGEX};

pub fn deser_empty_to_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Deserialize::deserialize(de)?;
    Ok(value.and_then(|s| if s.is_empty() { None } else { Some(s) }))
}

pub fn serialize_null_to_default<S>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(value) => serializer.serialize_str(value),
        _ => serializer.serialize_str(""),
    }
}

/// 可缺省的跟进日期，null 或空串视为未填写
pub fn op_deser_yyyy_mm_dd<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    op_regex_time(&YYYYMMDD_REGEX, de, "YYYY-MM-DD")
}

/// 可缺省的跟进时刻，null 或空串视为未填写
pub fn op_deser_hh_mm<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    op_regex_time(&HHMM_REGEX, de, "HH:MM")
}

fn op_regex_time<'de, D: Deserializer<'de>>(
    regex: &Regex,
    de: D,
    err: &str,
) -> Result<Option<String>, D::Error> {
    let Some::<String>(time) = Deserialize::deserialize(de).ok() else {
        return Ok(None);
    };
    if time.is_empty() {
        return Ok(None);
    }
    match regex.captures(&time).and_then(|c| c.get(0)) {
        Some(value) => Ok(Some(value.as_str().to_owned())),
        None => Err(serde::de::Error::custom(format!(
            "Invalid Time Format. 时间格式应当为'{err}'"
        ))),
    }
}

/// 状态筛选条件，空串表示不筛选
pub fn deser_status_filter<'de, D>(de: D) -> Result<Option<CustomerStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some::<String>(value) = Deserialize::deserialize(de).ok() else {
        return Ok(None);
    };
    if value.is_empty() {
        return Ok(None);
    }
    match CustomerStatus::parse(&value) {
        Some(status) => Ok(Some(status)),
        None => Err(serde::de::Error::custom(format!(
            "状态`{value}`不在取值范围内"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Deserialize, Debug)]
    struct Params {
        #[serde(default, deserialize_with = "op_deser_yyyy_mm_dd")]
        date: Option<String>,
        #[serde(default, deserialize_with = "op_deser_hh_mm")]
        time: Option<String>,
        #[serde(default, deserialize_with = "deser_status_filter")]
        status: Option<CustomerStatus>,
    }

    #[test]
    fn test_optional_date_and_time() {
        let params: Params =
            serde_json::from_value(json!({"date": "2024-03-01", "time": "09:30"})).unwrap();
        assert_eq!(params.date.as_deref(), Some("2024-03-01"));
        assert_eq!(params.time.as_deref(), Some("09:30"));

        let params: Params =
            serde_json::from_value(json!({"date": "", "time": null, "status": ""})).unwrap();
        assert_eq!(params.date, None);
        assert_eq!(params.time, None);
        assert_eq!(params.status, None);

        let params: Params = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params.date, None);
        assert_eq!(params.time, None);
    }

    #[test]
    fn test_malformed_date_rejected() {
        assert!(serde_json::from_value::<Params>(json!({"date": "03/01/2024"})).is_err());
        assert!(serde_json::from_value::<Params>(json!({"time": "非时间"})).is_err());
    }

    #[test]
    fn test_status_filter() {
        let params: Params = serde_json::from_value(json!({"status": "Meeting"})).unwrap();
        assert_eq!(params.status, Some(CustomerStatus::Meeting));
        assert!(serde_json::from_value::<Params>(json!({"status": "等待"})).is_err());
    }
}
