use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::libs::dser::{deser_empty_to_none, serialize_null_to_default};

/// 客户跟进状态，存档、接口与 CSV 共用同一组取值
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum CustomerStatus {
    Interested,
    Meeting,
    ProposalSent,
    ClosedWon,
    ClosedLost,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Interested => "Interested",
            CustomerStatus::Meeting => "Meeting",
            CustomerStatus::ProposalSent => "ProposalSent",
            CustomerStatus::ClosedWon => "ClosedWon",
            CustomerStatus::ClosedLost => "ClosedLost",
        }
    }
    pub fn parse(value: &str) -> Option<CustomerStatus> {
        match value {
            "Interested" => Some(CustomerStatus::Interested),
            "Meeting" => Some(CustomerStatus::Meeting),
            "ProposalSent" => Some(CustomerStatus::ProposalSent),
            "ClosedWon" => Some(CustomerStatus::ClosedWon),
            "ClosedLost" => Some(CustomerStatus::ClosedLost),
            _ => None,
        }
    }
}

impl Default for CustomerStatus {
    /// 新建客户默认为有意向
    fn default() -> Self {
        CustomerStatus::Interested
    }
}

impl Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 互动方式
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
    Call,
    WhatsApp,
    Email,
}

impl InteractionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Call => "Call",
            InteractionType::WhatsApp => "WhatsApp",
            InteractionType::Email => "Email",
        }
    }
}

impl Display for InteractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 一条互动记录，新记录排在客户互动列表最前面
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub id: String,
    #[serde(rename = "type")]
    pub ty: InteractionType,
    pub notes: String,
    /// 记录时刻，ISO8601 文本
    pub date: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub company: String,
    #[serde(
        default,
        deserialize_with = "deser_empty_to_none",
        serialize_with = "serialize_null_to_default"
    )]
    pub address: Option<String>,
    #[serde(
        default,
        deserialize_with = "deser_empty_to_none",
        serialize_with = "serialize_null_to_default"
    )]
    pub city: Option<String>,
    #[serde(
        default,
        deserialize_with = "deser_empty_to_none",
        serialize_with = "serialize_null_to_default"
    )]
    pub linkedin: Option<String>,
    pub status: CustomerStatus,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    /// 跟进日期，YYYY-MM-DD
    #[serde(
        rename = "followUpDate",
        default,
        deserialize_with = "deser_empty_to_none",
        serialize_with = "serialize_null_to_default"
    )]
    pub follow_up_date: Option<String>,
    /// 跟进时刻，HH:MM
    #[serde(
        rename = "followUpTime",
        default,
        deserialize_with = "deser_empty_to_none",
        serialize_with = "serialize_null_to_default"
    )]
    pub follow_up_time: Option<String>,
}

impl Customer {
    /// 跟进时刻只有在跟进日期存在时才有意义
    pub fn normalize(&mut self) {
        if self.follow_up_date.is_none() {
            self.follow_up_time = None;
        }
    }
    /// 跟进日期解析成日历天，无法解析视为没有跟进安排
    pub fn follow_up_day(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.follow_up_date.as_deref()?, "%Y-%m-%d").ok()
    }
    /// 跟进日期加跟进时刻拼成完整时间点，没填时刻按当天零点算
    pub fn follow_up_instant(&self) -> Option<NaiveDateTime> {
        let date = self.follow_up_day()?;
        let time = self
            .follow_up_time
            .as_deref()
            .and_then(parse_clock)
            .unwrap_or(NaiveTime::MIN);
        Some(date.and_time(time))
    }
    /// 手机号去掉非数字字符后拼出 wa.me 链接
    pub fn whatsapp_link(&self) -> String {
        let digits: String = self.phone.chars().filter(|c| c.is_ascii_digit()).collect();
        format!("https://wa.me/{}", digits)
    }
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .ok()
        .or_else(|| NaiveTime::parse_from_str(value, "%H:%M:%S").ok())
}
