use axum::{routing::post, Router};
use chrono::NaiveDateTime;
use serde_json::json;

use crate::{
    common::Customer,
    database::get_db,
    libs::{TimeFormat, TIME},
    log, Response, ResponseResult,
};

pub fn reminder_router() -> Router {
    Router::new().route("/customer/reminder/data", post(query_reminders))
}

/// 跟进提醒分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reminder {
    /// 跟进时刻已经错过
    Overdue,
    /// 今天要跟进，时刻还没到
    DueToday,
}

/// 按传入的当前时刻分类。
/// 先比完整时间点，错过即逾期；没错过但落在今天的算今日待跟进；
/// 没有跟进日期或日期解析不了的客户不参与提醒
pub fn classify(customer: &Customer, now: NaiveDateTime) -> Option<Reminder> {
    let instant = customer.follow_up_instant()?;
    if instant < now {
        return Some(Reminder::Overdue);
    }
    if instant.date() == now.date() {
        return Some(Reminder::DueToday);
    }
    None
}

async fn query_reminders() -> ResponseResult {
    let time = TIME::now()?;
    let now = time.naive();
    let db = get_db();
    let db = db.lock().await;
    let mut overdue = Vec::new();
    let mut due_today = Vec::new();
    for customer in db.customers() {
        match classify(customer, now) {
            Some(Reminder::Overdue) => overdue.push(customer),
            Some(Reminder::DueToday) => due_today.push(customer),
            None => (),
        }
    }
    log!(
        "查询{}的跟进提醒，逾期{}位，今日待跟进{}位",
        time.format(TimeFormat::YYYYMMDD),
        overdue.len(),
        due_today.len()
    );
    Ok(Response::ok(json!({
        "overdue": overdue,
        "dueToday": due_today,
    })))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::common::CustomerStatus;

    use super::*;

    fn at(date: &str, hm: (u32, u32)) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(hm.0, hm.1, 0)
            .unwrap()
    }

    fn sample(date: Option<&str>, time: Option<&str>) -> Customer {
        Customer {
            id: "a".to_owned(),
            name: "Omar".to_owned(),
            phone: "0501234567".to_owned(),
            email: String::new(),
            company: String::new(),
            address: None,
            city: None,
            linkedin: None,
            status: CustomerStatus::Interested,
            interactions: Vec::new(),
            follow_up_date: date.map(|s| s.to_owned()),
            follow_up_time: time.map(|s| s.to_owned()),
        }
    }

    #[test]
    fn test_past_day_without_time_is_overdue() {
        let customer = sample(Some("2024-01-01"), None);
        let now = at("2024-01-02", (0, 0));
        assert_eq!(classify(&customer, now), Some(Reminder::Overdue));
    }

    #[test]
    fn test_today_later_time_is_due_today() {
        let customer = sample(Some("2024-01-02"), Some("14:00"));
        let now = at("2024-01-02", (12, 0));
        assert_eq!(classify(&customer, now), Some(Reminder::DueToday));
    }

    #[test]
    fn test_today_passed_time_is_overdue() {
        let customer = sample(Some("2024-01-02"), Some("09:00"));
        let now = at("2024-01-02", (12, 0));
        assert_eq!(classify(&customer, now), Some(Reminder::Overdue));
    }

    #[test]
    fn test_exact_now_counts_as_due_today() {
        let customer = sample(Some("2024-01-02"), Some("12:00"));
        let now = at("2024-01-02", (12, 0));
        assert_eq!(classify(&customer, now), Some(Reminder::DueToday));
    }

    #[test]
    fn test_future_day_and_unscheduled_are_silent() {
        let now = at("2024-01-02", (12, 0));
        assert_eq!(classify(&sample(Some("2024-01-03"), None), now), None);
        assert_eq!(classify(&sample(None, None), now), None);
        assert_eq!(classify(&sample(Some("乱写的"), None), now), None);
    }

    #[test]
    fn test_today_midnight_default_is_overdue() {
        // 没填时刻按零点算，到了当天只要时间过了零点就算逾期
        let customer = sample(Some("2024-01-02"), None);
        let now = at("2024-01-02", (0, 1));
        assert_eq!(classify(&customer, now), Some(Reminder::Overdue));
    }
}
