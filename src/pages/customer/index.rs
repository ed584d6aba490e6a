use axum::{
    extract::Path,
    routing::{delete, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    commit_or_rollback,
    common::{Customer, CustomerStatus},
    database::{get_db, Database},
    get_cache,
    libs::{
        cache::CUSTOMER_CACHE,
        dser::{deser_empty_to_none, deser_status_filter, op_deser_hh_mm, op_deser_yyyy_mm_dd},
        gen_id, TIME,
    },
    log, Response, ResponseResult,
};

pub fn index_router() -> Router {
    Router::new()
        .route("/customer/list/data", post(query_customer))
        .route("/customer/full/data/:id", post(query_full_data))
        .route("/customer/add", post(insert_customer))
        .route("/customer/update", post(update_customer))
        .route("/customer/delete/:id", delete(delete_customer))
        .route("/customer/status/update", post(update_status))
}

#[derive(Deserialize, Debug)]
struct InsertParams {
    name: String,
    phone: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    company: String,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    address: Option<String>,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    city: Option<String>,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    linkedin: Option<String>,
    #[serde(default)]
    status: CustomerStatus,
    #[serde(
        rename = "followUpDate",
        default,
        deserialize_with = "op_deser_yyyy_mm_dd"
    )]
    follow_up_date: Option<String>,
    #[serde(
        rename = "followUpTime",
        default,
        deserialize_with = "op_deser_hh_mm"
    )]
    follow_up_time: Option<String>,
}

async fn insert_customer(Json(value): Json<Value>) -> ResponseResult {
    let params: InsertParams = serde_json::from_value(value)?;
    log!("添加客户操作，公司：{}，客户名：{}", params.company, params.name);
    if params.name.trim().is_empty() || params.phone.trim().is_empty() {
        log!("添加客户操作失败，原因是姓名或电话为空");
        return Err(Response::invalid_value("姓名和电话为必填项"));
    }
    let db = get_db();
    let mut db = db.lock().await;
    let id = commit_or_rollback!(__insert_customer, &mut db, &params)?;
    CUSTOMER_CACHE.clear();
    log!("成功添加客户({}-{})", params.company, params.name);
    Ok(Response::ok(json!({ "id": id })))
}

fn __insert_customer(db: &mut Database, params: &InsertParams) -> Result<String, Response> {
    let time = TIME::now()?;
    let id = gen_id(&time, params.name.trim());
    let mut customer = Customer {
        id: id.clone(),
        name: params.name.trim().to_owned(),
        phone: params.phone.trim().to_owned(),
        email: params.email.trim().to_owned(),
        company: params.company.trim().to_owned(),
        address: params.address.clone(),
        city: params.city.clone(),
        linkedin: params.linkedin.clone(),
        status: params.status,
        interactions: Vec::new(),
        follow_up_date: params.follow_up_date.clone(),
        follow_up_time: params.follow_up_time.clone(),
    };
    customer.normalize();
    db.customers_mut().push(customer);
    Ok(id)
}

#[derive(Deserialize, Debug)]
struct UpdateParams {
    id: String,
    name: String,
    phone: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    company: String,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    address: Option<String>,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    city: Option<String>,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    linkedin: Option<String>,
    #[serde(default)]
    status: CustomerStatus,
    #[serde(
        rename = "followUpDate",
        default,
        deserialize_with = "op_deser_yyyy_mm_dd"
    )]
    follow_up_date: Option<String>,
    #[serde(
        rename = "followUpTime",
        default,
        deserialize_with = "op_deser_hh_mm"
    )]
    follow_up_time: Option<String>,
}

async fn update_customer(Json(value): Json<Value>) -> ResponseResult {
    let params: UpdateParams = serde_json::from_value(value)?;
    if params.name.trim().is_empty() || params.phone.trim().is_empty() {
        log!("更新客户`{}`失败，原因是姓名或电话为空", params.id);
        return Err(Response::invalid_value("姓名和电话为必填项"));
    }
    let db = get_db();
    let mut db = db.lock().await;
    commit_or_rollback!(__update_customer, &mut db, &params)?;
    CUSTOMER_CACHE.clear();
    log!("成功更新客户`{}`的资料", params.id);
    Ok(Response::empty())
}

/// 互动记录不在编辑表单里，整体更新时原样保留
fn __update_customer(db: &mut Database, params: &UpdateParams) -> Result<(), Response> {
    let Some(customer) = db.get_mut(&params.id) else {
        return Err(Response::not_exist("要更新的客户不存在"));
    };
    customer.name = params.name.trim().to_owned();
    customer.phone = params.phone.trim().to_owned();
    customer.email = params.email.trim().to_owned();
    customer.company = params.company.trim().to_owned();
    customer.address = params.address.clone();
    customer.city = params.city.clone();
    customer.linkedin = params.linkedin.clone();
    customer.status = params.status;
    customer.follow_up_date = params.follow_up_date.clone();
    customer.follow_up_time = params.follow_up_time.clone();
    customer.normalize();
    Ok(())
}

async fn delete_customer(Path(id): Path<String>) -> ResponseResult {
    let db = get_db();
    let mut db = db.lock().await;
    commit_or_rollback!(__delete_customer, &mut db, &id)?;
    CUSTOMER_CACHE.clear();
    log!("成功删除客户`{}`", id);
    Ok(Response::empty())
}

fn __delete_customer(db: &mut Database, id: &str) -> Result<(), Response> {
    let customers = db.customers_mut();
    let before = customers.len();
    customers.retain(|c| c.id != id);
    if customers.len() == before {
        return Err(Response::not_exist("要删除的客户不存在"));
    }
    Ok(())
}

#[derive(Deserialize, Debug)]
struct StatusParams {
    id: String,
    status: CustomerStatus,
}

async fn update_status(Json(value): Json<Value>) -> ResponseResult {
    let params: StatusParams = serde_json::from_value(value)?;
    let db = get_db();
    let mut db = db.lock().await;
    commit_or_rollback!(__update_status, &mut db, &params)?;
    CUSTOMER_CACHE.clear();
    log!("客户`{}`的状态改为{}", params.id, params.status);
    Ok(Response::empty())
}

fn __update_status(db: &mut Database, params: &StatusParams) -> Result<(), Response> {
    let Some(customer) = db.get_mut(&params.id) else {
        return Err(Response::not_exist("要更新的客户不存在"));
    };
    customer.status = params.status;
    Ok(())
}

#[derive(Deserialize, Debug, Default)]
pub struct QueryParams {
    #[serde(default)]
    text: String,
    #[serde(default, deserialize_with = "deser_status_filter")]
    status: Option<CustomerStatus>,
    #[serde(
        rename = "startDate",
        default,
        deserialize_with = "op_deser_yyyy_mm_dd"
    )]
    start_date: Option<String>,
    #[serde(rename = "endDate", default, deserialize_with = "op_deser_yyyy_mm_dd")]
    end_date: Option<String>,
}

async fn query_customer(Json(value): Json<Value>) -> ResponseResult {
    let key = value.to_string();
    let params: QueryParams = serde_json::from_value(value)?;
    if let Some(cache) = get_cache!(CUSTOMER_CACHE, "list", &key) {
        log!("查询客户列表命中缓存");
        return Ok(Response::ok(cache));
    }
    let db = get_db();
    let db = db.lock().await;
    let mut list = filter_customers(db.customers(), &params);
    sort_by_follow_up(&mut list);
    let count = list.len();
    let data = json!(list);
    CUSTOMER_CACHE
        .entry("list".to_owned())
        .or_default()
        .insert(key, data.clone());
    log!("成功查询到{}位客户", count);
    Ok(Response::ok(data))
}

async fn query_full_data(Path(id): Path<String>) -> ResponseResult {
    if let Some(cache) = get_cache!(CUSTOMER_CACHE, "full", &id) {
        log!("查询客户完整信息命中缓存");
        return Ok(Response::ok(cache));
    }
    let db = get_db();
    let db = db.lock().await;
    let Some(customer) = db.get(&id) else {
        log!("没有找到客户`{}`", id);
        return Ok(Response::ok(json!(None::<Customer>)));
    };
    let mut data = json!(customer);
    data["whatsapp"] = json!(customer.whatsapp_link());
    CUSTOMER_CACHE
        .entry("full".to_owned())
        .or_default()
        .insert(id.clone(), data.clone());
    log!("成功查询到客户`{}`的完整信息", customer.name);
    Ok(Response::ok(data))
}

/// 按搜索文本、状态和跟进日期范围过滤
pub fn filter_customers<'a>(customers: &'a [Customer], params: &QueryParams) -> Vec<&'a Customer> {
    let text = params.text.to_lowercase();
    let start = parse_day(params.start_date.as_deref());
    let end = parse_day(params.end_date.as_deref());
    customers
        .iter()
        .filter(|c| matches_text(c, &text))
        .filter(|c| params.status.map_or(true, |status| c.status == status))
        .filter(|c| matches_date_range(c, start, end))
        .collect()
}

fn parse_day(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?, "%Y-%m-%d").ok()
}

fn matches_text(customer: &Customer, text: &str) -> bool {
    text.is_empty()
        || customer.name.to_lowercase().contains(text)
        || customer.company.to_lowercase().contains(text)
        || customer.phone.to_lowercase().contains(text)
        || customer.email.to_lowercase().contains(text)
}

/// 日期范围按日历天比较，两端都包含；只要设了任意一端，
/// 没有跟进日期的客户一律不匹配
fn matches_date_range(
    customer: &Customer,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> bool {
    if start.is_none() && end.is_none() {
        return true;
    }
    let Some(day) = customer.follow_up_day() else {
        return false;
    };
    if let Some(start) = start {
        if day < start {
            return false;
        }
    }
    if let Some(end) = end {
        if day > end {
            return false;
        }
    }
    true
}

/// 跟进时间升序的稳定排序，没有跟进安排的客户压到最后
pub fn sort_by_follow_up(list: &mut [&Customer]) {
    list.sort_by_key(|c| match c.follow_up_instant() {
        Some(instant) => (0, instant),
        None => (1, NaiveDateTime::MAX),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, name: &str, company: &str, date: Option<&str>, time: Option<&str>) -> Customer {
        Customer {
            id: id.to_owned(),
            name: name.to_owned(),
            phone: "0501234567".to_owned(),
            // 邮箱域名刻意避开各处的搜索词
            email: format!("{id}@mail.ae"),
            company: company.to_owned(),
            address: None,
            city: None,
            linkedin: None,
            status: CustomerStatus::Interested,
            interactions: Vec::new(),
            follow_up_date: date.map(|s| s.to_owned()),
            follow_up_time: time.map(|s| s.to_owned()),
        }
    }

    fn ids(list: &[&Customer]) -> Vec<String> {
        list.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_filter_by_text_is_case_insensitive() {
        let customers = vec![
            sample("a", "Omar", "ACME Trading", None, None),
            sample("b", "李雷", "北方贸易", None, None),
        ];
        let params = QueryParams {
            text: "acme".to_owned(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_customers(&customers, &params)), ["a"]);

        let params = QueryParams {
            text: "OMAR".to_owned(),
            ..Default::default()
        };
        assert_eq!(ids(&filter_customers(&customers, &params)), ["a"]);

        let params = QueryParams {
            text: "mail.ae".to_owned(),
            ..Default::default()
        };
        assert_eq!(filter_customers(&customers, &params).len(), 2);
    }

    #[test]
    fn test_filter_by_status() {
        let mut customers = vec![
            sample("a", "Omar", "", None, None),
            sample("b", "李雷", "", None, None),
        ];
        customers[1].status = CustomerStatus::ClosedWon;
        let params = QueryParams {
            status: Some(CustomerStatus::ClosedWon),
            ..Default::default()
        };
        assert_eq!(ids(&filter_customers(&customers, &params)), ["b"]);
    }

    #[test]
    fn test_date_range_is_inclusive_and_drops_unscheduled() {
        let customers = vec![
            sample("a", "一", "", Some("2024-03-01"), None),
            sample("b", "二", "", Some("2024-03-05"), None),
            sample("c", "三", "", Some("2024-03-10"), None),
            sample("d", "四", "", None, None),
        ];
        let params = QueryParams {
            start_date: Some("2024-03-01".to_owned()),
            end_date: Some("2024-03-05".to_owned()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_customers(&customers, &params)), ["a", "b"]);

        let params = QueryParams {
            start_date: Some("2024-03-05".to_owned()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_customers(&customers, &params)), ["b", "c"]);

        let params = QueryParams {
            end_date: Some("2024-03-04".to_owned()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_customers(&customers, &params)), ["a"]);
    }

    #[test]
    fn test_sort_unscheduled_last_and_stable() {
        let customers = vec![
            sample("a", "一", "", None, None),
            sample("b", "二", "", Some("2024-03-05"), Some("14:00")),
            sample("c", "三", "", Some("2024-03-05"), None),
            sample("d", "四", "", None, None),
            sample("e", "五", "", Some("2024-03-01"), Some("23:59")),
        ];
        let mut list: Vec<&Customer> = customers.iter().collect();
        sort_by_follow_up(&mut list);
        // c 没填时刻按零点算，排在同一天的 b 前面；没安排的 a、d 保持原相对顺序
        assert_eq!(ids(&list), ["e", "c", "b", "a", "d"]);
    }

    #[test]
    fn test_unparsable_date_sorts_last() {
        let customers = vec![
            sample("a", "一", "", Some("咸鱼"), None),
            sample("b", "二", "", Some("2024-03-05"), None),
        ];
        let mut list: Vec<&Customer> = customers.iter().collect();
        sort_by_follow_up(&mut list);
        assert_eq!(ids(&list), ["b", "a"]);
    }

    #[test]
    fn test_delete_and_status_inner_ops() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::load(dir.path().join("customers.json")).unwrap();
        db.customers_mut().push(sample("a", "Omar", "", None, None));

        assert!(__delete_customer(&mut db, "missing").is_err());
        assert_eq!(db.customers().len(), 1);

        let params = StatusParams {
            id: "a".to_owned(),
            status: CustomerStatus::Meeting,
        };
        __update_status(&mut db, &params).unwrap();
        assert_eq!(db.customers()[0].status, CustomerStatus::Meeting);

        __delete_customer(&mut db, "a").unwrap();
        assert!(db.customers().is_empty());
    }

    #[test]
    fn test_insert_trims_and_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::load(dir.path().join("customers.json")).unwrap();
        let params: InsertParams = serde_json::from_value(serde_json::json!({
            "name": "  Omar  ",
            "phone": " 0501234567 ",
            "followUpTime": "09:30"
        }))
        .unwrap();
        let id = __insert_customer(&mut db, &params).unwrap();
        let customer = db.get(&id).unwrap();
        assert_eq!(customer.name, "Omar");
        assert_eq!(customer.phone, "0501234567");
        assert_eq!(customer.status, CustomerStatus::Interested);
        // 没有跟进日期，孤立的跟进时刻被丢弃
        assert_eq!(customer.follow_up_time, None);
    }
}
