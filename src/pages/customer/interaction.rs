use axum::{extract::Path, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    commit_or_rollback,
    common::{Interaction, InteractionType},
    database::{get_db, Database},
    libs::{cache::CUSTOMER_CACHE, gen_id, TimeFormat, TIME},
    log, Response, ResponseResult,
};

pub fn interaction_router() -> Router {
    Router::new()
        .route("/customer/interaction/add", post(insert_interaction))
        .route("/customer/interaction/data/:id", post(query_interactions))
}

#[derive(Deserialize, Debug)]
struct InsertParams {
    customer: String,
    #[serde(rename = "type")]
    ty: InteractionType,
    notes: String,
}

async fn insert_interaction(Json(value): Json<Value>) -> ResponseResult {
    let params: InsertParams = serde_json::from_value(value)?;
    if params.notes.trim().is_empty() {
        log!("给客户`{}`添加互动记录失败，原因是备注为空", params.customer);
        return Err(Response::invalid_value("互动备注不能为空"));
    }
    let db = get_db();
    let mut db = db.lock().await;
    let interaction = commit_or_rollback!(__insert_interaction, &mut db, &params)?;
    CUSTOMER_CACHE.clear();
    log!("成功给客户`{}`添加一条{}互动记录", params.customer, params.ty);
    Ok(Response::ok(json!(interaction)))
}

/// 新记录插到最前面，互动列表始终按从新到旧排列
fn __insert_interaction(db: &mut Database, params: &InsertParams) -> Result<Interaction, Response> {
    let time = TIME::now()?;
    let Some(customer) = db.get_mut(&params.customer) else {
        return Err(Response::not_exist("客户不存在"));
    };
    let interaction = Interaction {
        id: gen_id(&time, "interaction"),
        ty: params.ty,
        notes: params.notes.clone(),
        date: time.format(TimeFormat::ISO8601),
    };
    customer.interactions.insert(0, interaction.clone());
    Ok(interaction)
}

async fn query_interactions(Path(id): Path<String>) -> ResponseResult {
    let db = get_db();
    let db = db.lock().await;
    let Some(customer) = db.get(&id) else {
        log!("没有找到客户`{}`", id);
        return Err(Response::not_exist("客户不存在"));
    };
    log!(
        "成功查询到客户`{}`的{}条互动记录",
        customer.name,
        customer.interactions.len()
    );
    Ok(Response::ok(json!(customer.interactions)))
}
