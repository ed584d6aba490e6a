use axum::{extract::Multipart, routing::post, Router};
use serde_json::json;

use crate::{
    commit_or_rollback,
    common::Customer,
    database::{get_db, Database},
    libs::{
        cache::CUSTOMER_CACHE,
        csv::{decode_customers, encode_customers, DecodedCustomers, EXPORT_FILENAME},
        parse_multipart,
    },
    log,
    response::BodyFile,
    Response, ResponseResult,
};

pub fn data_router() -> Router {
    Router::new()
        .route("/customer/export/csv", post(export_csv))
        .route("/customer/import/check", post(check_import))
        .route("/customer/import/csv", post(import_csv))
}

/// 全部客户打包成 CSV 附件下载
async fn export_csv() -> Result<BodyFile, Response> {
    let db = get_db();
    let db = db.lock().await;
    let text = encode_customers(db.customers())?;
    log!("导出{}位客户到 {}", db.customers().len(), EXPORT_FILENAME);
    Ok(BodyFile::csv(text, EXPORT_FILENAME))
}

fn decode_upload(bytes: &[u8]) -> Result<DecodedCustomers, Response> {
    let text = String::from_utf8_lossy(bytes);
    let decoded = decode_customers(&text)?;
    if decoded.customers.is_empty() {
        return Err(Response::dissatisfy("文件中没有可导入的客户数据"));
    }
    Ok(decoded)
}

/// 导入前的预检，只解析统计数量，数据不落库。
/// 前端拿到数量向用户确认后再调正式导入接口
async fn check_import(part: Multipart) -> ResponseResult {
    let file = parse_multipart(part).await?;
    log!("预检导入文件 {}", file.filename());
    let decoded = decode_upload(&file.bytes)?;
    log!(
        "预检完成，可导入{}位客户，跳过{}行",
        decoded.customers.len(),
        decoded.skipped
    );
    Ok(Response::ok(json!({
        "valid": decoded.customers.len(),
        "skipped": decoded.skipped,
    })))
}

/// 确认后的正式导入，解析结果整体追加进存档
async fn import_csv(part: Multipart) -> ResponseResult {
    let file = parse_multipart(part).await?;
    log!("正在导入文件 {}", file.filename());
    let decoded = decode_upload(&file.bytes)?;
    let count = decoded.customers.len();
    let skipped = decoded.skipped;
    let db = get_db();
    let mut db = db.lock().await;
    commit_or_rollback!(__append_customers, &mut db, decoded.customers)?;
    CUSTOMER_CACHE.clear();
    log!("成功导入{}位客户，跳过{}行", count, skipped);
    Ok(Response::ok(json!({
        "imported": count,
        "skipped": skipped,
    })))
}

fn __append_customers(db: &mut Database, customers: Vec<Customer>) -> Result<(), Response> {
    db.customers_mut().extend(customers);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::libs::csv::CSV_HEADER;

    use super::*;

    #[test]
    fn test_empty_upload_dissatisfies() {
        let header_only = format!("\u{feff}{}\n", CSV_HEADER.join(","));
        let err = decode_upload(header_only.as_bytes()).unwrap_err();
        assert_eq!(err.status(), 8);

        let err = decode_upload(b"name,phone\n").unwrap_err();
        assert_eq!(err.status(), 1);
    }

    #[test]
    fn test_append_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::load(dir.path().join("customers.json")).unwrap();
        let text = format!(
            "{}\nc1,李雷,0501234567,,,,,,Interested,,,[]",
            CSV_HEADER.join(",")
        );
        let decoded = decode_upload(text.as_bytes()).unwrap();
        __append_customers(&mut db, decoded.customers).unwrap();
        let again = decode_upload(text.as_bytes()).unwrap();
        __append_customers(&mut db, again.customers).unwrap();
        // 同一份文件导两次就是两份客户，导入永远是追加
        assert_eq!(db.customers().len(), 2);
    }
}
