use std::fmt::Display;

use axum::{
    http::{HeaderValue, StatusCode},
    Json,
};
use serde::{ser::SerializeStruct, Serialize};
use serde_json::{json, Value};

use crate::log;
/// 响应数据
#[derive(Debug)]
pub struct Response {
    /// 响应状态码
    code: StatusCode,
    status: i32,
    data: Value,
}

impl axum::response::IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        Json(self).into_response()
    }
}

impl Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("Response", 2)?;
        if self.status != 0 {
            log!("检测到请求错误，错误信息：{}", self.data);
        }
        s.serialize_field("status", &self.status)?;
        s.serialize_field("code", &self.code.as_u16())?;
        s.serialize_field("data", &self.data)?;
        s.end()
    }
}
impl Response {
    pub fn new(code: StatusCode, status: i32, data: Value) -> Response {
        Self { code, status, data }
    }
    pub fn ok(data: Value) -> Self {
        Self {
            code: StatusCode::OK,
            status: 0,
            data,
        }
    }
    pub fn empty() -> Self {
        Self {
            code: StatusCode::OK,
            status: 0,
            data: json!("OK"),
        }
    }
    /// 内部错误
    pub fn internal_server_error(e: impl Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, -1, json!(e.to_string()))
    }
    /// 参数格式错误，JSON 参数或 CSV 表头不符都算
    pub fn invalid_format(e: impl Display) -> Self {
        Self::new(StatusCode::OK, 1, json!(e.to_string()))
    }
    /// 请求的数据不存在
    pub fn not_exist(e: impl Display) -> Self {
        Self::new(StatusCode::OK, 2, json!(e.to_string()))
    }
    /// 数值不对
    pub fn invalid_value(e: impl Display) -> Self {
        Self::new(StatusCode::OK, 7, json!(e.to_string()))
    }
    /// 条件不满足
    pub fn dissatisfy(e: impl Display) -> Self {
        Self::new(StatusCode::OK, 8, json!(e.to_string()))
    }
    pub fn code(&self) -> StatusCode {
        self.code
    }
    pub fn status(&self) -> i32 {
        self.status
    }
}

impl From<std::io::Error> for Response {
    fn from(value: std::io::Error) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            -1,
            json!(value.to_string()),
        )
    }
}

impl From<serde_json::Error> for Response {
    fn from(value: serde_json::Error) -> Self {
        Response::invalid_format(value)
    }
}
impl From<std::time::SystemTimeError> for Response {
    fn from(value: std::time::SystemTimeError) -> Self {
        Response::internal_server_error(value)
    }
}
impl From<axum::extract::multipart::MultipartError> for Response {
    fn from(value: axum::extract::multipart::MultipartError) -> Self {
        Response::internal_server_error(value)
    }
}
/// 附件下载响应
pub struct BodyFile {
    body: Vec<u8>,
    filename: &'static str,
    mime: &'static str,
}
impl axum::response::IntoResponse for BodyFile {
    fn into_response(self) -> axum::response::Response {
        let mut response = self.body.into_response();

        let headers = response.headers_mut();
        headers.insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(self.mime),
        );

        headers.insert(
            axum::http::header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&format!("attachment; filename=\"{}\"", self.filename)).unwrap(),
        );
        response
    }
}

impl BodyFile {
    /// CSV 文本附件
    pub fn csv(text: String, filename: &'static str) -> Self {
        Self {
            body: text.into_bytes(),
            filename,
            mime: "text/csv; charset=utf-8",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_numbering() {
        assert_eq!(Response::ok(json!(1)).status(), 0);
        assert_eq!(Response::invalid_format("x").status(), 1);
        assert_eq!(Response::not_exist("x").status(), 2);
        assert_eq!(Response::invalid_value("x").status(), 7);
        assert_eq!(Response::dissatisfy("x").status(), 8);
        assert_eq!(Response::internal_server_error("x").status(), -1);
        assert_eq!(
            Response::internal_server_error("x").code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_serialized_shape() {
        let value = json!(Response::ok(json!({"id": "a"})));
        assert_eq!(value["status"], json!(0));
        assert_eq!(value["code"], json!(200));
        assert_eq!(value["data"]["id"], json!("a"));
    }
}
