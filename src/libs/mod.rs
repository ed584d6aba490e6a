pub mod cache;
pub mod csv;
pub mod dser;
pub mod lazy;
pub mod time;

use axum::extract::Multipart;
use base64::prelude::Engine;

use crate::Response;

pub use self::time::{TimeFormat, TIME};
/// base64 url safe encode
pub fn base64_encode(input: impl AsRef<[u8]>) -> String {
    base64::prelude::BASE64_URL_SAFE_NO_PAD.encode(input)
}

pub struct FilePart {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
}
impl FilePart {
    pub fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or("unknown.csv")
    }
}

/// 取表单里名为 file 的第一个文件
pub async fn parse_multipart(mut part: Multipart) -> Result<FilePart, Response> {
    while let Some(field) = part.next_field().await? {
        if let Some("file") = field.name() {
            let filename = field.file_name().map(|s| s.to_owned());
            let bytes = field.bytes().await?.to_vec();
            return Ok(FilePart { bytes, filename });
        }
    }
    Err(Response::invalid_value("表单中缺少名为file的文件字段"))
}

pub fn gen_id(time: &TIME, name: &str) -> String {
    base64_encode(format!(
        "{}-{}-{}",
        name,
        time.naos() / 10000,
        rand::random::<u8>()
    ))
}

#[test]
fn test_gen_id_unique_for_same_name() {
    let time = TIME::now().unwrap();
    let ids: std::collections::HashSet<_> =
        (0..64).map(|_| gen_id(&time, "张三")).collect();
    assert!(ids.len() > 1);
    for id in &ids {
        assert!(!id.contains('='));
    }
}
