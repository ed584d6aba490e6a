use std::{path::PathBuf, sync::Arc};

use tokio::sync::Mutex;

use crate::{common::Customer, Response, CONFIG};

/// 全量客户数据的内存快照，任何变动都整体重写存档
pub struct Database {
    path: PathBuf,
    customers: Vec<Customer>,
}

impl Database {
    /// 读档。文件不存在按空列表算，内容解析失败直接报错，
    /// 坏档绝不能被空列表覆盖掉
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, Response> {
        let path = path.into();
        let customers = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(Response::from(e)),
        };
        Ok(Self { path, customers })
    }
    /// 先写临时文件再改名，避免写到一半留下坏档
    pub fn save(&self) -> Result<(), Response> {
        let text = serde_json::to_string(&self.customers)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, text.as_bytes())?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }
    pub fn customers_mut(&mut self) -> &mut Vec<Customer> {
        &mut self.customers
    }
    pub fn restore(&mut self, customers: Vec<Customer>) {
        self.customers = customers;
    }
    pub fn get(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Customer> {
        self.customers.iter_mut().find(|c| c.id == id)
    }
}

/// 改动成功就落盘，内存修改或落盘失败都还原到改动前
#[macro_export]
macro_rules! commit_or_rollback {
    ($fn:expr, $db:expr, $params:expr) => {{
        let backup = $db.customers().to_vec();
        match $fn($db, $params) {
            Ok(ok) => match $db.save() {
                Ok(()) => Ok(ok),
                Err(e) => {
                    $db.restore(backup);
                    Err(e)
                }
            },
            Err(e) => {
                $db.restore(backup);
                Err(e)
            }
        }
    }};
    ($fn:expr, $db:expr, $($args:expr), +) => {{
        let backup = $db.customers().to_vec();
        match $fn($db, $($args,)+) {
            Ok(ok) => match $db.save() {
                Ok(()) => Ok(ok),
                Err(e) => {
                    $db.restore(backup);
                    Err(e)
                }
            },
            Err(e) => {
                $db.restore(backup);
                Err(e)
            }
        }
    }};
}

lazy_static::lazy_static! {
    /// 全局客户存档
    pub static ref STORE: Arc<Mutex<Database>> = {
        Arc::new(Mutex::new(
            Database::load(CONFIG.data_path()).expect("读取客户存档失败，请检查存档文件")
        ))
    };
}

pub fn get_db() -> Arc<Mutex<Database>> {
    Arc::clone(&STORE)
}
