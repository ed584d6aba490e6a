pub mod common;

pub mod response;

pub mod database;
pub mod libs;
pub mod pages;

use std::fmt::Arguments;

use libs::time::TIME;
pub use response::Response;
use serde_json::json;
pub type ResponseResult = Result<Response, Response>;

#[macro_export]
macro_rules! get_cache {
    ($map:expr, $arg1:expr, $arg2:expr) => {
        match $map.get($arg1) {
            Some(rw) => rw.get($arg2).map(|c| c.clone()),
            _ => None,
        }
    };
}

#[macro_export]
macro_rules! log {
    ($($args:tt)+) => {
        $crate::log(format_args!($($args)+))
    };
}

pub fn log(args: Arguments) {
    println!("{}", "*".repeat(10));
    let time = TIME::now().unwrap_or_default();
    println!("{} ---", time.format(libs::TimeFormat::YYYYMMDD_HHMMSS));
    println!("    {}", args);
}

lazy_static::lazy_static! {
    pub static ref CONFIG: Config = {
        Config::read()
    };
}
#[derive(serde::Deserialize, serde::Serialize, Debug)]
pub struct Config {
    port: u16,
    data: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data: "data/customers.json".to_owned(),
        }
    }
}
impl Config {
    pub fn read() -> Self {
        let config = match std::fs::read_to_string("config/config.json") {
            Ok(value) => value,
            Err(e) => {
                if let std::io::ErrorKind::NotFound = e.kind() {
                    std::fs::write("config/config.json", json!(Config::default()).to_string())
                        .expect("创建config/config.json文件失败，请手动创建");
                    panic!(
                        "该设置文件'config/config.json'不存在，已在当前目录自动创建，请根据实际情况修改里面的配置!",
                    )
                } else {
                    panic!("读取设置文件时发送错误，具体信息为：{:#?}", e)
                }
            }
        };
        match serde_json::from_str(&config) {
            Ok(config) => config,
            Err(e) => panic!("config/config.json格式错误，具体错误信息为: {:#?}", e),
        }
    }
    pub fn port(&self) -> u16 {
        self.port
    }
    pub fn data_path(&self) -> &str {
        &self.data
    }
}
