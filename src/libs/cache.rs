use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

macro_rules! gen_cache {
    ($(($N:ident, $T:ty)), +) => {
        lazy_static::lazy_static! {
            $(
                pub static ref $N: Arc<DashMap<String, $T>> = {
                    Arc::new(DashMap::new())
                };
            )+
        }
        /// 数据有任何变动就全部清掉
        pub fn clear_cache() {
            $(
                $N.clear();
            )+
        }
    };
}

gen_cache! {
    (CUSTOMER_CACHE, DashMap<String, Value>)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_clear_cache() {
        CUSTOMER_CACHE
            .entry("list".to_owned())
            .or_default()
            .insert("{}".to_owned(), json!([]));
        assert!(!CUSTOMER_CACHE.is_empty());
        clear_cache();
        assert!(CUSTOMER_CACHE.is_empty());
    }
}
