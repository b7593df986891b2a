use serde::{Deserialize, Serialize};

/// 没有识别到商户名/票号时的默认标题
pub const DEFAULT_TITLE: &str = "Receipt";

/// 账单明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,        // 每次生成的 uuid, 不保证稳定
    pub name: String,
    pub unit_price: f64,
    pub qty: f64,
}

/// 分项账单 (extract 接口的响应体)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub title: String,
    pub items: Vec<Item>,
    pub tax: f64,
    pub subtotal: f64,
    pub total: f64,
}

impl Default for Bill {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            items: Vec::new(),
            tax: 0.0,
            subtotal: 0.0,
            total: 0.0,
        }
    }
}
