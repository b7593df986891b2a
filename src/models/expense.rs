//! Textract AnalyzeExpense 结果的内部表示, 与 SDK 类型解耦

use serde::{Deserialize, Serialize};

/// 一个 (type, value) 字段, 例如 ("TOTAL", "$12.34")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseField {
    pub field_type: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub fields: Vec<ExpenseField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItemGroup {
    pub line_items: Vec<LineItem>,
}

/// 单张票据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDocument {
    pub summary_fields: Vec<ExpenseField>,
    pub line_item_groups: Vec<LineItemGroup>,
}

/// 一次 AnalyzeExpense 调用的全部结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseAnalysis {
    pub documents: Vec<ExpenseDocument>,
}

impl ExpenseField {
    pub fn new(field_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_type: field_type.into(),
            value: Some(value.into()),
        }
    }
}

impl LineItem {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs.iter().map(|(t, v)| ExpenseField::new(*t, *v)).collect(),
        }
    }
}
