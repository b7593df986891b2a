//! 票据解析结果 -> 分项账单
//!
//! 所有数值解析失败都静默回落到默认值: OCR 字段格式不统一, 单个字段
//! 异常不能让整张票据失败。

use crate::models::{Bill, ExpenseAnalysis, ExpenseDocument, ExpenseField, Item, DEFAULT_TITLE};
use uuid::Uuid;

/// 标题类字段
const TITLE_FIELDS: [&str; 3] = ["VENDOR_NAME", "RECEIPT_NUMBER", "MERCHANT_NAME"];

/// 汇总字段 (标题 + 三个金额)
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub title: String,
    pub tax: f64,
    pub subtotal: f64,
    pub total: f64,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            tax: 0.0,
            subtotal: 0.0,
            total: 0.0,
        }
    }
}

/// 解析金额字符串, 如 "$1,024.00"; 失败返回 0.0
pub fn parse_amount(raw: Option<&str>) -> f64 {
    raw.and_then(|s| parse_number(&s.replace('$', "")))
        .unwrap_or(0.0)
}

/// 解析数量, 不剥离货币符号; 失败返回 1.0
pub fn parse_quantity(raw: Option<&str>) -> f64 {
    raw.and_then(parse_number).unwrap_or(1.0)
}

fn parse_number(s: &str) -> Option<f64> {
    s.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// 只读取第一张票据的汇总字段, 同类字段后出现的覆盖先出现的
pub fn extract_summary(analysis: &ExpenseAnalysis) -> Summary {
    let mut summary = Summary::default();

    let Some(first) = analysis.documents.first() else {
        return summary;
    };

    for field in &first.summary_fields {
        let value = field.value.as_deref();
        match field.field_type.to_uppercase().as_str() {
            t if TITLE_FIELDS.contains(&t) => {
                if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                    summary.title = v.to_string();
                }
            }
            "TAX" => summary.tax = parse_amount(value),
            "SUBTOTAL" => summary.subtotal = parse_amount(value),
            "TOTAL" => summary.total = parse_amount(value),
            _ => {}
        }
    }

    summary
}

/// 按原顺序收集所有票据、所有分组中的明细行; 没有名称的行直接丢弃
pub fn extract_line_items(analysis: &ExpenseAnalysis) -> Vec<Item> {
    analysis
        .documents
        .iter()
        .flat_map(|doc: &ExpenseDocument| doc.line_item_groups.iter())
        .flat_map(|group| group.line_items.iter())
        .filter_map(|line| to_item(&line.fields))
        .collect()
}

fn to_item(fields: &[ExpenseField]) -> Option<Item> {
    let mut name: Option<&str> = None;
    let mut unit_price = 0.0;
    let mut qty = 1.0;

    for field in fields {
        let value = field.value.as_deref();
        match field.field_type.to_uppercase().as_str() {
            "ITEM" => name = value,
            "PRICE" => unit_price = parse_amount(value),
            "QUANTITY" => qty = parse_quantity(value),
            _ => {}
        }
    }

    let name = name.map(str::trim).filter(|n| !n.is_empty())?;
    Some(Item {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        unit_price,
        qty,
    })
}

/// 组合汇总与明细
pub fn format_bill(analysis: &ExpenseAnalysis) -> Bill {
    let summary = extract_summary(analysis);
    let items = extract_line_items(analysis);

    Bill {
        title: summary.title,
        items,
        tax: summary.tax,
        subtotal: summary.subtotal,
        total: summary.total,
    }
}
