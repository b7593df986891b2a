use crate::error::{AppError, AppResult};
use crate::models::{ExpenseAnalysis, ExpenseDocument, ExpenseField, LineItem, LineItemGroup};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_textract::types::{self as tx, Document, S3Object};
use aws_sdk_textract::Client;

/// 票据解析能力 (外部 OCR)
#[async_trait]
pub trait ExpenseAnalyzer: Send + Sync {
    /// 同步解析 S3 上的一张票据图片
    async fn analyze_expense(&self, bucket: &str, key: &str) -> AppResult<ExpenseAnalysis>;
}

/// Textract AnalyzeExpense 实现
pub struct TextractAnalyzer {
    client: Client,
}

impl TextractAnalyzer {
    pub fn new(sdk_config: &SdkConfig, endpoint_url: Option<&str>) -> Self {
        let mut builder = aws_sdk_textract::config::Builder::from(sdk_config);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl ExpenseAnalyzer for TextractAnalyzer {
    async fn analyze_expense(&self, bucket: &str, key: &str) -> AppResult<ExpenseAnalysis> {
        let document = Document::builder()
            .s3_object(S3Object::builder().bucket(bucket).name(key).build())
            .build();

        let output = self
            .client
            .analyze_expense()
            .document(document)
            .send()
            .await
            .map_err(|e| AppError::Ocr(e.to_string()))?;

        Ok(ExpenseAnalysis {
            documents: output.expense_documents().iter().map(convert_document).collect(),
        })
    }
}

fn convert_document(doc: &tx::ExpenseDocument) -> ExpenseDocument {
    ExpenseDocument {
        summary_fields: doc.summary_fields().iter().map(convert_field).collect(),
        line_item_groups: doc
            .line_item_groups()
            .iter()
            .map(|group| LineItemGroup {
                line_items: group
                    .line_items()
                    .iter()
                    .map(|item| LineItem {
                        fields: item.line_item_expense_fields().iter().map(convert_field).collect(),
                    })
                    .collect(),
            })
            .collect(),
    }
}

fn convert_field(field: &tx::ExpenseField) -> ExpenseField {
    ExpenseField {
        field_type: field
            .r#type()
            .and_then(|t| t.text())
            .unwrap_or_default()
            .to_string(),
        value: field
            .value_detection()
            .and_then(|d| d.text())
            .map(str::to_string),
    }
}
