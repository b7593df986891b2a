use crate::clients::{ExpenseAnalyzer, ObjectStore};
use crate::error::AppResult;
use crate::models::Bill;
use crate::service::formatter::format_bill;
use std::sync::Arc;

/// 票据识别服务: Textract 解析 -> 分项账单 -> 删除源对象
pub struct ExtractService {
    analyzer: Arc<dyn ExpenseAnalyzer>,
    store: Arc<dyn ObjectStore>,
}

impl ExtractService {
    pub fn new(analyzer: Arc<dyn ExpenseAnalyzer>, store: Arc<dyn ObjectStore>) -> Self {
        Self { analyzer, store }
    }

    /// 解析失败整体失败 (不重试, 无部分结果)
    ///
    /// 删除源对象失败只记日志, 仍返回已解析出的账单
    pub async fn extract(&self, bucket: &str, key: &str) -> AppResult<Bill> {
        let analysis = match self.analyzer.analyze_expense(bucket, key).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::error!("Expense analysis failed for {}/{}: {}", bucket, key, e);
                return Err(e);
            }
        };

        let bill = format_bill(&analysis);
        tracing::info!(
            "Extracted {}/{}: {} documents, {} items, total {}",
            bucket,
            key,
            analysis.documents.len(),
            bill.items.len(),
            bill.total
        );

        if let Err(e) = self.store.delete_object(bucket, key).await {
            tracing::warn!("Cleanup of {}/{} failed: {}", bucket, key, e);
        }

        Ok(bill)
    }
}
