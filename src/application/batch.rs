//! 顺序批处理原语
//!
//! 对条目序列做显式 fold，产出 (successes, failures) 对:
//! - 严格按序、逐条执行（不并发），以便给出有意义的增量进度信号
//!   并避免对远端供应商产生无界并发压力
//! - 单条失败在条目边界内捕获并记录，绝不中断剩余条目；
//!   部分成功是合法的终态而非错误

use futures_util::future::BoxFuture;

/// 批处理中单条失败记录
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub index: usize,
    pub label: String,
    pub error: String,
}

/// 批处理结果
///
/// 成功与失败均保持原始顺序
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub successes: Vec<(String, T)>,
    pub failures: Vec<BatchFailure>,
}

impl<T> BatchOutcome<T> {
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 顺序执行批处理
///
/// `op(index)` 处理第 index 个条目；`progress(done, total)` 在每个
/// 条目开始前触发一次
pub async fn run_batch<'a, T>(
    labels: &[String],
    mut op: impl FnMut(usize) -> BoxFuture<'a, Result<T, String>>,
    mut progress: impl FnMut(usize, usize),
) -> BatchOutcome<T> {
    let total = labels.len();
    let mut outcome = BatchOutcome {
        successes: Vec::new(),
        failures: Vec::new(),
    };

    for (index, label) in labels.iter().enumerate() {
        progress(index, total);

        match op(index).await {
            Ok(value) => outcome.successes.push((label.clone(), value)),
            Err(error) => {
                tracing::warn!(
                    index = index,
                    label = %label,
                    error = %error,
                    "Batch item failed, continuing"
                );
                outcome.failures.push(BatchFailure {
                    index,
                    label: label.clone(),
                    error,
                });
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::FutureExt;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("item-{}", i)).collect()
    }

    #[tokio::test]
    async fn test_all_items_succeed() {
        let labels = labels(3);
        let outcome = run_batch(
            &labels,
            |i| async move { Ok::<_, String>(i * 10) }.boxed(),
            |_, _| {},
        )
        .await;

        assert!(outcome.is_complete());
        assert_eq!(outcome.total(), 3);
        assert_eq!(
            outcome.successes,
            vec![
                ("item-0".to_string(), 0),
                ("item-1".to_string(), 10),
                ("item-2".to_string(), 20)
            ]
        );
    }

    #[tokio::test]
    async fn test_single_failure_does_not_abort_batch() {
        let labels = labels(4);
        let outcome = run_batch(
            &labels,
            |i| {
                async move {
                    if i == 1 {
                        Err("engineered failure".to_string())
                    } else {
                        Ok(i)
                    }
                }
                .boxed()
            },
            |_, _| {},
        )
        .await;

        assert_eq!(outcome.total(), 4);
        assert_eq!(outcome.successes.len(), 3);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 1);
        assert_eq!(outcome.failures[0].label, "item-1");
        assert_eq!(outcome.failures[0].error, "engineered failure");
        // 失败条目之后的条目仍按序完成
        let keys: Vec<&str> = outcome.successes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["item-0", "item-2", "item-3"]);
    }

    #[tokio::test]
    async fn test_progress_fires_before_each_item() {
        let labels = labels(3);
        let mut ticks = Vec::new();
        let _ = run_batch(
            &labels,
            |i| async move { Ok::<_, String>(i) }.boxed(),
            |done, total| ticks.push((done, total)),
        )
        .await;

        assert_eq!(ticks, vec![(0, 3), (1, 3), (2, 3)]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let outcome = run_batch(
            &[],
            |_| async move { Ok::<_, String>(()) }.boxed(),
            |_, _| {},
        )
        .await;
        assert_eq!(outcome.total(), 0);
        assert!(outcome.is_complete());
    }
}
