//! 服务操作监控

use std::time::Instant;

use cms_errors::AppResult;
use metrics::{counter, histogram};

/// 慢操作阈值 (毫秒)
const SLOW_OPERATION_MS: u128 = 100;

/// 用于计时的守卫结构
pub struct OperationTimer {
    start: Instant,
    operation: &'static str,
}

impl OperationTimer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }

    /// 记录耗时与结果，原样返回结果
    pub fn finish<T>(self, result: AppResult<T>) -> AppResult<T> {
        let duration_ms = self.start.elapsed().as_millis();

        histogram!("role_service_operation_duration_ms", "operation" => self.operation)
            .record(duration_ms as f64);
        counter!("role_service_operations_total", "operation" => self.operation).increment(1);

        if let Err(ref err) = result {
            counter!(
                "role_service_errors_total",
                "operation" => self.operation,
                "kind" => err.kind()
            )
            .increment(1);
            tracing::debug!(operation = self.operation, kind = err.kind(), error = %err, "Operation failed");
        }

        if duration_ms > SLOW_OPERATION_MS {
            tracing::warn!(
                operation = self.operation,
                duration_ms = %duration_ms,
                "Slow role service operation"
            );
        }

        result
    }
}

/// 计时执行一个操作
pub fn observe<T>(operation: &'static str, f: impl FnOnce() -> AppResult<T>) -> AppResult<T> {
    OperationTimer::new(operation).finish(f())
}
