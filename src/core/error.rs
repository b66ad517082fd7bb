// Custom error types for the order pipeline
// パイプライン専用のカスタムエラー型定義

use super::types::Stage;
use thiserror::Error;

/// パイプライン固有のエラー型
#[derive(Error, Debug)]
pub enum PipelineError {
    /// 既に受付を終えたキューへの操作（契約違反）
    #[error("キューは既に閉じられています: {queue}")]
    QueueClosed { queue: String },

    /// 送信者・消費者が残っている状態でのclose（契約違反）
    #[error("シャットダウン順序違反: {queue} - {reason}")]
    ShutdownOrderViolation { queue: String, reason: String },

    #[error("下流ステージが停止しています: {stage}")]
    DownstreamStopped { stage: Stage },

    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("設定ファイルエラー: {path} - {source}")]
    ConfigFileError {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// ワーカータスクのパニック・中断
    #[error("タスクエラー: {message}")]
    TaskError { message: String },
}

impl PipelineError {
    /// キュー閉鎖エラーの作成
    pub fn queue_closed(queue: impl Into<String>) -> Self {
        Self::QueueClosed {
            queue: queue.into(),
        }
    }

    /// シャットダウン順序違反の作成
    pub fn shutdown_order(queue: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ShutdownOrderViolation {
            queue: queue.into(),
            reason: reason.into(),
        }
    }

    pub fn downstream_stopped(stage: Stage) -> Self {
        Self::DownstreamStopped { stage }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn config_file(path: impl Into<String>, source: anyhow::Error) -> Self {
        Self::ConfigFileError {
            path: path.into(),
            source,
        }
    }

    /// タスクエラーの作成
    ///
    /// パニックの場合はペイロードのメッセージを取り出す。
    pub fn task(join_error: tokio::task::JoinError) -> Self {
        let message = if join_error.is_panic() {
            let payload = join_error.into_panic();
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic payload".to_string());
            format!("panicked: {detail}")
        } else {
            join_error.to_string()
        };
        Self::TaskError { message }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::QueueClosed { .. } | Self::ShutdownOrderViolation { .. } => {
                ErrorSeverity::Critical
            }
            Self::ConfigurationError { .. } | Self::ConfigFileError { .. } => ErrorSeverity::High,
            Self::DownstreamStopped { .. } | Self::TaskError { .. } => ErrorSeverity::Medium,
        }
    }

    /// エラーが回復可能かどうかを判定
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::QueueClosed { .. } | Self::ShutdownOrderViolation { .. } => false,
            Self::ConfigurationError { .. } | Self::ConfigFileError { .. } => false,
            Self::DownstreamStopped { .. } => true,
            Self::TaskError { .. } => true,
        }
    }

    /// シャットダウン手順の契約違反かどうか
    ///
    /// これらは再試行せず、シャットダウン完了後に呼び出し元へ返す。
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::QueueClosed { .. } | Self::ShutdownOrderViolation { .. }
        )
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - ログ出力程度
    Low,
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的 - システム停止レベル
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// パイプラインの結果型
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

impl From<tokio::task::JoinError> for PipelineError {
    fn from(error: tokio::task::JoinError) -> Self {
        PipelineError::task(error)
    }
}
