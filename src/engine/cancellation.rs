// CancellationController - 一度だけ発火するブロードキャスト停止シグナル

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// プロセス全体の停止シグナル
///
/// armed → tripped の一方向遷移のみ。全てのProducer・ワーカーは
/// `cancelled()` を `select!` の待機点に組み込んで観測する。
#[derive(Debug, Clone, Default)]
pub struct CancellationController {
    token: CancellationToken,
    raised: Arc<AtomicBool>,
}

impl CancellationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// 停止シグナルを発火
    ///
    /// 最初の呼び出しのみ `true` を返す。2回目以降は何もしない。
    pub fn raise(&self) -> bool {
        let first = !self.raised.swap(true, Ordering::AcqRel);
        self.token.cancel();
        first
    }

    /// ノンブロッキングな観測
    pub fn is_raised(&self) -> bool {
        self.token.is_cancelled()
    }

    /// 発火するまで待機
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// 外部向けの停止ハンドル
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            controller: self.clone(),
        }
    }
}

/// 外部（CLIやタイマー）から停止を要求するためのハンドル
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    controller: CancellationController,
}

impl ShutdownHandle {
    /// 停止を要求。最初の要求のみ `true`
    pub fn cancel(&self) -> bool {
        self.controller.raise()
    }

    pub fn is_cancelled(&self) -> bool {
        self.controller.is_raised()
    }
}
