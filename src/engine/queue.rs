// BoundedQueue - 固定容量FIFOキュー
// open → draining → closed のライフサイクルを持つ

use super::cancellation::CancellationController;
use crate::core::{PipelineError, PipelineResult};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const STATE_OPEN: u8 = 0;
const STATE_DRAINING: u8 = 1;
const STATE_CLOSED: u8 = 2;

/// キューの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueState {
    /// 送信・受信とも可能
    Open,
    /// 新しい送信者は作れない。残りの要素は受信できる
    Draining,
    /// 終端状態
    Closed,
}

/// dequeueの結果
#[derive(Debug, PartialEq, Eq)]
pub enum Dequeued<T> {
    Item(T),
    /// 送信者が全ていなくなり、バッファも空
    Exhausted,
}

/// キャンセル可能なenqueueの結果
#[derive(Debug, PartialEq, Eq)]
pub enum EnqueueOutcome<T> {
    Enqueued,
    /// キャンセルが先に発火した。要素は呼び出し元に返す
    Cancelled(T),
}

/// 固定容量のMPMCキュー
///
/// 送信は `QueueSender` ハンドル経由でのみ行う。ハンドルは open の間しか
/// 取得できず、close は全てのハンドルが破棄された後でなければ成功しない。
/// seal 後はハンドルが残っていても送信は `QueueClosed` で失敗する。
/// 受信側は複数ワーカーで共有するため Mutex で保護する。
pub struct BoundedQueue<T> {
    name: Arc<str>,
    capacity: usize,
    state: AtomicU8,
    // seal で None になる。送信の確定もこのロックの下で行う
    gate: Arc<Mutex<Option<mpsc::Sender<T>>>>,
    sealed: CancellationToken,
    receiver: tokio::sync::Mutex<mpsc::Receiver<T>>,
    buffered: Arc<AtomicUsize>,
    leases: Arc<()>,
}

impl<T: Send> BoundedQueue<T> {
    /// 新しいキューを作成（容量は1以上）
    pub fn new(name: impl Into<String>, capacity: usize) -> PipelineResult<Self> {
        let name: String = name.into();
        if capacity == 0 {
            return Err(PipelineError::configuration(format!(
                "キュー '{name}' の容量は1以上である必要があります"
            )));
        }

        let (tx, rx) = mpsc::channel(capacity);
        Ok(Self {
            name: Arc::from(name),
            capacity,
            state: AtomicU8::new(STATE_OPEN),
            gate: Arc::new(Mutex::new(Some(tx))),
            sealed: CancellationToken::new(),
            receiver: tokio::sync::Mutex::new(rx),
            buffered: Arc::new(AtomicUsize::new(0)),
            leases: Arc::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// バッファ内の要素数
    pub fn len(&self) -> usize {
        self.buffered.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> QueueState {
        match self.state.load(Ordering::Acquire) {
            STATE_OPEN => QueueState::Open,
            STATE_DRAINING => QueueState::Draining,
            _ => QueueState::Closed,
        }
    }

    /// 生存している送信ハンドル数
    pub fn active_senders(&self) -> usize {
        Arc::strong_count(&self.leases) - 1
    }

    /// 送信ハンドルを取得
    pub fn sender(&self) -> PipelineResult<QueueSender<T>> {
        let guard = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(tx) if self.state() == QueueState::Open => Ok(QueueSender {
                queue: Arc::clone(&self.name),
                inner: tx.clone(),
                gate: Arc::clone(&self.gate),
                sealed: self.sealed.clone(),
                buffered: Arc::clone(&self.buffered),
                _lease: Arc::clone(&self.leases),
            }),
            _ => Err(PipelineError::queue_closed(self.name())),
        }
    }

    /// 次の要素を受信
    ///
    /// draining で空になると `Exhausted` を返す。
    /// キャンセルセーフ: 完了前にFutureを破棄しても要素は失われない。
    pub async fn dequeue(&self) -> PipelineResult<Dequeued<T>> {
        if self.state() == QueueState::Closed {
            return Err(PipelineError::queue_closed(self.name()));
        }

        let mut rx = self.receiver.lock().await;
        let received = tokio::select! {
            biased;
            item = rx.recv() => item,
            // seal 前に確定した送信は全てバッファに入っている
            _ = self.sealed.cancelled() => rx.try_recv().ok(),
        };

        match received {
            Some(item) => {
                self.buffered.fetch_sub(1, Ordering::AcqRel);
                Ok(Dequeued::Item(item))
            }
            None => Ok(Dequeued::Exhausted),
        }
    }

    /// open → draining
    ///
    /// 以降の送信は失敗し、受信側は残りを取り出した後に `Exhausted` を返す。
    pub fn seal(&self) {
        let mut guard = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        guard.take();
        let _ = self.state.compare_exchange(
            STATE_OPEN,
            STATE_DRAINING,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        self.sealed.cancel();
    }

    /// closed へ遷移し、バッファに残っていた要素数を返す
    ///
    /// 送信ハンドルが残っている、または消費者が受信待ちの場合は
    /// `ShutdownOrderViolation` を返す。その場合もキューは draining のまま残る。
    pub fn close(&self) -> PipelineResult<usize> {
        let mut rx = self.receiver.try_lock().map_err(|_| {
            PipelineError::shutdown_order(self.name(), "受信待ちのワーカーが残っています")
        })?;

        if self.state() == QueueState::Closed {
            return Err(PipelineError::queue_closed(self.name()));
        }

        self.seal();
        let senders = self.active_senders();
        if senders > 0 {
            return Err(PipelineError::shutdown_order(
                self.name(),
                format!("送信ハンドルが{senders}個残っています"),
            ));
        }

        self.state.store(STATE_CLOSED, Ordering::Release);
        rx.close();

        let mut discarded = 0;
        while rx.try_recv().is_ok() {
            discarded += 1;
        }
        self.buffered.store(0, Ordering::Release);
        Ok(discarded)
    }
}

/// キューへの送信ハンドル
pub struct QueueSender<T> {
    queue: Arc<str>,
    inner: mpsc::Sender<T>,
    gate: Arc<Mutex<Option<mpsc::Sender<T>>>>,
    sealed: CancellationToken,
    buffered: Arc<AtomicUsize>,
    _lease: Arc<()>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
            inner: self.inner.clone(),
            gate: Arc::clone(&self.gate),
            sealed: self.sealed.clone(),
            buffered: Arc::clone(&self.buffered),
            _lease: Arc::clone(&self._lease),
        }
    }
}

impl<T: Send> QueueSender<T> {
    pub fn queue_name(&self) -> &str {
        &self.queue
    }

    /// 空きができるまで待って送信
    ///
    /// 待機中にキューが seal された場合は `QueueClosed` を返す。
    pub async fn enqueue(&self, item: T) -> PipelineResult<()> {
        tokio::select! {
            biased;
            _ = self.sealed.cancelled() => Err(PipelineError::queue_closed(self.queue_name())),
            permit = self.inner.reserve() => {
                let permit = permit.map_err(|_| PipelineError::queue_closed(self.queue_name()))?;
                self.push(permit, item)
            }
        }
    }

    /// 空き待ちをキャンセルで中断できる送信
    ///
    /// 先に容量を予約してから送るため、中断時は要素をそのまま返せる。
    /// キャンセル済みなら送信は試みない。
    pub async fn enqueue_until(
        &self,
        item: T,
        cancellation: &CancellationController,
    ) -> PipelineResult<EnqueueOutcome<T>> {
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Ok(EnqueueOutcome::Cancelled(item)),
            _ = self.sealed.cancelled() => Err(PipelineError::queue_closed(self.queue_name())),
            permit = self.inner.reserve() => {
                let permit = permit.map_err(|_| PipelineError::queue_closed(self.queue_name()))?;
                self.push(permit, item)?;
                Ok(EnqueueOutcome::Enqueued)
            }
        }
    }

    // 確定は seal と同じロックの下で行う。受信側の減算より先に数える
    fn push(&self, permit: mpsc::Permit<'_, T>, item: T) -> PipelineResult<()> {
        let gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if gate.is_none() {
            return Err(PipelineError::queue_closed(self.queue_name()));
        }
        self.buffered.fetch_add(1, Ordering::AcqRel);
        permit.send(item);
        Ok(())
    }
}
