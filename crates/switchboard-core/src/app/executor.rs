//! RegistryExecutor - Registry を 1 本のスレッドに閉じ込める
//!
//! Registry は内部に同期機構を持たないため、登録・削除・解決はすべて
//! 専用スレッド上で直列に実行します。ロックではなく confinement で競合を防ぎます。
//!
//! # 学習ポイント
//! - `tokio::sync::mpsc` + `oneshot` による request / reply
//! - `FnOnce(&mut Registry) + Send` のジョブを送り、`!Send` な状態はスレッド側で構築する
//! - async / blocking の両方から呼べる handle
//!
//! # 流れ
//! 1. `RegistryExecutor::spawn` が名前付きスレッドを起動し、そこで `Registry` を作る
//! 2. `RegistryHandle` がジョブをキューに積む（FIFO）
//! 3. スレッドがジョブを 1 件ずつ実行し、結果を oneshot で返す

use super::config::{ConfigError, ExecutorConfig};
use crate::domain::{HandleError, Pathway};
use crate::typed::{AnyValue, Registry, Route};
use std::any::Any;
use std::thread::{self, JoinHandle, ThreadId};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, debug_span};

type Job = Box<dyn FnOnce(&mut Registry) + Send>;

enum Command {
    Run(Job),
    Stop,
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to spawn registry executor thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("registry executor thread panicked")]
    Panicked,

    #[error("shutdown_blocking called from inside an async runtime; use shutdown().await")]
    InsideRuntime,
}

/// RegistryExecutor は Registry を所有するスレッド
///
/// # 使用例
/// ```ignore
/// let executor = RegistryExecutor::spawn(&ExecutorConfig::default())?;
/// let handle = executor.handle();
///
/// handle.register_concurrent::<ProfileRoute, _>(|r| Some(erase(ProfileCard { id: r.id }))).await?;
/// let card: ProfileCard = handle.resolve_concurrent(ProfileRoute { id: 42 }).await?;
///
/// executor.shutdown().await?;
/// ```
///
/// shutdown せずに drop した場合、スレッドはすべての handle が drop されるまで動き続けます。
pub struct RegistryExecutor {
    handle: RegistryHandle,
    join: JoinHandle<()>,
}

impl RegistryExecutor {
    /// 設定を検証し、registry を所有するスレッドを起動
    pub fn spawn(config: &ExecutorConfig) -> Result<Self, ExecutorError> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let name = config.thread_name.clone();
        let join = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_loop(name, rx))?;

        let handle = RegistryHandle {
            tx,
            thread: join.thread().id(),
        };
        Ok(Self { handle, join })
    }

    /// ジョブを送るための handle を取得
    pub fn handle(&self) -> RegistryHandle {
        self.handle.clone()
    }

    /// 停止を依頼してスレッドの終了を待つ
    ///
    /// 停止はキューの末尾に積まれるので、先に積まれたジョブは実行されます。
    pub async fn shutdown(self) -> Result<(), ExecutorError> {
        // 既に止まっていれば送信は失敗するが、join の結果で判断する
        let _ = self.handle.tx.send(Command::Stop).await;
        let join = self.join;
        match tokio::task::spawn_blocking(move || join.join()).await {
            Ok(Ok(())) => Ok(()),
            _ => Err(ExecutorError::Panicked),
        }
    }

    /// `shutdown` の blocking 版
    ///
    /// async runtime のスレッド上から呼ぶと `InsideRuntime` を返します。
    /// その場合 executor は停止せず、handle がすべて drop されるまで動き続けます。
    pub fn shutdown_blocking(self) -> Result<(), ExecutorError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(ExecutorError::InsideRuntime);
        }
        let _ = self.handle.tx.blocking_send(Command::Stop);
        self.join.join().map_err(|_| ExecutorError::Panicked)
    }
}

fn run_loop(name: String, mut rx: mpsc::Receiver<Command>) {
    let _span = debug_span!("registry_executor", thread = %name).entered();
    let mut registry = Registry::new();
    debug!("registry executor started");

    while let Some(command) = rx.blocking_recv() {
        match command {
            Command::Run(job) => job(&mut registry),
            Command::Stop => break,
        }
    }

    debug!(routes = registry.len(), "registry executor stopped");
}

/// RegistryHandle は executor へジョブを送るための handle
///
/// - `Clone + Send + Sync` なので、どのスレッド・タスクにも配れる
/// - async 版のメソッドは executor の応答を await する
/// - `*_blocking` 版は async runtime の外から使う
#[derive(Clone)]
pub struct RegistryHandle {
    tx: mpsc::Sender<Command>,
    thread: ThreadId,
}

impl RegistryHandle {
    /// Registry を所有しているスレッドの ID
    pub fn executor_thread(&self) -> ThreadId {
        self.thread
    }

    /// executor が停止済みか
    pub fn is_stopped(&self) -> bool {
        self.tx.is_closed()
    }

    fn prepare<T, F>(&self, job: F) -> Result<(Command, oneshot::Receiver<T>), HandleError>
    where
        F: FnOnce(&mut Registry) -> T + Send + 'static,
        T: Send + 'static,
    {
        if thread::current().id() == self.thread {
            return Err(HandleError::Reentrant);
        }
        let (reply, receive) = oneshot::channel();
        let boxed: Job = Box::new(move |registry: &mut Registry| {
            // 呼び出し側が待つのをやめていても registry の操作は完了している
            let _ = reply.send(job(registry));
        });
        Ok((Command::Run(boxed), receive))
    }

    /// 任意のジョブを executor 上で実行して結果を返す
    pub async fn run<T, F>(&self, job: F) -> Result<T, HandleError>
    where
        F: FnOnce(&mut Registry) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (command, receive) = self.prepare(job)?;
        self.tx
            .send(command)
            .await
            .map_err(|_| HandleError::ExecutorStopped)?;
        receive.await.map_err(|_| HandleError::ExecutorStopped)
    }

    /// `run` の blocking 版
    ///
    /// executor スレッド上（handler の中など）から呼ぶと `Reentrant`、
    /// async runtime のスレッド上から呼ぶと `InsideRuntime` を返します。
    pub fn run_blocking<T, F>(&self, job: F) -> Result<T, HandleError>
    where
        F: FnOnce(&mut Registry) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (command, receive) = self.prepare(job)?;
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(HandleError::InsideRuntime);
        }
        self.tx
            .blocking_send(command)
            .map_err(|_| HandleError::ExecutorStopped)?;
        receive
            .blocking_recv()
            .map_err(|_| HandleError::ExecutorStopped)
    }

    /// Direct reducer を登録
    ///
    /// handler そのものではなく、handler を作る `Send` なファクトリを送ります。
    /// handler は executor スレッド上で構築されるので `Rc` などを捕捉できます。
    pub async fn register_with<R, F, M>(&self, make: M) -> Result<(), HandleError>
    where
        R: Route,
        F: Fn(R) -> Option<AnyValue> + 'static,
        M: FnOnce() -> F + Send + 'static,
    {
        self.run(move |registry| registry.register::<R, F>(make()))
            .await
    }

    /// Concurrent reducer を登録（handler は呼び出し側のスレッドで構築済み）
    pub async fn register_concurrent<R, F>(&self, handler: F) -> Result<(), HandleError>
    where
        R: Route,
        F: Fn(R) -> Option<AnyValue> + Send + Sync + 'static,
    {
        self.run(move |registry| registry.register_concurrent::<R, F>(handler))
            .await
    }

    /// reducer を削除。削除したエントリがあれば true
    pub async fn unregister<R: Route>(&self) -> Result<bool, HandleError> {
        self.run(|registry| registry.unregister::<R>()).await
    }

    /// Direct 経路で解決
    pub async fn resolve<R, T>(&self, route: R) -> Result<T, HandleError>
    where
        R: Route + Send,
        T: Any + Send,
    {
        let resolved = self
            .run(move |registry| registry.resolve::<R, T>(route))
            .await?;
        Ok(resolved?)
    }

    /// `resolve` の blocking 版
    pub fn resolve_blocking<R, T>(&self, route: R) -> Result<T, HandleError>
    where
        R: Route + Send,
        T: Any + Send,
    {
        let resolved = self.run_blocking(move |registry| registry.resolve::<R, T>(route))?;
        Ok(resolved?)
    }

    /// Concurrent 経路で解決
    pub async fn resolve_concurrent<R, T>(&self, route: R) -> Result<T, HandleError>
    where
        R: Route + Send,
        T: Any + Send,
    {
        let resolved = self
            .run(move |registry| registry.resolve_via::<R, T>(Pathway::Concurrent, route))
            .await?;
        Ok(resolved?)
    }
}
