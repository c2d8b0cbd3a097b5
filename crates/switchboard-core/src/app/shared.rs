//! Shared - プロセス全体で共有する既定の registry
//!
//! 既定インスタンスは `install_shared` で明示的に 1 度だけ構築します。
//! 各 API は handle を引数で受け取るので、テストでは独立した executor を使えます。

use super::config::ExecutorConfig;
use super::executor::{ExecutorError, RegistryExecutor, RegistryHandle};
use std::sync::{Mutex, OnceLock};
use thiserror::Error;
use tracing::info;

static SHARED: OnceLock<RegistryHandle> = OnceLock::new();
static INSTALL: Mutex<()> = Mutex::new(());

#[derive(Debug, Error)]
pub enum SharedError {
    #[error("shared registry is already installed")]
    AlreadyInstalled,

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

/// 既定の registry executor を起動して登録する
///
/// executor スレッドはプロセス終了まで動き続けます（明示的な後始末はしない）。
///
/// # Panics と再インストール
/// handler の panic は捕捉しません。既定インスタンス上で handler が panic すると
/// executor スレッドは終了し、以降の呼び出しはすべて `HandleError::ExecutorStopped` になります。
/// `install_shared` はプロセス内で 1 度しか成功しないため、作り直すことはできません。
/// panic しうる handler は独立した `RegistryExecutor` に登録してください。
pub fn install_shared(config: &ExecutorConfig) -> Result<&'static RegistryHandle, SharedError> {
    // 並行に呼ばれても executor を 2 本起動しない
    let _guard = INSTALL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if SHARED.get().is_some() {
        return Err(SharedError::AlreadyInstalled);
    }

    let executor = RegistryExecutor::spawn(config)?;
    let handle = SHARED.get_or_init(|| executor.handle());
    info!(thread = %config.thread_name, "installed shared route registry");
    Ok(handle)
}

/// 既定の registry（未インストールなら None）
pub fn shared() -> Option<&'static RegistryHandle> {
    SHARED.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::erase;

    struct SharedRoute;

    // SHARED はプロセス内で 1 度しか設定できないので 1 つのテストにまとめる
    #[tokio::test]
    async fn install_once_then_reuse() {
        let config = ExecutorConfig::default().with_thread_name("registry-shared-test");
        let handle = install_shared(&config).unwrap();
        assert!(matches!(
            install_shared(&config),
            Err(SharedError::AlreadyInstalled)
        ));

        handle
            .register_concurrent::<SharedRoute, _>(|_| Some(erase("shared")))
            .await
            .unwrap();

        let again = shared().unwrap();
        let value: &str = again.resolve_concurrent(SharedRoute).await.unwrap();
        assert_eq!(value, "shared");
        assert_eq!(handle.executor_thread(), again.executor_thread());
    }
}
