//! Errors - 解決時のエラー分類
//!
//! 解決（resolve）が返すエラーは 3 種類のみ。どれも想定内の失敗で、
//! registry 自身はログも再試行もフォールバックもしない。
//!
//! # 呼び出し側での分岐例
//! - `UnregisteredRouteType`: 機能が配線されていない
//! - `HandlerProducedNoValue`: handler が値を返さなかった
//! - `ResultTypeMismatch`: 要求した出力型が誤っている（プログラミングミス）

use super::type_key::TypeKey;
use thiserror::Error;

/// ResolveError は resolve / resolve_concurrent の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// エントリが無い、または別の経路（Direct / Concurrent）で登録されている
    #[error("no reducer registered for route type `{0}` on this pathway")]
    UnregisteredRouteType(TypeKey),

    #[error("reducer for route type `{0}` produced no value")]
    HandlerProducedNoValue(TypeKey),

    #[error("reducer for route type `{route}` produced a value that is not `{expected}`")]
    ResultTypeMismatch {
        route: TypeKey,
        expected: &'static str,
    },
}

impl ResolveError {
    /// 失敗した route 型の TypeKey
    pub fn route(&self) -> TypeKey {
        match self {
            ResolveError::UnregisteredRouteType(route)
            | ResolveError::HandlerProducedNoValue(route)
            | ResolveError::ResultTypeMismatch { route, .. } => *route,
        }
    }
}

/// HandleError は confinement executor 経由の操作エラー
///
/// 解決エラーはそのまま透過し、executor 固有の失敗だけを追加します。
#[derive(Debug, Error)]
pub enum HandleError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// executor が停止済み（shutdown 済み、または handler の panic で終了）
    #[error("registry executor has stopped")]
    ExecutorStopped,

    /// executor スレッド自身からのブロッキング呼び出し（デッドロックになる）
    #[error("blocking registry call issued from the registry executor thread")]
    Reentrant,

    /// async runtime のスレッド上からのブロッキング呼び出し（tokio が panic する）
    #[error("blocking registry call issued from inside an async runtime")]
    InsideRuntime,
}

impl HandleError {
    /// 解決エラーであればそれを返す
    pub fn as_resolve(&self) -> Option<&ResolveError> {
        match self {
            HandleError::Resolve(err) => Some(err),
            _ => None,
        }
    }
}
