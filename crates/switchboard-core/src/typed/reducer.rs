//! Reducer - route の値を受け取り、型消去された結果を返す handler
//!
//! # 学習ポイント
//! - ジェネリック trait (`Reducer<R>`)
//! - クロージャの Box 化と trait object の auto trait（`+ Send + Sync`）
//! - 同じ呼び出し規約で、構築時の契約だけが異なる 2 つの variant
//!
//! # Direct と Concurrent
//! - `DirectReducer<R>`: スレッド境界なし。`Rc` などを捕捉してよい
//! - `ConcurrentReducer<R>`: 捕捉したものが `Send + Sync` であることをコンパイル時に要求
//!
//! どちらも呼び出しは 1 回の直接呼び出しで、スケジューリングも再試行もしません。

use super::route::{AnyValue, Route};

/// Reducer は route の値を受け取り、値があれば `Some` を返す
pub trait Reducer<R: Route> {
    fn reduce(&self, route: R) -> Option<AnyValue>;
}

/// スレッド境界を持たない reducer
pub struct DirectReducer<R: Route> {
    handler: Box<dyn Fn(R) -> Option<AnyValue>>,
}

impl<R: Route> DirectReducer<R> {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(R) -> Option<AnyValue> + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }
}

impl<R: Route> Reducer<R> for DirectReducer<R> {
    fn reduce(&self, route: R) -> Option<AnyValue> {
        (self.handler)(route)
    }
}

/// 他スレッドで構築・受け渡しできる reducer
///
/// `F: Send + Sync` を要求するのは構築時のみです。
/// 呼び出し自体は DirectReducer と同じく confinement された側で行われます。
pub struct ConcurrentReducer<R: Route> {
    handler: Box<dyn Fn(R) -> Option<AnyValue> + Send + Sync>,
}

impl<R: Route> ConcurrentReducer<R> {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(R) -> Option<AnyValue> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }
}

impl<R: Route> Reducer<R> for ConcurrentReducer<R> {
    fn reduce(&self, route: R) -> Option<AnyValue> {
        (self.handler)(route)
    }
}
