//! RegistryBuilder - 起動時検証付きの Registry 構築
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 開発体験の改善（どの route 型が足りないかをエラーで示す）

use crate::domain::TypeKey;
use crate::typed::{AnyValue, Registry, Route};

/// RegistryBuilder は Registry を構築
///
/// # 使用例
/// ```ignore
/// let registry = RegistryBuilder::new()
///     .register::<ProfileRoute, _>(|r| Some(erase(ProfileCard { id: r.id })))
///     .expect::<ProfileRoute>()
///     .expect::<SettingsRoute>()
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect() で期待される route 型を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
/// - 不足があれば BuildError を返す
#[derive(Default)]
pub struct RegistryBuilder {
    registry: Registry,
    expected: Vec<TypeKey>,
}

/// BuildError は Registry 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing route types: {0:?}. These routes were expected but not registered.")]
    MissingRouteTypes(Vec<TypeKey>),
}

impl RegistryBuilder {
    /// 新しい RegistryBuilder を作成
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            expected: Vec::new(),
        }
    }

    /// 既存の Registry から始める
    pub fn from_registry(registry: Registry) -> Self {
        Self {
            registry,
            expected: Vec::new(),
        }
    }

    /// Direct reducer を登録
    pub fn register<R, F>(mut self, handler: F) -> Self
    where
        R: Route,
        F: Fn(R) -> Option<AnyValue> + 'static,
    {
        self.registry.register::<R, F>(handler);
        self
    }

    /// Concurrent reducer を登録
    pub fn register_concurrent<R, F>(mut self, handler: F) -> Self
    where
        R: Route,
        F: Fn(R) -> Option<AnyValue> + Send + Sync + 'static,
    {
        self.registry.register_concurrent::<R, F>(handler);
        self
    }

    /// build 時に登録済みであるべき route 型を追加
    pub fn expect<R: Route>(mut self) -> Self {
        self.expected.push(TypeKey::of::<R>());
        self
    }

    /// 検証して Registry を返す
    ///
    /// 経路（Direct / Concurrent）は問わず、エントリがあれば登録済みとみなします。
    pub fn build(self) -> Result<Registry, BuildError> {
        let missing = missing_route_types(&self.registry, &self.expected);
        if !missing.is_empty() {
            return Err(BuildError::MissingRouteTypes(missing));
        }
        Ok(self.registry)
    }
}

/// `expected` のうち registry に無い route 型（重複は 1 つにまとめる）
pub(crate) fn missing_route_types(registry: &Registry, expected: &[TypeKey]) -> Vec<TypeKey> {
    let mut missing: Vec<TypeKey> = Vec::new();
    for key in expected {
        if registry.pathway_for(key).is_none() && !missing.contains(key) {
            missing.push(*key);
        }
    }
    missing
}
