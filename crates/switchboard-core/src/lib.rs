//! switchboard-core
//!
//! Type-keyed route registry: モジュール同士が互いを import せずに連携するための仕組み。
//! あるモジュールが route 型に handler を登録し、別のモジュールがその route 型の値を
//! 具体的なオブジェクトへ解決します。
//!
//! # モジュール構成
//! - **domain**: TypeKey, Pathway, エラー分類（ResolveError, HandleError）
//! - **typed**: Route, Reducer（Direct / Concurrent）, Registry, Routable
//! - **app**: RegistryBuilder, RegistryExecutor / RegistryHandle, RouteModule, 既定インスタンス
//!
//! # 使用例
//! ```ignore
//! use switchboard_core::prelude::*;
//!
//! let mut registry = Registry::new();
//! registry.register::<ProfileRoute, _>(|route| Some(erase(ProfileCard { id: route.id })));
//!
//! let card: ProfileCard = registry.resolve(ProfileRoute { id: 42 })?;
//! ```

pub mod app;
pub mod domain;
pub mod typed;

pub mod prelude {
    pub use crate::app::{
        ExecutorConfig, ModuleSet, RegistryBuilder, RegistryExecutor, RegistryHandle,
        RouteModule, install_shared, shared,
    };
    pub use crate::domain::{HandleError, Pathway, ResolveError, TypeKey};
    pub use crate::typed::{AnyValue, Registry, Routable, Route, erase};
}
