//! App - アプリケーション層
//!
//! typed の Registry を、複数モジュール・複数スレッドから使える形にまとめます。
//!
//! # 主要コンポーネント
//! - **RegistryBuilder**: 起動時検証付きの Registry 構築
//! - **RegistryExecutor / RegistryHandle**: Registry を 1 本のスレッドに閉じ込める
//! - **RouteModule / ModuleSet**: モジュール単位の配線
//! - **install_shared / shared**: プロセス全体の既定インスタンス

pub mod builder;
pub mod config;
pub mod executor;
pub mod module;
pub mod shared;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, RegistryBuilder};
pub use self::config::{ConfigError, ExecutorConfig};
pub use self::executor::{ExecutorError, RegistryExecutor, RegistryHandle};
pub use self::module::{ModuleSet, RouteModule, WiringError};
pub use self::shared::{SharedError, install_shared, shared};
