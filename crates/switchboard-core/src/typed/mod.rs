//! Typed - 型付き registry API
//!
//! route 型を TypeKey に変換し、型消去した reducer を登録・解決します。
//!
//! # 二層構造
//! - **表層（Typed）**: `register::<R, _>`, `resolve::<R, T>` - 型安全
//! - **内部（Dyn）**: `Box<dyn Any>` に格納された reducer と結果 - type erasure

pub mod reducer;
pub mod registry;
pub mod routable;
pub mod route;

pub use self::reducer::{ConcurrentReducer, DirectReducer, Reducer};
pub use self::registry::Registry;
pub use self::routable::Routable;
pub use self::route::{AnyValue, Route, erase};
