//! Route - route 型と型消去された値
//!
//! # 学習ポイント
//! - ブランケット実装による marker trait
//! - `Box<dyn Any>` による値の型消去と、`downcast` による型の復元

use std::any::Any;

/// Route はディスパッチのキー兼 handler の入力になる型
///
/// `'static` な型はすべて Route になれます。
/// route 型は構造ではなく型そのもの（`TypeId`）で区別されます。
pub trait Route: 'static {}

impl<T: 'static> Route for T {}

/// handler が返す型消去された値
pub type AnyValue = Box<dyn Any>;

/// 値を `AnyValue` に包む
///
/// # 使用例
/// ```ignore
/// registry.register::<ProfileRoute, _>(|route| Some(erase(ProfileCard { id: route.id })));
/// ```
pub fn erase<T: Any>(value: T) -> AnyValue {
    Box::new(value)
}
