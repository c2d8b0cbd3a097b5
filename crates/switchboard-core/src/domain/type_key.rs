//! TypeKey - route 型の同一性
//!
//! # 学習ポイント
//! - `TypeId` による型の同一性（構造ではなく型そのもので区別）
//! - 比較に使うフィールドと表示用フィールドの分離（手書きの PartialEq / Hash）

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// TypeKey は route 型から導出されるマップのキー
///
/// # 使用例
/// ```ignore
/// struct ProfileRoute { id: u64 }
/// struct OtherRoute;
///
/// assert_eq!(TypeKey::of::<ProfileRoute>(), TypeKey::of::<ProfileRoute>());
/// assert_ne!(TypeKey::of::<ProfileRoute>(), TypeKey::of::<OtherRoute>());
/// ```
///
/// # 同一性
/// - 等価性とハッシュは `TypeId` のみで決まる
/// - `name` はエラーメッセージ用。`type_name` は一意性が保証されないので比較には使わない
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// 型 `R` の TypeKey を導出
    pub fn of<R: 'static>() -> Self {
        Self {
            id: TypeId::of::<R>(),
            name: type_name::<R>(),
        }
    }

    /// route 型の名前（診断用）
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
