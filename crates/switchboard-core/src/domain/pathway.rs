//! Pathway - reducer の登録経路

use std::fmt;

/// Pathway は reducer がどの入口で登録されたかを表す
///
/// 解決は登録時と同じ経路でしか成功しません。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pathway {
    /// スレッド境界を持たない通常の handler
    Direct,
    /// `Send + Sync` が保証された handler
    Concurrent,
}

impl fmt::Display for Pathway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pathway::Direct => f.write_str("direct"),
            Pathway::Concurrent => f.write_str("concurrent"),
        }
    }
}
