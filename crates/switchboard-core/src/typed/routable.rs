//! Routable - route 型自身から登録・解決するための糖衣
//!
//! 暗黙のグローバルには触れず、必ず registry を引数で受け取ります。
//! 空の impl を書くだけで使えます。
//!
//! ```ignore
//! impl Routable for ProfileRoute {}
//!
//! ProfileRoute::register_in(&mut registry, |route| Some(erase(ProfileCard { id: route.id })));
//! let card: ProfileCard = ProfileRoute { id: 42 }.resolve_in(&registry)?;
//! ```

use super::registry::Registry;
use super::route::{AnyValue, Route};
use crate::domain::ResolveError;
use std::any::Any;
use std::future::Future;

pub trait Routable: Route + Sized {
    fn register_in<F>(registry: &mut Registry, handler: F)
    where
        F: Fn(Self) -> Option<AnyValue> + 'static,
    {
        registry.register::<Self, F>(handler);
    }

    fn register_concurrent_in<F>(registry: &mut Registry, handler: F)
    where
        F: Fn(Self) -> Option<AnyValue> + Send + Sync + 'static,
    {
        registry.register_concurrent::<Self, F>(handler);
    }

    fn unregister_from(registry: &mut Registry) -> bool {
        registry.unregister::<Self>()
    }

    fn resolve_in<T: Any>(self, registry: &Registry) -> Result<T, ResolveError> {
        registry.resolve::<Self, T>(self)
    }

    fn resolve_concurrent_in<T: Any>(
        self,
        registry: &Registry,
    ) -> impl Future<Output = Result<T, ResolveError>> {
        registry.resolve_concurrent::<Self, T>(self)
    }
}
