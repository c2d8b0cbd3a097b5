//! Registry - route 型ごとの reducer の登録と解決
//!
//! # 学習ポイント
//! - HashMap での型消去された値（`Box<dyn Any>`）の管理
//! - Generic methods での登録と、`downcast` による静的型の復元
//! - auto trait による confinement（Direct reducer を持つ Registry は `!Send`）

use super::reducer::{ConcurrentReducer, DirectReducer, Reducer};
use super::route::{AnyValue, Route};
use crate::domain::{Pathway, ResolveError, TypeKey};
use std::any::{Any, type_name};
use std::collections::HashMap;
use tracing::{debug, trace};

/// route 型ごとに 1 つだけ保持されるエントリ
///
/// 中身は `DirectReducer<R>` / `ConcurrentReducer<R>` を型消去したもの。
/// 解決時に要求した経路の具体型へ `downcast` できなければ未登録として扱う。
enum ReducerEntry {
    Direct(Box<dyn Any>),
    Concurrent(Box<dyn Any + Send + Sync>),
}

impl ReducerEntry {
    fn pathway(&self) -> Pathway {
        match self {
            ReducerEntry::Direct(_) => Pathway::Direct,
            ReducerEntry::Concurrent(_) => Pathway::Concurrent,
        }
    }
}

/// Registry は route 型をキーに reducer を登録・解決する
///
/// # 使用例
/// ```ignore
/// let mut registry = Registry::new();
/// registry.register::<ProfileRoute, _>(|route| Some(erase(ProfileCard { id: route.id })));
///
/// let card: ProfileCard = registry.resolve(ProfileRoute { id: 42 })?;
/// ```
///
/// # Confinement
/// - 内部に同期機構は持たない
/// - 登録・削除・解決はすべて 1 つの実行コンテキスト上で行う前提
/// - スレッドをまたいで使う場合は `app::RegistryExecutor` を経由する
#[derive(Default)]
pub struct Registry {
    reducers: HashMap<TypeKey, ReducerEntry>,
}

impl Registry {
    /// 空の Registry を作成
    pub fn new() -> Self {
        Self {
            reducers: HashMap::new(),
        }
    }

    /// Direct reducer を登録（既存のエントリは経路に関係なく上書き）
    pub fn register<R, F>(&mut self, handler: F)
    where
        R: Route,
        F: Fn(R) -> Option<AnyValue> + 'static,
    {
        let reducer = DirectReducer::<R>::new(handler);
        self.insert(TypeKey::of::<R>(), ReducerEntry::Direct(Box::new(reducer)));
    }

    /// Concurrent reducer を登録（既存のエントリは経路に関係なく上書き）
    pub fn register_concurrent<R, F>(&mut self, handler: F)
    where
        R: Route,
        F: Fn(R) -> Option<AnyValue> + Send + Sync + 'static,
    {
        let reducer = ConcurrentReducer::<R>::new(handler);
        self.insert(
            TypeKey::of::<R>(),
            ReducerEntry::Concurrent(Box::new(reducer)),
        );
    }

    fn insert(&mut self, key: TypeKey, entry: ReducerEntry) {
        let pathway = entry.pathway();
        match self.reducers.insert(key, entry) {
            Some(previous) => debug!(
                route = %key,
                previous = %previous.pathway(),
                %pathway,
                "replaced route reducer"
            ),
            None => trace!(route = %key, %pathway, "registered route reducer"),
        }
    }

    /// reducer を削除。削除したエントリがあれば true
    pub fn unregister<R: Route>(&mut self) -> bool {
        let key = TypeKey::of::<R>();
        let removed = self.reducers.remove(&key).is_some();
        if removed {
            debug!(route = %key, "unregistered route reducer");
        }
        removed
    }

    /// Direct 経路で解決
    ///
    /// # 解決の流れ
    /// 1. `R` の TypeKey でエントリを引く（無い / Concurrent なら `UnregisteredRouteType`）
    /// 2. reducer を呼ぶ（`None` なら `HandlerProducedNoValue`）
    /// 3. 結果を `T` に downcast（型違いなら `ResultTypeMismatch`）
    ///
    /// 結果はキャッシュせず、毎回 reducer を呼び出します。
    pub fn resolve<R: Route, T: Any>(&self, route: R) -> Result<T, ResolveError> {
        self.resolve_via(Pathway::Direct, route)
    }

    /// Concurrent 経路で解決
    ///
    /// async な呼び出し元から await できるようにしているだけで、
    /// 内部にサスペンドポイントはありません。
    pub async fn resolve_concurrent<R: Route, T: Any>(&self, route: R) -> Result<T, ResolveError> {
        self.resolve_via(Pathway::Concurrent, route)
    }

    pub(crate) fn resolve_via<R: Route, T: Any>(
        &self,
        pathway: Pathway,
        route: R,
    ) -> Result<T, ResolveError> {
        let key = TypeKey::of::<R>();
        let produced = match (pathway, self.reducers.get(&key)) {
            (Pathway::Direct, Some(ReducerEntry::Direct(erased))) => (**erased)
                .downcast_ref::<DirectReducer<R>>()
                .map(|reducer| reducer.reduce(route)),
            (Pathway::Concurrent, Some(ReducerEntry::Concurrent(erased))) => (**erased)
                .downcast_ref::<ConcurrentReducer<R>>()
                .map(|reducer| reducer.reduce(route)),
            _ => None,
        }
        .ok_or(ResolveError::UnregisteredRouteType(key))?;

        let value = produced.ok_or(ResolveError::HandlerProducedNoValue(key))?;
        value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| ResolveError::ResultTypeMismatch {
                route: key,
                expected: type_name::<T>(),
            })
    }

    /// `R` にいずれかの経路でエントリがあるか
    pub fn contains<R: Route>(&self) -> bool {
        self.reducers.contains_key(&TypeKey::of::<R>())
    }

    /// `R` が登録されている経路
    pub fn pathway_of<R: Route>(&self) -> Option<Pathway> {
        self.pathway_for(&TypeKey::of::<R>())
    }

    /// TypeKey で登録経路を引く
    pub fn pathway_for(&self, key: &TypeKey) -> Option<Pathway> {
        self.reducers.get(key).map(ReducerEntry::pathway)
    }

    /// 登録済みの TypeKey 一覧（順序は不定）
    pub fn registered_keys(&self) -> Vec<TypeKey> {
        self.reducers.keys().copied().collect()
    }

    /// 登録済みの route 型の数
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// 登録が 1 つも無いか
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::route::erase;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct ProfileRoute {
        id: u64,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct ProfileCard {
        id: u64,
    }

    struct OtherRoute;

    fn profile_registry() -> Registry {
        let mut registry = Registry::new();
        registry.register::<ProfileRoute, _>(|route| Some(erase(ProfileCard { id: route.id })));
        registry
    }

    #[test]
    fn profile_scenario() {
        let registry = profile_registry();

        let card: ProfileCard = registry.resolve(ProfileRoute { id: 42 }).unwrap();
        assert_eq!(card, ProfileCard { id: 42 });

        let err = registry
            .resolve::<_, String>(ProfileRoute { id: 42 })
            .unwrap_err();
        assert!(matches!(err, ResolveError::ResultTypeMismatch { .. }));

        let err = registry.resolve::<_, ProfileCard>(OtherRoute).unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnregisteredRouteType(TypeKey::of::<OtherRoute>())
        );
    }

    #[rstest]
    #[case(0)]
    #[case(42)]
    #[case(u64::MAX)]
    fn round_trip_returns_handler_value(#[case] id: u64) {
        let registry = profile_registry();
        let card: ProfileCard = registry.resolve(ProfileRoute { id }).unwrap();
        assert_eq!(card.id, id);
    }

    #[test]
    fn unregistered_route_fails() {
        let registry = Registry::new();
        let err = registry
            .resolve::<_, ProfileCard>(ProfileRoute { id: 1 })
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnregisteredRouteType(TypeKey::of::<ProfileRoute>())
        );
    }

    #[test]
    fn later_registration_overwrites() {
        let first_calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&first_calls);

        let mut registry = Registry::new();
        registry.register::<ProfileRoute, _>(move |_| {
            *seen.borrow_mut() += 1;
            Some(erase("first"))
        });
        registry.register::<ProfileRoute, _>(|_| Some(erase("second")));

        let value: &str = registry.resolve(ProfileRoute { id: 1 }).unwrap();
        assert_eq!(value, "second");
        assert_eq!(*first_calls.borrow(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn overwrite_ignores_previous_pathway() {
        let mut registry = Registry::new();
        registry.register_concurrent::<ProfileRoute, _>(|_| Some(erase(1_u8)));
        registry.register::<ProfileRoute, _>(|_| Some(erase(2_u8)));

        assert_eq!(registry.pathway_of::<ProfileRoute>(), Some(Pathway::Direct));
        let value: u8 = registry.resolve(ProfileRoute { id: 1 }).unwrap();
        assert_eq!(value, 2);
    }

    #[test]
    fn unregister_removes_entry() {
        let mut registry = profile_registry();
        assert!(registry.unregister::<ProfileRoute>());

        let err = registry
            .resolve::<_, ProfileCard>(ProfileRoute { id: 1 })
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnregisteredRouteType(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_absent_is_noop() {
        let mut registry = profile_registry();
        assert!(!registry.unregister::<OtherRoute>());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn no_value_is_an_error_not_a_default() {
        let mut registry = Registry::new();
        registry.register::<ProfileRoute, _>(|_| None);

        let err = registry
            .resolve::<_, ProfileCard>(ProfileRoute { id: 1 })
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::HandlerProducedNoValue(TypeKey::of::<ProfileRoute>())
        );
    }

    #[test]
    fn mismatch_reports_requested_type() {
        let registry = profile_registry();
        let err = registry
            .resolve::<_, Option<ProfileCard>>(ProfileRoute { id: 1 })
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::ResultTypeMismatch {
                route: TypeKey::of::<ProfileRoute>(),
                expected: type_name::<Option<ProfileCard>>(),
            }
        );
    }

    #[rstest]
    #[case::direct_then_concurrent(Pathway::Direct, Pathway::Concurrent)]
    #[case::concurrent_then_direct(Pathway::Concurrent, Pathway::Direct)]
    fn pathways_are_isolated(#[case] registered: Pathway, #[case] resolved: Pathway) {
        let mut registry = Registry::new();
        match registered {
            Pathway::Direct => registry.register::<ProfileRoute, _>(|r| Some(erase(r.id))),
            Pathway::Concurrent => {
                registry.register_concurrent::<ProfileRoute, _>(|r| Some(erase(r.id)))
            }
        }

        let err = registry
            .resolve_via::<_, u64>(resolved, ProfileRoute { id: 1 })
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnregisteredRouteType(_)));

        let ok = registry.resolve_via::<_, u64>(registered, ProfileRoute { id: 1 });
        assert_eq!(ok, Ok(1));
    }

    #[test]
    fn keys_are_independent() {
        let profile_hits = Arc::new(AtomicUsize::new(0));
        let other_hits = Arc::new(AtomicUsize::new(0));

        let mut registry = Registry::new();
        let hits = Arc::clone(&profile_hits);
        registry.register::<ProfileRoute, _>(move |r| {
            hits.fetch_add(1, Ordering::SeqCst);
            Some(erase(r.id))
        });
        let hits = Arc::clone(&other_hits);
        registry.register::<OtherRoute, _>(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
            Some(erase("other"))
        });

        let id: u64 = registry.resolve(ProfileRoute { id: 5 }).unwrap();
        assert_eq!(id, 5);
        assert_eq!(profile_hits.load(Ordering::SeqCst), 1);
        assert_eq!(other_hits.load(Ordering::SeqCst), 0);

        let other: &str = registry.resolve(OtherRoute).unwrap();
        assert_eq!(other, "other");
        assert_eq!(profile_hits.load(Ordering::SeqCst), 1);
        assert_eq!(other_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_resolve_invokes_the_handler() {
        let calls = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&calls);

        let mut registry = Registry::new();
        registry.register::<ProfileRoute, _>(move |r| {
            *seen.borrow_mut() += 1;
            Some(erase(r.id))
        });

        for id in 0..3 {
            let _: u64 = registry.resolve(ProfileRoute { id }).unwrap();
        }
        assert_eq!(*calls.borrow(), 3);
    }

    #[test]
    fn introspection_reports_entries() {
        let mut registry = profile_registry();
        registry.register_concurrent::<OtherRoute, _>(|_| Some(erase(())));

        assert!(registry.contains::<ProfileRoute>());
        assert!(!registry.contains::<String>());
        assert_eq!(registry.pathway_of::<OtherRoute>(), Some(Pathway::Concurrent));
        assert_eq!(registry.pathway_of::<String>(), None);

        let mut names: Vec<_> = registry
            .registered_keys()
            .iter()
            .map(|key| key.name())
            .collect();
        names.sort();
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|name| name.ends_with("OtherRoute")));
    }

    #[tokio::test]
    async fn resolve_concurrent_round_trip() {
        let mut registry = Registry::new();
        registry.register_concurrent::<ProfileRoute, _>(|r| Some(erase(ProfileCard { id: r.id })));

        let card: ProfileCard = registry
            .resolve_concurrent(ProfileRoute { id: 9 })
            .await
            .unwrap();
        assert_eq!(card, ProfileCard { id: 9 });
    }

    #[tokio::test]
    async fn resolve_concurrent_rejects_direct_entry() {
        let registry = profile_registry();
        let err = registry
            .resolve_concurrent::<_, ProfileCard>(ProfileRoute { id: 9 })
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnregisteredRouteType(_)));
    }

    #[tokio::test]
    async fn resolve_concurrent_distinguishes_none_from_mismatch() {
        let mut registry = Registry::new();
        registry.register_concurrent::<ProfileRoute, _>(|r| (r.id > 0).then(|| erase(r.id)));

        let none = registry
            .resolve_concurrent::<_, u64>(ProfileRoute { id: 0 })
            .await
            .unwrap_err();
        assert!(matches!(none, ResolveError::HandlerProducedNoValue(_)));

        let mismatch = registry
            .resolve_concurrent::<_, u32>(ProfileRoute { id: 1 })
            .await
            .unwrap_err();
        assert!(matches!(mismatch, ResolveError::ResultTypeMismatch { .. }));
    }
}
