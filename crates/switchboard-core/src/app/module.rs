//! RouteModule - モジュール単位での route の配線
//!
//! 各モジュールは自分の route 型と handler だけを知っていれば良く、
//! 他のモジュールの具体型を import せずに registry 経由で連携できます。

use super::builder::missing_route_types;
use super::executor::RegistryHandle;
use crate::domain::{HandleError, TypeKey};
use crate::typed::Route;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// RouteModule は自分の route を registry に登録する
///
/// # 使用例
/// ```ignore
/// struct ProfileModule;
///
/// #[async_trait]
/// impl RouteModule for ProfileModule {
///     fn name(&self) -> &str {
///         "profile"
///     }
///
///     async fn wire(&self, registry: &RegistryHandle) -> Result<(), HandleError> {
///         registry
///             .register_concurrent::<ProfileRoute, _>(|r| Some(erase(ProfileCard { id: r.id })))
///             .await
///     }
/// }
/// ```
#[async_trait]
pub trait RouteModule: Send + Sync {
    fn name(&self) -> &str;

    async fn wire(&self, registry: &RegistryHandle) -> Result<(), HandleError>;
}

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("module `{module}` failed to wire its routes: {source}")]
    Module {
        module: String,
        #[source]
        source: HandleError,
    },

    #[error("Missing route types after wiring: {0:?}")]
    MissingRouteTypes(Vec<TypeKey>),

    #[error(transparent)]
    Registry(#[from] HandleError),
}

/// ModuleSet はモジュールと期待される route 型の集合
///
/// `install` は追加順にモジュールを配線し、最後に期待集合を検証します。
#[derive(Default)]
pub struct ModuleSet {
    modules: Vec<Arc<dyn RouteModule>>,
    expected: Vec<TypeKey>,
}

impl ModuleSet {
    /// 空の ModuleSet を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// モジュールを追加
    pub fn with(mut self, module: impl RouteModule + 'static) -> Self {
        self.modules.push(Arc::new(module));
        self
    }

    pub fn with_shared(mut self, module: Arc<dyn RouteModule>) -> Self {
        self.modules.push(module);
        self
    }

    /// install 後に登録済みであるべき route 型を追加
    pub fn expect<R: Route>(mut self) -> Self {
        self.expected.push(TypeKey::of::<R>());
        self
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|module| module.name()).collect()
    }

    /// 追加順に配線し、期待集合を検証
    pub async fn install(&self, registry: &RegistryHandle) -> Result<(), WiringError> {
        for module in &self.modules {
            debug!(module = module.name(), "wiring route module");
            module
                .wire(registry)
                .await
                .map_err(|source| WiringError::Module {
                    module: module.name().to_string(),
                    source,
                })?;
        }

        let expected = self.expected.clone();
        let missing = registry
            .run(move |registry| missing_route_types(registry, &expected))
            .await?;
        if !missing.is_empty() {
            return Err(WiringError::MissingRouteTypes(missing));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ExecutorConfig, RegistryExecutor};
    use crate::typed::erase;

    #[derive(Debug, PartialEq)]
    struct ProfileRoute {
        id: u64,
    }

    #[derive(Debug, PartialEq)]
    struct ProfileCard {
        id: u64,
    }

    struct FeedRoute;

    struct ProfileModule;

    #[async_trait]
    impl RouteModule for ProfileModule {
        fn name(&self) -> &str {
            "profile"
        }

        async fn wire(&self, registry: &RegistryHandle) -> Result<(), HandleError> {
            registry
                .register_concurrent::<ProfileRoute, _>(|r| Some(erase(ProfileCard { id: r.id })))
                .await
        }
    }

    struct FeedModule;

    #[async_trait]
    impl RouteModule for FeedModule {
        fn name(&self) -> &str {
            "feed"
        }

        async fn wire(&self, registry: &RegistryHandle) -> Result<(), HandleError> {
            registry
                .register_with::<FeedRoute, _, _>(|| |_: FeedRoute| Some(erase(vec![1_u64, 2, 3])))
                .await
        }
    }

    fn spawn_executor(name: &str) -> RegistryExecutor {
        RegistryExecutor::spawn(&ExecutorConfig::default().with_thread_name(name)).unwrap()
    }

    #[tokio::test]
    async fn modules_communicate_through_the_registry() {
        let executor = spawn_executor("registry-module-test");
        let handle = executor.handle();

        let modules = ModuleSet::new()
            .with(ProfileModule)
            .with(FeedModule)
            .expect::<ProfileRoute>()
            .expect::<FeedRoute>();
        assert_eq!(modules.module_names(), vec!["profile", "feed"]);
        modules.install(&handle).await.unwrap();

        let ids: Vec<u64> = handle.resolve(FeedRoute).await.unwrap();
        for id in ids {
            let card: ProfileCard = handle
                .resolve_concurrent(ProfileRoute { id })
                .await
                .unwrap();
            assert_eq!(card, ProfileCard { id });
        }

        executor.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn missing_expectations_are_reported() {
        let executor = spawn_executor("registry-module-missing");
        let handle = executor.handle();

        let err = ModuleSet::new()
            .with(ProfileModule)
            .expect::<ProfileRoute>()
            .expect::<FeedRoute>()
            .install(&handle)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WiringError::MissingRouteTypes(missing) if missing == vec![TypeKey::of::<FeedRoute>()]
        ));

        executor.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn module_failure_names_the_module() {
        let executor = spawn_executor("registry-module-stopped");
        let handle = executor.handle();
        executor.shutdown().await.unwrap();

        let err = ModuleSet::new()
            .with_shared(Arc::new(ProfileModule))
            .install(&handle)
            .await
            .unwrap_err();
        match err {
            WiringError::Module { module, source } => {
                assert_eq!(module, "profile");
                assert!(matches!(source, HandleError::ExecutorStopped));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
