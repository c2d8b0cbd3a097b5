use async_trait::async_trait;
use std::error::Error;
use switchboard_core::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// profile モジュールが公開する route と結果の型
#[derive(Debug)]
struct ProfileRoute {
    id: u64,
}

#[derive(Debug)]
struct ProfileCard {
    id: u64,
    display_name: String,
}

// feed モジュールの route。profile モジュールの具体型は知らない
#[derive(Debug)]
struct FeedRoute {
    limit: usize,
}

/// 配線されていない route
#[derive(Debug)]
struct BillingRoute;

struct ProfileModule;

#[async_trait]
impl RouteModule for ProfileModule {
    fn name(&self) -> &str {
        "profile"
    }

    async fn wire(&self, registry: &RegistryHandle) -> Result<(), HandleError> {
        registry
            .register_concurrent::<ProfileRoute, _>(|route| {
                Some(erase(ProfileCard {
                    id: route.id,
                    display_name: format!("user-{}", route.id),
                }))
            })
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
            .register_with::<FeedRoute, _, _>(|| {
                |route: FeedRoute| {
                    let ids: Vec<u64> = (40..).take(route.limit).collect();
                    (!ids.is_empty()).then(|| erase(ids))
                }
            })
            .await
    }
}

/// 引数に JSON ファイルのパスがあればそれを読み、無ければ既定値
fn load_config() -> Result<ExecutorConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            let config = ExecutorConfig::from_json_str(&json)?;
            info!(%path, "loaded executor config");
            Ok(config)
        }
        None => Ok(ExecutorConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // (A) 既定の registry を起動
    let config = load_config()?;
    let registry = install_shared(&config)?;

    // (B) 各モジュールを配線（足りない route があればここで止まる）
    ModuleSet::new()
        .with(ProfileModule)
        .with(FeedModule)
        .expect::<ProfileRoute>()
        .expect::<FeedRoute>()
        .install(registry)
        .await?;

    // (C) feed から id を取り、profile の handler で解決
    let ids: Vec<u64> = registry.resolve(FeedRoute { limit: 3 }).await?;
    for id in ids {
        let card: ProfileCard = registry.resolve_concurrent(ProfileRoute { id }).await?;
        println!("profile card: id={} name={}", card.id, card.display_name);
    }

    // (D) 失敗の種類ごとに分岐する
    match registry.resolve::<_, Vec<u64>>(FeedRoute { limit: 0 }).await {
        Err(HandleError::Resolve(ResolveError::HandlerProducedNoValue(route))) => {
            println!("empty feed: {route} produced no value")
        }
        other => warn!(?other, "unexpected result for empty feed"),
    }
    match registry
        .resolve_concurrent::<_, String>(ProfileRoute { id: 42 })
        .await
    {
        Err(HandleError::Resolve(err @ ResolveError::ResultTypeMismatch { .. })) => {
            println!("programmer error: {err}")
        }
        other => warn!(?other, "unexpected result for mismatched output type"),
    }
    match registry.resolve::<_, ProfileCard>(BillingRoute).await {
        Err(HandleError::Resolve(ResolveError::UnregisteredRouteType(route))) => {
            println!("feature not wired: {route}")
        }
        other => warn!(?other, "unexpected result for unwired route"),
    }

    Ok(())
}
