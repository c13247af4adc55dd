//! Walk a small blog site through an in-memory history.
//!
//! Run with: RUST_LOG=debug cargo run -p waymark-core --example blog

use serde_json::json;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;
use waymark_core::{create_router, EventStore, LinkClick, MemoryHistory, Route, Result};

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = Rc::new(EventStore::new());
    let history = Rc::new(MemoryHistory::with_origin("https://blog.example", "/blog/post/hello"));

    let navigator = create_router(vec![
        Route::new("/")?.handler(|_| json!({"page": "home"})),
        Route::new("/blog")?.handler(|_| json!({"page": "blog"})),
        Route::new("/blog/post/*")?.handler(|p| json!({"page": "post", "id": p[0]})),
        Route::regex(r"^blog/post/(\d+)/(\d+)$")?
            .handler(|p| json!({"page": "post", "year": p[0], "month": p[1]})),
    ])
    .install(store.clone(), history.clone());

    navigator.on_change(|route| {
        tracing::info!("Route changed: {} -> {}", route.path, route.matched);
    });
    store.init();
    if let Some(e) = navigator.take_error() {
        return Err(e);
    }

    if let Some(route) = navigator.current() {
        tracing::info!("Started at {} -> {}", route.path, route.matched);
    }

    navigator.navigate("/blog")?;
    navigator.handle_click(&LinkClick::anchor("https://blog.example/blog/post/2019/05"))?;
    navigator.navigate("/404")?;

    history.back();
    navigator.handle_popstate()?;

    tracing::info!("History: {:?}", history.entries());
    Ok(())
}
