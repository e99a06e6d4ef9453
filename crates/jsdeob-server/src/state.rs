//! Ambient configuration and shared application state (§10.4), following
//! `jsdeob_runtime`'s builder-struct convention for config
//! ([`jsdeob_runtime::RuntimePolicy`]) applied to the server's own knobs.

use std::env;
use std::sync::Arc;
use std::time::Instant;

use jsdeob_pipeline::PipelineEngine;
use jsdeob_runtime::RuntimePolicy;
use jsdeob_store::Library;

/// Server-wide configuration sourced from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Single base directory rooting both `data/` and `plugins/`
    /// (`jsdeob_store::Library::open`). Kept as one knob rather than two
    /// separate data/plugins directories — see DESIGN.md.
    pub base_dir: String,
    pub allow_eval: bool,
    pub worker_pool_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            base_dir: ".".to_string(),
            allow_eval: true,
            worker_pool_size: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(2),
        }
    }
}

impl ServerConfig {
    /// Reads `PORT`, `JSDEOB_BASE_DIR`, `JSDEOB_ALLOW_EVAL`, and
    /// `JSDEOB_WORKER_POOL_SIZE` from the environment, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(defaults.port),
            base_dir: env::var("JSDEOB_BASE_DIR").unwrap_or(defaults.base_dir),
            allow_eval: env::var("JSDEOB_ALLOW_EVAL")
                .ok()
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.allow_eval),
            worker_pool_size: env::var("JSDEOB_WORKER_POOL_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.worker_pool_size),
        }
    }

    pub fn runtime_policy(&self) -> RuntimePolicy {
        RuntimePolicy::new().allow_eval(self.allow_eval)
    }
}

/// Shared state handed to every route handler via axum's `State` extractor.
/// Cheaply cloneable: everything inside is already reference-counted or
/// internally synchronized.
#[derive(Clone)]
pub struct AppState(Arc<Inner>);

struct Inner {
    library: Library,
    engine: PipelineEngine,
    runtime_policy: RuntimePolicy,
    started_at: Instant,
}

impl AppState {
    pub fn new(library: Library, engine: PipelineEngine, runtime_policy: RuntimePolicy) -> Self {
        Self(Arc::new(Inner { library, engine, runtime_policy, started_at: Instant::now() }))
    }

    pub fn library(&self) -> &Library {
        &self.0.library
    }

    pub fn engine(&self) -> &PipelineEngine {
        &self.0.engine
    }

    pub fn runtime_policy(&self) -> &RuntimePolicy {
        &self.0.runtime_policy
    }

    pub fn uptime_secs(&self) -> u64 {
        self.0.started_at.elapsed().as_secs()
    }
}
