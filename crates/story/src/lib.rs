pub mod blocks;

use anyhow::Context as _;
use gpui_manos_blocks_core::BlocksConfig;
use tracing_subscriber::EnvFilter;

pub const CONFIG_ENV: &str = "MANOS_BLOCKS_CONFIG";

/// Installs the `RUST_LOG`-driven subscriber. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gpui_manos_blocks=info,gpui_manos_blocks_core=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Reads the config file named by [`CONFIG_ENV`], or the defaults when it is unset.
pub fn load_config() -> anyhow::Result<BlocksConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => BlocksConfig::load(&path)
            .with_context(|| format!("loading {CONFIG_ENV}={}", path.to_string_lossy())),
        None => Ok(BlocksConfig::default().with_defaults()),
    }
}
