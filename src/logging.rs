use anyhow::Context as _;

const DEFAULT_DIRECTIVES: &str = "warn,showsync=info";

/// Installs a stderr `fmt` subscriber filtered by `RUST_LOG`, falling back
/// to `warn` globally and `info` for this crate.
pub fn init() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(DEFAULT_DIRECTIVES))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
