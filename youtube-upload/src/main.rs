use eyre::Context;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_upload::args::Args;
use youtube_upload::credentials::Credentials;
use youtube_upload::{run, setup_youtube_client};

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    // stdout is reserved for the one result line
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let args = Args::parse_command_line(std::env::args_os()).unwrap_or_else(|e| e.exit());

    let credentials = Credentials::load(&args.credentials)
        .await
        .context("load OAuth credentials")?;
    let yt = setup_youtube_client(&credentials)?;

    let outcome = run(&yt, &args).await;
    println!("{outcome}");

    Ok(())
}
