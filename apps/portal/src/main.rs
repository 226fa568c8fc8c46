use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use analysis_core::{simulated_session, IngestSource, InMemoryDisplayRefs, PortalSession};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::{
    domain::{FileRef, NavTarget},
    error::{ErrorCode, PortalError, PortalException},
    protocol::WorkflowEvent,
};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

#[derive(Parser, Debug)]
#[command(about = "Stage medical images and run the simulated analysis workflow")]
struct Cli {
    /// Settings file; defaults to ./portal.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stage the given files and process the first image.
    Analyze {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Go back to the upload screen after this many milliseconds.
        #[arg(long)]
        cancel_after_ms: Option<u64>,
        /// Print workflow events as JSON lines.
        #[arg(long)]
        json: bool,
    },
    /// Show what would be staged for the given files.
    Stage {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List previously analyzed images.
    History,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = config::load_settings(cli.config.as_deref())?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let display_refs = Arc::new(InMemoryDisplayRefs::new());
    let mut session = simulated_session(settings.schedule()?, Arc::clone(&display_refs));

    let json = matches!(cli.command, Command::Analyze { json: true, .. });
    let outcome = run(cli.command, &mut session).await;
    if display_refs.live_count() > 0 {
        warn!(live = display_refs.live_count(), "display references still held at exit");
    }
    if let (Err(err), true) = (&outcome, json) {
        println!("{}", serde_json::to_string(&fault_report(err))?);
    }
    outcome
}

async fn run(command: Command, session: &mut PortalSession) -> Result<()> {
    match command {
        Command::Analyze {
            paths,
            cancel_after_ms,
            json,
        } => analyze(session, &paths, cancel_after_ms, json).await?,
        Command::Stage { paths } => {
            let candidates = read_candidates(&paths).await?;
            let report = session.ingest(IngestSource::FileDialog, candidates);
            for name in &report.rejected {
                println!("skipped (not an image): {name}");
            }
            print!("{}", render::screen(&session.render().await));
        }
        Command::History => {
            session.navigate(NavTarget::History).await;
            print!("{}", render::screen(&session.render().await));
        }
    }
    Ok(())
}

/// Wire form of a failed command. Faults raised as [`PortalException`] keep their code.
fn fault_report(err: &anyhow::Error) -> PortalError {
    match err.downcast_ref::<PortalException>() {
        Some(fault) => fault.clone().into(),
        None => PortalError::new(ErrorCode::Internal, format!("{err:#}")),
    }
}

async fn analyze(
    session: &mut PortalSession,
    paths: &[PathBuf],
    cancel_after_ms: Option<u64>,
    json: bool,
) -> Result<()> {
    let candidates = read_candidates(paths).await?;
    let report = session.ingest(IngestSource::FileDialog, candidates);
    for name in &report.rejected {
        println!("skipped (not an image): {name}");
    }

    let mut events = session.workflow().subscribe();
    let Some(run_id) = session.start_processing().await? else {
        return Err(PortalException::new(ErrorCode::Validation, "no image files to process").into());
    };

    let cancel = async {
        match cancel_after_ms {
            Some(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(cancel);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut failure = None;
    let mut cancelled = false;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    print_event(&event, json)?;
                    if event.run_id() != run_id {
                        continue;
                    }
                    match event {
                        WorkflowEvent::Completed { .. } => break,
                        WorkflowEvent::Failed { reason, .. } => {
                            failure = Some(reason);
                            break;
                        }
                        _ => {}
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
            _ = &mut cancel => {
                info!(run_id = %run_id, "cancel timer elapsed");
                cancelled = true;
                break;
            }
            _ = &mut ctrl_c => {
                info!(run_id = %run_id, "interrupted");
                cancelled = true;
                break;
            }
        }
    }

    if !cancelled {
        print!("{}", render::screen(&session.render().await));
    }
    session.back().await;
    while let Ok(event) = events.try_recv() {
        print_event(&event, json)?;
    }
    if cancelled {
        print!("{}", render::screen(&session.render().await));
    }

    match failure {
        Some(reason) => Err(PortalException::new(ErrorCode::Unavailable, reason).into()),
        None => Ok(()),
    }
}

fn print_event(event: &WorkflowEvent, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!("{}", render::event_line(event));
    }
    Ok(())
}

async fn read_candidates(paths: &[PathBuf]) -> Result<Vec<FileRef>> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        let payload = match tokio::fs::read(path).await {
            Ok(payload) => payload,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let message = format!("no such file '{}'", path.display());
                return Err(PortalException::new(ErrorCode::NotFound, message).into());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
            }
        };
        candidates.push(FileRef::new(display_name(path), guess_mime(path), payload));
    }
    Ok(candidates)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_image_types_from_extension() {
        assert_eq!(guess_mime(Path::new("scan.PNG")), "image/png");
        assert_eq!(guess_mime(Path::new("/tmp/x.jpeg")), "image/jpeg");
        assert_eq!(guess_mime(Path::new("notes.pdf")), "application/pdf");
        assert_eq!(guess_mime(Path::new("no_extension")), "");
    }

    #[test]
    fn cli_requires_paths_for_analyze() {
        assert!(Cli::try_parse_from(["portal", "analyze"]).is_err());
        let cli = Cli::try_parse_from(["portal", "analyze", "a.png", "--cancel-after-ms", "500"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Command::Analyze {
                cancel_after_ms: Some(500),
                json: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn read_candidates_tags_files_with_guessed_mime() {
        let dir = tempfile::tempdir().expect("temp dir");
        let image = dir.path().join("knee.png");
        std::fs::write(&image, [1u8, 2, 3]).expect("write");

        let files = read_candidates(&[image]).await.expect("read");
        assert_eq!(files[0].name, "knee.png");
        assert_eq!(files[0].mime_type, "image/png");
        assert_eq!(files[0].size_bytes, 3);

        let missing = dir.path().join("gone.png");
        let err = read_candidates(&[missing]).await.expect_err("missing file");
        assert_eq!(fault_report(&err).code, ErrorCode::NotFound);
    }

    #[test]
    fn fault_report_keeps_portal_codes_and_wraps_the_rest() {
        let failed: anyhow::Error =
            PortalException::new(ErrorCode::Unavailable, "upload connection reset").into();
        assert_eq!(
            fault_report(&failed),
            PortalError::new(ErrorCode::Unavailable, "upload connection reset")
        );

        let other = anyhow::anyhow!("disk full").context("failed to read 'a.png'");
        let report = fault_report(&other);
        assert_eq!(report.code, ErrorCode::Internal);
        assert_eq!(report.message, "failed to read 'a.png': disk full");
        assert_eq!(
            serde_json::to_string(&report).expect("json"),
            r#"{"code":"internal","message":"failed to read 'a.png': disk full"}"#
        );
    }
}
