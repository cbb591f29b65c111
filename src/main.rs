use std::{path::PathBuf, process, sync::Arc, time::Duration};

use sopforge::{
    application::{
        chat::ChatService,
        dashboard::DashboardService,
        error::AppError,
        export::{self, ExportFormat, ExportOutput},
        generation::GenerationService,
    },
    config,
    domain::{error::DomainError, sop::{CompletedSteps, Sop}},
    infra::{
        error::InfraError,
        http::{self, ApiState, HttpState, RouterState},
        llm::GenerativeLanguageClient,
        telemetry,
    },
};
use time::OffsetDateTime;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| InfraError::configuration(format!("failed to load configuration: {err}")))
        .map_err(AppError::from)?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Export(args) => run_export(args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    if settings.llm.api_key.is_empty() {
        warn!(
            target = "sopforge::serve",
            "no generative API key configured; SOP generation and chat will be rejected upstream"
        );
    }

    let generator = Arc::new(GenerativeLanguageClient::new(&settings.llm).map_err(AppError::from)?);
    let generation = Arc::new(GenerationService::new(generator.clone()));
    let chat = Arc::new(ChatService::new(generator));
    let dashboard = DashboardService;

    let http_state = HttpState {
        generation: generation.clone(),
        chat: chat.clone(),
        dashboard,
    };
    let api_state = ApiState {
        generation,
        chat,
        dashboard,
    };

    serve_http(&settings, http_state, api_state).await
}

async fn serve_http(
    settings: &config::Settings,
    http_state: HttpState,
    api_state: ApiState,
) -> Result<(), AppError> {
    let router_state = RouterState {
        http: http_state,
        api: api_state,
    };
    let public_router = http::build_router(router_state.clone());
    let api_router = http::build_api_v1_router(router_state.clone());
    let router = public_router.merge(api_router).with_state(router_state);

    let listener = tokio::net::TcpListener::bind(settings.server.public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "sopforge::serve",
        addr = %settings.server.public_addr,
        "HTTP server listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(settings.server.graceful_shutdown))
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(target = "sopforge::serve", "HTTP server stopped");
    Ok(())
}

/// Resolves when a shutdown signal arrives, which starts axum's graceful
/// drain. A detached timer bounds the drain to the configured window.
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!(
        target = "sopforge::serve",
        grace_seconds = grace.as_secs(),
        "shutdown signal received, draining connections"
    );
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(
            target = "sopforge::serve",
            "graceful shutdown window elapsed, exiting"
        );
        process::exit(0);
    });
}

async fn run_export(args: config::ExportArgs) -> Result<(), AppError> {
    let format: ExportFormat = args.format.parse().map_err(AppError::from)?;

    let raw = tokio::fs::read(&args.input)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let sop: Sop = serde_json::from_slice(&raw).map_err(|err| {
        AppError::from(DomainError::validation(format!(
            "`{}` is not a valid SOP document: {err}",
            args.input.display()
        )))
    })?;
    let completed = CompletedSteps::from_ids(args.completed.iter().cloned());

    let output = export::export_document(&sop, &completed, format, OffsetDateTime::now_utc())
        .map_err(AppError::from)?;

    match output {
        ExportOutput::Document {
            bytes,
            content_type: _,
            filename,
        } => {
            let path = args.output.unwrap_or_else(|| PathBuf::from(&filename));
            tokio::fs::write(&path, &bytes)
                .await
                .map_err(|err| AppError::from(InfraError::from(err)))?;
            info!(
                target = "sopforge::export",
                path = %path.display(),
                bytes = bytes.len(),
                "document written"
            );
        }
        ExportOutput::Clipboard { text } => match args.output {
            Some(path) => {
                tokio::fs::write(&path, text.as_bytes())
                    .await
                    .map_err(|err| AppError::from(InfraError::from(err)))?;
                info!(
                    target = "sopforge::export",
                    path = %path.display(),
                    "plain-text summary written"
                );
            }
            None => println!("{text}"),
        },
    }

    Ok(())
}
