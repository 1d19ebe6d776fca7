use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use yatube_core::{
    config,
    forms::SignupForm,
    YatubeCore,
};
use yatube_web::{app_router, telemetry, AppState};

#[derive(Parser)]
#[command(name = "yatube_web", version, about = "Yatube blog server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Apply migrations and serve HTTP (the default)
    Serve {
        /// Address to listen on, overriding the configured one
        #[arg(long)]
        bind: Option<String>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Create a group posts can be filed under
    CreateGroup {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Create a user account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init();

    let cli = Cli::parse();
    let config = config::get_or_init().await?;
    let core = YatubeCore::start(config).await?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(core, bind).await?,
        Command::Migrate => {
            tracing::info!("migrations applied");
            core.shutdown().await?;
        }
        Command::CreateGroup {
            slug,
            title,
            description,
        } => {
            let group = core.groups.create(&slug, &title, &description).await?;
            println!("created group {} ({})", group.slug, group.id);
            core.shutdown().await?;
        }
        Command::CreateUser { username, password } => {
            let mut form = SignupForm {
                username,
                password1: password.clone(),
                password2: password,
            };
            if let Err(errors) = form.clean() {
                for (field, messages) in errors.fields() {
                    for message in messages {
                        eprintln!("{field}: {message}");
                    }
                }
                return Err("invalid user details".into());
            }

            let user = core.users.register(&form.username, &form.password1).await?;
            println!("created user {} ({})", user.username, user.id);
            core.shutdown().await?;
        }
    }

    Ok(())
}

async fn serve(core: YatubeCore, bind: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let purged = core.sessions.purge_expired().await?;
    if purged > 0 {
        tracing::info!(purged, "removed expired sessions");
    }

    let bind_addr = bind.unwrap_or_else(|| core.config.bind_addr.clone());
    let app = app_router(AppState::new(core));

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for shutdown signal");
    }
}
