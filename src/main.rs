use clap::Parser;
use notevault::cli::commands;
use notevault::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List {
            pinned,
            recent,
            ref query,
        } => commands::list::execute(&cli, pinned, recent, query.as_deref()).await,
        Commands::New {
            ref title,
            ref body,
            ref tags,
        } => commands::new::execute(&cli, title, body.as_deref(), tags).await,
        Commands::Show { ref id } => commands::show::execute(&cli, id).await,
        Commands::Edit {
            ref id,
            ref title,
            ref body,
        } => commands::edit::execute(&cli, id, title.as_deref(), body.as_deref()).await,
        Commands::Delete { ref id, force } => commands::delete::execute(&cli, id, force).await,
        Commands::Duplicate { ref id } => commands::duplicate::execute(&cli, id).await,
        Commands::Pin { ref id } => commands::pin::execute(&cli, id).await,
        Commands::Tag { ref action } => commands::tag::execute(&cli, action).await,
        Commands::History { ref id } => commands::history::execute(&cli, id).await,
        Commands::Diff { ref id, index } => commands::diff::execute(&cli, id, index).await,
        Commands::Restore { ref id, index } => commands::restore::execute(&cli, id, index).await,
        Commands::Prefs {
            snap_mins,
            auto_lock_mins,
        } => commands::prefs::execute(&cli, snap_mins, auto_lock_mins).await,
        Commands::Vault { ref action } => commands::vault::execute(&cli, action).await,
    };

    if let Err(e) = result {
        notevault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `NOTEVAULT_LOG` (default: warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("NOTEVAULT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
