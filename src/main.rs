// ABOUTME: CLI entrypoint for canvas-things command
// ABOUTME: Loads .env, sets up logging, dispatches commands and maps errors to exit codes

use canvas_things::{
    api::ApiClient,
    cli::{Cli, Commands},
    config::{env_lookup, load_dotenv, Settings},
    convert::ConvertOptions,
    sync::{course_line, list_courses, run_convert_file, run_sync, Destination, SyncOptions},
    Result,
};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let env_file = load_dotenv();
    init_tracing();
    if let Some(path) = env_file {
        debug!(path = %path.display(), "loaded environment file");
    }

    if let Err(e) = run() {
        eprintln!("canvas-things: [E{}] {}", e.exit_code(), e);
        std::process::exit(e.exit_code());
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("canvas_things=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command();

    let options = SyncOptions {
        convert: ConvertOptions {
            offset: cli.utc_offset,
            skip: cli.skip.iter().copied().collect(),
        },
        reveal: cli.reveal,
        destination: if cli.stdout {
            Destination::Stdout
        } else {
            Destination::File(cli.output)
        },
    };

    match command {
        Commands::Sync => {
            let settings = Settings::resolve(cli.token, cli.user_id, cli.endpoint, env_lookup)?;
            let client = ApiClient::new(settings.token, settings.endpoint)?;
            run_sync(&client, settings.user_id, &options)?;
        }
        Commands::Courses => {
            let settings = Settings::resolve(cli.token, cli.user_id, cli.endpoint, env_lookup)?;
            let client = ApiClient::new(settings.token, settings.endpoint)?;
            for enrollment in list_courses(&client, settings.user_id)? {
                println!("{}", course_line(&enrollment));
            }
        }
        Commands::Convert { file } => {
            run_convert_file(&file, &options)?;
        }
    }

    Ok(())
}
