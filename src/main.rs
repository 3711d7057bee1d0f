use pdf_chat_agent::api;
use pdf_chat_agent::commands::CommandHandler;
use pdf_chat_agent::config::Settings;
use pdf_chat_agent::language::Language;

use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PDF files to process on startup
    #[arg(long)]
    pdf: Vec<String>,

    /// Language answers are translated to
    #[arg(long)]
    lang: Option<Language>,

    #[arg(long)]
    api: bool,

    #[arg(long, default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    colored::control::set_override(true);

    // Load environment variables
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    if args.api {
        run_api_server(args).await
    } else {
        run_cli_mode(args).await
    }
}

async fn run_cli_mode(args: Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = Settings::from_env();

    let mut command_handler = CommandHandler::new(settings)?;
    if let Some(lang) = args.lang {
        command_handler.set_language(lang);
    }

    // Show initial help menu
    command_handler.handle_command("help").await?;

    if !args.pdf.is_empty() {
        let process = format!("process {}", args.pdf.join(" "));
        if let Err(e) = command_handler.handle_command(&process).await {
            println!("{}", e.red());
        }
    }

    // Initialize rustyline editor
    let mut rl = Editor::<(), DefaultHistory>::new()?;

    // Main input loop
    loop {
        match rl.readline("👤 ") {
            Ok(line) => {
                let input = line.trim();
                rl.add_history_entry(input);

                if let Err(e) = command_handler.handle_command(input).await {
                    println!("{}", e.red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}

async fn run_api_server(args: Args) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = format!("0.0.0.0:{}", args.port).parse()?;

    println!("Starting API server on {}", addr);

    let settings = Settings::from_env();
    let app = api::create_api(settings)?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    println!("Server successfully bound to {}", addr);
    println!("Ready to accept connections!");

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}
