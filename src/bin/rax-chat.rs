//! RAX Chat - terminal client

use clap::Parser;
use log::error;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use rax_chat_server::chat_client::run_client;
use rax_chat_server::utils::logging::setup_logging;

#[derive(Parser, Debug)]
#[command(name = "rax-chat", about = "Connect to a RAX chat server")]
struct Args {
    /// Server host or IP address
    host: String,

    /// Server port
    port: u16,

    /// Display name; prompted for when omitted
    #[arg(short, long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() {
    setup_logging();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> io::Result<()> {
    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    let name = match args.name {
        Some(name) => name,
        None => {
            stdout.write_all(b"Enter your username: ").await?;
            stdout.flush().await?;
            let mut name = String::new();
            stdin.read_line(&mut name).await?;
            name
        }
    };

    let stream = TcpStream::connect((args.host.as_str(), args.port)).await?;
    run_client(stream, &name, stdin, stdout).await
}
