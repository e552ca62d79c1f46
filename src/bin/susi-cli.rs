use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;

use susi_forms::config::load_config;
use susi_forms::content::load_dir;

#[derive(Parser)]
#[command(name = "susi-cli")]
#[command(about = "Submit forms to and check files for the Projekt Susi forms service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a contact inquiry
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        industry: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        interest: Option<String>,
        #[arg(long)]
        locale: Option<String>,
    },
    /// Subscribe an address to the newsletter
    Newsletter {
        #[arg(long)]
        email: String,
        #[arg(long)]
        locale: Option<String>,
    },
    /// Validate a service config file
    CheckConfig { path: PathBuf },
    /// Validate a directory of CMS content entries
    CheckContent { dir: PathBuf },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Contact {
            name,
            company,
            email,
            phone,
            industry,
            message,
            interest,
            locale,
        } => {
            let body = json!({
                "name": name,
                "company": company,
                "email": email,
                "phone": phone,
                "industry": industry,
                "message": message,
                "interest": interest,
                "locale": locale,
            });
            submit(&format!("{}/api/contact", cli.url), body).await
        }
        Commands::Newsletter { email, locale } => {
            let body = json!({ "email": email, "locale": locale });
            submit(&format!("{}/api/newsletter", cli.url), body).await
        }
        Commands::CheckConfig { path } => match load_config(&path) {
            Ok(config) => {
                println!("{} is valid", path.display());
                println!("{}", toml::to_string_pretty(&config)?);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                Ok(ExitCode::FAILURE)
            }
        },
        Commands::CheckContent { dir } => match load_dir(&dir) {
            Ok(entries) => {
                for (path, entry) in &entries {
                    println!(
                        "ok  {:<12} {:<3} {:<40} {}",
                        entry.body.kind(),
                        entry.locale.as_str(),
                        entry.slug,
                        path.display()
                    );
                }
                println!("{} entries valid", entries.len());
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                Ok(ExitCode::FAILURE)
            }
        },
    }
}

async fn submit(url: &str, body: Value) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let res = client.post(url).json(&body).send().await?;
    let status = res.status();

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);

    if status.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("Error: server returned status {}", status);
        Ok(ExitCode::FAILURE)
    }
}
