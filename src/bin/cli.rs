//! Concierge CLI
//!
//! Command-line client for the Concierge API:
//! - Browse staff and the booking calendar
//! - Book, reschedule and cancel appointments
//! - Talk to the chat assistant
//! - Check status

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "concierge-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Client for the Concierge booking and chat API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8090", global = true)]
    pub api_url: String,

    /// Act as this signed-in user id
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Display name sent with --user
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Email sent with --user
    #[arg(long, global = true)]
    pub email: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show server status
    Status,

    /// List the staff directory
    Staff,

    /// List bookable time slots
    Slots,

    /// Show a month of the booking calendar
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },

    /// List your appointments
    Appointments {
        /// Include cancelled appointments
        #[arg(long)]
        all: bool,
    },

    /// Book an appointment
    Book {
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// Time slot, e.g. "10:00 AM"
        #[arg(short, long)]
        time: String,
        /// Staff member id
        #[arg(short, long)]
        staff: i64,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Move an appointment to another slot
    Reschedule {
        id: String,
        #[arg(short, long)]
        date: NaiveDate,
        #[arg(short, long)]
        time: String,
    },

    /// Cancel an appointment
    Cancel { id: String },

    /// Show your profile
    Profile,

    /// Chat with the assistant
    Chat,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// HTTP client that carries the identity headers
struct Api {
    client: Client,
    base: String,
    user: Option<String>,
    name: Option<String>,
    email: Option<String>,
}

impl Api {
    fn new(cli: &Cli) -> Self {
        Self {
            client: Client::new(),
            base: cli.api_url.trim_end_matches('/').to_string(),
            user: cli.user.clone(),
            name: cli.name.clone(),
            email: cli.email.clone(),
        }
    }

    fn with_identity(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(user) = &self.user {
            request = request.header("x-auth-user-id", user);
            if let Some(name) = &self.name {
                request = request.header("x-auth-user-name", name);
            }
            if let Some(email) = &self.email {
                request = request.header("x-auth-user-email", email);
            }
        }
        request
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.with_identity(self.client.get(format!("{}{}", self.base, path)))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.with_identity(self.client.post(format!("{}{}", self.base, path)))
    }

    fn delete(&self, path: &str) -> RequestBuilder {
        self.with_identity(self.client.delete(format!("{}{}", self.base, path)))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let api = Api::new(&cli);

    match &cli.command {
        Commands::Status => {
            let response = api.get("/health").send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: Value = resp.json().await?;

                    println!("Concierge v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!("Store: {}", health["store"].as_str().unwrap_or("unknown"));
                    println!(
                        "Chat sessions: {}",
                        health["chat_sessions"].as_u64().unwrap_or(0)
                    );
                    println!(
                        "Socket connections: {}",
                        health["connections"].as_u64().unwrap_or(0)
                    );

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to Concierge API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the Concierge API server is running:");
                    eprintln!("  cargo run --bin concierge");
                    std::process::exit(1);
                }
            }
        }

        Commands::Staff => {
            let data = expect_json(api.get("/api/v1/staff").send().await?).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                println!("{:<4} {:<18} {:<22} {:<6} {}", "ID", "Name", "Role", "Rating", "Specialty");
                println!("{}", "-".repeat(80));
                for staff in data["staff"].as_array().into_iter().flatten() {
                    println!(
                        "{:<4} {:<18} {:<22} {:<6.1} {}",
                        staff["id"].as_i64().unwrap_or(0),
                        staff["name"].as_str().unwrap_or("-"),
                        staff["role"].as_str().unwrap_or("-"),
                        staff["rating"].as_f64().unwrap_or(0.0),
                        staff["specialty"].as_str().unwrap_or("-"),
                    );
                }
            }
        }

        Commands::Slots => {
            let data = expect_json(api.get("/api/v1/calendar/slots").send().await?).await?;
            for slot in data["slots"].as_array().into_iter().flatten() {
                println!("{}", slot.as_str().unwrap_or("-"));
            }
        }

        Commands::Calendar { year, month } => {
            let mut query = Vec::new();
            if let Some(year) = year {
                query.push(format!("year={}", year));
            }
            if let Some(month) = month {
                query.push(format!("month={}", month));
            }
            let path = if query.is_empty() {
                "/api/v1/calendar".to_string()
            } else {
                format!("/api/v1/calendar?{}", query.join("&"))
            };

            let data = expect_json(api.get(&path).send().await?).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                print_month(&data);
            }
        }

        Commands::Appointments { all } => {
            let path = format!("/api/v1/appointments?include_cancelled={}", all);
            let data = expect_json(api.get(&path).send().await?).await?;

            let appointments = data["appointments"].as_array().cloned().unwrap_or_default();
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else if appointments.is_empty() {
                println!("No appointments yet.");
                println!();
                println!("Book one with:");
                println!("  concierge-cli --user <id> book --date 2030-01-15 --time \"10:00 AM\" --staff 1");
            } else {
                print_appointments(&appointments);
            }
        }

        Commands::Book {
            date,
            time,
            staff,
            notes,
        } => {
            let body = json!({
                "date": date,
                "time": time,
                "staff_id": staff,
                "notes": notes,
            });
            let data = expect_json(api.post("/api/v1/appointments").json(&body).send().await?)
                .await?;
            println!(
                "Booked {} with {} on {} at {}",
                data["id"].as_str().unwrap_or("-"),
                data["staff_name"].as_str().unwrap_or("-"),
                date,
                data["time"].as_str().unwrap_or("-"),
            );
        }

        Commands::Reschedule { id, date, time } => {
            let body = json!({ "date": date, "time": time });
            let path = format!("/api/v1/appointments/{}/reschedule", id);
            let data = expect_json(api.post(&path).json(&body).send().await?).await?;
            println!(
                "Rescheduled to {} at {}",
                date,
                data["time"].as_str().unwrap_or("-")
            );
        }

        Commands::Cancel { id } => {
            let path = format!("/api/v1/appointments/{}", id);
            expect_json(api.delete(&path).send().await?).await?;
            println!("Cancelled {}", id);
        }

        Commands::Profile => {
            let data = expect_json(api.get("/api/v1/profile").send().await?).await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&data)?);
            } else {
                for field in ["name", "email", "phone", "address", "preference"] {
                    println!("{:<12} {}", field, data[field].as_str().unwrap_or("-"));
                }
            }
        }

        Commands::Chat => run_chat(&api).await?,

        Commands::Config { output } => {
            let config = concierge::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Parse a JSON body, or print the API error and exit
async fn expect_json(response: Response) -> Result<Value, Box<dyn std::error::Error>> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(text);
        eprintln!("Request failed ({}): {}", status, message);
        std::process::exit(1);
    }

    if text.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Interactive chat over the REST endpoints
async fn run_chat(api: &Api) -> Result<(), Box<dyn std::error::Error>> {
    let transcript = expect_json(api.post("/api/v1/chat/sessions").send().await?).await?;
    let session = transcript["id"].as_str().unwrap_or_default().to_string();
    let base = format!("/api/v1/chat/sessions/{}", session);

    let mut options = Vec::new();
    for message in transcript["messages"].as_array().into_iter().flatten() {
        options = print_message(message);
    }

    let stdin = io::stdin();
    loop {
        let Some(line) = prompt(&stdin, "> ")? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        // A number picks one of the last options
        let body = match line.parse::<usize>().ok().and_then(|n| options.get(n.wrapping_sub(1))) {
            Some(value) => json!({ "value": value }),
            None => json!({ "text": line }),
        };

        let exchange = expect_json(
            api.post(&format!("{}/messages", base)).json(&body).send().await?,
        )
        .await?;
        options = print_message(&exchange["reply"]);

        match exchange["action"].as_str() {
            Some("show_contact_form") => {
                let details = json!({
                    "name": prompt_field(&stdin, "Full name")?,
                    "email": prompt_field(&stdin, "Email")?,
                    "phone": prompt_field(&stdin, "Phone")?,
                    "address": prompt_field(&stdin, "Address (optional)")?,
                });
                let reply = expect_json(
                    api.post(&format!("{}/contact", base)).json(&details).send().await?,
                )
                .await?;
                options = print_message(&reply);
            }
            Some("show_property_form") => {
                let details = json!({
                    "property_type": prompt_field(&stdin, "Property type (house, apartment, townhouse, land)")?,
                    "location": prompt_field(&stdin, "Location")?,
                });
                let reply = expect_json(
                    api.post(&format!("{}/property", base)).json(&details).send().await?,
                )
                .await?;
                options = print_message(&reply);
            }
            Some("show_staff_directory") => {
                println!("(see `concierge-cli staff`)");
            }
            Some("open_booking") => {
                println!("(book with `concierge-cli book --date <YYYY-MM-DD> --time <slot> --staff <id>`)");
            }
            _ => {}
        }
    }

    let _ = api.delete(&base).send().await;
    Ok(())
}

/// Print an assistant message and return its option values in order
fn print_message(message: &Value) -> Vec<String> {
    println!();
    println!("{}", message["content"].as_str().unwrap_or_default());

    let mut values = Vec::new();
    for (i, option) in message["options"].as_array().into_iter().flatten().enumerate() {
        println!("  {}. {}", i + 1, option["text"].as_str().unwrap_or("-"));
        values.push(option["value"].as_str().unwrap_or_default().to_string());
    }
    values
}

fn prompt(stdin: &io::Stdin, label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if stdin.lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn prompt_field(stdin: &io::Stdin, label: &str) -> io::Result<String> {
    let value = prompt(stdin, &format!("{}: ", label))?.unwrap_or_default();
    Ok(value.trim().to_string())
}

fn print_appointments(appointments: &[Value]) {
    println!(
        "{:<36} {:<12} {:<9} {:<18} {}",
        "ID", "Date", "Time", "Staff", "Status"
    );
    println!("{}", "-".repeat(90));

    for appointment in appointments {
        let date = appointment["scheduled_at"]
            .as_str()
            .and_then(|s| s.get(..10))
            .unwrap_or("-");
        println!(
            "{:<36} {:<12} {:<9} {:<18} {}",
            appointment["id"].as_str().unwrap_or("-"),
            date,
            appointment["time"].as_str().unwrap_or("-"),
            appointment["staff_name"].as_str().unwrap_or("-"),
            appointment["status"].as_str().unwrap_or("-"),
        );
    }
}

fn print_month(data: &Value) {
    println!("{}", data["label"].as_str().unwrap_or_default());
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");

    let cells = data["cells"].as_array().cloned().unwrap_or_default();
    for week in cells.chunks(7) {
        let row: Vec<String> = week
            .iter()
            .map(|cell| {
                if cell["date"].is_null() {
                    "    ".to_string()
                } else if cell["is_today"].as_bool().unwrap_or(false) {
                    format!("[{:>2}]", cell["day"].as_u64().unwrap_or(0))
                } else if cell["is_past"].as_bool().unwrap_or(false) {
                    format!(" {:>2}.", cell["day"].as_u64().unwrap_or(0))
                } else {
                    format!(" {:>2} ", cell["day"].as_u64().unwrap_or(0))
                }
            })
            .collect();
        println!("{}", row.join(""));
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
