use clap::{Parser, Subcommand, ValueEnum};
use client::backend::{BookingBackend, CallbackTransport, FormTransport, QueryTransport};
use client::error::ClientError;
use common::slots::{self, Slot};
use common::{BookingInterval, BookingRequest};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the booking backend
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// How to reach the backend
    #[arg(long, value_enum, default_value = "query")]
    transport: TransportKind,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum TransportKind {
    /// Query-string GET for both operations
    Query,
    /// Script-callback wrapped responses
    Callback,
    /// Multipart form POST for submission
    Form,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the booked intervals for a court on a date
    Availability {
        court: String,
        /// Date to query, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show the half-hour grid and which slots can start or end a booking
    Slots {
        court: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Book a court
    Book {
        court: String,
        /// Booking date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// End date if the booking runs past midnight (default: same as --date)
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        start_time: String,
        #[arg(long)]
        end_time: String,
        /// Customer name
        #[arg(long)]
        name: String,
        /// Customer phone number
        #[arg(long)]
        phone: String,
        /// Staff member taking the booking
        #[arg(long)]
        staff: String,
    },
}

const DEFAULT_BASE_URL: &str = "http://localhost:3030";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let result = match cli.transport {
        TransportKind::Query => run(&cli, QueryTransport::new(&cli.base_url)).await,
        TransportKind::Callback => run(&cli, CallbackTransport::new(&cli.base_url)).await,
        TransportKind::Form => run(&cli, FormTransport::new(&cli.base_url)).await,
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run<B: BookingBackend>(cli: &Cli, backend: B) -> Result<(), ClientError> {
    match &cli.command {
        Commands::Availability { court, date } => {
            let date = resolve_date(date);
            let bookings = backend.query_availability(court, &date).await?;
            print_availability(court, &date, &bookings);
        }
        Commands::Slots { court, date } => {
            let date = resolve_date(date);
            let bookings = backend.query_availability(court, &date).await?;
            print_grid(&bookings);
        }
        Commands::Book {
            court,
            date,
            end_date,
            start_time,
            end_time,
            name,
            phone,
            staff,
        } => {
            let date = resolve_date(date);
            let end_date = end_date.clone().unwrap_or_else(|| date.clone());
            let request = BookingRequest {
                court: court.clone(),
                start_date: date.clone(),
                start_time: start_time.clone(),
                end_date: end_date.clone(),
                end_time: end_time.clone(),
                customer_name: name.clone(),
                customer_phone: phone.clone(),
                staff: staff.clone(),
            };
            request.validate()?;

            // One fetch, one submission, strictly in turn; the snapshot used
            // for the conflict check is whatever this fetch returns.
            let bookings = backend.query_availability(court, &date).await?;
            check_against_snapshot(&request, &bookings)?;

            let receipt = backend.submit(&request).await?;
            if receipt.success {
                println!(
                    "{}",
                    receipt.message.as_deref().unwrap_or("Booking confirmed")
                );
            } else {
                return Err(ClientError::Backend(
                    receipt.message.unwrap_or_else(|| "booking failed".to_string()),
                ));
            }
        }
    }

    Ok(())
}

fn resolve_date(date: &Option<String>) -> String {
    date.clone()
        .unwrap_or_else(|| chrono::Local::now().date_naive().to_string())
}

/// Refuse a request whose start or end slot the fetched snapshot already
/// rules out, the same exclusions the availability grid shows.
fn check_against_snapshot(
    request: &BookingRequest,
    bookings: &[BookingInterval],
) -> Result<(), ClientError> {
    if let Some(slot) = Slot::parse(&request.start_time) {
        if slots::disabled_starts(slots::grid(), bookings).contains(&slot) {
            return Err(ClientError::SlotUnavailable(slot.to_12h()));
        }
    }
    // The end check only applies while the booking stays on the queried day.
    if request.end_date == request.start_date {
        if let Some(slot) = Slot::parse(&request.end_time) {
            if slots::disabled_ends(slots::grid(), bookings).contains(&slot) {
                return Err(ClientError::SlotUnavailable(slot.to_12h()));
            }
        }
    }
    Ok(())
}

fn print_availability(court: &str, date: &str, bookings: &[BookingInterval]) {
    if bookings.is_empty() {
        println!("No bookings - court {court} is available all day on {date}");
        return;
    }
    println!("Booked times for court {court} on {date}:");
    for booking in bookings {
        println!(
            "  {} - {}",
            Slot(booking.start_minute()).to_12h(),
            Slot(booking.end_minute()).to_12h()
        );
    }
}

fn print_grid(bookings: &[BookingInterval]) {
    let starts = slots::disabled_starts(slots::grid(), bookings);
    let ends = slots::disabled_ends(slots::grid(), bookings);

    println!("{:<8} {:<6} {:<6}", "slot", "start", "end");
    for slot in slots::grid() {
        let start = if starts.contains(&slot) { "-" } else { "open" };
        let end = if ends.contains(&slot) { "-" } else { "open" };
        println!("{:<8} {:<6} {:<6}", slot.to_hhmm(), start, end);
    }
}
