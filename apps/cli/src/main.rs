//! Receita CLI
//!
//! Searches prescriptions from the terminal and prints JSON. Uses the backend
//! from `receita.toml` / `RECEITA__*` variables when configured, otherwise the
//! bundled sample data.
//!
//! Usage:
//!   receita search --patient silva --status pending,partial --page-size 5
//!   receita admin-search --from 2024-03-01 --to 2024-06-30
//!   receita suggest "ana"
//!   receita show RX-2024-007
//!   receita recent --limit 3

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use receita_search::{
    config::Config, logging, PrescriptionSearchService, PrescriptionStatus, SearchParams,
    SortField, SortOrder,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[clap(name = "receita")]
#[clap(about = "Search prescriptions", version)]
struct Cli {
    /// Ignore any configured backend and use the bundled sample data
    #[clap(long, global = true)]
    local: bool,

    /// Print compact JSON instead of pretty-printed JSON
    #[clap(long, global = true)]
    compact: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filtered, sorted, paginated search
    Search(SearchArgs),
    /// Search with the service key; errors are not recovered from local data
    AdminSearch(SearchArgs),
    /// Autocomplete values (ids, patient names, doctor names)
    Suggest {
        query: String,
    },
    /// One prescription with its medications
    Show {
        id: String,
    },
    /// Most recently created prescriptions
    Recent {
        #[clap(short, long, default_value_t = 5)]
        limit: usize,
    },
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Free text matched against id, patient and doctor
    #[clap(short, long)]
    query: Option<String>,

    #[clap(long)]
    patient: Option<String>,

    #[clap(long)]
    doctor: Option<String>,

    /// Accepted statuses, comma separated (pending, partial, completed)
    #[clap(short, long, value_delimiter = ',')]
    status: Vec<PrescriptionStatus>,

    /// Earliest issue date (YYYY-MM-DD)
    #[clap(long)]
    from: Option<NaiveDate>,

    /// Latest issue date (YYYY-MM-DD)
    #[clap(long)]
    to: Option<NaiveDate>,

    #[clap(short, long)]
    page: Option<u32>,

    /// Defaults to search.default_page_size
    #[clap(long)]
    page_size: Option<u32>,

    /// Column to sort by (e.g. date, patient_name, doctor_name, status)
    #[clap(long)]
    sort_by: Option<SortField>,

    /// asc or desc
    #[clap(long)]
    order: Option<SortOrder>,
}

impl SearchArgs {
    fn into_params(self, default_page_size: u32) -> SearchParams {
        SearchParams {
            query: self.query,
            patient_name: self.patient,
            doctor_name: self.doctor,
            status: self.status,
            date_from: self.from,
            date_to: self.to,
            medication_name: None,
            page: self.page,
            page_size: Some(self.page_size.unwrap_or(default_page_size)),
            sort_by: self.sort_by,
            sort_order: self.order,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    if cli.local {
        config.backend.url = None;
    }
    config.validate().context("Invalid configuration")?;

    let _logging_guard =
        logging::init_logging(&config.logging).context("Failed to initialize logging")?;

    let service = PrescriptionSearchService::from_config(&config)
        .context("Failed to initialize search service")?;
    tracing::debug!(remote = service.is_remote(), "Search service ready");

    let page_size = config.search.default_page_size;
    match cli.command {
        Command::Search(args) => {
            let params = args.into_params(page_size);
            let results = service
                .try_search_prescriptions(&params)
                .await
                .context("Search failed")?;
            print_json(&results, cli.compact)
        }
        Command::AdminSearch(args) => {
            let params = args.into_params(page_size);
            let results = service
                .try_admin_search(&params)
                .await
                .context("Admin search failed")?;
            print_json(&results, cli.compact)
        }
        Command::Suggest { query } => {
            let suggestions = service.get_search_suggestions(&query).await;
            print_json(&suggestions, cli.compact)
        }
        Command::Show { id } => {
            let prescription = service
                .try_get_prescription_by_id(&id)
                .await
                .context("Lookup failed")?
                .with_context(|| format!("Prescription {id} not found"))?;
            print_json(&prescription, cli.compact)
        }
        Command::Recent { limit } => {
            let recent = service
                .try_get_recent_prescriptions(limit)
                .await
                .context("Loading recent prescriptions failed")?;
            print_json(&recent, cli.compact)
        }
    }
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{rendered}");
    Ok(())
}
