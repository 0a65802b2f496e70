//! seeker - interactive remote user search with local favorites
//!
//! Line-oriented demo shell around the query controller:
//!   <text>        - treat the line as query keystrokes (debounced search)
//!   :more         - load the next page
//!   :like <id>    - toggle the favorite flag for an item
//!   :sort asc|desc - change the display ordering
//!   :quit         - exit

use seeker::{
    ControllerConfig, ControllerState, GitHubSearchClient, QueryController, SortDirection,
    SqliteFavoritesStore,
};
use std::env;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// CLI application configuration
struct SeekerConfig {
    db_path: String,
    page_size: u32,
    debounce_ms: u64,
}

impl Default for SeekerConfig {
    fn default() -> Self {
        Self {
            db_path: "seeker.db".to_string(),
            page_size: 30,
            debounce_ms: 300,
        }
    }
}

/// Parse command line arguments
fn parse_args() -> SeekerConfig {
    let args: Vec<String> = env::args().collect();
    let mut config = SeekerConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" => {
                if i + 1 < args.len() {
                    config.db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--page-size" => {
                if i + 1 < args.len() {
                    if let Ok(size) = args[i + 1].parse() {
                        config.page_size = size;
                    }
                    i += 1;
                }
            }
            "--debounce-ms" => {
                if i + 1 < args.len() {
                    if let Ok(ms) = args[i + 1].parse() {
                        config.debounce_ms = ms;
                    }
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    config
}

fn print_state(state: &ControllerState) {
    if let Some(ref message) = state.alert_message {
        println!("! {}", message);
        return;
    }

    if state.is_loading || state.is_loading_next_page {
        println!("... loading {:?}", state.query);
        return;
    }

    if !state.completed {
        return;
    }

    println!(
        "-- {:?}: {} items{}",
        state.query,
        state.items.len(),
        if state.can_load_more { " (more available)" } else { "" }
    );
    for item in state.displayed() {
        let star = if item.liked { "*" } else { " " };
        println!("  {star} {:>10}  {}", item.id, item.display_name);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli_config = parse_args();

    let client = Arc::new(GitHubSearchClient::new()?);
    let store = Arc::new(SqliteFavoritesStore::open(&cli_config.db_path)?);
    let controller = QueryController::new(
        client,
        store,
        ControllerConfig {
            page_size: cli_config.page_size,
            debounce: std::time::Duration::from_millis(cli_config.debounce_ms),
            ..ControllerConfig::default()
        },
    )
    .await;

    // Print every state change in the background
    let mut state_rx = controller.subscribe();
    let printer = tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow_and_update().clone();
            print_state(&state);
        }
    });

    println!("seeker - type a query, :more, :like <id>, :sort asc|desc, :quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').unwrap_or((line, "")) {
            (":quit", _) => break,
            (":more", _) => {
                if let Some(last) = controller.state().displayed().last() {
                    controller.load_more_if_needed(last.id);
                }
            }
            (":like", rest) => match rest.trim().parse() {
                Ok(id) => controller.toggle_like(id),
                Err(_) => println!("usage: :like <id>"),
            },
            (":sort", rest) => match rest.trim() {
                "asc" => controller.set_sort_direction(SortDirection::Ascending),
                "desc" => controller.set_sort_direction(SortDirection::Descending),
                _ => println!("usage: :sort asc|desc"),
            },
            _ => controller.on_query_changed(line),
        }
    }

    controller.shutdown().await;
    printer.abort();
    Ok(())
}
