//! dash-runner: headless runner for the Quintiles dashboard core.
//!
//! Usage:
//!   dash-runner --db rfm_churn_ltv.db --strategy shield
//!   dash-runner --demo 1000 --seed 7 --search c0001
//!   dash-runner --db rfm_churn_ltv.db --ipc-mode

use anyhow::{Context, Result};
use quintiles_core::{
    config::DashboardConfig,
    dashboard::{DashboardSession, DashboardState},
    selection::SelectionEdit,
    store::AccountStore,
    strategy::Strategy,
    synth::SyntheticAccounts,
    types::{Category, Dimension},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Strategy {
        name: String,
    },
    Toggle {
        dimension: Dimension,
        value: Category,
        included: bool,
    },
    SelectAll {
        dimension: Dimension,
        included: bool,
    },
    Replace {
        dimension: Dimension,
        values: Vec<Category>,
    },
    Reset,
    Search {
        query: String,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let demo_rows = parse_arg(&args, "--demo", 0usize);
    let seed = parse_arg(&args, "--seed", 42u64);
    let db = str_arg(&args, "--db").unwrap_or("rfm_churn_ltv.db");
    let data_dir = str_arg(&args, "--data-dir").unwrap_or("./data");
    let strategy = str_arg(&args, "--strategy");
    let search = str_arg(&args, "--search");

    let config = if std::path::Path::new(&format!("{data_dir}/dashboard.json")).exists() {
        DashboardConfig::load(data_dir)?
    } else {
        log::warn!("No dashboard.json in {data_dir}; using built-in defaults");
        DashboardConfig::default_test()
    };

    let store = if demo_rows > 0 {
        demo_store(&config, demo_rows, seed)?
    } else {
        AccountStore::open(db).with_context(|| format!("Cannot open {db}"))?
    };

    let mut session = DashboardSession::load(&store, config)?;
    if let Some(name) = strategy {
        session.apply_strategy(Strategy::parse(name));
    }

    if ipc_mode {
        run_ipc_loop(&mut session)?;
    } else {
        print_summary(&session, search);
    }

    Ok(())
}

/// In-memory store seeded with synthetic accounts. Loading still goes
/// through the regular table path.
fn demo_store(config: &DashboardConfig, rows: usize, seed: u64) -> Result<AccountStore> {
    let store = AccountStore::in_memory()?;
    store.migrate()?;
    let accounts = SyntheticAccounts::new(seed).with_null_rate(0.02).generate(rows);
    store.insert_accounts(&config.source, &accounts)?;
    log::info!("Seeded demo store with {rows} accounts (seed {seed})");
    Ok(store)
}

fn run_ipc_loop(session: &mut DashboardSession) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut search: Option<String> = None;

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Strategy { name } => session.apply_strategy(Strategy::parse(&name)),
            IpcCommand::Toggle { dimension, value, included } => {
                session.apply_edit(SelectionEdit::Toggle { dimension, value, included });
            }
            IpcCommand::SelectAll { dimension, included } => {
                session.apply_edit(SelectionEdit::SelectAll { dimension, included });
            }
            IpcCommand::Replace { dimension, values } => {
                session.apply_edit(SelectionEdit::Replace { dimension, values });
            }
            IpcCommand::Reset => {
                session.reset();
                search = None;
            }
            IpcCommand::Search { query } => search = Some(query),
        }

        let state = session.state(search.as_deref());
        writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn print_summary(session: &DashboardSession, search: Option<&str>) {
    let profile = session.dataset().profile();
    let state: DashboardState = session.state(search);

    println!("Quintiles — dash-runner");
    println!("  session:   {}", session.session_id);
    println!("  loaded at: {}", session.loaded_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  rows:      {}", profile.rows);
    println!("  columns:   {}", profile.columns.join(", "));
    if let Some(report) = &state.segments {
        if let Some(f) = report.repurchase_fallback {
            println!("  repurchase segment degraded: {}", f.label());
        }
        if let Some(f) = report.value_fallback {
            println!("  value potential degraded:    {}", f.label());
        }
    }
    println!();

    println!("=== STRATEGY ===");
    println!("  {} — {}", state.strategy_name, state.strategy_description);
    for dimension in Dimension::ALL {
        if !state.universe.has_dimension(dimension) {
            continue;
        }
        println!(
            "  {:<24} {}/{}",
            dimension.label(),
            state.selection.values(dimension).len(),
            state.universe.values(dimension).len(),
        );
    }
    println!();

    let m = &state.metrics;
    println!("=== METRICS ===");
    println!("  accounts selected: {}", m.accounts);
    println!("  avg churn risk:    {}", percent(m.avg_churn_probability));
    println!("  total CLV (90d):   ${:.0}", m.total_clv_90d);
    println!("  avg propensity:    {}", percent(m.avg_purchase_probability));
    println!();

    println!("=== INSIGHTS ===");
    println!("  VIP accounts:    {}", state.insights.vip_accounts);
    println!("  upcoming sales:  {}", state.insights.upcoming_sales);
    println!("  critical risk:   {}", state.insights.critical_risk);
    println!();

    println!("=== RFM DISTRIBUTION ===");
    if state.rfm_distribution.is_empty() {
        println!("  (no accounts selected)");
    }
    for c in &state.rfm_distribution {
        println!("  {:<28} {}", c.category, c.accounts);
    }

    if let Some(query) = search {
        println!();
        println!("=== SEARCH '{query}' ({} matches) ===", state.table_matches);
        for row in state.table.iter().take(20) {
            println!(
                "  {:<12} {:<26} {:<16} {}",
                row.account_id,
                row.rfm_segment.as_deref().unwrap_or("-"),
                row.value_potential.as_deref().unwrap_or("-"),
                row.clv_90d.map_or_else(|| "-".to_string(), |v| format!("${v:.2}")),
            );
        }
    }
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "0%".to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
