use crate::{Context, emit_success};
use anyhow::Context as _;
use refgraph::config::{self, RefgraphConfig};
use refgraph::graph::NodeIdentity;
use refgraph::reference::ReferenceRequest;
use refgraph::server::{self, AppState};
use refgraph::storage::SqliteStore;
use refgraph::ui::{self, Icons};
use refgraph::ReferenceService;
use std::io::Read;
use std::path::Path;

fn open_store(ctx: &Context) -> anyhow::Result<SqliteStore> {
    config::ensure_db_dir(&ctx.database)?;
    let store = SqliteStore::open(&ctx.database)
        .with_context(|| format!("failed to open database {}", ctx.database.display()))?;
    Ok(store)
}

fn read_references(file: Option<&Path>) -> anyhow::Result<Vec<ReferenceRequest>> {
    let Some(file) = file else {
        return Ok(Vec::new());
    };

    let contents = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?
    };

    let references: Vec<ReferenceRequest> = serde_json::from_str(&contents)
        .with_context(|| format!("invalid reference list in {}", file.display()))?;
    Ok(references)
}

pub fn run_init(ctx: &Context, force: bool) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let starter = RefgraphConfig::starter(Path::new("."));

    config::write_config(&ctx.config_path, &starter, force)?;
    config::ensure_db_dir(&starter.database_path())?;
    config::ensure_gitignore(&root)?;

    if ctx.output_mode.is_human() {
        ui::success(&format!("Wrote {}", ctx.config_path.display()));
        ui::summary_row("Database:", &starter.database_path().display().to_string());
    }
    emit_success(
        ctx.output_mode,
        "init",
        serde_json::json!({
            "config": ctx.config_path,
            "database": starter.database_path(),
        }),
    )
}

pub fn run_bind(
    ctx: &Context,
    user: Option<i64>,
    source_id: i64,
    source_name: &str,
    file: Option<&Path>,
) -> anyhow::Result<()> {
    let user_id = ctx.user(user)?;
    let references = read_references(file)?;
    let count = references.len();

    let store = open_store(ctx)?;
    ReferenceService::new(&store).bind(user_id, source_id, source_name, references)?;

    if ctx.output_mode.is_human() {
        if count == 0 {
            ui::success(&format!("Cleared references of article {} ({})", source_id, source_name));
        } else {
            ui::success(&format!("Bound {} references for article {} ({})", count, source_id, source_name));
        }
    }
    emit_success(
        ctx.output_mode,
        "bind",
        serde_json::json!({ "sourceId": source_id, "references": count }),
    )
}

pub fn run_delete(ctx: &Context, source_id: i64) -> anyhow::Result<()> {
    let store = open_store(ctx)?;
    ReferenceService::new(&store).delete(source_id)?;

    if ctx.output_mode.is_human() {
        ui::success(&format!("Removed references of article {}", source_id));
    }
    emit_success(ctx.output_mode, "delete", serde_json::json!({ "sourceId": source_id }))
}

pub fn run_check(ctx: &Context, url: &str) -> anyhow::Result<()> {
    let store = open_store(ctx)?;
    let referenced = ReferenceService::new(&store).check(url)?;

    if ctx.output_mode.is_human() {
        if referenced {
            ui::warn(&format!("{} is referenced by at least one article", url));
        } else {
            ui::success(&format!("{} is not referenced", url));
        }
    }
    emit_success(
        ctx.output_mode,
        "check",
        serde_json::json!({ "url": url, "referenced": referenced }),
    )
}

pub fn run_list(ctx: &Context, source_id: i64) -> anyhow::Result<()> {
    let store = open_store(ctx)?;
    let records = ReferenceService::new(&store).references_of(source_id)?;

    if ctx.output_mode.is_human() {
        if records.is_empty() {
            ui::empty(&format!("Article {} references nothing.", source_id));
        } else {
            ui::header(&format!("References of {} ({})", records[0].source_name, source_id));
            println!("{}", ui::records_table(&records));
        }
    }
    emit_success(ctx.output_mode, "list", serde_json::to_value(&records)?)
}

pub fn run_graph(ctx: &Context, user: Option<i64>, only_inner: bool, identity: Option<&str>) -> anyhow::Result<()> {
    let user_id = ctx.user(user)?;
    let identity: NodeIdentity = match identity {
        Some(s) => s.parse()?,
        None => ctx.config.identity(),
    };

    let store = open_store(ctx)?;
    let graph = ReferenceService::with_identity(&store, identity).list_all(only_inner, user_id)?;

    if ctx.output_mode.is_human() {
        if graph.is_empty() {
            ui::empty(&format!("No references for user {}.", user_id));
        } else {
            ui::section(&format!("Nodes ({})", graph.nodes.len()));
            for node in &graph.nodes {
                println!("  {}", ui::node_line(node));
            }
            ui::section(&format!("Links ({})", graph.links.len()));
            for link in &graph.links {
                println!("  {}", ui::link_line(link));
            }
        }
    }
    emit_success(ctx.output_mode, "graph", serde_json::to_value(&graph)?)
}

pub fn run_stats(ctx: &Context) -> anyhow::Result<()> {
    let store = open_store(ctx)?;
    let stats = store.stats()?;

    if ctx.output_mode.is_human() {
        ui::header(&format!("{} Refgraph Statistics ({})", Icons::STATS, ctx.database.display()));
        println!(
            "{}",
            ui::stats_table(&[
                ("References", stats.references.to_string()),
                ("Inner", stats.inner.to_string()),
                ("External", stats.external.to_string()),
                ("Source articles", stats.sources.to_string()),
                ("Distinct targets", stats.targets.to_string()),
            ])
        );
    }
    emit_success(ctx.output_mode, "stats", serde_json::to_value(&stats)?)
}

pub fn run_serve(ctx: &Context, port: Option<u16>) -> anyhow::Result<()> {
    let store = open_store(ctx)?;
    let port = port.unwrap_or_else(|| ctx.config.port());
    let state = AppState::new(store, ctx.config.identity(), ctx.config.user);

    if ctx.output_mode.is_human() {
        ui::header(&format!("Serving {} on http://0.0.0.0:{}", ctx.database.display(), port));
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::start_server(port, state))
}
