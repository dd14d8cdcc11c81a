use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use canvas::camera::{Camera, Point};
use canvas::consts::FIT_PADDING_PX;
use canvas::doc::{EdgeKind, FloorPlan};
use canvas::fit::fit_to_content;
use canvas::geometry::compute_bounds;
use canvas::scene::{RenderMode, build_scene, select_mode};
use canvas::svg::{png_document, to_svg};
use canvas::units::UnitSystem;
use clap::{Args, Parser, Subcommand, ValueEnum};
use client::config::{ConfigError, EditorConfig};
use client::net::api::{ApiClient, ApiError, FloorPlanBackend};
use client::net::types::{FloorPlanSummary, NodePosition, PlanId, UserId, UserPayload};
use client::state::draft::EdgeDraft;
use client::state::editor::{Confirmation, EditorError, EditorState, LoadedPlan, RedesignOutcome};
use serde_json::Value;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("plan has no room `{0}`")]
    UnknownRoom(String),
    #[error("nothing to add: both ends resolve to the same node")]
    EmptyDraft,
}

#[derive(Parser, Debug)]
#[command(name = "floorplan", about = "Floor-plan service client and offline renderer")]
struct Cli {
    #[arg(long, env = "FLOORPLAN_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "FLOORPLAN_USER_ID")]
    user_id: Option<String>,

    #[arg(long, env = "FLOORPLAN_PAGE_SIZE")]
    page_size: Option<String>,

    /// Log remote calls to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the service is up.
    Health,
    Plan(PlanCommand),
    Nodes(NodesCommand),
    Edges(EdgesCommand),
    User(UserCommand),
}

#[derive(Args, Debug)]
struct PlanCommand {
    #[command(subcommand)]
    command: PlanSubcommand,
}

#[derive(Subcommand, Debug)]
enum PlanSubcommand {
    /// Digitize a floor-plan photo into a new stored plan.
    Upload {
        file: PathBuf,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        scale_factor: Option<f64>,
    },
    /// Show a stored plan's summary, or its raw JSON.
    Get {
        plan_id: PlanId,
        #[arg(long)]
        json: bool,
        /// List every edge with its length.
        #[arg(long)]
        edges: bool,
    },
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long)]
        limit: Option<u32>,
    },
    Rename {
        plan_id: PlanId,
        name: String,
    },
    Delete {
        plan_id: PlanId,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Render a stored plan (or the bundled sample) to SVG.
    Render(RenderArgs),
    /// Request redesign alternatives and write each as SVG.
    Redesign(RedesignArgs),
    /// Calibrate a plan from a measured pixels-per-meter ratio.
    NormalizeScale {
        plan_id: PlanId,
        #[arg(long)]
        pixels_per_meter: f64,
    },
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(required_unless_present = "sample")]
    plan_id: Option<PlanId>,
    #[arg(long, conflicts_with = "plan_id")]
    sample: bool,
    #[arg(long, short)]
    out: PathBuf,
    #[arg(long, default_value_t = 1200.0)]
    width: f64,
    #[arg(long, default_value_t = 900.0)]
    height: f64,
}

#[derive(Args, Debug)]
struct RedesignArgs {
    plan_id: PlanId,
    /// Free-text wishes for the new layout.
    #[arg(long)]
    desires: Option<String>,
    /// Room id to keep unchanged; repeatable.
    #[arg(long = "lock")]
    locked: Vec<String>,
    #[arg(long)]
    count: Option<u32>,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    #[arg(long, default_value_t = 1200.0)]
    width: f64,
    #[arg(long, default_value_t = 900.0)]
    height: f64,
}

#[derive(Args, Debug)]
struct NodesCommand {
    #[command(subcommand)]
    command: NodesSubcommand,
}

#[derive(Subcommand, Debug)]
enum NodesSubcommand {
    /// Move nodes to new positions.
    Move {
        plan_id: PlanId,
        /// `ID:X,Y`; repeatable.
        #[arg(long = "node", value_parser = parse_node_position, required = true)]
        nodes: Vec<NodePosition>,
    },
}

#[derive(Args, Debug)]
struct EdgesCommand {
    #[command(subcommand)]
    command: EdgesSubcommand,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Wall,
    Door,
    Window,
}

impl From<KindArg> for EdgeKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Wall => Self::Wall,
            KindArg::Door => Self::Door,
            KindArg::Window => Self::Window,
        }
    }
}

#[derive(Subcommand, Debug)]
enum EdgesSubcommand {
    /// Add an edge between two positions, creating nodes where none exist.
    Add {
        plan_id: PlanId,
        #[arg(long, value_parser = parse_point)]
        from: Point,
        #[arg(long, value_parser = parse_point)]
        to: Point,
        #[arg(long, value_enum, default_value = "wall")]
        kind: KindArg,
        #[arg(long)]
        thickness: Option<f64>,
    },
    Delete {
        plan_id: PlanId,
        #[arg(required = true)]
        edge_ids: Vec<String>,
    },
    Merge {
        plan_id: PlanId,
        #[arg(required = true, num_args = 2..)]
        edge_ids: Vec<String>,
    },
}

#[derive(Args, Debug)]
struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Subcommand, Debug)]
enum UserSubcommand {
    Create {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Get {
        user_id: UserId,
    },
    Update {
        user_id: UserId,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Delete {
        user_id: UserId,
        #[arg(long)]
        yes: bool,
    },
}

struct CliContext {
    config: EditorConfig,
    api: ApiClient,
}

impl CliContext {
    fn editor(&self) -> EditorState {
        EditorState::new(self.config.user_id, self.config.page_size)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, ".env not loaded");
        }
    }

    let overrides = [
        ("FLOORPLAN_API_BASE_URL", cli.base_url.clone()),
        ("FLOORPLAN_USER_ID", cli.user_id.clone()),
        ("FLOORPLAN_PAGE_SIZE", cli.page_size.clone()),
    ];
    let config = EditorConfig::from_lookup(|key| {
        overrides
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.clone())
    })?;
    tracing::debug!(base_url = %config.api_base_url, user_id = config.user_id, "configured");
    let ctx = CliContext { api: ApiClient::new(&config.api_base_url), config };

    match cli.command {
        Command::Health => run_health(&ctx).await,
        Command::Plan(plan) => run_plan(&ctx, plan.command).await,
        Command::Nodes(nodes) => run_nodes(&ctx, nodes.command).await,
        Command::Edges(edges) => run_edges(&ctx, edges.command).await,
        Command::User(user) => run_user(&ctx, user.command).await,
    }
}

async fn run_health(ctx: &CliContext) -> Result<(), CliError> {
    let health = ctx.api.health().await?;
    let status = if health.status.is_empty() { "ok" } else { health.status.as_str() };
    println!("{status}");
    Ok(())
}

async fn run_plan(ctx: &CliContext, command: PlanSubcommand) -> Result<(), CliError> {
    match command {
        PlanSubcommand::Upload { file, name, scale_factor } => {
            let bytes = std::fs::read(&file)?;
            let file_name = file_name_of(&file);
            let name = name.unwrap_or_else(|| plan_name_from_file(&file));
            let mut state = ctx.editor();
            let id = state.upload_image(&ctx.api, &name, scale_factor, &file_name, bytes).await?;
            println!("created plan {id}");
            println!("{}", describe_plan(&state.current));
            Ok(())
        }
        PlanSubcommand::Get { plan_id, json, edges } => {
            if json {
                let detail = ctx.api.get_plan(plan_id).await?;
                return print_json(&serde_json::to_value(&detail)?);
            }
            let mut state = ctx.editor();
            state.open_plan(&ctx.api, plan_id).await?;
            println!("{}", describe_plan(&state.current));
            if edges {
                for line in edge_lines(&state.current.plan, &state.current.units()) {
                    println!("  {line}");
                }
            }
            Ok(())
        }
        PlanSubcommand::List { skip, limit } => {
            let limit = limit.unwrap_or(ctx.config.page_size);
            let plans = ctx.api.list_plans(ctx.config.user_id, skip, limit).await?;
            if plans.is_empty() {
                println!("no plans for user {}", ctx.config.user_id);
            }
            for plan in &plans {
                println!("{}", summary_line(plan));
            }
            Ok(())
        }
        PlanSubcommand::Rename { plan_id, name } => {
            let summary = ctx.api.rename_plan(plan_id, &name).await?;
            println!("{}", summary_line(&summary));
            Ok(())
        }
        PlanSubcommand::Delete { plan_id, yes } => {
            let confirmation = if yes { Confirmation::Confirmed } else { confirm(&format!("Delete plan {plan_id}?"))? };
            let mut state = ctx.editor();
            state.delete_plan(&ctx.api, plan_id, confirmation).await?;
            println!("deleted plan {plan_id}");
            Ok(())
        }
        PlanSubcommand::Render(args) => run_render(ctx, args).await,
        PlanSubcommand::Redesign(args) => run_redesign(ctx, args).await,
        PlanSubcommand::NormalizeScale { plan_id, pixels_per_meter } => {
            let mut state = ctx.editor();
            state.open_plan(&ctx.api, plan_id).await?;
            let response = state.normalize_scale(&ctx.api, pixels_per_meter).await?;
            if !response.message.is_empty() {
                println!("{}", response.message);
            }
            println!(
                "unit scale {} -> {} (factor {})",
                response.previous_unit_scale.map_or_else(|| "none".to_owned(), |s| s.to_string()),
                response.new_unit_scale,
                response.scale_factor
            );
            println!("{}", describe_plan(&state.current));
            Ok(())
        }
    }
}

async fn run_render(ctx: &CliContext, args: RenderArgs) -> Result<(), CliError> {
    let loaded = match args.plan_id {
        Some(id) if !args.sample => {
            let mut state = ctx.editor();
            state.open_plan(&ctx.api, id).await?;
            state.current
        }
        _ => LoadedPlan::sample(),
    };
    std::fs::write(&args.out, render_svg(&loaded.plan, args.width, args.height))?;
    println!("{}", describe_plan(&loaded));
    println!("wrote {}", args.out.display());
    Ok(())
}

async fn run_redesign(ctx: &CliContext, args: RedesignArgs) -> Result<(), CliError> {
    let mut state = ctx.editor();
    state.open_plan(&ctx.api, args.plan_id).await?;
    state.set_redesign_mode(true);
    for room_id in &args.locked {
        if state.toggle_room_lock(room_id)?.is_none() {
            return Err(CliError::UnknownRoom(room_id.clone()));
        }
    }

    let outcome = state.request_redesign(&ctx.api, args.desires.clone(), args.count).await?;
    std::fs::create_dir_all(&args.out_dir)?;
    match outcome {
        RedesignOutcome::Alternatives(alternatives) => {
            if alternatives.is_empty() {
                println!("no alternatives returned");
            }
            for (i, alt) in alternatives.iter().enumerate() {
                let path = args.out_dir.join(format!("alternative-{}.svg", i + 1));
                std::fs::write(&path, render_svg(&alt.plan.plan, args.width, args.height))?;
                println!("{} ({:.2}s) {}", path.display(), alt.solve_time, alt.message);
            }
        }
        RedesignOutcome::Image { image_base64, message } => {
            let path = args.out_dir.join("redesign.svg");
            std::fs::write(&path, png_document(image_base64, args.width, args.height))?;
            println!("{} {message}", path.display());
        }
    }
    Ok(())
}

async fn run_nodes(ctx: &CliContext, command: NodesSubcommand) -> Result<(), CliError> {
    match command {
        NodesSubcommand::Move { plan_id, nodes } => {
            let mut state = ctx.editor();
            state.open_plan(&ctx.api, plan_id).await?;
            state.move_nodes(&ctx.api, nodes).await?;
            println!("{}", describe_plan(&state.current));
            Ok(())
        }
    }
}

async fn run_edges(ctx: &CliContext, command: EdgesSubcommand) -> Result<(), CliError> {
    let mut state = ctx.editor();
    match command {
        EdgesSubcommand::Add { plan_id, from, to, kind, thickness } => {
            state.open_plan(&ctx.api, plan_id).await?;
            let mut draft = EdgeDraft::new(&state.current.plan);
            if !draft.add(from, to, kind.into(), thickness) {
                return Err(CliError::EmptyDraft);
            }
            let (edges, new_nodes) = draft.into_parts();
            state.add_edges(&ctx.api, edges, new_nodes).await?;
        }
        EdgesSubcommand::Delete { plan_id, edge_ids } => {
            state.open_plan(&ctx.api, plan_id).await?;
            state.delete_edges(&ctx.api, edge_ids).await?;
        }
        EdgesSubcommand::Merge { plan_id, edge_ids } => {
            state.open_plan(&ctx.api, plan_id).await?;
            state.merge_edges(&ctx.api, edge_ids).await?;
        }
    }
    println!("{}", describe_plan(&state.current));
    Ok(())
}

async fn run_user(ctx: &CliContext, command: UserSubcommand) -> Result<(), CliError> {
    match command {
        UserSubcommand::Create { username, email } => {
            let user = ctx.api.create_user(&UserPayload { username, email }).await?;
            print_json(&serde_json::to_value(&user)?)
        }
        UserSubcommand::Get { user_id } => {
            let user = ctx.api.get_user(user_id).await?;
            print_json(&serde_json::to_value(&user)?)
        }
        UserSubcommand::Update { user_id, username, email } => {
            let user = ctx.api.update_user(user_id, &UserPayload { username, email }).await?;
            print_json(&serde_json::to_value(&user)?)
        }
        UserSubcommand::Delete { user_id, yes } => {
            let confirmation = if yes { Confirmation::Confirmed } else { confirm(&format!("Delete user {user_id}?"))? };
            if confirmation != Confirmation::Confirmed {
                return Err(EditorError::NotConfirmed.into());
            }
            ctx.api.delete_user(user_id).await?;
            println!("deleted user {user_id}");
            Ok(())
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Render a plan fitted into a `width` x `height` SVG.
fn render_svg(plan: &FloorPlan, width: f64, height: f64) -> String {
    let scene = build_scene(plan);
    let camera = compute_bounds(plan).map_or_else(Camera::default, |b| fit_to_content(&b, width, height, FIT_PADDING_PX));
    to_svg(&scene, &camera, width, height)
}

fn describe_plan(loaded: &LoadedPlan) -> String {
    let plan = &loaded.plan;
    let id = loaded.id.map_or_else(|| "unsaved".to_owned(), |id| format!("#{id}"));
    let mode = match select_mode(plan) {
        RenderMode::Rich => "rich",
        RenderMode::Fallback => "fallback",
    };
    let scale = loaded
        .units()
        .unit_scale()
        .map_or_else(|| "uncalibrated".to_owned(), |s| format!("{s} units/m"));
    format!(
        "{} ({id}): {} nodes, {} edges, {} rooms, {} fixtures; {mode} rendering; {scale}",
        loaded.name,
        plan.nodes.len(),
        plan.edges.len(),
        plan.rooms.len(),
        plan.fixtures.len(),
    )
}

fn summary_line(plan: &FloorPlanSummary) -> String {
    format!(
        "{:>6}  {}  ({} nodes, {} edges, {} rooms, {} fixtures)",
        plan.id, plan.name, plan.nodes_count, plan.edges_count, plan.rooms_count, plan.fixtures_count
    )
}

/// One line per edge: id, kind, and length in the plan's display unit.
/// Edges with a missing endpoint are reported as dangling.
fn edge_lines(plan: &FloorPlan, units: &UnitSystem) -> Vec<String> {
    let unit = units.default_unit();
    let index = plan.node_index();
    plan.edges
        .iter()
        .map(|edge| match (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
            (Some(a), Some(b)) => {
                let length = (b.x - a.x).hypot(b.y - a.y);
                format!("{} {} {}", edge.id, edge.kind.as_str(), units.format(length, unit))
            }
            _ => format!("{} {} dangling", edge.id, edge.kind.as_str()),
        })
        .collect()
}

fn parse_point(raw: &str) -> Result<Point, String> {
    let (x, y) = raw.split_once(',').ok_or_else(|| format!("expected X,Y, got `{raw}`"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x in `{raw}`: {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y in `{raw}`: {e}"))?;
    Ok(Point::new(x, y))
}

fn parse_node_position(raw: &str) -> Result<NodePosition, String> {
    let (id, point) = raw.split_once(':').ok_or_else(|| format!("expected ID:X,Y, got `{raw}`"))?;
    if id.trim().is_empty() {
        return Err(format!("missing node id in `{raw}`"));
    }
    let p = parse_point(point)?;
    Ok(NodePosition { id: id.trim().to_owned(), x: p.x, y: p.y })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned())
}

fn plan_name_from_file(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "Untitled plan".to_owned(), |n| n.to_string_lossy().into_owned())
}

fn confirm(prompt: &str) -> Result<Confirmation, CliError> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(confirmation_from(&answer))
}

fn confirmation_from(answer: &str) -> Confirmation {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Confirmation::Confirmed,
        _ => Confirmation::Declined,
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
