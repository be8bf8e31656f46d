use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use serde::Serialize;
use slotwise_core::{AllocationMode, OutcomePredictor, PlanRequest, Planner, RiskScorer};
use tracing::debug;

use super::load_config;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Args)]
pub struct InputArgs {
    /// Plan request JSON file ("-" reads stdin)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Override the allocation mode of the request
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,
}

#[derive(Args)]
pub struct OutcomeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Completed count; defaults to the items flagged completed
    #[arg(long)]
    pub completed: Option<usize>,
}

#[derive(Args)]
pub struct ProposeArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Item to move earlier
    #[arg(long)]
    pub item: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Mode {
    Single,
    Chunked,
}

impl From<Mode> for AllocationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Single => AllocationMode::Single,
            Mode::Chunked => AllocationMode::Chunked,
        }
    }
}

fn read_request(path: &Path) -> Result<PlanRequest, Box<dyn std::error::Error>> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?
    };
    let request: PlanRequest = serde_json::from_str(&content)?;
    debug!(
        items = request.items.len(),
        busy = request.busy.len(),
        committed = request.schedule.len(),
        "request loaded"
    );
    Ok(request)
}

fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn prepare(
    args: PlanArgs,
    config: Option<&Path>,
) -> Result<(Planner, PlanRequest), Box<dyn std::error::Error>> {
    let planner = Planner::with_config(load_config(config)?);
    let mut request = read_request(&args.input.input)?;
    if let Some(mode) = args.mode {
        request.mode = mode.into();
    }
    Ok((planner, request))
}

pub fn plan(args: PlanArgs, config: Option<&Path>) -> CmdResult {
    let (planner, request) = prepare(args, config)?;
    print_json(&planner.plan(&request)?)
}

pub fn assess(args: PlanArgs, config: Option<&Path>) -> CmdResult {
    let (planner, request) = prepare(args, config)?;
    print_json(&planner.assess(&request)?)
}

pub fn risk(args: InputArgs, config: Option<&Path>) -> CmdResult {
    let config = load_config(config)?;
    let request = read_request(&args.input)?;
    request.validate()?;
    let reports = RiskScorer::with_config(config.risk).score(
        &request.history,
        &request.items,
        &request.schedule,
        request.now,
    );
    print_json(&reports)
}

pub fn outcome(args: OutcomeArgs, config: Option<&Path>) -> CmdResult {
    let config = load_config(config)?;
    let request = read_request(&args.input.input)?;
    request.validate()?;
    let completed = args
        .completed
        .unwrap_or_else(|| request.items.iter().filter(|i| i.completed).count());
    let prediction = OutcomePredictor::with_config(config.outcome).predict(
        &request.history,
        &request.items,
        completed,
    );
    print_json(&prediction)
}

pub fn propose(args: ProposeArgs, config: Option<&Path>) -> CmdResult {
    let planner = Planner::with_config(load_config(config)?);
    let request = read_request(&args.input.input)?;
    match planner.propose(&args.item, &request)? {
        Some(proposal) => print_json(&proposal),
        None => {
            eprintln!("no earlier slot for {}", args.item);
            println!("null");
            Ok(())
        }
    }
}
