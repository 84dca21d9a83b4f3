use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};

use chalkshift_engine::apply::{
    self, ApplyPolicy, LastWriterWins, MemoryWriter, VersionChecked,
};
use chalkshift_engine::model::{MoveProposal, RotationPlan, SchoolSnapshot, SwapStop};
use chalkshift_engine::store::TimetableStore;
use chalkshift_engine::{advisory, planner, rotation, rules};

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
enum Request {
    EvaluateMove {
        snapshot: SchoolSnapshot,
        source_entry_id: String,
        day: u8,
        period: u8,
    },
    PlanCyclicSwap {
        snapshot: SchoolSnapshot,
        queue: Vec<SwapStop>,
    },
    /// Applies either a proposal from `evaluateMove` or a plan from
    /// `planCyclicSwap`. `strict` selects the version-checked apply policy
    /// instead of the default last-writer-wins overwrite.
    Apply {
        snapshot: SchoolSnapshot,
        proposal: Option<MoveProposal>,
        plan: Option<RotationPlan>,
        #[serde(default)]
        strict: bool,
    },
    IsLocked {
        snapshot: SchoolSnapshot,
        class_id: String,
        day: u8,
        period: u8,
    },
    Advise {
        snapshot: SchoolSnapshot,
        teacher_name: String,
        day: u8,
        period: u8,
    },
}

#[derive(Debug, Serialize)]
struct OkResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ErrResponse {
    ok: bool,
    error: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_ok<T: Serialize>(data: T) {
    let resp = OkResponse { ok: true, data };
    let json = serde_json::to_string(&resp).unwrap_or_else(|e| {
        format!("{{\"ok\":false,\"error\":\"serialization error: {}\"}}", e)
    });
    println!("{}", json);
    let _ = io::stdout().flush();
}

fn write_err(msg: impl std::fmt::Display) -> ! {
    let resp = ErrResponse {
        ok: false,
        error: msg.to_string(),
    };
    let json = serde_json::to_string(&resp).unwrap_or_else(|_| {
        "{\"ok\":false,\"error\":\"double serialization error\"}".to_string()
    });
    println!("{}", json);
    let _ = io::stdout().flush();
    std::process::exit(1);
}

fn build_store(snapshot: SchoolSnapshot) -> TimetableStore {
    match TimetableStore::from_snapshot(snapshot) {
        Ok(store) => store,
        Err(e) => write_err(e),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();

    // Read all of stdin
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        write_err(format!("Failed to read stdin: {}", e));
    }

    // Parse request
    let request: Request = match serde_json::from_str(&input) {
        Ok(r) => r,
        Err(e) => write_err(format!("Invalid JSON input: {}", e)),
    };

    match request {
        Request::EvaluateMove {
            snapshot,
            source_entry_id,
            day,
            period,
        } => {
            let store = build_store(snapshot);
            match planner::evaluate_move(&store, &source_entry_id, day, period) {
                Ok(proposals) => write_ok(proposals),
                Err(e) => write_err(e),
            }
        }
        Request::PlanCyclicSwap { snapshot, queue } => {
            let store = build_store(snapshot);
            match rotation::plan_cyclic_swap(&store, &queue) {
                Ok(plan) => write_ok(plan),
                Err(e) => write_err(e),
            }
        }
        Request::Apply {
            snapshot,
            proposal,
            plan,
            strict,
        } => {
            let mut store = build_store(snapshot);
            let policy: &dyn ApplyPolicy = if strict { &VersionChecked } else { &LastWriterWins };
            let mut writer = MemoryWriter::default();
            let result = match (proposal, plan) {
                (Some(proposal), None) => {
                    apply::apply_proposal(&mut store, &proposal, policy, &mut writer)
                }
                (None, Some(plan)) => apply::apply_plan(&mut store, &plan, policy, &mut writer),
                _ => write_err("apply takes exactly one of 'proposal' or 'plan'"),
            };
            match result {
                Ok(snapshot) => write_ok(snapshot),
                Err(e) => write_err(e),
            }
        }
        Request::IsLocked {
            snapshot,
            class_id,
            day,
            period,
        } => {
            let store = build_store(snapshot);
            write_ok(rules::is_blocked(&store, &class_id, day, period));
        }
        Request::Advise {
            snapshot,
            teacher_name,
            day,
            period,
        } => {
            let store = build_store(snapshot);
            write_ok(advisory::advise(&store, &teacher_name, day, period));
        }
    }
}
