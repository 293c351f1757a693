use crate::cmd::{actor, open_store, print_requests, print_transition};
use clap::Subcommand;
use std::path::Path;
use upstac_core::query::QueryService;
use upstac_core::request::LabResultInput;
use upstac_core::types::{RequestStatus, TestStatus};
use upstac_core::update::UpdateService;

#[derive(Subcommand)]
pub enum LabSubcommand {
    /// Requests waiting for a tester
    Queue,
    /// Requests assigned to a tester
    Mine {
        #[arg(long = "as")]
        tester: String,
    },
    /// Take a request for lab testing
    Assign {
        id: u64,
        #[arg(long = "as")]
        tester: String,
    },
    /// Record the lab result for an assigned request
    Update {
        id: u64,
        #[arg(long = "as")]
        tester: String,
        #[arg(long)]
        blood_pressure: String,
        #[arg(long)]
        heart_beat: String,
        #[arg(long)]
        temperature: String,
        #[arg(long)]
        oxygen_level: String,
        /// positive or negative
        #[arg(long)]
        result: String,
        #[arg(long)]
        comments: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: LabSubcommand, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    match subcmd {
        LabSubcommand::Queue => {
            let queue = QueryService::new(&store).find_by_status(RequestStatus::Initiated)?;
            print_requests(&queue, json)
        }
        LabSubcommand::Mine { tester } => {
            let tester = actor(root, &tester)?;
            let mine = QueryService::new(&store).find_by_tester(&tester)?;
            print_requests(&mine, json)
        }
        LabSubcommand::Assign { id, tester } => {
            let tester = actor(root, &tester)?;
            let request = UpdateService::new(&store).assign_for_lab_test(id, &tester)?;
            print_transition(&request, json)
        }
        LabSubcommand::Update {
            id,
            tester,
            blood_pressure,
            heart_beat,
            temperature,
            oxygen_level,
            result,
            comments,
        } => {
            let tester = actor(root, &tester)?;
            let input = LabResultInput {
                blood_pressure,
                heart_beat,
                temperature,
                oxygen_level,
                comments,
                result: Some(result.parse::<TestStatus>()?),
            };
            let request = UpdateService::new(&store).update_lab_test(id, input, &tester)?;
            print_transition(&request, json)
        }
    }
}
