use crate::cmd::{actor, open_store, print_requests, print_transition};
use clap::Subcommand;
use std::path::Path;
use upstac_core::query::QueryService;
use upstac_core::request::ConsultationInput;
use upstac_core::types::{DoctorSuggestion, RequestStatus};
use upstac_core::update::UpdateService;

#[derive(Subcommand)]
pub enum ConsultSubcommand {
    /// Requests with a lab result, waiting for a doctor
    Queue,
    /// Requests assigned to a doctor
    Mine {
        #[arg(long = "as")]
        doctor: String,
    },
    /// Take a request for consultation
    Assign {
        id: u64,
        #[arg(long = "as")]
        doctor: String,
    },
    /// Record the doctor's suggestion, completing the request
    Update {
        id: u64,
        #[arg(long = "as")]
        doctor: String,
        /// no-issues, home-quarantine or admit
        #[arg(long)]
        suggestion: String,
        #[arg(long)]
        comments: Option<String>,
    },
}

pub fn run(root: &Path, subcmd: ConsultSubcommand, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    match subcmd {
        ConsultSubcommand::Queue => {
            let queue = QueryService::new(&store).find_by_status(RequestStatus::LabTestCompleted)?;
            print_requests(&queue, json)
        }
        ConsultSubcommand::Mine { doctor } => {
            let doctor = actor(root, &doctor)?;
            let mine = QueryService::new(&store).find_by_doctor(&doctor)?;
            print_requests(&mine, json)
        }
        ConsultSubcommand::Assign { id, doctor } => {
            let doctor = actor(root, &doctor)?;
            let request = UpdateService::new(&store).assign_for_consultation(id, &doctor)?;
            print_transition(&request, json)
        }
        ConsultSubcommand::Update {
            id,
            doctor,
            suggestion,
            comments,
        } => {
            let doctor = actor(root, &doctor)?;
            let input = ConsultationInput {
                suggestion: Some(suggestion.parse::<DoctorSuggestion>()?),
                comments,
            };
            let request = UpdateService::new(&store).update_consultation(id, input, &doctor)?;
            print_transition(&request, json)
        }
    }
}
