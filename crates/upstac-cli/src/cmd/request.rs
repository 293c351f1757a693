use crate::cmd::{actor, open_store, print_requests};
use crate::output::{print_json, print_table};
use clap::Subcommand;
use std::path::Path;
use upstac_core::intake::IntakeService;
use upstac_core::query::QueryService;
use upstac_core::request::CreateTestRequest;
use upstac_core::store::TestRequestStore;
use upstac_core::types::{Gender, RequestStatus};

#[derive(Subcommand)]
pub enum RequestSubcommand {
    /// File a new test request on behalf of a user
    Create {
        /// Requesting username
        #[arg(long = "as")]
        user: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: u32,
        /// male, female or other
        #[arg(long)]
        gender: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        pin_code: String,
    },
    /// List test requests
    List {
        /// Only requests in this status (e.g. lab-test-completed)
        #[arg(long)]
        status: Option<String>,
        /// Only requests filed by this user
        #[arg(long)]
        creator: Option<String>,
    },
    /// Show a single test request
    Show { id: u64 },
    /// Show the status history of a test request
    Flow { id: u64 },
}

pub fn run(root: &Path, subcmd: RequestSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RequestSubcommand::Create {
            user,
            name,
            age,
            gender,
            email,
            phone,
            address,
            pin_code,
        } => {
            let details = CreateTestRequest {
                name,
                age,
                gender: gender.parse::<Gender>()?,
                email,
                phone_number: phone,
                address,
                pin_code,
            };
            create(root, &user, details, json)
        }
        RequestSubcommand::List { status, creator } => {
            list(root, status.as_deref(), creator.as_deref(), json)
        }
        RequestSubcommand::Show { id } => show(root, id, json),
        RequestSubcommand::Flow { id } => flow(root, id, json),
    }
}

fn create(root: &Path, username: &str, details: CreateTestRequest, json: bool) -> anyhow::Result<()> {
    let requester = actor(root, username)?;
    let store = open_store(root)?;
    let request = IntakeService::new(&store).create(details, &requester)?;

    if json {
        print_json(&request)?;
    } else {
        println!("Created test request {} ({})", request.id, request.status);
    }
    Ok(())
}

fn list(
    root: &Path,
    status: Option<&str>,
    creator: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let queries = QueryService::new(&store);

    let mut requests = match status {
        Some(s) => queries.find_by_status(s.parse::<RequestStatus>()?)?,
        None => store.list()?,
    };
    if let Some(name) = creator {
        let creator = actor(root, name)?;
        requests.retain(|r| creator.is(&r.created_by));
    }
    print_requests(&requests, json)
}

fn show(root: &Path, id: u64, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let request = QueryService::new(&store).get(id)?;

    if json {
        return print_json(&request);
    }

    println!("Request {}: {}", request.id, request.name);
    println!("Status:   {}", request.status);
    println!(
        "Contact:  {} / {} / {}",
        request.email, request.phone_number, request.pin_code
    );
    println!(
        "Filed by: {} on {}",
        request.created_by.username,
        request.created_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(tester) = &request.assigned_tester {
        println!("Tester:   {}", tester.username);
    }
    if let Some(lab) = &request.lab_result {
        println!(
            "Lab:      {} (bp {}, hr {}, temp {}, o2 {})",
            lab.result, lab.blood_pressure, lab.heart_beat, lab.temperature, lab.oxygen_level
        );
    }
    if let Some(doctor) = &request.assigned_doctor {
        println!("Doctor:   {}", doctor.username);
    }
    if let Some(consultation) = &request.consultation {
        println!("Advice:   {}", consultation.suggestion);
        if let Some(c) = &consultation.comments {
            println!("          {c}");
        }
    }
    Ok(())
}

fn flow(root: &Path, id: u64, json: bool) -> anyhow::Result<()> {
    let store = open_store(root)?;
    let history = QueryService::new(&store).flow_history(id)?;

    if json {
        return print_json(&history);
    }
    if history.is_empty() {
        println!("Request {id} has not moved yet.");
        return Ok(());
    }
    let rows = history
        .iter()
        .map(|f| {
            vec![
                f.happened_on.format("%Y-%m-%d %H:%M").to_string(),
                f.from_status.to_string(),
                f.to_status.to_string(),
                f.changed_by.username.clone(),
                f.comments.clone(),
            ]
        })
        .collect();
    print_table(&["WHEN", "FROM", "TO", "BY", "COMMENTS"], rows);
    Ok(())
}
