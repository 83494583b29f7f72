use std::sync::Arc;

use anyhow::Context;
use clap::{value_parser, Arg, Command};
use sitelink_core::{FactKind, RecordKey, ResourceType, SystemClock};
use sitelink_engine::{
    IssueRequest, Outcome, PublicAccessApi, PublicReadRequest, PublicSubmitRequest,
    SitelinkConfig, SitelinkService, Submission, SubmissionEngine, TokenIssuer,
};
use sitelink_store::{MemoryParentDirectory, MemoryRecordStore, MemoryTokenStore, RecordStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Command::new("sitelink")
        .version("0.1.0")
        .about("Scoped share-link access and versioned submissions")
        .arg_required_else_help(true)
        .subcommand(Command::new("demo").about("Run the issue/read/submit flow end to end"))
        .subcommand(
            Command::new("race")
                .about("Race concurrent submissions against one record key")
                .arg(
                    Arg::new("writers")
                        .long("writers")
                        .default_value("8")
                        .value_parser(value_parser!(usize))
                        .help("Number of concurrent writer threads"),
                )
                .arg(
                    Arg::new("rounds")
                        .long("rounds")
                        .default_value("50")
                        .value_parser(value_parser!(usize))
                        .help("Submissions per writer"),
                )
                .arg(
                    Arg::new("attempts")
                        .long("attempts")
                        .default_value("3")
                        .value_parser(value_parser!(u32))
                        .help("CAS attempts per unit before giving up"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("demo", _)) => run_demo().await,
        Some(("race", args)) => {
            let writers = *args.get_one::<usize>("writers").unwrap();
            let rounds = *args.get_one::<usize>("rounds").unwrap();
            let attempts = *args.get_one::<u32>("attempts").unwrap();
            run_race(writers, rounds, attempts)
        }
        _ => Ok(()),
    }
}

async fn run_demo() -> anyhow::Result<()> {
    let tokens = Arc::new(MemoryTokenStore::new());
    let records = Arc::new(MemoryRecordStore::new());
    let parents = Arc::new(MemoryParentDirectory::new());
    let parent_id =
        sitelink_core::ParentResourceId::new("project-melb-01").context("parent id")?;
    parents.register(parent_id, "Docklands Tower Stage 2");

    let service = SitelinkService::new(
        tokens,
        Arc::clone(&records) as _,
        parents,
        Arc::new(SystemClock),
        SitelinkConfig::new(),
    );

    let issued = service
        .issue(IssueRequest {
            resource_type: ResourceType::MappingSheet,
            parent_resource_id: "project-melb-01".to_string(),
            scope_allow_list: vec!["employer-acme".to_string(), "employer-bolt".to_string()],
            duration_class: "24h".to_string(),
        })
        .await?;
    println!("Issued share link");
    println!("  secret:     {}", issued.secret);
    println!("  expires at: {}", issued.expires_at);

    let view = service
        .read(PublicReadRequest {
            secret: issued.secret.clone(),
            resource_type: ResourceType::MappingSheet,
        })
        .await?;
    println!(
        "\nVisitor sees {} employer(s) under {}",
        view.entries.len(),
        view.parent
            .display_name
            .as_deref()
            .unwrap_or(view.parent.id.as_str()),
    );
    println!("{}", serde_json::to_string_pretty(&view)?);

    let submissions = vec![
        Submission {
            sub_resource_id: sitelink_core::SubResourceId::new("employer-acme").unwrap(),
            fact_kind: FactKind::CbusCompliance,
            payload: sitelink_core::FactPayload::CbusCompliance {
                member_number: "CB-10442".to_string(),
                status: sitelink_core::ComplianceStatus::Compliant,
                paid_to: None,
                notes: Some("confirmed on site".to_string()),
            },
        },
        Submission {
            // Not in the token's allow-list; rejected without failing the batch.
            sub_resource_id: sitelink_core::SubResourceId::new("employer-zeta").unwrap(),
            fact_kind: FactKind::IncolinkCompliance,
            payload: sitelink_core::FactPayload::IncolinkCompliance {
                member_number: "IN-01".to_string(),
                status: sitelink_core::ComplianceStatus::Unknown,
                paid_to: None,
                notes: None,
            },
        },
    ];
    let outcomes = service
        .submit(PublicSubmitRequest {
            secret: issued.secret,
            resource_type: ResourceType::MappingSheet,
            submissions,
        })
        .await?;

    println!("\nSubmission outcomes:");
    for unit in &outcomes {
        match &unit.outcome {
            Outcome::Committed { version } => println!(
                "  {} / {}: committed v{version}",
                unit.sub_resource_id, unit.fact_kind
            ),
            Outcome::Rejected { reason } => println!(
                "  {} / {}: rejected ({reason})",
                unit.sub_resource_id, unit.fact_kind
            ),
        }
    }

    let key = RecordKey::new(
        sitelink_core::SubResourceId::new("employer-acme").unwrap(),
        FactKind::CbusCompliance,
    );
    let history = service.audit_history(&key).await?;
    println!("\nAudit history for {key}: {} version(s)", history.len());
    Ok(())
}

fn run_race(writers: usize, rounds: usize, attempts: u32) -> anyhow::Result<()> {
    println!("Racing {writers} writers x {rounds} rounds on one record key...");

    let tokens = Arc::new(MemoryTokenStore::new());
    let records = Arc::new(MemoryRecordStore::new());
    let clock = Arc::new(SystemClock);
    let config = SitelinkConfig::new().with_max_commit_attempts(attempts);

    let issuer = TokenIssuer::new(Arc::clone(&tokens) as _, Arc::clone(&clock) as _, config.clone());
    let sub = sitelink_core::SubResourceId::new("employer-acme").unwrap();
    let issued = issuer
        .issue(
            ResourceType::MappingSheet,
            sitelink_core::ParentResourceId::new("project-melb-01").unwrap(),
            std::iter::once(sub.clone()).collect(),
            sitelink_core::DurationClass::H24,
        )
        .context("issuing race token")?;
    let scope = issued.token.scope();

    let engine = Arc::new(SubmissionEngine::new(
        tokens as _,
        Arc::clone(&records) as _,
        clock,
        config,
    ));

    let handles: Vec<_> = (0..writers)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let scope = scope.clone();
            let sub = sub.clone();
            std::thread::spawn(move || {
                let mut committed = 0usize;
                let mut exhausted = 0usize;
                for round in 0..rounds {
                    let outcomes = engine
                        .submit(
                            &scope,
                            vec![Submission {
                                sub_resource_id: sub.clone(),
                                fact_kind: FactKind::CbusCompliance,
                                payload: sitelink_core::FactPayload::CbusCompliance {
                                    member_number: format!("CB-{round}"),
                                    status: sitelink_core::ComplianceStatus::Compliant,
                                    paid_to: None,
                                    notes: None,
                                },
                            }],
                        )
                        .expect("token stays valid for the whole race");
                    if outcomes[0].outcome.is_committed() {
                        committed += 1;
                    } else {
                        exhausted += 1;
                    }
                }
                (committed, exhausted)
            })
        })
        .collect();

    let mut committed = 0usize;
    let mut exhausted = 0usize;
    for handle in handles {
        let (c, e) = handle.join().expect("writer thread panicked");
        committed += c;
        exhausted += e;
    }

    let key = RecordKey::new(sub, FactKind::CbusCompliance);
    let history = records.history(&key)?;
    let versions: Vec<u64> = history.iter().map(|r| r.version).collect();
    let current_count = history.iter().filter(|r| r.is_current).count();
    let contiguous = versions == (1..=history.len() as u64).collect::<Vec<_>>();
    let tail_current = history.last().map_or(committed == 0, |r| r.is_current);

    println!("  committed:  {committed}");
    println!("  exhausted:  {exhausted}");
    println!("  versions:   {} (contiguous: {contiguous})", history.len());
    println!("  current:    {current_count}");

    let ok = history.len() == committed
        && contiguous
        && current_count == usize::from(committed > 0)
        && tail_current;
    println!("  invariant:  {}", if ok { "HELD" } else { "VIOLATED" });
    std::process::exit(if ok { 0 } else { 1 });
}
