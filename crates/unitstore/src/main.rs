//! `unitctl` - CLI for unitstore
//!
//! Reads and changes unit owners and parking assignments for one project.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use unitstore::cli::{Cli, Command, ConfigCommand, OwnerCommand, ParkingCommand, SetOwnerArgs};
use unitstore::{
    init_logging, list_projects, open_or_memory, ActiveBackend, Config, KeyValueStorage,
    OwnerData, OwnerRecord, UnitAssignmentStore,
};

type Store = UnitAssignmentStore<Box<dyn KeyValueStorage>>;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Projects => {
            let (storage, _) = open_or_memory(&config);
            for project in list_projects(&storage)? {
                println!("{project}");
            }
            Ok(())
        }
        Command::Owner(owner_cmd) => {
            let (mut store, _) = open_store(&config, cli.project)?;
            handle_owner(&mut store, owner_cmd)
        }
        Command::Parking(parking_cmd) => {
            let (mut store, _) = open_store(&config, cli.project)?;
            handle_parking(&mut store, parking_cmd)
        }
        Command::Status(status_cmd) => {
            let (store, backend) = open_store(&config, cli.project)?;
            handle_status(&store, &backend, status_cmd.json)
        }
        Command::Reset { yes } => {
            let (mut store, _) = open_store(&config, cli.project)?;
            handle_reset(&mut store, yes);
            Ok(())
        }
    }
}

fn open_store(
    config: &Config,
    project: Option<String>,
) -> anyhow::Result<(Store, ActiveBackend)> {
    let project = project.unwrap_or_else(|| config.project.default_project.clone());
    let (storage, backend) = open_or_memory(config);
    let store = UnitAssignmentStore::open(storage, project)?;
    Ok((store, backend))
}

fn handle_owner(store: &mut Store, cmd: OwnerCommand) -> anyhow::Result<()> {
    match cmd {
        OwnerCommand::Set(args) => {
            let unit = args.unit.clone();
            store.add_owner(&unit, owner_data(args));
            println!("Owner of unit {unit} set.");
        }
        OwnerCommand::Remove { unit } => {
            if store.owner(&unit).is_none() {
                println!("Unit {unit} has no owner.");
            } else {
                store.remove_owner(&unit);
                println!("Owner of unit {unit} removed.");
            }
        }
        OwnerCommand::Show { unit, json } => match store.owner(&unit) {
            Some(record) if json => println!("{}", serde_json::to_string_pretty(record)?),
            Some(record) => print_owner(record),
            None => println!("Unit {unit} has no owner."),
        },
        OwnerCommand::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(store.owners())?);
            } else if store.owners().is_empty() {
                println!("No owners in project {}.", store.project());
            } else {
                for record in store.owners().values() {
                    println!(
                        "{:<8} {:<10} {:<30} {}",
                        record.unit_id, record.owner_type, record.name, record.email
                    );
                }
            }
        }
    }
    Ok(())
}

fn owner_data(args: SetOwnerArgs) -> OwnerData {
    let data = OwnerData::new(args.name, args.email, args.phone, args.owner_type.into());
    match args.by {
        Some(by) => data.assigned_by(by),
        None => data,
    }
}

fn print_owner(record: &OwnerRecord) {
    println!("Unit:        {}", record.unit_id);
    println!("Name:        {}", record.name);
    println!("Email:       {}", record.email);
    println!("Phone:       {}", record.phone);
    println!("Type:        {}", record.owner_type);
    println!("Assigned at: {}", record.assigned_at.to_rfc3339());
    if let Some(by) = &record.assigned_by {
        println!("Assigned by: {by}");
    }
}

fn handle_parking(store: &mut Store, cmd: ParkingCommand) -> anyhow::Result<()> {
    match cmd {
        ParkingCommand::Assign {
            unit,
            spots,
            strict,
        } => {
            if strict {
                store.try_assign_parking(&unit, spots)?;
            } else {
                store.assign_parking(&unit, spots);
            }
            let assigned = store.get_unit_parking(&unit);
            if assigned.is_empty() {
                println!("Parking for unit {unit} cleared.");
            } else {
                println!("Unit {unit} now holds: {}", assigned.join(", "));
            }
        }
        ParkingCommand::Show { unit } => {
            let spots = store.get_unit_parking(&unit);
            if spots.is_empty() {
                println!("Unit {unit} holds no parking spots.");
            } else {
                println!("{}", spots.join("\n"));
            }
        }
        ParkingCommand::Lookup { spot } => match store.get_parking_spot_unit(&spot) {
            Some(unit) => println!("{unit}"),
            None => println!("Spot {spot} is not assigned."),
        },
    }
    Ok(())
}

fn handle_status(store: &Store, backend: &ActiveBackend, json: bool) -> anyhow::Result<()> {
    let stats = store.stats();
    let slots = store.storage().stats().context("reading storage statistics")?;
    if json {
        let report = serde_json::json!({
            "backend": backend.to_string(),
            "durable": backend.is_durable(),
            "totalSlots": slots.total_slots,
            "dbSizeBytes": slots.db_size_bytes,
            "assignments": stats,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("unitctl status");
    println!("--------------");
    println!("Project:            {}", stats.project);
    println!("Backend:            {backend}");
    println!("Stored slots:       {}", slots.total_slots);
    if backend.is_durable() {
        println!("Database size:      {} bytes", slots.db_size_bytes);
    }
    println!("Owned units:        {}", stats.owned_units);
    for (owner_type, count) in &stats.owners_by_type {
        println!("  {owner_type:<17} {count}");
    }
    println!("Units with parking: {}", stats.units_with_parking);
    println!("Assigned spots:     {}", stats.assigned_spots);
    Ok(())
}

fn handle_reset(store: &mut Store, yes: bool) {
    if !yes {
        println!(
            "This deletes every owner and parking assignment in project {}.",
            store.project()
        );
        println!("Re-run with --yes to confirm.");
        return;
    }
    store.clear();
    println!("Project {} reset.", store.project());
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("[Storage]");
                println!("  Backend:          {:?}", config.storage.backend);
                println!("  Database path:    {}", config.database_path().display());
                println!();
                println!("[Project]");
                println!("  Default project:  {}", config.project.default_project);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
