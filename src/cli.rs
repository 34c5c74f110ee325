use std::io::{self, Write};

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::info;

use crate::{
    bootstrap,
    config::DatabaseConfig,
    db,
    errors::BootstrapError,
    models::BootstrapPlan,
};

pub fn cli() -> Command {
    Command::new("reps-bootstrap")
        .about("Provision test_db: user, reps collection and unique address index")
        .arg(
            Arg::new("uri")
                .long("uri")
                .global(true)
                .help("MongoDB connection string (overrides DATABASE_URL / MONGODB_URL)")
                .value_name("URI"),
        )
        .subcommand(Command::new("run").about("Run the bootstrap procedure (default)"))
        .subcommand(
            Command::new("plan")
                .about("Print the administrative calls without contacting the server")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the plan as JSON"),
                ),
        )
}

pub async fn handle_cli(matches: ArgMatches) -> Result<(), BootstrapError> {
    let plan = BootstrapPlan::default();

    match matches.subcommand() {
        Some(("plan", sub_matches)) => {
            let stdout = io::stdout();
            print_plan(&plan, sub_matches.get_flag("json"), &mut stdout.lock())
        }
        Some(("run", _)) | None => {
            let uri = matches.get_one::<String>("uri").map(String::as_str);
            let conf = DatabaseConfig::load(uri)?;
            let client = db::connect(&conf).await?;

            let stdout = io::stdout();
            let report = bootstrap::run(&client, &plan, &mut stdout.lock()).await?;

            if let Ok(json) = serde_json::to_string(&report) {
                info!(report = %json, "bootstrap report");
            }
            Ok(())
        }
        Some(_) => {
            cli().print_help()?;
            Ok(())
        }
    }
}

pub fn print_plan<W: Write>(
    plan: &BootstrapPlan,
    json: bool,
    out: &mut W,
) -> Result<(), BootstrapError> {
    if json {
        let rendered = serde_json::to_string_pretty(plan).map_err(io::Error::other)?;
        writeln!(out, "{rendered}")?;
    } else {
        for (i, (_, description)) in bootstrap::describe(plan).iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, description)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn uri_is_accepted_before_and_after_subcommand() {
        let matches = cli()
            .try_get_matches_from(["reps-bootstrap", "run", "--uri", "mongodb://x"])
            .unwrap();
        assert_eq!(
            matches.get_one::<String>("uri").map(String::as_str),
            Some("mongodb://x")
        );

        let matches = cli()
            .try_get_matches_from(["reps-bootstrap", "--uri", "mongodb://y"])
            .unwrap();
        assert!(matches.subcommand().is_none());
        assert_eq!(
            matches.get_one::<String>("uri").map(String::as_str),
            Some("mongodb://y")
        );
    }

    #[test]
    fn plan_lists_numbered_steps() {
        let mut out = Vec::new();
        print_plan(&BootstrapPlan::default(), false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "1. create user test on test_db with roles [readWrite@test_db]"
        );
        assert_eq!(lines[2], "3. create unique text index on test_db.reps.address");
    }

    #[test]
    fn plan_json_masks_password() {
        let mut out = Vec::new();
        print_plan(&BootstrapPlan::default(), true, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["database"], "test_db");
        assert_eq!(value["user"]["password"], "***");
        assert_eq!(value["index"]["kind"], "text");
        assert_eq!(value["index"]["unique"], true);
    }
}
