use crate::demo::{
    run_availability_report, run_demo, run_eligibility_check, CheckArgs, DemoArgs, MemberArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use roster::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Roster Course Resolver",
    about = "Serve and inspect course eligibility for a rank-based roster",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect course availability for a member
    Courses {
        #[command(subcommand)]
        command: CoursesCommand,
    },
    /// Walk one member up the ascenso ladder over the seeded roster
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum CoursesCommand {
    /// List the courses a member may take next
    Available(MemberArgs),
    /// Explain whether a member may take a given course
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Catalog seed (JSON). Overrides ROSTER_SEED_PATH.
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Courses {
            command: CoursesCommand::Available(args),
        } => run_availability_report(args),
        Command::Courses {
            command: CoursesCommand::Check(args),
        } => run_eligibility_check(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve_without_subcommand() {
        let cli = Cli::try_parse_from(["roster-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_check_arguments() {
        let cli = Cli::try_parse_from([
            "roster-api",
            "courses",
            "check",
            "--member",
            "5",
            "--course",
            "3",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Courses {
                command: CoursesCommand::Check(args),
            }) => {
                assert_eq!(args.member, 5);
                assert_eq!(args.course, 3);
                assert!(args.seed.is_none());
            }
            other => panic!("expected courses check, got {other:?}"),
        }
    }
}
