use crate::infra::{load_seed, RosterService, RosterServices};
use clap::Args;
use roster::courses::{
    CatalogRepository, CourseId, CourseServiceError, CourseSummary, EligibilityVerdict, MemberId,
};
use roster::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct MemberArgs {
    /// Member to report on
    #[arg(long)]
    pub(crate) member: u32,
    /// Catalog seed (JSON). Defaults to the bundled catalog.
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// Member to evaluate
    #[arg(long)]
    pub(crate) member: u32,
    /// Course to evaluate the member against
    #[arg(long)]
    pub(crate) course: u32,
    /// Catalog seed (JSON). Defaults to the bundled catalog.
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Member to walk through the catalog (defaults to the bundled Soldado)
    #[arg(long, default_value_t = 4)]
    pub(crate) member: u32,
    /// Catalog seed (JSON). Defaults to the bundled catalog.
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// Stop after this many approvals
    #[arg(long, default_value_t = 10)]
    pub(crate) max_steps: usize,
}

pub(crate) fn run_availability_report(args: MemberArgs) -> Result<(), AppError> {
    let services = RosterServices::from_seed(load_seed(args.seed.as_deref())?);
    let dashboard = services.progress.dashboard(&MemberId(args.member))?;

    let rank = dashboard
        .member
        .rank
        .as_ref()
        .map(|rank| rank.name.as_str())
        .unwrap_or("no rank");
    println!(
        "{} ({}) - {}",
        dashboard
            .member
            .public_name
            .as_deref()
            .unwrap_or(&dashboard.member.name),
        dashboard.member.role.label(),
        rank
    );

    println!("\nApproved ({}):", dashboard.counts.approved);
    for entry in &dashboard.approved {
        println!(
            "- {} {} ({})",
            entry.course.code,
            entry.course.name,
            entry.approved_at.format("%Y-%m-%d")
        );
    }

    println!("\nAvailable ({}):", dashboard.counts.available);
    render_courses(&dashboard.available);
    Ok(())
}

pub(crate) fn run_eligibility_check(args: CheckArgs) -> Result<(), AppError> {
    let services = RosterServices::from_seed(load_seed(args.seed.as_deref())?);
    let verdict = services
        .progress
        .evaluate(&MemberId(args.member), &CourseId(args.course))?;

    println!(
        "Member {} / course {}: {}",
        args.member,
        args.course,
        verdict.summary()
    );
    render_missing(&verdict);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        member,
        seed,
        max_steps,
    } = args;

    let services = RosterServices::from_seed(load_seed(seed.as_deref())?);
    let progress = &services.progress;
    let member_id = MemberId(member);

    println!("Roster course demo");
    render_ladder(progress)?;

    println!("\nStarting point for member {member_id}");
    let mut available = progress.list_available(&member_id)?;
    render_courses(&available);

    let mut steps = 0;
    while let Some(next) = available.first().cloned() {
        if steps == max_steps {
            println!("\nStopping after {max_steps} approvals");
            break;
        }

        progress.approve(&member_id, &next.id)?;
        steps += 1;
        println!("\nStep {steps}: approved {} {}", next.code, next.name);

        available = progress.list_available(&member_id)?;
        render_courses(&available);
    }

    println!("\nRemaining ascenso gates:");
    let rungs = progress
        .catalog()
        .ascenso_ladder()
        .map_err(CourseServiceError::from)?;
    for rung in rungs {
        let verdict = progress.evaluate(&member_id, &rung.course.id)?;
        println!("- {}: {}", rung.course.code, verdict.summary());
    }

    Ok(())
}

fn render_ladder(progress: &RosterService) -> Result<(), AppError> {
    let mut rungs = progress
        .catalog()
        .ascenso_ladder()
        .map_err(CourseServiceError::from)?;
    rungs.sort_by_key(|rung| (rung.minimum_sort_order, rung.course.id));

    println!("\nAscenso ladder");
    for rung in rungs {
        let gate = if rung.course.requires_all_previous_ascenso {
            " (requires every lower rung)"
        } else {
            ""
        };
        println!(
            "  [{}] {} {}{}",
            rung.minimum_sort_order, rung.course.code, rung.course.name, gate
        );
    }
    Ok(())
}

fn render_courses(courses: &[CourseSummary]) {
    if courses.is_empty() {
        println!("  (nothing available)");
        return;
    }
    for course in courses {
        println!("  {} {}", course.code, course.name);
    }
}

fn render_missing(verdict: &EligibilityVerdict) {
    for course in &verdict.missing_prerequisites {
        println!("  missing: {} {}", course.code, course.name);
    }
}
