use chrono::Local;
use crossterm::style::Stylize;

use super::Context;
use super::args::ReportArgs;
use crate::shared::analytics::{ProgressReport, analyze};
use crate::shared::error::Result;
use crate::shared::store::ProjectStore;

const BAR_WIDTH: usize = 40;

fn bar(percent: f64) -> String {
    let filled = ((percent / 100.0) * BAR_WIDTH as f64)
        .round()
        .clamp(0.0, BAR_WIDTH as f64) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn print_dashboard(project: &str, report: &ProgressReport, label_format: &str) {
    println!();
    println!("{}", "━".repeat(60).dark_grey());
    println!("  📈 {}", project.bold());
    println!("{}", "━".repeat(60).dark_grey());

    let overall = f64::from(report.overall_actual_progress);
    println!(
        "  [{}] {}%",
        bar(overall).green(),
        report.overall_actual_progress.to_string().green().bold()
    );

    // Planned vs actual on the last curve day
    if let Some(point) = report.s_curve.last() {
        let variance = point.actual - point.planned;
        let variance = if variance < 0.0 {
            format!("{variance:.2}").red().bold()
        } else {
            format!("+{variance:.2}").green().bold()
        };
        println!();
        println!(
            "  {} {}  {} {:.2}%  {} {:.2}%  {} {}",
            "As of".dark_grey(),
            point.date.format(label_format).to_string().cyan(),
            "Planned:".dark_grey(),
            point.planned,
            "Actual:".dark_grey(),
            point.actual,
            "Variance:".dark_grey(),
            variance
        );
    }

    if !report.status_counts.is_empty() {
        println!();
        let parts: Vec<String> = report
            .status_counts
            .iter()
            .map(|(status, count)| {
                format!(
                    "{} {}",
                    format!("{status}:").dark_grey(),
                    count.to_string().bold()
                )
            })
            .collect();
        println!("  {}", parts.join("  "));
    }

    let delays = report.total_delays;
    if delays.total() > 0 {
        println!(
            "  {}  {} {}  {} {}  {} {}",
            "Delays (days):".dark_grey(),
            "Weather".dark_grey(),
            delays.weather.to_string().yellow().bold(),
            "Contractor".dark_grey(),
            delays.contractor.to_string().yellow().bold(),
            "Client".dark_grey(),
            delays.client.to_string().yellow().bold(),
        );
    }

    if let Some(next) = &report.next_critical_activity {
        println!();
        println!(
            "  {} {} {} {}",
            "▶".red(),
            next.wbs.as_str().cyan().bold(),
            next.task_name.as_deref().unwrap_or("").bold(),
            format!("starts {}", next.planned_start_date).dark_grey()
        );
    }

    println!("{}", "━".repeat(60).dark_grey());
    println!();
}

pub fn execute<S: ProjectStore>(args: ReportArgs, ctx: &Context<'_, S>) -> Result<()> {
    let forest = ctx.store.load(&args.project)?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let report = analyze(&forest, today);
    let label_format = ctx.config.report.date_label_format.as_str();

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report.payload(label_format))?
        );
    } else {
        print_dashboard(&args.project, &report, label_format);
    }
    Ok(())
}
