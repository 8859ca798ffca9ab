use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod aggregate;
mod earnings;
mod load;
mod models;
mod normalize;
mod report;
mod summary;

use models::{GroupBy, Lesson, SummaryRow};

#[derive(Parser)]
#[command(name = "lesson-summaries")]
#[command(about = "Summary tables and chart data for a tutoring lesson ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one summary table to stdout
    Show {
        #[arg(long)]
        lessons: PathBuf,
        /// Optional pay_method,tax_rate CSV for net earnings
        #[arg(long)]
        payment: Option<PathBuf>,
        /// total, student, level, subject, pay_method, year, month, week or day
        #[arg(long, default_value = "total")]
        by: String,
    },
    /// Write the full summary catalog as CSV files to a dated directory
    Export {
        #[arg(long)]
        lessons: PathBuf,
        #[arg(long)]
        payment: Option<PathBuf>,
        #[arg(long, default_value = "summaries")]
        out: PathBuf,
        #[arg(long)]
        overwrite: bool,
    },
    /// Write pie-chart data sets as JSON files to a dated directory
    Charts {
        #[arg(long)]
        lessons: PathBuf,
        #[arg(long)]
        payment: Option<PathBuf>,
        #[arg(long, default_value = "figs")]
        out: PathBuf,
        #[arg(long)]
        overwrite: bool,
    },
}

fn load_lessons(lessons: &PathBuf, payment: Option<&PathBuf>) -> anyhow::Result<Vec<Lesson>> {
    let loaded = load::read_lessons(lessons)?;
    if loaded.skipped > 0 {
        println!(
            "Skipped {} rows with non-positive duration.",
            loaded.skipped
        );
    }
    let mut lessons = loaded.lessons;
    if let Some(payment) = payment {
        let rates = load::read_tax_rates(payment)?;
        earnings::apply_tax(&mut lessons, &rates);
    }
    Ok(lessons)
}

fn print_table(rows: &[SummaryRow]) {
    for row in rows {
        let mut line = format!(
            "- {}: {} lessons, {} h, earned {:.2}, rate {:.2}/h",
            row.key, row.n_lessons, row.hours, row.earned, row.av_rate
        );
        if let Some(n_students) = row.n_students {
            line.push_str(&format!(", {n_students} students"));
        }
        if let (Some(net), Some(net_rate)) = (row.net_earned, row.av_net_rate) {
            line.push_str(&format!(", net {net:.2}, net rate {net_rate:.2}/h"));
        }
        println!("{line}");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Show { lessons, payment, by } => {
            let lessons = load_lessons(&lessons, payment.as_ref())?;
            let rows = if by == "student" {
                summary::by_student(&lessons)?
            } else {
                let group_by: GroupBy = by.parse()?;
                aggregate::aggregate(&lessons, group_by)?
            };

            if rows.is_empty() {
                println!("No lessons found.");
                return Ok(());
            }
            println!("Summary by {by} across {} lessons:", lessons.len());
            print_table(&rows);
        }
        Commands::Export {
            lessons,
            payment,
            out,
            overwrite,
        } => {
            let lessons = load_lessons(&lessons, payment.as_ref())?;
            match report::export_summaries(&out, &lessons, overwrite)? {
                Some(dir) => println!("Summaries written to {}.", dir.display()),
                None => println!(
                    "Summaries already exist for this date. Run again with --overwrite to replace them."
                ),
            }
        }
        Commands::Charts {
            lessons,
            payment,
            out,
            overwrite,
        } => {
            let lessons = load_lessons(&lessons, payment.as_ref())?;
            match report::export_chart_data(&out, &lessons, overwrite)? {
                Some(dir) => println!("Chart data written to {}.", dir.display()),
                None => println!(
                    "Chart data already exists for this date. Run again with --overwrite to replace it."
                ),
            }
        }
    }

    Ok(())
}
