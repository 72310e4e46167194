//! Console report over the jobs store, with interactive export and search
//! prompts.

use crate::config::Config;
use crate::constants::{
    RECENT_JOBS_LIMIT, REPORT_SEARCH_LIMIT, REPORT_TOP_N, SEARCH_DESCRIPTION_CUTOFF,
};
use crate::db::JobStore;
use crate::error::Result;
use crate::export;
use crate::queries::truncate_for_display;
use std::io::{self, Write};
use tracing::info;

fn prompt(message: &str) -> io::Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

fn print_report(store: &JobStore) -> Result<()> {
    println!("Jobs Database Query Tool");
    println!("{}", "=".repeat(50));

    let overview = store.overview()?;
    println!("\n1. Database Overview:");
    println!("Total jobs: {}", overview.total_jobs);
    println!("Unique companies: {}", overview.total_companies);
    println!("Unique locations: {}", overview.total_locations);

    println!("\n2. Top {REPORT_TOP_N} Companies by Job Count:");
    for company in store.top_companies(REPORT_TOP_N)? {
        println!("  {}: {}", company.name, company.count);
    }

    println!("\n3. Top {REPORT_TOP_N} Locations:");
    for location in store.top_locations(REPORT_TOP_N)? {
        println!("  {}: {}", location.name, location.count);
    }

    println!("\n4. Job States Distribution:");
    for state in store.state_distribution()? {
        println!(
            "  {}: {}",
            state.state.as_deref().unwrap_or("(none)"),
            state.count
        );
    }

    println!("\n5. Sample of Recent Jobs:");
    for job in store.recent_jobs(RECENT_JOBS_LIMIT)? {
        println!(
            "  {} | {} | {} | {}",
            job.title.as_deref().unwrap_or("(untitled)"),
            job.company_name.as_deref().unwrap_or("(no company)"),
            job.location.as_deref().unwrap_or("(no location)"),
            job.created_at.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

fn search_jobs(store: &JobStore, keyword: &str) -> Result<()> {
    let hits = store.search(keyword, REPORT_SEARCH_LIMIT)?;

    println!("\nSearch results for '{keyword}':");
    println!("{}", "=".repeat(50));

    for (index, hit) in hits.iter().enumerate() {
        println!("\n{}. {}", index + 1, hit.title);
        println!("   Company: {}", hit.company.as_deref().unwrap_or("(none)"));
        println!("   Location: {}", hit.location.as_deref().unwrap_or("(none)"));
        if let Some(description) = &hit.description {
            println!(
                "   Description: {}",
                truncate_for_display(description, SEARCH_DESCRIPTION_CUTOFF)
            );
        }
    }
    if hits.is_empty() {
        println!("No matches.");
    }

    Ok(())
}

/// Run the full console report: overview sections, then the interactive
/// export and keyword-search prompts.
pub fn run_report(config: &Config) -> Result<()> {
    if !config.data.database_file.exists() {
        println!(
            "Database not found at '{}'. Run the import step first.",
            config.data.database_file.display()
        );
        return Ok(());
    }

    let store = JobStore::open(&config.data.database_file)?;
    print_report(&store)?;

    let answer = prompt("\nWould you like to export data to CSV? (y/n): ")?;
    if answer.eq_ignore_ascii_case("y") {
        println!("Exporting full database to CSV...");
        let rows = export::export_jobs(&store, export::JOBS_EXPORT_FILE)?;
        println!("Exported {} records to '{}'", rows, export::JOBS_EXPORT_FILE);

        println!("Exporting company summary...");
        let companies = export::export_company_summary(&store, export::COMPANY_SUMMARY_FILE)?;
        println!(
            "Exported {} company summaries to '{}'",
            companies,
            export::COMPANY_SUMMARY_FILE
        );
    }

    let keyword = prompt("\nEnter a keyword to search jobs (or press Enter to skip): ")?;
    if !keyword.is_empty() {
        search_jobs(&store, &keyword)?;
    }

    info!("Report run finished");
    Ok(())
}
