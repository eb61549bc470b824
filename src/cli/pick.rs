//! Pick flow - discover, select, assemble, and publish a hand-picked release

use crate::cli::Cli;
use crate::cli::context::CommandContext;
use crate::cli::style::{CROSS, Stylize, arrow, check, spinner_style};
use anstream::println;
use chrono::Utc;
use dialoguer::{Confirm, Input};
use indicatif::ProgressBar;
use release_picker::assemble::{
    AssemblyPlan, AssemblyProgress, ConflictChoice, ConflictHandler, PickStep,
    create_assembly_plan, execute_assembly, release_branch_name,
};
use release_picker::discovery::{DiscoveredChanges, discover_unreleased};
use release_picker::error::{Error, Result};
use release_picker::publish::{PublishOptions, publish, release_pr_body, release_pr_title};
use release_picker::select::{SelectionReport, resolve_selection};
use release_picker::session::WorkspaceState;
use release_picker::types::short_hash;
use std::time::Duration;

/// Run the pick flow.
#[allow(clippy::too_many_lines, clippy::future_not_send)]
pub async fn run_pick(args: &Cli) -> Result<()> {
    // =========================================================================
    // Phase 1: GATHER - repository, settings, host, branches, unreleased set
    // =========================================================================

    let ctx = CommandContext::new(
        &args.path,
        args.remote.as_deref(),
        args.integration.as_deref(),
    )
    .await?;

    println!(
        "{} {} {} {}",
        "Picking from".emphasis(),
        ctx.refs.integration.accent(),
        "into".emphasis(),
        ctx.refs.stable.accent()
    );

    // Fetch so the local fallback and the cherry-picks see current remote state
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!("Fetching from {}...", ctx.remote_name));
    spinner.enable_steady_tick(Duration::from_millis(80));
    ctx.git.fetch(&ctx.remote_name)?;
    spinner.finish_with_message(format!("{} Fetched from {}", check(), ctx.remote_name));

    // Discovery feeds the interactive listing and the merge-commit recovery
    // fallback during validation, so it runs in both modes.
    let discovered = discover_unreleased(
        &ctx.git,
        ctx.host.as_ref(),
        &ctx.refs,
        ctx.settings.discovery.pr_limit,
    )
    .await?;

    let identifiers = if args.identifiers.is_empty() {
        if discovered.is_empty() {
            println!("{}", "No unreleased changes.".muted());
            return Ok(());
        }
        prompt_for_selection(&discovered)?
    } else {
        args.identifiers.clone()
    };

    if identifiers.is_empty() {
        println!("{}", "Nothing selected.".muted());
        return Ok(());
    }

    // =========================================================================
    // Phase 2: RESOLVE - validate every identifier, then one decision point
    // =========================================================================

    let report = resolve_selection(
        &identifiers,
        &ctx.git,
        ctx.host.as_ref(),
        &ctx.refs.integration,
        &ctx.refs.integration_ref,
        &discovered.commits,
    )
    .await?;

    report_selection(&report);

    if !report.has_accepted() {
        return Err(Error::EmptySelection);
    }
    if report.has_rejections() {
        let proceed = Confirm::new()
            .with_prompt(format!(
                "Proceed with {} valid item(s)?",
                report.accepted_count()
            ))
            .default(false)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?;
        if !proceed {
            return Err(Error::Aborted(
                "declined to proceed past rejected items".to_string(),
            ));
        }
    }

    let branch = release_branch_name(Utc::now());
    let plan = create_assembly_plan(
        &report.prs,
        &report.commits,
        branch.clone(),
        ctx.refs.stable_ref.clone(),
    );

    if args.dry_run {
        report_dry_run(&plan);
        return Ok(());
    }

    // =========================================================================
    // Phase 3: ASSEMBLE - branch + cherry-picks, with rollback on abort
    // =========================================================================

    let mut state = WorkspaceState::capture(&ctx.git)?;
    if ctx.git.has_local_changes()? {
        let set_aside = Confirm::new()
            .with_prompt("Uncommitted local changes detected. Set them aside and restore afterwards?")
            .default(true)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?;
        if !set_aside {
            return Err(Error::Aborted("local changes left in place".to_string()));
        }
        state.set_aside_changes(&ctx.git)?;
    }

    println!(
        "{} {}",
        "Assembling".emphasis(),
        format!("{} item(s) onto {branch}...", plan.steps.len()).accent()
    );

    let outcome = match execute_assembly(&plan, &ctx.git, &PromptConflictHandler, &PrintProgress) {
        Ok(outcome) => outcome,
        Err(e) => {
            // Assembly failed outright: restore before surfacing the error
            let _ = state.rollback(&ctx.git, &branch);
            return Err(e);
        }
    };

    if outcome.aborted {
        state.rollback(&ctx.git, &branch)?;
        println!("{}", "Aborted at conflict; workspace restored.".warn());
        return Err(Error::Aborted("cherry-pick conflict".to_string()));
    }
    if !outcome.has_applied() {
        state.rollback(&ctx.git, &branch)?;
        return Err(Error::EmptySelection);
    }

    // =========================================================================
    // Phase 4: PUBLISH - push, open PR, restore workspace
    // =========================================================================

    let draft = Confirm::new()
        .with_prompt("Open the pull request as a draft?")
        .default(true)
        .interact()
        .map_err(|e| Error::Internal(format!("Failed to read draft choice: {e}")))?;

    let reviewers_raw: String = Input::new()
        .with_prompt("Reviewers (space-separated, empty for none)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| Error::Internal(format!("Failed to read reviewers: {e}")))?;
    let reviewers: Vec<String> = reviewers_raw.split_whitespace().map(str::to_string).collect();

    let title = release_pr_title(Utc::now());
    let body = release_pr_body(&report.prs, &report.commits, &report.rejected);

    let published = publish(
        &ctx.git,
        ctx.host.as_ref(),
        &ctx.remote_name,
        &branch,
        &ctx.refs.stable,
        title,
        body,
        &PublishOptions { draft, reviewers },
    )
    .await;

    // Restore the operator's branch and stash on success and failure alike;
    // a pushed branch is never rolled back.
    let restored = state.restore(&ctx.git);
    let created = published?;
    restored?;

    println!();
    println!(
        "{} Release PR created: {}",
        check(),
        created.html_url.accent()
    );
    if !outcome.skipped.is_empty() {
        println!("   {} item(s) skipped at conflicts:", outcome.skipped.len());
        for step in &outcome.skipped {
            println!("   {} {step}", CROSS.warn());
        }
    }
    Ok(())
}

/// List the unreleased changes and prompt for identifiers.
fn prompt_for_selection(discovered: &DiscoveredChanges) -> Result<Vec<String>> {
    println!();
    println!("{}", "Unreleased changes:".emphasis());
    for item in &discovered.set.items {
        println!("  {item}");
    }
    println!();

    let raw: String = Input::new()
        .with_prompt("PR numbers and/or commit hashes to include (space-separated)")
        .allow_empty(true)
        .interact_text()
        .map_err(|e| Error::Internal(format!("Failed to read selection: {e}")))?;
    Ok(raw.split_whitespace().map(str::to_string).collect())
}

/// Print per-item validation outcomes.
fn report_selection(report: &SelectionReport) {
    println!();
    for pr in &report.prs {
        println!("  {} #{}: {}", check(), pr.number, pr.title);
    }
    for commit in &report.commits {
        println!(
            "  {} {}: {}",
            check(),
            short_hash(&commit.hash),
            commit.subject
        );
    }
    for item in &report.rejected {
        println!(
            "  {} {}: {}",
            CROSS.error(),
            item.raw,
            item.reason.to_string().muted()
        );
    }
}

/// Print the planned cherry-pick order without executing it.
fn report_dry_run(plan: &AssemblyPlan) {
    println!();
    println!("{}:", "Cherry-pick plan".emphasis());
    println!(
        "  Branch {} from {}",
        plan.branch.accent(),
        plan.base_ref.muted()
    );
    for step in &plan.steps {
        println!("  {} {step}", arrow());
    }
    println!();
    println!("{}", "Run without --dry-run to execute.".muted());
}

/// Asks the operator what to do at each conflict.
struct PromptConflictHandler;

impl ConflictHandler for PromptConflictHandler {
    fn on_conflict(&self, step: &PickStep, files: &[String]) -> Result<ConflictChoice> {
        println!();
        println!(
            "{} Conflict while cherry-picking {step}",
            "Conflict:".warn()
        );
        for file in files {
            println!("    {}", file.muted());
        }
        let skip = Confirm::new()
            .with_prompt("Skip this item and continue? (declining aborts the whole run)")
            .default(false)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read conflict choice: {e}")))?;
        Ok(if skip {
            ConflictChoice::Skip
        } else {
            ConflictChoice::Abort
        })
    }
}

/// Prints assembly progress lines.
struct PrintProgress;

impl AssemblyProgress for PrintProgress {
    fn on_message(&self, message: &str) {
        println!("  {message}");
    }
}
