use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};

use sparkstats_core::aggregate::{collect_matches, summary::EFFICIENCY_SENTINEL};
use sparkstats_core::export::{write_character_averages, write_match_details};
use sparkstats_core::models::BattleFile;
use sparkstats_core::parser::duration::format_battle_time;
use sparkstats_core::{
    character_aggregates, collect_json_files, load_battle_file, load_battle_files,
    normalize_document, position_aggregates, team_aggregates, LoadReport, ReferenceData,
};

#[derive(Parser)]
#[command(name = "sparkstats", version, about = "Battle result statistics for Sparking! Zero exports")]
struct Cli {
    /// Character reference table (name,id)
    #[arg(long, global = true, default_value = "data/characters.csv")]
    characters: PathBuf,

    /// Capsule reference table (name,id,type,exclusiveTo,cost,effect)
    #[arg(long, global = true, default_value = "data/capsules.csv")]
    capsules: PathBuf,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Descend into subdirectories of input folders
    #[arg(long, short = 'r', global = true)]
    recursive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-character averages, ranked by performance score
    Characters {
        /// Battle result files or folders containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Limit number of results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Team records, head-to-heads and top-5 headline stats
    Teams {
        /// Battle result files or folders containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Limit number of results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Character stats split by roster position (Lead, Middle, Anchor)
    Positions {
        /// Battle result files or folders containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Limit characters shown per position
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Per-form breakdown for every transforming character in one file
    Forms {
        /// A single battle result file
        file: PathBuf,
    },
    /// Show which inputs loaded and what each contains
    Files {
        /// Battle result files or folders containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Write character averages and match details as CSV
    Export {
        /// Battle result files or folders containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Directory for character_averages.csv and match_details.csv
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> sparkstats_core::Result<()> {
    let refs = ReferenceData::load(&cli.characters, &cli.capsules)?;
    let json = cli.json;
    let recursive = cli.recursive;

    match cli.command {
        Commands::Characters { inputs, limit } => {
            cmd_characters(&load_inputs(&inputs, recursive)?, &refs, limit, json)
        }
        Commands::Teams { inputs, limit } => {
            cmd_teams(&load_inputs(&inputs, recursive)?, &refs, limit, json)
        }
        Commands::Positions { inputs, limit } => {
            cmd_positions(&load_inputs(&inputs, recursive)?, &refs, limit, json)
        }
        Commands::Forms { file } => cmd_forms(&file, &refs, json),
        Commands::Files { inputs } => cmd_files(&load_inputs(&inputs, recursive)?, json),
        Commands::Export { inputs, out_dir } => {
            cmd_export(&load_inputs(&inputs, recursive)?, &refs, &out_dir)
        }
    }
}

/// Expand folders into their `.json` files and load everything.
fn load_inputs(inputs: &[PathBuf], recursive: bool) -> sparkstats_core::Result<LoadReport> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(collect_json_files(input, recursive)?);
        } else {
            paths.push(input.clone());
        }
    }
    let report = load_battle_files(&paths);
    for error in &report.errors {
        eprintln!("Skipped {}: {}", error.name, error.message);
    }
    Ok(report)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn fmt_efficiency(value: f64) -> String {
    if value >= EFFICIENCY_SENTINEL {
        "no dmg taken".to_string()
    } else {
        format!("{:.2}", value)
    }
}

fn fmt_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.1}%", r)).unwrap_or_else(|| "-".to_string())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> sparkstats_core::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_characters(
    report: &LoadReport,
    refs: &ReferenceData,
    limit: Option<usize>,
    json: bool,
) -> sparkstats_core::Result<()> {
    let mut aggregates = character_aggregates(&report.files, refs);
    if let Some(limit) = limit {
        aggregates.truncate(limit);
    }
    if json {
        return print_json(&aggregates);
    }
    if aggregates.is_empty() {
        println!("No characters found.");
        return Ok(());
    }

    let mut table = new_table(vec![
        "#", "Character", "Matches", "W-L", "Win %", "Avg Dmg", "Avg Taken", "DPS",
        "Eff", "S1 Hit", "Score", "Top Build",
    ]);
    for (i, a) in aggregates.iter().enumerate() {
        let t = &a.summary.totals;
        let avg = &a.summary.averages;
        let top_build = a
            .summary
            .top_builds
            .first()
            .map(|b| format!("{} ({}x)", b.label, b.count))
            .unwrap_or_default();
        table.add_row(vec![
            (i + 1).to_string(),
            a.name.clone(),
            format!("{} ({} active)", t.match_count, t.active_match_count),
            format!("{}-{}", t.wins, t.losses),
            format!("{:.1}", avg.win_rate),
            format!("{:.0}", avg.avg_damage),
            format!("{:.0}", avg.avg_damage_taken),
            format!("{:.1}", avg.dps),
            fmt_efficiency(avg.efficiency),
            fmt_rate(avg.s1_hit_rate),
            format!("{:.1}", avg.combat_performance_score),
            top_build,
        ]);
    }

    println!("{table}");
    Ok(())
}

fn cmd_teams(
    report: &LoadReport,
    refs: &ReferenceData,
    limit: Option<usize>,
    json: bool,
) -> sparkstats_core::Result<()> {
    let mut teams = team_aggregates(&report.files, refs);
    if let Some(limit) = limit {
        teams.truncate(limit);
    }
    if json {
        return print_json(&teams);
    }
    if teams.is_empty() {
        println!("No team battles found (files need team names and a result).");
        return Ok(());
    }

    let mut table = new_table(vec![
        "Team", "Matches", "W-L", "Win %", "Top-5 Dmg", "Top-5 Taken", "Eff", "Avg Score",
        "Top 5",
    ]);
    for t in &teams {
        table.add_row(vec![
            t.name.clone(),
            t.matches.to_string(),
            format!("{}-{}", t.wins, t.losses),
            format!("{:.1}", t.win_rate),
            format!("{:.0}", t.avg_damage_per_match),
            format!("{:.0}", t.avg_damage_taken_per_match),
            fmt_efficiency(t.damage_efficiency),
            format!("{:.1}", t.avg_performance_score),
            t.top5_characters.join(", "),
        ]);
    }
    println!("{table}");

    for t in &teams {
        if t.opponent_records.is_empty() {
            continue;
        }
        println!();
        println!("--- {} head-to-head ---", t.name);
        let mut h2h = new_table(vec!["Opponent", "W-L", "Matchups"]);
        for (opponent, record) in &t.opponent_records {
            h2h.add_row(vec![
                opponent.clone(),
                format!("{}-{}", record.wins, record.losses),
                record.character_matchups.len().to_string(),
            ]);
        }
        println!("{h2h}");
    }
    Ok(())
}

fn cmd_positions(
    report: &LoadReport,
    refs: &ReferenceData,
    limit: Option<usize>,
    json: bool,
) -> sparkstats_core::Result<()> {
    let mut positions = position_aggregates(&report.files, refs);
    if let Some(limit) = limit {
        for p in &mut positions {
            p.characters.truncate(limit);
        }
    }
    if json {
        return print_json(&positions);
    }

    for p in &positions {
        println!("--- {} ---", p.position);
        if p.characters.is_empty() {
            println!("(no appearances)");
            continue;
        }
        let mut table = new_table(vec![
            "Character", "Matches", "Avg Dmg", "Avg Taken", "DPS", "Health %", "Avg Time",
        ]);
        for c in &p.characters {
            table.add_row(vec![
                c.name.clone(),
                c.totals.match_count.to_string(),
                format!("{:.0}", c.averages.avg_damage),
                format!("{:.0}", c.averages.avg_damage_taken),
                format!("{:.1}", c.averages.dps),
                format!("{:.1}", c.averages.health_retention * 100.0),
                format_battle_time(c.averages.avg_battle_time),
            ]);
        }
        println!("{table}");
        println!();
    }
    Ok(())
}

fn cmd_forms(path: &Path, refs: &ReferenceData, json: bool) -> sparkstats_core::Result<()> {
    let file = load_battle_file(path)?;
    let matches = collect_matches(std::slice::from_ref(&file), refs);
    let transformed: Vec<_> = matches
        .iter()
        .flat_map(|m| m.records.iter())
        .filter(|r| !r.forms.is_empty())
        .collect();

    if json {
        return print_json(&transformed);
    }
    if transformed.is_empty() {
        println!("No per-form data in {}.", file.name);
        return Ok(());
    }

    for record in transformed {
        println!("=== {} ({}) ===", record.stats.name, record.slot_key);
        if let Some(history) = &record.stats.form_change_history {
            println!("Transformations: {}", history);
        }
        let mut table = new_table(vec![
            "#", "Form", "Damage", "Taken", "Time", "Kills", "Specials", "HP",
        ]);
        for form in &record.forms {
            let marker = match (form.is_first_form, form.is_final_form) {
                (true, true) => "only",
                (true, false) => "first",
                (false, true) => "final",
                (false, false) => "",
            };
            table.add_row(vec![
                format!("{} {}", form.form_number, marker).trim().to_string(),
                refs.characters.display_name(&form.form_id),
                form.counters.damage_done.to_string(),
                form.counters.damage_taken.to_string(),
                format_battle_time(form.counters.battle_time),
                form.counters.kills.to_string(),
                form.counters.special_moves_used.to_string(),
                format!("{:.0}/{:.0}", form.hp_gauge_value, form.hp_gauge_value_max),
            ]);
        }
        println!("{table}");
        println!();
    }
    Ok(())
}

fn cmd_files(report: &LoadReport, json: bool) -> sparkstats_core::Result<()> {
    if json {
        let files: Vec<serde_json::Value> = report
            .files
            .iter()
            .map(|f| {
                let results = normalize_document(&f.content);
                serde_json::json!({
                    "name": f.name,
                    "battles": results.len(),
                    "characters": results.iter().map(|r| r.characters.len()).sum::<usize>(),
                })
            })
            .chain(report.errors.iter().map(|e| {
                serde_json::json!({"name": e.name, "error": e.message})
            }))
            .collect();
        return print_json(&files);
    }

    let mut table = new_table(vec!["File", "Status", "Battles", "Characters", "Teams"]);
    for file in &report.files {
        add_file_row(&mut table, file);
    }
    for error in &report.errors {
        table.add_row(vec![
            error.name.clone(),
            error.message.clone(),
            String::new(),
            String::new(),
            String::new(),
        ]);
    }
    println!("{table}");
    println!(
        "{} loaded, {} failed",
        report.files.len(),
        report.errors.len()
    );
    Ok(())
}

fn add_file_row(table: &mut Table, file: &BattleFile) {
    let results = normalize_document(&file.content);
    let status = if results.is_empty() { "Unrecognized" } else { "OK" };
    let characters: usize = results.iter().map(|r| r.characters.len()).sum();
    let teams = results
        .iter()
        .find_map(|r| r.teams.as_ref())
        .map(|t| format!("{} vs {}", t[0], t[1]))
        .unwrap_or_default();
    table.add_row(vec![
        file.name.clone(),
        status.to_string(),
        results.len().to_string(),
        characters.to_string(),
        teams,
    ]);
}

fn cmd_export(report: &LoadReport, refs: &ReferenceData, out_dir: &Path) -> sparkstats_core::Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let aggregates = character_aggregates(&report.files, refs);

    let averages_path = out_dir.join("character_averages.csv");
    write_character_averages(&aggregates, BufWriter::new(File::create(&averages_path)?))?;
    let details_path = out_dir.join("match_details.csv");
    write_match_details(&aggregates, BufWriter::new(File::create(&details_path)?))?;

    println!("Exported {} character(s):", aggregates.len());
    println!("  {}", averages_path.display());
    println!("  {}", details_path.display());
    Ok(())
}
