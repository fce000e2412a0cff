//! Linesmith CLI — generate practice lines from the command line.
//!
//! Three entry points: `bass` runs the per-beat bass generator, `pipeline`
//! runs the full riff/walk engine with rule bindings, and `catalog` lists
//! the loaded data set. Reports go to stdout; diagnostics and rejections to
//! stderr.

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use linesmith::bassline::{
    format_bass_line, generate_for_selection,
    lead::{format_lead_report, lead_applicability},
};
use linesmith::catalog::{config, validate, Catalog, Part, Register};
use linesmith::engine::Selection;
use linesmith::pipeline::{
    execute_pipeline, report::format_note_events, AppliedRule, AppliedRuleSet, PartConfig,
};
use linesmith::timeline::RuleSlot;

#[derive(Parser)]
#[command(name = "linesmith", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a bass line from the atomic rule catalog.
    Bass {
        #[arg(long)]
        genre: String,
        #[arg(long, default_value_t = 1)]
        level: u32,
        #[arg(long)]
        progression: String,
        /// Instrument string carrying the key root (1-6).
        #[arg(long, default_value_t = 6)]
        root_string: u8,
        /// 0-100: probability of a uniformly random preference pick.
        #[arg(long, default_value_t = 50)]
        randomness: u8,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Report the lead rules and licks applicable to a selection.
    Lead {
        #[arg(long)]
        genre: String,
        #[arg(long, default_value_t = 1)]
        level: u32,
        #[arg(long)]
        progression: String,
        #[arg(long, default_value_t = 1)]
        root_string: u8,
    },
    /// Run the riff/walk pipeline with rules bound to the global slot.
    Pipeline {
        #[arg(long)]
        progression: String,
        /// Rich rule ids to bind (repeatable).
        #[arg(long = "rule", required = true)]
        rules: Vec<String>,
        /// Register override applied to every binding.
        #[arg(long, value_enum)]
        register: Option<RegisterArg>,
    },
    /// List the loaded catalog.
    Catalog,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum RegisterArg {
    Low,
    Mid,
    High,
}

impl From<RegisterArg> for Register {
    fn from(arg: RegisterArg) -> Self {
        match arg {
            RegisterArg::Low => Register::Low,
            RegisterArg::Mid => Register::Mid,
            RegisterArg::High => Register::High,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let catalog = config::load();

    for diagnostic in validate::validate(&catalog) {
        eprintln!("{diagnostic}");
    }

    match cli.command {
        Command::Bass {
            genre,
            level,
            progression,
            root_string,
            randomness,
            seed,
        } => {
            let selection = Selection {
                genre,
                level,
                progression_id: progression,
                root_string: Some(root_string),
                randomness: randomness.min(100),
                part: Part::Bass,
            };
            let mut rng = ChaCha8Rng::seed_from_u64(seed);

            match generate_for_selection(&catalog, &selection, &mut rng) {
                Ok(line) => {
                    for diagnostic in &line.diagnostics {
                        eprintln!("{diagnostic}");
                    }
                    print!("{}", format_bass_line(&line));
                    if !line.applied.is_empty() {
                        println!("\nApplied rules:");
                        for beat in &line.applied {
                            println!("  Bar {} Beat {}:", beat.bar, beat.beat);
                            for rule in &beat.rules {
                                println!("    - {} ({:?})", rule.id, rule.role);
                            }
                        }
                    }
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Lead {
            genre,
            level,
            progression,
            root_string,
        } => {
            let selection = Selection {
                genre,
                level,
                progression_id: progression,
                root_string: Some(root_string),
                randomness: 0,
                part: Part::Lead,
            };
            match lead_applicability(&selection, &catalog) {
                Ok(report) => print!("{}", format_lead_report(&report)),
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        Command::Pipeline {
            progression,
            rules,
            register,
        } => {
            let Some(progression) = catalog.progression(&progression) else {
                eprintln!("error: unknown progression '{progression}'");
                std::process::exit(1);
            };

            let mut applied = AppliedRuleSet::new();
            for (i, rule_id) in rules.iter().enumerate() {
                let mut binding = AppliedRule::new(rule_id, RuleSlot::Global);
                binding.register_override = register.map(Register::from);
                // Scope each binding to its own part so several global
                // rules can coexist.
                binding.part_id = Some(part_id_for(i));
                applied.bind(binding);
            }

            let parts: Vec<PartConfig> = (0..rules.len())
                .map(|i| {
                    PartConfig::new(
                        &part_id_for(i),
                        &format!("Part {}", i + 1),
                        Some(Register::Low),
                    )
                })
                .collect();

            let result = execute_pipeline(&catalog, progression, &parts, &applied);
            for diagnostic in &result.diagnostics {
                eprintln!("{diagnostic}");
            }
            print!("{}", format_note_events(&result));
        }
        Command::Catalog => print_catalog(&catalog),
    }
}

fn part_id_for(index: usize) -> String {
    format!("part{}", index + 1)
}

fn print_catalog(catalog: &Catalog) {
    println!(
        "linesmith v{} — catalog summary",
        env!("CARGO_PKG_VERSION")
    );
    println!("progressions: {}", catalog.progressions.len());
    for progression in &catalog.progressions {
        println!(
            "  {} [{}] — {}",
            progression.id,
            progression.genre_tags.join(", "),
            progression.description
        );
    }
    println!("rules: {}", catalog.rules.len());
    for rule in &catalog.rules {
        println!("  {} ({:?}): {}", rule.id, rule.role, rule.action);
    }
    println!("riff rules: {}", catalog.rich_rules.len());
    for rule in &catalog.rich_rules {
        println!("  {} ({:?}): {}", rule.id, rule.category, rule.name);
    }
    println!("scales: {}", catalog.scales.len());
    println!("licks: {}", catalog.licks.len());
}
