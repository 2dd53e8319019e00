// Colored terminal output for sample sets and pipeline runs.
//
// main.rs delegates all human-readable display here; JSON output is
// serialized directly from the result types.

use colored::Colorize;

use crate::pipeline::{PartialRun, PipelineRun, RunFailure};

/// Display a sample index set, with a preview of each document when available.
pub fn display_samples(samples: &[usize], documents: Option<&[String]>) {
    println!(
        "\n{}",
        format!("=== Sampled {} documents ===", samples.len()).bold()
    );
    println!();

    for (rank, &index) in samples.iter().enumerate() {
        match documents.and_then(|docs| docs.get(index)) {
            Some(doc) => {
                let flat = doc.split_whitespace().collect::<Vec<_>>().join(" ");
                println!(
                    "  {:>4}. #{:<6} {}",
                    rank + 1,
                    index,
                    super::truncate_chars(&flat, 100).dimmed()
                );
            }
            None => println!("  {:>4}. #{}", rank + 1, index),
        }
    }
    println!();
}

/// Display a completed pipeline run.
pub fn display_run(run: &PipelineRun) {
    println!(
        "\n{}",
        format!(
            "=== Taxonomy ({} categories from {} sampled documents) ===",
            run.taxonomy.categories.len(),
            run.samples.len()
        )
        .bold()
    );
    println!();

    for (i, topic) in run.resume.topics.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, topic.category.bright_green().bold());
        println!("      {}", topic.summary.dimmed());
        println!();
    }

    // Categories the resume stage didn't describe (n_taxonomy cut them off)
    for category in run
        .taxonomy
        .categories
        .iter()
        .filter(|c| !run.resume.topics.iter().any(|t| &t.category == *c))
    {
        println!("   - {}", category.bright_blue());
    }

    println!("{}", "Context".bold());
    println!("  {}", run.context.description);
    println!();
    println!(
        "{}",
        format!(
            "Finished in {:.1}s (started {})",
            run.duration.num_milliseconds() as f64 / 1000.0,
            run.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
        .dimmed()
    );
}

/// Display a failed run and how far it got.
pub fn display_failure(failure: &RunFailure) {
    println!(
        "\n{} {}",
        "!!".red().bold(),
        format!("Pipeline halted at the {} stage", failure.stage).bold()
    );
    println!("   {}", failure.error);
    println!();
    display_progress(&failure.partial);
}

fn display_progress(partial: &PartialRun) {
    let mark = |done: bool| {
        if done {
            "done".green()
        } else {
            "not reached".dimmed()
        }
    };

    println!(
        "  Sampling: {}",
        match &partial.samples {
            Some(samples) => format!("{} documents", samples.len()).green(),
            None => mark(false),
        }
    );
    println!(
        "  Taxonomy: {}",
        match &partial.taxonomy {
            Some(taxonomy) => taxonomy.categories.join(", ").green(),
            None => mark(false),
        }
    );
    println!("  Resume:   {}", mark(partial.resume.is_some()));
    println!("  Context:  {}", mark(false));
}
