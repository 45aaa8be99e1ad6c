//! Cross-Validation Preview Example
//!
//! Demonstrates collecting per-fold, per-parameter-value learning curves into
//! an interlaced report, then averaging them across folds.
//!
//! Run with: RUST_LOG=debug cargo run --example cross_validation

use trueno_preview::export::PreviewExport;
use trueno_preview::{CollectionConfig, LeafPreview, Preview, PreviewCollection};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"{
    "ordering_name": "learning evaluation id",
    "index_name": "fold",
    "task_class": "active-learning-cross-validation",
    "varied_param": { "name": "budget", "values": [0.1, 0.3, 0.5] }
}"#;

fn learning_curve(fold: usize, budget: f64, checkpoints: usize) -> anyhow::Result<LeafPreview> {
    let mut curve = LeafPreview::empty(["instances", "accuracy"]);
    for step in 1..=checkpoints {
        let instances = (step * 1000) as f64;
        let accuracy = 0.5 + 0.4 * budget * (1.0 - 1.0 / step as f64) + 0.01 * fold as f64;
        curve.push_entry(vec![instances, accuracy])?;
    }
    Ok(curve)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Trueno-Preview Cross-Validation ===\n");

    let config = CollectionConfig::from_json(CONFIG)?;
    let param = config
        .varied_param
        .clone()
        .ok_or_else(|| anyhow::anyhow!("demo config needs a varied parameter"))?;

    // -------------------------------------------------------------------------
    // 1. Collect folds (fold 2 only finished two of three budgets)
    // -------------------------------------------------------------------------
    println!("1. Collecting fold previews...");

    let mut folds: PreviewCollection<PreviewCollection<LeafPreview>> =
        config.into_collection();
    for fold_slot in 0..3 {
        let mut fold = PreviewCollection::<LeafPreview>::builder("learning evaluation id", "budget id")
            .varied_param(param.clone())
            .build();
        let finished = if fold_slot == 2 { 2 } else { param.values().len() };
        for (slot, budget) in param.values().iter().take(finished).enumerate() {
            // Producers resend longer curves as the run progresses
            fold.set_preview(slot, learning_curve(fold_slot, *budget, 2)?)?;
            fold.set_preview(slot, learning_curve(fold_slot, *budget, 4)?)?;
        }
        folds.set_preview(fold_slot, fold)?;
        println!("   Fold {fold_slot}: {finished} budgets");
    }

    // -------------------------------------------------------------------------
    // 2. Interlaced report
    // -------------------------------------------------------------------------
    println!("\n2. Interlaced report ({} entries):", folds.num_entries());
    println!("{folds}");

    // -------------------------------------------------------------------------
    // 3. Mean and standard deviation across complete folds
    // -------------------------------------------------------------------------
    println!("\n3. Mean preview per budget:");
    let means = folds.calculate_mean_preview()?;
    println!("{means}");

    let batch = means.to_record_batch()?;
    println!(
        "\n   Arrow export: {} rows x {} columns",
        batch.num_rows(),
        batch.num_columns()
    );

    println!("\n=== Done ===");
    Ok(())
}
