use anyhow::Result;
use common::{config::AppConfig, logging};
use metrics::{TableRef, TABLE_NAMES};
use store::SnapshotStore;

/// Prints the nine derived tables from the current snapshot, for
/// inspection without the visualization layer.
fn main() -> Result<()> {
    logging::init_logging("info");
    let config = AppConfig::load()?;
    let store = SnapshotStore::new(&config.collector.snapshot_dir);
    let bundle = metrics::from_snapshot(&store)?;

    for name in TABLE_NAMES {
        let Some(table) = bundle.table(name) else {
            continue;
        };
        println!("{name}:");
        match table {
            TableRef::Counts(rows) => {
                for row in rows {
                    println!("  {}\t{}\t{}", row.author, row.bucket.label(), row.count);
                }
            }
            TableRef::Resolutions(rows) => {
                for row in rows {
                    println!(
                        "  {}\t{}\t#{}\t{}\t{:.2}",
                        row.author_login, row.repo_name, row.number, row.title, row.days
                    );
                }
            }
        }
        println!();
    }
    Ok(())
}
