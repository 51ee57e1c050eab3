use std::hash::RandomState;

use clap::Parser;
use unified_set::StrategySet;
use unified_set::UnifiedSet;
use unified_set::strategy::HashingStrategy;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    #[arg(short = 'l', long = "load_factor", default_value_t = 0.75)]
    load_factor: f32,

    /// Number of distinct hashes for the colliding run; 0 skips it.
    #[arg(short = 'k', long = "distinct_hashes", default_value_t = 64)]
    distinct_hashes: u64,
}

/// Sends values to one of `buckets` hashes.
struct Buckets {
    buckets: u64,
}

impl HashingStrategy<u64> for Buckets {
    fn hash(&self, value: &u64) -> u64 {
        (value % self.buckets).wrapping_mul(0x9E37_79B9_7F4A_7C15)
    }

    fn equals(&self, a: &u64, b: &u64) -> bool {
        a == b
    }
}

fn main() -> Result<(), unified_set::Error> {
    let args = Args::parse();

    println!(
        "Creating UnifiedSet with target capacity {} at load factor {}",
        args.target_capacity, args.load_factor
    );

    let mut set: UnifiedSet<u64, RandomState> = UnifiedSet::with_capacity_load_factor_and_hasher(
        args.target_capacity,
        args.load_factor,
        RandomState::new(),
    )?;

    println!("Actual capacity: {} slots", set.capacity());
    println!("Filling set with u64 values...");

    let num_values = args.target_capacity as u64;
    set.add_all(0..num_values);

    println!("Inserted {} values into set", set.len());
    println!(
        "Final load: {:.2}% of slots",
        (set.len() as f64 / set.capacity() as f64) * 100.0
    );

    set.table().print_chain_histogram();
    set.table().debug_stats().print();

    if set.trim_to_size() {
        println!("Trimmed to {} slots", set.capacity());
    }

    if args.distinct_hashes > 0 {
        println!();
        println!(
            "Colliding run: {} values over {} distinct hashes",
            num_values, args.distinct_hashes
        );

        let mut colliding = StrategySet::with_capacity_load_factor_and_strategy(
            args.target_capacity,
            args.load_factor,
            Buckets {
                buckets: args.distinct_hashes,
            },
        )?;
        colliding.add_all(0..num_values);

        colliding.table().print_chain_histogram();
        colliding.table().debug_stats().print();
    }

    Ok(())
}
