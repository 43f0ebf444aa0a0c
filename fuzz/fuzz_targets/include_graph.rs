//! Fuzz target for include-tree building over arbitrary operation graphs.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_include_graph
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use navtree_query::{IncludeArg, IncludeLookup, IncludeTreeBuilder, Operation, PathExpr};

const NAMES: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Debug, Arbitrary)]
enum Step {
    Include(Vec<u8>),
    IncludeStr(String),
    ThenInclude(Vec<u8>),
    Take(u8),
}

fn expr(indices: &[u8]) -> PathExpr {
    PathExpr::members(indices.iter().take(6).map(|i| NAMES[usize::from(*i) % NAMES.len()]))
}

fuzz_target!(|steps: Vec<Step>| {
    let ops: Vec<Operation> = steps
        .iter()
        .map(|step| match step {
            Step::Include(path) => Operation::Include(IncludeArg::Expr(expr(path))),
            Step::IncludeStr(path) => Operation::Include(IncludeArg::Path(path.as_str().into())),
            Step::ThenInclude(path) => Operation::ThenInclude(expr(path)),
            Step::Take(n) => Operation::Take(u64::from(*n)),
        })
        .collect();

    // Building never panics, and every reported path can be looked up again.
    if let Ok(tree) = IncludeTreeBuilder::new().build(&ops) {
        for path in tree.paths() {
            assert!(tree.descend(path.split('.')).is_some());
        }
    }
});
