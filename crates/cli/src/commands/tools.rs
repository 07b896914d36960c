//! `reagent tools` — list the built-in tools.

pub fn run() {
    let registry = reagent_tools::default_registry(None);
    println!("{}", registry.describe());
}
