use anyhow::Result;
use clavier::repl::Repl;

fn main() -> Result<()> {
    Repl::new()?.run()
}
