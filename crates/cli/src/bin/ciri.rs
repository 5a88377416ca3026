use anyhow::Result;

fn main() -> Result<()> {
    ciri_cli::main_entry()
}
