//! The `wordquiz prompt` command.

use anyhow::{bail, Result};

use wordquiz_core::{build_prompt, Difficulty, Direction};

pub fn execute(difficulty: Difficulty, direction: Direction, count: usize) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    println!("{}", build_prompt(difficulty, direction, count));
    Ok(())
}
