use anyhow::Result;
use mumbai_bench::scoring;
use std::io::{self, Read};

pub fn handle_score(question_id: u32, text: &str) -> Result<()> {
    let answer = if text == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        text.to_string()
    };

    println!("{}", scoring::score(&answer, question_id));
    Ok(())
}
